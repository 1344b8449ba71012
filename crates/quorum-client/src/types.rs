//! Wire types exchanged between the verifier node and signer nodes

use ed25519_dalek::{Signer, Verifier};
use serde::{Deserialize, Serialize};

use quorum_primitives::keys::{serde_signature, serde_signer_key};
use quorum_primitives::{bytes_to_felts, felt_from_u64, Digest, Hash256, Signature, SignerKey, SigningKey};

const REQUEST_HASH_DOMAIN: &[u8] = b"QUORUM_DATA_REQUEST_V1";

/// Which external value to attest to: the numeric `field` of the JSON
/// document served at `url + route`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DataRequest {
    pub url: String,
    pub route: String,
    pub field: String,
}

impl DataRequest {
    pub fn new(url: impl Into<String>, route: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            route: route.into(),
            field: field.into(),
        }
    }

    /// Full URL to fetch
    pub fn endpoint(&self) -> String {
        format!("{}{}", self.url.trim_end_matches('/'), self.route)
    }

    /// SHA-256 over the canonical JSON form (keys sorted, no whitespace)
    pub fn request_hash(&self) -> Hash256 {
        let canonical = serde_json::json!({
            "field": self.field,
            "route": self.route,
            "url": self.url,
        })
        .to_string();
        Hash256::sha256_with_domain(REQUEST_HASH_DOMAIN, canonical.as_bytes())
    }

    /// The digest signers approve: the request bound to the observed value
    pub fn message_for(&self, value: u64) -> Digest {
        let mut elements = bytes_to_felts(self.request_hash().as_bytes());
        elements.push(felt_from_u64(value));
        Digest::hash_elements(&elements)
    }
}

/// A data request signed by the verifier node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedRequest {
    pub data: DataRequest,

    #[serde(with = "serde_signature")]
    pub signature: Signature,
}

impl SignedRequest {
    pub fn sign(data: DataRequest, coordinator: &SigningKey) -> Self {
        let signature = coordinator.sign(data.request_hash().as_bytes());
        Self { data, signature }
    }

    /// Whether `coordinator` signed this request
    pub fn verify(&self, coordinator: &SignerKey) -> bool {
        coordinator
            .verify(self.data.request_hash().as_bytes(), &self.signature)
            .is_ok()
    }
}

/// One signer's answer to a request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignerResponse {
    #[serde(with = "serde_signer_key")]
    pub public_key: SignerKey,

    #[serde(with = "serde_signature")]
    pub signature: Signature,
}
