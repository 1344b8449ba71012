//! Signer node
//!
//! A committee member. It only answers requests signed by the verifier
//! node it serves, fetches the value itself and signs the resulting message.

use tracing::{debug, warn};

use quorum_primitives::{sign_message, SignerKey, SigningKey};

use crate::data_source::DataSource;
use crate::error::{ClientError, Result};
use crate::types::{SignedRequest, SignerResponse};

pub struct SignerNode<D> {
    key: SigningKey,
    coordinator: SignerKey,
    source: D,
}

impl<D: DataSource> SignerNode<D> {
    pub fn new(key: SigningKey, coordinator: SignerKey, source: D) -> Self {
        Self {
            key,
            coordinator,
            source,
        }
    }

    pub fn public_key(&self) -> SignerKey {
        self.key.verifying_key()
    }

    /// Validate the request, fetch the value and sign it
    pub async fn sign(&self, request: &SignedRequest) -> Result<SignerResponse> {
        if !request.verify(&self.coordinator) {
            warn!(endpoint = %request.data.endpoint(), "request not signed by coordinator");
            return Err(ClientError::Unauthorized(
                "request is not signed by the verifier node".to_string(),
            ));
        }

        let value = self.source.fetch(&request.data).await?;
        let message = request.data.message_for(value);
        debug!(value, message = %message, "signing");

        Ok(SignerResponse {
            public_key: self.public_key(),
            signature: sign_message(&self.key, &message),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_source::StaticDataSource;
    use crate::types::DataRequest;
    use quorum_primitives::keys::signing_key_from_seed;
    use quorum_primitives::verify_message;

    #[tokio::test]
    async fn test_signs_fetched_value() {
        let coordinator = signing_key_from_seed(b"coordinator");
        let request = DataRequest::new("https://example.com", "/v", "n");
        let node = SignerNode::new(
            signing_key_from_seed(b"node"),
            coordinator.verifying_key(),
            StaticDataSource::new().with_value(&request, 5),
        );

        let response = node
            .sign(&SignedRequest::sign(request.clone(), &coordinator))
            .await
            .unwrap();
        assert!(verify_message(
            &response.public_key,
            &request.message_for(5),
            &response.signature
        ));
    }

    #[tokio::test]
    async fn test_rejects_foreign_coordinator() {
        let coordinator = signing_key_from_seed(b"coordinator");
        let impostor = signing_key_from_seed(b"impostor");
        let request = DataRequest::new("https://example.com", "/v", "n");
        let node = SignerNode::new(
            signing_key_from_seed(b"node"),
            coordinator.verifying_key(),
            StaticDataSource::new().with_value(&request, 5),
        );

        let result = node.sign(&SignedRequest::sign(request, &impostor)).await;
        assert!(matches!(result, Err(ClientError::Unauthorized(_))));
    }
}
