//! Signature collection

use std::future::Future;

use tracing::{info, warn};

use crate::data_source::DataSource;
use crate::error::Result;
use crate::signer::SignerNode;
use crate::types::{SignedRequest, SignerResponse};

/// Gathers signer responses for a signed request
pub trait SignatureCollector {
    fn collect(
        &self,
        request: &SignedRequest,
    ) -> impl Future<Output = Result<Vec<SignerResponse>>> + Send;
}

/// In-process committee of signer nodes
pub struct LocalCommittee<D> {
    signers: Vec<SignerNode<D>>,
}

impl<D> LocalCommittee<D> {
    pub fn new(signers: Vec<SignerNode<D>>) -> Self {
        Self { signers }
    }

    pub fn len(&self) -> usize {
        self.signers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signers.is_empty()
    }
}

impl<D: DataSource + Send + Sync> SignatureCollector for LocalCommittee<D> {
    async fn collect(&self, request: &SignedRequest) -> Result<Vec<SignerResponse>> {
        let mut responses = Vec::with_capacity(self.signers.len());
        for signer in &self.signers {
            match signer.sign(request).await {
                Ok(response) => responses.push(response),
                Err(err) => warn!(signer = ?signer.public_key(), %err, "signer did not respond"),
            }
        }
        info!(
            responses = responses.len(),
            committee = self.signers.len(),
            "signatures collected"
        );
        Ok(responses)
    }
}
