//! Data sources: where the attested value comes from

use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use tracing::debug;

use crate::error::{ClientError, Result};
use crate::types::DataRequest;

/// Fetches the value a request refers to
pub trait DataSource {
    fn fetch(&self, request: &DataRequest) -> impl Future<Output = Result<u64>> + Send;
}

/// Read `field` from a JSON object as an unsigned integer
pub fn extract_field(body: &serde_json::Value, field: &str) -> Result<u64> {
    let value = body
        .get(field)
        .ok_or_else(|| ClientError::FieldMissing(field.to_string()))?;
    value
        .as_u64()
        .ok_or_else(|| ClientError::FieldNotNumeric(field.to_string()))
}

/// Fetches values over HTTP
#[derive(Debug, Clone)]
pub struct HttpDataSource {
    client: reqwest::Client,
}

impl HttpDataSource {
    /// Default timeout for a single fetch
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    pub fn try_new() -> Result<Self> {
        Self::with_timeout(Self::DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

impl DataSource for HttpDataSource {
    async fn fetch(&self, request: &DataRequest) -> Result<u64> {
        let url = request.endpoint();
        debug!(%url, field = %request.field, "fetching");

        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if status.is_success() {
            let body: serde_json::Value = response.json().await?;
            extract_field(&body, &request.field)
        } else if status.as_u16() == 401 || status.as_u16() == 403 {
            let body = response.text().await.unwrap_or_default();
            Err(ClientError::Unauthorized(body))
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(ClientError::ApiError {
                status: status.as_u16(),
                message: body,
            })
        }
    }
}

/// Fixed values keyed by endpoint and field, for local runs and tests
#[derive(Debug, Clone, Default)]
pub struct StaticDataSource {
    values: HashMap<(String, String), u64>,
}

impl StaticDataSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `value` for `request`
    pub fn with_value(mut self, request: &DataRequest, value: u64) -> Self {
        self.insert(request, value);
        self
    }

    pub fn insert(&mut self, request: &DataRequest, value: u64) {
        self.values
            .insert((request.endpoint(), request.field.clone()), value);
    }
}

impl DataSource for StaticDataSource {
    async fn fetch(&self, request: &DataRequest) -> Result<u64> {
        self.values
            .get(&(request.endpoint(), request.field.clone()))
            .copied()
            .ok_or_else(|| ClientError::FieldMissing(request.field.clone()))
    }
}
