//! Object storage over an S3-style REST API.
//!
//! Objects are written with `PUT {endpoint}/{bucket}/{key}` and made public
//! with `PUT {endpoint}/{bucket}/{key}?acl` carrying the canned ACL header
//! `x-amz-acl: public-read`. Requests are not SigV4-signed; point the
//! endpoint at a gateway that authenticates with a bearer token, or at a
//! bucket policy that accepts the caller. There is no default endpoint.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::error::{check_status, required_endpoint};
use crate::{AdapterError, ObjectStore};

/// Header carrying a canned ACL.
const ACL_HEADER: &str = "x-amz-acl";

/// S3-style REST object store.
#[derive(Debug, Clone)]
pub struct HttpObjectStore {
    client: Client,
    endpoint: String,
    bearer_token: Option<String>,
    description: String,
}

impl HttpObjectStore {
    /// Create a new builder for configuring the store.
    pub fn builder() -> HttpObjectStoreBuilder {
        HttpObjectStoreBuilder::default()
    }

    fn object_url(&self, bucket: &str, key: &str) -> String {
        format!("{}/{}/{}", self.endpoint, bucket, key.trim_start_matches('/'))
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.bearer_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

#[async_trait]
impl ObjectStore for HttpObjectStore {
    async fn put_object(&self, bucket: &str, key: &str, body: Vec<u8>) -> Result<(), AdapterError> {
        let url = self.object_url(bucket, key);
        debug!(url = %url, bytes = body.len(), "uploading object");

        let response = self
            .authorize(self.client.put(&url))
            .header(reqwest::header::CONTENT_TYPE, content_type(key))
            .body(body)
            .send()
            .await?;

        check_status(response.status())
    }

    async fn set_public_read(&self, bucket: &str, key: &str) -> Result<(), AdapterError> {
        let url = format!("{}?acl", self.object_url(bucket, key));

        let response = self
            .authorize(self.client.put(&url))
            .header(ACL_HEADER, "public-read")
            .send()
            .await?;

        check_status(response.status())
    }

    fn description(&self) -> &str {
        &self.description
    }
}

/// Builder for HttpObjectStore.
#[derive(Debug, Default)]
pub struct HttpObjectStoreBuilder {
    endpoint: Option<String>,
    bearer_token: Option<String>,
    timeout: Option<Duration>,
}

impl HttpObjectStoreBuilder {
    /// Set the storage endpoint. Required.
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Send `Authorization: Bearer <token>` with every request.
    pub fn bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    /// Set the request timeout (default: 30 seconds).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the store.
    pub fn build(self) -> Result<HttpObjectStore, AdapterError> {
        let timeout = self.timeout.unwrap_or(Duration::from_secs(30));
        let client = Client::builder().timeout(timeout).build()?;

        let endpoint = required_endpoint(self.endpoint)?;

        Ok(HttpObjectStore {
            client,
            description: format!("http: {}", endpoint),
            endpoint,
            bearer_token: self.bearer_token,
        })
    }
}

// Guess a content type from the key's extension
fn content_type(key: &str) -> &'static str {
    match key.rsplit_once('.').map(|(_, ext)| ext) {
        Some("json") => "application/json",
        Some("zip") => "application/zip",
        _ => "application/octet-stream",
    }
}
