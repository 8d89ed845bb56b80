//! Function registry over the Lambda-style REST API.
//!
//! - `GET  /2015-03-31/functions/{name}` looks a function up (404: absent)
//! - `POST /2015-03-31/functions` creates one
//! - `PUT  /2015-03-31/functions/{name}/code` replaces its code
//!
//! Like [`HttpObjectStore`](crate::http_store::HttpObjectStore), requests are
//! authenticated with an optional bearer token rather than SigV4, and the
//! endpoint must be configured.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use tracing::debug;

use crate::error::{check_status, required_endpoint};
use crate::{AdapterError, CodeLocation, FunctionRegistry, FunctionSpec};

const API_VERSION: &str = "2015-03-31";

/// Lambda-style REST function registry.
#[derive(Debug, Clone)]
pub struct HttpFunctionRegistry {
    client: Client,
    endpoint: String,
    bearer_token: Option<String>,
}

impl HttpFunctionRegistry {
    /// Create a new builder for configuring the registry.
    pub fn builder() -> HttpFunctionRegistryBuilder {
        HttpFunctionRegistryBuilder::default()
    }

    fn functions_url(&self) -> String {
        format!("{}/{}/functions", self.endpoint, API_VERSION)
    }

    fn function_url(&self, name: &str) -> String {
        format!("{}/{}", self.functions_url(), name)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.bearer_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

#[async_trait]
impl FunctionRegistry for HttpFunctionRegistry {
    async fn exists(&self, name: &str) -> Result<bool, AdapterError> {
        let response = self
            .authorize(self.client.get(self.function_url(name)))
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }

        check_status(response.status())?;
        Ok(true)
    }

    async fn create(&self, spec: &FunctionSpec, code: &CodeLocation) -> Result<(), AdapterError> {
        debug!(function = %spec.name, "creating function");
        let body = CreateFunctionRequest::new(spec, code);

        let response = self
            .authorize(self.client.post(self.functions_url()))
            .json(&body)
            .send()
            .await?;

        check_status(response.status())
    }

    async fn update_code(&self, name: &str, code: &CodeLocation) -> Result<(), AdapterError> {
        debug!(function = %name, "updating function code");
        let url = format!("{}/code", self.function_url(name));

        let response = self
            .authorize(self.client.put(&url))
            .json(&S3Code::from(code))
            .send()
            .await?;

        check_status(response.status())
    }
}

/// Builder for HttpFunctionRegistry.
#[derive(Debug, Default)]
pub struct HttpFunctionRegistryBuilder {
    endpoint: Option<String>,
    bearer_token: Option<String>,
    timeout: Option<Duration>,
}

impl HttpFunctionRegistryBuilder {
    /// Set the API endpoint. Required.
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Send `Authorization: Bearer <token>` with every request.
    pub fn bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    /// Set the request timeout (default: 60 seconds).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the registry.
    pub fn build(self) -> Result<HttpFunctionRegistry, AdapterError> {
        let timeout = self.timeout.unwrap_or(Duration::from_secs(60));
        let client = Client::builder().timeout(timeout).build()?;

        Ok(HttpFunctionRegistry {
            client,
            endpoint: required_endpoint(self.endpoint)?,
            bearer_token: self.bearer_token,
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct CreateFunctionRequest<'a> {
    function_name: &'a str,
    runtime: &'a str,
    role: &'a str,
    handler: &'a str,
    code: S3Code<'a>,
}

impl<'a> CreateFunctionRequest<'a> {
    fn new(spec: &'a FunctionSpec, code: &'a CodeLocation) -> Self {
        Self {
            function_name: &spec.name,
            runtime: &spec.runtime,
            role: &spec.role,
            handler: &spec.handler,
            code: S3Code::from(code),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct S3Code<'a> {
    s3_bucket: &'a str,
    s3_key: &'a str,
}

impl<'a> From<&'a CodeLocation> for S3Code<'a> {
    fn from(code: &'a CodeLocation) -> Self {
        Self {
            s3_bucket: &code.bucket,
            s3_key: &code.key,
        }
    }
}
