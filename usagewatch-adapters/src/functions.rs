//! Serverless function registry abstraction.

use std::fmt::Debug;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::AdapterError;

/// Description of a function to create when it does not exist yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionSpec {
    /// Function name, also the lookup key.
    pub name: String,
    /// Entry point inside the uploaded archive.
    pub handler: String,
    /// Runtime identifier.
    pub runtime: String,
    /// Execution role the function assumes.
    #[serde(default)]
    pub role: String,
}

/// Where a function's code archive is stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeLocation {
    pub bucket: String,
    pub key: String,
}

/// Registry of deployed functions.
#[async_trait]
pub trait FunctionRegistry: Send + Sync + Debug {
    /// Whether a function with this name is already deployed.
    async fn exists(&self, name: &str) -> Result<bool, AdapterError>;

    /// Create a new function running the archive at `code`.
    async fn create(&self, spec: &FunctionSpec, code: &CodeLocation) -> Result<(), AdapterError>;

    /// Point an existing function at the archive at `code`.
    async fn update_code(&self, name: &str, code: &CodeLocation) -> Result<(), AdapterError>;
}
