//! Upload of a build archive and create-or-update of the functions using it.
//!
//! Building the archive (compiling and zipping the binary together with any
//! `resources/` directory) is done beforehand by the release tooling.

use std::path::Path;

use tracing::info;
use usagewatch_adapters::{CodeLocation, FunctionRegistry, FunctionSpec, ObjectStore};

use crate::PipelineError;

/// What happened to one function during a deploy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeployAction {
    Created(String),
    Updated(String),
}

/// Publishes code archives and points functions at them.
#[derive(Debug)]
pub struct Deployer {
    store: Box<dyn ObjectStore>,
    registry: Box<dyn FunctionRegistry>,
    code: CodeLocation,
}

impl Deployer {
    pub fn new(store: Box<dyn ObjectStore>, registry: Box<dyn FunctionRegistry>, code: CodeLocation) -> Self {
        Self {
            store,
            registry,
            code,
        }
    }

    /// Upload the archive, then create each missing function and update the rest.
    pub async fn deploy(
        &self,
        archive: &Path,
        functions: &[FunctionSpec],
    ) -> Result<Vec<DeployAction>, PipelineError> {
        let bytes = tokio::fs::read(archive)
            .await
            .map_err(|source| PipelineError::ArchiveRead {
                path: archive.to_path_buf(),
                source,
            })?;
        info!(archive = %archive.display(), bytes = bytes.len(), "uploading code archive");

        self.store
            .put_object(&self.code.bucket, &self.code.key, bytes)
            .await
            .map_err(PipelineError::Deploy)?;

        let mut actions = Vec::with_capacity(functions.len());
        for function in functions {
            actions.push(self.deploy_function(function).await?);
        }
        Ok(actions)
    }

    async fn deploy_function(&self, function: &FunctionSpec) -> Result<DeployAction, PipelineError> {
        if self
            .registry
            .exists(&function.name)
            .await
            .map_err(PipelineError::Deploy)?
        {
            self.registry
                .update_code(&function.name, &self.code)
                .await
                .map_err(PipelineError::Deploy)?;
            info!(function = %function.name, "updated function code");
            return Ok(DeployAction::Updated(function.name.clone()));
        }

        if function.role.is_empty() {
            return Err(PipelineError::InvalidFunction {
                name: function.name.clone(),
                reason: "an execution role is required to create it".to_string(),
            });
        }

        self.registry
            .create(function, &self.code)
            .await
            .map_err(PipelineError::Deploy)?;
        info!(function = %function.name, "created function");
        Ok(DeployAction::Created(function.name.clone()))
    }
}
