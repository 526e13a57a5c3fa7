//! Fallible-call adapters over the collaborator ports.
//!
//! Every generation call and every artifact write made by a stage goes through
//! one of these gateways, so failures surface as a single [`GatewayError`] type
//! and every call is logged the same way.

use std::path::PathBuf;
use std::sync::Arc;

use pipeline::{ArtifactError, ArtifactStore, GenerationError, StageId, TextGenerator};
use thiserror::Error;
use tracing::{debug, warn};

/// A failed collaborator call.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Artifact(#[from] ArtifactError),
}

/// Wraps a [`TextGenerator`] for use by one stage.
#[derive(Clone)]
pub struct GenerationGateway {
    stage: StageId,
    generator: Arc<dyn TextGenerator>,
}

impl GenerationGateway {
    pub fn new(stage: StageId, generator: Arc<dyn TextGenerator>) -> Self {
        Self { stage, generator }
    }

    /// Sends `prompt` to the generator.
    pub async fn complete(&self, prompt: &str) -> Result<String, GatewayError> {
        debug!(stage = %self.stage, prompt_chars = prompt.len(), "Calling generator");
        match self.generator.generate(prompt).await {
            Ok(text) => {
                debug!(stage = %self.stage, response_chars = text.len(), "Generator responded");
                Ok(text)
            }
            Err(e) => {
                warn!(stage = %self.stage, error = %e, "Generator call failed");
                Err(e.into())
            }
        }
    }
}

/// Wraps an [`ArtifactStore`] for use by one stage.
#[derive(Clone)]
pub struct ArtifactGateway {
    stage: StageId,
    store: Arc<dyn ArtifactStore>,
}

impl ArtifactGateway {
    pub fn new(stage: StageId, store: Arc<dyn ArtifactStore>) -> Self {
        Self { stage, store }
    }

    pub async fn write_text(&self, name: &str, contents: &str) -> Result<PathBuf, GatewayError> {
        let result = self.store.write_text(name, contents).await;
        self.log_write(name, &result);
        Ok(result?)
    }

    pub async fn write_json(
        &self,
        name: &str,
        value: &serde_json::Value,
    ) -> Result<PathBuf, GatewayError> {
        let result = self.store.write_json(name, value).await;
        self.log_write(name, &result);
        Ok(result?)
    }

    fn log_write(&self, name: &str, result: &Result<PathBuf, ArtifactError>) {
        match result {
            Ok(path) => debug!(
                stage = %self.stage,
                artifact = name,
                path = %path.display(),
                "Artifact written"
            ),
            Err(e) => warn!(
                stage = %self.stage,
                artifact = name,
                error = %e,
                "Artifact write failed"
            ),
        }
    }
}
