use std::sync::Arc;

use async_trait::async_trait;
use pipeline::{
    keys, FallibleStage, PipelineState, ResearchData, StageId, StateDelta, StateError,
    TextGenerator,
};
use serde_json::Value;
use thiserror::Error;
use tracing::info;

use crate::gateway::{GatewayError, GenerationGateway};
use crate::prompts;
use crate::stage_ids;

#[derive(Debug, Error)]
pub enum SeoError {
    #[error("SEO failed: {0}")]
    Generation(#[from] GatewayError),

    #[error("SEO failed: response is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("SEO failed: response is JSON but not an object")]
    NotAnObject,

    #[error("SEO failed: {0}")]
    State(#[from] StateError),
}

/// Removes a surrounding markdown code fence (```` ```json ```` or ```` ``` ````)
/// and outer whitespace. Unfenced input is returned trimmed.
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let body = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    body.strip_suffix("```").unwrap_or(body).trim()
}

/// Generates search-engine metadata for the draft.
///
/// The stored object is the generator's JSON as returned; its shape is checked
/// by the export stage, which is the one that depends on it.
///
/// # State Requirements
/// - Input: `draft` (string)
/// - Input: `research_data.keywords` (array of string)
///
/// # State Outputs
/// - `seo_data` (JSON object; expected keys `title`, `meta_description`,
///   `keywords`, `reading_time`, `slug`)
pub struct MetadataStage {
    generator: GenerationGateway,
}

impl MetadataStage {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            generator: GenerationGateway::new(
                StageId::from_static(stage_ids::METADATA),
                generator,
            ),
        }
    }
}

#[async_trait]
impl FallibleStage for MetadataStage {
    type Error = SeoError;

    fn id(&self) -> StageId {
        StageId::from_static(stage_ids::METADATA)
    }

    async fn run(&self, state: &PipelineState) -> Result<StateDelta, SeoError> {
        let draft = state.str_field(keys::DRAFT)?;
        let research: ResearchData = state.field(keys::RESEARCH_DATA)?;

        let response = self.generator.complete(&prompts::seo(draft, &research)).await?;
        let seo: Value = serde_json::from_str(strip_code_fence(&response))?;
        if !seo.is_object() {
            return Err(SeoError::NotAnObject);
        }
        info!(
            slug = seo.get("slug").and_then(serde_json::Value::as_str).unwrap_or_default(),
            "SEO metadata ready"
        );

        Ok(StateDelta::new().with_value(keys::SEO_DATA, seo))
    }
}
