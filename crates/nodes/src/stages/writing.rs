use std::sync::Arc;

use async_trait::async_trait;
use pipeline::{
    keys, FallibleStage, PipelineState, ResearchData, StageId, StateDelta, StateError,
    TextGenerator,
};
use thiserror::Error;
use tracing::info;

use crate::gateway::{GatewayError, GenerationGateway};
use crate::prompts;
use crate::stage_ids;

#[derive(Debug, Error)]
pub enum WriterError {
    #[error("Writer failed: {0}")]
    Generation(#[from] GatewayError),

    #[error("Writer failed: the generated draft is empty")]
    EmptyDraft,

    #[error("Writer failed: {0}")]
    State(#[from] StateError),
}

/// Writes the article body.
///
/// # State Requirements
/// - Input: `topic` (string)
/// - Input: `subtopics` (array of string)
/// - Input: `research_data` ([`ResearchData`])
/// - Input: `tone` (string)
///
/// # State Outputs
/// - `draft` (string, non-empty markdown)
pub struct WritingStage {
    generator: GenerationGateway,
}

impl WritingStage {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            generator: GenerationGateway::new(
                StageId::from_static(stage_ids::WRITING),
                generator,
            ),
        }
    }
}

#[async_trait]
impl FallibleStage for WritingStage {
    type Error = WriterError;

    fn id(&self) -> StageId {
        StageId::from_static(stage_ids::WRITING)
    }

    async fn run(&self, state: &PipelineState) -> Result<StateDelta, WriterError> {
        let topic = state.str_field(keys::TOPIC)?;
        let tone = state.str_field(keys::TONE)?;
        let subtopics: Vec<String> = state.field(keys::SUBTOPICS)?;
        let research: ResearchData = state.field(keys::RESEARCH_DATA)?;
        let notes = serde_json::to_string(&research).map_err(|e| StateError::Encode {
            key: keys::RESEARCH_DATA.to_owned(),
            reason: e.to_string(),
        })?;

        let draft = self
            .generator
            .complete(&prompts::writing(topic, &subtopics, &notes, tone))
            .await?;
        if draft.trim().is_empty() {
            return Err(WriterError::EmptyDraft);
        }
        info!(words = draft.split_whitespace().count(), "Draft ready");

        Ok(StateDelta::new().with(keys::DRAFT, &draft)?)
    }
}
