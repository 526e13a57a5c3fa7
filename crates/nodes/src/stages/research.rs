use async_trait::async_trait;
use pipeline::{keys, FallibleStage, PipelineState, ResearchData, StageId, StateDelta, StateError};
use thiserror::Error;

use crate::stage_ids;

#[derive(Debug, Error)]
#[error("Research failed: {0}")]
pub struct ResearchError(#[from] StateError);

/// Gathers background material for the writer.
///
/// There is no research backend yet: the material is a fixed quote and news
/// line plus keywords derived from the topic, so the stage makes no external
/// call and only fails if `topic` is missing.
///
/// # State Requirements
/// - Input: `topic` (string)
///
/// # State Outputs
/// - `research_data` ([`ResearchData`])
#[derive(Debug, Default)]
pub struct ResearchStage;

impl ResearchStage {
    pub fn new() -> Self {
        Self
    }

    /// The material gathered for `topic`.
    pub fn gather(topic: &str) -> ResearchData {
        ResearchData {
            quotes: vec!["\"Knowledge is power.\" - Francis Bacon".to_owned()],
            news: vec!["No recent updates found.".to_owned()],
            keywords: vec![
                topic.to_owned(),
                "technology".to_owned(),
                "insights".to_owned(),
            ],
        }
    }
}

#[async_trait]
impl FallibleStage for ResearchStage {
    type Error = ResearchError;

    fn id(&self) -> StageId {
        StageId::from_static(stage_ids::RESEARCH)
    }

    async fn run(&self, state: &PipelineState) -> Result<StateDelta, ResearchError> {
        let topic = state.str_field(keys::TOPIC)?;
        Ok(StateDelta::new().with(keys::RESEARCH_DATA, &Self::gather(topic))?)
    }
}
