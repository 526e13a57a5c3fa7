use std::sync::Arc;

use async_trait::async_trait;
use pipeline::{keys, FallibleStage, PipelineState, StageId, StateDelta, StateError, TextGenerator};
use thiserror::Error;
use tracing::info;

use crate::gateway::{GatewayError, GenerationGateway};
use crate::prompts;
use crate::stage_ids;

/// Tone assumed when the state has no `tone` key.
const FALLBACK_TONE: &str = "neutral";

#[derive(Debug, Error)]
pub enum PlannerError {
    /// The response did not contain a subtopic line and a depth line.
    #[error("Planner output malformed.")]
    Malformed,

    #[error("Planner failed: {0}")]
    Generation(#[from] GatewayError),

    #[error("Planner failed: {0}")]
    State(#[from] StateError),
}

/// A parsed strategic breakdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    pub subtopics: Vec<String>,
    pub depth_level: String,
}

impl Plan {
    /// Parses `Sub1|Sub2|...` followed by a `<label>: <depth>` line.
    ///
    /// Blank lines are skipped. The depth is the text after the last `:` of the
    /// second line, so both `Depth: X` and `Recommended depth: X` parse; a line
    /// without a colon is taken whole. Empty subtopics are dropped.
    pub fn parse(raw: &str) -> Result<Self, PlannerError> {
        let mut lines = raw.lines().map(str::trim).filter(|l| !l.is_empty());
        let (Some(subtopic_line), Some(depth_line)) = (lines.next(), lines.next()) else {
            return Err(PlannerError::Malformed);
        };

        let subtopics: Vec<String> = subtopic_line
            .split('|')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_owned)
            .collect();
        let depth_level = depth_line.rsplit(':').next().unwrap_or(depth_line).trim();

        if subtopics.is_empty() || depth_level.is_empty() {
            return Err(PlannerError::Malformed);
        }
        Ok(Self {
            subtopics,
            depth_level: depth_level.to_owned(),
        })
    }
}

/// Breaks the topic down into subtopics and a recommended depth.
///
/// # State Requirements
/// - Input: `topic` (string)
/// - Input: `tone` (string, optional; `"neutral"` when absent)
///
/// # State Outputs
/// - `subtopics` (array of string, non-empty)
/// - `depth_level` (string)
pub struct PlanningStage {
    generator: GenerationGateway,
}

impl PlanningStage {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            generator: GenerationGateway::new(Self::stage_id(), generator),
        }
    }

    fn stage_id() -> StageId {
        StageId::from_static(stage_ids::PLANNING)
    }
}

#[async_trait]
impl FallibleStage for PlanningStage {
    type Error = PlannerError;

    fn id(&self) -> StageId {
        Self::stage_id()
    }

    async fn run(&self, state: &PipelineState) -> Result<StateDelta, PlannerError> {
        let topic = state.str_field(keys::TOPIC)?;
        let tone = match state.str_field(keys::TONE) {
            Err(StateError::MissingKey { .. }) => FALLBACK_TONE,
            other => other?,
        };

        let response = self.generator.complete(&prompts::planning(topic, tone)).await?;
        let plan = Plan::parse(&response)?;
        info!(
            subtopics = plan.subtopics.len(),
            depth = %plan.depth_level,
            "Plan ready"
        );

        Ok(StateDelta::new()
            .with(keys::SUBTOPICS, &plan.subtopics)?
            .with(keys::DEPTH_LEVEL, &plan.depth_level)?)
    }
}
