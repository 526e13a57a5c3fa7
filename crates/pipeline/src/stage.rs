//! The stage contract.
//!
//! [`Stage`] is what the engine drives: state in, state out, never an error.
//! [`FallibleStage`] is what stage authors implement: a typed `Result` carrying
//! only the keys the stage produced. The blanket implementation below is the
//! one place where a failure is converted into an `error`-bearing state and a
//! success is merged into the accumulated state.

use async_trait::async_trait;
use tracing::warn;

use crate::{PipelineState, StageId, StateDelta};

/// A unit of pipeline work transforming the accumulated state.
///
/// Implementations must return normally in every case: on failure the returned
/// state carries the `error` key with a diagnostic naming the stage and cause.
#[async_trait]
pub trait Stage: Send + Sync {
    /// The identifier this stage is registered under.
    fn id(&self) -> StageId;

    /// Runs the stage against a snapshot of the accumulated state.
    async fn execute(&self, state: PipelineState) -> PipelineState;
}

/// A stage whose body reports failure through a typed error.
///
/// Implementors read what they need from the state and return only the keys
/// they produced. The error's `Display` output becomes the `error` value
/// verbatim, so it should already name the stage (e.g. `"Writer failed: ..."`).
#[async_trait]
pub trait FallibleStage: Send + Sync {
    /// Failure type for this stage.
    type Error: std::error::Error + Send + Sync + 'static;

    /// The identifier this stage is registered under.
    fn id(&self) -> StageId;

    /// Produces this stage's keys from the accumulated state.
    async fn run(&self, state: &PipelineState) -> Result<StateDelta, Self::Error>;
}

#[async_trait]
impl<T: FallibleStage> Stage for T {
    fn id(&self) -> StageId {
        FallibleStage::id(self)
    }

    async fn execute(&self, state: PipelineState) -> PipelineState {
        let id = FallibleStage::id(self);
        match self.run(&state).await {
            Ok(delta) => match state.merge(delta) {
                Ok(next) => next,
                Err(e) => {
                    warn!(stage = %id, error = %e, "Stage output rejected");
                    state.fail(format!("Stage '{id}' produced invalid output: {e}"))
                }
            },
            Err(e) => state.fail(e.to_string()),
        }
    }
}
