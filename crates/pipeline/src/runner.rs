//! The outward-facing driver around a [`PipelineEngine`].
//!
//! Supplies the initial state, runs the engine, and turns the terminal state
//! into a [`RunOutcome`] the caller can display.

use tracing::info;

use crate::{keys, PipelineEngine, PipelineState, RunnerError};

/// Tone used when the caller leaves it blank.
pub const DEFAULT_TONE: &str = "technical";

/// What a finished run means for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The run completed; carries the `cli_summary` text.
    Success(String),
    /// A stage failed; carries the `error` text.
    Failure(String),
}

impl RunOutcome {
    /// Interprets a terminal state.
    ///
    /// `cli_summary` wins when present; otherwise `error` is surfaced. A state
    /// carrying neither is a wiring defect.
    pub fn from_terminal(state: &PipelineState) -> Result<Self, RunnerError> {
        if let Ok(summary) = state.str_field(keys::CLI_SUMMARY) {
            return Ok(Self::Success(summary.to_owned()));
        }
        if state.is_failed() {
            let message = match state.get(keys::ERROR) {
                Some(serde_json::Value::String(s)) => s.clone(),
                Some(other) => other.to_string(),
                None => String::new(),
            };
            return Ok(Self::Failure(message));
        }
        Err(RunnerError::MissingTerminalSignal {
            keys: state.keys().collect::<Vec<_>>().join(", "),
        })
    }

    /// The text to show the user.
    pub fn message(&self) -> &str {
        match self {
            Self::Success(m) | Self::Failure(m) => m,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

/// Runs one article generation per call.
#[derive(Debug)]
pub struct Runner {
    engine: PipelineEngine,
}

impl Runner {
    pub fn new(engine: PipelineEngine) -> Self {
        Self { engine }
    }

    /// Builds the initial state from `topic` and `tone`, runs the engine and
    /// interprets the result. A blank `tone` falls back to [`DEFAULT_TONE`].
    pub async fn run(&self, topic: &str, tone: Option<&str>) -> Result<RunOutcome, RunnerError> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(RunnerError::EmptyTopic);
        }
        let tone = tone
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(DEFAULT_TONE);

        info!(topic, tone, "Generating article");
        let terminal = self.engine.run(PipelineState::new(topic, tone)).await;
        RunOutcome::from_terminal(&terminal)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use serde_json::json;

    use super::*;
    use crate::{Stage, StateDelta, StageId, TransitionTable};

    /// Records the state it receives and finishes with a summary.
    struct Finisher {
        seen: Arc<Mutex<Option<PipelineState>>>,
    }

    #[async_trait]
    impl Stage for Finisher {
        fn id(&self) -> StageId {
            StageId::from_static("finish")
        }

        async fn execute(&self, state: PipelineState) -> PipelineState {
            *self.seen.lock().unwrap() = Some(state.clone());
            state
                .merge(StateDelta::new().with_value(keys::CLI_SUMMARY, json!("done")))
                .unwrap()
        }
    }

    fn runner() -> (Runner, Arc<Mutex<Option<PipelineState>>>) {
        let seen = Arc::new(Mutex::new(None));
        let engine = PipelineEngine::builder("runner-test")
            .stage(Finisher {
                seen: Arc::clone(&seen),
            })
            .transitions(TransitionTable::new(StageId::from_static("finish")))
            .build()
            .unwrap();
        (Runner::new(engine), seen)
    }

    #[tokio::test]
    async fn blank_tone_defaults_to_technical() {
        let (runner, seen) = runner();

        let outcome = runner.run("Rust", Some("   ")).await.unwrap();

        assert_eq!(outcome, RunOutcome::Success("done".into()));
        let state = seen.lock().unwrap().clone().unwrap();
        assert_eq!(state.str_field(keys::TONE).unwrap(), DEFAULT_TONE);
        assert_eq!(state.str_field(keys::TOPIC).unwrap(), "Rust");
    }

    #[tokio::test]
    async fn supplied_tone_is_kept() {
        let (runner, seen) = runner();
        runner.run("  Rust ", Some("casual")).await.unwrap();
        let state = seen.lock().unwrap().clone().unwrap();
        assert_eq!(state.str_field(keys::TONE).unwrap(), "casual");
        assert_eq!(state.str_field(keys::TOPIC).unwrap(), "Rust");
    }

    #[tokio::test]
    async fn empty_topic_is_rejected_before_running() {
        let (runner, seen) = runner();
        assert_eq!(runner.run(" ", None).await, Err(RunnerError::EmptyTopic));
        assert!(seen.lock().unwrap().is_none());
    }

    #[test]
    fn error_state_becomes_failure() {
        let state = PipelineState::new("Rust", "casual").fail("Planner output malformed.");
        assert_eq!(
            RunOutcome::from_terminal(&state).unwrap(),
            RunOutcome::Failure("Planner output malformed.".into())
        );
    }

    #[test]
    fn state_without_signal_is_a_defect() {
        let state = PipelineState::new("Rust", "casual");
        assert!(matches!(
            RunOutcome::from_terminal(&state),
            Err(RunnerError::MissingTerminalSignal { .. })
        ));
    }
}
