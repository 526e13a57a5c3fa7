//! Top-level error types for the BlogSmith pipeline domain.
//!
//! [`EngineBuildError`] covers defects in how a pipeline was assembled; these
//! are reported before any stage runs. [`RunnerError`] covers conditions the
//! runner cannot turn into a user-facing outcome.
//!
//! Stage failures are deliberately absent here: a failing stage never returns
//! an error to the engine, it returns a state carrying the `error` key (see
//! [`crate::Stage`]). Per-stage error taxonomies live with the stages.

use thiserror::Error;

use crate::StageId;

// ---------------------------------------------------------------------------
// Construction-time errors
// ---------------------------------------------------------------------------

/// Errors raised by [`crate::PipelineEngineBuilder::build`].
///
/// Every variant is a wiring defect: the engine is never constructed in an
/// inconsistent state, so the drive loop can assume that every identifier it
/// looks up resolves.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineBuildError {
    /// No transition table was supplied, or it has no entry stage.
    #[error("pipeline '{pipeline}' has no entry stage")]
    MissingEntry {
        /// Name of the pipeline being built.
        pipeline: String,
    },

    /// Two registered stages report the same identifier.
    #[error("stage '{stage}' is registered more than once")]
    DuplicateStage {
        /// The repeated identifier.
        stage: StageId,
    },

    /// The transition table refers to a stage that was never registered.
    #[error("transition table references unregistered stage '{stage}'")]
    DanglingReference {
        /// The identifier that does not resolve.
        stage: StageId,
    },

    /// Following next-on-success edges from the entry revisits a stage.
    ///
    /// Such a pipeline could only terminate by failing.
    #[error("success path revisits stage '{stage}'")]
    Cycle {
        /// The first stage reached twice.
        stage: StageId,
    },
}

// ---------------------------------------------------------------------------
// Runner errors
// ---------------------------------------------------------------------------

/// Errors raised by [`crate::Runner`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RunnerError {
    /// The caller supplied an empty or whitespace-only topic.
    #[error("a topic is required")]
    EmptyTopic,

    /// The terminal state carries neither a summary nor an error.
    ///
    /// Indicates a stage set whose last stage does not produce `cli_summary`.
    #[error("pipeline finished without a summary or an error (keys: {keys})")]
    MissingTerminalSignal {
        /// Comma-separated keys of the terminal state, for diagnosis.
        keys: String,
    },
}
