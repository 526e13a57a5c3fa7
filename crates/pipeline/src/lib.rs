//! Core orchestration domain for BlogSmith.
//!
//! This crate contains the pipeline state record, the stage contract, the
//! transition policy, the engine that drives stages to a terminal state, the
//! runner that interprets that state, and the port traits infrastructure crates
//! implement. Infrastructure crates implement the traits defined here; they
//! never add domain rules.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate has no I/O dependencies.
//! It defines *what* is needed; infrastructure crates define *how* to supply it.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`StageId`, `Slug`, `PipelineRunId`) |
//! | [`types`] | Shared value types (`ResearchData`, `SeoData`, `Timestamp`, etc.) |
//! | [`state`] | `PipelineState`, `StateDelta` and the well-known [`keys`] |
//! | [`stage`] | The `Stage` contract and the `FallibleStage` adapter |
//! | [`transition`] | The data-driven transition policy |
//! | [`engine`] | `PipelineEngine`, its builder, and run reports |
//! | [`runner`] | `Runner` and `RunOutcome` |
//! | [`ports`] | `TextGenerator`, `ArtifactStore`, `Clock` |
//! | [`errors`] | Construction and runner error types |

pub mod engine;
pub mod errors;
pub mod identifiers;
pub mod ports;
pub mod runner;
pub mod stage;
pub mod state;
pub mod transition;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use engine::{PipelineEngine, PipelineEngineBuilder, RunReport, StageOutcome, StageRecord};
pub use errors::{EngineBuildError, RunnerError};
pub use identifiers::{PipelineRunId, Slug, StageId};
pub use ports::{ArtifactError, ArtifactStore, Clock, GenerationError, SystemClock, TextGenerator};
pub use runner::{RunOutcome, Runner, DEFAULT_TONE};
pub use stage::{FallibleStage, Stage};
pub use state::{keys, PipelineState, StateDelta, StateError};
pub use transition::{Next, TransitionTable};
pub use types::{ArtifactKind, Exports, ResearchData, SeoData, Timestamp};
