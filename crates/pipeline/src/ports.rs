//! Port traits for the external collaborators the stages call into.
//!
//! Infrastructure crates implement these (`llm` for [`TextGenerator`],
//! `storage` for [`ArtifactStore`]); stages receive them as `Arc<dyn _>` at
//! construction, so tests can substitute doubles without touching globals.

use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

use crate::Timestamp;

// ---------------------------------------------------------------------------
// Text generation
// ---------------------------------------------------------------------------

/// Failures of a [`TextGenerator`] call.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GenerationError {
    /// The provider could not be reached or the connection failed mid-call.
    #[error("generation service unavailable: {0}")]
    Unavailable(String),

    /// The provider answered but refused the request (quota, auth, model error,
    /// safety block).
    #[error("generation request rejected: {0}")]
    Rejected(String),

    /// The provider answered successfully but returned no text.
    #[error("generation returned no text")]
    EmptyResponse,
}

/// An asynchronous text-completion capability.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Completes `prompt`, returning the generated text.
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

// ---------------------------------------------------------------------------
// Artifact storage
// ---------------------------------------------------------------------------

/// Failures of an [`ArtifactStore`] write.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ArtifactError {
    /// The requested file name is empty or would escape the store's directory.
    #[error("invalid artifact name '{0}'")]
    InvalidName(String),

    /// The underlying write failed.
    #[error("failed to write '{path}': {message}")]
    Io { path: String, message: String },

    /// A JSON artifact could not be serialised.
    #[error("failed to encode '{name}': {message}")]
    Encode { name: String, message: String },
}

/// Durable storage for generated artifacts.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Writes `contents` to the artifact called `name`, returning the absolute
    /// path written.
    async fn write_text(&self, name: &str, contents: &str) -> Result<PathBuf, ArtifactError>;

    /// Writes `value` as pretty-printed JSON to the artifact called `name`,
    /// returning the absolute path written.
    async fn write_json(
        &self,
        name: &str,
        value: &serde_json::Value,
    ) -> Result<PathBuf, ArtifactError>;
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// The host wall clock, read in the local time zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}
