//! BlogSmith LLM provider infrastructure adapter.
//!
//! Implements the [`pipeline::TextGenerator`] trait for Google's Gemini API.
//! Additional providers are added as new modules in this crate without any
//! changes to the `pipeline` crate.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** All HTTP transport, request formatting and response
//! parsing live here. The [`pipeline`] crate sees only
//! [`pipeline::TextGenerator`] and [`pipeline::GenerationError`].
//!
//! There is no retry or back-off: a failed call fails the stage that made it.

pub mod gemini;

pub use gemini::{
    GeminiConfig, GeminiError, GeminiProvider, DEFAULT_BASE_URL, DEFAULT_MODEL,
    DEFAULT_TEMPERATURE,
};
