//! The accumulated pipeline state threaded from stage to stage.
//!
//! [`PipelineState`] is an open, append-only record: a map from string keys to
//! JSON values. Different stages contribute disjoint key sets, so the record is
//! kept open rather than fixing every field up front; the well-known keys are
//! listed in [`keys`] together with the stage that writes each of them.
//!
//! A state is a value. Stages never mutate the state they are handed; they
//! describe what they produced as a [`StateDelta`], and [`PipelineState::merge`]
//! returns the union as a new state.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Well-known state keys.
pub mod keys {
    /// Article topic. Supplied by the runner.
    pub const TOPIC: &str = "topic";
    /// Writing tone. Supplied by the runner.
    pub const TONE: &str = "tone";
    /// Ordered subtopic list. Written by planning.
    pub const SUBTOPICS: &str = "subtopics";
    /// Recommended depth. Written by planning.
    pub const DEPTH_LEVEL: &str = "depth_level";
    /// [`crate::ResearchData`]. Written by research.
    pub const RESEARCH_DATA: &str = "research_data";
    /// Article body in markdown. Written by writing.
    pub const DRAFT: &str = "draft";
    /// [`crate::SeoData`]. Written by metadata.
    pub const SEO_DATA: &str = "seo_data";
    /// Human-readable run report. Written by export.
    pub const CLI_SUMMARY: &str = "cli_summary";
    /// [`crate::Exports`]. Written by export.
    pub const EXPORTS: &str = "exports";
    /// Failure diagnostic. Its presence terminates the pipeline.
    pub const ERROR: &str = "error";
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Problems reading from or extending a [`PipelineState`].
#[derive(Debug, Error, PartialEq)]
pub enum StateError {
    /// A key the caller depends on has not been written by any earlier stage.
    #[error("missing state key '{key}'")]
    MissingKey { key: String },

    /// A key is present but its value does not have the expected shape.
    #[error("state key '{key}' has an unexpected shape: {reason}")]
    InvalidValue { key: String, reason: String },

    /// A value could not be converted to JSON for storage.
    #[error("state key '{key}' could not be encoded: {reason}")]
    Encode { key: String, reason: String },

    /// A delta tried to change the value of a key that is already present.
    #[error("state key '{key}' is already set and cannot be overwritten")]
    KeyConflict { key: String },
}

// ---------------------------------------------------------------------------
// Delta
// ---------------------------------------------------------------------------

/// The keys one stage produced, to be merged into the accumulated state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateDelta {
    entries: BTreeMap<String, Value>,
}

impl StateDelta {
    /// Creates an empty delta.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a raw JSON value under `key`.
    pub fn with_value(mut self, key: impl Into<String>, value: Value) -> Self {
        self.entries.insert(key.into(), value);
        self
    }

    /// Serialises `value` and adds it under `key`.
    pub fn with<T: Serialize + ?Sized>(
        self,
        key: impl Into<String>,
        value: &T,
    ) -> Result<Self, StateError> {
        let key = key.into();
        let encoded = serde_json::to_value(value).map_err(|e| StateError::Encode {
            key: key.clone(),
            reason: e.to_string(),
        })?;
        Ok(self.with_value(key, encoded))
    }
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// The evolving record of accumulated work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PipelineState {
    entries: BTreeMap<String, Value>,
}

impl PipelineState {
    /// Creates the initial state carrying `topic` and `tone`.
    pub fn new(topic: impl Into<String>, tone: impl Into<String>) -> Self {
        let mut entries = BTreeMap::new();
        entries.insert(keys::TOPIC.to_owned(), Value::String(topic.into()));
        entries.insert(keys::TONE.to_owned(), Value::String(tone.into()));
        Self { entries }
    }

    /// Creates a state from arbitrary entries.
    ///
    /// Intended for engines driving stage sets other than the default article
    /// pipeline, and for tests.
    pub fn from_entries(entries: impl IntoIterator<Item = (String, Value)>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    /// Returns the raw value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Returns `true` if `key` is present.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Iterates the present keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Number of keys present.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the state carries no keys at all.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the failure diagnostic, if a stage has failed.
    pub fn error(&self) -> Option<&str> {
        self.entries.get(keys::ERROR).and_then(Value::as_str)
    }

    /// Returns `true` if the state carries an `error` key, whatever its value.
    ///
    /// This is the only key the engine inspects.
    pub fn is_failed(&self) -> bool {
        self.entries.contains_key(keys::ERROR)
    }

    /// Returns the string stored under `key`.
    pub fn str_field(&self, key: &str) -> Result<&str, StateError> {
        match self.entries.get(key) {
            None => Err(StateError::MissingKey { key: key.to_owned() }),
            Some(Value::String(s)) => Ok(s),
            Some(_) => Err(StateError::InvalidValue {
                key: key.to_owned(),
                reason: "expected a string".to_owned(),
            }),
        }
    }

    /// Deserialises the value stored under `key` into `T`.
    pub fn field<T: DeserializeOwned>(&self, key: &str) -> Result<T, StateError> {
        let value = self
            .entries
            .get(key)
            .ok_or_else(|| StateError::MissingKey { key: key.to_owned() })?;
        T::deserialize(value).map_err(|e| StateError::InvalidValue {
            key: key.to_owned(),
            reason: e.to_string(),
        })
    }

    /// Returns the union of this state and `delta` as a new state.
    ///
    /// Re-stating a key with an identical value is accepted; changing the value
    /// of a present key is a [`StateError::KeyConflict`] and leaves `self`
    /// untouched.
    pub fn merge(&self, delta: StateDelta) -> Result<Self, StateError> {
        if let Some(key) = delta
            .entries
            .iter()
            .find(|(k, v)| self.entries.get(*k).is_some_and(|existing| existing != *v))
            .map(|(k, _)| k.clone())
        {
            return Err(StateError::KeyConflict { key });
        }

        let mut entries = self.entries.clone();
        entries.extend(delta.entries);
        Ok(Self { entries })
    }

    /// Returns this state with the `error` key set to `message`.
    pub fn fail(&self, message: impl Into<String>) -> Self {
        let mut entries = self.entries.clone();
        entries.insert(keys::ERROR.to_owned(), Value::String(message.into()));
        Self { entries }
    }
}
