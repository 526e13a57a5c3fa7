//! Test doubles for the collaborator ports.

use std::collections::{BTreeMap, VecDeque};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use pipeline::{ArtifactError, ArtifactStore, Clock, GenerationError, TextGenerator, Timestamp};

/// Replays canned responses in order and records every prompt it receives.
pub struct ScriptedGenerator {
    responses: Mutex<VecDeque<Result<String, GenerationError>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    pub fn new<I, S>(responses: I) -> Arc<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::scripted(responses.into_iter().map(|r| Ok(r.into())))
    }

    pub fn failing(error: GenerationError) -> Arc<Self> {
        Self::scripted([Err(error)])
    }

    pub fn scripted(
        responses: impl IntoIterator<Item = Result<String, GenerationError>>,
    ) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into_iter().collect()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        self.prompts.lock().unwrap().push(prompt.to_owned());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(GenerationError::EmptyResponse))
    }
}

/// Keeps written artifacts in memory under a fake `/out` directory.
#[derive(Default)]
pub struct MemoryStore {
    files: Mutex<BTreeMap<String, String>>,
    fail_with: Option<ArtifactError>,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing(error: ArtifactError) -> Arc<Self> {
        Arc::new(Self {
            files: Mutex::default(),
            fail_with: Some(error),
        })
    }

    pub fn files(&self) -> BTreeMap<String, String> {
        self.files.lock().unwrap().clone()
    }

    fn put(&self, name: &str, contents: String) -> Result<PathBuf, ArtifactError> {
        if let Some(e) = &self.fail_with {
            return Err(e.clone());
        }
        self.files.lock().unwrap().insert(name.to_owned(), contents);
        Ok(PathBuf::from("/out").join(name))
    }
}

#[async_trait]
impl ArtifactStore for MemoryStore {
    async fn write_text(&self, name: &str, contents: &str) -> Result<PathBuf, ArtifactError> {
        self.put(name, contents.to_owned())
    }

    async fn write_json(
        &self,
        name: &str,
        value: &serde_json::Value,
    ) -> Result<PathBuf, ArtifactError> {
        self.put(name, serde_json::to_string_pretty(value).unwrap())
    }
}

/// Always reports 2024-05-01 12:30:45 UTC.
pub struct FixedClock;

impl FixedClock {
    pub const COMPACT: &'static str = "20240501-123045";
}

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        Timestamp::from_utc(Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 45).unwrap())
    }
}
