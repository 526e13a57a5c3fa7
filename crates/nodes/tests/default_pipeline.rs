//! End-to-end runs of the default article pipeline with a scripted generator
//! and the real filesystem store.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use nodes::{default_engine, Collaborators};
use pipeline::{
    keys, Clock, GenerationError, PipelineState, RunOutcome, Runner, StageOutcome, TextGenerator,
    Timestamp,
};
use storage::FsArtifactStore;

struct Scripted {
    responses: Mutex<VecDeque<Result<String, GenerationError>>>,
    calls: Mutex<usize>,
}

impl Scripted {
    fn new(responses: Vec<Result<&str, GenerationError>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(
                responses
                    .into_iter()
                    .map(|r| r.map(str::to_owned))
                    .collect(),
            ),
            calls: Mutex::new(0),
        })
    }

    fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl TextGenerator for Scripted {
    async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
        *self.calls.lock().unwrap() += 1;
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(GenerationError::EmptyResponse))
    }
}

struct Fixed;

impl Clock for Fixed {
    fn now(&self) -> Timestamp {
        Timestamp::from_utc(Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 45).unwrap())
    }
}

const PLAN: &str = "Ownership|Borrowing|Lifetimes\nDepth: intermediate";
const DRAFT: &str = "word1 word2 word3";
const SEO: &str = "```json\n{\n  \"title\": \"Rust Guide\",\n  \"meta_description\": \"All about Rust\",\n  \"keywords\": [\"Rust\", \"technology\", \"insights\"],\n  \"reading_time\": \"1 min\",\n  \"slug\": \"rust-guide\"\n}\n```";

fn collaborators(generator: Arc<Scripted>, dir: &std::path::Path) -> Collaborators {
    Collaborators {
        generator,
        store: Arc::new(FsArtifactStore::new(dir)),
        clock: Arc::new(Fixed),
    }
}

fn written_files(dir: &std::path::Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[tokio::test]
async fn full_run_writes_artifacts_and_summary() {
    let dir = tempfile::tempdir().unwrap();
    let generator = Scripted::new(vec![Ok(PLAN), Ok(DRAFT), Ok(SEO)]);
    let engine = default_engine(collaborators(generator.clone(), dir.path())).unwrap();

    let report = engine
        .run_with_report(PipelineState::new("Rust", "casual"))
        .await;

    assert!(report.succeeded(), "{:?}", report.final_state.error());
    assert_eq!(
        report.executed(),
        vec!["planning", "research", "writing", "metadata", "export"]
    );
    assert_eq!(generator.calls(), 3);

    let state = &report.final_state;
    let subtopics: Vec<String> = state.field(keys::SUBTOPICS).unwrap();
    assert_eq!(subtopics, vec!["Ownership", "Borrowing", "Lifetimes"]);
    assert_eq!(state.str_field(keys::DEPTH_LEVEL).unwrap(), "intermediate");
    assert_eq!(state.str_field(keys::DRAFT).unwrap(), DRAFT);
    assert_eq!(state.str_field(keys::TOPIC).unwrap(), "Rust");
    assert!(!state.is_failed());

    assert_eq!(
        written_files(dir.path()),
        vec![
            "rust-guide-20240501-123045-metadata.json",
            "rust-guide-20240501-123045.md",
        ]
    );
    let markdown =
        std::fs::read_to_string(dir.path().join("rust-guide-20240501-123045.md")).unwrap();
    assert_eq!(markdown, "# Rust Guide\n\nword1 word2 word3\n");

    let summary = state.str_field(keys::CLI_SUMMARY).unwrap();
    assert!(summary.contains("📊 Word Count: 3"));
    let markdown_path = dir.path().join("rust-guide-20240501-123045.md");
    assert!(summary.contains(&markdown_path.display().to_string()));
}

#[tokio::test]
async fn runner_surfaces_summary_on_success() {
    let dir = tempfile::tempdir().unwrap();
    let generator = Scripted::new(vec![Ok(PLAN), Ok(DRAFT), Ok(SEO)]);
    let runner = Runner::new(default_engine(collaborators(generator, dir.path())).unwrap());

    let outcome = runner.run("Rust", None).await.unwrap();

    assert!(outcome.is_success());
    assert!(outcome.message().contains("🚀 Blog Generation Complete"));
}

#[tokio::test]
async fn malformed_plan_stops_before_research() {
    let dir = tempfile::tempdir().unwrap();
    let generator = Scripted::new(vec![Ok("Ownership|Borrowing")]);
    let engine = default_engine(collaborators(generator.clone(), dir.path())).unwrap();

    let report = engine
        .run_with_report(PipelineState::new("Rust", "casual"))
        .await;

    assert_eq!(report.final_state.error(), Some("Planner output malformed."));
    assert_eq!(report.executed(), vec!["planning"]);
    assert_eq!(generator.calls(), 1);
    assert!(written_files(dir.path()).is_empty());
}

#[tokio::test]
async fn writer_failure_skips_metadata_and_export() {
    let dir = tempfile::tempdir().unwrap();
    let generator = Scripted::new(vec![
        Ok(PLAN),
        Err(GenerationError::Rejected("quota exceeded".into())),
        Ok(SEO),
    ]);
    let runner = Runner::new(default_engine(collaborators(generator.clone(), dir.path())).unwrap());

    let outcome = runner.run("Rust", Some("casual")).await.unwrap();

    match outcome {
        RunOutcome::Failure(message) => {
            assert!(message.starts_with("Writer failed: "), "{message}");
        }
        other => panic!("expected failure, got {other:?}"),
    }
    assert_eq!(generator.calls(), 2);
    assert!(written_files(dir.path()).is_empty());
}

#[tokio::test]
async fn invalid_seo_json_fails_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let generator = Scripted::new(vec![Ok(PLAN), Ok(DRAFT), Ok("no json here")]);
    let engine = default_engine(collaborators(generator, dir.path())).unwrap();

    let report = engine
        .run_with_report(PipelineState::new("Rust", "casual"))
        .await;

    let last = report.stages.last().unwrap();
    assert_eq!(last.stage.as_str(), "metadata");
    assert!(matches!(
        &last.outcome,
        StageOutcome::Failed { message } if message.starts_with("SEO failed: ")
    ));
    assert!(!report.final_state.contains(keys::CLI_SUMMARY));
}

#[tokio::test]
async fn terminal_state_has_exactly_one_signal() {
    let scripts: Vec<Vec<Result<&str, GenerationError>>> = vec![
        vec![Ok(PLAN), Ok(DRAFT), Ok(SEO)],
        vec![Ok("bad")],
        vec![Ok(PLAN), Err(GenerationError::EmptyResponse)],
        vec![Ok(PLAN), Ok(DRAFT), Ok("{}")],
    ];
    for script in scripts {
        let dir = tempfile::tempdir().unwrap();
        let engine = default_engine(collaborators(Scripted::new(script), dir.path())).unwrap();

        let state = engine.run(PipelineState::new("Rust", "casual")).await;

        assert!(
            state.is_failed() ^ state.contains(keys::CLI_SUMMARY),
            "keys: {:?}",
            state.keys().collect::<Vec<_>>()
        );
    }
}
