//! BlogSmith CLI entry point.
//!
//! This binary is the composition root for the entire system. Responsibilities:
//!
//! 1. **Load configuration** from the environment (see [`config`]).
//! 2. **Wire observability**: `tracing-subscriber` on stderr, plus an
//!    OpenTelemetry OTLP exporter when configured. All `tracing` spans and
//!    structured events emitted by every crate in the workspace flow through it.
//! 3. **Construct infrastructure**: the Gemini generator, the filesystem
//!    artifact store and the system clock, injected into the default pipeline.
//! 4. **Run once**: prompt for a topic and a tone, run the pipeline, and print
//!    either the summary or the error to stdout.

mod config;
mod observability;
mod prompt;

use std::sync::Arc;

use anyhow::Context;
use llm::GeminiProvider;
use nodes::{default_engine, Collaborators};
use pipeline::{Runner, SystemClock, DEFAULT_TONE};
use tokio::io::{AsyncBufRead, AsyncWrite};
use storage::FsArtifactStore;
use tracing::info;

use crate::config::CliConfig;
use crate::prompt::Prompter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::from_env().context("invalid configuration")?;
    let _telemetry = observability::init(config.log_format, config.otlp_endpoint.as_deref())?;
    info!(
        model = %config.gemini.model,
        output_dir = %config.output_dir.display(),
        "Configuration loaded"
    );

    let generator = GeminiProvider::new(config.gemini).context("failed to create Gemini client")?;
    let engine = default_engine(Collaborators {
        generator: Arc::new(generator),
        store: Arc::new(FsArtifactStore::new(config.output_dir)),
        clock: Arc::new(SystemClock),
    })?;
    let runner = Runner::new(engine);

    generate_once(&runner, &mut Prompter::stdio()).await
}

/// Asks for a topic and tone, runs the pipeline and prints the outcome.
///
/// A failed pipeline run is still a completed session: its error is printed
/// like the summary would be. Only I/O failures and a blank topic are errors.
async fn generate_once<R, W>(runner: &Runner, prompter: &mut Prompter<R, W>) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let topic = prompter.ask("Enter blog topic: ").await?;
    let tone = prompter
        .ask(&format!(
            "Enter content tone (technical, casual, professional) [default: {DEFAULT_TONE}]: "
        ))
        .await?;

    let outcome = runner.run(&topic, Some(&tone)).await?;
    prompter.say(outcome.message()).await?;
    Ok(())
}
