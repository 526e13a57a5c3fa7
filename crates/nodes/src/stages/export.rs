use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use pipeline::{
    keys, ArtifactKind, ArtifactStore, Clock, Exports, FallibleStage, PipelineState, SeoData,
    Slug, StageId, StateDelta, StateError,
};
use thiserror::Error;
use tracing::info;

use crate::gateway::{ArtifactGateway, GatewayError};
use crate::stage_ids;

/// Keywords listed in the summary.
const SUMMARY_KEYWORDS: usize = 5;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Export failed: {0}")]
    State(#[from] StateError),

    #[error("Export failed: seo_data.{field} is empty")]
    EmptyField { field: &'static str },

    #[error("Export failed: slug '{0}' has no filesystem-safe characters")]
    UnusableSlug(String),

    #[error("Export failed: {0}")]
    Write(#[from] GatewayError),
}

/// Writes the markdown and JSON metadata artifacts and summarises the run.
///
/// Both files share the base name `<slug>-<YYYYMMDD-HHMMSS>`.
///
/// # State Requirements
/// - Input: `seo_data` ([`SeoData`]; `title`, `keywords` and `slug` required)
/// - Input: `draft` (string)
///
/// # State Outputs
/// - `cli_summary` (string)
/// - `exports` ([`Exports`]: `markdown` and `metadata` → absolute path)
pub struct ExportStage {
    store: ArtifactGateway,
    clock: Arc<dyn Clock>,
}

impl ExportStage {
    pub fn new(store: Arc<dyn ArtifactStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store: ArtifactGateway::new(StageId::from_static(stage_ids::EXPORT), store),
            clock,
        }
    }
}

#[async_trait]
impl FallibleStage for ExportStage {
    type Error = ExportError;

    fn id(&self) -> StageId {
        StageId::from_static(stage_ids::EXPORT)
    }

    async fn run(&self, state: &PipelineState) -> Result<StateDelta, ExportError> {
        let seo: SeoData = state.field(keys::SEO_DATA)?;
        let draft = state.str_field(keys::DRAFT)?;
        if seo.title.trim().is_empty() {
            return Err(ExportError::EmptyField { field: "title" });
        }
        let slug = Slug::sanitize(&seo.slug)
            .ok_or_else(|| ExportError::UnusableSlug(seo.slug.clone()))?;

        let generated_at = self.clock.now().compact();
        let base = format!("{slug}-{generated_at}");

        let markdown = self
            .store
            .write_text(&format!("{base}.md"), &markdown_document(&seo.title, draft))
            .await?;
        let metadata_json = serde_json::to_value(&seo).map_err(|e| StateError::Encode {
            key: keys::SEO_DATA.to_owned(),
            reason: e.to_string(),
        })?;
        let metadata = self
            .store
            .write_json(&format!("{base}-metadata.json"), &metadata_json)
            .await?;

        let word_count = draft.split_whitespace().count();
        info!(%slug, word_count, "Artifacts exported");

        let summary = render_summary(&seo, word_count, &markdown, &metadata, &generated_at);
        let exports: Exports = [
            (ArtifactKind::Markdown, markdown.display().to_string()),
            (ArtifactKind::Metadata, metadata.display().to_string()),
        ]
        .into_iter()
        .collect();

        Ok(StateDelta::new()
            .with(keys::CLI_SUMMARY, &summary)?
            .with(keys::EXPORTS, &exports)?)
    }
}

/// `# <title>\n\n<draft>\n`
pub fn markdown_document(title: &str, draft: &str) -> String {
    format!("# {title}\n\n{draft}\n")
}

fn render_summary(
    seo: &SeoData,
    word_count: usize,
    markdown: &Path,
    metadata: &Path,
    generated_at: &str,
) -> String {
    let keywords = seo
        .keywords
        .iter()
        .take(SUMMARY_KEYWORDS)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "
🚀 Blog Generation Complete
{rule}
📝 Title: {title}
📊 Word Count: {word_count}
📂 Files Created:
  - {markdown}
  - {metadata}
🔑 Keywords: {keywords}
⏱️ Generation Time: {generated_at}
",
        rule = "-".repeat(40),
        title = seo.title,
        markdown = markdown.display(),
        metadata = metadata.display(),
    )
}
