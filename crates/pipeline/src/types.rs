//! Shared value types for the BlogSmith pipeline domain.
//!
//! Unlike the newtype identifiers in [`crate::identifiers`], these types are the
//! structured payloads stages store under well-known [`crate::keys`] and read
//! back from later in the run.

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, Local, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Research
// ---------------------------------------------------------------------------

/// Background material gathered for the article, stored under
/// [`crate::keys::RESEARCH_DATA`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResearchData {
    /// Quotations the writer may cite.
    pub quotes: Vec<String>,
    /// Recent news items relevant to the topic.
    pub news: Vec<String>,
    /// Keywords the article and its metadata should include.
    pub keywords: Vec<String>,
}

// ---------------------------------------------------------------------------
// SEO metadata
// ---------------------------------------------------------------------------

/// Search-engine metadata for the finished article, stored under
/// [`crate::keys::SEO_DATA`] and written verbatim as the JSON metadata artifact.
///
/// `reading_time` is kept as a raw JSON value because generators answer with
/// either a number of minutes or a phrase such as `"6 min read"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeoData {
    pub title: String,
    #[serde(default)]
    pub meta_description: String,
    pub keywords: Vec<String>,
    #[serde(default)]
    pub reading_time: serde_json::Value,
    pub slug: String,
}

// ---------------------------------------------------------------------------
// Exports
// ---------------------------------------------------------------------------

/// Kind of artifact produced by the export stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    /// The article body as a markdown document.
    Markdown,
    /// The [`SeoData`] as a pretty-printed JSON document.
    Metadata,
}

/// Artifact kind → written file path, stored under [`crate::keys::EXPORTS`].
pub type Exports = BTreeMap<ArtifactKind, String>;

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// A wall-clock timestamp together with the UTC offset it was read in.
///
/// Wraps [`chrono::DateTime<FixedOffset>`] so callers never depend on `chrono`
/// types directly; the underlying representation can change without affecting
/// the domain API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(DateTime<FixedOffset>);

impl Timestamp {
    /// Returns the current time in the host's local time zone.
    pub fn now() -> Self {
        Self(Local::now().fixed_offset())
    }

    /// Creates a [`Timestamp`] from a UTC instant, keeping UTC wall-clock fields.
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(dt.fixed_offset())
    }

    /// Creates a [`Timestamp`] that keeps `dt`'s wall-clock fields and offset.
    pub fn from_offset(dt: DateTime<FixedOffset>) -> Self {
        Self(dt)
    }

    /// Renders the wall-clock fields as `YYYYMMDD-HHMMSS`, the form used in
    /// artifact file names and the run summary.
    pub fn compact(self) -> String {
        self.0.format("%Y%m%d-%H%M%S").to_string()
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}
