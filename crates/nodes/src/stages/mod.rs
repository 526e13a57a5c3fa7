//! The five stages of the default article pipeline, in run order:
//!
//! 1. [`PlanningStage`] - subtopics and depth from the topic
//! 2. [`ResearchStage`] - background material and keywords
//! 3. [`WritingStage`] - the markdown draft
//! 4. [`MetadataStage`] - SEO metadata as JSON
//! 5. [`ExportStage`] - artifacts on disk and the run summary

pub mod export;
pub mod metadata;
pub mod planning;
pub mod research;
pub mod writing;

pub use export::{ExportError, ExportStage};
pub use metadata::{MetadataStage, SeoError};
pub use planning::{Plan, PlannerError, PlanningStage};
pub use research::{ResearchError, ResearchStage};
pub use writing::{WriterError, WritingStage};
