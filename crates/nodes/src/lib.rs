//! BlogSmith pipeline stage implementations and collaborator gateways.
//!
//! This crate provides the five stages of the default article pipeline
//! (planning through export), the gateways that wrap every call into the
//! generation and storage ports, and [`default_engine`], which wires the
//! stages into a [`pipeline::PipelineEngine`].
//!
//! ## Architectural Layer
//!
//! **Orchestration layer.** Stages sequence calls between the domain types in
//! the [`pipeline`] crate and the infrastructure ports (text generation,
//! artifact storage, clock). They hold their collaborators as injected
//! `Arc<dyn _>` handles and never reach for global state.

pub mod assembly;
pub mod gateway;
pub mod prompts;
pub mod stage_ids;
pub mod stages;

#[cfg(test)]
mod testing;

pub use assembly::{default_engine, default_transitions, Collaborators, PIPELINE_NAME};
pub use gateway::{ArtifactGateway, GatewayError, GenerationGateway};
pub use stages::{
    ExportError, ExportStage, MetadataStage, Plan, PlannerError, PlanningStage, ResearchError,
    ResearchStage, SeoError, WriterError, WritingStage,
};
