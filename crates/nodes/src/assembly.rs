//! Wiring of the default article pipeline.

use std::sync::Arc;

use pipeline::{
    ArtifactStore, Clock, EngineBuildError, Next, PipelineEngine, StageId, TextGenerator,
    TransitionTable,
};

use crate::stage_ids;
use crate::stages::{ExportStage, MetadataStage, PlanningStage, ResearchStage, WritingStage};

/// Name reported on the `pipeline_run` span.
pub const PIPELINE_NAME: &str = "article";

/// Collaborators the default stages are built from.
#[derive(Clone)]
pub struct Collaborators {
    pub generator: Arc<dyn TextGenerator>,
    pub store: Arc<dyn ArtifactStore>,
    pub clock: Arc<dyn Clock>,
}

/// planning → research → writing → metadata → export → terminal.
pub fn default_transitions() -> TransitionTable {
    let id = StageId::from_static;
    TransitionTable::new(id(stage_ids::PLANNING))
        .on_success(id(stage_ids::PLANNING), Next::Stage(id(stage_ids::RESEARCH)))
        .on_success(id(stage_ids::RESEARCH), Next::Stage(id(stage_ids::WRITING)))
        .on_success(id(stage_ids::WRITING), Next::Stage(id(stage_ids::METADATA)))
        .on_success(id(stage_ids::METADATA), Next::Stage(id(stage_ids::EXPORT)))
        .on_success(id(stage_ids::EXPORT), Next::Terminal)
}

/// Builds the engine for the default article pipeline.
pub fn default_engine(collaborators: Collaborators) -> Result<PipelineEngine, EngineBuildError> {
    let Collaborators {
        generator,
        store,
        clock,
    } = collaborators;

    PipelineEngine::builder(PIPELINE_NAME)
        .stage(PlanningStage::new(Arc::clone(&generator)))
        .stage(ResearchStage::new())
        .stage(WritingStage::new(Arc::clone(&generator)))
        .stage(MetadataStage::new(generator))
        .stage(ExportStage::new(store, clock))
        .transitions(default_transitions())
        .build()
}
