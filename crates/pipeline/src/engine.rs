//! The pipeline engine: a small state machine over registered stages.
//!
//! States are the registered stage identifiers plus terminal. Starting from the
//! table's entry, the engine runs one stage, commits the state it returned, and
//! asks the [`TransitionTable`] where to go next, until it is told to stop.
//! Exactly one stage is in flight at any time.
//!
//! The engine reads no key other than `error`; it is agnostic to what the
//! stages produce.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{error, info, info_span, warn, Instrument};

use crate::{EngineBuildError, Next, PipelineRunId, PipelineState, Stage, StageId, TransitionTable};

// ---------------------------------------------------------------------------
// Run report
// ---------------------------------------------------------------------------

/// How a single stage execution ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageOutcome {
    Succeeded,
    Failed {
        /// The `error` value the stage returned.
        message: String,
    },
}

/// One stage execution within a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageRecord {
    pub stage: StageId,
    pub outcome: StageOutcome,
    pub elapsed: Duration,
}

/// Everything a run produced: the terminal state and the trail that led to it.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub run_id: PipelineRunId,
    pub final_state: PipelineState,
    /// Executed stages in execution order.
    pub stages: Vec<StageRecord>,
}

impl RunReport {
    /// Returns `true` if the terminal state carries no `error`.
    pub fn succeeded(&self) -> bool {
        !self.final_state.is_failed()
    }

    /// Identifiers of the executed stages, in order.
    pub fn executed(&self) -> Vec<&str> {
        self.stages.iter().map(|r| r.stage.as_str()).collect()
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Owns the stage registry and transition table and drives a run to terminal.
pub struct PipelineEngine {
    name: String,
    stages: HashMap<StageId, Arc<dyn Stage>>,
    table: TransitionTable,
}

impl std::fmt::Debug for PipelineEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut stages: Vec<_> = self.stages.keys().map(StageId::as_str).collect();
        stages.sort_unstable();
        f.debug_struct("PipelineEngine")
            .field("name", &self.name)
            .field("stages", &stages)
            .field("table", &self.table)
            .finish()
    }
}

impl PipelineEngine {
    /// Starts assembling an engine called `name`.
    pub fn builder(name: impl Into<String>) -> PipelineEngineBuilder {
        PipelineEngineBuilder {
            name: name.into(),
            stages: Vec::new(),
            table: None,
        }
    }

    /// The pipeline name used in log events.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of registered stages.
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// Runs from the entry stage to terminal and returns the final state.
    pub async fn run(&self, initial: PipelineState) -> PipelineState {
        self.run_with_report(initial).await.final_state
    }

    /// Runs from the entry stage to terminal, recording each stage execution.
    pub async fn run_with_report(&self, initial: PipelineState) -> RunReport {
        let run_id = PipelineRunId::new_random();
        let span = info_span!("pipeline_run", pipeline = %self.name, run_id = %run_id);
        self.drive(run_id, initial).instrument(span).await
    }

    async fn drive(&self, run_id: PipelineRunId, initial: PipelineState) -> RunReport {
        let mut records = Vec::new();

        if initial.is_failed() {
            warn!("Initial state already carries an error; no stage will run");
            return RunReport {
                run_id,
                final_state: initial,
                stages: records,
            };
        }

        info!(stages = self.stages.len(), "Starting pipeline");
        let run_started = Instant::now();
        let mut state = initial;
        let mut current = self.table.entry().clone();

        loop {
            let Some(stage) = self.stages.get(&current) else {
                // Build-time validation makes this unreachable.
                error!(stage = %current, "Transition to unregistered stage");
                break;
            };

            let started = Instant::now();
            state = stage
                .execute(state)
                .instrument(info_span!("stage", stage = %current))
                .await;
            let elapsed = started.elapsed();

            let outcome = match state.error() {
                Some(message) => StageOutcome::Failed {
                    message: message.to_owned(),
                },
                None if state.is_failed() => StageOutcome::Failed {
                    message: String::new(),
                },
                None => StageOutcome::Succeeded,
            };
            match &outcome {
                StageOutcome::Succeeded => {
                    info!(
                        stage = %current,
                        elapsed_ms = elapsed.as_millis() as u64,
                        "Stage succeeded"
                    )
                }
                StageOutcome::Failed { message } => {
                    warn!(
                        stage = %current,
                        elapsed_ms = elapsed.as_millis() as u64,
                        error = %message,
                        "Stage failed"
                    )
                }
            }
            records.push(StageRecord {
                stage: current.clone(),
                outcome,
                elapsed,
            });

            match self.table.next(&current, &state) {
                Next::Stage(id) => current = id,
                Next::Terminal => break,
            }
        }

        info!(
            executed = records.len(),
            failed = state.is_failed(),
            elapsed_ms = run_started.elapsed().as_millis() as u64,
            "Pipeline finished"
        );
        RunReport {
            run_id,
            final_state: state,
            stages: records,
        }
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Collects stages and a transition table, then validates them together.
pub struct PipelineEngineBuilder {
    name: String,
    stages: Vec<Arc<dyn Stage>>,
    table: Option<TransitionTable>,
}

impl PipelineEngineBuilder {
    /// Registers a stage under its own [`Stage::id`].
    pub fn stage(self, stage: impl Stage + 'static) -> Self {
        self.shared_stage(Arc::new(stage))
    }

    /// Registers an already shared stage.
    pub fn shared_stage(mut self, stage: Arc<dyn Stage>) -> Self {
        self.stages.push(stage);
        self
    }

    /// Sets the transition table.
    pub fn transitions(mut self, table: TransitionTable) -> Self {
        self.table = Some(table);
        self
    }

    /// Validates the wiring and produces the engine.
    pub fn build(self) -> Result<PipelineEngine, EngineBuildError> {
        let table = self.table.ok_or_else(|| EngineBuildError::MissingEntry {
            pipeline: self.name.clone(),
        })?;

        let mut stages = HashMap::with_capacity(self.stages.len());
        for stage in self.stages {
            let id = stage.id();
            if stages.insert(id.clone(), stage).is_some() {
                return Err(EngineBuildError::DuplicateStage { stage: id });
            }
        }

        if let Some(missing) = table
            .referenced_stages()
            .into_iter()
            .find(|id| !stages.contains_key(*id))
        {
            return Err(EngineBuildError::DanglingReference {
                stage: missing.clone(),
            });
        }

        let mut reachable = HashSet::new();
        let mut current = table.entry().clone();
        loop {
            if !reachable.insert(current.clone()) {
                return Err(EngineBuildError::Cycle { stage: current });
            }
            match table.successor(&current) {
                Next::Stage(id) => current = id,
                Next::Terminal => break,
            }
        }

        for id in stages.keys().filter(|id| !reachable.contains(*id)) {
            warn!(pipeline = %self.name, stage = %id, "Stage is registered but never reached");
        }

        Ok(PipelineEngine {
            name: self.name,
            stages,
            table,
        })
    }
}
