//! The transition policy: which stage runs after the one that just finished.
//!
//! One rule applies after every stage. A state carrying `error` goes to
//! [`Next::Terminal`]; any other state follows the table's next-on-success
//! entry for the stage that produced it. The table is plain data, so stages can
//! be reordered or the graph extended without touching stage bodies.

use std::collections::HashMap;

use crate::{PipelineState, StageId};

/// Where the pipeline goes after a stage.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Next {
    /// Run the identified stage.
    Stage(StageId),
    /// Stop and return the accumulated state.
    Terminal,
}

/// Entry stage plus a per-stage next-on-success lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionTable {
    entry: StageId,
    on_success: HashMap<StageId, Next>,
}

impl TransitionTable {
    /// Creates a table that starts at `entry` and has no edges yet.
    ///
    /// A stage without an edge terminates the pipeline on success.
    pub fn new(entry: StageId) -> Self {
        Self {
            entry,
            on_success: HashMap::new(),
        }
    }

    /// Builds the fixed linear chain `ids[0] → ids[1] → … → terminal`.
    ///
    /// Returns `None` when `ids` is empty.
    pub fn linear(ids: impl IntoIterator<Item = StageId>) -> Option<Self> {
        let ids: Vec<StageId> = ids.into_iter().collect();
        let mut table = Self::new(ids.first()?.clone());
        for pair in ids.windows(2) {
            table = table.on_success(pair[0].clone(), Next::Stage(pair[1].clone()));
        }
        if let Some(last) = ids.last() {
            table = table.on_success(last.clone(), Next::Terminal);
        }
        Some(table)
    }

    /// Sets where `from` goes when it succeeds, replacing any previous edge.
    pub fn on_success(mut self, from: StageId, to: Next) -> Self {
        self.on_success.insert(from, to);
        self
    }

    /// The stage the engine starts from.
    pub fn entry(&self) -> &StageId {
        &self.entry
    }

    /// Every stage identifier the table mentions, entry first.
    pub fn referenced_stages(&self) -> Vec<&StageId> {
        let mut ids = vec![&self.entry];
        for (from, to) in &self.on_success {
            ids.push(from);
            if let Next::Stage(target) = to {
                ids.push(target);
            }
        }
        ids
    }

    /// The configured successor of `current`, ignoring state.
    pub fn successor(&self, current: &StageId) -> Next {
        self.on_success
            .get(current)
            .cloned()
            .unwrap_or(Next::Terminal)
    }

    /// Applies the policy to the state `current` just returned.
    pub fn next(&self, current: &StageId, state: &PipelineState) -> Next {
        if state.is_failed() {
            Next::Terminal
        } else {
            self.successor(current)
        }
    }
}
