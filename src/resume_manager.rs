use std::fs;
use std::path::{Path, PathBuf};

use log::{error, info};
use serde::{Deserialize, Serialize};

use crate::dataset::AccumulatedDataset;
use crate::error::PipelineError;
use crate::identifier::Identifier;

/// Progress of an interrupted run: which RUTs are done and what they yielded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressState {
    pub completed: Vec<Identifier>,
    pub dataset: AccumulatedDataset,
}

impl ProgressState {
    /// How many leading entries of `queue` are already done.
    ///
    /// Completed RUTs are recorded in queue order, so they must be a prefix
    /// of the queue. Anything else means the input changed since the
    /// checkpoint was written.
    pub fn resume_position(&self, queue: &[Identifier]) -> Result<usize, PipelineError> {
        if queue.starts_with(&self.completed) {
            return Ok(self.completed.len());
        }
        Err(PipelineError::Checkpoint(format!(
            "checkpoint lists {} completed RUTs that do not match the start of the input",
            self.completed.len()
        )))
    }

    pub fn mark_complete(&mut self, id: Identifier, dataset: &AccumulatedDataset) {
        self.completed.push(id);
        self.dataset = dataset.clone();
    }
}

/// File-backed progress. Write failures are logged and otherwise ignored.
pub struct Checkpoint {
    path: PathBuf,
}

impl Checkpoint {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Checkpoint { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Previous progress, or a fresh state when there is no checkpoint file.
    pub fn load(&self) -> Result<ProgressState, PipelineError> {
        if !self.path.exists() {
            info!("No checkpoint at {:?}. Starting fresh.", self.path);
            return Ok(ProgressState::default());
        }
        let content = fs::read_to_string(&self.path)
            .map_err(|e| PipelineError::Checkpoint(format!("cannot read {:?}: {}", self.path, e)))?;
        let state: ProgressState = serde_json::from_str(&content)
            .map_err(|e| PipelineError::Checkpoint(format!("cannot parse {:?}: {}", self.path, e)))?;
        info!(
            "Resumed previous run: {} RUTs done, {} rows kept.",
            state.completed.len(),
            state.dataset.len()
        );
        Ok(state)
    }

    pub fn save(&self, state: &ProgressState) {
        let json = match serde_json::to_string_pretty(state) {
            Ok(j) => j,
            Err(e) => {
                error!("Failed to serialize checkpoint: {}", e);
                return;
            }
        };
        // Write then rename so a crash never leaves half a checkpoint.
        let tmp = self.path.with_extension("json.tmp");
        if let Err(e) = fs::write(&tmp, json).and_then(|_| fs::rename(&tmp, &self.path)) {
            error!("Failed to write checkpoint {:?}: {}", self.path, e);
        }
    }

    pub fn clear(&self) {
        if self.path.exists() {
            if let Err(e) = fs::remove_file(&self.path) {
                error!("Failed to remove checkpoint {:?}: {}", self.path, e);
            }
        }
    }
}
