use std::path::Path;

use chrono::NaiveDate;
use log::{info, warn};

use crate::config::Settings;
use crate::contract::HostContract;
use crate::dataset::AccumulatedDataset;
use crate::error::{PipelineError, Warning};
use crate::exporter;
use crate::host::HostDocument;
use crate::input_loader::IdentifierQueue;
use crate::navigation::Navigator;
use crate::result_filter::DateWindow;
use crate::resume_manager::{Checkpoint, ProgressState};
use crate::search_engine::SearchEngine;

/// Result of a completed run, ready for export.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub dataset: AccumulatedDataset,
    pub searched: usize,
    pub skipped: usize,
    pub pages_read: u32,
    pub warnings: Vec<Warning>,
}

pub struct Pipeline<'a, H: HostDocument> {
    host: &'a H,
    contract: &'a HostContract,
    settings: &'a Settings,
}

impl<'a, H: HostDocument> Pipeline<'a, H> {
    pub fn new(host: &'a H, contract: &'a HostContract, settings: &'a Settings) -> Self {
        Pipeline {
            host,
            contract,
            settings,
        }
    }

    fn checkpoint(&self) -> Option<Checkpoint> {
        self.settings.checkpoint_path.as_ref().map(Checkpoint::new)
    }

    /// Navigate to the search view, then search every RUT in order.
    ///
    /// `progress` carries the leading queue entries done by an earlier run;
    /// they are skipped and their rows kept if still inside the window.
    /// `today` anchors the one-year window.
    pub fn run(&self, queue: &IdentifierQueue, progress: ProgressState, today: NaiveDate) -> Result<RunReport, PipelineError> {
        self.contract.validate()?;

        let window = DateWindow::ending(today, self.contract.date_column);
        info!("Keeping rows dated on or after {}", window.cutoff());

        let mut progress = progress;
        let mut dataset = progress.dataset.clone();
        let expired = dataset.retain_rows(|row| window.keeps(row));
        if expired > 0 {
            info!("Dropped {} resumed rows dated before {}", expired, window.cutoff());
        }
        let mut report = RunReport::default();

        let done = progress.resume_position(queue.as_slice())?;
        let pending = &queue.as_slice()[done..];
        report.skipped = done;
        if report.skipped > 0 {
            info!("Skipping {} RUTs completed in a previous run", report.skipped);
        }
        if pending.is_empty() {
            info!("Nothing left to search");
            report.dataset = dataset;
            return Ok(report);
        }

        Navigator::new(self.host, self.contract, self.settings).run_to_ready()?;

        let engine = SearchEngine::new(self.host, self.contract, self.settings, window);
        let checkpoint = self.checkpoint();

        let total = pending.len();
        for (i, id) in pending.iter().enumerate() {
            info!("Processing {} / {} : {}", i + 1, total, id);
            let outcome = engine.search(id, &mut dataset)?;

            report.searched += 1;
            report.pages_read += outcome.pages;
            report.warnings.extend(outcome.warnings);

            progress.mark_complete(id.clone(), &dataset);
            if let Some(checkpoint) = &checkpoint {
                checkpoint.save(&progress);
            }
        }

        if !dataset.has_header() {
            warn!("No result page was read; the export will have no header");
        }
        report.dataset = dataset;
        Ok(report)
    }

    /// Write the run's dataset once and drop the checkpoint it superseded.
    pub fn export(&self, report: &RunReport, path: &Path) -> Result<(), PipelineError> {
        exporter::export(&report.dataset, path, &self.contract.sheet_name)?;
        if let Some(checkpoint) = self.checkpoint() {
            checkpoint.clear();
        }
        Ok(())
    }
}
