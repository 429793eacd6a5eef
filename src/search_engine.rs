use log::{debug, info, warn};

use crate::config::Settings;
use crate::contract::HostContract;
use crate::dataset::{AccumulatedDataset, Row};
use crate::delay_manager;
use crate::error::{PipelineError, Warning};
use crate::host::{ElementRef, HostDocument, TableSnapshot};
use crate::identifier::Identifier;
use crate::result_filter::DateWindow;

/// What one RUT contributed to the run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchOutcome {
    pub pages: u32,
    pub rows_seen: usize,
    pub rows_kept: usize,
    pub warnings: Vec<Warning>,
}

struct SearchForm {
    number: ElementRef,
    check_digit: ElementRef,
    submit: ElementRef,
}

/// Submits one RUT at a time and walks its result pages.
pub struct SearchEngine<'a, H: HostDocument> {
    host: &'a H,
    contract: &'a HostContract,
    settings: &'a Settings,
    window: DateWindow,
}

impl<'a, H: HostDocument> SearchEngine<'a, H> {
    pub fn new(host: &'a H, contract: &'a HostContract, settings: &'a Settings, window: DateWindow) -> Self {
        SearchEngine {
            host,
            contract,
            settings,
            window,
        }
    }

    /// Search `id`, append its kept rows to `dataset`, then reset the form.
    ///
    /// A missing search form is fatal for the whole run. A missing result
    /// table only ends this RUT's pagination.
    pub fn search(&self, id: &Identifier, dataset: &mut AccumulatedDataset) -> Result<SearchOutcome, PipelineError> {
        let (number, check_digit) = id.split();
        info!("Searching RUT {}", id);

        let form = self.locate_form()?;
        self.host.set_value(&form.number, number)?;
        self.host.set_value(&form.check_digit, check_digit)?;

        // A table left over from the previous RUT does not count as ready.
        let table_id = &self.contract.result_table;
        let previous = self.host.query_table(table_id)?;
        self.host.click(&form.submit)?;

        delay_manager::settle_with(self.settings.readiness, "search results", self.settings.delays.search(), || {
            Ok(matches!(self.host.query_table(table_id)?, Some(t) if Some(&t) != previous.as_ref()))
        })?;

        let mut outcome = SearchOutcome::default();
        self.paginate(id, dataset, &mut outcome)?;
        self.clear_form(id, &mut outcome)?;

        info!(
            "RUT {} done: {} page(s), {} of {} rows kept",
            id, outcome.pages, outcome.rows_kept, outcome.rows_seen
        );
        Ok(outcome)
    }

    fn locate_form(&self) -> Result<SearchForm, PipelineError> {
        let find = |element: &str| -> Result<ElementRef, PipelineError> {
            self.host
                .find_by_id(element)?
                .ok_or_else(|| PipelineError::SearchFormNotFound {
                    element: element.to_string(),
                })
        };
        Ok(SearchForm {
            number: find(&self.contract.number_field)?,
            check_digit: find(&self.contract.check_digit_field)?,
            submit: find(&self.contract.search_button)?,
        })
    }

    fn paginate(
        &self,
        id: &Identifier,
        dataset: &mut AccumulatedDataset,
        outcome: &mut SearchOutcome,
    ) -> Result<(), PipelineError> {
        let mut page: u32 = 1;

        loop {
            let Some(table) = self.host.query_table(&self.contract.result_table)? else {
                let warning = Warning::ResultTableNotFound {
                    identifier: id.clone(),
                    page,
                };
                warn!("{}", warning);
                outcome.warnings.push(warning);
                return Ok(());
            };

            let rows = self.page_rows(table.clone(), dataset);
            outcome.pages += 1;
            outcome.rows_seen += rows.len();
            let kept = self.window.apply(rows);
            outcome.rows_kept += kept.len();
            dataset.append(kept);
            info!("Page {} captured for RUT {}", page, id);

            let Some(next) = self.next_page_control()? else {
                info!("No more pages for RUT {}", id);
                return Ok(());
            };
            self.host.click(&next)?;
            page += 1;

            let table_id = &self.contract.result_table;
            delay_manager::settle_with(self.settings.readiness, "next page", self.settings.delays.page(), || {
                Ok(self.host.query_table(table_id)?.map_or(true, |t| t != table))
            })?;
        }
    }

    /// Data rows of a page. The last row is the pager. The first usable
    /// page of the run also supplies the header.
    fn page_rows(&self, table: TableSnapshot, dataset: &mut AccumulatedDataset) -> Vec<Row> {
        let mut rows = table.rows;
        rows.pop();

        if !dataset.has_header() && !rows.is_empty() {
            let header = rows.remove(0);
            debug!("Captured header {:?}", header);
            dataset.capture_header(header);
        }
        rows
    }

    /// The enabled "next" control, if any. Missing counts the same as disabled.
    fn next_page_control(&self) -> Result<Option<ElementRef>, PipelineError> {
        match self.host.find_by_id(&self.contract.next_page)? {
            Some(next) if !self.host.is_disabled(&next)? => Ok(Some(next)),
            _ => Ok(None),
        }
    }

    fn clear_form(&self, id: &Identifier, outcome: &mut SearchOutcome) -> Result<(), PipelineError> {
        match self.host.find_by_id(&self.contract.clear_form)? {
            Some(clear) => {
                self.host.click(&clear)?;
                delay_manager::settle("form reset", self.settings.delays.clear());
            }
            None => {
                let warning = Warning::ClearFormControlMissing {
                    identifier: id.clone(),
                };
                warn!("{}", warning);
                outcome.warnings.push(warning);
            }
        }
        Ok(())
    }
}
