use log::{debug, warn};
use serde::{Deserialize, Serialize};

pub type Row = Vec<String>;

/// Header plus every kept row of the run. Searches only ever append.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccumulatedDataset {
    header: Option<Row>,
    rows: Vec<Row>,
}

impl AccumulatedDataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn header(&self) -> Option<&Row> {
        self.header.as_ref()
    }

    pub fn has_header(&self) -> bool {
        self.header.is_some()
    }

    /// Store the header. Later calls are ignored; there is one header per run.
    pub fn capture_header(&mut self, header: Row) {
        if self.header.is_some() {
            debug!("Header already captured, ignoring {:?}", header);
            return;
        }
        self.header = Some(header);
    }

    pub fn append(&mut self, rows: Vec<Row>) {
        if let Some(header) = &self.header {
            for row in rows.iter().filter(|r| r.len() != header.len()) {
                warn!(
                    "Row has {} cells, header has {}: {:?}",
                    row.len(),
                    header.len(),
                    row
                );
            }
        }
        self.rows.extend(rows);
    }

    /// Keep only the data rows `keep` accepts. Returns how many were dropped.
    pub fn retain_rows<F: FnMut(&Row) -> bool>(&mut self, mut keep: F) -> usize {
        let before = self.rows.len();
        self.rows.retain(|row| keep(row));
        before - self.rows.len()
    }

    pub fn data_rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Header first (when captured), then the data rows.
    pub fn to_rows(&self) -> Vec<Row> {
        self.header
            .iter()
            .chain(self.rows.iter())
            .cloned()
            .collect()
    }
}
