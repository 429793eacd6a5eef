use std::fs;
use std::path::Path;

use calamine::{open_workbook_auto, Reader};
use log::{error, info, warn};

use crate::error::PipelineError;
use crate::identifier::Identifier;

/// Ordered RUTs for one run. Duplicates are kept; each one is searched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentifierQueue {
    items: Vec<Identifier>,
}

impl IdentifierQueue {
    pub fn new(items: Vec<Identifier>) -> Self {
        IdentifierQueue { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Identifier> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[Identifier] {
        &self.items
    }
}

impl<'a> IntoIterator for &'a IdentifierQueue {
    type Item = &'a Identifier;
    type IntoIter = std::slice::Iter<'a, Identifier>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Keep every line that normalizes to a RUT, in input order.
/// Empty and malformed lines are dropped silently.
pub fn parse_identifiers(text: &str) -> Vec<Identifier> {
    text.lines().filter_map(Identifier::normalize).collect()
}

/// Build the queue from raw text, failing when nothing valid remains.
pub fn queue_from_text(text: &str) -> Result<IdentifierQueue, PipelineError> {
    let items = parse_identifiers(text);
    if items.is_empty() {
        return Err(PipelineError::NoValidIdentifiers);
    }
    Ok(IdentifierQueue::new(items))
}

pub fn load_identifiers<P: AsRef<Path>>(filename: P) -> Result<IdentifierQueue, PipelineError> {
    let path_ref = filename.as_ref();

    // Workbooks are read cell by cell; everything else is newline-delimited text.
    let is_excel = path_ref
        .extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| ext.eq_ignore_ascii_case("xlsx") || ext.eq_ignore_ascii_case("xls"));

    let text = if is_excel {
        load_excel_lines(path_ref)?
    } else {
        load_text(path_ref)?
    };

    let queue = queue_from_text(&text);
    match &queue {
        Ok(q) => info!("Loaded {} RUTs from {:?}", q.len(), path_ref),
        Err(_) => error!("No valid RUTs found in {:?}", path_ref),
    }
    queue
}

fn load_text(path: &Path) -> Result<String, PipelineError> {
    let bytes = fs::read(path).map_err(|source| PipelineError::InputRead {
        path: path.to_path_buf(),
        source,
    })?;
    // Spreadsheet exports are not always UTF-8; a lossy read still finds the digits.
    match String::from_utf8(bytes) {
        Ok(text) => Ok(text),
        Err(e) => {
            warn!("Input {:?} is not valid UTF-8, decoding lossily", path);
            Ok(String::from_utf8_lossy(e.as_bytes()).into_owned())
        }
    }
}

fn load_excel_lines(path: &Path) -> Result<String, PipelineError> {
    let mut workbook = open_workbook_auto(path).map_err(|e| PipelineError::InputWorkbook {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let worksheets = workbook.worksheets();
    let Some((name, range)) = worksheets.first() else {
        return Err(PipelineError::InputWorkbook {
            path: path.to_path_buf(),
            reason: "workbook has no sheets".to_string(),
        });
    };
    info!("Reading RUTs from sheet '{}' of {:?}", name, path);

    // One candidate per row: the first non-empty cell.
    let mut lines = Vec::new();
    for row in range.rows() {
        if let Some(cell) = row.iter().map(|c| c.to_string()).find(|s| !s.trim().is_empty()) {
            lines.push(cell);
        }
    }
    Ok(lines.join("\n"))
}
