use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::host::HostError;
use crate::identifier::Identifier;

/// Fatal failures. Any of these aborts the run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("could not read input file {path:?}: {source}")]
    InputRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("could not read workbook {path:?}: {reason}")]
    InputWorkbook { path: PathBuf, reason: String },
    #[error("no valid RUTs found in the input")]
    NoValidIdentifiers,
    #[error("navigation link not found: '{0}'")]
    NavigationLinkNotFound(String),
    #[error("search form element not found: #{element}")]
    SearchFormNotFound { element: String },
    #[error(transparent)]
    Host(#[from] HostError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error("checkpoint error: {0}")]
    Checkpoint(String),
    #[error("host contract error: {0}")]
    Contract(String),
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("xlsx export failed: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
    #[error("csv export failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("cell at row {row}, column {col} does not fit in a worksheet")]
    OutOfRange { row: usize, col: usize },
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Non-fatal conditions. Logged and reported, never propagated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    ResultTableNotFound { identifier: Identifier, page: u32 },
    ClearFormControlMissing { identifier: Identifier },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::ResultTableNotFound { identifier, page } => {
                write!(f, "result table not found on page {} for RUT {}", page, identifier)
            }
            Warning::ClearFormControlMissing { identifier } => {
                write!(f, "clear-form control missing after RUT {}", identifier)
            }
        }
    }
}
