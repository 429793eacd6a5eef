//! Host UI driver: the only way the pipeline touches the external document.
//!
//! Every lookup is a snapshot of the document as it is right now. Nothing in
//! here retries or waits; callers own the settle policy (see `delay_manager`).

pub mod chrome;
pub mod snapshot;

use thiserror::Error;

/// Failure of the transport to the document itself, not a missing element.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("browser error: {0}")]
    Browser(String),
    #[error("script error: {0}")]
    Script(String),
    #[error("element is gone: {0}")]
    Stale(String),
}

/// Where an element was found. Resolved again on every action.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ElementRef {
    Id(String),
    /// Position among all `tag` elements, in document order.
    Nth { tag: String, index: usize },
}

impl ElementRef {
    pub fn describe(&self) -> String {
        match self {
            ElementRef::Id(id) => format!("#{}", id),
            ElementRef::Nth { tag, index } => format!("{}[{}]", tag, index),
        }
    }
}

/// Text of every row of a table, in `table.rows` order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableSnapshot {
    pub rows: Vec<Vec<String>>,
}

impl TableSnapshot {
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        TableSnapshot { rows }
    }
}

pub trait HostDocument {
    /// First `tag` element whose text contains `needle`.
    fn find_by_text(&self, tag: &str, needle: &str) -> Result<Option<ElementRef>, HostError>;
    fn find_by_id(&self, id: &str) -> Result<Option<ElementRef>, HostError>;
    fn set_value(&self, element: &ElementRef, value: &str) -> Result<(), HostError>;
    fn click(&self, element: &ElementRef) -> Result<(), HostError>;
    fn query_table(&self, id: &str) -> Result<Option<TableSnapshot>, HostError>;
    fn is_disabled(&self, element: &ElementRef) -> Result<bool, HostError>;
}
