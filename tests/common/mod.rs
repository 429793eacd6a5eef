#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use rut_scraper_lib::contract::HostContract;
use rut_scraper_lib::{ElementRef, HostDocument, HostError, TableSnapshot};

pub type Page = Vec<Vec<String>>;

/// One result page as the host renders it: header, data rows, pager row.
pub fn page(header: &[&str], rows: &[&[&str]]) -> Page {
    let mut out = vec![cells(header)];
    out.extend(rows.iter().map(|r| cells(r)));
    out.push(vec!["« 1 2 3 »".to_string()]);
    out
}

pub fn cells(row: &[&str]) -> Vec<String> {
    row.iter().map(|s| s.to_string()).collect()
}

/// In-memory stand-in for the host page. Knows the element ids of the
/// default contract and answers searches from `results`.
pub struct FakeHost {
    contract: HostContract,
    pub links: RefCell<Vec<String>>,
    pub form_present: bool,
    pub clear_present: bool,
    /// Keep the "next" control in the page even on the last page (disabled).
    pub next_always_present: bool,
    results: HashMap<String, Vec<Page>>,
    fields: RefCell<HashMap<String, String>>,
    current: RefCell<Option<(String, usize)>>,
    pub actions: RefCell<Vec<String>>,
}

impl FakeHost {
    pub fn new() -> Self {
        let contract = HostContract::default();
        FakeHost {
            links: RefCell::new(vec![
                "Inicio".to_string(),
                contract.unified_search_link.clone(),
                contract.legal_person_link.clone(),
            ]),
            contract,
            form_present: true,
            clear_present: true,
            next_always_present: true,
            results: HashMap::new(),
            fields: RefCell::new(HashMap::new()),
            current: RefCell::new(None),
            actions: RefCell::new(Vec::new()),
        }
    }

    /// Result pages for a RUT. A RUT without pages renders no table.
    pub fn with_results(mut self, rut: &str, pages: Vec<Page>) -> Self {
        self.results.insert(rut.to_string(), pages);
        self
    }

    pub fn without_link(self, text: &str) -> Self {
        self.links.borrow_mut().retain(|l| l != text);
        self
    }

    pub fn searches(&self) -> Vec<String> {
        self.actions
            .borrow()
            .iter()
            .filter_map(|a| a.strip_prefix("search ").map(|s| s.to_string()))
            .collect()
    }

    fn current_pages(&self) -> Option<(&Vec<Page>, usize)> {
        let current = self.current.borrow();
        let (rut, idx) = current.as_ref()?;
        let pages = self.results.get(rut)?;
        if pages.is_empty() {
            return None;
        }
        Some((pages, *idx))
    }

    fn id_present(&self, id: &str) -> bool {
        let c = &self.contract;
        if id == c.number_field || id == c.check_digit_field || id == c.search_button {
            return self.form_present;
        }
        if id == c.clear_form {
            return self.clear_present;
        }
        if id == c.result_table {
            return self.current_pages().is_some();
        }
        if id == c.next_page {
            return match self.current_pages() {
                Some((pages, idx)) => self.next_always_present || idx + 1 < pages.len(),
                None => false,
            };
        }
        false
    }
}

impl HostDocument for FakeHost {
    fn find_by_text(&self, tag: &str, needle: &str) -> Result<Option<ElementRef>, HostError> {
        if tag != "a" {
            return Ok(None);
        }
        Ok(self
            .links
            .borrow()
            .iter()
            .position(|l| l.contains(needle))
            .map(|index| ElementRef::Nth { tag: tag.to_string(), index }))
    }

    fn find_by_id(&self, id: &str) -> Result<Option<ElementRef>, HostError> {
        Ok(self.id_present(id).then(|| ElementRef::Id(id.to_string())))
    }

    fn set_value(&self, element: &ElementRef, value: &str) -> Result<(), HostError> {
        match element {
            ElementRef::Id(id) => {
                self.fields.borrow_mut().insert(id.clone(), value.to_string());
                Ok(())
            }
            other => Err(HostError::Stale(other.describe())),
        }
    }

    fn click(&self, element: &ElementRef) -> Result<(), HostError> {
        let c = &self.contract;
        match element {
            ElementRef::Nth { index, .. } => {
                let text = self.links.borrow().get(*index).cloned().unwrap_or_default();
                self.actions.borrow_mut().push(format!("link {}", text));
            }
            ElementRef::Id(id) if *id == c.search_button => {
                let fields = self.fields.borrow();
                let rut = format!(
                    "{}-{}",
                    fields.get(&c.number_field).cloned().unwrap_or_default(),
                    fields.get(&c.check_digit_field).cloned().unwrap_or_default()
                );
                self.actions.borrow_mut().push(format!("search {}", rut));
                *self.current.borrow_mut() = Some((rut, 0));
            }
            ElementRef::Id(id) if *id == c.next_page => {
                self.actions.borrow_mut().push("next".to_string());
                if let Some((_, idx)) = self.current.borrow_mut().as_mut() {
                    *idx += 1;
                }
            }
            ElementRef::Id(id) if *id == c.clear_form => {
                self.actions.borrow_mut().push("clear".to_string());
                self.fields.borrow_mut().clear();
                *self.current.borrow_mut() = None;
            }
            ElementRef::Id(id) => return Err(HostError::Stale(id.clone())),
        }
        Ok(())
    }

    fn query_table(&self, id: &str) -> Result<Option<TableSnapshot>, HostError> {
        if id != self.contract.result_table {
            return Ok(None);
        }
        Ok(self
            .current_pages()
            .and_then(|(pages, idx)| pages.get(idx).cloned())
            .map(TableSnapshot::new))
    }

    fn is_disabled(&self, element: &ElementRef) -> Result<bool, HostError> {
        match element {
            ElementRef::Id(id) if *id == self.contract.next_page => Ok(match self.current_pages() {
                Some((pages, idx)) => idx + 1 >= pages.len(),
                None => true,
            }),
            _ => Ok(false),
        }
    }
}

/// Keeps showing the table from before a search for the next `lag` table
/// lookups, like a host that re-renders slowly.
pub struct LaggingHost {
    pub inner: FakeHost,
    contract: HostContract,
    lag: usize,
    stale: RefCell<Option<TableSnapshot>>,
    remaining: Cell<usize>,
}

impl LaggingHost {
    pub fn new(inner: FakeHost, lag: usize) -> Self {
        LaggingHost {
            inner,
            contract: HostContract::default(),
            lag,
            stale: RefCell::new(None),
            remaining: Cell::new(0),
        }
    }
}

impl HostDocument for LaggingHost {
    fn find_by_text(&self, tag: &str, needle: &str) -> Result<Option<ElementRef>, HostError> {
        self.inner.find_by_text(tag, needle)
    }

    fn find_by_id(&self, id: &str) -> Result<Option<ElementRef>, HostError> {
        self.inner.find_by_id(id)
    }

    fn set_value(&self, element: &ElementRef, value: &str) -> Result<(), HostError> {
        self.inner.set_value(element, value)
    }

    fn click(&self, element: &ElementRef) -> Result<(), HostError> {
        if *element == ElementRef::Id(self.contract.search_button.clone()) {
            let shown = self.inner.query_table(&self.contract.result_table)?;
            if shown.is_some() {
                *self.stale.borrow_mut() = shown;
                self.remaining.set(self.lag);
            }
        }
        self.inner.click(element)
    }

    fn query_table(&self, id: &str) -> Result<Option<TableSnapshot>, HostError> {
        if id == self.contract.result_table && self.remaining.get() > 0 {
            self.remaining.set(self.remaining.get() - 1);
            return Ok(self.stale.borrow().clone());
        }
        self.inner.query_table(id)
    }

    fn is_disabled(&self, element: &ElementRef) -> Result<bool, HostError> {
        self.inner.is_disabled(element)
    }
}
