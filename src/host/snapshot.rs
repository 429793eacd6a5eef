//! Lookups over a parsed copy of the page.
//!
//! `ChromeHost` serializes the live DOM and answers every query from here, so
//! the matching rules can be tested against plain HTML fixtures.

use scraper::{ElementRef as Node, Html, Selector};

use super::{ElementRef, TableSnapshot};

pub struct PageSnapshot {
    document: Html,
}

impl PageSnapshot {
    pub fn parse(html: &str) -> Self {
        PageSnapshot {
            document: Html::parse_document(html),
        }
    }

    pub fn find_by_text(&self, tag: &str, needle: &str) -> Option<ElementRef> {
        let selector = Selector::parse(tag).ok()?;
        self.document
            .select(&selector)
            .position(|node| normalize_ws(&node.text().collect::<String>()).contains(needle))
            .map(|index| ElementRef::Nth {
                tag: tag.to_string(),
                index,
            })
    }

    pub fn find_by_id(&self, id: &str) -> Option<ElementRef> {
        self.node_by_id(id).map(|_| ElementRef::Id(id.to_string()))
    }

    pub fn resolve(&self, element: &ElementRef) -> Option<Node<'_>> {
        match element {
            ElementRef::Id(id) => self.node_by_id(id),
            ElementRef::Nth { tag, index } => {
                let selector = Selector::parse(tag).ok()?;
                self.document.select(&selector).nth(*index)
            }
        }
    }

    pub fn query_table(&self, id: &str) -> Option<TableSnapshot> {
        let table = self.node_by_id(id)?;
        let mut rows = Vec::new();
        for child in table.child_elements() {
            match child.value().name() {
                "tr" => rows.push(row_cells(child)),
                "thead" | "tbody" | "tfoot" => {
                    rows.extend(
                        child
                            .child_elements()
                            .filter(|n| n.value().name() == "tr")
                            .map(row_cells),
                    );
                }
                _ => {}
            }
        }
        Some(TableSnapshot::new(rows))
    }

    /// `disabled` class, `aria-disabled` or `disabled` attribute.
    /// An element that cannot be resolved counts as disabled.
    pub fn is_disabled(&self, element: &ElementRef) -> bool {
        let Some(node) = self.resolve(element) else {
            return true;
        };
        let el = node.value();
        el.classes().any(|c| c == "disabled")
            || el.attr("aria-disabled").is_some()
            || el.attr("disabled").is_some()
    }

    fn node_by_id(&self, id: &str) -> Option<Node<'_>> {
        // Ids on legacy pages are not always valid CSS identifiers.
        let selector = Selector::parse("[id]").ok()?;
        self.document
            .select(&selector)
            .find(|node| node.value().id() == Some(id))
    }
}

fn row_cells(row: Node<'_>) -> Vec<String> {
    row.child_elements()
        .filter(|n| matches!(n.value().name(), "td" | "th"))
        .map(|cell| normalize_ws(&cell.text().collect::<String>()))
        .collect()
}

/// Collapse whitespace runs into one space and trim.
pub fn normalize_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
