use std::sync::Arc;
use std::time::Duration;

use headless_chrome::{Browser, LaunchOptions, Tab};
use log::{debug, info};
use url::Url;

use super::snapshot::PageSnapshot;
use super::{ElementRef, HostDocument, HostError, TableSnapshot};

/// A `HostDocument` backed by a Chrome tab.
///
/// Reads go through a serialized copy of the live DOM; clicks and value
/// changes run a short script against the same locator.
pub struct ChromeHost {
    // Dropping the browser closes a launched instance.
    _browser: Browser,
    tab: Arc<Tab>,
}

pub enum BrowserSource {
    /// DevTools websocket of a Chrome the user is already logged into.
    Connect(String),
    Launch { headless: bool },
}

impl ChromeHost {
    pub fn open(source: BrowserSource) -> Result<Self, HostError> {
        let browser = match source {
            BrowserSource::Connect(ws_url) => {
                info!("Attaching to running browser at {}", ws_url);
                Browser::connect(ws_url).map_err(browser_err)?
            }
            BrowserSource::Launch { headless } => {
                info!("Launching browser (headless: {})", headless);
                let options = LaunchOptions {
                    headless,
                    idle_browser_timeout: Duration::from_secs(600),
                    ..Default::default()
                };
                Browser::new(options).map_err(browser_err)?
            }
        };

        // Reuse the user's current tab when attaching; otherwise start fresh.
        let existing = browser
            .get_tabs()
            .lock()
            .map_err(|_| HostError::Browser("tab list lock poisoned".to_string()))?
            .first()
            .cloned();
        let tab = match existing {
            Some(tab) => tab,
            None => browser.new_tab().map_err(browser_err)?,
        };

        Ok(ChromeHost {
            _browser: browser,
            tab,
        })
    }

    pub fn current_url(&self) -> String {
        self.tab.get_url()
    }

    /// Navigate to `start_url` unless the tab is already on `expected_host`.
    pub fn ensure_on_host(&self, expected_host: &str, start_url: &str) -> Result<(), HostError> {
        let current = self.current_url();
        let on_host = Url::parse(&current)
            .ok()
            .and_then(|u| u.host_str().map(|h| h.ends_with(expected_host)))
            .unwrap_or(false);
        if on_host {
            debug!("Already on {} ({})", expected_host, current);
            return Ok(());
        }
        info!("Opening {}", start_url);
        self.tab
            .navigate_to(start_url)
            .and_then(|tab| tab.wait_until_navigated())
            .map_err(browser_err)?;
        Ok(())
    }

    fn snapshot(&self) -> Result<PageSnapshot, HostError> {
        let html = self.tab.get_content().map_err(browser_err)?;
        Ok(PageSnapshot::parse(&html))
    }

    /// Run `body` with `el` bound to the located element. Returns the
    /// script's JSON result.
    fn with_element(&self, element: &ElementRef, body: &str) -> Result<serde_json::Value, HostError> {
        let script = format!(
            "(() => {{ const el = {}; if (!el) return false; {} return true; }})()",
            locate_expr(element),
            body
        );
        let result = self.tab.evaluate(&script, false).map_err(script_err)?;
        let value = result.value.unwrap_or(serde_json::Value::Null);
        if value == serde_json::Value::Bool(false) {
            return Err(HostError::Stale(element.describe()));
        }
        Ok(value)
    }
}

fn locate_expr(element: &ElementRef) -> String {
    match element {
        ElementRef::Id(id) => format!("document.getElementById({})", js_string(id)),
        ElementRef::Nth { tag, index } => {
            format!("document.querySelectorAll({})[{}]", js_string(tag), index)
        }
    }
}

fn js_string(s: &str) -> String {
    serde_json::Value::String(s.to_string()).to_string()
}

fn browser_err(e: impl std::fmt::Display) -> HostError {
    HostError::Browser(e.to_string())
}

fn script_err(e: impl std::fmt::Display) -> HostError {
    HostError::Script(e.to_string())
}

impl HostDocument for ChromeHost {
    fn find_by_text(&self, tag: &str, needle: &str) -> Result<Option<ElementRef>, HostError> {
        Ok(self.snapshot()?.find_by_text(tag, needle))
    }

    fn find_by_id(&self, id: &str) -> Result<Option<ElementRef>, HostError> {
        Ok(self.snapshot()?.find_by_id(id))
    }

    fn set_value(&self, element: &ElementRef, value: &str) -> Result<(), HostError> {
        debug!("set {} = {}", element.describe(), value);
        self.with_element(element, &format!("el.value = {};", js_string(value)))?;
        Ok(())
    }

    fn click(&self, element: &ElementRef) -> Result<(), HostError> {
        debug!("click {}", element.describe());
        self.with_element(element, "el.click();")?;
        Ok(())
    }

    fn query_table(&self, id: &str) -> Result<Option<TableSnapshot>, HostError> {
        Ok(self.snapshot()?.query_table(id))
    }

    fn is_disabled(&self, element: &ElementRef) -> Result<bool, HostError> {
        Ok(self.snapshot()?.is_disabled(element))
    }
}
