use std::fmt;

use log::{error, info};

use crate::config::Settings;
use crate::contract::HostContract;
use crate::delay_manager;
use crate::error::PipelineError;
use crate::host::HostDocument;

/// Views the host must pass through before a RUT can be searched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationStage {
    Start,
    UnifiedSearchOpened,
    LegalPersonSearchOpened,
    Ready,
}

impl fmt::Display for NavigationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NavigationStage::Start => "start",
            NavigationStage::UnifiedSearchOpened => "unified search",
            NavigationStage::LegalPersonSearchOpened => "legal person search",
            NavigationStage::Ready => "ready",
        };
        f.write_str(name)
    }
}

pub struct Navigator<'a, H: HostDocument> {
    host: &'a H,
    contract: &'a HostContract,
    settings: &'a Settings,
    stage: NavigationStage,
}

impl<'a, H: HostDocument> Navigator<'a, H> {
    pub fn new(host: &'a H, contract: &'a HostContract, settings: &'a Settings) -> Self {
        Navigator {
            host,
            contract,
            settings,
            stage: NavigationStage::Start,
        }
    }

    pub fn stage(&self) -> NavigationStage {
        self.stage
    }

    /// Perform one transition and settle. `Ready` is terminal.
    pub fn advance(&mut self) -> Result<NavigationStage, PipelineError> {
        let delays = &self.settings.delays;
        let next = match self.stage {
            NavigationStage::Start => {
                self.click_link(&self.contract.unified_search_link)?;
                let wanted = &self.contract.legal_person_link;
                delay_manager::settle_with(self.settings.readiness, "navigation", delays.navigation(), || {
                    Ok(self.host.find_by_text(&self.contract.link_tag, wanted)?.is_some())
                })?;
                NavigationStage::UnifiedSearchOpened
            }
            NavigationStage::UnifiedSearchOpened => {
                self.click_link(&self.contract.legal_person_link)?;
                let field = &self.contract.number_field;
                delay_manager::settle_with(self.settings.readiness, "search form", delays.ready(), || {
                    Ok(self.host.find_by_id(field)?.is_some())
                })?;
                NavigationStage::LegalPersonSearchOpened
            }
            NavigationStage::LegalPersonSearchOpened | NavigationStage::Ready => NavigationStage::Ready,
        };
        info!("Navigation: {} -> {}", self.stage, next);
        self.stage = next;
        Ok(next)
    }

    /// Drive the host from `Start` to `Ready`.
    pub fn run_to_ready(&mut self) -> Result<(), PipelineError> {
        while self.stage != NavigationStage::Ready {
            self.advance()?;
        }
        Ok(())
    }

    fn click_link(&self, text: &str) -> Result<(), PipelineError> {
        match self.host.find_by_text(&self.contract.link_tag, text)? {
            Some(link) => {
                self.host.click(&link)?;
                Ok(())
            }
            None => {
                error!("Link '{}' not found", text);
                Err(PipelineError::NavigationLinkNotFound(text.to_string()))
            }
        }
    }
}
