use std::fs;
use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

pub const CONTRACT_VERSION: u32 = 1;

/// Everything the pipeline assumes about the host page. A change on the
/// host side means a new version of this, not a code change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostContract {
    pub version: u32,
    pub expected_host: String,
    pub start_url: String,
    pub link_tag: String,
    pub unified_search_link: String,
    pub legal_person_link: String,
    pub number_field: String,
    pub check_digit_field: String,
    pub search_button: String,
    pub result_table: String,
    pub next_page: String,
    pub clear_form: String,
    /// Column of each result row holding the `DD/MM/YYYY` date.
    pub date_column: usize,
    pub sheet_name: String,
}

impl Default for HostContract {
    fn default() -> Self {
        HostContract {
            version: CONTRACT_VERSION,
            expected_host: "oficinajudicialvirtual.pjud.cl".to_string(),
            start_url: "https://oficinajudicialvirtual.pjud.cl/indexN.php".to_string(),
            link_tag: "a".to_string(),
            unified_search_link: "Consulta Unificada".to_string(),
            legal_person_link: "Búsqueda por Rut Persona Jurídica".to_string(),
            number_field: "rutJur".to_string(),
            check_digit_field: "dvJur".to_string(),
            search_button: "btnConConsultaJur".to_string(),
            result_table: "dtaTableDetalleJuridica".to_string(),
            next_page: "sigId".to_string(),
            clear_form: "btnLimpiarJur".to_string(),
            date_column: 4,
            sheet_name: "Resultados".to_string(),
        }
    }
}

impl HostContract {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, PipelineError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| PipelineError::Contract(format!("cannot read {:?}: {}", path, e)))?;
        let contract: HostContract = serde_json::from_str(&text)
            .map_err(|e| PipelineError::Contract(format!("cannot parse {:?}: {}", path, e)))?;
        contract.validate()?;
        info!("Using host contract v{} from {:?}", contract.version, path);
        Ok(contract)
    }

    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.version != CONTRACT_VERSION {
            return Err(PipelineError::Contract(format!(
                "unsupported contract version {} (expected {})",
                self.version, CONTRACT_VERSION
            )));
        }
        let required = [
            ("link_tag", &self.link_tag),
            ("unified_search_link", &self.unified_search_link),
            ("legal_person_link", &self.legal_person_link),
            ("number_field", &self.number_field),
            ("check_digit_field", &self.check_digit_field),
            ("search_button", &self.search_button),
            ("result_table", &self.result_table),
            ("next_page", &self.next_page),
            ("clear_form", &self.clear_form),
            ("sheet_name", &self.sheet_name),
        ];
        if let Some((name, _)) = required.iter().find(|(_, v)| v.trim().is_empty()) {
            return Err(PipelineError::Contract(format!("'{}' must not be empty", name)));
        }
        Ok(())
    }
}
