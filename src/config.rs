use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

/// Fixed pauses after each step, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettleDelays {
    pub navigation_ms: u64,
    pub ready_ms: u64,
    pub search_ms: u64,
    pub page_ms: u64,
    pub clear_ms: u64,
}

impl Default for SettleDelays {
    fn default() -> Self {
        SettleDelays {
            navigation_ms: 3000,
            ready_ms: 5000,
            search_ms: 3000,
            page_ms: 3000,
            clear_ms: 1500,
        }
    }
}

impl SettleDelays {
    pub fn zero() -> Self {
        SettleDelays {
            navigation_ms: 0,
            ready_ms: 0,
            search_ms: 0,
            page_ms: 0,
            clear_ms: 0,
        }
    }

    pub fn navigation(&self) -> Duration {
        Duration::from_millis(self.navigation_ms)
    }

    pub fn ready(&self) -> Duration {
        Duration::from_millis(self.ready_ms)
    }

    pub fn search(&self) -> Duration {
        Duration::from_millis(self.search_ms)
    }

    pub fn page(&self) -> Duration {
        Duration::from_millis(self.page_ms)
    }

    pub fn clear(&self) -> Duration {
        Duration::from_millis(self.clear_ms)
    }
}

/// How a settle point decides the host is ready.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Readiness {
    /// Sleep the fixed delay.
    #[default]
    Fixed,
    /// Poll a page condition until it holds or `timeout_ms` runs out.
    Poll { timeout_ms: u64, interval_ms: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub delays: SettleDelays,
    pub readiness: Readiness,
    pub output_dir: PathBuf,
    /// Timestamped file per run instead of overwriting `output.xlsx`.
    pub unique_output_names: bool,
    pub checkpoint_path: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            delays: SettleDelays::default(),
            readiness: Readiness::Fixed,
            output_dir: PathBuf::from("."),
            unique_output_names: true,
            checkpoint_path: Some(PathBuf::from(".rut_progress.json")),
        }
    }
}

impl Settings {
    /// No waiting and no checkpoint file.
    pub fn immediate() -> Self {
        Settings {
            delays: SettleDelays::zero(),
            checkpoint_path: None,
            ..Default::default()
        }
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, PipelineError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| PipelineError::Contract(format!("cannot read settings {:?}: {}", path, e)))?;
        serde_json::from_str(&text)
            .map_err(|e| PipelineError::Contract(format!("cannot parse settings {:?}: {}", path, e)))
    }

    pub fn output_path(&self) -> PathBuf {
        let name = if self.unique_output_names {
            format!("resultado_todos_{}.xlsx", Local::now().format("%Y%m%d_%H%M%S"))
        } else {
            "output.xlsx".to_string()
        };
        self.output_dir.join(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_name_when_uniqueness_disabled() {
        let s = Settings { unique_output_names: false, ..Default::default() };
        assert_eq!(s.output_path(), PathBuf::from("./output.xlsx"));
    }

    #[test]
    fn unique_name_is_timestamped() {
        let name = Settings::default().output_path();
        let name = name.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("resultado_todos_"));
        assert!(name.ends_with(".xlsx"));
    }

    #[test]
    fn readiness_parses_from_json() {
        let s: Settings = serde_json::from_str(
            r#"{"readiness": {"mode": "poll", "timeout_ms": 10000, "interval_ms": 250}, "delays": {"page_ms": 1000}}"#,
        )
        .unwrap();
        assert_eq!(s.readiness, Readiness::Poll { timeout_ms: 10000, interval_ms: 250 });
        assert_eq!(s.delays.page_ms, 1000);
        assert_eq!(s.delays.clear_ms, 1500);
    }
}
