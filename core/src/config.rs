use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_DATA_PATH: &str = "bancos_com_dados.xlsx";
pub const DEFAULT_SHEET_NAME: &str = "DADOS REAIS";
pub const DEFAULT_JITTER_STD: f64 = 0.1;
pub const DEFAULT_TITLE: &str = "PAGDIG | DESEMBOLSO COMUNITÁRIO";

/// Process-wide dashboard configuration. Set once at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default = "default_data_path")]
    pub data_path: String,
    #[serde(default = "default_sheet_name")]
    pub sheet_name: String,
    /// Standard deviation, in degrees, of the marker jitter.
    #[serde(default = "default_jitter_std")]
    pub jitter_std: f64,
    /// When set, marker positions are reproducible across loads.
    #[serde(default)]
    pub jitter_seed: Option<u64>,
    #[serde(default = "default_title")]
    pub title: String,
}

fn default_data_path() -> String {
    DEFAULT_DATA_PATH.to_string()
}

fn default_sheet_name() -> String {
    DEFAULT_SHEET_NAME.to_string()
}

fn default_jitter_std() -> f64 {
    DEFAULT_JITTER_STD
}

fn default_title() -> String {
    DEFAULT_TITLE.to_string()
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: default_data_path(),
            sheet_name: default_sheet_name(),
            jitter_std: default_jitter_std(),
            jitter_seed: None,
            title: default_title(),
        }
    }
}

impl DashboardConfig {
    /// Read a JSON config file. Missing keys fall back to defaults.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        use anyhow::Context;
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::from_json(&content)
            .with_context(|| format!("Failed to parse config {}", path.display()))
    }

    pub fn from_json(content: &str) -> anyhow::Result<Self> {
        let config: DashboardConfig = serde_json::from_str(content)?;
        if !(config.jitter_std.is_finite() && config.jitter_std >= 0.0) {
            anyhow::bail!("jitter_std must be a non-negative number, got {}", config.jitter_std);
        }
        Ok(config)
    }
}
