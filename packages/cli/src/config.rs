use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use syllabus_editor::EditorConfig;

pub const DEFAULT_CONFIG_NAME: &str = "syllabus.config.json";

/// Syllabus configuration file format
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Directory holding one `<id>.json` file per syllabus
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Autosave settings
    #[serde(default)]
    pub editor: EditorConfig,
}

fn default_data_dir() -> String {
    "syllabi".to_string()
}

impl Config {
    /// Load config from a directory
    pub fn load(cwd: &str) -> anyhow::Result<Self> {
        let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            tracing::debug!(path = %config_path.display(), "loaded config");
            Ok(config)
        } else {
            // Return default config if none exists
            Ok(Config::default())
        }
    }

    /// Get absolute path to the data directory
    pub fn get_data_dir(&self, cwd: &str) -> PathBuf {
        PathBuf::from(cwd).join(&self.data_dir)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            editor: EditorConfig::default(),
        }
    }
}
