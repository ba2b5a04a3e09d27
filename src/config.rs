use std::{fs, path::Path, path::PathBuf};

use serde::{Deserialize, Serialize};

use crate::utils;

/// Operator overrides read once at startup from `config.json` in the
/// data directory. Nothing at runtime writes this file.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub admin_password: Option<String>,
    pub export_dir: Option<PathBuf>,
}

pub struct ConfigStore {
    data: AppConfig,
}

impl ConfigStore {
    pub fn load() -> Self {
        let path = utils::config_path();
        let data = read_config(&path).unwrap_or_else(|err| {
            log::warn!("using default config: {err}");
            AppConfig::default()
        });
        Self { data }
    }

    pub fn read(&self) -> AppConfig {
        self.data.clone()
    }
}

fn read_config(path: &Path) -> Result<AppConfig, String> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }
    let contents = fs::read_to_string(path).map_err(|err| err.to_string())?;
    serde_json::from_str(&contents).map_err(|err| err.to_string())
}
