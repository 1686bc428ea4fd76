use std::path::Path;

use crate::config::app_config::{AppConfig, DEFAULT_CONFIG_FILE};
use crate::core::errors::Result;

/// Load configuration from `--config`, or from `config.yml` in the working
/// directory when the flag is absent.
///
/// Only an explicitly named file has to exist.
pub fn load_config(custom: Option<&str>) -> Result<AppConfig> {
    match custom {
        Some(path) => AppConfig::load(Path::new(path), true),
        None => AppConfig::load(Path::new(DEFAULT_CONFIG_FILE), false),
    }
}
