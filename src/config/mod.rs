mod types;

pub use types::*;

use crate::{Error, Result};
use std::env;
use tracing::{debug, info};

const DEFAULT_CONFIG_PATH: &str = "config.yaml";

/// Loads the configuration once at start-up.
///
/// `CONFIG_PATH` names the YAML file. When it is unset and `config.yaml` does
/// not exist, built-in defaults are used. Environment overrides are applied
/// afterwards in both cases.
pub async fn load() -> Result<Config> {
    let explicit_path = env::var("CONFIG_PATH").ok();
    let config_path = explicit_path
        .clone()
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

    debug!("Loading configuration from: {}", config_path);

    let mut config = match tokio::fs::read_to_string(&config_path).await {
        Ok(config_str) => parse(&config_str)?,
        Err(e) if explicit_path.is_none() && e.kind() == std::io::ErrorKind::NotFound => {
            info!("No {} found, using built-in defaults", DEFAULT_CONFIG_PATH);
            Config::default()
        }
        Err(e) => {
            return Err(Error::config(format!(
                "Failed to read configuration file {}: {}",
                config_path, e
            )));
        }
    };

    apply_env_overrides(&mut config, |key| env::var(key).ok())?;
    Ok(config)
}

pub fn parse(config_str: &str) -> Result<Config> {
    let config: Config = serde_yaml::from_str(config_str)?;
    Ok(config)
}

/// Overlays process environment values on top of the parsed file.
///
/// `lookup` abstracts `std::env::var` so the overlay can be exercised without
/// touching the real environment.
pub fn apply_env_overrides<F>(config: &mut Config, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(key) = lookup("GEMINI_API_KEY") {
        config.gemini.api_key = key;
    }
    if let Some(key) = lookup("OPENAI_API_KEY") {
        config.openai.api_key = key;
    }
    if let Some(host) = lookup("SERVER_HOST") {
        config.server.host = host;
    }
    if let Some(port) = lookup("SERVER_PORT") {
        config.server.port = port
            .parse()
            .map_err(|_| Error::config(format!("Invalid SERVER_PORT: '{}'", port)))?;
    }
    if let Some(dir) = lookup("UPLOAD_DIR") {
        config.server.upload_dir = dir;
    }

    Ok(())
}
