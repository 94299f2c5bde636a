mod defaults;
mod validation;

use crate::authenticator::TokenOptions;
use crate::cli::Args;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::PathBuf;
use std::sync::Once;
use std::time::Duration;
use tracing::warn;
use url::Url;

pub use defaults::*;
pub use validation::{expand_env_var_in_string, is_truthy};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default, alias = "syncIntervalMs")]
    pub sync_interval_ms: Option<u64>,
}

/// Options as written in a config file. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    #[serde(default, alias = "applicationOrigin")]
    pub application_origin: Option<String>,
    #[serde(default, alias = "resourceName")]
    pub resource_name: Option<String>,
    #[serde(default, alias = "tokenAttributeName")]
    pub token_attribute_name: Option<String>,
    #[serde(default, alias = "identificationAttributeName")]
    pub identification_attribute_name: Option<String>,
    #[serde(default, alias = "serverEndpoint")]
    pub server_endpoint: Option<String>,
    /// Deprecated spelling of `server_endpoint`.
    #[serde(default, alias = "serverTokenEndpoint")]
    pub server_token_endpoint: Option<String>,
    #[serde(default, alias = "rejectWithFullResponse")]
    pub reject_with_full_response: Option<bool>,
    #[serde(default, alias = "crossOriginWhitelist")]
    pub cross_origin_whitelist: Option<Vec<String>>,
    #[serde(default)]
    pub store: StoreConfig,
}

/// Values that take precedence over the config file (env vars, then CLI args).
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub application_origin: Option<String>,
    pub server_endpoint: Option<String>,
    pub store_path: Option<String>,
    pub reject_with_full_response: Option<bool>,
}

/// Fully resolved configuration.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub application_origin: String,
    pub token: TokenOptions,
    pub cross_origin_whitelist: Vec<String>,
    pub store_path: PathBuf,
    pub sync_interval: Duration,
}

impl AuthConfig {
    pub fn from_env_and_args(args: &Args) -> Result<Self> {
        let file_config = FileConfig::load()?;

        // CLI args > env vars
        let overrides = ConfigOverrides {
            application_origin: args
                .origin
                .clone()
                .or_else(|| env::var("SESSIONWARD_APPLICATION_ORIGIN").ok()),
            server_endpoint: args
                .api_endpoint
                .clone()
                .or_else(|| env::var("SESSIONWARD_SERVER_ENDPOINT").ok()),
            store_path: env::var("SESSIONWARD_STORE_PATH").ok(),
            reject_with_full_response: env::var("SESSIONWARD_REJECT_WITH_FULL_RESPONSE")
                .ok()
                .map(|v| is_truthy(&v)),
        };

        Self::resolve(file_config, overrides)
    }

    /// Merge overrides over file values over defaults.
    pub fn resolve(file: FileConfig, overrides: ConfigOverrides) -> Result<Self> {
        let application_origin = overrides
            .application_origin
            .or(file.application_origin.clone())
            .map(|origin| expand_env_var_in_string(&origin))
            .unwrap_or_else(|| DEFAULT_APPLICATION_ORIGIN.to_string());

        let server_endpoint = overrides
            .server_endpoint
            .or_else(|| file.server_endpoint())
            .map(|endpoint| expand_env_var_in_string(&endpoint))
            .unwrap_or_else(|| DEFAULT_SERVER_ENDPOINT.to_string());
        let server_endpoint = absolute_endpoint(&application_origin, &server_endpoint)?;

        let token = TokenOptions {
            resource_name: file
                .resource_name
                .unwrap_or_else(|| DEFAULT_RESOURCE_NAME.to_string()),
            token_attribute_name: file
                .token_attribute_name
                .unwrap_or_else(|| DEFAULT_TOKEN_ATTRIBUTE_NAME.to_string()),
            identification_attribute_name: file
                .identification_attribute_name
                .unwrap_or_else(|| DEFAULT_IDENTIFICATION_ATTRIBUTE_NAME.to_string()),
            server_endpoint,
            reject_with_full_response: overrides
                .reject_with_full_response
                .or(file.reject_with_full_response)
                .unwrap_or(false),
        };

        let cross_origin_whitelist = file
            .cross_origin_whitelist
            .unwrap_or_default()
            .iter()
            .map(|entry| expand_env_var_in_string(entry))
            .collect();

        let store_path = overrides
            .store_path
            .or(file.store.path)
            .map(|path| PathBuf::from(expand_env_var_in_string(&path)))
            .unwrap_or_else(default_store_path);

        let sync_interval = Duration::from_millis(
            file.store
                .sync_interval_ms
                .unwrap_or(DEFAULT_SYNC_INTERVAL_MS),
        );

        Ok(AuthConfig {
            application_origin,
            token,
            cross_origin_whitelist,
            store_path,
            sync_interval,
        })
    }
}

impl FileConfig {
    pub fn load() -> Result<Self> {
        for path in Self::get_config_paths() {
            if path.exists() {
                return Self::load_from(&path);
            }
        }

        // No config file found, return default
        Ok(FileConfig::default())
    }

    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let is_yaml = matches!(
            path.extension().and_then(|s| s.to_str()),
            Some("yaml") | Some("yml")
        );
        if is_yaml {
            serde_yaml::from_str(&contents)
                .with_context(|| format!("Failed to parse YAML config file: {}", path.display()))
        } else {
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse JSON config file: {}", path.display()))
        }
    }

    pub fn get_config_paths() -> Vec<PathBuf> {
        let mut paths = vec![
            // 1. Current directory (local override)
            PathBuf::from(".sessionward.yaml"),
            PathBuf::from(".sessionward.yml"),
            PathBuf::from(".sessionward.json"),
        ];

        // 2. User's config directory
        if let Some(home_dir) = dirs::home_dir() {
            let config_dir = home_dir.join(".config").join("sessionward");
            paths.push(config_dir.join("sessionward.yaml"));
            paths.push(config_dir.join("sessionward.yml"));
            paths.push(config_dir.join("sessionward.json"));
        }

        paths
    }

    /// `server_endpoint`, falling back to the deprecated `server_token_endpoint`.
    pub fn server_endpoint(&self) -> Option<String> {
        if self.server_endpoint.is_some() {
            return self.server_endpoint.clone();
        }
        let legacy = self.server_token_endpoint.clone()?;
        static DEPRECATION: Once = Once::new();
        DEPRECATION.call_once(|| {
            warn!("`server_token_endpoint` is deprecated; use `server_endpoint` instead");
        });
        Some(legacy)
    }
}

/// Resolve a possibly relative endpoint against the application origin.
fn absolute_endpoint(application_origin: &str, endpoint: &str) -> Result<String> {
    let base = Url::parse(application_origin)
        .with_context(|| format!("Invalid application origin: {}", application_origin))?;
    let url = base
        .join(endpoint)
        .with_context(|| format!("Invalid server endpoint: {}", endpoint))?;
    Ok(url.to_string())
}
