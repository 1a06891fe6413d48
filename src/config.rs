//! # Configuration Handling
//!
//! Loads `faasgen.toml`, applies defaults, merges command-line overrides and
//! validates mutually exclusive settings. The resulting [`Config`] is
//! immutable for the rest of the run and threaded explicitly through every
//! pipeline stage.

use crate::error::{AppError, AppResult};
use indexmap::IndexMap;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the config file picked up from the working directory when no
/// `--config-file` is given.
const DEFAULT_CONFIG_FILE: &str = "faasgen.toml";

/// Automatic authentication settings.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct AuthConfig {
    /// Whether to select a security scheme and attach an auth hook.
    pub enabled: bool,
    /// Credential cache lifetime used by the generated hook, in minutes.
    pub ttl_minutes: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        AuthConfig {
            enabled: false,
            ttl_minutes: 15,
        }
    }
}

/// Server URL overrides. `url` and `variables` are mutually exclusive.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct ServerOverride {
    /// Full base URL, bypassing the spec's server templates.
    pub url: Option<String>,
    /// Values for `{variable}` tokens in the spec's server template.
    pub variables: IndexMap<String, String>,
}

/// Configuration merged from `faasgen.toml` and command-line overrides.
///
/// Unknown keys are rejected at parse time rather than silently ignored.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct Config {
    /// Path to code to bundle into the shared dependency layer.
    pub bundle: Option<String>,
    /// Prefix for generated IAM role names.
    pub iam_role_prefix: Option<String>,
    /// Path to the endpoint include-filter document.
    pub include_endpoints: Option<PathBuf>,
    /// Layer ARNs attached to every generated function.
    pub layers: Vec<String>,
    /// Directory the renderer writes into. Made absolute at load time.
    pub output_dir: PathBuf,
    /// Dotted path of a custom response postprocessor.
    pub postprocessor: Option<String>,
    /// Dotted path of a custom request preprocessor.
    pub preprocessor: Option<String>,
    /// Permissions boundary ARN applied to generated roles.
    pub role_permissions_boundary: Option<String>,
    /// Subnet IDs when functions run inside a VPC.
    pub subnets: Vec<String>,
    /// VPC ID when functions run inside a VPC.
    pub vpc_id: Option<String>,
    /// Directory the renderer loads its templates from.
    pub template_path: PathBuf,
    /// Whether generated functions enable X-Ray tracing.
    pub xray_tracing: bool,
    /// Automatic authentication settings.
    pub auth: AuthConfig,
    /// Server URL overrides.
    pub server: ServerOverride,
    /// Resource tags applied to everything the renderer emits.
    pub tags: IndexMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            bundle: None,
            iam_role_prefix: None,
            include_endpoints: None,
            layers: Vec::new(),
            output_dir: PathBuf::from("output"),
            postprocessor: None,
            preprocessor: None,
            role_permissions_boundary: None,
            subnets: Vec::new(),
            vpc_id: None,
            template_path: PathBuf::from("templates"),
            xray_tracing: false,
            auth: AuthConfig::default(),
            server: ServerOverride::default(),
            tags: IndexMap::new(),
        }
    }
}

impl Config {
    /// Loads the configuration.
    ///
    /// An explicitly named file must exist. Without one, `faasgen.toml` in
    /// the working directory is used if present, otherwise defaults apply.
    pub fn load(explicit: Option<&Path>) -> AppResult<Config> {
        let path = match explicit {
            Some(path) => {
                if !path.is_file() {
                    return Err(AppError::ConfigNotFound(path.display().to_string()));
                }
                Some(path.to_path_buf())
            }
            None => {
                let default = std::env::current_dir()?.join(DEFAULT_CONFIG_FILE);
                default.is_file().then_some(default)
            }
        };

        let mut config = match path {
            Some(path) => {
                let raw = fs::read_to_string(&path)?;
                toml::from_str(&raw).map_err(|e| AppError::InvalidConfig(e.to_string()))?
            }
            None => Config::default(),
        };

        config.output_dir = absolute_path(&config.output_dir)?;
        Ok(config)
    }

    /// Parses a configuration from a raw TOML string.
    pub fn from_toml(raw: &str) -> AppResult<Config> {
        let mut config: Config =
            toml::from_str(raw).map_err(|e| AppError::InvalidConfig(e.to_string()))?;
        config.output_dir = absolute_path(&config.output_dir)?;
        Ok(config)
    }

    /// Applies command-line overrides on top of the file values.
    ///
    /// `layers` arrives as one comma separated string.
    pub fn merge_cli(
        &mut self,
        output_dir: Option<&Path>,
        layers: Option<&str>,
        bundle: Option<&str>,
    ) -> AppResult<()> {
        if let Some(dir) = output_dir {
            self.output_dir = absolute_path(dir)?;
        }

        if let Some(raw) = layers {
            let layers: Vec<String> = raw
                .split(',')
                .map(str::trim)
                .filter(|layer| !layer.is_empty())
                .map(str::to_string)
                .collect();
            if !layers.is_empty() {
                self.layers = layers;
            }
        }

        if let Some(bundle) = bundle {
            self.bundle = Some(bundle.to_string());
        }

        Ok(())
    }

    /// Rejects mutually exclusive settings before any pipeline stage runs.
    pub fn validate(&self) -> AppResult<()> {
        if self.auth.enabled && self.preprocessor.is_some() {
            return Err(AppError::ConflictingAuthConfig);
        }
        if self.server.url.is_some() && !self.server.variables.is_empty() {
            return Err(AppError::ConflictingServerConfig);
        }
        Ok(())
    }
}

/// Resolves a path against the working directory when it is relative.
fn absolute_path(path: &Path) -> AppResult<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}
