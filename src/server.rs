//! # Server Resolution
//!
//! Computes the one concrete base URL every generated function calls.
//! Precedence, highest first: the CLI override (used verbatim), a configured
//! full URL, then substitution of the spec's first declared server template
//! using configured variable overrides and spec defaults.

use crate::config::Config;
use crate::error::{AppError, AppResult};
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use url::Url;

/// Final, fully substituted base URL. No variable tokens remain.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServerConfig {
    /// The absolute base URL.
    pub base_url: String,
}

/// Resolves the effective base URL for the run.
pub fn resolve_base_url(
    document: &Value,
    config: &Config,
    cli_override: Option<&str>,
) -> AppResult<ServerConfig> {
    if let Some(url) = cli_override {
        return Ok(ServerConfig {
            base_url: url.to_string(),
        });
    }

    if let Some(url) = &config.server.url {
        return Ok(ServerConfig {
            base_url: url.clone(),
        });
    }

    let server = document
        .get("servers")
        .and_then(Value::as_array)
        .and_then(|servers| servers.first())
        .ok_or(AppError::MissingServer)?;

    let template = server
        .get("url")
        .and_then(Value::as_str)
        .ok_or(AppError::MissingServer)?;

    let base_url = substitute(template, server.get("variables"), &config.server.variables)?;

    Url::parse(&base_url).map_err(|e| AppError::InvalidServerUrl {
        url: base_url.clone(),
        reason: e.to_string(),
    })?;

    Ok(ServerConfig { base_url })
}

/// Substitutes every `{variable}` token in the template.
///
/// Per token: configured override first, then the spec's declared default.
/// A token with neither source is fatal, naming the token.
fn substitute(
    template: &str,
    declared: Option<&Value>,
    overrides: &IndexMap<String, String>,
) -> AppResult<String> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let Some(end) = after.find('}') else {
            // Unterminated brace, kept literally
            out.push_str(&rest[start..]);
            return Ok(out);
        };

        let name = &after[..end];
        let value = match overrides.get(name) {
            Some(value) => value.clone(),
            None => declared_default(declared, name)
                .ok_or_else(|| AppError::UnresolvedVariable(name.to_string()))?,
        };

        out.push_str(&value);
        rest = &after[end + 1..];
    }

    out.push_str(rest);
    Ok(out)
}

/// Looks up a variable's declared default in the spec's server entry.
fn declared_default(declared: Option<&Value>, name: &str) -> Option<String> {
    declared?
        .get(name)?
        .get("default")?
        .as_str()
        .map(str::to_string)
}
