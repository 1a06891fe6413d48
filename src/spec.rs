//! # Spec Loading
//!
//! Fetches the raw OpenAPI document from a local path or URL and parses it
//! into a `serde_json::Value` tree. The one network fetch is the only
//! blocking operation in the whole run: a single GET with a fixed timeout and
//! no retry.

use crate::error::{AppError, AppResult};
use serde_json::Value;
use std::fs;
use std::time::Duration;

/// Timeout applied to the single spec fetch.
const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Loads the raw spec content from a URL or a local path.
pub fn load_spec(source: &str) -> AppResult<String> {
    if source.starts_with("http://") || source.starts_with("https://") {
        download_spec(source)
    } else {
        Ok(fs::read_to_string(source)?)
    }
}

/// Performs the one blocking GET. Not retried.
fn download_spec(url: &str) -> AppResult<String> {
    let response = ureq::get(url)
        .timeout(FETCH_TIMEOUT)
        .call()
        .map_err(|e| AppError::SpecFetch(e.to_string()))?;

    response
        .into_string()
        .map_err(|e| AppError::SpecFetch(e.to_string()))
}

/// Parses the raw spec content, trying JSON, then YAML, then TOML.
///
/// A parse only counts when it yields an object: YAML in particular accepts
/// almost any text as a bare scalar, which is never a usable spec.
pub fn parse_spec(content: &str) -> AppResult<Value> {
    if let Ok(value) = serde_json::from_str::<Value>(content) {
        if value.is_object() {
            return Ok(value);
        }
    }

    if let Ok(value) = serde_yaml::from_str::<Value>(content) {
        if value.is_object() {
            return Ok(value);
        }
    }

    if let Ok(value) = toml::from_str::<Value>(content) {
        if value.is_object() {
            return Ok(value);
        }
    }

    Err(AppError::InvalidSpec)
}

/// Rejects anything that is not an OpenAPI 3.x document.
pub fn check_version(document: &Value) -> AppResult<()> {
    let version = document
        .get("openapi")
        .and_then(Value::as_str)
        .unwrap_or_default();

    if version.starts_with("3.") {
        Ok(())
    } else {
        let found = if version.is_empty() {
            document
                .get("swagger")
                .and_then(Value::as_str)
                .map(|v| format!("swagger {}", v))
                .unwrap_or_else(|| "missing 'openapi' field".to_string())
        } else {
            version.to_string()
        };
        Err(AppError::UnsupportedSpecVersion(found))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn test_parse_json_spec() {
        let parsed = parse_spec(r#"{"openapi": "3.0.0", "paths": {}}"#).unwrap();
        assert_eq!(parsed["openapi"], json!("3.0.0"));
    }

    #[test]
    fn test_parse_yaml_spec() {
        let parsed = parse_spec("openapi: 3.1.0\npaths: {}\n").unwrap();
        assert_eq!(parsed["openapi"], json!("3.1.0"));
    }

    #[test]
    fn test_parse_toml_spec() {
        let parsed = parse_spec("openapi = \"3.0.3\"\n[paths]\n").unwrap();
        assert_eq!(parsed["openapi"], json!("3.0.3"));
        assert!(parsed["paths"].is_object());
    }

    #[test]
    fn test_parse_garbage_fails() {
        let err = parse_spec(":[ not a spec in any format {{").unwrap_err();
        assert!(matches!(err, AppError::InvalidSpec));
    }

    #[test]
    fn test_parse_bare_scalar_fails() {
        // Valid YAML, but a scalar is not a document
        let err = parse_spec("just a sentence").unwrap_err();
        assert!(matches!(err, AppError::InvalidSpec));
    }

    #[test]
    fn test_load_local_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "openapi: 3.0.0").unwrap();
        let content = load_spec(file.path().to_str().unwrap()).unwrap();
        assert_eq!(content, "openapi: 3.0.0");
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_spec("/nonexistent/openapi.yaml").unwrap_err();
        assert!(matches!(err, AppError::Io(_)));
    }

    #[test]
    fn test_version_check_accepts_3x() {
        check_version(&json!({"openapi": "3.0.0"})).unwrap();
        check_version(&json!({"openapi": "3.1.0"})).unwrap();
    }

    #[test]
    fn test_version_check_rejects_swagger_2() {
        let err = check_version(&json!({"swagger": "2.0"})).unwrap_err();
        match err {
            AppError::UnsupportedSpecVersion(found) => assert_eq!(found, "swagger 2.0"),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_version_check_rejects_missing_field() {
        let err = check_version(&json!({"paths": {}})).unwrap_err();
        assert!(matches!(err, AppError::UnsupportedSpecVersion(_)));
    }
}
