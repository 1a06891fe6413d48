//! # Security Scheme Selection
//!
//! Classifies the spec's declared security schemes into a closed set of
//! kinds with a total priority ordering, then selects the single scheme the
//! generated auth hook will implement. Selection happens exactly once per
//! run and only inspects the global security requirements; scopes are
//! ignored because OAuth2 is not supported.

use crate::config::Config;
use crate::error::{AppError, AppResult};
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

/// Classified authentication mechanism, ordered by selection priority.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SchemeKind {
    /// `http` with scheme `bearer`.
    HttpBearer,
    /// `http` with scheme `basic`.
    HttpBasic,
    /// `apiKey` carried in a header.
    ApiKeyHeader,
    /// `apiKey` carried in the query string.
    ApiKeyQuery,
    /// `apiKey` carried in a cookie.
    ApiKeyCookie,
    /// `mutualTLS`.
    MutualTls,
    /// Anything we cannot generate a hook for; carries the raw declared type.
    Unsupported(String),
}

impl SchemeKind {
    /// Selection priority. Lower number wins.
    pub fn priority(&self) -> u32 {
        match self {
            SchemeKind::HttpBearer => 1,
            SchemeKind::HttpBasic => 2,
            SchemeKind::ApiKeyHeader => 3,
            SchemeKind::ApiKeyQuery => 4,
            SchemeKind::ApiKeyCookie => 5,
            SchemeKind::MutualTls => 6,
            SchemeKind::Unsupported(_) => u32::MAX,
        }
    }

    /// Whether a hook can be generated for this kind.
    pub fn is_supported(&self) -> bool {
        !matches!(self, SchemeKind::Unsupported(_))
    }
}

/// One declared security scheme.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SecurityScheme {
    /// Reference name from the spec's `securitySchemes` map.
    pub name: String,
    /// Classified kind.
    pub kind: SchemeKind,
    /// For apiKey schemes: the header/query/cookie parameter name.
    pub param_name: Option<String>,
    /// For http bearer: optional format hint.
    pub bearer_format: Option<String>,
}

/// Outcome of scheme selection, computed exactly once per run.
///
/// Every referenced scheme being unsupported is unconditionally fatal and
/// therefore surfaces as [`AppError::UnsupportedSchemesOnly`] rather than a
/// variant here.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SecuritySelection {
    /// One supported scheme chosen from the global requirements.
    Selected(SecurityScheme),
    /// Authentication disabled, or the spec declares no usable requirements.
    NoneDeclared,
}

/// Builds the name → scheme map from `components.securitySchemes`,
/// preserving declaration order.
pub fn extract_schemes(document: &Value) -> IndexMap<String, SecurityScheme> {
    let mut schemes = IndexMap::new();

    let Some(definitions) = document
        .pointer("/components/securitySchemes")
        .and_then(Value::as_object)
    else {
        return schemes;
    };

    for (name, definition) in definitions {
        schemes.insert(name.clone(), classify(name, definition));
    }

    schemes
}

/// Classifies one scheme definition into a [`SecurityScheme`].
fn classify(name: &str, definition: &Value) -> SecurityScheme {
    let raw_type = definition
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or_default();

    let kind = match raw_type {
        "http" => match definition.get("scheme").and_then(Value::as_str) {
            Some(scheme) if scheme.eq_ignore_ascii_case("bearer") => SchemeKind::HttpBearer,
            Some(scheme) if scheme.eq_ignore_ascii_case("basic") => SchemeKind::HttpBasic,
            _ => SchemeKind::Unsupported("http".to_string()),
        },
        "apiKey" => match definition.get("in").and_then(Value::as_str) {
            Some("header") => SchemeKind::ApiKeyHeader,
            Some("query") => SchemeKind::ApiKeyQuery,
            Some("cookie") => SchemeKind::ApiKeyCookie,
            _ => SchemeKind::Unsupported("apiKey".to_string()),
        },
        "mutualTLS" => SchemeKind::MutualTls,
        other => SchemeKind::Unsupported(other.to_string()),
    };

    SecurityScheme {
        name: name.to_string(),
        kind,
        param_name: definition
            .get("name")
            .and_then(Value::as_str)
            .map(str::to_string),
        bearer_format: definition
            .get("bearerFormat")
            .and_then(Value::as_str)
            .map(str::to_string),
    }
}

/// Reads the scheme names referenced by the global security requirement
/// list, in declared order. Scopes are ignored.
pub fn global_security(document: &Value) -> Vec<String> {
    let Some(requirements) = document.get("security").and_then(Value::as_array) else {
        return Vec::new();
    };

    let mut names = Vec::new();
    for requirement in requirements {
        if let Some(entry) = requirement.as_object() {
            names.extend(entry.keys().cloned());
        }
    }
    names
}

/// Selects the authentication scheme for the run.
///
/// Skipped entirely when `auth.enabled` is off. Fails with
/// [`AppError::UnsupportedSchemesOnly`] when the requirements reference
/// schemes but none classifies as supported.
pub fn select_scheme(document: &Value, config: &Config) -> AppResult<SecuritySelection> {
    if !config.auth.enabled {
        return Ok(SecuritySelection::NoneDeclared);
    }

    let schemes = extract_schemes(document);
    let requirements = global_security(document);

    if requirements.is_empty() {
        warn!("spec declares no global security requirements; generating without authentication");
        return Ok(SecuritySelection::NoneDeclared);
    }

    // Referenced schemes in requirement-list order; first occurrence wins ties.
    let mut referenced: Vec<&SecurityScheme> = Vec::new();
    for name in &requirements {
        if let Some(scheme) = schemes.get(name) {
            if !referenced.iter().any(|existing| existing.name == *name) {
                referenced.push(scheme);
            }
        }
    }

    if referenced.is_empty() {
        warn!("global security references no declared schemes; generating without authentication");
        return Ok(SecuritySelection::NoneDeclared);
    }

    let mut best: Option<&SecurityScheme> = None;
    let mut unsupported: Vec<String> = Vec::new();

    for &scheme in &referenced {
        match &scheme.kind {
            SchemeKind::Unsupported(raw_type) => {
                if !unsupported.contains(raw_type) {
                    unsupported.push(raw_type.clone());
                }
            }
            kind => {
                // Strictly-lower keeps the earliest scheme on priority ties.
                if best.map_or(true, |current| kind.priority() < current.kind.priority()) {
                    best = Some(scheme);
                }
            }
        }
    }

    match best {
        Some(scheme) => Ok(SecuritySelection::Selected(scheme.clone())),
        None => Err(AppError::UnsupportedSchemesOnly(unsupported)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn auth_enabled() -> Config {
        let mut config = Config::default();
        config.auth.enabled = true;
        config
    }

    #[test]
    fn test_priority_ordering_is_total() {
        let kinds = [
            SchemeKind::HttpBearer,
            SchemeKind::HttpBasic,
            SchemeKind::ApiKeyHeader,
            SchemeKind::ApiKeyQuery,
            SchemeKind::ApiKeyCookie,
            SchemeKind::MutualTls,
            SchemeKind::Unsupported("oauth2".to_string()),
        ];
        for window in kinds.windows(2) {
            assert!(window[0].priority() < window[1].priority());
        }
    }

    #[test]
    fn test_extract_and_classify() {
        let document = json!({
            "components": {
                "securitySchemes": {
                    "apiKeyAuth": {"type": "apiKey", "name": "X-API-Key", "in": "header"},
                    "bearerAuth": {"type": "http", "scheme": "bearer", "bearerFormat": "JWT"},
                    "basicAuth": {"type": "http", "scheme": "basic"},
                    "mtls": {"type": "mutualTLS"},
                    "oauth": {"type": "oauth2", "flows": {}}
                }
            }
        });

        let schemes = extract_schemes(&document);
        assert_eq!(schemes["apiKeyAuth"].kind, SchemeKind::ApiKeyHeader);
        assert_eq!(schemes["apiKeyAuth"].param_name.as_deref(), Some("X-API-Key"));
        assert_eq!(schemes["bearerAuth"].kind, SchemeKind::HttpBearer);
        assert_eq!(schemes["bearerAuth"].bearer_format.as_deref(), Some("JWT"));
        assert_eq!(schemes["basicAuth"].kind, SchemeKind::HttpBasic);
        assert_eq!(schemes["mtls"].kind, SchemeKind::MutualTls);
        assert_eq!(
            schemes["oauth"].kind,
            SchemeKind::Unsupported("oauth2".to_string())
        );
    }

    #[test]
    fn test_global_security_order_and_scope_ignoring() {
        let document = json!({
            "security": [
                {"apiKeyAuth": []},
                {"bearerAuth": ["read:pets", "write:pets"]}
            ]
        });
        assert_eq!(global_security(&document), vec!["apiKeyAuth", "bearerAuth"]);
    }

    #[test]
    fn test_selection_disabled_by_config() {
        let document = json!({
            "components": {"securitySchemes": {"bearerAuth": {"type": "http", "scheme": "bearer"}}},
            "security": [{"bearerAuth": []}]
        });
        let selection = select_scheme(&document, &Config::default()).unwrap();
        assert_eq!(selection, SecuritySelection::NoneDeclared);
    }

    #[test]
    fn test_bearer_beats_api_key_regardless_of_order() {
        let document = json!({
            "components": {
                "securitySchemes": {
                    "apiKeyAuth": {"type": "apiKey", "name": "X-API-Key", "in": "header"},
                    "bearerAuth": {"type": "http", "scheme": "bearer"}
                }
            },
            "security": [{"apiKeyAuth": []}, {"bearerAuth": []}]
        });

        let selection = select_scheme(&document, &auth_enabled()).unwrap();
        match selection {
            SecuritySelection::Selected(scheme) => {
                assert_eq!(scheme.name, "bearerAuth");
                assert_eq!(scheme.kind, SchemeKind::HttpBearer);
            }
            other => panic!("expected a selection, got {:?}", other),
        }
    }

    #[test]
    fn test_priority_tie_broken_by_requirement_order() {
        let document = json!({
            "components": {
                "securitySchemes": {
                    "keyOne": {"type": "apiKey", "name": "X-One", "in": "header"},
                    "keyTwo": {"type": "apiKey", "name": "X-Two", "in": "header"}
                }
            },
            "security": [{"keyTwo": []}, {"keyOne": []}]
        });

        let selection = select_scheme(&document, &auth_enabled()).unwrap();
        match selection {
            SecuritySelection::Selected(scheme) => assert_eq!(scheme.name, "keyTwo"),
            other => panic!("expected a selection, got {:?}", other),
        }
    }

    #[test]
    fn test_unsupported_only_is_fatal_and_names_types() {
        let document = json!({
            "components": {
                "securitySchemes": {
                    "oauth": {"type": "oauth2", "flows": {}},
                    "oidc": {"type": "openIdConnect", "openIdConnectUrl": "https://example.com"}
                }
            },
            "security": [{"oauth": []}, {"oidc": []}]
        });

        let err = select_scheme(&document, &auth_enabled()).unwrap_err();
        match err {
            AppError::UnsupportedSchemesOnly(types) => {
                assert_eq!(types, vec!["oauth2", "openIdConnect"]);
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_unsupported_alongside_supported_is_fine() {
        let document = json!({
            "components": {
                "securitySchemes": {
                    "oauth": {"type": "oauth2", "flows": {}},
                    "basicAuth": {"type": "http", "scheme": "basic"}
                }
            },
            "security": [{"oauth": []}, {"basicAuth": []}]
        });

        let selection = select_scheme(&document, &auth_enabled()).unwrap();
        match selection {
            SecuritySelection::Selected(scheme) => assert_eq!(scheme.name, "basicAuth"),
            other => panic!("expected a selection, got {:?}", other),
        }
    }

    #[test]
    fn test_no_requirements_is_a_warning_not_an_error() {
        let document = json!({
            "components": {"securitySchemes": {"bearerAuth": {"type": "http", "scheme": "bearer"}}}
        });
        let selection = select_scheme(&document, &auth_enabled()).unwrap();
        assert_eq!(selection, SecuritySelection::NoneDeclared);
    }

    #[test]
    fn test_requirements_referencing_undefined_schemes() {
        let document = json!({
            "security": [{"ghost": []}]
        });
        let selection = select_scheme(&document, &auth_enabled()).unwrap();
        assert_eq!(selection, SecuritySelection::NoneDeclared);
    }
}
