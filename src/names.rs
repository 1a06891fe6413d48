//! # Function Name Generation
//!
//! Derives one safe identifier per retained endpoint from its operationId.
//! Two endpoints normalizing to the same identifier is fatal: silently
//! disambiguating (suffixes, counters) would mask a spec inconsistency the
//! caller needs to see. The identifier doubles as the function's logical
//! name, its artifact name and the infra module's per-function key.

use crate::catalog::Endpoint;
use crate::error::{AppError, AppResult};
use indexmap::IndexMap;

/// Normalizes an operationId into an identifier: lower-cased, runs of
/// non-alphanumeric characters replaced by a single underscore,
/// leading/trailing underscores trimmed.
pub fn normalize_identifier(operation_id: &str) -> String {
    let mut out = String::with_capacity(operation_id.len());
    let mut last_was_underscore = false;

    for c in operation_id.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
            last_was_underscore = false;
        } else if !last_was_underscore {
            out.push('_');
            last_was_underscore = true;
        }
    }

    out.trim_matches('_').to_string()
}

/// Derives identifiers for the retained endpoints, in catalog order.
///
/// Fails with [`AppError::AmbiguousFunctionName`] on the first collision,
/// naming both originating endpoints.
pub fn assign_identifiers(endpoints: &[Endpoint]) -> AppResult<Vec<String>> {
    let mut seen: IndexMap<String, &Endpoint> = IndexMap::new();
    let mut identifiers = Vec::with_capacity(endpoints.len());

    for endpoint in endpoints {
        let identifier = normalize_identifier(&endpoint.operation_id);

        if identifier.is_empty() {
            return Err(AppError::General(format!(
                "operationId '{}' ({} {}) normalizes to an empty identifier",
                endpoint.operation_id,
                endpoint.method.to_uppercase(),
                endpoint.path
            )));
        }

        if let Some(&previous) = seen.get(&identifier) {
            return Err(AppError::AmbiguousFunctionName {
                name: identifier,
                first: describe(previous),
                second: describe(endpoint),
            });
        }

        seen.insert(identifier.clone(), endpoint);
        identifiers.push(identifier);
    }

    Ok(identifiers)
}

fn describe(endpoint: &Endpoint) -> String {
    format!("{} {}", endpoint.method.to_uppercase(), endpoint.path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoint(path: &str, method: &str, operation_id: &str) -> Endpoint {
        Endpoint {
            path: path.to_string(),
            method: method.to_string(),
            operation_id: operation_id.to_string(),
            tags: Vec::new(),
            parameters: Vec::new(),
            summary: None,
        }
    }

    #[test]
    fn test_normalize_lowercases() {
        assert_eq!(normalize_identifier("ListPets"), "listpets");
    }

    #[test]
    fn test_normalize_collapses_runs() {
        assert_eq!(normalize_identifier("get - pet..by id"), "get_pet_by_id");
    }

    #[test]
    fn test_normalize_trims_underscores() {
        assert_eq!(normalize_identifier("__getPet__"), "getpet");
        assert_eq!(normalize_identifier("-getPet-"), "getpet");
    }

    #[test]
    fn test_assign_unique_identifiers() {
        let endpoints = vec![
            endpoint("/pets", "get", "listPets"),
            endpoint("/pets/{id}", "get", "getPet"),
        ];
        let identifiers = assign_identifiers(&endpoints).unwrap();
        assert_eq!(identifiers, vec!["listpets", "getpet"]);
    }

    #[test]
    fn test_collision_is_fatal_and_names_both() {
        let endpoints = vec![
            endpoint("/pet/{id}", "get", "get-pet"),
            endpoint("/pets/{id}", "get", "get_pet"),
        ];
        let err = assign_identifiers(&endpoints).unwrap_err();
        match err {
            AppError::AmbiguousFunctionName { name, first, second } => {
                assert_eq!(name, "get_pet");
                assert_eq!(first, "GET /pet/{id}");
                assert_eq!(second, "GET /pets/{id}");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_empty_identifier_is_fatal() {
        let endpoints = vec![endpoint("/x", "get", "---")];
        let err = assign_identifiers(&endpoints).unwrap_err();
        assert!(matches!(err, AppError::General(_)));
    }
}
