//! # Endpoint Catalog
//!
//! Flattens the resolved document's nested path → operation mapping into one
//! ordered list of [`Endpoint`] records. Every later stage operates on this
//! list and never re-walks the tree. Order is spec declaration order, which
//! makes all downstream tie-breaks deterministic.

use serde::Serialize;
use serde_json::Value;

/// The fixed set of HTTP method keys recognized inside a path item.
/// Other keys (`parameters`, `summary`, `x-` extensions) are not operations.
pub const HTTP_METHODS: [&str; 8] = [
    "get", "put", "post", "delete", "options", "head", "patch", "trace",
];

/// Where a parameter is carried in the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamLocation {
    /// URL path segment, e.g. `/pets/{id}`.
    Path,
    /// Query string.
    Query,
    /// Request header.
    Header,
    /// Cookie.
    Cookie,
}

impl ParamLocation {
    fn parse(raw: &str) -> Option<ParamLocation> {
        match raw {
            "path" => Some(ParamLocation::Path),
            "query" => Some(ParamLocation::Query),
            "header" => Some(ParamLocation::Header),
            "cookie" => Some(ParamLocation::Cookie),
            _ => None,
        }
    }
}

/// One parameter accepted by an endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Parameter {
    /// Parameter name in the source, e.g. "id".
    pub name: String,
    /// Where the parameter is carried.
    pub location: ParamLocation,
    /// Whether the parameter must be supplied.
    pub required: bool,
    /// Schema subtree, already dereferenced.
    pub schema: Option<Value>,
}

/// One (path, method) operation from the spec.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Endpoint {
    /// The URL path, e.g. "/pets/{id}".
    pub path: String,
    /// HTTP method key, lowercase.
    pub method: String,
    /// Declared operationId, or the derived `{method}_{slug}` default.
    pub operation_id: String,
    /// Tags declared on the operation.
    pub tags: Vec<String>,
    /// Merged path-level and operation-level parameters.
    pub parameters: Vec<Parameter>,
    /// Operation summary, when declared.
    pub summary: Option<String>,
}

/// Walks the document's path map into the ordered endpoint list.
///
/// Path-level parameters apply to every operation under the path;
/// operation-level entries override them on a (name, location) match.
pub fn build_catalog(document: &Value) -> Vec<Endpoint> {
    let mut catalog = Vec::new();

    let Some(paths) = document.get("paths").and_then(Value::as_object) else {
        return catalog;
    };

    for (path, item) in paths {
        let Some(item) = item.as_object() else {
            continue;
        };

        let path_params = item
            .get("parameters")
            .map(parse_parameters)
            .unwrap_or_default();

        for method in HTTP_METHODS {
            let Some(operation) = item.get(method).and_then(Value::as_object) else {
                continue;
            };

            let op_params = operation
                .get("parameters")
                .map(parse_parameters)
                .unwrap_or_default();

            let operation_id = operation
                .get("operationId")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| format!("{}_{}", method, slugify_path(path)));

            let tags = operation
                .get("tags")
                .and_then(Value::as_array)
                .map(|tags| {
                    tags.iter()
                        .filter_map(Value::as_str)
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default();

            let summary = operation
                .get("summary")
                .and_then(Value::as_str)
                .map(str::to_string);

            catalog.push(Endpoint {
                path: path.clone(),
                method: method.to_string(),
                operation_id,
                tags,
                parameters: merge_parameters(&path_params, op_params),
                summary,
            });
        }
    }

    catalog
}

/// Parses a parameter array, skipping entries that don't have the required shape.
fn parse_parameters(raw: &Value) -> Vec<Parameter> {
    let Some(entries) = raw.as_array() else {
        return Vec::new();
    };

    entries
        .iter()
        .filter_map(|entry| {
            let name = entry.get("name")?.as_str()?.to_string();
            let location = ParamLocation::parse(entry.get("in")?.as_str()?)?;
            Some(Parameter {
                name,
                location,
                required: entry
                    .get("required")
                    .and_then(Value::as_bool)
                    .unwrap_or(false),
                schema: entry.get("schema").cloned(),
            })
        })
        .collect()
}

/// Merges path-level and operation-level parameters.
///
/// Keeps path-level order, replacing entries the operation overrides and
/// appending the operation's new ones.
fn merge_parameters(path_params: &[Parameter], op_params: Vec<Parameter>) -> Vec<Parameter> {
    let mut merged: Vec<Parameter> = path_params.to_vec();

    for op_param in op_params {
        match merged
            .iter_mut()
            .find(|p| p.name == op_param.name && p.location == op_param.location)
        {
            Some(existing) => *existing = op_param,
            None => merged.push(op_param),
        }
    }

    merged
}

/// Derives the default operationId slug from a path.
///
/// `/`, `{` and `}` become `_`; duplicate underscores collapse and
/// leading/trailing ones are trimmed.
fn slugify_path(path: &str) -> String {
    let mut slug = String::with_capacity(path.len());
    let mut last_was_underscore = false;

    for c in path.chars() {
        let mapped = if matches!(c, '/' | '{' | '}') { '_' } else { c };
        if mapped == '_' {
            if !last_was_underscore {
                slug.push('_');
            }
            last_was_underscore = true;
        } else {
            slug.push(mapped);
            last_was_underscore = false;
        }
    }

    slug.trim_matches('_').to_string()
}
