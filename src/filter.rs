//! # Endpoint Filter
//!
//! Reduces the catalog using an include policy loaded from a YAML document:
//! path patterns (optionally constrained by method), operationIds and tags.
//! Matching is a logical OR across and within all three groups. Patterns are
//! compiled into segments once at load time rather than matched textually.

use crate::catalog::Endpoint;
use crate::error::{AppError, AppResult};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::warn;

/// Raw shape of the include-filter document.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FilterDocument {
    #[serde(default)]
    paths: Vec<PathEntry>,
    #[serde(default, rename = "operationIds")]
    operation_ids: Vec<String>,
    #[serde(default)]
    tags: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PathEntry {
    path: String,
    methods: Option<Vec<String>>,
}

/// One pattern segment.
#[derive(Debug, Clone, PartialEq)]
enum Segment {
    /// Must equal the path segment exactly.
    Literal(String),
    /// `*`: matches exactly one segment.
    AnyOne,
}

/// A compiled path pattern with its optional method constraint.
#[derive(Debug, Clone)]
struct PathPattern {
    segments: Vec<Segment>,
    /// Pattern ended in `**`: the remaining path may have any depth,
    /// including zero further segments.
    trailing_any: bool,
    /// Lowercased methods; `None` means all methods pass.
    methods: Option<Vec<String>>,
}

impl PathPattern {
    fn compile(entry: &PathEntry) -> AppResult<PathPattern> {
        let raw_segments: Vec<&str> = split_segments(&entry.path);
        let mut segments = Vec::with_capacity(raw_segments.len());
        let mut trailing_any = false;

        for (index, raw) in raw_segments.iter().enumerate() {
            match *raw {
                "**" => {
                    if index + 1 != raw_segments.len() {
                        return Err(AppError::InvalidIncludeFilter(format!(
                            "'**' is only allowed as the final segment: {}",
                            entry.path
                        )));
                    }
                    trailing_any = true;
                }
                "*" => segments.push(Segment::AnyOne),
                literal => segments.push(Segment::Literal(literal.to_string())),
            }
        }

        let methods = entry
            .methods
            .as_ref()
            .map(|methods| methods.iter().map(|m| m.to_lowercase()).collect());

        Ok(PathPattern {
            segments,
            trailing_any,
            methods,
        })
    }

    fn matches(&self, path: &str, method: &str) -> bool {
        if !self.matches_path(path) {
            return false;
        }

        match &self.methods {
            None => true,
            Some(methods) => methods.iter().any(|m| m == &method.to_lowercase()),
        }
    }

    fn matches_path(&self, path: &str) -> bool {
        let path_segments = split_segments(path);

        if self.trailing_any {
            if path_segments.len() < self.segments.len() {
                return false;
            }
        } else if path_segments.len() != self.segments.len() {
            return false;
        }

        self.segments
            .iter()
            .zip(path_segments.iter())
            .all(|(pattern, actual)| match pattern {
                Segment::Literal(expected) => expected == actual,
                Segment::AnyOne => true,
            })
    }
}

/// Splits a path or pattern on `/`, dropping the empty leading segment.
fn split_segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Compiled include policy. An empty filter includes everything.
#[derive(Debug, Default)]
pub struct IncludeFilter {
    patterns: Vec<PathPattern>,
    operation_ids: Vec<String>,
    tags: Vec<String>,
}

impl IncludeFilter {
    /// The include-everything filter used when no filter document is configured.
    pub fn empty() -> IncludeFilter {
        IncludeFilter::default()
    }

    /// Loads and compiles a filter document from disk.
    pub fn from_file(path: &Path) -> AppResult<IncludeFilter> {
        if !path.is_file() {
            return Err(AppError::IncludeFilterNotFound(path.display().to_string()));
        }
        let raw = fs::read_to_string(path)?;
        IncludeFilter::from_yaml(&raw)
    }

    /// Compiles a filter from a raw YAML document.
    ///
    /// A document that parses but declares no filter groups at all is
    /// rejected: it is far more likely a mistake than a request for an
    /// include-everything policy.
    pub fn from_yaml(raw: &str) -> AppResult<IncludeFilter> {
        let document: FilterDocument = serde_yaml::from_str(raw)
            .map_err(|e| AppError::InvalidIncludeFilter(e.to_string()))?;

        if document.paths.is_empty()
            && document.operation_ids.is_empty()
            && document.tags.is_empty()
        {
            return Err(AppError::InvalidIncludeFilter(
                "filter document declares no filters".to_string(),
            ));
        }

        let patterns = document
            .paths
            .iter()
            .map(PathPattern::compile)
            .collect::<AppResult<Vec<PathPattern>>>()?;

        Ok(IncludeFilter {
            patterns,
            operation_ids: document.operation_ids,
            tags: document.tags,
        })
    }

    /// Whether no filter groups are configured.
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty() && self.operation_ids.is_empty() && self.tags.is_empty()
    }

    /// Whether an endpoint survives the filter.
    pub fn is_included(&self, endpoint: &Endpoint) -> bool {
        if self.is_empty() {
            return true;
        }

        self.patterns
            .iter()
            .any(|pattern| pattern.matches(&endpoint.path, &endpoint.method))
            || self.operation_ids.contains(&endpoint.operation_id)
            || endpoint.tags.iter().any(|tag| self.tags.contains(tag))
    }
}

/// Applies the filter, preserving catalog order.
///
/// Zero retained endpoints is valid: the run proceeds with an empty model.
pub fn apply_filter(catalog: Vec<Endpoint>, filter: &IncludeFilter) -> Vec<Endpoint> {
    let retained: Vec<Endpoint> = catalog
        .into_iter()
        .filter(|endpoint| filter.is_included(endpoint))
        .collect();

    if retained.is_empty() && !filter.is_empty() {
        warn!("include filter matched no endpoints; the generated model will be empty");
    }

    retained
}
