//! # Reference Resolution
//!
//! Dereferences every local `$ref` in the parsed spec, producing a tree with
//! no remaining reference nodes. Already resolved targets are cached and
//! reused rather than re-walked. The resolver tracks the chain of pointers
//! currently being expanded, so a pointer that refers back to one of its own
//! ancestors is reported as a cycle with the full chain — never partially
//! resolved.
//!
//! Only document-local pointers (`#/...`) are supported. Cross-document
//! references fail fast instead of passing through unresolved.

use crate::error::{AppError, AppResult};
use serde_json::Value;
use std::collections::HashMap;

/// Replaces every local `$ref` node in `root` with the referenced subtree.
pub fn resolve_document(root: &Value) -> AppResult<Value> {
    let mut resolver = RefResolver {
        root,
        cache: HashMap::new(),
        stack: Vec::new(),
    };
    resolver.resolve(root)
}

struct RefResolver<'a> {
    /// The unresolved document, used for pointer lookups.
    root: &'a Value,
    /// Fully resolved subtrees keyed by pointer.
    cache: HashMap<String, Value>,
    /// Pointers currently being expanded, outermost first.
    stack: Vec<String>,
}

impl RefResolver<'_> {
    fn resolve(&mut self, node: &Value) -> AppResult<Value> {
        match node {
            Value::Object(map) => {
                if let Some(Value::String(target)) = map.get("$ref") {
                    // Reference objects are replaced wholesale; any sibling
                    // keys are dropped, as OpenAPI 3.0 requires.
                    return self.resolve_pointer(target);
                }

                let mut out = serde_json::Map::new();
                for (key, value) in map {
                    out.insert(key.clone(), self.resolve(value)?);
                }
                Ok(Value::Object(out))
            }
            Value::Array(items) => {
                let resolved: AppResult<Vec<Value>> =
                    items.iter().map(|item| self.resolve(item)).collect();
                Ok(Value::Array(resolved?))
            }
            scalar => Ok(scalar.clone()),
        }
    }

    fn resolve_pointer(&mut self, target: &str) -> AppResult<Value> {
        if !target.starts_with("#/") {
            return Err(AppError::UnsupportedReference(target.to_string()));
        }

        if let Some(cached) = self.cache.get(target) {
            return Ok(cached.clone());
        }

        if self.stack.iter().any(|ancestor| ancestor == target) {
            let mut chain = self.stack.clone();
            chain.push(target.to_string());
            return Err(AppError::CycleDetected(chain));
        }

        // `Value::pointer` applies the RFC 6901 `~0`/`~1` unescaping.
        let referenced = self
            .root
            .pointer(&target[1..])
            .ok_or_else(|| AppError::UnknownReference(target.to_string()))?;

        self.stack.push(target.to_string());
        let resolved = self.resolve(referenced)?;
        self.stack.pop();

        self.cache.insert(target.to_string(), resolved.clone());
        Ok(resolved)
    }
}
