#![deny(missing_docs)]

//! # faasgen
//!
//! Turns an OpenAPI 3.x description into a normalized generation model: one
//! invocable function per retained endpoint, plus the metadata needed to
//! package and deploy those functions. The pipeline runs once per process,
//! single-threaded, each stage consuming the previous stage's output:
//!
//! 1. Spec loading and reference resolution
//! 2. Endpoint cataloguing
//! 3. Include filtering
//! 4. Security scheme selection
//! 5. Server resolution
//! 6. Name generation
//! 7. Model assembly
//!
//! Failure at any stage aborts the run before any output is produced.
//! Rendering the model into source files and infrastructure config is the
//! job of a [`model::Renderer`] implementation, not this crate's core.

/// Shared error types.
pub mod error;

/// Configuration loading and validation.
pub mod config;

/// Spec fetching and format detection.
pub mod spec;

/// `$ref` dereferencing with cycle detection.
pub mod resolver;

/// Endpoint cataloguing.
pub mod catalog;

/// Include-filter policy.
pub mod filter;

/// Security scheme classification and selection.
pub mod security;

/// Server URL resolution.
pub mod server;

/// Function identifier derivation.
pub mod names;

/// The final artifact model and renderer seam.
pub mod model;

pub use catalog::{Endpoint, ParamLocation, Parameter};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use filter::IncludeFilter;
pub use model::{ArtifactModel, GeneratedFunction, JsonRenderer, Renderer};
pub use security::{SchemeKind, SecurityScheme, SecuritySelection};
pub use server::ServerConfig;

use tracing::info;

/// Runs the full pipeline and returns the assembled model.
///
/// `server_url_override` is the CLI-level base URL, used verbatim when
/// present. The configuration has already been merged with CLI values; its
/// conflict rules are checked here before any stage runs.
pub fn generate(
    namespace: &str,
    spec_source: &str,
    config: &Config,
    server_url_override: Option<&str>,
) -> AppResult<ArtifactModel> {
    config.validate()?;

    let raw = spec::load_spec(spec_source)?;
    let parsed = spec::parse_spec(&raw)?;
    spec::check_version(&parsed)?;
    let document = resolver::resolve_document(&parsed)?;
    info!("resolved spec from {}", spec_source);

    let endpoints = catalog::build_catalog(&document);
    info!("catalogued {} endpoints", endpoints.len());

    let include_filter = match &config.include_endpoints {
        Some(path) => filter::IncludeFilter::from_file(path)?,
        None => filter::IncludeFilter::empty(),
    };
    let retained = filter::apply_filter(endpoints, &include_filter);
    info!("retained {} endpoints", retained.len());

    let selection = security::select_scheme(&document, config)?;
    let server = server::resolve_base_url(&document, config, server_url_override)?;
    let identifiers = names::assign_identifiers(&retained)?;

    Ok(model::assemble(
        namespace,
        retained,
        identifiers,
        server,
        selection,
        config,
    ))
}
