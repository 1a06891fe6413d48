//! # Error Handling
//!
//! Provides the unified `AppError` enum used across the crate.
//!
//! Every variant is fatal: the pipeline aborts before producing any output.
//! Non-fatal conditions (no security declared, a filter matching nothing) are
//! logged as warnings instead and never appear here.

use derive_more::{Display, From};

/// The Global Error Enum.
///
/// We use `derive_more` for boilerplate.
/// Note: String errors default to `General`.
#[derive(Debug, Display, From)]
pub enum AppError {
    /// Wrapper for standard IO errors.
    #[display("IO Error: {_0}")]
    Io(std::io::Error),

    /// The spec document could not be fetched from its remote source.
    #[from(ignore)]
    #[display("Unable to fetch spec: {_0}")]
    SpecFetch(String),

    /// The spec document is not parseable in any supported format.
    #[display("The spec file isn't valid JSON, YAML or TOML")]
    InvalidSpec,

    /// The document is not an OpenAPI 3.x spec.
    #[from(ignore)]
    #[display("Unsupported OpenAPI version: {_0}")]
    UnsupportedSpecVersion(String),

    /// A `$ref` chain refers back to one of its own ancestors.
    #[from(ignore)]
    #[display("Cyclic $ref detected: {}", _0.join(" -> "))]
    CycleDetected(Vec<String>),

    /// A `$ref` points outside the current document.
    #[from(ignore)]
    #[display("External $ref targets are not supported: {_0}")]
    UnsupportedReference(String),

    /// A `$ref` names a pointer that does not exist in the document.
    #[from(ignore)]
    #[display("Unknown $ref target: {_0}")]
    UnknownReference(String),

    /// The configuration file named on the command line does not exist.
    #[from(ignore)]
    #[display("Config file not found: {_0}")]
    ConfigNotFound(String),

    /// The configuration file is not valid TOML or declares unknown keys.
    #[from(ignore)]
    #[display("Invalid config file: {_0}")]
    InvalidConfig(String),

    /// Automatic authentication and a custom preprocessor were both configured.
    #[display("auth.enabled cannot be combined with a custom preprocessor")]
    ConflictingAuthConfig,

    /// A full server URL override and variable overrides were both configured.
    #[display("server.url and server.variables are mutually exclusive")]
    ConflictingServerConfig,

    /// The endpoint filter file named in the configuration does not exist.
    #[from(ignore)]
    #[display("Endpoint filter file not found: {_0}")]
    IncludeFilterNotFound(String),

    /// The endpoint filter document is malformed.
    #[from(ignore)]
    #[display("Invalid endpoint filter: {_0}")]
    InvalidIncludeFilter(String),

    /// Global security references schemes, but none of them is a supported type.
    #[from(ignore)]
    #[display("No supported security scheme in global security. Unsupported types: {}", _0.join(", "))]
    UnsupportedSchemesOnly(Vec<String>),

    /// A server URL template variable has neither an override nor a spec default.
    #[from(ignore)]
    #[display("Server URL variable {{{_0}}} has no override and no spec default")]
    UnresolvedVariable(String),

    /// The spec declares no servers and no server URL override was given.
    #[display("The spec declares no servers and no server URL override was given")]
    MissingServer,

    /// The substituted server URL is not an absolute URL.
    #[from(ignore)]
    #[display("Invalid server URL {url}: {reason}")]
    InvalidServerUrl {
        /// The substituted URL that failed to parse.
        url: String,
        /// Parser diagnostic.
        reason: String,
    },

    /// Two retained endpoints normalize to the same identifier.
    #[display("Ambiguous function name '{name}': {first} and {second} both normalize to it")]
    AmbiguousFunctionName {
        /// The colliding identifier.
        name: String,
        /// `METHOD /path` of the first endpoint that produced it.
        first: String,
        /// `METHOD /path` of the second endpoint that produced it.
        second: String,
    },

    /// Generic errors.
    #[display("General Error: {_0}")]
    General(String),
}

/// Manual implementation of the standard Error trait.
impl std::error::Error for AppError {}

/// Helper type alias for Result using AppError.
pub type AppResult<T> = Result<T, AppError>;
