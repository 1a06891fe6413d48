//! # Artifact Model
//!
//! The immutable aggregate handed to the renderer: one
//! [`GeneratedFunction`] per retained endpoint plus security, server and
//! infrastructure metadata. Assembly is pure aggregation; every decision has
//! already been made by the earlier stages. A renderer only ever receives a
//! completely built model — there are no partial hand-offs.

use crate::catalog::Endpoint;
use crate::config::Config;
use crate::error::AppResult;
use crate::security::SecuritySelection;
use crate::server::ServerConfig;
use indexmap::IndexMap;
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;

/// One invocable unit generated for a retained endpoint.
/// Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratedFunction {
    /// Logical name, artifact name and infra key, all one value.
    pub identifier: String,
    /// The endpoint this function invokes.
    pub endpoint: Endpoint,
    /// Base URL the call is made against.
    pub base_url: String,
    /// Reference to the generated auth hook, when a scheme was selected.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security_hook_ref: Option<String>,
    /// Configured custom request preprocessor.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pre_hook_ref: Option<String>,
    /// Configured custom response postprocessor.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_hook_ref: Option<String>,
}

/// Deployment and packaging options carried through to the infra renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InfraOptions {
    /// Layer ARNs attached to every function.
    pub layers: Vec<String>,
    /// Path to code bundled into the shared dependency layer.
    pub bundle: Option<String>,
    /// Subnet IDs when functions run inside a VPC.
    pub subnets: Vec<String>,
    /// VPC ID when functions run inside a VPC.
    pub vpc_id: Option<String>,
    /// Prefix for generated IAM role names.
    pub iam_role_prefix: Option<String>,
    /// Permissions boundary ARN applied to generated roles.
    pub role_permissions_boundary: Option<String>,
    /// Whether functions enable X-Ray tracing.
    pub xray_tracing: bool,
    /// Credential cache lifetime for the auth hook, in minutes.
    pub auth_ttl_minutes: u64,
    /// Directory the renderer writes into.
    pub output_dir: PathBuf,
    /// Directory the renderer loads its templates from.
    pub template_path: PathBuf,
}

/// The final immutable aggregate handed to the renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArtifactModel {
    /// Namespace prefixed onto everything the renderer emits.
    pub namespace: String,
    /// One entry per retained endpoint, in catalog order.
    pub functions: Vec<GeneratedFunction>,
    /// The authentication decision for the run.
    pub security: SecuritySelection,
    /// The resolved base URL.
    pub server: ServerConfig,
    /// Resource tags applied to emitted artifacts.
    pub tags: IndexMap<String, String>,
    /// Deployment and packaging options.
    pub infra: InfraOptions,
}

/// Emits artifacts from a completed model.
///
/// Implementations must treat the model as read-only and be a pure function
/// of it: the same model yields a byte-identical output set.
pub trait Renderer {
    /// Renders the complete model.
    fn render(&self, model: &ArtifactModel) -> AppResult<()>;
}

/// Renderer that serializes the model as pretty-printed JSON.
///
/// Used by the shipped binary so the pipeline's output is observable; real
/// emitters (function sources, the layer directory, the infra module) plug
/// in behind the same trait.
pub struct JsonRenderer<W> {
    writer: std::cell::RefCell<W>,
}

impl JsonRenderer<std::io::Stdout> {
    /// A JSON renderer writing to stdout.
    pub fn stdout() -> Self {
        JsonRenderer {
            writer: std::cell::RefCell::new(std::io::stdout()),
        }
    }
}

impl<W: Write> JsonRenderer<W> {
    /// A JSON renderer writing to an arbitrary sink.
    pub fn new(writer: W) -> Self {
        JsonRenderer {
            writer: std::cell::RefCell::new(writer),
        }
    }
}

impl<W: Write> Renderer for JsonRenderer<W> {
    fn render(&self, model: &ArtifactModel) -> AppResult<()> {
        let rendered = serde_json::to_string_pretty(model)
            .map_err(|e| crate::error::AppError::General(e.to_string()))?;
        let mut writer = self.writer.borrow_mut();
        writeln!(writer, "{}", rendered)?;
        Ok(())
    }
}

/// Zips the retained endpoints with their identifiers and the run's
/// decisions into the final model.
///
/// `endpoints` and `identifiers` are index-aligned, both in catalog order.
pub fn assemble(
    namespace: &str,
    endpoints: Vec<Endpoint>,
    identifiers: Vec<String>,
    server: ServerConfig,
    security: SecuritySelection,
    config: &Config,
) -> ArtifactModel {
    debug_assert_eq!(endpoints.len(), identifiers.len());

    let security_hook_ref = match &security {
        SecuritySelection::Selected(_) => Some(format!("{}_auth", namespace)),
        SecuritySelection::NoneDeclared => None,
    };

    let functions = endpoints
        .into_iter()
        .zip(identifiers)
        .map(|(endpoint, identifier)| GeneratedFunction {
            identifier,
            endpoint,
            base_url: server.base_url.clone(),
            security_hook_ref: security_hook_ref.clone(),
            pre_hook_ref: config.preprocessor.clone(),
            post_hook_ref: config.postprocessor.clone(),
        })
        .collect();

    ArtifactModel {
        namespace: namespace.to_string(),
        functions,
        security,
        server,
        tags: config.tags.clone(),
        infra: InfraOptions {
            layers: config.layers.clone(),
            bundle: config.bundle.clone(),
            subnets: config.subnets.clone(),
            vpc_id: config.vpc_id.clone(),
            iam_role_prefix: config.iam_role_prefix.clone(),
            role_permissions_boundary: config.role_permissions_boundary.clone(),
            xray_tracing: config.xray_tracing,
            auth_ttl_minutes: config.auth.ttl_minutes,
            output_dir: config.output_dir.clone(),
            template_path: config.template_path.clone(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::security::{SchemeKind, SecurityScheme};

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

    fn server() -> ServerConfig {
        ServerConfig {
            base_url: "https://api.example.com".to_string(),
        }
    }

    #[test]
    fn test_assemble_zips_in_order() {
        let model = assemble(
            "petstore",
            vec![endpoint("/pets", "get", "listPets"), endpoint("/pets", "post", "createPet")],
            vec!["listpets".to_string(), "createpet".to_string()],
            server(),
            SecuritySelection::NoneDeclared,
            &Config::default(),
        );

        assert_eq!(model.namespace, "petstore");
        assert_eq!(model.functions.len(), 2);
        assert_eq!(model.functions[0].identifier, "listpets");
        assert_eq!(model.functions[0].endpoint.operation_id, "listPets");
        assert_eq!(model.functions[1].identifier, "createpet");
        assert_eq!(model.functions[0].base_url, "https://api.example.com");
        assert!(model.functions[0].security_hook_ref.is_none());
    }

    #[test]
    fn test_selected_security_sets_hook_ref() {
        let selection = SecuritySelection::Selected(SecurityScheme {
            name: "bearerAuth".to_string(),
            kind: SchemeKind::HttpBearer,
            param_name: None,
            bearer_format: None,
        });

        let model = assemble(
            "petstore",
            vec![endpoint("/pets", "get", "listPets")],
            vec!["listpets".to_string()],
            server(),
            selection,
            &Config::default(),
        );

        assert_eq!(
            model.functions[0].security_hook_ref.as_deref(),
            Some("petstore_auth")
        );
    }

    #[test]
    fn test_processor_refs_carried() {
        let mut config = Config::default();
        config.preprocessor = Some("hooks.pre.handler".to_string());
        config.postprocessor = Some("hooks.post.handler".to_string());

        let model = assemble(
            "ns",
            vec![endpoint("/x", "get", "x")],
            vec!["x".to_string()],
            server(),
            SecuritySelection::NoneDeclared,
            &config,
        );

        assert_eq!(
            model.functions[0].pre_hook_ref.as_deref(),
            Some("hooks.pre.handler")
        );
        assert_eq!(
            model.functions[0].post_hook_ref.as_deref(),
            Some("hooks.post.handler")
        );
    }

    #[test]
    fn test_empty_model_is_valid() {
        let model = assemble(
            "ns",
            Vec::new(),
            Vec::new(),
            server(),
            SecuritySelection::NoneDeclared,
            &Config::default(),
        );
        assert!(model.functions.is_empty());
    }

    #[test]
    fn test_json_renderer_is_pure() {
        let model = assemble(
            "ns",
            vec![endpoint("/pets", "get", "listPets")],
            vec!["listpets".to_string()],
            server(),
            SecuritySelection::NoneDeclared,
            &Config::default(),
        );

        let mut first = Vec::new();
        let mut second = Vec::new();
        JsonRenderer::new(&mut first).render(&model).unwrap();
        JsonRenderer::new(&mut second).render(&model).unwrap();
        assert_eq!(first, second);

        let rendered: serde_json::Value = serde_json::from_slice(&first).unwrap();
        assert_eq!(rendered["namespace"], "ns");
        assert_eq!(rendered["functions"][0]["identifier"], "listpets");
    }
}
