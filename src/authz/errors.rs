use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use miette::Diagnostic;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum AuthzError {
    #[error("Unsupported condition function `{0}`")]
    #[diagnostic(
        code(warrant::authz::unsupported_condition_function),
        help("Built-in functions: EQUALS, NOT_EQUALS, IN, GREATER_THAN, LESS_THAN. Register custom ones on the registry's evaluator")
    )]
    UnsupportedConditionFunction(String),

    #[error("Malformed query: {0}")]
    #[diagnostic(
        code(warrant::authz::malformed_query),
        help("A query needs a role, an action and a resource: can(\"user\").execute(\"read\").on(\"users\")")
    )]
    MalformedQuery(String),

    #[error("Invalid grant: {0}")]
    #[diagnostic(
        code(warrant::authz::invalid_grant),
        help("Grant syntax: grant \"role\" {{ execute \"action\" on=\"resource\" {{ - \"field\" }} }}")
    )]
    InvalidGrant(String),

    #[error("Invalid policy: {0}")]
    #[diagnostic(
        code(warrant::authz::invalid_policy),
        help("Each policy file must contain `grant` nodes with `condition` and `execute` children")
    )]
    InvalidPolicy(String),

    #[error("Failed to load policy file `{path}`")]
    #[diagnostic(
        code(warrant::authz::policy_load),
        help("Check that the file exists and contains valid KDL syntax")
    )]
    PolicyLoadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("KDL parse error: {0}")]
    #[diagnostic(
        code(warrant::authz::kdl_parse),
        help("Check the KDL syntax (https://kdl.dev); attribute lists are `- \"field\"` children")
    )]
    KdlParse(String),

    #[error("I/O error: {0}")]
    #[diagnostic(code(warrant::authz::io))]
    Io(#[from] std::io::Error),
}

impl IntoResponse for AuthzError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AuthzError::MalformedQuery(_)
            | AuthzError::InvalidGrant(_)
            | AuthzError::InvalidPolicy(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
        };
        let body = json!({ "error": message });
        (status, Json(body)).into_response()
    }
}
