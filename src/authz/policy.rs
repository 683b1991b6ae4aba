use serde_json::Value;

use crate::authz::condition::Condition;
use crate::authz::errors::AuthzError;
use crate::authz::types::*;
use kdl::{KdlDocument, KdlNode, KdlValue};

/// Parse a KDL document string into typed policy structs.
///
/// ```kdl
/// grant "user" {
///     execute "read" on="users" {
///         - "_id"
///         - "email"
///     }
///     condition "EQUALS" requester="$.owner"
///     execute "delete" on="user"
/// }
/// ```
pub fn parse_kdl_document(source: &str) -> Result<ParsedPolicy, AuthzError> {
    let doc: KdlDocument = source
        .parse()
        .map_err(|e: kdl::KdlError| AuthzError::KdlParse(e.to_string()))?;

    let mut policy = ParsedPolicy::default();

    for node in doc.nodes() {
        match node.name().value() {
            "grant" => {
                let role = first_string_arg(node).ok_or_else(|| {
                    AuthzError::InvalidGrant(
                        "grant node requires a role argument (e.g. grant \"user\" { ... })".into(),
                    )
                })?;

                let mut statements = Vec::new();
                if let Some(children) = node.children() {
                    for child in children.nodes() {
                        statements.push(parse_statement(&role, child)?);
                    }
                }

                policy.blocks.push(RoleBlock { role, statements });
            }
            other => {
                tracing::warn!("ignoring unknown top-level KDL node `{other}`");
            }
        }
    }

    Ok(policy)
}

fn parse_statement(role: &str, node: &KdlNode) -> Result<PolicyStatement, AuthzError> {
    match node.name().value() {
        "condition" => {
            let function = first_string_arg(node).ok_or_else(|| {
                AuthzError::InvalidPolicy(format!(
                    "condition in grant `{role}` requires a function name (e.g. condition \"EQUALS\" requester=\"$.owner\")"
                ))
            })?;
            let mut condition = Condition::new(function);
            for entry in node.entries() {
                if let Some(key) = entry.name() {
                    condition = condition.arg(key.value(), kdl_to_json(entry.value()));
                }
            }
            Ok(PolicyStatement::Condition(condition))
        }
        "execute" => {
            let action = first_string_arg(node).ok_or_else(|| {
                AuthzError::InvalidGrant(format!(
                    "execute in grant `{role}` requires an action argument (e.g. execute \"read\" on=\"users\")"
                ))
            })?;
            let resource = node
                .get("on")
                .and_then(|v| v.as_string())
                .ok_or_else(|| {
                    AuthzError::InvalidGrant(format!(
                        "execute `{action}` in grant `{role}` missing `on` property (e.g. on=\"users\")"
                    ))
                })?
                .to_string();
            Ok(PolicyStatement::Execute {
                action,
                resource,
                attributes: Attributes::list(dash_list(node)),
            })
        }
        other => Err(AuthzError::InvalidPolicy(format!(
            "unexpected child `{other}` in grant `{role}` (expected `condition` or `execute`)"
        ))),
    }
}

/// Extract the first string argument from a KDL node.
fn first_string_arg(node: &KdlNode) -> Option<String> {
    node.entries()
        .iter()
        .find(|e| e.name().is_none())
        .and_then(|e| e.value().as_string())
        .map(|s| s.to_string())
}

/// Extract dash-list children: nodes named "-" whose first argument is a string.
fn dash_list(node: &KdlNode) -> Vec<String> {
    let Some(children) = node.children() else {
        return Vec::new();
    };
    children
        .nodes()
        .iter()
        .filter(|n| match n.name().value() {
            "-" => true,
            other => {
                tracing::warn!(
                    "ignoring `{other}` under `{}`; attributes are `- \"field\"` entries",
                    node.name().value()
                );
                false
            }
        })
        .filter_map(first_string_arg)
        .collect()
}

fn kdl_to_json(value: &KdlValue) -> Value {
    if let Some(s) = value.as_string() {
        Value::from(s)
    } else if let Some(n) = value.as_integer() {
        i64::try_from(n)
            .map(Value::from)
            .unwrap_or_else(|_| Value::from(n as f64))
    } else if let Some(f) = value.as_float() {
        Value::from(f)
    } else if let Some(b) = value.as_bool() {
        Value::Bool(b)
    } else {
        Value::Null
    }
}
