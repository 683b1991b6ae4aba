use std::path::Path;

use crate::authz::errors::AuthzError;
use crate::authz::policy::parse_kdl_document;
use crate::authz::registry::Registry;
use crate::authz::types::*;

/// Load all `.kdl` policy files from the given directory into a fresh registry.
pub fn load_policies(dir: &Path) -> Result<Registry, AuthzError> {
    let mut registry = Registry::new();
    load_policies_into(&mut registry, dir)?;
    Ok(registry)
}

/// Load all `.kdl` policy files from `dir` into `registry`, in path order.
/// Registries built this way keep any condition functions registered beforehand.
pub fn load_policies_into(registry: &mut Registry, dir: &Path) -> Result<(), AuthzError> {
    if !dir.is_dir() {
        return Err(AuthzError::InvalidPolicy(format!(
            "policies directory `{}` does not exist or is not a directory",
            dir.display()
        )));
    }

    let mut all_parsed = Vec::new();

    let mut entries: Vec<_> = std::fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .filter(|e| {
            e.path()
                .extension()
                .map(|ext| ext == "kdl")
                .unwrap_or(false)
        })
        .collect();
    entries.sort_by_key(|e| e.path());

    for entry in entries {
        let path = entry.path();
        let contents =
            std::fs::read_to_string(&path).map_err(|source| AuthzError::PolicyLoadError {
                path: path.display().to_string(),
                source,
            })?;
        all_parsed.push(parse_kdl_document(&contents)?);
    }

    let file_count = all_parsed.len();
    register_policies(registry, all_parsed);

    tracing::info!(
        files = file_count,
        grants = registry.len(),
        roles = registry.roles().len(),
        "Loaded authorization policies"
    );

    Ok(())
}

/// Replay parsed policy blocks through the grant builder.
pub fn register_policies(registry: &mut Registry, parsed: Vec<ParsedPolicy>) {
    for block in parsed.into_iter().flat_map(|p| p.blocks) {
        let mut builder = registry.grant(block.role);
        for statement in block.statements {
            builder = match statement {
                PolicyStatement::Condition(condition) => builder.condition(condition),
                PolicyStatement::Execute {
                    action,
                    resource,
                    attributes,
                } => builder.execute(action).on_attributes(resource, attributes),
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const USER_POLICY: &str = r#"
grant "user" {
    execute "read" on="users" {
        - "_id"
        - "email"
    }
    condition "EQUALS" requester="$.owner"
    execute "update" on="user" {
        - "email"
    }
    execute "delete" on="user"
}
"#;

    const ADMIN_POLICY: &str = r#"
grant "admin" {
    execute "read" on="users" {
        - "*"
    }
    execute "promote" on="user"
}
"#;

    #[test]
    fn test_register_policies() {
        let mut registry = Registry::new();
        register_policies(&mut registry, vec![parse_kdl_document(USER_POLICY).unwrap()]);
        assert_eq!(registry.len(), 3);

        let grants = registry.grants_for("user", "user");
        assert_eq!(grants.len(), 2);
        assert!(grants.iter().all(|g| g.condition.is_some()));
        assert!(registry.grants_for("user", "users")[0].condition.is_none());
    }

    #[test]
    fn test_merge_multiple_files() {
        let mut registry = Registry::new();
        register_policies(
            &mut registry,
            vec![
                parse_kdl_document(USER_POLICY).unwrap(),
                parse_kdl_document(ADMIN_POLICY).unwrap(),
            ],
        );
        assert_eq!(registry.len(), 5);
        assert_eq!(
            registry.roles().into_iter().collect::<Vec<_>>(),
            vec!["admin", "user"]
        );
    }

    #[test]
    fn test_load_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("user.kdl"), USER_POLICY).unwrap();
        std::fs::write(dir.path().join("admin.kdl"), ADMIN_POLICY).unwrap();
        // Non-KDL files are ignored
        std::fs::write(dir.path().join("README.md"), "not a policy").unwrap();

        let registry = load_policies(dir.path()).unwrap();
        assert_eq!(registry.len(), 5);

        let decision = registry
            .can("user")
            .context(json!({ "requester": "u1", "owner": "u1" }))
            .execute("update")
            .on("user")
            .unwrap();
        assert!(decision.is_granted());
        assert!(decision.allows("email"));
    }

    #[test]
    fn test_load_keeps_custom_functions() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("custom.kdl"),
            r#"
grant "user" {
    condition "ALWAYS"
    execute "read" on="doc"
}
"#,
        )
        .unwrap();

        let mut registry = Registry::new();
        registry.evaluator_mut().register("ALWAYS", |_, _| true);
        load_policies_into(&mut registry, dir.path()).unwrap();
        assert!(registry.can("user").execute("read").on("doc").unwrap().is_granted());
    }

    #[test]
    fn test_load_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("bad.kdl"), r#"grant "user" {"#).unwrap();
        let err = load_policies(dir.path()).unwrap_err();
        assert!(matches!(err, AuthzError::KdlParse(_)));
    }

    #[test]
    fn test_load_nonexistent_directory() {
        let err = load_policies(Path::new("/nonexistent/path")).unwrap_err();
        assert!(matches!(err, AuthzError::InvalidPolicy(_)));
    }
}
