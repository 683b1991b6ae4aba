use serde_json::Value;

use crate::authz::decision::Decision;
use crate::authz::errors::AuthzError;
use crate::authz::registry::Registry;
use crate::authz::types::Attributes;

/// Permission query: `registry.can(role).context(ctx).execute(action).on(resource)`.
#[derive(Debug, Clone)]
#[must_use = "a query does nothing until `.on(..)` is called"]
pub struct Query<'r> {
    registry: &'r Registry,
    role: String,
    action: Option<String>,
    context: Value,
}

impl<'r> Query<'r> {
    pub(crate) fn new(registry: &'r Registry, role: impl Into<String>) -> Self {
        Self {
            registry,
            role: role.into(),
            action: None,
            context: Value::Object(Default::default()),
        }
    }

    /// Values consulted by grant conditions. Defaults to an empty object.
    pub fn context(mut self, context: Value) -> Self {
        self.context = context;
        self
    }

    pub fn execute(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    /// Evaluate against `resource`.
    pub fn on(self, resource: &str) -> Result<Decision, AuthzError> {
        let action = self.action.as_deref().ok_or_else(|| {
            AuthzError::MalformedQuery(format!(
                "no action bound for role `{}` on `{resource}`",
                self.role
            ))
        })?;
        check(self.registry, &self.role, action, resource, &self.context)
    }
}

/// Decide whether `role` may perform `action` on `resource` given `context`.
///
/// Every grant for (role, resource, action) whose condition holds contributes
/// its attributes; the decision is granted when at least one does.
pub fn check(
    registry: &Registry,
    role: &str,
    action: &str,
    resource: &str,
    context: &Value,
) -> Result<Decision, AuthzError> {
    for (name, value) in [("role", role), ("action", action), ("resource", resource)] {
        if value.is_empty() {
            return Err(AuthzError::MalformedQuery(format!("empty {name}")));
        }
    }

    let mut granted = false;
    let mut attributes = Attributes::none();

    for grant in registry
        .grants_for(role, resource)
        .iter()
        .filter(|g| g.action == action)
    {
        if registry
            .evaluator()
            .evaluate(grant.condition.as_ref(), context)?
        {
            granted = true;
            attributes.merge(&grant.attributes);
        }
    }

    let decision = if granted {
        Decision::granted(attributes)
    } else {
        Decision::denied()
    };

    tracing::debug!(
        role,
        action,
        resource,
        granted = decision.is_granted(),
        "Evaluated permission"
    );

    Ok(decision)
}
