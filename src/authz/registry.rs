use std::collections::{BTreeSet, HashMap};

use crate::authz::condition::ConditionEvaluator;
use crate::authz::engine::Query;
use crate::authz::grant::GrantBuilder;
use crate::authz::types::Grant;

/// Append-only grant store, indexed by (role, resource).
///
/// Populated once at startup (through [`Registry::grant`] or the policy
/// loader), then shared read-only, typically behind an `Arc`. Queries only
/// take `&self`, so concurrent evaluation needs no locking.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    /// (role, resource) -> grants in registration order
    by_role_resource: HashMap<(String, String), Vec<Grant>>,
    evaluator: ConditionEvaluator,
    grant_count: usize,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry whose conditions dispatch through `evaluator`.
    pub fn with_evaluator(evaluator: ConditionEvaluator) -> Self {
        Self {
            evaluator,
            ..Self::default()
        }
    }

    /// Start registering grants for `role`.
    pub fn grant(&mut self, role: impl Into<String>) -> GrantBuilder<'_> {
        GrantBuilder::new(self, role)
    }

    /// Start a permission query for `role`.
    pub fn can(&self, role: impl Into<String>) -> Query<'_> {
        Query::new(self, role)
    }

    /// Append a grant. Condition function names are not checked here.
    pub fn insert(&mut self, grant: Grant) {
        tracing::debug!(
            role = %grant.role,
            action = %grant.action,
            resource = %grant.resource,
            conditional = grant.condition.is_some(),
            "Registered grant"
        );
        self.by_role_resource
            .entry((grant.role.clone(), grant.resource.clone()))
            .or_default()
            .push(grant);
        self.grant_count += 1;
    }

    /// All grants for (role, resource), in registration order.
    pub fn grants_for(&self, role: &str, resource: &str) -> &[Grant] {
        self.by_role_resource
            .get(&(role.to_string(), resource.to_string()))
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn evaluator(&self) -> &ConditionEvaluator {
        &self.evaluator
    }

    /// For registering extra condition functions during setup.
    pub fn evaluator_mut(&mut self) -> &mut ConditionEvaluator {
        &mut self.evaluator
    }

    /// Distinct role names, sorted.
    pub fn roles(&self) -> BTreeSet<&str> {
        self.by_role_resource
            .keys()
            .map(|(role, _)| role.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.grant_count
    }

    pub fn is_empty(&self) -> bool {
        self.grant_count == 0
    }
}
