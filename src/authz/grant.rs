//! Fluent grant registration.
//!
//! ```
//! use warrant::authz::{condition::Condition, Registry};
//!
//! let mut registry = Registry::new();
//! registry
//!     .grant("user")
//!     .execute("read")
//!     .on_attributes("users", ["_id", "email"])
//!     .condition(Condition::equals("requester", "$.owner"))
//!     .execute("update")
//!     .on_attributes("user", ["email"])
//!     .execute("delete")
//!     .on("user");
//! assert_eq!(registry.len(), 3);
//! ```

use crate::authz::condition::Condition;
use crate::authz::registry::Registry;
use crate::authz::types::{Attributes, Grant};

/// Role-bound builder. Each `execute(..).on(..)` pair registers one grant.
pub struct GrantBuilder<'r> {
    registry: &'r mut Registry,
    role: String,
    condition: Option<Condition>,
}

/// A builder with a pending action, waiting for its resource.
#[must_use = "a grant is only registered once `.on(..)` is called"]
pub struct PendingGrant<'r> {
    builder: GrantBuilder<'r>,
    action: String,
}

impl<'r> GrantBuilder<'r> {
    pub(crate) fn new(registry: &'r mut Registry, role: impl Into<String>) -> Self {
        Self {
            registry,
            role: role.into(),
            condition: None,
        }
    }

    /// Applies to every grant registered later in this chain, until replaced.
    pub fn condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    pub fn execute(self, action: impl Into<String>) -> PendingGrant<'r> {
        PendingGrant {
            builder: self,
            action: action.into(),
        }
    }

    pub fn role(&self) -> &str {
        &self.role
    }
}

impl<'r> PendingGrant<'r> {
    /// Register the grant without field-level attributes.
    pub fn on(self, resource: impl Into<String>) -> GrantBuilder<'r> {
        self.on_attributes(resource, Attributes::none())
    }

    /// Register the grant exposing `attributes` (`["*"]` or [`Attributes::All`] for every field).
    pub fn on_attributes(
        self,
        resource: impl Into<String>,
        attributes: impl Into<Attributes>,
    ) -> GrantBuilder<'r> {
        let PendingGrant { builder, action } = self;
        let grant = Grant {
            role: builder.role.clone(),
            action,
            resource: resource.into(),
            attributes: attributes.into(),
            condition: builder.condition.clone(),
        };
        builder.registry.insert(grant);
        builder
    }
}
