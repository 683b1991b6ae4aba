//! Attribute-based access control.
//!
//! Grants bind (role, action, resource) to the attributes a caller may touch,
//! optionally gated by a condition over the request context. Register them
//! once at startup, then share the [`Registry`] read-only and query it:
//!
//! ```
//! use serde_json::json;
//! use warrant::authz::{condition::Condition, Attributes, Registry};
//!
//! let mut registry = Registry::new();
//! registry
//!     .grant("user")
//!     .condition(Condition::equals("requester", "$.owner"))
//!     .execute("update")
//!     .on_attributes("user", ["email"]);
//!
//! let decision = registry
//!     .can("user")
//!     .context(json!({ "requester": "u1", "owner": "u1" }))
//!     .execute("update")
//!     .on("user")?;
//! assert!(decision.is_granted());
//! assert_eq!(decision.attributes(), &Attributes::list(["email"]));
//! # Ok::<(), warrant::authz::errors::AuthzError>(())
//! ```

pub mod condition;
pub mod decision;
pub mod engine;
pub mod errors;
pub mod grant;
pub mod loader;
pub mod policy;
pub mod registry;
pub mod types;
pub mod web;

pub use decision::Decision;
pub use engine::Query;
pub use errors::AuthzError;
pub use grant::{GrantBuilder, PendingGrant};
pub use registry::Registry;
pub use types::{Attributes, Grant};
