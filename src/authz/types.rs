use serde::ser::{Serialize, SerializeSeq, Serializer};
use serde::Deserialize;

use crate::authz::condition::Condition;

/// Wildcard token used in policy files and on the wire for [`Attributes::All`].
pub const WILDCARD: &str = "*";

/// Field scope carried by a grant or a decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attributes {
    /// Every field of the resource.
    All,
    /// Exactly these fields, in first-seen order, without duplicates.
    Only(Vec<String>),
}

impl Attributes {
    /// No field-level disclosure (e.g. for "delete").
    pub fn none() -> Self {
        Attributes::Only(Vec::new())
    }

    /// Build an explicit list, dropping duplicates. Any `"*"` entry makes it the wildcard.
    pub fn list<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut out = Attributes::none();
        for field in fields {
            let field = field.into();
            if field == WILDCARD {
                return Attributes::All;
            }
            out.push(field);
        }
        out
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Attributes::All)
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Attributes::Only(fields) if fields.is_empty())
    }

    pub fn contains(&self, field: &str) -> bool {
        match self {
            Attributes::All => true,
            Attributes::Only(fields) => fields.iter().any(|f| f == field),
        }
    }

    /// Union `other` into `self`. The wildcard absorbs everything.
    pub fn merge(&mut self, other: &Attributes) {
        match other {
            Attributes::All => *self = Attributes::All,
            Attributes::Only(fields) => {
                for field in fields {
                    self.push(field.clone());
                }
            }
        }
    }

    fn push(&mut self, field: String) {
        if let Attributes::Only(fields) = self {
            if !fields.contains(&field) {
                fields.push(field);
            }
        }
    }
}

impl Default for Attributes {
    fn default() -> Self {
        Attributes::none()
    }
}

impl<S: Into<String>, const N: usize> From<[S; N]> for Attributes {
    fn from(fields: [S; N]) -> Self {
        Attributes::list(fields)
    }
}

impl<S: Into<String>> From<Vec<S>> for Attributes {
    fn from(fields: Vec<S>) -> Self {
        Attributes::list(fields)
    }
}

/// `"*"` for the wildcard, a JSON array otherwise.
impl Serialize for Attributes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Attributes::All => serializer.serialize_str(WILDCARD),
            Attributes::Only(fields) => {
                let mut seq = serializer.serialize_seq(Some(fields.len()))?;
                for field in fields {
                    seq.serialize_element(field)?;
                }
                seq.end()
            }
        }
    }
}

/// A registered rule. Never mutated after it enters the registry.
#[derive(Debug, Clone, PartialEq)]
pub struct Grant {
    pub role: String,
    pub action: String,
    pub resource: String,
    pub attributes: Attributes,
    /// `None` means unconditional.
    pub condition: Option<Condition>,
}

// ---------- Policy file types ----------

/// One step inside a `grant "role" { ... }` block, applied in order.
#[derive(Debug, Clone, PartialEq)]
pub enum PolicyStatement {
    /// `condition "FN" key=value...`: pending condition for later `execute` nodes.
    Condition(Condition),
    /// `execute "action" on="resource" { - "field" }`
    Execute {
        action: String,
        resource: String,
        attributes: Attributes,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct RoleBlock {
    pub role: String,
    pub statements: Vec<PolicyStatement>,
}

/// Intermediate result from parsing a single KDL file.
#[derive(Debug, Clone, Default)]
pub struct ParsedPolicy {
    pub blocks: Vec<RoleBlock>,
}

// ---------- API request types ----------

#[derive(Debug, Deserialize)]
pub struct CheckRequest {
    /// e.g. "user"
    pub role: String,
    /// e.g. "update"
    pub action: String,
    /// e.g. "user"
    pub resource: String,
    /// Values consulted by grant conditions, e.g. {"requester": "u1", "owner": "u1"}
    #[serde(default)]
    pub context: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_deduplicates_in_order() {
        let attrs = Attributes::list(["_id", "email", "_id", "name"]);
        assert_eq!(
            attrs,
            Attributes::Only(vec!["_id".into(), "email".into(), "name".into()])
        );
    }

    #[test]
    fn test_list_wildcard() {
        assert_eq!(Attributes::list(["*"]), Attributes::All);
        assert!(Attributes::list(["email", "*"]).is_all());
    }

    #[test]
    fn test_merge_union() {
        let mut attrs = Attributes::list(["x", "y"]);
        attrs.merge(&Attributes::list(["y", "z"]));
        assert_eq!(
            attrs,
            Attributes::Only(vec!["x".into(), "y".into(), "z".into()])
        );
    }

    #[test]
    fn test_merge_wildcard_dominates() {
        let mut attrs = Attributes::list(["x"]);
        attrs.merge(&Attributes::All);
        attrs.merge(&Attributes::list(["z"]));
        assert_eq!(attrs, Attributes::All);
    }

    #[test]
    fn test_serialize() {
        assert_eq!(serde_json::to_value(Attributes::All).unwrap(), "*");
        assert_eq!(
            serde_json::to_value(Attributes::list(["_id", "email"])).unwrap(),
            serde_json::json!(["_id", "email"])
        );
        assert_eq!(
            serde_json::to_value(Attributes::none()).unwrap(),
            serde_json::json!([])
        );
    }
}
