use serde::Serialize;
use serde_json::{Map, Value};

use crate::authz::types::Attributes;

/// Outcome of a permission query. Denial is a value, not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Decision {
    granted: bool,
    attributes: Attributes,
}

impl Decision {
    pub fn granted(attributes: Attributes) -> Self {
        Self {
            granted: true,
            attributes,
        }
    }

    pub fn denied() -> Self {
        Self {
            granted: false,
            attributes: Attributes::none(),
        }
    }

    pub fn is_granted(&self) -> bool {
        self.granted
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Whether `field` may be read or written under this decision.
    pub fn allows(&self, field: &str) -> bool {
        self.granted && self.attributes.contains(field)
    }

    /// Strip fields outside the permitted set from a resource (or a list of them).
    /// A denied decision yields an empty value of the same shape.
    pub fn filter(&self, data: &Value) -> Value {
        if !self.granted {
            return match data {
                Value::Array(_) => Value::Array(Vec::new()),
                Value::Object(_) => Value::Object(Map::new()),
                _ => Value::Null,
            };
        }
        match data {
            Value::Array(items) => Value::Array(items.iter().map(|i| self.filter(i)).collect()),
            Value::Object(_) if self.attributes.is_all() => data.clone(),
            Value::Object(fields) => {
                let kept: Map<String, Value> = fields
                    .iter()
                    .filter(|(k, _)| self.allows(k))
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect();
                Value::Object(kept)
            }
            other => other.clone(),
        }
    }

    /// Fields of an update payload that this decision does not cover.
    pub fn rejected_fields(&self, payload: &Value) -> Vec<String> {
        payload
            .as_object()
            .map(|fields| {
                fields
                    .keys()
                    .filter(|k| !self.allows(k))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
}
