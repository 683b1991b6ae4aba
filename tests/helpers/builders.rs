use serde_json::{Map, Value};
use warrant::authz::condition::Condition;
use warrant::authz::Registry;

/// Builder for request contexts
pub struct ContextBuilder {
    fields: Map<String, Value>,
}

impl ContextBuilder {
    pub fn requester(id: &str) -> Self {
        let mut fields = Map::new();
        fields.insert("requester".to_string(), Value::from(id));
        Self { fields }
    }

    pub fn owner(mut self, id: &str) -> Self {
        self.fields.insert("owner".to_string(), Value::from(id));
        self
    }

    pub fn with(mut self, key: &str, value: Value) -> Self {
        self.fields.insert(key.to_string(), value);
        self
    }

    pub fn build(self) -> Value {
        Value::Object(self.fields)
    }
}

/// The user/admin account policy, registered through the fluent API.
pub fn sample_registry() -> Registry {
    let mut registry = Registry::new();
    registry
        .grant("user")
        .execute("create")
        .on_attributes("user", ["email", "password", "name"])
        .execute("read")
        .on_attributes("users", ["_id", "email", "name"])
        .condition(Condition::equals("requester", "$.owner"))
        .execute("read")
        .on_attributes("user", ["*"])
        .execute("update")
        .on_attributes("user", ["email", "password", "name"])
        .execute("delete")
        .on("user");
    registry
        .grant("admin")
        .execute("read")
        .on_attributes("users", ["*"])
        .execute("read")
        .on_attributes("user", ["*"])
        .execute("update")
        .on_attributes("user", ["*"])
        .execute("delete")
        .on("user")
        .execute("promote")
        .on("user");
    registry
}
