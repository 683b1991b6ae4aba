//! Declarative grant conditions and their evaluator.
//!
//! A condition names a comparison function and a set of arguments:
//!
//! ```text
//! { "Fn": "EQUALS", "args": { "requester": "$.owner" } }
//! ```
//!
//! Each argument compares the context value stored under its key (left side)
//! with its expression (right side). Expressions starting with `$` are paths
//! into the context (`$` is the context itself, `$.owner` its `owner` field,
//! `$.a.b` descends nested objects); anything else is a literal. The
//! condition holds when every argument holds.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use crate::authz::errors::AuthzError;

pub const EQUALS: &str = "EQUALS";
pub const NOT_EQUALS: &str = "NOT_EQUALS";
pub const IN: &str = "IN";
pub const GREATER_THAN: &str = "GREATER_THAN";
pub const LESS_THAN: &str = "LESS_THAN";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    #[serde(rename = "Fn")]
    pub function: String,
    #[serde(default)]
    pub args: BTreeMap<String, Value>,
}

impl Condition {
    pub fn new(function: impl Into<String>) -> Self {
        Self {
            function: function.into(),
            args: BTreeMap::new(),
        }
    }

    /// `EQUALS` with a single `context_key == path` argument.
    pub fn equals(context_key: impl Into<String>, expr: impl Into<Value>) -> Self {
        Self::new(EQUALS).arg(context_key, expr)
    }

    pub fn arg(mut self, context_key: impl Into<String>, expr: impl Into<Value>) -> Self {
        self.args.insert(context_key.into(), expr.into());
        self
    }
}

/// Compares the context value (left) with the resolved argument (right).
pub type Comparator = Arc<dyn Fn(&Value, &Value) -> bool + Send + Sync>;

/// Dispatch table from function name to comparator.
#[derive(Clone)]
pub struct ConditionEvaluator {
    functions: HashMap<String, Comparator>,
}

impl ConditionEvaluator {
    /// An evaluator with no functions at all.
    pub fn empty() -> Self {
        Self {
            functions: HashMap::new(),
        }
    }

    pub fn register<F>(&mut self, name: impl Into<String>, comparator: F)
    where
        F: Fn(&Value, &Value) -> bool + Send + Sync + 'static,
    {
        self.functions.insert(name.into(), Arc::new(comparator));
    }

    pub fn supports(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// `Ok(true)` for an absent condition. Unknown function names are an error,
    /// missing context values are a non-match.
    pub fn evaluate(
        &self,
        condition: Option<&Condition>,
        context: &Value,
    ) -> Result<bool, AuthzError> {
        let Some(condition) = condition else {
            return Ok(true);
        };

        let compare = self
            .functions
            .get(&condition.function)
            .ok_or_else(|| AuthzError::UnsupportedConditionFunction(condition.function.clone()))?;

        for (key, expr) in &condition.args {
            let Some(left) = present(context.get(key)) else {
                return Ok(false);
            };
            let Some(right) = present(operand(expr, context)) else {
                return Ok(false);
            };
            if !compare(left, right) {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

impl Default for ConditionEvaluator {
    fn default() -> Self {
        let mut evaluator = Self::empty();
        evaluator.register(EQUALS, values_equal);
        evaluator.register(NOT_EQUALS, |l, r| !values_equal(l, r));
        evaluator.register(IN, |l, r| {
            r.as_array()
                .map(|items| items.iter().any(|item| values_equal(l, item)))
                .unwrap_or(false)
        });
        evaluator.register(GREATER_THAN, |l, r| {
            numeric_order(l, r) == Some(Ordering::Greater)
        });
        evaluator.register(LESS_THAN, |l, r| numeric_order(l, r) == Some(Ordering::Less));
        evaluator
    }
}

impl fmt::Debug for ConditionEvaluator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.functions.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("ConditionEvaluator")
            .field("functions", &names)
            .finish()
    }
}

/// Resolve an argument: `$`-rooted strings are paths, everything else is literal.
fn operand<'a>(expr: &'a Value, context: &'a Value) -> Option<&'a Value> {
    match expr {
        Value::String(s) if s.starts_with('$') => resolve_path(s, context),
        literal => Some(literal),
    }
}

/// `$` -> context, `$.a.b` -> context["a"]["b"].
pub fn resolve_path<'a>(path: &str, context: &'a Value) -> Option<&'a Value> {
    let rest = path.strip_prefix('$')?;
    if rest.is_empty() {
        return Some(context);
    }
    let rest = rest.strip_prefix('.')?;
    let mut current = context;
    for seg in rest.split('.') {
        if seg.is_empty() {
            return None;
        }
        current = current.get(seg)?;
    }
    Some(current)
}

fn present(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| !v.is_null())
}

/// Numbers compare by value so `1` equals `1.0`.
fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => compare_numbers(a, b) == Some(Ordering::Equal),
        _ => left == right,
    }
}

fn numeric_order(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => compare_numbers(a, b),
        _ => None,
    }
}

/// Integers compare exactly; `f64` only when either side is a float.
fn compare_numbers(a: &Number, b: &Number) -> Option<Ordering> {
    match (as_integer(a), as_integer(b)) {
        (Some(a), Some(b)) => Some(a.cmp(&b)),
        _ => a.as_f64()?.partial_cmp(&b.as_f64()?),
    }
}

fn as_integer(n: &Number) -> Option<i128> {
    n.as_i64()
        .map(i128::from)
        .or_else(|| n.as_u64().map(i128::from))
}
