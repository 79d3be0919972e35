use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::Error;

/// Addressing key of one resource instance.
///
/// - `NoKey`: singleton resource (no `count`/`for_each`)
/// - `Int`: `count`-based repetition
/// - `Str`: `for_each`-based repetition
///
/// In state-file JSON the key lives in `index_key`: absent or `null` for
/// `NoKey`, a number for `Int`, a string for `Str`. Anything else is rejected
/// at decode time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub enum InstanceKey {
    #[default]
    NoKey,
    Int(i64),
    Str(String),
}

impl InstanceKey {
    /// Canonical address suffix: `""`, `[0]` or `["name"]`.
    pub fn render(&self) -> String {
        match self {
            InstanceKey::NoKey => String::new(),
            InstanceKey::Int(n) => format!("[{}]", n),
            InstanceKey::Str(s) => {
                // Serializing a &str cannot fail
                let quoted = serde_json::to_string(s).unwrap_or_default();
                format!("[{}]", quoted)
            }
        }
    }
}

impl fmt::Display for InstanceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl From<i64> for InstanceKey {
    fn from(n: i64) -> Self {
        InstanceKey::Int(n)
    }
}

impl From<i32> for InstanceKey {
    fn from(n: i32) -> Self {
        InstanceKey::Int(i64::from(n))
    }
}

impl From<&str> for InstanceKey {
    fn from(s: &str) -> Self {
        InstanceKey::Str(s.to_string())
    }
}

impl From<String> for InstanceKey {
    fn from(s: String) -> Self {
        InstanceKey::Str(s)
    }
}

impl TryFrom<Value> for InstanceKey {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Null => Ok(InstanceKey::NoKey),
            Value::String(s) => Ok(InstanceKey::Str(s)),
            Value::Number(ref n) => n
                .as_i64()
                .map(InstanceKey::Int)
                .ok_or_else(|| Error::InvalidInstanceKey(value.to_string())),
            other => Err(Error::InvalidInstanceKey(other.to_string())),
        }
    }
}

impl From<InstanceKey> for Value {
    fn from(key: InstanceKey) -> Self {
        match key {
            InstanceKey::NoKey => Value::Null,
            InstanceKey::Int(n) => Value::from(n),
            InstanceKey::Str(s) => Value::String(s),
        }
    }
}
