//! Rust types for the automation document edited by the console.
//!
//! The document is the JSON the console stores for an automation:
//! `{ name, slug?, when?, do: [...], output?, ... }`. Every type here
//! round-trips its input shape; keys the builder does not interpret are kept
//! verbatim so the host form receives the same shape back.

use indexmap::IndexMap;
use std::ops::Deref;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// Name of the fallback branch of a `conditions` instruction.
pub const DEFAULT_BRANCH: &str = "default";

// =============================================================================
// TOP-LEVEL DOCUMENT
// =============================================================================

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AutomationDocument {
    #[serde(
        rename = "when",
        default,
        deserialize_with = "lenient_trigger",
        skip_serializing_if = "Option::is_none"
    )]
    pub trigger: Option<Trigger>,
    /// Always an array, even when the stored `do` is missing or malformed.
    #[serde(rename = "do", default, deserialize_with = "lenient_list")]
    pub instructions: Vec<Instruction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,
    /// `name`, `slug`, `description`, `arguments`, ...
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AutomationDocument {
    pub fn slug(&self) -> Option<&str> {
        self.extra.get("slug").and_then(Value::as_str)
    }

    pub fn name(&self) -> Option<&str> {
        self.extra.get("name").and_then(Value::as_str)
    }
}

// =============================================================================
// TRIGGER
// =============================================================================

/// Activation conditions (`when`). Kept as a raw object: the builder only
/// reads a few keys and replaces the whole trigger on edit.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Trigger(pub Map<String, Value>);

/// The `when.endpoint` setting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// `endpoint: true`, served under the automation slug.
    Enabled,
    /// `endpoint: "custom-slug"`.
    Slug(String),
}

impl Trigger {
    pub fn events(&self) -> Vec<&str> {
        self.string_list("events")
    }

    pub fn schedules(&self) -> Vec<&str> {
        self.string_list("schedules")
    }

    pub fn endpoint(&self) -> Option<Endpoint> {
        match self.0.get("endpoint")? {
            Value::Bool(true) => Some(Endpoint::Enabled),
            Value::String(slug) if !slug.is_empty() => Some(Endpoint::Slug(slug.clone())),
            _ => None,
        }
    }

    fn string_list(&self, key: &str) -> Vec<&str> {
        self.0
            .get(key)
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }
}

// =============================================================================
// INSTRUCTIONS
// =============================================================================

/// One step of an automation: a single-key object whose key names the kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    Emit(Builtin<Emit>),
    Wait(Builtin<Wait>),
    Set(Builtin<Set>),
    Delete(Builtin<Delete>),
    Conditions(Conditions),
    Repeat(Repeat),
    All(Vec<Instruction>),
    /// App-provided instruction, or a builtin whose value did not match its
    /// shape. `value` is stored untouched.
    Opaque { kind: String, value: Value },
    /// Anything that is not a single-key object. Kept verbatim.
    Malformed(Value),
}

/// A leaf builtin: the typed fields the builder reads, over the stored
/// object, which is what gets written back.
#[derive(Debug, Clone)]
pub struct Builtin<T> {
    typed: T,
    raw: Map<String, Value>,
}

impl<T: DeserializeOwned> Builtin<T> {
    fn parse(payload: &Value) -> Option<Self> {
        let raw = payload.as_object()?.clone();
        let typed = serde_json::from_value(payload.clone()).ok()?;
        Some(Builtin { typed, raw })
    }
}

impl<T> Builtin<T> {
    pub fn raw(&self) -> &Map<String, Value> {
        &self.raw
    }
}

impl<T> Deref for Builtin<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.typed
    }
}

impl<T> PartialEq for Builtin<T> {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Emit {
    pub event: String,
    #[serde(default)]
    pub payload: Option<Value>,
    #[serde(default)]
    pub private: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wait {
    #[serde(default)]
    pub one_of: Vec<WaitEvent>,
    #[serde(default)]
    pub timeout: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WaitEvent {
    pub event: String,
    #[serde(default)]
    pub filters: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Set {
    pub name: String,
    #[serde(default)]
    pub value: Value,
    #[serde(default)]
    pub lifespan: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Delete {
    pub name: String,
}

/// Branches of a `conditions` instruction, in stored order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Conditions {
    pub branches: IndexMap<String, Vec<Instruction>>,
}

impl Conditions {
    /// Branch keys in traversal order: every expression in stored order, then
    /// `default` when present.
    pub fn ordered_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self
            .branches
            .keys()
            .map(String::as_str)
            .filter(|key| *key != DEFAULT_BRANCH)
            .collect();
        if self.branches.contains_key(DEFAULT_BRANCH) {
            keys.push(DEFAULT_BRANCH);
        }
        keys
    }

    pub fn branch(&self, key: &str) -> Option<&[Instruction]> {
        self.branches.get(key).map(Vec::as_slice)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Repeat {
    pub body: Vec<Instruction>,
    /// Stored object. Its `do` entry is a null slot refilled from `body`.
    raw: Map<String, Value>,
}

impl Repeat {
    pub fn on(&self) -> Option<&Value> {
        self.raw.get("on")
    }

    pub fn until(&self) -> Option<&Value> {
        self.raw.get("until")
    }

    fn payload(&self) -> Value {
        let mut object = self.raw.clone();
        // Inserting over the existing slot keeps its position
        if object.contains_key("do") || !self.body.is_empty() {
            object.insert("do".into(), list_to_value(&self.body));
        }
        Value::Object(object)
    }
}

impl Instruction {
    pub fn kind(&self) -> &str {
        match self {
            Instruction::Emit(_) => "emit",
            Instruction::Wait(_) => "wait",
            Instruction::Set(_) => "set",
            Instruction::Delete(_) => "delete",
            Instruction::Conditions(_) => "conditions",
            Instruction::Repeat(_) => "repeat",
            Instruction::All(_) => "all",
            Instruction::Opaque { kind, .. } => kind,
            Instruction::Malformed(value) => value
                .as_object()
                .and_then(|object| object.keys().next())
                .map(String::as_str)
                .unwrap_or(""),
        }
    }

    pub fn opaque(kind: impl Into<String>, value: Value) -> Self {
        Instruction::Opaque {
            kind: kind.into(),
            value,
        }
    }

    /// Interpret a stored instruction object. Never fails: anything the
    /// builder cannot interpret becomes `Opaque` or `Malformed`.
    pub fn from_value(value: Value) -> Self {
        let object = match value {
            Value::Object(object) if object.len() == 1 => object,
            other => return Instruction::Malformed(other),
        };
        let Some((kind, payload)) = object.into_iter().next() else {
            return Instruction::Malformed(Value::Object(Map::new()));
        };

        let typed = match kind.as_str() {
            "emit" => Builtin::parse(&payload).map(Instruction::Emit),
            "wait" => Builtin::parse(&payload).map(Instruction::Wait),
            "set" => Builtin::parse(&payload).map(Instruction::Set),
            "delete" => Builtin::parse(&payload).map(Instruction::Delete),
            "conditions" => conditions_from_value(&payload).map(Instruction::Conditions),
            "repeat" => repeat_from_value(&payload).map(Instruction::Repeat),
            "all" => payload
                .as_array()
                .map(|items| Instruction::All(list_from_values(items))),
            _ => None,
        };

        typed.unwrap_or(Instruction::Opaque {
            kind,
            value: payload,
        })
    }

    /// The value stored under the instruction key.
    pub fn payload(&self) -> Value {
        match self {
            Instruction::Emit(emit) => Value::Object(emit.raw.clone()),
            Instruction::Wait(wait) => Value::Object(wait.raw.clone()),
            Instruction::Set(set) => Value::Object(set.raw.clone()),
            Instruction::Delete(delete) => Value::Object(delete.raw.clone()),
            Instruction::Conditions(conditions) => Value::Object(
                conditions
                    .branches
                    .iter()
                    .map(|(key, body)| (key.clone(), list_to_value(body)))
                    .collect(),
            ),
            Instruction::Repeat(repeat) => repeat.payload(),
            Instruction::All(items) => list_to_value(items),
            Instruction::Opaque { value, .. } => value.clone(),
            Instruction::Malformed(value) => value.clone(),
        }
    }

    /// The full single-key object, as stored in the document.
    pub fn to_value(&self) -> Value {
        if let Instruction::Malformed(value) = self {
            return value.clone();
        }
        let mut object = Map::new();
        object.insert(self.kind().to_string(), self.payload());
        Value::Object(object)
    }
}

/// Every branch body must be a list; otherwise the block stays opaque.
fn conditions_from_value(payload: &Value) -> Option<Conditions> {
    let branches = payload
        .as_object()?
        .iter()
        .map(|(key, body)| Some((key.clone(), list_from_values(body.as_array()?))))
        .collect::<Option<IndexMap<_, _>>>()?;
    Some(Conditions { branches })
}

/// A `do` that is present but not a list keeps the block opaque.
fn repeat_from_value(payload: &Value) -> Option<Repeat> {
    let mut raw = payload.as_object()?.clone();
    let body = match raw.get_mut("do") {
        Some(stored) => {
            let body = list_from_values(stored.as_array()?);
            *stored = Value::Null;
            body
        }
        None => Vec::new(),
    };
    Some(Repeat { body, raw })
}

fn list_from_values(items: &[Value]) -> Vec<Instruction> {
    items.iter().cloned().map(Instruction::from_value).collect()
}

fn list_to_value(items: &[Instruction]) -> Value {
    Value::Array(items.iter().map(Instruction::to_value).collect())
}

impl Serialize for Instruction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Instruction {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Instruction::from_value)
    }
}

// =============================================================================
// LENIENT FIELDS
// =============================================================================

fn lenient_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Instruction>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => items.into_iter().map(Instruction::from_value).collect(),
        _ => Vec::new(),
    })
}

fn lenient_trigger<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Trigger>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Object(object) => Some(Trigger(object)),
        _ => None,
    })
}
