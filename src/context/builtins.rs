//! Form schemas of the builtin instructions.
//!
//! `conditions` and `all` have no `type`: they are edited through the graph,
//! never as a flat form.

use std::sync::LazyLock;

use indexmap::IndexMap;
use serde_json::json;

use super::schema::Schema;

static BUILTINS: LazyLock<IndexMap<&'static str, Schema>> = LazyLock::new(|| {
    let mut schemas = IndexMap::new();
    schemas.insert(
        "emit",
        json!({
            "type": "object",
            "required": ["event"],
            "properties": {
                "event": { "type": "string" },
                "payload": { "type": "object" },
                "private": { "type": "boolean" },
                "target": {
                    "type": "object",
                    "properties": {
                        "userTopic": { "type": "string" },
                        "userId": { "type": "string" },
                        "sessionId": { "type": "string" }
                    }
                },
                "options": {
                    "type": "object",
                    "properties": {
                        "persist": { "type": "boolean" },
                        "aggPayloadLimit": { "type": "number" }
                    }
                }
            }
        }),
    );
    schemas.insert(
        "wait",
        json!({
            "type": "object",
            "required": ["oneOf"],
            "properties": {
                "oneOf": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "required": ["event"],
                        "properties": {
                            "event": { "type": "string" },
                            "filters": { "type": "object" }
                        }
                    }
                },
                "timeout": { "type": "number" },
                "output": { "type": "string" }
            }
        }),
    );
    schemas.insert(
        "set",
        json!({
            "type": "object",
            "required": ["name"],
            "properties": {
                "name": { "type": "string" },
                "value": {},
                "type": { "type": "string", "enum": ["replace", "merge", "push"] },
                "lifespan": { "type": "string", "enum": ["auto", "24h", "1w", "1m", "session", "permanent"] }
            }
        }),
    );
    schemas.insert(
        "delete",
        json!({
            "type": "object",
            "required": ["name"],
            "properties": {
                "name": { "type": "string" }
            }
        }),
    );
    schemas.insert("conditions", json!({ "description": "Branch on expressions" }));
    schemas.insert(
        "repeat",
        json!({
            "type": "object",
            "properties": {
                "on": { "type": "string" },
                "until": { "type": "number" }
            }
        }),
    );
    schemas.insert("all", json!({ "description": "Run instructions in parallel" }));
    schemas.insert("break", json!({ "type": "object", "properties": {} }));
    schemas.insert(
        "fetch",
        json!({
            "type": "object",
            "required": ["url"],
            "properties": {
                "url": { "type": "string" },
                "method": { "type": "string", "enum": ["get", "post", "put", "patch", "delete"] },
                "headers": { "type": "object" },
                "query": { "type": "object" },
                "body": {},
                "output": { "type": "string" }
            }
        }),
    );
    schemas.insert("comment", json!({ "type": "string" }));
    schemas
});

pub fn schema(kind: &str) -> Option<&'static Schema> {
    BUILTINS.get(kind)
}

pub fn kinds() -> impl Iterator<Item = &'static str> {
    BUILTINS.keys().copied()
}
