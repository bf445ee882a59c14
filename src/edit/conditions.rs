//! Condition key editing.
//!
//! Editing a key always rebuilds the whole branch map: renaming in place
//! cannot keep `default` last.

use indexmap::IndexMap;
use tracing::warn;

use crate::document::{DEFAULT_BRANCH, Instruction};

/// Rebuild `branches` with `edited` renamed to `new_key`.
///
/// * `edited == None` (or a key that does not exist) only adds `new_key`.
/// * `new_key` is added with an empty body before `default` if absent.
/// * Renaming onto an existing key keeps that branch and drops the body of
///   the renamed one.
/// * `default` is always present and always last.
pub fn rebuild_branches(
    branches: &IndexMap<String, Vec<Instruction>>,
    edited: Option<&str>,
    new_key: &str,
) -> IndexMap<String, Vec<Instruction>> {
    let mut rebuilt = IndexMap::new();
    let mut default_body = branches.get(DEFAULT_BRANCH).cloned();

    for (key, body) in branches {
        if key == DEFAULT_BRANCH {
            continue;
        }
        let target = if edited == Some(key.as_str()) { new_key } else { key.as_str() };
        if target != key && branches.contains_key(target) {
            if !body.is_empty() {
                warn!(
                    from = %key,
                    to = %target,
                    dropped = body.len(),
                    "condition renamed onto an existing branch, dropping its instructions"
                );
            }
            continue;
        }
        if target == DEFAULT_BRANCH {
            default_body = Some(body.clone());
            continue;
        }
        rebuilt.insert(target.to_string(), body.clone());
    }

    if new_key != DEFAULT_BRANCH {
        rebuilt.entry(new_key.to_string()).or_default();
    }
    rebuilt.insert(DEFAULT_BRANCH.to_string(), default_body.unwrap_or_default());
    rebuilt
}
