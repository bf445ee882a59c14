//! Unified builder error type used across all phases.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Parse,
    Project,
    Validate,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Parse => write!(f, "Parse"),
            Phase::Project => write!(f, "Project"),
            Phase::Validate => write!(f, "Validate"),
        }
    }
}

/// Error raised for unparseable input, contract violations in the edit
/// projector, and structural problems found in a compiled flow.
///
/// Malformed-but-plausible documents never produce one of these: the
/// compiler degrades instead.
#[derive(Debug, Clone, Error)]
#[error("[{phase}:{code}] {message}{}", node_suffix(.node_id))]
pub struct BuilderError {
    pub code: String,
    pub phase: Phase,
    pub message: String,
    pub node_id: Option<String>,
}

fn node_suffix(node_id: &Option<String>) -> String {
    match node_id {
        Some(id) => format!(" (node '{}')", id),
        None => String::new(),
    }
}

impl BuilderError {
    pub fn parse(code: &str, message: impl Into<String>) -> Self {
        BuilderError {
            code: code.into(),
            phase: Phase::Parse,
            message: message.into(),
            node_id: None,
        }
    }

    pub fn project(code: &str, message: impl Into<String>) -> Self {
        BuilderError {
            code: code.into(),
            phase: Phase::Project,
            message: message.into(),
            node_id: None,
        }
    }

    pub fn validate(code: &str, message: impl Into<String>, node_id: Option<String>) -> Self {
        BuilderError {
            code: code.into(),
            phase: Phase::Validate,
            message: message.into(),
            node_id,
        }
    }
}
