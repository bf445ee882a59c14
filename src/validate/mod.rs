//! Structural validation of a compiled flow graph.
//!
//! The compiler never produces invalid graphs on its own; these checks guard
//! the wire contract with the editor (and catch regressions in layout code).

pub mod structural;

use crate::error::BuilderError;
use crate::flow::{FlowGraph, FlowIndex};

/// Validate a compiled flow. Returns all errors found.
pub fn validate_flow(flow: &FlowGraph) -> Vec<BuilderError> {
    let index = match FlowIndex::build(flow) {
        Ok(index) => index,
        Err(errors) => return errors,
    };
    structural::validate_structural(flow, &index)
}
