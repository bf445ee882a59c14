pub mod context;
pub mod document;
pub mod edit;
pub mod error;
pub mod flow;
pub mod render;
pub mod validate;
pub mod wasm;
