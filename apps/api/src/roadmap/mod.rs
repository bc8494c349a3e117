//! Roadmap generation and normalization pipeline.
//!
//! `prompts` builds the instruction, `parser` types the untrusted reply,
//! `graph` turns steps into nodes and edges, `layout` assigns coordinates,
//! and `pipeline` strings them together behind the HTTP handlers.

pub mod graph;
pub mod handlers;
pub mod layout;
pub mod parser;
pub mod pipeline;
pub mod prompts;
