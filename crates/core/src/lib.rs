#![allow(clippy::result_large_err)]
//! axon-core: the Axon graph-to-Go transpiler.
//!
//! Turns an [`axon_graph::Graph`] into the text of one Go source file.
//! The pipeline runs four passes:
//!
//! 1. index -- id lookups, edge and port validation
//! 2. scope -- split into the main flow, function flows and globals
//! 3. schedule -- stable topological order per flow
//! 4. codegen -- Go text, with variable bindings and imports tracked per call
//!
//! # Public API
//!
//! - [`transpile()`] / [`transpile_with()`] -- run the whole pipeline
//! - [`TranspileConfig`] -- package clause and entry function name
//! - [`TranspileError`] / [`ErrorKind`] -- the failure taxonomy
//!
//! The pass modules are public for callers that want to inspect an
//! intermediate result, e.g. the schedule of one flow.

pub mod bindings;
pub mod error;
pub mod imports;
pub mod pass1_index;
pub mod pass2_scope;
pub mod pass3_schedule;
pub mod pass4_codegen;
pub mod transpile;

// ── Convenience re-exports ───────────────────────────────────────────

pub use error::{ErrorKind, NodeRef, TranspileError};
pub use imports::{ImportTracker, TypeRef};
pub use pass1_index::{build_index, GraphIndex};
pub use pass2_scope::{resolve_scopes, EntryKind, Flow, Scopes};
pub use pass3_schedule::schedule;
pub use transpile::{transpile, transpile_with, TranspileConfig};
