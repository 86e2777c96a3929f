//! Minimal runtime counterpart of the generated registration table.
//!
//! The generator itself never resolves anything at runtime; this module
//! exists so the lifetime semantics encoded in emitted registrations have
//! an executable reference in-tree.

mod collection;
mod provider;

pub use collection::ServiceCollection;
pub use provider::ServiceProvider;
