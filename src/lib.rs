//! # Prewire
//!
//! A build-time dependency-injection compiler.
//!
//! Prewire takes a whole-program declaration set — types annotated with
//! lifetime metadata and member-level dependency markers — builds the
//! dependency graph, validates it, and emits initializer code plus a
//! registration table. Unmet dependencies and conflicting lifetimes are
//! caught before anything runs, and the generated wiring is plain,
//! inspectable source with no reflection behind it.
//!
//! ## Pipeline
//!
//! - **Collection**: per-type dependency members and lifetime resolution
//! - **Interface synthesis**: `"I" + name` convention interfaces from a
//!   type's public surface, chained across auto-interfaced bases
//! - **Constructor synthesis**: chain-aware initializer parameter lists,
//!   own dependencies first, then each ancestor's, nearest first
//! - **Registration graph**: requested type → (implementation, lifetime)
//! - **Validation**: duplicate-lifetime errors, missing-dependency warnings
//! - **Emission**: one named source unit per initializer, synthesized
//!   interface, and consuming namespace
//!
//! ## Quick Start
//!
//! ```rust
//! use prewire::model::{DeclarationSet, MemberDecl, TypeDecl, TypeRef, Span, DEPENDENCY_MARKER};
//! use prewire::{Generator, GeneratorConfig};
//!
//! let span = Span::new("app.src", 1, 1);
//! let set = DeclarationSet::new(vec![
//!     TypeDecl::class("App", "Greeter", span.clone())
//!         .annotated("Transient")
//!         .with_member(
//!             MemberDecl::field("clock", TypeRef::named("Clock"), span.clone())
//!                 .annotated(DEPENDENCY_MARKER),
//!         ),
//!     TypeDecl::class("App", "Clock", span).annotated("Singleton"),
//! ])
//! .unwrap();
//!
//! let output = Generator::new(GeneratorConfig::default()).run(&set);
//! assert!(output.diagnostics.is_empty());
//! for unit in &output.units {
//!     println!("// {}\n{}", unit.name, unit.contents);
//! }
//! ```

pub mod collect;
pub mod container;
pub mod diagnostics;
pub mod emit;
pub mod error;
pub mod generator;
pub mod model;
pub mod registry;
pub mod synth;
pub mod validate;

// Re-export core types
pub use container::{ServiceCollection, ServiceProvider};
pub use diagnostics::{Diagnostic, Severity};
pub use emit::SourceUnit;
pub use error::{PrewireError, Result};
pub use generator::{GenerationOutput, Generator, GeneratorConfig};
pub use model::{DeclarationSet, Lifetime};
pub use registry::ServiceEntry;

/// Prelude module for convenient imports
///
/// ```
/// use prewire::prelude::*;
/// ```
pub mod prelude {
    pub use crate::container::{ServiceCollection, ServiceProvider};
    pub use crate::diagnostics::{Diagnostic, Severity};
    pub use crate::emit::SourceUnit;
    pub use crate::error::{PrewireError, Result};
    pub use crate::generator::{GenerationOutput, Generator, GeneratorConfig};
    pub use crate::model::{
        Annotation, DeclarationSet, Lifetime, MemberDecl, MemberKind, Param, Span, TypeDecl,
        TypeKind, TypeRef, Visibility, DEPENDENCY_MARKER,
    };
    pub use crate::registry::ServiceEntry;
    pub use crate::synth::{Initializer, SynthInterface};
}
