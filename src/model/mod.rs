mod declaration;
mod index;

pub use declaration::{
    Annotation, Lifetime, MemberDecl, MemberKind, Param, Span, TypeDecl, TypeKind, TypeRef,
    Visibility, DEPENDENCY_MARKER,
};
pub use index::{AutoInterfaceLink, AutoInterfaces, DeclarationSet};
