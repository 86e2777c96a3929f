use serde::{Deserialize, Serialize};
use std::fmt;
use strum_macros::{Display, EnumString};

/// Annotation name marking a field or property as an externally supplied
/// dependency.
pub const DEPENDENCY_MARKER: &str = "Dep";

/// Location of a declaration in its source unit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub file: String,
    pub line: u32,
    pub column: u32,
}

impl Span {
    pub fn new(file: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// Service lifetime, declared through a type-level annotation.
///
/// Variant order is the resolution priority when a type carries more than
/// one lifetime annotation: `Transient` beats `Scoped` beats `Singleton`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
pub enum Lifetime {
    /// A new instance per request.
    Transient,
    /// One instance per unit of work.
    Scoped,
    /// One instance per process.
    Singleton,
}

impl Lifetime {
    /// Lifetimes in resolution-priority order.
    pub const PRIORITY: [Lifetime; 3] = [Lifetime::Transient, Lifetime::Scoped, Lifetime::Singleton];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeKind {
    Class,
    Interface,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Visibility {
    Public,
    Internal,
    Private,
}

/// Reference to a type by name, possibly carrying generic arguments.
///
/// The namespace is optional: references inside a declaration frequently
/// name siblings without qualification and are resolved against the
/// declaration set (same namespace first, then unique by simple name).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeRef {
    pub namespace: Option<String>,
    pub name: String,
    #[serde(default)]
    pub args: Vec<TypeRef>,
}

impl TypeRef {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            namespace: None,
            name: name.into(),
            args: Vec::new(),
        }
    }

    pub fn qualified(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
            name: name.into(),
            args: Vec::new(),
        }
    }

    pub fn with_args(mut self, args: Vec<TypeRef>) -> Self {
        self.args = args;
        self
    }

    /// Rendering with generic arguments erased, for unbound open-generic
    /// registrations: `Repo<T, U>` becomes `Repo<,>`.
    pub fn unbound(&self) -> String {
        let mut out = self.qualifier();
        out.push_str(&self.name);
        if !self.args.is_empty() {
            out.push('<');
            out.push_str(&",".repeat(self.args.len() - 1));
            out.push('>');
        }
        out
    }

    fn qualifier(&self) -> String {
        match &self.namespace {
            Some(ns) => format!("{ns}."),
            None => String::new(),
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.qualifier(), self.name)?;
        if !self.args.is_empty() {
            write!(f, "<")?;
            for (i, arg) in self.args.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{arg}")?;
            }
            write!(f, ">")?;
        }
        Ok(())
    }
}

/// Annotation attached to a type or member at model-construction time.
///
/// The core only ever asks "does X carry annotation Y"; annotation syntax
/// is the host adapter's concern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    pub name: String,
    pub span: Span,
}

impl Annotation {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    pub ty: TypeRef,
    #[serde(default)]
    pub default: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemberKind {
    Field,
    Property,
    Method {
        params: Vec<Param>,
        ret: Option<TypeRef>,
    },
    Event,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberDecl {
    pub name: String,
    pub ty: TypeRef,
    pub kind: MemberKind,
    pub visibility: Visibility,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
    pub span: Span,
}

impl MemberDecl {
    pub fn field(name: impl Into<String>, ty: TypeRef, span: Span) -> Self {
        Self {
            name: name.into(),
            ty,
            kind: MemberKind::Field,
            visibility: Visibility::Private,
            annotations: Vec::new(),
            span,
        }
    }

    pub fn property(name: impl Into<String>, ty: TypeRef, span: Span) -> Self {
        Self {
            name: name.into(),
            ty,
            kind: MemberKind::Property,
            visibility: Visibility::Public,
            annotations: Vec::new(),
            span,
        }
    }

    pub fn method(
        name: impl Into<String>,
        params: Vec<Param>,
        ret: Option<TypeRef>,
        span: Span,
    ) -> Self {
        Self {
            name: name.into(),
            ty: ret.clone().unwrap_or_else(|| TypeRef::named("void")),
            kind: MemberKind::Method { params, ret },
            visibility: Visibility::Public,
            annotations: Vec::new(),
            span,
        }
    }

    pub fn event(name: impl Into<String>, ty: TypeRef, span: Span) -> Self {
        Self {
            name: name.into(),
            ty,
            kind: MemberKind::Event,
            visibility: Visibility::Public,
            annotations: Vec::new(),
            span,
        }
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn annotated(mut self, name: impl Into<String>) -> Self {
        let span = self.span.clone();
        self.annotations.push(Annotation::new(name, span));
        self
    }

    pub fn has_annotation(&self, name: &str) -> bool {
        self.annotations.iter().any(|a| a.name == name)
    }

    /// Whether this member is an externally supplied dependency slot.
    ///
    /// Only fields and properties qualify; a marker on a method or event is
    /// ignored.
    pub fn is_dependency(&self) -> bool {
        matches!(self.kind, MemberKind::Field | MemberKind::Property)
            && self.has_annotation(DEPENDENCY_MARKER)
    }

    /// Full signature used for duplicate suppression during interface
    /// synthesis: member type, name, and for methods the parameter types,
    /// names and defaults.
    pub fn signature(&self) -> String {
        match &self.kind {
            MemberKind::Method { params, ret } => {
                let rendered: Vec<String> = params
                    .iter()
                    .map(|p| match &p.default {
                        Some(d) => format!("{} {} = {}", p.ty, p.name, d),
                        None => format!("{} {}", p.ty, p.name),
                    })
                    .collect();
                let ret = ret
                    .as_ref()
                    .map(|r| r.to_string())
                    .unwrap_or_else(|| "void".to_string());
                format!("{} {}({})", ret, self.name, rendered.join(", "))
            }
            MemberKind::Event => format!("event {} {}", self.ty, self.name),
            MemberKind::Field | MemberKind::Property => format!("{} {}", self.ty, self.name),
        }
    }
}

/// A single type declaration supplied by the host's declaration model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDecl {
    pub kind: TypeKind,
    pub namespace: String,
    pub name: String,
    #[serde(default)]
    pub generics: Vec<String>,
    #[serde(default)]
    pub base: Option<TypeRef>,
    #[serde(default)]
    pub interfaces: Vec<TypeRef>,
    #[serde(default)]
    pub members: Vec<MemberDecl>,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
    pub span: Span,
}

impl TypeDecl {
    pub fn class(namespace: impl Into<String>, name: impl Into<String>, span: Span) -> Self {
        Self::new(TypeKind::Class, namespace, name, span)
    }

    pub fn interface(namespace: impl Into<String>, name: impl Into<String>, span: Span) -> Self {
        Self::new(TypeKind::Interface, namespace, name, span)
    }

    fn new(
        kind: TypeKind,
        namespace: impl Into<String>,
        name: impl Into<String>,
        span: Span,
    ) -> Self {
        Self {
            kind,
            namespace: namespace.into(),
            name: name.into(),
            generics: Vec::new(),
            base: None,
            interfaces: Vec::new(),
            members: Vec::new(),
            annotations: Vec::new(),
            span,
        }
    }

    pub fn with_base(mut self, base: TypeRef) -> Self {
        self.base = Some(base);
        self
    }

    pub fn with_interface(mut self, interface: TypeRef) -> Self {
        self.interfaces.push(interface);
        self
    }

    pub fn with_generics(mut self, generics: Vec<&str>) -> Self {
        self.generics = generics.into_iter().map(String::from).collect();
        self
    }

    pub fn with_member(mut self, member: MemberDecl) -> Self {
        self.members.push(member);
        self
    }

    pub fn annotated(mut self, name: impl Into<String>) -> Self {
        let span = self.span.clone();
        self.annotations.push(Annotation::new(name, span));
        self
    }

    pub fn annotated_at(mut self, name: impl Into<String>, span: Span) -> Self {
        self.annotations.push(Annotation::new(name, span));
        self
    }

    pub fn has_annotation(&self, name: &str) -> bool {
        self.annotations.iter().any(|a| a.name == name)
    }

    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.namespace, self.name)
    }

    /// Reference to this declaration itself, with generic parameters
    /// carried through as arguments (so `Repo<T>` refers to itself as
    /// `Repo<T>`).
    pub fn self_ref(&self) -> TypeRef {
        TypeRef::qualified(&self.namespace, &self.name)
            .with_args(self.generics.iter().map(TypeRef::named).collect())
    }

    pub fn is_generic(&self) -> bool {
        !self.generics.is_empty()
    }

    /// Name the auto-interface for this type would carry.
    pub fn auto_interface_name(&self) -> String {
        format!("I{}", self.name)
    }

    /// Dependency members in declaration order.
    pub fn dependency_members(&self) -> impl Iterator<Item = &MemberDecl> {
        self.members.iter().filter(|m| m.is_dependency())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span() -> Span {
        Span::new("test.src", 1, 1)
    }

    #[test]
    fn type_ref_display_includes_namespace_and_args() {
        let r = TypeRef::qualified("Demo", "Repo").with_args(vec![TypeRef::named("T")]);
        assert_eq!(r.to_string(), "Demo.Repo<T>");
        assert_eq!(r.unbound(), "Demo.Repo<>");
    }

    #[test]
    fn unbound_rendering_keeps_arity() {
        let r = TypeRef::named("Map").with_args(vec![TypeRef::named("K"), TypeRef::named("V")]);
        assert_eq!(r.unbound(), "Map<,>");
    }

    #[test]
    fn dependency_members_require_marker_and_slot_kind() {
        let field = MemberDecl::field("b", TypeRef::named("B"), span()).annotated(DEPENDENCY_MARKER);
        let method = MemberDecl::method("run", vec![], None, span()).annotated(DEPENDENCY_MARKER);
        let plain = MemberDecl::field("x", TypeRef::named("X"), span());
        assert!(field.is_dependency());
        assert!(!method.is_dependency());
        assert!(!plain.is_dependency());
    }

    #[test]
    fn method_signature_includes_defaults() {
        let m = MemberDecl::method(
            "find",
            vec![Param {
                name: "limit".into(),
                ty: TypeRef::named("int"),
                default: Some("10".into()),
            }],
            Some(TypeRef::named("User")),
            span(),
        );
        assert_eq!(m.signature(), "User find(int limit = 10)");
    }

    #[test]
    fn self_ref_carries_generic_params() {
        let t = TypeDecl::class("Demo", "Repo", span()).with_generics(vec!["T"]);
        assert_eq!(t.self_ref().to_string(), "Demo.Repo<T>");
    }
}
