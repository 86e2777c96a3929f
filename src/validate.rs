use crate::collect::DependencySet;
use crate::diagnostics::Diagnostic;
use crate::model::{DeclarationSet, Span, TypeRef};
use crate::registry::ServiceEntry;
use crate::synth::Initializer;
use std::collections::HashSet;

/// Run both validation passes over the finished graph.
///
/// Neither pass blocks emission: duplicate lifetimes already resolved by
/// priority during collection, and a missing dependency may legitimately
/// be supplied outside the generated table, so it stays a warning.
/// `collected` and `initializers` are index-aligned, as produced by the
/// generator.
pub fn validate(
    set: &DeclarationSet,
    collected: &[DependencySet<'_>],
    initializers: &[Initializer],
    entries: &[ServiceEntry],
) -> Vec<Diagnostic> {
    let mut diagnostics = duplicate_lifetimes(collected);
    diagnostics.extend(missing_dependencies(set, collected, initializers, entries));
    tracing::debug!(count = diagnostics.len(), "validation finished");
    diagnostics
}

/// One error per distinct conflicting-annotation span.
fn duplicate_lifetimes(collected: &[DependencySet<'_>]) -> Vec<Diagnostic> {
    let mut seen: HashSet<Span> = HashSet::new();
    let mut diagnostics = Vec::new();
    for deps in collected {
        for span in &deps.duplicate_spans {
            if seen.insert(span.clone()) {
                diagnostics.push(Diagnostic::duplicate_lifetime(span.clone()));
            }
        }
    }
    diagnostics
}

/// One warning per distinct unmet requirement per implementation type.
///
/// Requirements are drawn from the implementation's own dependency
/// members and its synthesized initializer parameters; contextual
/// parameters are checked under the member's declared type, since their
/// specialized form is introduced by the generator itself. Checking each
/// implementation independently covers the graph transitively, because
/// every ancestor with requirements is itself an implementation here.
fn missing_dependencies(
    set: &DeclarationSet,
    collected: &[DependencySet<'_>],
    initializers: &[Initializer],
    entries: &[ServiceEntry],
) -> Vec<Diagnostic> {
    let registered: HashSet<String> = entries
        .iter()
        .map(|e| canonical(set, &e.service))
        .collect();
    let mut diagnostics = Vec::new();

    for (deps, init) in collected.iter().zip(initializers) {
        if deps.lifetime.is_none() {
            continue;
        }
        // Requirement -> best location: the declaring member when the
        // requirement is the type's own, else the type itself.
        let mut required: Vec<(String, Span)> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        for member in &deps.members {
            let name = canonical(set, &member.ty);
            if seen.insert(name.clone()) {
                required.push((name, member.span.clone()));
            }
        }
        for param in init.base_params() {
            if param.contextual {
                continue;
            }
            let name = canonical(set, &param.ty);
            if seen.insert(name.clone()) {
                required.push((name, deps.owner.span.clone()));
            }
        }

        for (name, span) in required {
            if !registered.contains(&name) {
                diagnostics.push(Diagnostic::missing_dependency(name, span));
            }
        }
    }
    diagnostics
}

/// Requested and required types compare under one canonical rendering:
/// the declared qualified name when the reference resolves in-set, the
/// literal reference otherwise.
fn canonical(set: &DeclarationSet, r: &TypeRef) -> String {
    match set.resolve(r) {
        Some(decl) => TypeRef::qualified(&decl.namespace, &decl.name)
            .with_args(r.args.clone())
            .to_string(),
        None => r.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collect::collect_dependencies;
    use crate::generator::GeneratorConfig;
    use crate::model::{
        DeclarationSet, MemberDecl, TypeDecl, TypeRef, DEPENDENCY_MARKER,
    };
    use crate::registry::build_registry;
    use crate::synth::synthesize_initializer;

    fn span(line: u32) -> Span {
        Span::new("test.src", line, 1)
    }

    fn dep(name: &str, ty: &str, line: u32) -> MemberDecl {
        MemberDecl::field(name, TypeRef::named(ty), span(line)).annotated(DEPENDENCY_MARKER)
    }

    fn run(types: Vec<TypeDecl>) -> Vec<Diagnostic> {
        let set = DeclarationSet::new(types).unwrap();
        let links = set.auto_interfaces();
        let collected = collect_dependencies(&set);
        let config = GeneratorConfig::default();
        let initializers: Vec<Initializer> = collected
            .iter()
            .map(|d| synthesize_initializer(&set, d, &config))
            .collect();
        let entries = build_registry(&set, &links, &collected);
        validate(&set, &collected, &initializers, &entries)
    }

    #[test]
    fn satisfied_graphs_are_clean() {
        let diagnostics = run(vec![
            TypeDecl::class("Demo", "A", span(1))
                .annotated("Transient")
                .with_member(dep("b", "B", 2)),
            TypeDecl::class("Demo", "B", span(3)).annotated("Transient"),
        ]);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn each_unmet_requirement_warns_exactly_once() {
        let diagnostics = run(vec![TypeDecl::class("Demo", "A", span(1))
            .annotated("Transient")
            .with_member(dep("b", "B", 2))
            .with_member(dep("b2", "B", 3))
            .with_member(dep("c", "C", 4))]);
        assert_eq!(diagnostics.len(), 2);
        assert!(diagnostics
            .iter()
            .all(|d| d.code == Diagnostic::MISSING_DEPENDENCY));
        assert_eq!(diagnostics[0].args, ["B"]);
        assert_eq!(diagnostics[0].span, span(2));
        assert_eq!(diagnostics[1].args, ["C"]);
    }

    #[test]
    fn forwarded_requirements_degrade_to_the_type_location() {
        let diagnostics = run(vec![
            TypeDecl::class("Demo", "Base", span(1)).with_member(dep("s", "Store", 2)),
            TypeDecl::class("Demo", "Leaf", span(3))
                .annotated("Transient")
                .with_base(TypeRef::named("Base")),
        ]);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].args, ["Store"]);
        assert_eq!(diagnostics[0].span, span(3));
    }

    #[test]
    fn duplicate_lifetime_spans_are_deduplicated() {
        let diagnostics = run(vec![TypeDecl::class("Demo", "A", span(1))
            .annotated_at("Transient", span(1))
            .annotated_at("Scoped", span(2))
            .annotated_at("Singleton", span(2))]);
        let dup: Vec<&Diagnostic> = diagnostics
            .iter()
            .filter(|d| d.code == Diagnostic::DUPLICATE_LIFETIME)
            .collect();
        assert_eq!(dup.len(), 1);
        assert_eq!(dup[0].span, span(2));
    }

    #[test]
    fn unregistered_dependents_are_not_checked() {
        // A type with dependency members but no lifetime never appears in
        // the registry, so its requirements are not this graph's problem.
        let diagnostics = run(vec![
            TypeDecl::class("Demo", "Helper", span(1)).with_member(dep("x", "X", 2))
        ]);
        assert!(diagnostics.is_empty());
    }
}
