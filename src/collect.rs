use crate::model::{DeclarationSet, Lifetime, MemberDecl, Span, TypeDecl, TypeKind};
use std::str::FromStr;

/// Everything the collector extracts from one type: its dependency members
/// in declaration order, its resolved lifetime, and the spans of any
/// conflicting lifetime annotations.
///
/// A type carrying a lifetime annotation but no dependency members still
/// yields an entry with an empty member list, so it receives a trivial
/// initializer and a registration entry.
#[derive(Debug)]
pub struct DependencySet<'a> {
    pub owner: &'a TypeDecl,
    pub members: Vec<&'a MemberDecl>,
    pub lifetime: Option<Lifetime>,
    pub duplicate_spans: Vec<Span>,
}

impl DependencySet<'_> {
    pub fn is_root(&self) -> bool {
        self.members.is_empty()
    }
}

/// Resolve the lifetime of a type from its annotations.
///
/// The first annotation of the highest-priority lifetime wins
/// (Transient > Scoped > Singleton); every other lifetime annotation is a
/// conflict and its span is recorded for the validator.
pub fn resolve_lifetime(decl: &TypeDecl) -> (Option<Lifetime>, Vec<Span>) {
    let annotated: Vec<(Lifetime, Span)> = decl
        .annotations
        .iter()
        .filter_map(|a| Lifetime::from_str(&a.name).ok().map(|l| (l, a.span.clone())))
        .collect();
    let winner_index = annotated
        .iter()
        .enumerate()
        .min_by_key(|(_, (lifetime, _))| Lifetime::PRIORITY.iter().position(|p| p == lifetime))
        .map(|(i, _)| i);
    let Some(winner_index) = winner_index else {
        return (None, Vec::new());
    };
    let lifetime = annotated[winner_index].0;
    let duplicates = annotated
        .into_iter()
        .enumerate()
        .filter(|&(i, _)| i != winner_index)
        .map(|(_, (_, span))| span)
        .collect();
    (Some(lifetime), duplicates)
}

/// Scan the declaration set for dependency members and lifetimes.
///
/// Only a type's own members are scanned; inherited dependencies are the
/// constructor synthesizer's concern. Output order follows declaration
/// order and the result is immutable for the rest of the pass.
pub fn collect_dependencies(set: &DeclarationSet) -> Vec<DependencySet<'_>> {
    let mut collected = Vec::new();
    for decl in set.iter() {
        if decl.kind != TypeKind::Class {
            continue;
        }
        let members: Vec<&MemberDecl> = decl.dependency_members().collect();
        let (lifetime, duplicate_spans) = resolve_lifetime(decl);
        if members.is_empty() && lifetime.is_none() {
            continue;
        }
        collected.push(DependencySet {
            owner: decl,
            members,
            lifetime,
            duplicate_spans,
        });
    }
    tracing::debug!(types = collected.len(), "collected dependency sets");
    collected
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MemberDecl, TypeRef, DEPENDENCY_MARKER};

    fn span(line: u32) -> Span {
        Span::new("test.src", line, 1)
    }

    #[test]
    fn members_are_collected_in_declaration_order() {
        let set = DeclarationSet::new(vec![TypeDecl::class("Demo", "A", span(1))
            .annotated("Transient")
            .with_member(
                MemberDecl::field("b", TypeRef::named("B"), span(2)).annotated(DEPENDENCY_MARKER),
            )
            .with_member(MemberDecl::field("skip", TypeRef::named("X"), span(3)))
            .with_member(
                MemberDecl::property("c", TypeRef::named("C"), span(4))
                    .annotated(DEPENDENCY_MARKER),
            )])
        .unwrap();
        let collected = collect_dependencies(&set);
        assert_eq!(collected.len(), 1);
        let names: Vec<&str> = collected[0].members.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["b", "c"]);
        assert_eq!(collected[0].lifetime, Some(Lifetime::Transient));
    }

    #[test]
    fn lifetime_only_types_become_roots() {
        let set = DeclarationSet::new(vec![
            TypeDecl::class("Demo", "B", span(1)).annotated("Singleton"),
            TypeDecl::class("Demo", "Plain", span(2)),
        ])
        .unwrap();
        let collected = collect_dependencies(&set);
        assert_eq!(collected.len(), 1);
        assert!(collected[0].is_root());
        assert_eq!(collected[0].lifetime, Some(Lifetime::Singleton));
    }

    #[test]
    fn conflicting_lifetimes_resolve_by_priority() {
        let decl = TypeDecl::class("Demo", "A", span(1))
            .annotated_at("Singleton", span(1))
            .annotated_at("Transient", span(2))
            .annotated_at("Scoped", span(3));
        let (lifetime, duplicates) = resolve_lifetime(&decl);
        assert_eq!(lifetime, Some(Lifetime::Transient));
        assert_eq!(duplicates, vec![span(1), span(3)]);
    }

    #[test]
    fn repeated_annotations_of_one_lifetime_still_conflict() {
        let decl = TypeDecl::class("Demo", "A", span(1))
            .annotated_at("Scoped", span(1))
            .annotated_at("Scoped", span(2));
        let (lifetime, duplicates) = resolve_lifetime(&decl);
        assert_eq!(lifetime, Some(Lifetime::Scoped));
        assert_eq!(duplicates, vec![span(2)]);
    }

    #[test]
    fn interfaces_are_never_collected() {
        let set = DeclarationSet::new(vec![
            TypeDecl::interface("Demo", "IA", span(1)).annotated("Transient")
        ])
        .unwrap();
        assert!(collect_dependencies(&set).is_empty());
    }
}
