use crate::collect::DependencySet;
use crate::model::{AutoInterfaces, DeclarationSet, Lifetime, Span, TypeRef};

/// One binding of a requested service type to an implementation type and
/// lifetime. A single implementation usually produces several entries:
/// itself, each interface in its closure, and the auto-interface
/// placeholder when that sits in base position.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceEntry {
    pub service: TypeRef,
    pub implementation: TypeRef,
    pub implementation_name: String,
    pub lifetime: Lifetime,
    pub open_generic: bool,
    pub span: Span,
}

/// Build the requested-type → implementation registry.
///
/// Entry order is the regeneration stability guarantee: declaration order
/// of the implementing types, and per type self, then interfaces, then
/// the base placeholder. Generic pairs are registered once as open
/// mappings, never per closed instantiation.
pub fn build_registry(
    set: &DeclarationSet,
    links: &AutoInterfaces,
    collected: &[DependencySet<'_>],
) -> Vec<ServiceEntry> {
    let mut entries = Vec::new();
    for deps in collected {
        let Some(lifetime) = deps.lifetime else {
            continue;
        };
        let owner = deps.owner;
        let implementation = owner.self_ref();
        let open_generic = owner.is_generic();
        let entry = |service: TypeRef| ServiceEntry {
            service,
            implementation: implementation.clone(),
            implementation_name: owner.qualified_name(),
            lifetime,
            open_generic,
            span: owner.span.clone(),
        };

        entries.push(entry(implementation.clone()));
        for iref in set.interface_closure(owner) {
            entries.push(entry(iref));
        }
        if let Some(link) = links.get(owner) {
            if link.via_base {
                entries.push(entry(link.placeholder.clone()));
            }
        }
    }
    tracing::debug!(entries = entries.len(), "built registration graph");
    entries
}
