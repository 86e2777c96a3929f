use crate::model::{
    AutoInterfaces, DeclarationSet, MemberDecl, MemberKind, TypeDecl, TypeRef, Visibility,
};
use std::collections::HashSet;

/// An interface synthesized from a type's public surface under the
/// `"I" + name` convention.
#[derive(Debug, Clone)]
pub struct SynthInterface {
    pub namespace: String,
    pub name: String,
    pub generics: Vec<String>,
    pub parents: Vec<TypeRef>,
    pub members: Vec<MemberDecl>,
}

/// Synthesize the auto-interface for one linked type.
///
/// The interface lists every public method, property and event of the
/// type that is not already present, by full signature, in an interface
/// the type implements or inherits. If the base type is itself
/// auto-interfaced, the base's synthesized interface becomes the first
/// parent so consumers typed against the base interface keep working;
/// the remaining parents are the type's other explicit interfaces,
/// excluding the placeholder being resolved. A type with no public
/// members and no auto-interfaced base yields an empty interface.
pub fn synthesize_interface(
    set: &DeclarationSet,
    links: &AutoInterfaces,
    decl: &TypeDecl,
) -> SynthInterface {
    let inherited: HashSet<String> = set
        .interface_closure(decl)
        .iter()
        .filter_map(|iref| set.resolve(iref))
        .flat_map(|parent| parent.members.iter().map(MemberDecl::signature))
        .collect();

    let members: Vec<MemberDecl> = decl
        .members
        .iter()
        .filter(|m| m.visibility == Visibility::Public)
        .filter(|m| {
            matches!(
                m.kind,
                MemberKind::Method { .. } | MemberKind::Property | MemberKind::Event
            )
        })
        .filter(|m| !inherited.contains(&m.signature()))
        .cloned()
        .collect();

    let placeholder = decl.auto_interface_name();
    let mut parents: Vec<TypeRef> = Vec::new();
    if let Some(base_ref) = &decl.base {
        if base_ref.name != placeholder {
            if let Some(base) = set.resolve(base_ref) {
                if links.is_auto_interfaced(base) {
                    parents.push(
                        TypeRef::qualified(&base.namespace, base.auto_interface_name())
                            .with_args(base_ref.args.clone()),
                    );
                }
            }
        }
    }
    parents.extend(
        decl.interfaces
            .iter()
            .filter(|i| i.name != placeholder)
            .cloned(),
    );

    SynthInterface {
        namespace: decl.namespace.clone(),
        name: placeholder,
        generics: decl.generics.clone(),
        parents,
        members,
    }
}
