use crate::collect::DependencySet;
use crate::generator::GeneratorConfig;
use crate::model::{DeclarationSet, MemberDecl, TypeDecl, TypeRef};

/// One synthesized initializer parameter, named and typed after the
/// dependency member it fills or forwards.
#[derive(Debug, Clone, PartialEq)]
pub struct CtorParam {
    pub name: String,
    pub ty: TypeRef,
    pub contextual: bool,
}

/// A synthesized initializer for one type.
///
/// The first `own` parameters are assigned to the type's own dependency
/// members, in declaration order; the rest are forwarded verbatim to the
/// nearest ancestor's initializer.
#[derive(Debug, Clone, PartialEq)]
pub struct Initializer {
    pub namespace: String,
    pub type_name: String,
    pub generics: Vec<String>,
    pub params: Vec<CtorParam>,
    pub own: usize,
}

impl Initializer {
    pub fn own_params(&self) -> &[CtorParam] {
        &self.params[..self.own]
    }

    pub fn base_params(&self) -> &[CtorParam] {
        &self.params[self.own..]
    }

    pub fn chains_base(&self) -> bool {
        self.params.len() > self.own
    }
}

/// Synthesize the initializer for one collected type.
///
/// Parameter order is the determinism guarantee: own dependency members in
/// declaration order, then each strict ancestor's own dependency members,
/// nearest ancestor first. Ancestors are not recursed into beyond their
/// own members; each level forwards further upward through its own
/// initializer.
pub fn synthesize_initializer(
    set: &DeclarationSet,
    deps: &DependencySet<'_>,
    config: &GeneratorConfig,
) -> Initializer {
    let owner = deps.owner;
    let mut params: Vec<CtorParam> = deps
        .members
        .iter()
        .map(|m| param_for(m, owner, config))
        .collect();
    let own = params.len();
    for ancestor in set.ancestors(owner) {
        params.extend(
            ancestor
                .dependency_members()
                .map(|m| param_for(m, owner, config)),
        );
    }
    Initializer {
        namespace: owner.namespace.clone(),
        type_name: owner.name.clone(),
        generics: owner.generics.clone(),
        params,
        own,
    }
}

/// Parameters whose type matches the contextual marker are specialized
/// with the constructed type itself as generic argument, so every type
/// receives a handle scoped to its own identity.
fn param_for(member: &MemberDecl, owner: &TypeDecl, config: &GeneratorConfig) -> CtorParam {
    let contextual = member.ty.name == config.contextual_type;
    let ty = if contextual {
        let mut specialized = member.ty.clone();
        specialized.args = vec![owner.self_ref()];
        specialized
    } else {
        member.ty.clone()
    };
    CtorParam {
        name: member.name.clone(),
        ty,
        contextual,
    }
}
