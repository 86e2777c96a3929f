use crate::error::{PrewireError, Result};
use crate::model::{TypeDecl, TypeKind, TypeRef};
use std::collections::{HashMap, HashSet};

/// The complete, immutable declaration set for one generation pass.
///
/// Every component of the pipeline works against this index; it is built
/// once, before any component runs, because naming-convention resolution
/// and ancestor walking need whole-program knowledge.
#[derive(Debug)]
pub struct DeclarationSet {
    types: Vec<TypeDecl>,
    by_name: HashMap<(String, String), usize>,
}

impl DeclarationSet {
    /// Index a declaration list. Two declarations with the same qualified
    /// name are a fatal input error.
    pub fn new(types: Vec<TypeDecl>) -> Result<Self> {
        let mut by_name = HashMap::with_capacity(types.len());
        for (i, decl) in types.iter().enumerate() {
            let key = (decl.namespace.clone(), decl.name.clone());
            if by_name.insert(key, i).is_some() {
                return Err(PrewireError::DuplicateDeclaration {
                    name: decl.qualified_name(),
                });
            }
        }
        Ok(Self { types, by_name })
    }

    pub fn iter(&self) -> impl Iterator<Item = &TypeDecl> {
        self.types.iter()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn get(&self, namespace: &str, name: &str) -> Option<&TypeDecl> {
        self.by_name
            .get(&(namespace.to_string(), name.to_string()))
            .map(|&i| &self.types[i])
    }

    /// Resolve a type reference against the set.
    ///
    /// Qualified references resolve directly. Unqualified references
    /// resolve only when exactly one declaration carries the simple name;
    /// an ambiguous or unknown name yields `None` and the caller degrades
    /// (references may legitimately point outside the declaration set).
    pub fn resolve(&self, r: &TypeRef) -> Option<&TypeDecl> {
        match &r.namespace {
            Some(ns) => self.get(ns, &r.name),
            None => {
                let mut found = None;
                for decl in &self.types {
                    if decl.name == r.name {
                        if found.is_some() {
                            return None;
                        }
                        found = Some(decl);
                    }
                }
                found
            }
        }
    }

    fn resolves_to_interface(&self, r: &TypeRef) -> bool {
        self.resolve(r).is_some_and(|d| d.kind == TypeKind::Interface)
    }

    /// Strict ancestors of `decl`, nearest first.
    ///
    /// The auto-interface placeholder in base position is not an ancestor,
    /// and neither is a hand-authored interface that the host model parked
    /// there. Inheritance is single-parent by construction, but the walk
    /// still guards against reference cycles in malformed input rather
    /// than relying on the host's restriction.
    pub fn ancestors<'a>(&'a self, decl: &'a TypeDecl) -> Vec<&'a TypeDecl> {
        let mut chain = Vec::new();
        let mut visited: HashSet<String> = HashSet::new();
        visited.insert(decl.qualified_name());
        let mut current = decl;
        while let Some(base_ref) = &current.base {
            if base_ref.name == current.auto_interface_name() {
                break;
            }
            let Some(base) = self.resolve(base_ref) else {
                break;
            };
            if base.kind == TypeKind::Interface {
                break;
            }
            if !visited.insert(base.qualified_name()) {
                tracing::warn!(
                    owner = %decl.qualified_name(),
                    through = %base.qualified_name(),
                    "inheritance cycle detected, truncating ancestor chain"
                );
                break;
            }
            chain.push(base);
            current = base;
        }
        chain
    }

    /// Full interface closure of `decl`: its own interface list in
    /// declaration order, then each ancestor's, then the parents of every
    /// interface that resolves in-set, first occurrence wins. A
    /// placeholder-named reference is excluded only when it is the genuine
    /// unresolved placeholder; one that resolves to a declared interface
    /// is a real implemented interface and stays in the closure.
    pub fn interface_closure(&self, decl: &TypeDecl) -> Vec<TypeRef> {
        let mut closure: Vec<TypeRef> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        let mut pending: Vec<TypeRef> = Vec::new();

        let mut levels = vec![decl];
        levels.extend(self.ancestors(decl));
        for level in levels {
            let placeholder = level.auto_interface_name();
            for iref in &level.interfaces {
                if iref.name == placeholder && !self.resolves_to_interface(iref) {
                    continue;
                }
                pending.push(iref.clone());
            }
            // A hand-authored interface can sit in base position when the
            // host model could not classify the first parent.
            if let Some(base_ref) = &level.base {
                if self.resolves_to_interface(base_ref) {
                    pending.push(base_ref.clone());
                }
            }
        }

        while !pending.is_empty() {
            let batch: Vec<TypeRef> = std::mem::take(&mut pending);
            for iref in batch {
                if !seen.insert(iref.to_string()) {
                    continue;
                }
                if let Some(parent) = self.resolve(&iref) {
                    pending.extend(parent.interfaces.iter().cloned());
                }
                closure.push(iref);
            }
        }
        closure
    }

    /// Resolve every naming-convention auto-interface link, once.
    ///
    /// Both the interface synthesizer and the registration graph builder
    /// consume this single resolution instead of re-matching names.
    pub fn auto_interfaces(&self) -> AutoInterfaces {
        let mut links = Vec::new();
        let mut by_owner = HashMap::new();
        for decl in &self.types {
            if decl.kind != TypeKind::Class {
                continue;
            }
            let expected = decl.auto_interface_name();
            let placeholder = decl
                .base
                .as_ref()
                .filter(|b| b.name == expected)
                .map(|b| (b.clone(), true))
                .or_else(|| {
                    decl.interfaces
                        .iter()
                        .find(|i| i.name == expected)
                        .map(|i| (i.clone(), false))
                });
            let Some((placeholder, via_base)) = placeholder else {
                continue;
            };
            // A reference that resolves to a hand-authored interface wins
            // over synthesis; the closure registers it instead.
            if self.resolves_to_interface(&placeholder) {
                continue;
            }
            by_owner.insert(decl.qualified_name(), links.len());
            links.push(AutoInterfaceLink {
                owner_namespace: decl.namespace.clone(),
                owner_name: decl.name.clone(),
                placeholder,
                via_base,
            });
        }
        tracing::debug!(count = links.len(), "resolved auto-interface links");
        AutoInterfaces { links, by_owner }
    }
}

/// One resolved naming-convention link: a class whose pending base or
/// interface reference is `"I" + name` and for which no hand-authored
/// interface of that name exists.
#[derive(Debug, Clone)]
pub struct AutoInterfaceLink {
    pub owner_namespace: String,
    pub owner_name: String,
    pub placeholder: TypeRef,
    pub via_base: bool,
}

impl AutoInterfaceLink {
    pub fn owner_qualified(&self) -> String {
        format!("{}.{}", self.owner_namespace, self.owner_name)
    }
}

/// The one-shot result of auto-interface resolution.
#[derive(Debug)]
pub struct AutoInterfaces {
    links: Vec<AutoInterfaceLink>,
    by_owner: HashMap<String, usize>,
}

impl AutoInterfaces {
    pub fn iter(&self) -> impl Iterator<Item = &AutoInterfaceLink> {
        self.links.iter()
    }

    pub fn get(&self, decl: &TypeDecl) -> Option<&AutoInterfaceLink> {
        self.by_owner
            .get(&decl.qualified_name())
            .map(|&i| &self.links[i])
    }

    pub fn is_auto_interfaced(&self, decl: &TypeDecl) -> bool {
        self.by_owner.contains_key(&decl.qualified_name())
    }
}
