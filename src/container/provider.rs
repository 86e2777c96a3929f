use crate::container::collection::ServiceDescriptor;
use crate::error::{PrewireError, Result};
use crate::model::Lifetime;
use dashmap::DashMap;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

type InstanceCache = DashMap<TypeId, Arc<dyn Any + Send + Sync>>;

struct ProviderShared {
    descriptors: HashMap<TypeId, ServiceDescriptor>,
    singletons: InstanceCache,
}

/// Thread-safe service provider with root and per-scope instance caches.
///
/// Singletons live in the root cache shared by every scope; scoped
/// instances live in the cache of the scope that resolved them;
/// transients are never cached.
pub struct ServiceProvider {
    shared: Arc<ProviderShared>,
    scoped: Arc<InstanceCache>,
}

impl Clone for ServiceProvider {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
            scoped: self.scoped.clone(),
        }
    }
}

impl ServiceProvider {
    pub(crate) fn from_descriptors(descriptors: Vec<ServiceDescriptor>) -> Self {
        let mut map = HashMap::with_capacity(descriptors.len());
        for descriptor in descriptors {
            map.insert(descriptor.type_id, descriptor);
        }
        Self {
            shared: Arc::new(ProviderShared {
                descriptors: map,
                singletons: DashMap::new(),
            }),
            scoped: Arc::new(DashMap::new()),
        }
    }

    /// Open a new unit-of-work scope sharing singletons with the root.
    pub fn create_scope(&self) -> ServiceProvider {
        Self {
            shared: self.shared.clone(),
            scoped: Arc::new(DashMap::new()),
        }
    }

    pub fn contains<T: 'static>(&self) -> bool {
        self.shared.descriptors.contains_key(&TypeId::of::<T>())
    }

    pub fn resolve<T: Send + Sync + 'static>(&self) -> Result<Arc<T>> {
        let type_id = TypeId::of::<T>();
        let descriptor = self.shared.descriptors.get(&type_id).ok_or_else(|| {
            PrewireError::DependencyNotFound {
                type_name: std::any::type_name::<T>().to_string(),
            }
        })?;
        let instance = match descriptor.lifetime {
            Lifetime::Transient => (descriptor.factory)(self)?,
            Lifetime::Singleton => self.cached(&self.shared.singletons, descriptor)?,
            Lifetime::Scoped => self.cached(&self.scoped, descriptor)?,
        };
        instance
            .downcast::<T>()
            .map_err(|_| PrewireError::DowncastFailed {
                type_name: descriptor.type_name.to_string(),
            })
    }

    /// Resolve through a cache without holding a shard lock while the
    /// factory runs, since factories resolve their own dependencies
    /// recursively. A racing build keeps the first inserted instance.
    fn cached(
        &self,
        cache: &InstanceCache,
        descriptor: &ServiceDescriptor,
    ) -> Result<Arc<dyn Any + Send + Sync>> {
        if let Some(existing) = cache.get(&descriptor.type_id) {
            return Ok(existing.clone());
        }
        let built = (descriptor.factory)(self)?;
        Ok(cache.entry(descriptor.type_id).or_insert(built).clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::ServiceCollection;

    struct B;
    struct C;
    struct A {
        b: Arc<B>,
        c: Arc<C>,
    }

    fn scenario_provider() -> ServiceProvider {
        let mut services = ServiceCollection::new();
        services
            .add_transient(|sp| {
                Ok(A {
                    b: sp.resolve::<B>()?,
                    c: sp.resolve::<C>()?,
                })
            })
            .add_transient(|_| Ok(B))
            .add_singleton(|_| Ok(C));
        services.build_provider()
    }

    #[test]
    fn transients_differ_across_scopes() {
        let provider = scenario_provider();
        let a1 = provider.create_scope().resolve::<A>().unwrap();
        let a2 = provider.create_scope().resolve::<A>().unwrap();
        assert!(!Arc::ptr_eq(&a1, &a2));
        assert!(!Arc::ptr_eq(&a1.b, &a2.b));
    }

    #[test]
    fn singletons_are_shared_across_scopes() {
        let provider = scenario_provider();
        let a1 = provider.create_scope().resolve::<A>().unwrap();
        let a2 = provider.create_scope().resolve::<A>().unwrap();
        assert!(Arc::ptr_eq(&a1.c, &a2.c));
    }

    #[test]
    fn scoped_instances_are_cached_per_scope_only() {
        struct S;
        let mut services = ServiceCollection::new();
        services.add_scoped(|_| Ok(S));
        let provider = services.build_provider();
        let scope = provider.create_scope();
        let first = scope.resolve::<S>().unwrap();
        let second = scope.resolve::<S>().unwrap();
        let other = provider.create_scope().resolve::<S>().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(!Arc::ptr_eq(&first, &other));
    }

    #[test]
    fn unknown_services_fail_to_resolve() {
        let provider = ServiceCollection::new().build_provider();
        let result = provider.resolve::<A>();
        assert!(matches!(
            result,
            Err(PrewireError::DependencyNotFound { .. })
        ));
    }

    #[test]
    fn later_registrations_win() {
        struct V(u32);
        let mut services = ServiceCollection::new();
        services.add_singleton(|_| Ok(V(1))).add_singleton(|_| Ok(V(2)));
        let provider = services.build_provider();
        assert_eq!(provider.resolve::<V>().unwrap().0, 2);
    }
}
