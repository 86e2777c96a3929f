use crate::container::ServiceProvider;
use crate::error::Result;
use crate::model::Lifetime;
use std::any::{Any, TypeId};
use std::sync::Arc;

pub(crate) type Factory =
    Arc<dyn Fn(&ServiceProvider) -> Result<Arc<dyn Any + Send + Sync>> + Send + Sync>;

#[derive(Clone)]
pub(crate) struct ServiceDescriptor {
    pub(crate) type_id: TypeId,
    pub(crate) type_name: &'static str,
    pub(crate) lifetime: Lifetime,
    pub(crate) factory: Factory,
}

/// The mutable registration-collection handle the generated table chains
/// its calls against: one `add_*` per service entry, each returning the
/// collection for further chaining.
#[derive(Clone, Default)]
pub struct ServiceCollection {
    descriptors: Vec<ServiceDescriptor>,
}

impl ServiceCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory producing a new instance per resolution.
    pub fn add_transient<T, F>(&mut self, factory: F) -> &mut Self
    where
        T: Send + Sync + 'static,
        F: Fn(&ServiceProvider) -> Result<T> + Send + Sync + 'static,
    {
        self.add(Lifetime::Transient, factory)
    }

    /// Register a factory producing one instance per scope.
    pub fn add_scoped<T, F>(&mut self, factory: F) -> &mut Self
    where
        T: Send + Sync + 'static,
        F: Fn(&ServiceProvider) -> Result<T> + Send + Sync + 'static,
    {
        self.add(Lifetime::Scoped, factory)
    }

    /// Register a factory producing one instance per provider.
    pub fn add_singleton<T, F>(&mut self, factory: F) -> &mut Self
    where
        T: Send + Sync + 'static,
        F: Fn(&ServiceProvider) -> Result<T> + Send + Sync + 'static,
    {
        self.add(Lifetime::Singleton, factory)
    }

    fn add<T, F>(&mut self, lifetime: Lifetime, factory: F) -> &mut Self
    where
        T: Send + Sync + 'static,
        F: Fn(&ServiceProvider) -> Result<T> + Send + Sync + 'static,
    {
        self.descriptors.push(ServiceDescriptor {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            lifetime,
            factory: Arc::new(move |provider| {
                factory(provider).map(|v| Arc::new(v) as Arc<dyn Any + Send + Sync>)
            }),
        });
        self
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Freeze the registrations into a root provider. A later
    /// registration for the same type wins.
    pub fn build_provider(&self) -> ServiceProvider {
        ServiceProvider::from_descriptors(self.descriptors.clone())
    }
}
