//! Service collection module for dependency injection.
//!
//! [`ServiceCollection`] accumulates type descriptions and service
//! descriptors, then freezes both into a [`ServiceProvider`].

use std::sync::Arc;

use crate::catalog::{TypeBuilder, TypeCatalog};
use crate::config::ProviderOptions;
use crate::descriptors::{FactoryFn, ServiceDescriptor};
use crate::error::{DiError, DiResult};
use crate::key::Key;
use crate::lifetime::Lifetime;
use crate::observer::{DiObserver, Observers};
use crate::provider::{ResolverContext, ServiceProvider};
use crate::registration::{erase, AnyArc, DescriptorTable};

/// Registration builder.
///
/// Registering the same service type twice replaces the first registration
/// in place.
///
/// # Examples
///
/// ```
/// use ferrous_activator::{ServiceCollection, Resolver, DiResult};
/// use std::sync::Arc;
///
/// trait Clock: Send + Sync { fn now(&self) -> u64; }
/// struct SystemClock;
/// impl Clock for SystemClock { fn now(&self) -> u64 { 1_700_000_000 } }
///
/// struct Config { name: String }
/// struct Greeter { clock: Arc<dyn Clock>, config: Arc<Config> }
///
/// # fn main() -> DiResult<()> {
/// let mut services = ServiceCollection::new();
/// services.describe_abstract::<dyn Clock>();
/// services
///     .describe::<SystemClock>()
///     .constructor(|()| SystemClock)
///     .implements::<dyn Clock, _>(|c| c as Arc<dyn Clock>);
/// services
///     .describe::<Greeter>()
///     .constructor(|(clock, config): (Arc<dyn Clock>, Arc<Config>)| Greeter { clock, config });
///
/// services.add_instance(Config { name: "world".into() });
/// services.add_singleton_as::<dyn Clock, SystemClock>();
/// services.add_transient::<Greeter>();
///
/// let provider = services.build()?;
/// let a = provider.get_required::<Greeter>()?;
/// let b = provider.get_required::<Greeter>()?;
/// assert!(!Arc::ptr_eq(&a, &b));
/// assert!(Arc::ptr_eq(&a.clock, &b.clock));
/// assert!(Arc::ptr_eq(&a.config, &b.config));
/// assert_eq!(a.config.name, "world");
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct ServiceCollection {
    table: DescriptorTable,
    catalog: TypeCatalog,
    observers: Observers,
    options: ProviderOptions,
}

impl ServiceCollection {
    pub fn new() -> Self {
        Self::default()
    }

    // ----- Type descriptions -----

    /// Describes a concrete type: its constructors, supertypes and disposal.
    pub fn describe<T: Send + Sync + 'static>(&mut self) -> TypeBuilder<'_, T> {
        self.catalog.describe::<T>()
    }

    /// Describes an abstract type, typically a trait object.
    pub fn describe_abstract<T: ?Sized + Send + Sync + 'static>(&mut self) -> TypeBuilder<'_, T> {
        self.catalog.describe_abstract::<T>()
    }

    pub fn catalog(&self) -> &TypeCatalog {
        &self.catalog
    }

    // ----- Instances -----

    /// Registers a pre-built singleton instance of `T`.
    pub fn add_instance<T: Send + Sync + 'static>(&mut self, value: T) -> &mut Self {
        let key = Key::of::<T>();
        self.insert(ServiceDescriptor::instance(key, erase(Arc::new(value)), key))
    }

    /// Registers a pre-built instance of `T` answering for service `S`.
    /// `T` must be described as a subtype of `S`.
    pub fn add_instance_as<S, T>(&mut self, value: T) -> &mut Self
    where
        S: ?Sized + Send + Sync + 'static,
        T: Send + Sync + 'static,
    {
        self.insert(ServiceDescriptor::instance(
            Key::of::<S>(),
            erase(Arc::new(value)),
            Key::of::<T>(),
        ))
    }

    // ----- Implementation types -----

    pub fn add_singleton<T: Send + Sync + 'static>(&mut self) -> &mut Self {
        self.add_implementation::<T, T>(Lifetime::Singleton)
    }

    pub fn add_scoped<T: Send + Sync + 'static>(&mut self) -> &mut Self {
        self.add_implementation::<T, T>(Lifetime::Scoped)
    }

    pub fn add_transient<T: Send + Sync + 'static>(&mut self) -> &mut Self {
        self.add_implementation::<T, T>(Lifetime::Transient)
    }

    /// Registers implementation `I` for service `S` as a singleton.
    pub fn add_singleton_as<S, I>(&mut self) -> &mut Self
    where
        S: ?Sized + Send + Sync + 'static,
        I: Send + Sync + 'static,
    {
        self.add_implementation::<S, I>(Lifetime::Singleton)
    }

    pub fn add_scoped_as<S, I>(&mut self) -> &mut Self
    where
        S: ?Sized + Send + Sync + 'static,
        I: Send + Sync + 'static,
    {
        self.add_implementation::<S, I>(Lifetime::Scoped)
    }

    pub fn add_transient_as<S, I>(&mut self) -> &mut Self
    where
        S: ?Sized + Send + Sync + 'static,
        I: Send + Sync + 'static,
    {
        self.add_implementation::<S, I>(Lifetime::Transient)
    }

    fn add_implementation<S, I>(&mut self, lifetime: Lifetime) -> &mut Self
    where
        S: ?Sized + Send + Sync + 'static,
        I: Send + Sync + 'static,
    {
        self.insert(ServiceDescriptor::implementation(
            Key::of::<S>(),
            Key::of::<I>(),
            lifetime,
        ))
    }

    // ----- Factories -----

    pub fn add_singleton_factory<T, F>(&mut self, factory: F) -> &mut Self
    where
        T: Send + Sync + 'static,
        F: Fn(&ResolverContext<'_>) -> DiResult<T> + Send + Sync + 'static,
    {
        self.add_factory(Lifetime::Singleton, factory)
    }

    pub fn add_scoped_factory<T, F>(&mut self, factory: F) -> &mut Self
    where
        T: Send + Sync + 'static,
        F: Fn(&ResolverContext<'_>) -> DiResult<T> + Send + Sync + 'static,
    {
        self.add_factory(Lifetime::Scoped, factory)
    }

    pub fn add_transient_factory<T, F>(&mut self, factory: F) -> &mut Self
    where
        T: Send + Sync + 'static,
        F: Fn(&ResolverContext<'_>) -> DiResult<T> + Send + Sync + 'static,
    {
        self.add_factory(Lifetime::Transient, factory)
    }

    /// Registers a factory producing a trait object `Arc<S>` as a singleton.
    pub fn add_singleton_trait_factory<S, F>(&mut self, factory: F) -> &mut Self
    where
        S: ?Sized + Send + Sync + 'static,
        F: Fn(&ResolverContext<'_>) -> DiResult<Arc<S>> + Send + Sync + 'static,
    {
        self.add_trait_factory(Lifetime::Singleton, factory)
    }

    pub fn add_scoped_trait_factory<S, F>(&mut self, factory: F) -> &mut Self
    where
        S: ?Sized + Send + Sync + 'static,
        F: Fn(&ResolverContext<'_>) -> DiResult<Arc<S>> + Send + Sync + 'static,
    {
        self.add_trait_factory(Lifetime::Scoped, factory)
    }

    pub fn add_transient_trait_factory<S, F>(&mut self, factory: F) -> &mut Self
    where
        S: ?Sized + Send + Sync + 'static,
        F: Fn(&ResolverContext<'_>) -> DiResult<Arc<S>> + Send + Sync + 'static,
    {
        self.add_trait_factory(Lifetime::Transient, factory)
    }

    fn add_factory<T, F>(&mut self, lifetime: Lifetime, factory: F) -> &mut Self
    where
        T: Send + Sync + 'static,
        F: Fn(&ResolverContext<'_>) -> DiResult<T> + Send + Sync + 'static,
    {
        let factory: FactoryFn = Arc::new(move |ctx: &ResolverContext<'_>| -> DiResult<AnyArc> {
            factory(ctx).map(|value| erase(Arc::new(value)))
        });
        self.insert(ServiceDescriptor::factory(Key::of::<T>(), factory, lifetime))
    }

    fn add_trait_factory<S, F>(&mut self, lifetime: Lifetime, factory: F) -> &mut Self
    where
        S: ?Sized + Send + Sync + 'static,
        F: Fn(&ResolverContext<'_>) -> DiResult<Arc<S>> + Send + Sync + 'static,
    {
        let factory: FactoryFn = Arc::new(move |ctx: &ResolverContext<'_>| -> DiResult<AnyArc> {
            factory(ctx).map(erase)
        });
        self.insert(ServiceDescriptor::factory(Key::of::<S>(), factory, lifetime))
    }

    fn insert(&mut self, descriptor: ServiceDescriptor) -> &mut Self {
        tracing::trace!(
            service = descriptor.type_name(),
            lifetime = %descriptor.lifetime(),
            "registered"
        );
        self.table.insert(descriptor);
        self
    }

    // ----- Configuration -----

    /// Adds an observer notified of every resolution.
    pub fn add_observer(&mut self, observer: Arc<dyn DiObserver>) -> &mut Self {
        self.observers.add(observer);
        self
    }

    pub fn with_options(&mut self, options: ProviderOptions) -> &mut Self {
        self.options = options;
        self
    }

    /// Registered descriptors in registration order.
    pub fn service_descriptors(&self) -> &[ServiceDescriptor] {
        self.table.as_slice()
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.len() == 0
    }

    /// Validates every registration and freezes the collection.
    ///
    /// Implementation types must be described concrete types with at least
    /// one constructor, and every statically known produced type must be
    /// assignable to its service type. Violations are reported as
    /// [`DiError::InvalidRegistration`].
    pub fn build(self) -> DiResult<ServiceProvider> {
        for descriptor in self.table.iter() {
            validate(&self.catalog, descriptor)?;
        }
        Ok(ServiceProvider::new(self.table, self.catalog, self.observers, self.options))
    }
}

fn validate(catalog: &TypeCatalog, descriptor: &ServiceDescriptor) -> DiResult<()> {
    let service = descriptor.service();
    let invalid = |reason: String| DiError::InvalidRegistration {
        service: service.display_name(),
        reason,
    };

    if let crate::descriptors::Strategy::Implementation(implementation) = descriptor.strategy() {
        let info = catalog
            .get(implementation)
            .ok_or_else(|| invalid(format!("{} is not described", implementation.display_name())))?;
        if !info.is_concrete() {
            return Err(invalid(format!("{} is abstract", implementation.display_name())));
        }
        if info.constructors().is_empty() {
            return Err(invalid(format!(
                "{} declares no constructors",
                implementation.display_name()
            )));
        }
    }

    if let Some(produced) = descriptor.produced_type() {
        if !catalog.is_assignable(produced, service) {
            return Err(invalid(format!(
                "{} is not assignable to the service type",
                produced.display_name()
            )));
        }
    }
    Ok(())
}
