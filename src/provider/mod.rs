//! Service provider module for dependency injection.
//!
//! [`ServiceProvider`] is the root resolution context. It owns the frozen
//! descriptor table and type catalog plus the singleton cache, all shared by
//! reference with every [`Scope`] created from it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::activator;
use crate::cache::InstanceCache;
use crate::catalog::TypeCatalog;
use crate::config::ProviderOptions;
use crate::descriptors::ServiceDescriptor;
use crate::error::{DiError, DiResult};
use crate::internal::DisposeBag;
use crate::key::Key;
use crate::lifetime::Lifetime;
use crate::matcher;
use crate::observer::Observers;
use crate::registration::{AnyArc, DescriptorTable};
use crate::traits::ResolverCore;

pub mod context;
pub(crate) mod realize;
pub mod scope;

pub use context::ResolverContext;
pub use scope::Scope;

/// Root resolution context.
///
/// Cloning is cheap and every clone shares the same singleton cache.
///
/// - **Singleton** services are built once, with the root as their
///   resolution context, and shared by every scope.
/// - **Scoped** services cannot be resolved here and fail with
///   [`DiError::WrongLifetime`].
/// - **Transient** services are built fresh on every request.
/// - Unregistered types that the catalog describes as concrete are built
///   directly (self-binding), unless disabled through [`ProviderOptions`].
///
/// # Examples
///
/// ```
/// use ferrous_activator::{ServiceCollection, Resolver, DiResult};
/// use std::sync::Arc;
///
/// struct Config { greeting: String }
/// struct Greeter { config: Arc<Config> }
///
/// # fn main() -> DiResult<()> {
/// let mut services = ServiceCollection::new();
/// services.add_instance(Config { greeting: "hello".into() });
/// services
///     .describe::<Greeter>()
///     .constructor(|(config,): (Arc<Config>,)| Greeter { config });
///
/// let provider = services.build()?;
/// // Greeter is not registered but is concrete, so the root builds it.
/// let greeter = provider.get_required::<Greeter>()?;
/// assert_eq!(greeter.config.greeting, "hello");
///
/// // Scopes only answer for registered types by default.
/// let scope = provider.create_scope();
/// assert!(scope.get_service::<Greeter>()?.is_none());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ServiceProvider {
    inner: Arc<ProviderInner>,
}

pub(crate) struct ProviderInner {
    pub(crate) table: DescriptorTable,
    pub(crate) catalog: TypeCatalog,
    pub(crate) singletons: InstanceCache,
    pub(crate) root_disposers: Mutex<DisposeBag>,
    pub(crate) observers: Observers,
    pub(crate) options: ProviderOptions,
    disposed: AtomicBool,
}

impl ServiceProvider {
    pub(crate) fn new(
        table: DescriptorTable,
        catalog: TypeCatalog,
        observers: Observers,
        options: ProviderOptions,
    ) -> Self {
        tracing::debug!(
            descriptors = table.len(),
            types = catalog.len(),
            "service provider built"
        );
        Self {
            inner: Arc::new(ProviderInner {
                table,
                catalog,
                singletons: InstanceCache::new(),
                root_disposers: Mutex::new(DisposeBag::default()),
                observers,
                options,
                disposed: AtomicBool::new(false),
            }),
        }
    }

    #[inline]
    pub(crate) fn inner(&self) -> &ProviderInner {
        &self.inner
    }

    /// Creates a scope sharing this provider's descriptors and singletons.
    pub fn create_scope(&self) -> Scope {
        Scope::new(self.clone())
    }

    pub fn options(&self) -> &ProviderOptions {
        &self.inner.options
    }

    /// Registered descriptors in registration order.
    pub fn descriptors(&self) -> impl Iterator<Item = &ServiceDescriptor> {
        self.inner.table.iter()
    }

    /// The singleton for `descriptor`, built against the root.
    pub(crate) fn singleton(&self, descriptor: &ServiceDescriptor) -> DiResult<AnyArc> {
        realize::produce_cached(&self.inner, &self.inner.singletons, descriptor, self)
    }

    /// True once [`dispose_all`](Self::dispose_all) has run.
    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.load(Ordering::Acquire)
    }

    fn resolve_in_root(&self, key: &Key) -> DiResult<Option<AnyArc>> {
        if self.is_disposed() {
            return Err(DiError::ProviderDisposed(key.display_name()));
        }
        let inner = self.inner();
        match matcher::find(&inner.table, &inner.catalog, *key)? {
            Some(descriptor) => {
                let value = match descriptor.lifetime() {
                    Lifetime::Singleton => self.singleton(descriptor)?,
                    Lifetime::Scoped => {
                        return Err(DiError::WrongLifetime {
                            service: descriptor.type_name(),
                        })
                    }
                    Lifetime::Transient => realize::produce(inner, descriptor, self)?,
                };
                realize::cast_to(inner, descriptor, value, *key).map(Some)
            }
            None if inner.options.self_binding_in_root && inner.catalog.is_concrete(key) => {
                activator::activate(&inner.catalog, *key, self, inner.options.max_depth).map(Some)
            }
            None => Ok(None),
        }
    }

    /// Disposes cached singletons described as disposable, then runs hooks
    /// registered against the root, both in reverse creation order. Runs
    /// once; later calls do nothing.
    ///
    /// Afterwards the provider, and every scope created from it, fails each
    /// resolution with [`DiError::ProviderDisposed`]. A singleton whose
    /// construction was already underway is disposed as soon as it is
    /// built. Scopes never dispose singletons, even ones they caused to be
    /// built.
    pub fn dispose_all(&self) {
        if self.inner.disposed.swap(true, Ordering::AcqRel) {
            return;
        }
        let instances = self.inner.singletons.drain();
        let disposed = realize::dispose_instances(&self.inner, instances);

        let mut hooks = std::mem::take(&mut *self.inner.root_disposers.lock());
        hooks.run_all_reverse();
        tracing::debug!(disposed, "service provider disposed");
    }

    /// Human readable dump of the descriptor table.
    #[cfg(feature = "diagnostics")]
    pub fn to_debug_string(&self) -> String {
        use std::fmt::Write as _;

        let mut out = String::new();
        for descriptor in self.inner.table.iter() {
            let _ = writeln!(
                out,
                "{} [{}] {:?}",
                descriptor.type_name(),
                descriptor.lifetime(),
                descriptor.strategy()
            );
        }
        let _ = writeln!(out, "cached singletons: {}", self.inner.singletons.len());
        out
    }
}

impl ResolverCore for ServiceProvider {
    fn resolve_any(&self, key: &Key) -> DiResult<Option<AnyArc>> {
        realize::observed(&self.inner.observers, key, || self.resolve_in_root(key))
    }

    fn can_resolve_key(&self, key: &Key) -> bool {
        realize::can_resolve(&self.inner, key, self.inner.options.self_binding_in_root)
    }

    fn catalog(&self) -> &TypeCatalog {
        &self.inner.catalog
    }

    fn push_sync_disposer(&self, f: Box<dyn FnOnce() + Send>) {
        let mut late = {
            let mut hooks = self.inner.root_disposers.lock();
            hooks.push(f);
            if !self.is_disposed() {
                return;
            }
            // registered after dispose_all: nothing else will run it
            std::mem::take(&mut *hooks)
        };
        late.run_all_reverse();
    }
}

impl std::fmt::Debug for ServiceProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceProvider")
            .field("descriptors", &self.inner.table.len())
            .field("singletons", &self.inner.singletons.len())
            .field("options", &self.inner.options)
            .finish()
    }
}
