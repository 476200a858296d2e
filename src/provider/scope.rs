//! Scoped resolution context.

use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use crate::activator;
use crate::cache::InstanceCache;
use crate::catalog::TypeCatalog;
use crate::error::{DiError, DiResult};
use crate::internal::DisposeBag;
use crate::key::Key;
use crate::lifetime::Lifetime;
use crate::matcher;
use crate::registration::AnyArc;
use crate::traits::ResolverCore;

use super::{realize, ServiceProvider};

/// A bounded resolution context with its own cache of scoped services.
///
/// Singletons come from the root provider's shared cache; scoped services
/// are built once per scope with the scope as their resolution context;
/// transients are never cached. Unregistered concrete types are not
/// self-bound here unless `ProviderOptions::self_binding_in_scope` is set.
///
/// Closing a scope disposes, in reverse creation order, every scoped
/// instance whose type is described as disposable and then every hook
/// registered through [`Resolver::register_disposer`](crate::Resolver::register_disposer).
/// Dropping a scope closes it. Singletons are never disposed by a scope.
///
/// # Examples
///
/// ```
/// use ferrous_activator::{ServiceCollection, Resolver, DiResult};
/// use std::sync::Arc;
///
/// struct RequestId(u32);
///
/// # fn main() -> DiResult<()> {
/// let mut services = ServiceCollection::new();
/// let next = Arc::new(std::sync::atomic::AtomicU32::new(0));
/// let counter = next.clone();
/// services.add_scoped_factory::<RequestId, _>(move |_| {
///     Ok(RequestId(counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst)))
/// });
///
/// let provider = services.build()?;
/// let scope1 = provider.create_scope();
/// let scope2 = provider.create_scope();
///
/// let a = scope1.get_required::<RequestId>()?;
/// let b = scope1.get_required::<RequestId>()?;
/// let c = scope2.get_required::<RequestId>()?;
/// assert!(Arc::ptr_eq(&a, &b));
/// assert_ne!(a.0, c.0);
/// # Ok(())
/// # }
/// ```
pub struct Scope {
    root: ServiceProvider,
    scoped: InstanceCache,
    disposers: Mutex<DisposeBag>,
    closed: AtomicBool,
}

impl Scope {
    pub(crate) fn new(root: ServiceProvider) -> Self {
        tracing::debug!("scope created");
        Self {
            root,
            scoped: InstanceCache::new(),
            disposers: Mutex::new(DisposeBag::default()),
            closed: AtomicBool::new(false),
        }
    }

    /// The provider this scope was created from.
    pub fn root(&self) -> &ServiceProvider {
        &self.root
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Ends the scope. Idempotent; disposal failures are logged, never
    /// propagated.
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        let instances = self.scoped.drain();
        let disposed = realize::dispose_instances(self.root.inner(), instances);

        let mut hooks = std::mem::take(&mut *self.disposers.lock());
        hooks.run_all_reverse();
        tracing::debug!(disposed, "scope closed");
    }

    fn resolve_in_scope(&self, key: &Key) -> DiResult<Option<AnyArc>> {
        if self.is_closed() {
            return Err(DiError::ScopeClosed(key.display_name()));
        }
        if self.root.is_disposed() {
            return Err(DiError::ProviderDisposed(key.display_name()));
        }
        let inner = self.root.inner();
        match matcher::find(&inner.table, &inner.catalog, *key)? {
            Some(descriptor) => {
                let value = match descriptor.lifetime() {
                    Lifetime::Singleton => self.root.singleton(descriptor)?,
                    Lifetime::Scoped => realize::produce_cached(inner, &self.scoped, descriptor, self)?,
                    Lifetime::Transient => realize::produce(inner, descriptor, self)?,
                };
                realize::cast_to(inner, descriptor, value, *key).map(Some)
            }
            None if inner.options.self_binding_in_scope && inner.catalog.is_concrete(key) => {
                activator::activate(&inner.catalog, *key, self, inner.options.max_depth).map(Some)
            }
            None => Ok(None),
        }
    }
}

impl ResolverCore for Scope {
    fn resolve_any(&self, key: &Key) -> DiResult<Option<AnyArc>> {
        realize::observed(&self.root.inner().observers, key, || self.resolve_in_scope(key))
    }

    fn can_resolve_key(&self, key: &Key) -> bool {
        let inner = self.root.inner();
        realize::can_resolve(inner, key, inner.options.self_binding_in_scope)
    }

    fn catalog(&self) -> &TypeCatalog {
        &self.root.inner().catalog
    }

    fn push_sync_disposer(&self, f: Box<dyn FnOnce() + Send>) {
        let mut late = {
            let mut hooks = self.disposers.lock();
            hooks.push(f);
            if !self.is_closed() {
                return;
            }
            // registered after close: nothing else will run it
            std::mem::take(&mut *hooks)
        };
        late.run_all_reverse();
    }
}

impl Drop for Scope {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scope")
            .field("scoped", &self.scoped.len())
            .field("closed", &self.is_closed())
            .finish()
    }
}
