//! Resolver traits for service resolution.

use std::sync::Arc;

use crate::activator::{self, Arg};
use crate::catalog::TypeCatalog;
use crate::error::{DiError, DiResult};
use crate::key::Key;
use crate::registration::{unerase, AnyArc};
use crate::traits::Dispose;

/// Object-safe core of a resolution context.
///
/// Implemented by [`ServiceProvider`](crate::ServiceProvider),
/// [`Scope`](crate::Scope) and [`ResolverContext`](crate::ResolverContext).
/// Most code should use the generic [`Resolver`] methods instead.
pub trait ResolverCore: Send + Sync {
    /// Resolves `key` to an instance.
    ///
    /// `Ok(None)` only when nothing matches `key` and it may not be
    /// self-bound in this context. Every other failure is an error.
    fn resolve_any(&self, key: &Key) -> DiResult<Option<AnyArc>>;

    /// Whether `key` would resolve here. Constructs nothing.
    fn can_resolve_key(&self, key: &Key) -> bool;

    /// Type descriptions used for construction and casting.
    fn catalog(&self) -> &TypeCatalog;

    /// Registers a hook run when the owning scope or provider is disposed.
    fn push_sync_disposer(&self, f: Box<dyn FnOnce() + Send>);
}

/// Typed resolution API, available on every [`ResolverCore`].
///
/// # Examples
///
/// ```
/// use ferrous_activator::{ServiceCollection, Resolver, DiResult};
/// use std::sync::Arc;
///
/// trait Logger: Send + Sync {
///     fn log(&self, msg: &str) -> String;
/// }
///
/// struct ConsoleLogger;
/// impl Logger for ConsoleLogger {
///     fn log(&self, msg: &str) -> String { format!("LOG: {msg}") }
/// }
///
/// # fn main() -> DiResult<()> {
/// let mut services = ServiceCollection::new();
/// services.add_instance(42usize);
/// services.add_singleton_trait_factory::<dyn Logger, _>(|_| Ok(Arc::new(ConsoleLogger) as Arc<dyn Logger>));
///
/// let provider = services.build()?;
/// assert_eq!(*provider.get_required::<usize>()?, 42);
/// assert_eq!(provider.get_required::<dyn Logger>()?.log("hi"), "LOG: hi");
/// assert!(provider.get_service::<String>()?.is_none());
/// assert!(provider.can_resolve::<dyn Logger>());
/// # Ok(())
/// # }
/// ```
pub trait Resolver: ResolverCore {
    /// Resolves `T`, or `Ok(None)` when it is neither registered nor
    /// self-bindable here.
    fn get_service<T: ?Sized + Send + Sync + 'static>(&self) -> DiResult<Option<Arc<T>>> {
        let key = Key::of::<T>();
        match self.resolve_any(&key)? {
            Some(any) => unerase::<T>(&any)
                .map(Some)
                .ok_or(DiError::TypeMismatch(key.display_name())),
            None => Ok(None),
        }
    }

    /// Resolves `T`; absence is [`DiError::NotFound`].
    fn get_required<T: ?Sized + Send + Sync + 'static>(&self) -> DiResult<Arc<T>> {
        self.get_service::<T>()?
            .ok_or(DiError::NotFound(std::any::type_name::<T>()))
    }

    /// Whether `T` would resolve here. Constructs nothing.
    fn can_resolve<T: ?Sized + 'static>(&self) -> bool {
        self.can_resolve_key(&Key::of::<T>())
    }

    /// Builds a new `T` from explicit arguments and resolved services,
    /// whether or not `T` is registered. `T` must be described in the
    /// catalog.
    fn create_instance<T: Send + Sync + 'static>(&self, args: Vec<Arg>) -> DiResult<Arc<T>> {
        let key = Key::of::<T>();
        let any = activator::create_instance(self.catalog(), key, args, self)?;
        unerase::<T>(&any).ok_or(DiError::TypeMismatch(key.display_name()))
    }

    /// Disposes `service` when the owning scope or provider is disposed.
    fn register_disposer<T: ?Sized + Dispose>(&self, service: Arc<T>) {
        self.push_sync_disposer(Box::new(move || service.dispose()));
    }
}

impl<R: ResolverCore + ?Sized> Resolver for R {}
