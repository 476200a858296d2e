//! Disposal trait for resource cleanup.

/// Synchronous resource disposal.
///
/// Types described with `.disposable()` are disposed when their owner ends:
/// scoped instances when their scope closes, singletons on
/// `ServiceProvider::dispose_all`. Factories can also hand instances over
/// with [`Resolver::register_disposer`](crate::Resolver::register_disposer).
/// Disposal runs in reverse creation order.
///
/// # Examples
///
/// ```
/// use ferrous_activator::{Dispose, ServiceCollection, Resolver, DiResult};
/// use std::sync::atomic::{AtomicBool, Ordering};
/// use std::sync::Arc;
///
/// struct Connection { closed: AtomicBool }
///
/// impl Dispose for Connection {
///     fn dispose(&self) {
///         self.closed.store(true, Ordering::SeqCst);
///     }
/// }
///
/// # fn main() -> DiResult<()> {
/// let mut services = ServiceCollection::new();
/// services
///     .describe::<Connection>()
///     .constructor(|()| Connection { closed: AtomicBool::new(false) })
///     .disposable();
/// services.add_scoped::<Connection>();
/// let provider = services.build()?;
///
/// let scope = provider.create_scope();
/// let conn = scope.get_required::<Connection>()?;
/// scope.close();
/// assert!(conn.closed.load(Ordering::SeqCst));
/// # Ok(())
/// # }
/// ```
pub trait Dispose: Send + Sync + 'static {
    fn dispose(&self);
}
