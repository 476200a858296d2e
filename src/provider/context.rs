//! Resolver context handed to factories.

use crate::catalog::TypeCatalog;
use crate::error::DiResult;
use crate::key::Key;
use crate::registration::AnyArc;
use crate::traits::ResolverCore;

/// Context passed to factory functions for resolving dependencies.
///
/// Wraps the provider or scope the factory runs in. Singleton factories
/// always run against the root provider, scoped and transient factories
/// against the requesting scope.
///
/// # Examples
///
/// ```
/// use ferrous_activator::{ServiceCollection, Resolver, DiResult};
/// use std::sync::Arc;
///
/// struct Database { url: String }
/// struct UserService { db: Arc<Database> }
///
/// # fn main() -> DiResult<()> {
/// let mut services = ServiceCollection::new();
/// services.add_instance(Database { url: "postgres://localhost".to_string() });
/// services.add_transient_factory::<UserService, _>(|resolver| {
///     Ok(UserService { db: resolver.get_required::<Database>()? })
/// });
///
/// let provider = services.build()?;
/// assert_eq!(provider.get_required::<UserService>()?.db.url, "postgres://localhost");
/// # Ok(())
/// # }
/// ```
pub struct ResolverContext<'a> {
    resolver: &'a dyn ResolverCore,
}

impl<'a> ResolverContext<'a> {
    pub(crate) fn new(resolver: &'a dyn ResolverCore) -> Self {
        Self { resolver }
    }
}

impl ResolverCore for ResolverContext<'_> {
    fn resolve_any(&self, key: &Key) -> DiResult<Option<AnyArc>> {
        self.resolver.resolve_any(key)
    }

    fn can_resolve_key(&self, key: &Key) -> bool {
        self.resolver.can_resolve_key(key)
    }

    fn catalog(&self) -> &TypeCatalog {
        self.resolver.catalog()
    }

    fn push_sync_disposer(&self, f: Box<dyn FnOnce() + Send>) {
        self.resolver.push_sync_disposer(f);
    }
}
