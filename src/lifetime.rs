//! Service lifetime definitions.

use std::fmt;

/// Service lifetimes controlling instance caching behavior.
///
/// # Examples
///
/// ```rust
/// use ferrous_activator::{ServiceCollection, Resolver, Lifetime, DiResult};
/// use std::sync::Arc;
///
/// struct Database { url: String }
/// struct Repository { db: Arc<Database> }
/// struct RequestModel;
///
/// # fn main() -> DiResult<()> {
/// let mut services = ServiceCollection::new();
/// services.add_instance(Database { url: "postgres://localhost".to_string() });
/// services.add_scoped_factory::<Repository, _>(|r| {
///     Ok(Repository { db: r.get_required::<Database>()? })
/// });
/// services.add_transient_factory::<RequestModel, _>(|_| Ok(RequestModel));
///
/// let provider = services.build()?;
/// let scope1 = provider.create_scope();
/// let scope2 = provider.create_scope();
///
/// // Singleton: one instance everywhere
/// assert!(Arc::ptr_eq(&provider.get_required::<Database>()?, &scope1.get_required::<Database>()?));
///
/// // Scoped: one per scope
/// let repo1a = scope1.get_required::<Repository>()?;
/// let repo1b = scope1.get_required::<Repository>()?;
/// let repo2 = scope2.get_required::<Repository>()?;
/// assert!(Arc::ptr_eq(&repo1a, &repo1b));
/// assert!(!Arc::ptr_eq(&repo1a, &repo2));
///
/// // Transient: always fresh
/// let m1 = scope1.get_required::<RequestModel>()?;
/// let m2 = scope1.get_required::<RequestModel>()?;
/// assert!(!Arc::ptr_eq(&m1, &m2));
/// assert_eq!(Lifetime::Scoped.to_string(), "scoped");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lifetime {
    /// Single instance per root provider, cached for the provider's lifetime
    /// and shared by every scope derived from it.
    Singleton,
    /// Single instance per scope. Resolving a scoped service from the root
    /// provider is an error.
    Scoped,
    /// New instance per resolution, never cached.
    Transient,
}

impl fmt::Display for Lifetime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Lifetime::Singleton => "singleton",
            Lifetime::Scoped => "scoped",
            Lifetime::Transient => "transient",
        })
    }
}
