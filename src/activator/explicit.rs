//! Activation with caller-supplied arguments.
//!
//! For each constructor, greediest first, parameters bind left to right:
//! the first unconsumed explicit argument whose type is assignable to the
//! parameter is taken, otherwise the resolver is asked. A parameter neither
//! source can supply rejects the constructor and the next one is tried.
//! The type itself is not pushed on the construction stack; its resolved
//! dependencies still are.

use std::sync::Arc;

use crate::catalog::{Constructor, TypeCatalog};
use crate::error::{DiError, DiResult};
use crate::key::Key;
use crate::registration::{erase, AnyArc};
use crate::traits::ResolverCore;

/// An explicit constructor argument together with its runtime type.
///
/// # Examples
///
/// ```rust
/// use ferrous_activator::{Arg, Key, ServiceCollection, Resolver, DiResult};
/// use std::sync::Arc;
///
/// struct Config { name: String }
/// struct Report { config: Arc<Config>, id: Arc<u64> }
///
/// # fn main() -> DiResult<()> {
/// let mut services = ServiceCollection::new();
/// services.describe::<Report>()
///     .constructor(|(config, id): (Arc<Config>, Arc<u64>)| Report { config, id });
/// services.add_instance(Config { name: "registered".into() });
/// let provider = services.build()?;
///
/// let report = provider.create_instance::<Report>(vec![Arg::new(42u64)])?;
/// assert_eq!(*report.id, 42);
/// assert_eq!(report.config.name, "registered");
/// assert_eq!(Arg::new(1u8).key(), Key::of::<u8>());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Arg {
    key: Key,
    value: AnyArc,
}

impl Arg {
    pub fn new<T: Send + Sync + 'static>(value: T) -> Self {
        Self::from_arc(Arc::new(value))
    }

    /// Passes an existing allocation, e.g. a trait object.
    pub fn from_arc<T: ?Sized + Send + Sync + 'static>(value: Arc<T>) -> Self {
        Arg {
            key: Key::of::<T>(),
            value: erase(value),
        }
    }

    pub fn key(&self) -> Key {
        self.key
    }
}

impl std::fmt::Debug for Arg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Arg").field(&self.key).finish()
    }
}

pub(crate) fn create_instance<R>(
    catalog: &TypeCatalog,
    implementation: Key,
    args: Vec<Arg>,
    resolver: &R,
) -> DiResult<AnyArc>
where
    R: ResolverCore + ?Sized,
{
    let info = super::concrete_info(catalog, implementation)?;

    for constructor in super::by_arity(info) {
        if let Some(bound) = bind(catalog, constructor, &args, resolver)? {
            tracing::debug!(
                constructor = %constructor.signature(&implementation),
                explicit = args.len(),
                "activating with explicit arguments"
            );
            return super::invoke(constructor, bound, implementation.display_name());
        }
    }
    Err(DiError::NotFound(implementation.display_name()))
}

fn bind<R>(
    catalog: &TypeCatalog,
    constructor: &Constructor,
    args: &[Arg],
    resolver: &R,
) -> DiResult<Option<Vec<AnyArc>>>
where
    R: ResolverCore + ?Sized,
{
    let mut pool: Vec<&Arg> = args.iter().collect();
    let mut bound = Vec::with_capacity(constructor.arity());

    for param in constructor.params() {
        if let Some(pos) = pool.iter().position(|a| catalog.is_assignable(a.key, *param)) {
            let arg = pool.remove(pos);
            bound.push(catalog.cast(&arg.value, arg.key, *param)?);
            continue;
        }
        match resolver.resolve_any(param)? {
            Some(value) => bound.push(value),
            None => return Ok(None),
        }
    }
    Ok(Some(bound))
}
