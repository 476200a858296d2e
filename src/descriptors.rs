//! Service descriptors: what a registration answers for and how it builds
//! its instance.

use std::fmt;
use std::sync::Arc;

use crate::error::DiResult;
use crate::key::Key;
use crate::lifetime::Lifetime;
use crate::provider::ResolverContext;
use crate::registration::AnyArc;

/// Factory callback stored in a descriptor.
pub(crate) type FactoryFn = Arc<dyn for<'a> Fn(&ResolverContext<'a>) -> DiResult<AnyArc> + Send + Sync>;

/// How a descriptor produces its instance. Exactly one strategy per
/// descriptor.
#[derive(Clone)]
pub enum Strategy {
    /// A pre-built value. `produced` is the value's own type.
    Instance { value: AnyArc, produced: Key },
    /// A callback invoked with the resolving context. Its produced type is
    /// unknown until it runs, so it never takes part in assignable matching.
    Factory(FactoryFn),
    /// A type constructed through its catalog constructors.
    Implementation(Key),
}

impl fmt::Debug for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Instance { produced, .. } => f.debug_tuple("Instance").field(produced).finish(),
            Strategy::Factory(_) => f.write_str("Factory"),
            Strategy::Implementation(key) => f.debug_tuple("Implementation").field(key).finish(),
        }
    }
}

/// A registration record binding a service type to a strategy and a
/// lifetime.
///
/// # Examples
///
/// ```rust
/// use ferrous_activator::{ServiceCollection, Lifetime, Key};
/// use std::sync::Arc;
///
/// trait Clock: Send + Sync {}
/// struct SystemClock;
/// impl Clock for SystemClock {}
///
/// let mut services = ServiceCollection::new();
/// services.describe_abstract::<dyn Clock>();
/// services
///     .describe::<SystemClock>()
///     .constructor(|()| SystemClock)
///     .implements::<dyn Clock, _>(|c| c as Arc<dyn Clock>);
/// services.add_singleton_as::<dyn Clock, SystemClock>();
/// services.add_transient_factory::<String, _>(|_| Ok("hi".to_string()));
///
/// let descriptors = services.service_descriptors();
/// assert_eq!(descriptors[0].service(), Key::of::<dyn Clock>());
/// assert_eq!(descriptors[0].produced_type(), Some(Key::of::<SystemClock>()));
/// assert_eq!(descriptors[0].lifetime(), Lifetime::Singleton);
/// assert_eq!(descriptors[1].produced_type(), None);
/// ```
#[derive(Clone)]
pub struct ServiceDescriptor {
    service: Key,
    strategy: Strategy,
    lifetime: Lifetime,
}

impl ServiceDescriptor {
    pub(crate) fn instance(service: Key, value: AnyArc, produced: Key) -> Self {
        Self {
            service,
            strategy: Strategy::Instance { value, produced },
            lifetime: Lifetime::Singleton,
        }
    }

    pub(crate) fn factory(service: Key, factory: FactoryFn, lifetime: Lifetime) -> Self {
        Self {
            service,
            strategy: Strategy::Factory(factory),
            lifetime,
        }
    }

    pub(crate) fn implementation(service: Key, implementation: Key, lifetime: Lifetime) -> Self {
        Self {
            service,
            strategy: Strategy::Implementation(implementation),
            lifetime,
        }
    }

    /// The requested type this descriptor answers for.
    pub fn service(&self) -> Key {
        self.service
    }

    pub fn lifetime(&self) -> Lifetime {
        self.lifetime
    }

    pub fn strategy(&self) -> &Strategy {
        &self.strategy
    }

    /// Statically known produced type; `None` for factories.
    pub fn produced_type(&self) -> Option<Key> {
        match &self.strategy {
            Strategy::Instance { produced, .. } => Some(*produced),
            Strategy::Implementation(key) => Some(*key),
            Strategy::Factory(_) => None,
        }
    }

    /// Type of the value the strategy hands back before it is cast to the
    /// requested type.
    pub(crate) fn representation(&self) -> Key {
        self.produced_type().unwrap_or(self.service)
    }

    pub fn type_name(&self) -> &'static str {
        self.service.display_name()
    }
}

impl fmt::Debug for ServiceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceDescriptor")
            .field("service", &self.service)
            .field("strategy", &self.strategy)
            .field("lifetime", &self.lifetime)
            .finish()
    }
}
