//! # ferrous-activator
//!
//! Constructor-injecting dependency injection for Rust, in the style of
//! Microsoft.Extensions.DependencyInjection.
//!
//! ## Features
//!
//! - **Lifetimes**: Singleton, Scoped and Transient services
//! - **Constructor injection**: types declare their constructors; the
//!   greediest constructor whose dependencies all resolve is chosen
//! - **Polymorphic matching**: a request for `dyn Trait` is answered by the
//!   most specific registration producing a subtype, ambiguity is reported
//! - **Circular dependency detection** with the full construction path
//! - **Scoped disposal** in reverse creation order, guaranteed on drop
//! - **Explicit arguments**: build unregistered types from caller-supplied
//!   values plus container services
//!
//! ## Quick Start
//!
//! ```rust
//! use ferrous_activator::{ServiceCollection, Resolver, DiResult};
//! use std::sync::Arc;
//!
//! trait Clock: Send + Sync {
//!     fn now(&self) -> u64;
//! }
//!
//! struct SystemClock;
//! impl Clock for SystemClock {
//!     fn now(&self) -> u64 { 42 }
//! }
//!
//! struct Config { name: String }
//!
//! struct Greeter {
//!     clock: Arc<dyn Clock>,
//!     config: Arc<Config>,
//! }
//!
//! impl Greeter {
//!     fn greet(&self) -> String {
//!         format!("hello {} at {}", self.config.name, self.clock.now())
//!     }
//! }
//!
//! # fn main() -> DiResult<()> {
//! let mut services = ServiceCollection::new();
//!
//! // Describe types: constructors and supertypes
//! services.describe_abstract::<dyn Clock>();
//! services
//!     .describe::<SystemClock>()
//!     .constructor(|()| SystemClock)
//!     .implements::<dyn Clock, _>(|c| c as Arc<dyn Clock>);
//! services
//!     .describe::<Greeter>()
//!     .constructor(|(clock, config): (Arc<dyn Clock>, Arc<Config>)| Greeter { clock, config });
//!
//! // Register services
//! services.add_instance(Config { name: "world".to_string() });
//! services.add_singleton_as::<dyn Clock, SystemClock>();
//! services.add_transient::<Greeter>();
//!
//! let provider = services.build()?;
//! let greeter = provider.get_required::<Greeter>()?;
//! assert_eq!(greeter.greet(), "hello world at 42");
//! # Ok(())
//! # }
//! ```
//!
//! ## Service Lifetimes
//!
//! - **Singleton**: built once by the root provider and shared by all scopes
//! - **Scoped**: built once per scope; resolving one from the root is an error
//! - **Transient**: built fresh on every resolution
//!
//! ## Self-binding
//!
//! The root provider builds unregistered types that are described as
//! concrete. Scopes only answer for registered types. Both defaults can be
//! changed through [`ProviderOptions`].
//!
//! ## Disposal
//!
//! A scope disposes the scoped instances it created when it is closed or
//! dropped. Singletons belong to the root provider and are disposed only by
//! [`ServiceProvider::dispose_all`], never by a scope. A closed scope or a
//! disposed provider refuses further resolution, and an instance that
//! finishes building after the close is disposed instead of returned.
//!
//! ## Concurrency
//!
//! Providers and scopes are `Send + Sync`. Concurrent first requests for the
//! same singleton (or for the same scoped service on one shared scope)
//! construct exactly one instance. A dependency cycle is reported as
//! [`DiError::Circular`] even when its halves are first requested at the
//! same time from different threads.

pub mod activator;
pub mod catalog;
pub mod collection;
pub mod config;
pub mod descriptors;
pub mod error;
pub mod key;
pub mod lifetime;
pub mod observer;
pub mod provider;
pub mod traits;

mod cache;
mod internal;
mod matcher;
mod registration;

pub use activator::Arg;
pub use catalog::{Constructor, Params, TypeBuilder, TypeCatalog, TypeInfo, TypeKind};
pub use collection::ServiceCollection;
pub use config::ProviderOptions;
pub use descriptors::{ServiceDescriptor, Strategy};
pub use error::{BoxError, ConstructorReport, DiError, DiResult};
pub use key::{key_of_type, Key};
pub use lifetime::Lifetime;
pub use observer::{DiObserver, TracingObserver};
pub use provider::{ResolverContext, Scope, ServiceProvider};
pub use registration::AnyArc;
pub use traits::{Dispose, Resolver, ResolverCore};

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct Engine;
    struct Wheels;
    struct Car {
        engine: Option<Arc<Engine>>,
    }

    fn car_services(calls: Arc<AtomicUsize>) -> ServiceCollection {
        let mut services = ServiceCollection::new();
        services.describe::<Engine>().constructor(|()| Engine);
        services.describe::<Wheels>().constructor(|()| Wheels);
        let zero = calls.clone();
        services
            .describe::<Car>()
            .constructor(move |()| {
                zero.fetch_add(1, Ordering::SeqCst);
                Car { engine: None }
            })
            .constructor(|(engine, _wheels): (Arc<Engine>, Arc<Wheels>)| Car { engine: Some(engine) });
        services
    }

    #[test]
    fn greedy_constructor_is_preferred() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut services = car_services(calls.clone());
        services.add_singleton::<Engine>();
        services.add_singleton::<Wheels>();
        services.add_transient::<Car>();

        let provider = services.build().unwrap();
        let car = provider.get_required::<Car>().unwrap();
        assert!(car.engine.is_some());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn zero_argument_fallback_when_dependencies_missing() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut services = car_services(calls.clone());
        services.add_transient::<Car>();
        services.with_options(ProviderOptions::default().allow_self_binding_in_root(false));

        let provider = services.build().unwrap();
        let car = provider.get_required::<Car>().unwrap();
        assert!(car.engine.is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn scoped_from_root_is_a_lifetime_error() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut services = car_services(calls);
        services.add_scoped::<Engine>();
        let provider = services.build().unwrap();

        assert!(matches!(
            provider.get_service::<Engine>(),
            Err(DiError::WrongLifetime { .. })
        ));
        let scope = provider.create_scope();
        assert!(scope.get_required::<Engine>().is_ok());
    }
}
