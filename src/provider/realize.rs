//! Realizing a matched descriptor, shared by the root provider and scopes.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::Instant;

use crate::activator;
use crate::cache::{InstanceCache, Lookup};
use crate::descriptors::{ServiceDescriptor, Strategy};
use crate::error::{DiError, DiResult};
use crate::internal::StackGuard;
use crate::key::Key;
use crate::lifetime::Lifetime;
use crate::matcher;
use crate::observer::Observers;
use crate::registration::AnyArc;
use crate::traits::ResolverCore;

use super::{ProviderInner, ResolverContext};

/// Runs `resolve` with tracing and observer notifications around it.
pub(crate) fn observed<F>(observers: &Observers, key: &Key, resolve: F) -> DiResult<Option<AnyArc>>
where
    F: FnOnce() -> DiResult<Option<AnyArc>>,
{
    tracing::trace!(service = key.display_name(), "resolve");
    if !observers.has_observers() {
        return resolve();
    }

    observers.resolving(key);
    let start = Instant::now();
    let result = resolve();
    match &result {
        Ok(Some(_)) => observers.resolved(key, start.elapsed()),
        Ok(None) => {}
        Err(err) => observers.failed(key, err),
    }
    result
}

/// Resolvability check shared by root and scope. An ambiguous match counts
/// as resolvable so the ambiguity surfaces when resolution is attempted.
pub(crate) fn can_resolve(inner: &ProviderInner, key: &Key, self_binding: bool) -> bool {
    match matcher::find(&inner.table, &inner.catalog, *key) {
        Ok(Some(_)) | Err(_) => true,
        Ok(None) => self_binding && inner.catalog.is_concrete(key),
    }
}

/// Converts a realized instance to the requested type.
pub(crate) fn cast_to(
    inner: &ProviderInner,
    descriptor: &ServiceDescriptor,
    value: AnyArc,
    requested: Key,
) -> DiResult<AnyArc> {
    inner.catalog.cast(&value, descriptor.representation(), requested)
}

fn guard_for(inner: &ProviderInner, descriptor: &ServiceDescriptor) -> DiResult<Option<StackGuard>> {
    let max_depth = inner.options.max_depth;
    match descriptor.strategy() {
        Strategy::Instance { .. } => Ok(None),
        Strategy::Factory(_) => StackGuard::enter(descriptor.service(), max_depth).map(Some),
        Strategy::Implementation(implementation) => StackGuard::enter(*implementation, max_depth).map(Some),
    }
}

fn invoke_strategy(
    inner: &ProviderInner,
    descriptor: &ServiceDescriptor,
    resolver: &dyn ResolverCore,
) -> DiResult<AnyArc> {
    match descriptor.strategy() {
        Strategy::Instance { value, .. } => Ok(value.clone()),
        Strategy::Factory(factory) => {
            let context = ResolverContext::new(resolver);
            match catch_unwind(AssertUnwindSafe(|| factory(&context))) {
                Ok(result) => result,
                Err(payload) => Err(DiError::construction(
                    descriptor.type_name(),
                    activator::panic_message(payload.as_ref()),
                )),
            }
        }
        Strategy::Implementation(implementation) => activator::construct(&inner.catalog, *implementation, resolver),
    }
}

/// Builds a fresh instance (transient path).
pub(crate) fn produce(
    inner: &ProviderInner,
    descriptor: &ServiceDescriptor,
    resolver: &dyn ResolverCore,
) -> DiResult<AnyArc> {
    let _guard = guard_for(inner, descriptor)?;
    invoke_strategy(inner, descriptor, resolver)
}

/// Returns the cached instance for `descriptor`, building it at most once.
///
/// The construction-stack check runs before the cache cell is entered, so a
/// same-thread cycle is reported instead of waiting on its own cell. When
/// the owning cache has been drained the lookup fails, and an instance that
/// finished building across the drain is disposed here.
pub(crate) fn produce_cached(
    inner: &ProviderInner,
    cache: &InstanceCache,
    descriptor: &ServiceDescriptor,
    resolver: &dyn ResolverCore,
) -> DiResult<AnyArc> {
    if let Strategy::Instance { value, .. } = descriptor.strategy() {
        return Ok(value.clone());
    }

    let key = descriptor.service();
    if let Some(hit) = cache.get(&key) {
        return Ok(hit);
    }

    let _guard = guard_for(inner, descriptor)?;
    let lookup = cache.get_or_try_init(key, || {
        tracing::debug!(
            service = key.display_name(),
            lifetime = %descriptor.lifetime(),
            "creating cached instance"
        );
        invoke_strategy(inner, descriptor, resolver)
    })?;

    match lookup {
        Lookup::Ready(value) => Ok(value),
        Lookup::Closed(late) => {
            if let Some(value) = late {
                tracing::debug!(service = key.display_name(), "disposing instance built after close");
                dispose_instances(inner, vec![(key, value)]);
            }
            Err(closed_error(descriptor))
        }
    }
}

fn closed_error(descriptor: &ServiceDescriptor) -> DiError {
    match descriptor.lifetime() {
        Lifetime::Scoped => DiError::ScopeClosed(descriptor.type_name()),
        _ => DiError::ProviderDisposed(descriptor.type_name()),
    }
}

/// Disposes drained cache entries in reverse creation order. Each disposal
/// is isolated; a panicking one is logged and the rest still run.
pub(crate) fn dispose_instances(inner: &ProviderInner, instances: Vec<(Key, AnyArc)>) -> usize {
    let mut disposed = 0;
    for (key, value) in instances.into_iter().rev() {
        let representation = inner
            .table
            .get(&key)
            .map(ServiceDescriptor::representation)
            .unwrap_or(key);
        let Some(disposer) = inner.catalog.disposer(&representation) else {
            continue;
        };
        match catch_unwind(AssertUnwindSafe(|| disposer(&value))) {
            Ok(()) => disposed += 1,
            Err(payload) => tracing::warn!(
                service = key.display_name(),
                error = %activator::panic_message(payload.as_ref()),
                "disposal failed"
            ),
        }
    }
    disposed
}
