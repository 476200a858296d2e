//! Instance activation: constructor selection and recursive construction.
//!
//! Constructors are tried greediest first. A constructor is chosen when the
//! resolver reports every one of its parameter types as resolvable; that
//! check never builds anything. A zero-argument constructor is trivially
//! satisfiable and so acts as the fallback. When nothing fits, the error
//! lists the missing parameters of every constructor.

mod explicit;

pub use explicit::Arg;
pub(crate) use explicit::create_instance;

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};

use crate::catalog::{Constructor, TypeCatalog, TypeInfo};
use crate::error::{ConstructorReport, DiError, DiResult};
use crate::internal::StackGuard;
use crate::key::Key;
use crate::registration::AnyArc;
use crate::traits::ResolverCore;

/// Builds `implementation` with `implementation` pushed on the construction
/// stack for the duration.
pub(crate) fn activate<R>(
    catalog: &TypeCatalog,
    implementation: Key,
    resolver: &R,
    max_depth: usize,
) -> DiResult<AnyArc>
where
    R: ResolverCore + ?Sized,
{
    let _guard = StackGuard::enter(implementation, max_depth)?;
    construct(catalog, implementation, resolver)
}

/// Builds `implementation`. The caller owns the construction-stack entry.
pub(crate) fn construct<R>(catalog: &TypeCatalog, implementation: Key, resolver: &R) -> DiResult<AnyArc>
where
    R: ResolverCore + ?Sized,
{
    let info = concrete_info(catalog, implementation)?;
    let constructor = select(info, resolver)?;

    tracing::debug!(
        constructor = %constructor.signature(&implementation),
        "activating"
    );

    let mut args = Vec::with_capacity(constructor.arity());
    for param in constructor.params() {
        let value = resolver
            .resolve_any(param)?
            .ok_or(DiError::NotFound(param.display_name()))?;
        args.push(value);
    }
    invoke(constructor, args, implementation.display_name())
}

pub(crate) fn concrete_info(catalog: &TypeCatalog, implementation: Key) -> DiResult<&TypeInfo> {
    let info = catalog
        .get(&implementation)
        .ok_or(DiError::NotFound(implementation.display_name()))?;
    if !info.is_concrete() {
        return Err(DiError::AbstractType(implementation.display_name()));
    }
    Ok(info)
}

/// Constructors ordered by descending arity; declaration order breaks ties.
pub(crate) fn by_arity(info: &TypeInfo) -> Vec<&Constructor> {
    let mut ordered: Vec<&Constructor> = info.constructors().iter().collect();
    ordered.sort_by(|a, b| b.arity().cmp(&a.arity()));
    ordered
}

fn select<'c, R>(info: &'c TypeInfo, resolver: &R) -> DiResult<&'c Constructor>
where
    R: ResolverCore + ?Sized,
{
    let ordered = by_arity(info);
    if let Some(chosen) = ordered
        .iter()
        .find(|c| c.params().iter().all(|p| resolver.can_resolve_key(p)))
    {
        return Ok(*chosen);
    }

    let owner = info.key();
    let constructors = ordered
        .iter()
        .map(|c| ConstructorReport {
            signature: c.signature(&owner),
            missing: c
                .params()
                .iter()
                .filter(|p| !resolver.can_resolve_key(p))
                .map(Key::display_name)
                .collect(),
        })
        .collect();

    Err(DiError::Unsatisfiable {
        type_name: owner.display_name(),
        constructors,
    })
}

/// Runs a constructor, turning both returned errors and panics into
/// [`DiError::Construction`].
pub(crate) fn invoke(constructor: &Constructor, args: Vec<AnyArc>, type_name: &'static str) -> DiResult<AnyArc> {
    match catch_unwind(AssertUnwindSafe(|| constructor.invoke(args))) {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(cause)) => Err(DiError::construction(type_name, cause)),
        Err(payload) => Err(DiError::construction(type_name, panic_message(payload.as_ref()))),
    }
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panicked: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panicked: {s}")
    } else {
        "panicked".to_string()
    }
}
