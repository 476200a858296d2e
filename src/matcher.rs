//! Type matching: which descriptor answers a requested type.
//!
//! An exact registration for the requested type always wins. Otherwise every
//! descriptor with a statically known produced type that is assignable to
//! the request is a candidate, and the most specific candidate (one whose
//! produced type is a subtype of every other candidate's) is chosen. Ties
//! between unrelated produced types are reported, never broken arbitrarily.
//! Factories have no known produced type and only ever match exactly.

use crate::catalog::TypeCatalog;
use crate::descriptors::ServiceDescriptor;
use crate::error::{DiError, DiResult};
use crate::key::Key;
use crate::registration::DescriptorTable;

/// Finds the descriptor answering `requested`. `Ok(None)` means no match at
/// all; self-binding is decided by the caller.
pub(crate) fn find<'t>(
    table: &'t DescriptorTable,
    catalog: &TypeCatalog,
    requested: Key,
) -> DiResult<Option<&'t ServiceDescriptor>> {
    if let Some(exact) = table.get(&requested) {
        return Ok(Some(exact));
    }

    let candidates: Vec<(&ServiceDescriptor, Key)> = table
        .iter()
        .filter_map(|d| {
            let produced = d.produced_type()?;
            catalog
                .is_assignable(produced, requested)
                .then_some((d, produced))
        })
        .collect();

    match candidates.as_slice() {
        [] => Ok(None),
        [(only, _)] => Ok(Some(*only)),
        _ => {
            let best = candidates.iter().find(|(_, produced)| {
                candidates
                    .iter()
                    .all(|(_, other)| catalog.is_assignable(*produced, *other))
            });
            match best {
                Some((descriptor, produced)) => {
                    tracing::trace!(
                        requested = requested.display_name(),
                        chosen = produced.display_name(),
                        candidates = candidates.len(),
                        "assignable match"
                    );
                    Ok(Some(*descriptor))
                }
                None => Err(DiError::Ambiguous {
                    requested: requested.display_name(),
                    candidates: candidates.iter().map(|(_, p)| p.display_name()).collect(),
                }),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptors::FactoryFn;
    use crate::lifetime::Lifetime;
    use crate::provider::ResolverContext;
    use crate::registration::{erase, AnyArc};
    use std::sync::Arc;

    trait Shape: Send + Sync {}
    struct Circle;
    struct Square;
    struct Unit {
        circle: Arc<Circle>,
    }
    impl Shape for Circle {}
    impl Shape for Square {}

    fn catalog() -> TypeCatalog {
        let mut c = TypeCatalog::new();
        c.describe_abstract::<dyn Shape>();
        c.describe::<Circle>()
            .constructor(|()| Circle)
            .implements::<dyn Shape, _>(|s| s as Arc<dyn Shape>);
        c.describe::<Square>()
            .constructor(|()| Square)
            .implements::<dyn Shape, _>(|s| s as Arc<dyn Shape>);
        c.describe::<Unit>()
            .constructor(|(circle,): (Arc<Circle>,)| Unit { circle })
            .implements::<Circle, _>(|u| u.circle.clone());
        c
    }

    fn implementation<T: 'static>(lifetime: Lifetime) -> ServiceDescriptor {
        ServiceDescriptor::implementation(Key::of::<T>(), Key::of::<T>(), lifetime)
    }

    #[test]
    fn exact_match_short_circuits() {
        let c = catalog();
        let mut table = DescriptorTable::default();
        table.insert(implementation::<Circle>(Lifetime::Singleton));
        table.insert(ServiceDescriptor::implementation(
            Key::of::<dyn Shape>(),
            Key::of::<Square>(),
            Lifetime::Transient,
        ));

        let found = find(&table, &c, Key::of::<dyn Shape>()).unwrap().unwrap();
        assert_eq!(found.produced_type(), Some(Key::of::<Square>()));
    }

    #[test]
    fn unrelated_siblings_are_ambiguous() {
        let c = catalog();
        let mut table = DescriptorTable::default();
        table.insert(implementation::<Circle>(Lifetime::Singleton));
        table.insert(implementation::<Square>(Lifetime::Singleton));

        match find(&table, &c, Key::of::<dyn Shape>()) {
            Err(DiError::Ambiguous { candidates, .. }) => {
                assert_eq!(candidates.len(), 2);
                assert!(candidates[0].ends_with("Circle"));
                assert!(candidates[1].ends_with("Square"));
            }
            other => panic!("expected ambiguity, got {other:?}"),
        }
    }

    #[test]
    fn most_specific_subtype_wins() {
        let c = catalog();
        let mut table = DescriptorTable::default();
        table.insert(implementation::<Circle>(Lifetime::Singleton));
        table.insert(implementation::<Unit>(Lifetime::Singleton));

        let found = find(&table, &c, Key::of::<dyn Shape>()).unwrap().unwrap();
        assert_eq!(found.service(), Key::of::<Unit>());
    }

    #[test]
    fn factories_never_match_by_assignment() {
        let c = catalog();
        let factory: FactoryFn = Arc::new(|_: &ResolverContext<'_>| -> DiResult<AnyArc> {
            Ok(erase(Arc::new(Circle)))
        });
        let mut table = DescriptorTable::default();
        table.insert(ServiceDescriptor::factory(Key::of::<Circle>(), factory, Lifetime::Transient));

        assert!(find(&table, &c, Key::of::<dyn Shape>()).unwrap().is_none());
        assert!(find(&table, &c, Key::of::<Circle>()).unwrap().is_some());
    }
}
