//! Descriptor table and type-erased instance storage.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use crate::descriptors::ServiceDescriptor;
use crate::key::Key;

/// Type-erased instance. Always wraps an `Arc<T>` so that sized types and
/// trait objects share one representation.
pub type AnyArc = Arc<dyn Any + Send + Sync>;

/// Erases an `Arc<T>`. The result shares `value`'s allocation.
#[inline]
pub(crate) fn erase<T: ?Sized + Send + Sync + 'static>(value: Arc<T>) -> AnyArc {
    Arc::new(value)
}

/// Recovers an `Arc<T>` stored by [`erase`].
#[inline]
pub(crate) fn unerase<T: ?Sized + Send + Sync + 'static>(value: &AnyArc) -> Option<Arc<T>> {
    value.downcast_ref::<Arc<T>>().cloned()
}

/// Ordered descriptors, one per service type, immutable once the provider
/// is built.
///
/// Registering a service type twice replaces the earlier descriptor in
/// place, so the last registration wins and registration order is kept.
#[derive(Clone, Default)]
pub(crate) struct DescriptorTable {
    descriptors: Vec<ServiceDescriptor>,
    index: HashMap<Key, usize>,
}

impl DescriptorTable {
    pub(crate) fn insert(&mut self, descriptor: ServiceDescriptor) {
        let key = descriptor.service();
        match self.index.get(&key) {
            Some(&pos) => self.descriptors[pos] = descriptor,
            None => {
                self.index.insert(key, self.descriptors.len());
                self.descriptors.push(descriptor);
            }
        }
    }

    #[inline]
    pub(crate) fn get(&self, key: &Key) -> Option<&ServiceDescriptor> {
        self.index.get(key).map(|&pos| &self.descriptors[pos])
    }

    /// Descriptors in registration order.
    pub(crate) fn iter(&self) -> std::slice::Iter<'_, ServiceDescriptor> {
        self.descriptors.iter()
    }

    pub(crate) fn as_slice(&self) -> &[ServiceDescriptor] {
        &self.descriptors
    }

    pub(crate) fn len(&self) -> usize {
        self.descriptors.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifetime::Lifetime;

    struct A;
    struct B;

    #[test]
    fn erase_shares_allocation_for_trait_objects() {
        trait Named: Send + Sync {
            fn name(&self) -> &'static str;
        }
        impl Named for A {
            fn name(&self) -> &'static str {
                "a"
            }
        }

        let a: Arc<dyn Named> = Arc::new(A);
        let erased = erase(a.clone());
        let back = unerase::<dyn Named>(&erased).unwrap();
        assert!(Arc::ptr_eq(&a, &back));
        assert_eq!(back.name(), "a");
        assert!(unerase::<A>(&erased).is_none());
    }

    #[test]
    fn reregistration_replaces_in_place() {
        let mut table = DescriptorTable::default();
        table.insert(ServiceDescriptor::implementation(Key::of::<A>(), Key::of::<A>(), Lifetime::Singleton));
        table.insert(ServiceDescriptor::implementation(Key::of::<B>(), Key::of::<B>(), Lifetime::Scoped));
        table.insert(ServiceDescriptor::implementation(Key::of::<A>(), Key::of::<A>(), Lifetime::Transient));

        assert_eq!(table.len(), 2);
        let order: Vec<Key> = table.iter().map(|d| d.service()).collect();
        assert_eq!(order, vec![Key::of::<A>(), Key::of::<B>()]);
        assert_eq!(table.get(&Key::of::<A>()).unwrap().lifetime(), Lifetime::Transient);
    }
}
