//! Type identity keys for the descriptor table, caches and type catalog.

use std::any::TypeId;
use std::fmt;

/// Identity of a service, implementation or parameter type.
///
/// A key pairs a [`TypeId`] with the compiler's `type_name` so that errors
/// can name the type. Only the `TypeId` takes part in equality and hashing.
/// Keys work for concrete types and for trait objects alike.
///
/// # Examples
///
/// ```rust
/// use ferrous_activator::Key;
///
/// trait Clock: Send + Sync {}
///
/// let a = Key::of::<String>();
/// let b = Key::of::<String>();
/// assert_eq!(a, b);
/// assert_eq!(a.display_name(), "alloc::string::String");
/// assert_eq!(a.short_name(), "String");
///
/// let c = Key::of::<dyn Clock>();
/// assert_ne!(a, c);
/// assert!(c.display_name().contains("Clock"));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Key {
    id: TypeId,
    name: &'static str,
}

impl Key {
    /// Key for `T`. `T` may be unsized (`dyn Trait`, `str`).
    #[inline(always)]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Key {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// The underlying `TypeId`.
    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.id
    }

    /// Full `type_name` of the keyed type.
    #[inline]
    pub fn display_name(&self) -> &'static str {
        self.name
    }

    /// Type name with module paths stripped, e.g. `Arc<Config>` for
    /// `alloc::sync::Arc<app::Config>`. Used in constructor signatures.
    pub fn short_name(&self) -> String {
        strip_paths(self.name)
    }
}

fn strip_paths(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut segment = String::new();
    let mut chars = name.chars().peekable();

    while let Some(c) = chars.next() {
        if c == ':' && chars.peek() == Some(&':') {
            chars.next();
            // a path prefix: drop what we collected for this segment
            segment.clear();
        } else if c.is_alphanumeric() || c == '_' {
            segment.push(c);
        } else {
            out.push_str(&segment);
            segment.clear();
            out.push(c);
        }
    }
    out.push_str(&segment);
    out
}

impl PartialEq for Key {
    #[inline(always)]
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Key {}

impl std::hash::Hash for Key {
    #[inline(always)]
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Shorthand for [`Key::of`].
#[inline(always)]
pub fn key_of_type<T: ?Sized + 'static>() -> Key {
    Key::of::<T>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_paths_handles_generics_and_trait_objects() {
        assert_eq!(strip_paths("alloc::sync::Arc<app::Config>"), "Arc<Config>");
        assert_eq!(strip_paths("dyn app::clock::Clock"), "dyn Clock");
        assert_eq!(strip_paths("u32"), "u32");
        assert_eq!(
            strip_paths("std::collections::HashMap<a::K, b::V>"),
            "HashMap<K, V>"
        );
    }
}
