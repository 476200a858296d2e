//! Type catalog: constructors, supertypes and disposal capabilities.
//!
//! Rust has no runtime reflection, so the container learns about types
//! through explicit descriptions. For every described type the catalog
//! records
//!
//! - whether it is **concrete** (constructible) or **abstract** (a trait
//!   object or any type that is only ever produced by others),
//! - its **constructors** as ordered parameter-type lists,
//! - its declared **supertypes**, each with an upcast from `Arc<Self>` to
//!   `Arc<Super>`,
//! - optionally a **disposal** capability.
//!
//! Assignability is the reflexive, transitive closure of declared supertype
//! edges. A type that was never described is neither concrete nor a
//! subtype of anything but itself.

mod params;

pub use params::Params;

use std::collections::{HashMap, HashSet, VecDeque};
use std::convert::Infallible;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::error::{BoxError, DiError, DiResult};
use crate::key::Key;
use crate::registration::{erase, unerase, AnyArc};
use crate::traits::Dispose;

pub(crate) type UpcastFn = Arc<dyn Fn(&AnyArc) -> Option<AnyArc> + Send + Sync>;
pub(crate) type DisposeFn = Arc<dyn Fn(&AnyArc) + Send + Sync>;
type InvokeFn = Arc<dyn Fn(Vec<AnyArc>) -> Result<AnyArc, BoxError> + Send + Sync>;

/// Whether a described type can be constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    /// Has constructors; eligible for self-binding.
    Concrete,
    /// Never instantiated directly (trait objects, abstractions).
    Abstract,
}

/// A declared constructor: ordered parameter types plus the callback that
/// builds the instance from resolved arguments.
#[derive(Clone)]
pub struct Constructor {
    params: Vec<Key>,
    invoke: InvokeFn,
}

impl Constructor {
    /// Parameter types, left to right.
    pub fn params(&self) -> &[Key] {
        &self.params
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Human readable signature such as `Greeter(dyn Clock, Config)`.
    pub fn signature(&self, owner: &Key) -> String {
        let params: Vec<String> = self.params.iter().map(Key::short_name).collect();
        format!("{}({})", owner.short_name(), params.join(", "))
    }

    pub(crate) fn invoke(&self, args: Vec<AnyArc>) -> Result<AnyArc, BoxError> {
        (self.invoke)(args)
    }
}

impl fmt::Debug for Constructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Constructor")
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

#[derive(Clone)]
struct Supertype {
    key: Key,
    upcast: UpcastFn,
}

/// Everything the catalog knows about one type.
pub struct TypeInfo {
    key: Key,
    kind: TypeKind,
    constructors: Vec<Constructor>,
    supertypes: Vec<Supertype>,
    disposer: Option<DisposeFn>,
}

impl TypeInfo {
    fn new(key: Key, kind: TypeKind) -> Self {
        Self {
            key,
            kind,
            constructors: Vec::new(),
            supertypes: Vec::new(),
            disposer: None,
        }
    }

    pub fn key(&self) -> Key {
        self.key
    }

    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    pub fn is_concrete(&self) -> bool {
        self.kind == TypeKind::Concrete
    }

    /// Constructors in declaration order.
    pub fn constructors(&self) -> &[Constructor] {
        &self.constructors
    }

    /// Directly declared supertypes.
    pub fn supertypes(&self) -> impl Iterator<Item = Key> + '_ {
        self.supertypes.iter().map(|s| s.key)
    }

    pub fn is_disposable(&self) -> bool {
        self.disposer.is_some()
    }
}

impl fmt::Debug for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeInfo")
            .field("key", &self.key)
            .field("kind", &self.kind)
            .field("constructors", &self.constructors)
            .field("supertypes", &self.supertypes().collect::<Vec<_>>())
            .field("disposable", &self.is_disposable())
            .finish()
    }
}

/// Registry of type descriptions consulted by the matcher and activators.
///
/// # Examples
///
/// ```rust
/// use ferrous_activator::{TypeCatalog, Key};
/// use std::sync::Arc;
///
/// trait Clock: Send + Sync { fn now(&self) -> u64; }
/// struct SystemClock;
/// impl Clock for SystemClock { fn now(&self) -> u64 { 7 } }
///
/// let mut catalog = TypeCatalog::new();
/// catalog.describe_abstract::<dyn Clock>();
/// catalog
///     .describe::<SystemClock>()
///     .constructor(|()| SystemClock)
///     .implements::<dyn Clock, _>(|c| c as Arc<dyn Clock>);
///
/// assert!(catalog.is_concrete(&Key::of::<SystemClock>()));
/// assert!(!catalog.is_concrete(&Key::of::<dyn Clock>()));
/// assert!(catalog.is_assignable(Key::of::<SystemClock>(), Key::of::<dyn Clock>()));
/// assert!(!catalog.is_assignable(Key::of::<dyn Clock>(), Key::of::<SystemClock>()));
/// ```
#[derive(Default)]
pub struct TypeCatalog {
    types: HashMap<Key, TypeInfo>,
}

impl TypeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Describes a concrete type. Calling it again for the same type adds to
    /// the existing description.
    pub fn describe<T: Send + Sync + 'static>(&mut self) -> TypeBuilder<'_, T> {
        TypeBuilder::new(self.entry(Key::of::<T>(), TypeKind::Concrete))
    }

    /// Describes an abstract type (typically `dyn Trait`).
    pub fn describe_abstract<T: ?Sized + Send + Sync + 'static>(&mut self) -> TypeBuilder<'_, T> {
        TypeBuilder::new(self.entry(Key::of::<T>(), TypeKind::Abstract))
    }

    fn entry(&mut self, key: Key, kind: TypeKind) -> &mut TypeInfo {
        let info = self
            .types
            .entry(key)
            .or_insert_with(|| TypeInfo::new(key, kind));
        info.kind = kind;
        info
    }

    pub fn get(&self, key: &Key) -> Option<&TypeInfo> {
        self.types.get(key)
    }

    pub fn contains(&self, key: &Key) -> bool {
        self.types.contains_key(key)
    }

    /// True only for described concrete types.
    pub fn is_concrete(&self, key: &Key) -> bool {
        self.types.get(key).is_some_and(TypeInfo::is_concrete)
    }

    /// Whether a value of `from` can stand in for `to`.
    pub fn is_assignable(&self, from: Key, to: Key) -> bool {
        self.upcast_path(from, to).is_some()
    }

    /// Converts a `from` instance into its `to` representation along the
    /// shortest declared supertype path.
    pub(crate) fn cast(&self, value: &AnyArc, from: Key, to: Key) -> DiResult<AnyArc> {
        if from == to {
            return Ok(value.clone());
        }
        let path = self
            .upcast_path(from, to)
            .ok_or(DiError::TypeMismatch(to.display_name()))?;
        let mut current = value.clone();
        for upcast in path {
            current = upcast(&current).ok_or(DiError::TypeMismatch(to.display_name()))?;
        }
        Ok(current)
    }

    fn upcast_path(&self, from: Key, to: Key) -> Option<Vec<UpcastFn>> {
        if from == to {
            return Some(Vec::new());
        }
        let mut visited = HashSet::from([from]);
        let mut queue = VecDeque::from([(from, Vec::<UpcastFn>::new())]);

        while let Some((current, path)) = queue.pop_front() {
            let Some(info) = self.types.get(&current) else {
                continue;
            };
            for sup in &info.supertypes {
                if !visited.insert(sup.key) {
                    continue;
                }
                let mut next = path.clone();
                next.push(sup.upcast.clone());
                if sup.key == to {
                    return Some(next);
                }
                queue.push_back((sup.key, next));
            }
        }
        None
    }

    pub(crate) fn disposer(&self, key: &Key) -> Option<&DisposeFn> {
        self.types.get(key).and_then(|info| info.disposer.as_ref())
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TypeInfo> {
        self.types.values()
    }
}

impl fmt::Debug for TypeCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.types.values()).finish()
    }
}

/// Fluent description of one type, returned by [`TypeCatalog::describe`]
/// and [`TypeCatalog::describe_abstract`].
pub struct TypeBuilder<'a, T: ?Sized> {
    info: &'a mut TypeInfo,
    _marker: PhantomData<fn(Arc<T>)>,
}

impl<'a, T: ?Sized + Send + Sync + 'static> TypeBuilder<'a, T> {
    fn new(info: &'a mut TypeInfo) -> Self {
        Self {
            info,
            _marker: PhantomData,
        }
    }

    pub fn key(&self) -> Key {
        self.info.key
    }

    /// Declares `T` a subtype of `S`. The upcast must return the same
    /// allocation (usually an unsizing coercion such as
    /// `|c| c as Arc<dyn Clock>`), or a shared part of it.
    pub fn implements<S, F>(self, upcast: F) -> Self
    where
        S: ?Sized + Send + Sync + 'static,
        F: Fn(Arc<T>) -> Arc<S> + Send + Sync + 'static,
    {
        let key = Key::of::<S>();
        let upcast: UpcastFn = Arc::new(move |value: &AnyArc| unerase::<T>(value).map(|t| erase(upcast(t))));
        self.info.supertypes.retain(|s| s.key != key);
        self.info.supertypes.push(Supertype { key, upcast });
        self
    }

    /// Marks `T` as disposable: scoped instances of it are disposed when
    /// their scope closes, singletons when the provider is disposed.
    pub fn disposable(self) -> Self
    where
        T: Dispose,
    {
        self.info.disposer = Some(Arc::new(|value: &AnyArc| {
            if let Some(service) = unerase::<T>(value) {
                service.dispose();
            }
        }));
        self
    }
}

impl<'a, T: Send + Sync + 'static> TypeBuilder<'a, T> {
    /// Declares an infallible constructor taking a tuple of `Arc` dependencies.
    pub fn constructor<P, F>(self, f: F) -> Self
    where
        P: Params,
        F: Fn(P) -> T + Send + Sync + 'static,
    {
        self.try_constructor(move |params: P| Ok::<T, Infallible>(f(params)))
    }

    /// Declares a fallible constructor. Its error becomes the cause of a
    /// [`DiError::Construction`].
    pub fn try_constructor<P, F, E>(self, f: F) -> Self
    where
        P: Params,
        F: Fn(P) -> Result<T, E> + Send + Sync + 'static,
        E: Into<BoxError>,
    {
        let invoke: InvokeFn = Arc::new(move |args: Vec<AnyArc>| {
            let params = P::from_args(args).ok_or_else(|| {
                BoxError::from(format!(
                    "arguments do not match a constructor of {}",
                    std::any::type_name::<T>()
                ))
            })?;
            f(params).map(|value| erase(Arc::new(value))).map_err(Into::into)
        });
        self.info.constructors.push(Constructor {
            params: P::keys(),
            invoke,
        });
        self
    }
}
