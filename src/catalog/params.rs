//! Constructor parameter lists.
//!
//! A constructor declares its dependencies as a tuple of `Arc<_>` values.
//! The tuple type doubles as the parameter signature: [`Params::keys`]
//! yields the ordered parameter types, [`Params::from_args`] rebuilds the
//! tuple from resolved, type-erased arguments.

use std::sync::Arc;

use crate::key::Key;
use crate::registration::{unerase, AnyArc};

/// Ordered constructor parameter types, implemented for tuples of `Arc<_>`
/// of arity 0 through 8.
///
/// ```rust
/// use ferrous_activator::{Key, Params};
/// use std::sync::Arc;
///
/// trait Clock: Send + Sync {}
/// struct Config;
///
/// let keys = <(Arc<dyn Clock>, Arc<Config>)>::keys();
/// assert_eq!(keys, vec![Key::of::<dyn Clock>(), Key::of::<Config>()]);
/// assert!(<()>::keys().is_empty());
/// ```
pub trait Params: Sized + 'static {
    /// Parameter types, left to right.
    fn keys() -> Vec<Key>;

    /// Rebuilds the tuple. `None` when the count or a type does not match.
    fn from_args(args: Vec<AnyArc>) -> Option<Self>;
}

macro_rules! impl_params {
    ($($p:ident),*) => {
        impl<$($p: ?Sized + Send + Sync + 'static),*> Params for ($(Arc<$p>,)*) {
            fn keys() -> Vec<Key> {
                vec![$(Key::of::<$p>()),*]
            }

            #[allow(unused_mut, unused_variables)]
            fn from_args(args: Vec<AnyArc>) -> Option<Self> {
                let mut args = args.into_iter();
                let params = ($(unerase::<$p>(&args.next()?)?,)*);
                if args.next().is_some() {
                    return None;
                }
                Some(params)
            }
        }
    };
}

impl_params!();
impl_params!(A);
impl_params!(A, B);
impl_params!(A, B, C);
impl_params!(A, B, C, D);
impl_params!(A, B, C, D, E);
impl_params!(A, B, C, D, E, F);
impl_params!(A, B, C, D, E, F, G);
impl_params!(A, B, C, D, E, F, G, H);
