//! Internal implementation details.

pub(crate) mod circular;
pub(crate) mod dispose_bag;
pub(crate) mod wait_graph;

pub(crate) use circular::{StackGuard, MAX_DEPTH};
pub(crate) use dispose_bag::DisposeBag;
pub(crate) use wait_graph::{Building, Waiting};
