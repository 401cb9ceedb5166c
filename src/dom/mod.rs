//! # Document model
//!
//! - `node` - arena tree, node data, traversal and element factories
//! - `fragment` - fragment handles and the remove/replace splice primitives
//! - `predicate` - node predicates, combinators, `search` and `closest`

pub mod fragment;
pub mod node;
pub mod predicate;

pub use fragment::Fragment;
pub use node::{Attribute, Node, NodeData, NodeId, Tree};
pub use predicate::{closest, search, BoxedPredicate, Predicate};
