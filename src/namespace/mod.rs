//! The virtual namespace: paths, nodes and their persistent store.

pub mod node;
pub mod path;
pub mod store;

pub use node::{Category, NewNode, Node, DIRECTORY_SIZE};
pub use path::ROOT;
pub use store::NamespaceStore;
