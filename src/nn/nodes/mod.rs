mod node_handle;
pub(in crate::nn) mod raw_node;

pub use node_handle::{NodeHandle, NodeId};
pub use raw_node::Init;
pub(in crate::nn) use raw_node::{NodeType, TraitNode};
