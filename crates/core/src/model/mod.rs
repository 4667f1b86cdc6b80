pub mod call_tree;
pub mod frame;

pub use call_tree::{CallTree, CallTreeNode, NodeId, TreeError};
pub use frame::{FlameFrame, FrameId, FrameRef};
