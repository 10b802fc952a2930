// Copyright 2023 Behavior Tree Project Authors. Licensed under Apache-2.0.

pub mod blackboard;
pub mod node;
pub mod status;
pub mod tree;
pub mod value;

pub use blackboard::Blackboard;
pub use node::{CompositeKind, DecoratorKind, NodeId, NodeKind, NodeSpec};
pub use status::NodeStatus;
pub use tree::{TreeSpec, TreeSpecBuilder};
pub use value::Value;
