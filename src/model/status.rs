// Copyright 2023 Behavior Tree Project Authors. Licensed under Apache-2.0.

use std::fmt::Display;

/// Execution status of a node, as observed after a tick.
///
/// `Idle` is the state before the first tick, `Halted` the state after a
/// running node has been preempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeStatus {
    Idle,
    Running,
    Success,
    Failure,
    Halted,
}

impl NodeStatus {
    /// Whether the node has finished with a definite outcome.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self, NodeStatus::Success | NodeStatus::Failure)
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        matches!(self, NodeStatus::Running)
    }
}

impl Display for NodeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            NodeStatus::Idle => "idle",
            NodeStatus::Running => "running",
            NodeStatus::Success => "success",
            NodeStatus::Failure => "failure",
            NodeStatus::Halted => "halted",
        };
        f.write_str(s)
    }
}
