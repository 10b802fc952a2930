// Copyright 2023 Behavior Tree Project Authors. Licensed under Apache-2.0.

use std::collections::BTreeMap;

/// Index of a node inside the arena of a [`TreeSpec`].
///
/// [`TreeSpec`]: crate::model::TreeSpec
pub type NodeId = usize;

/// Control-flow nodes with more than one child.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompositeKind {
    /// Ticks children from the first one on every tick.
    Sequence,
    /// Remembers the running child and resumes from it.
    MemorySequence,
    Fallback,
    MemoryFallback,
    /// Ticks all children, finishes once either threshold is crossed.
    Parallel {
        success_threshold: usize,
        failure_threshold: usize,
    },
}

/// Control-flow nodes with exactly one child.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoratorKind {
    Inverter,
    /// Re-ticks a succeeding child up to `cycles` times.
    Repeat { cycles: usize },
    /// Re-ticks a failing child up to `attempts` times.
    Retry { attempts: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Composite(CompositeKind),
    Decorator(DecoratorKind),
    Action,
    Condition,
}

/// One node of a tree specification.
///
/// For leaves, `name` selects the implementation in the leaf registry and
/// `params` configures that instance. For control-flow nodes `name` is a
/// display label only.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeSpec {
    pub kind: NodeKind,
    pub name: String,
    pub params: BTreeMap<String, String>,
    pub children: Vec<NodeId>,
}

impl NodeSpec {
    pub fn new(kind: NodeKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            params: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<NodeId>) -> Self {
        self.children = children;
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let _ = self.params.insert(key.into(), value.into());
        self
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Action | NodeKind::Condition)
    }
}
