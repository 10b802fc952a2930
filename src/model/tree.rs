// Copyright 2023 Behavior Tree Project Authors. Licensed under Apache-2.0.

//! [TreeSpec] and its builder

use crate::{
    errors::{Error, Result},
    model::node::{CompositeKind, DecoratorKind, NodeId, NodeKind, NodeSpec},
};

/// A validated, immutable tree specification in arena form.
///
/// The engine instantiates a runtime tree from it and never mutates it, so
/// one spec can back any number of runs.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeSpec {
    name: String,
    nodes: Vec<NodeSpec>,
    root: NodeId,
}

impl TreeSpec {
    /// Build a spec from raw parts, validating the structure.
    pub fn new(name: impl Into<String>, nodes: Vec<NodeSpec>, root: NodeId) -> Result<Self> {
        let spec = Self {
            name: name.into(),
            nodes,
            root,
        };
        spec.validate()?;
        Ok(spec)
    }

    pub fn builder(name: impl Into<String>) -> TreeSpecBuilder {
        TreeSpecBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &NodeSpec {
        &self.nodes[id]
    }

    pub fn nodes(&self) -> &[NodeSpec] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn validate(&self) -> Result<()> {
        if self.nodes.is_empty() {
            return Err(Error::InvalidTree("tree has no nodes".to_string()));
        }
        if self.root >= self.nodes.len() {
            return Err(Error::InvalidTree(format!(
                "root id:{} out of range (len:{})",
                self.root,
                self.nodes.len()
            )));
        }

        // Arity and child ranges first, parent counts as we go.
        let mut parents = vec![0usize; self.nodes.len()];
        for (id, node) in self.nodes.iter().enumerate() {
            for child in &node.children {
                if *child >= self.nodes.len() {
                    return Err(Error::InvalidTree(format!(
                        "node:{} refers to child:{} out of range",
                        id, child
                    )));
                }
                parents[*child] += 1;
            }

            match &node.kind {
                NodeKind::Composite(kind) => {
                    if node.children.is_empty() {
                        return Err(Error::InvalidTree(format!(
                            "composite node:{} ({}) has no children",
                            id, node.name
                        )));
                    }
                    if let CompositeKind::Parallel {
                        success_threshold,
                        failure_threshold,
                    } = kind
                    {
                        let n = node.children.len();
                        if *success_threshold < 1
                            || *success_threshold > n
                            || *failure_threshold < 1
                            || *failure_threshold > n
                        {
                            return Err(Error::InvalidTree(format!(
                                "parallel node:{} thresholds ({}, {}) out of 1..={}",
                                id, success_threshold, failure_threshold, n
                            )));
                        }
                    }
                }
                NodeKind::Decorator(_) => {
                    if node.children.len() != 1 {
                        return Err(Error::InvalidTree(format!(
                            "decorator node:{} ({}) must have exactly one child",
                            id, node.name
                        )));
                    }
                }
                NodeKind::Action | NodeKind::Condition => {
                    if !node.children.is_empty() {
                        return Err(Error::InvalidTree(format!(
                            "leaf node:{} ({}) cannot have children",
                            id, node.name
                        )));
                    }
                }
            }
        }

        for (id, count) in parents.iter().enumerate() {
            if id == self.root && *count != 0 {
                return Err(Error::InvalidTree(format!(
                    "root id:{} appears as a child",
                    id
                )));
            }
            if id != self.root && *count != 1 {
                return Err(Error::InvalidTree(format!(
                    "node:{} has {} parents, expected 1",
                    id, count
                )));
            }
        }

        // Parent counts alone cannot rule out cycles detached from the
        // root, so also require full reachability.
        let mut seen = vec![false; self.nodes.len()];
        let mut stack = vec![self.root];
        let mut reached = 0usize;
        while let Some(id) = stack.pop() {
            if seen[id] {
                continue;
            }
            seen[id] = true;
            reached += 1;
            stack.extend(self.nodes[id].children.iter().copied());
        }
        if reached != self.nodes.len() {
            return Err(Error::InvalidTree(format!(
                "{} of {} nodes unreachable from root",
                self.nodes.len() - reached,
                self.nodes.len()
            )));
        }

        Ok(())
    }
}

/// Builder assembling a [`TreeSpec`] bottom-up.
///
/// Children are added before their parent, the root last.
#[derive(Debug)]
pub struct TreeSpecBuilder {
    name: String,
    nodes: Vec<NodeSpec>,
}

impl TreeSpecBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nodes: Vec::new(),
        }
    }

    /// Add a fully formed node spec and get its id back.
    pub fn add(&mut self, spec: NodeSpec) -> NodeId {
        self.nodes.push(spec);
        self.nodes.len() - 1
    }

    pub fn action(&mut self, name: &str) -> NodeId {
        self.add(NodeSpec::new(NodeKind::Action, name))
    }

    pub fn condition(&mut self, name: &str) -> NodeId {
        self.add(NodeSpec::new(NodeKind::Condition, name))
    }

    pub fn composite(&mut self, kind: CompositeKind, name: &str, children: Vec<NodeId>) -> NodeId {
        self.add(NodeSpec::new(NodeKind::Composite(kind), name).with_children(children))
    }

    pub fn decorator(&mut self, kind: DecoratorKind, name: &str, child: NodeId) -> NodeId {
        self.add(NodeSpec::new(NodeKind::Decorator(kind), name).with_children(vec![child]))
    }

    /// Build the final spec rooted at `root`.
    pub fn build(self, root: NodeId) -> Result<TreeSpec> {
        TreeSpec::new(self.name, self.nodes, root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_valid_tree() {
        let mut builder = TreeSpec::builder("patrol");
        let check = builder.condition("battery_ok");
        let goto = builder.action("goto_waypoint");
        let seq = builder.composite(CompositeKind::Sequence, "patrol_seq", vec![check, goto]);
        let spec = builder.build(seq).unwrap();

        assert_eq!(spec.root(), seq);
        assert_eq!(spec.len(), 3);
        assert_eq!(spec.node(goto).name, "goto_waypoint");
    }

    #[test]
    fn test_decorator_arity() {
        let a = NodeSpec::new(NodeKind::Action, "a");
        let b = NodeSpec::new(NodeKind::Action, "b");
        let inv = NodeSpec::new(NodeKind::Decorator(DecoratorKind::Inverter), "inv")
            .with_children(vec![0, 1]);
        let res = TreeSpec::new("bad", vec![a, b, inv], 2);
        assert!(matches!(res, Err(crate::Error::InvalidTree(_))));
    }

    #[test]
    fn test_shared_child_rejected() {
        let a = NodeSpec::new(NodeKind::Action, "a");
        let s1 = NodeSpec::new(NodeKind::Composite(CompositeKind::Sequence), "s1")
            .with_children(vec![0]);
        let root = NodeSpec::new(NodeKind::Composite(CompositeKind::Fallback), "root")
            .with_children(vec![0, 1]);
        // Node 0 has two parents.
        let res = TreeSpec::new("bad", vec![a, s1, root], 2);
        assert!(matches!(res, Err(crate::Error::InvalidTree(_))));
    }

    #[test]
    fn test_detached_cycle_rejected() {
        let root = NodeSpec::new(NodeKind::Action, "root");
        // Two decorators pointing at each other, unreachable from root.
        let d1 = NodeSpec::new(NodeKind::Decorator(DecoratorKind::Inverter), "d1")
            .with_children(vec![2]);
        let d2 = NodeSpec::new(NodeKind::Decorator(DecoratorKind::Inverter), "d2")
            .with_children(vec![1]);
        let res = TreeSpec::new("bad", vec![root, d1, d2], 0);
        assert!(matches!(res, Err(crate::Error::InvalidTree(_))));
    }

    #[test]
    fn test_parallel_thresholds() {
        let mut builder = TreeSpec::builder("par");
        let a = builder.action("a");
        let b = builder.action("b");
        let par = builder.composite(
            CompositeKind::Parallel {
                success_threshold: 3,
                failure_threshold: 1,
            },
            "par",
            vec![a, b],
        );
        assert!(builder.build(par).is_err());
    }
}
