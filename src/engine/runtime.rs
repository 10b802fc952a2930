// Copyright 2023 Behavior Tree Project Authors. Licensed under Apache-2.0.

//! Instantiated trees and tick dispatch

use futures::{future::BoxFuture, FutureExt};

use crate::{
    engine::{
        composite::CompositeState,
        context::TickContext,
        decorator::DecoratorState,
        leaf::{ActionNode, ConditionNode, LeafRegistry},
    },
    errors::{Error, Result},
    model::{NodeKind, NodeStatus, TreeSpec},
};

/// One node of an instantiated tree.
///
/// Composites and decorators own their child runtime nodes, leaves own
/// the boxed user implementation. The stored status is what the node
/// reported last, it drives halting decisions.
pub(crate) enum RuntimeNode {
    Composite(CompositeState),
    Decorator(DecoratorState),
    Action(ActionState),
    Condition(ConditionState),
}

impl RuntimeNode {
    /// Instantiate the whole spec against a registry.
    pub(crate) fn instantiate(spec: &TreeSpec, registry: &LeafRegistry) -> Result<Self> {
        Self::instantiate_node(spec, spec.root(), registry)
    }

    fn instantiate_node(spec: &TreeSpec, id: usize, registry: &LeafRegistry) -> Result<Self> {
        let node = spec.node(id);
        let runtime = match &node.kind {
            NodeKind::Composite(kind) => {
                let children = node
                    .children
                    .iter()
                    .map(|child| Self::instantiate_node(spec, *child, registry))
                    .collect::<Result<Vec<_>>>()?;
                RuntimeNode::Composite(CompositeState::new(*kind, node.name.clone(), children))
            }
            NodeKind::Decorator(kind) => {
                let child = Self::instantiate_node(spec, node.children[0], registry)?;
                RuntimeNode::Decorator(DecoratorState::new(*kind, node.name.clone(), child))
            }
            NodeKind::Action => RuntimeNode::Action(ActionState {
                name: node.name.clone(),
                node: registry.create_action(node)?,
                status: NodeStatus::Idle,
            }),
            NodeKind::Condition => RuntimeNode::Condition(ConditionState {
                name: node.name.clone(),
                node: registry.create_condition(node)?,
                status: NodeStatus::Idle,
            }),
        };
        Ok(runtime)
    }

    pub(crate) fn status(&self) -> NodeStatus {
        match self {
            RuntimeNode::Composite(c) => c.status,
            RuntimeNode::Decorator(d) => d.status,
            RuntimeNode::Action(a) => a.status,
            RuntimeNode::Condition(c) => c.status,
        }
    }

    pub(crate) fn tick<'a>(&'a mut self, ctx: &'a TickContext) -> BoxFuture<'a, Result<NodeStatus>> {
        async move {
            match self {
                RuntimeNode::Composite(c) => c.tick(ctx).await,
                RuntimeNode::Decorator(d) => d.tick(ctx).await,
                RuntimeNode::Action(a) => a.tick(ctx).await,
                RuntimeNode::Condition(c) => c.tick(ctx).await,
            }
        }
        .boxed()
    }

    /// Preempt this subtree. Nodes that are not running are left alone.
    pub(crate) fn halt(&mut self) -> BoxFuture<'_, ()> {
        async move {
            match self {
                RuntimeNode::Composite(c) => c.halt().await,
                RuntimeNode::Decorator(d) => d.halt().await,
                RuntimeNode::Action(a) => a.halt().await,
                // Conditions answer within one tick, there is nothing
                // to preempt.
                RuntimeNode::Condition(_) => {}
            }
        }
        .boxed()
    }
}

pub(crate) struct ActionState {
    pub(crate) name: String,
    pub(crate) node: Box<dyn ActionNode>,
    pub(crate) status: NodeStatus,
}

impl ActionState {
    pub(crate) async fn tick(&mut self, ctx: &TickContext) -> Result<NodeStatus> {
        let status = self.node.tick(ctx).await?;
        if !matches!(
            status,
            NodeStatus::Running | NodeStatus::Success | NodeStatus::Failure
        ) {
            return Err(Error::Client(format!(
                "action {} returned {} from tick",
                self.name, status
            )));
        }
        self.status = status;
        Ok(status)
    }

    pub(crate) async fn halt(&mut self) {
        if self.status.is_running() {
            self.node.halt().await;
            self.status = NodeStatus::Halted;
        }
    }
}

pub(crate) struct ConditionState {
    #[allow(dead_code)]
    pub(crate) name: String,
    pub(crate) node: Box<dyn ConditionNode>,
    pub(crate) status: NodeStatus,
}

impl ConditionState {
    pub(crate) async fn tick(&mut self, ctx: &TickContext) -> Result<NodeStatus> {
        let status = if self.node.check(ctx).await? {
            NodeStatus::Success
        } else {
            NodeStatus::Failure
        };
        self.status = status;
        Ok(status)
    }
}
