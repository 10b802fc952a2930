// Copyright 2023 Behavior Tree Project Authors. Licensed under Apache-2.0.

//! Leaf traits, the registry and the builtin leaves

use std::{
    collections::HashMap,
    time::{Duration, Instant},
};

use async_trait::async_trait;

use crate::{
    engine::context::TickContext,
    errors::{Error, Result},
    model::{NodeSpec, NodeStatus},
};

/// An executable leaf. Long operations return `Running` and make
/// progress across ticks; `halt` is the preemption hook.
#[async_trait]
pub trait ActionNode: Send {
    async fn tick(&mut self, ctx: &TickContext) -> Result<NodeStatus>;

    async fn halt(&mut self) {}
}

/// An instantaneous check.
#[async_trait]
pub trait ConditionNode: Send {
    async fn check(&mut self, ctx: &TickContext) -> Result<bool>;
}

pub type ActionFactory = Box<dyn Fn(&NodeSpec) -> Result<Box<dyn ActionNode>> + Send + Sync>;
pub type ConditionFactory = Box<dyn Fn(&NodeSpec) -> Result<Box<dyn ConditionNode>> + Send + Sync>;

/// Maps leaf names in a [`TreeSpec`] to implementations.
///
/// [`TreeSpec`]: crate::model::TreeSpec
#[derive(Default)]
pub struct LeafRegistry {
    actions: HashMap<String, ActionFactory>,
    conditions: HashMap<String, ConditionFactory>,
}

impl LeafRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry preloaded with the builtin leaves: `wait`,
    /// `always_success` and `always_failure`.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register_action("wait", |spec| Ok(Box::new(Wait::from_spec(spec)?)));
        registry.register_action("always_success", |_| {
            Ok(Box::new(Fixed(NodeStatus::Success)))
        });
        registry.register_action("always_failure", |_| {
            Ok(Box::new(Fixed(NodeStatus::Failure)))
        });
        registry
    }

    pub fn register_action<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn(&NodeSpec) -> Result<Box<dyn ActionNode>> + Send + Sync + 'static,
    {
        let _ = self.actions.insert(name.into(), Box::new(factory));
    }

    pub fn register_condition<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn(&NodeSpec) -> Result<Box<dyn ConditionNode>> + Send + Sync + 'static,
    {
        let _ = self.conditions.insert(name.into(), Box::new(factory));
    }

    pub(crate) fn create_action(&self, spec: &NodeSpec) -> Result<Box<dyn ActionNode>> {
        let factory = self
            .actions
            .get(&spec.name)
            .ok_or_else(|| Error::Client(format!("no action registered for name:{}", spec.name)))?;
        factory(spec)
    }

    pub(crate) fn create_condition(&self, spec: &NodeSpec) -> Result<Box<dyn ConditionNode>> {
        let factory = self.conditions.get(&spec.name).ok_or_else(|| {
            Error::Client(format!("no condition registered for name:{}", spec.name))
        })?;
        factory(spec)
    }
}

/// Builtin action, succeeds once the configured duration has elapsed.
pub struct Wait {
    duration: Duration,
    deadline: Option<Instant>,
}

impl Wait {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            deadline: None,
        }
    }

    fn from_spec(spec: &NodeSpec) -> Result<Self> {
        let raw = spec
            .params
            .get("duration_ms")
            .ok_or_else(|| Error::Client("wait needs a duration_ms param".to_string()))?;
        let ms: u64 = raw
            .parse()
            .map_err(|e| Error::Client(format!("bad duration_ms:{}, err:{}", raw, e)))?;
        Ok(Self::new(Duration::from_millis(ms)))
    }
}

#[async_trait]
impl ActionNode for Wait {
    async fn tick(&mut self, _ctx: &TickContext) -> Result<NodeStatus> {
        let now = Instant::now();
        let deadline = *self.deadline.get_or_insert(now + self.duration);
        if now >= deadline {
            self.deadline = None;
            Ok(NodeStatus::Success)
        } else {
            Ok(NodeStatus::Running)
        }
    }

    async fn halt(&mut self) {
        self.deadline = None;
    }
}

/// Builtin action with a fixed outcome, mostly useful in tests and as a
/// placeholder while authoring trees.
struct Fixed(NodeStatus);

#[async_trait]
impl ActionNode for Fixed {
    async fn tick(&mut self, _ctx: &TickContext) -> Result<NodeStatus> {
        Ok(self.0)
    }
}
