// Copyright 2023 Behavior Tree Project Authors. Licensed under Apache-2.0.

use std::sync::Arc;

use log::debug;
use tokio::time::MissedTickBehavior;

use crate::{
    engine::{context::TickContext, leaf::LeafRegistry, runtime::RuntimeNode},
    errors::{Error, Result},
    model::{Blackboard, NodeStatus, TreeSpec},
    options::TickOptions,
};

/// Drives an instantiated tree with periodic root ticks.
///
/// One runner owns one run: the runtime tree, its context and the tick
/// bookkeeping. Build a new runner from the same spec for the next run.
pub struct TreeRunner {
    root: RuntimeNode,
    ctx: TickContext,
    opts: TickOptions,
    tree_name: String,
}

impl TreeRunner {
    pub fn new(
        spec: &TreeSpec,
        registry: &LeafRegistry,
        ctx: TickContext,
        opts: TickOptions,
    ) -> Result<Self> {
        let root = RuntimeNode::instantiate(spec, registry)?;
        Ok(Self {
            root,
            ctx,
            opts,
            tree_name: spec.name().to_string(),
        })
    }

    pub fn blackboard(&self) -> &Arc<Blackboard> {
        &self.ctx.blackboard
    }

    /// One root tick.
    ///
    /// A leaf error aborts the pass; the tree is halted before the
    /// error is handed back, so nothing keeps running behind it.
    pub async fn tick_once(&mut self) -> Result<NodeStatus> {
        self.ctx.tick_index += 1;
        let status = match self.root.tick(&self.ctx).await {
            Ok(status) => status,
            Err(e) => {
                self.root.halt().await;
                return Err(e);
            }
        };
        debug!(
            "tree:{} tick:{} -> {}",
            self.tree_name, self.ctx.tick_index, status
        );
        Ok(status)
    }

    /// Tick at the configured interval until the root settles.
    pub async fn run(&mut self) -> Result<NodeStatus> {
        let mut interval = tokio::time::interval(self.opts.tick_interval);
        // A slow pass should not be followed by a burst of catch-up
        // ticks.
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            interval.tick().await;
            let status = self.tick_once().await?;
            if status.is_terminal() {
                self.root.halt().await;
                return Ok(status);
            }

            if let Some(max) = self.opts.max_ticks {
                if self.ctx.tick_index >= max {
                    self.root.halt().await;
                    return Err(Error::Client(format!(
                        "tree:{} exceeded tick budget:{}",
                        self.tree_name, max
                    )));
                }
            }
        }
    }

    /// Preempt the whole tree.
    pub async fn halt(&mut self) {
        self.root.halt().await;
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::TreeRunner;
    use crate::{
        engine::{context::TickContext, leaf::LeafRegistry},
        errors::Error,
        model::{CompositeKind, NodeKind, NodeSpec, NodeStatus, TreeSpec},
        options::TickOptions,
    };

    fn fast_opts() -> TickOptions {
        TickOptions {
            tick_interval: Duration::from_millis(1),
            max_ticks: None,
        }
    }

    fn wait_spec(ms: &str) -> NodeSpec {
        NodeSpec::new(NodeKind::Action, "wait").with_param("duration_ms", ms)
    }

    #[tokio::test]
    async fn test_run_to_success() {
        let mut builder = TreeSpec::builder("boot");
        let ok = builder.action("always_success");
        let wait = builder.add(wait_spec("5"));
        let seq = builder.composite(CompositeKind::MemorySequence, "seq", vec![ok, wait]);
        let spec = builder.build(seq).unwrap();

        let registry = LeafRegistry::with_builtins();
        let mut runner =
            TreeRunner::new(&spec, &registry, TickContext::new(), fast_opts()).unwrap();

        assert_eq!(runner.run().await.unwrap(), NodeStatus::Success);
    }

    #[tokio::test]
    async fn test_tick_budget() {
        let mut builder = TreeSpec::builder("stuck");
        let wait = builder.add(wait_spec("60000"));
        let spec = builder.build(wait).unwrap();

        let registry = LeafRegistry::with_builtins();
        let opts = TickOptions {
            tick_interval: Duration::from_millis(1),
            max_ticks: Some(3),
        };
        let mut runner = TreeRunner::new(&spec, &registry, TickContext::new(), opts).unwrap();

        assert!(matches!(runner.run().await, Err(Error::Client(_))));
    }

    #[tokio::test]
    async fn test_unknown_leaf_name() {
        let mut builder = TreeSpec::builder("typo");
        let bad = builder.action("does_not_exist");
        let spec = builder.build(bad).unwrap();

        let registry = LeafRegistry::with_builtins();
        let res = TreeRunner::new(&spec, &registry, TickContext::new(), fast_opts());
        assert!(matches!(res, Err(Error::Client(_))));
    }

    #[tokio::test]
    async fn test_leaf_error_aborts_run() {
        let mut builder = TreeSpec::builder("broken");
        let boom = builder.action("boom");
        let wait = builder.add(wait_spec("60000"));
        let par = builder.composite(
            CompositeKind::Parallel {
                success_threshold: 2,
                failure_threshold: 2,
            },
            "par",
            vec![wait, boom],
        );
        let spec = builder.build(par).unwrap();

        let mut registry = LeafRegistry::with_builtins();
        registry.register_action("boom", |_| {
            struct Boom;
            #[async_trait::async_trait]
            impl crate::engine::ActionNode for Boom {
                async fn tick(
                    &mut self,
                    _ctx: &crate::engine::TickContext,
                ) -> crate::Result<NodeStatus> {
                    Err(Error::Unknown("boom".to_string()))
                }
            }
            Ok(Box::new(Boom))
        });

        let mut runner =
            TreeRunner::new(&spec, &registry, TickContext::new(), fast_opts()).unwrap();
        assert!(matches!(runner.run().await, Err(Error::Unknown(_))));
    }
}
