// Copyright 2023 Behavior Tree Project Authors. Licensed under Apache-2.0.

//! Tick semantics of the composite nodes

use crate::{
    engine::{context::TickContext, runtime::RuntimeNode},
    errors::Result,
    model::{CompositeKind, NodeStatus},
};

pub(crate) struct CompositeState {
    pub(crate) kind: CompositeKind,
    #[allow(dead_code)]
    pub(crate) name: String,
    pub(crate) children: Vec<RuntimeNode>,
    pub(crate) status: NodeStatus,
    // Resume point of the memory composites.
    running_index: usize,
}

impl CompositeState {
    pub(crate) fn new(kind: CompositeKind, name: String, children: Vec<RuntimeNode>) -> Self {
        Self {
            kind,
            name,
            children,
            status: NodeStatus::Idle,
            running_index: 0,
        }
    }

    pub(crate) async fn tick(&mut self, ctx: &TickContext) -> Result<NodeStatus> {
        let status = match self.kind {
            CompositeKind::Sequence => self.tick_reactive(ctx, NodeStatus::Failure).await?,
            CompositeKind::Fallback => self.tick_reactive(ctx, NodeStatus::Success).await?,
            CompositeKind::MemorySequence => self.tick_memory(ctx, NodeStatus::Failure).await?,
            CompositeKind::MemoryFallback => self.tick_memory(ctx, NodeStatus::Success).await?,
            CompositeKind::Parallel {
                success_threshold,
                failure_threshold,
            } => {
                self.tick_parallel(ctx, success_threshold, failure_threshold)
                    .await?
            }
        };
        self.status = status;
        Ok(status)
    }

    /// Reactive sequence/fallback: children are ticked from the first
    /// one on every pass. `breaker` is the child status that decides
    /// the composite (`Failure` for sequences, `Success` for
    /// fallbacks); its opposite lets the pass continue.
    async fn tick_reactive(&mut self, ctx: &TickContext, breaker: NodeStatus) -> Result<NodeStatus> {
        let mut result = match breaker {
            NodeStatus::Failure => NodeStatus::Success,
            _ => NodeStatus::Failure,
        };
        // First index that was not reached this pass.
        let mut boundary = self.children.len();

        for (idx, child) in self.children.iter_mut().enumerate() {
            let status = child.tick(ctx).await?;
            if status == breaker || status == NodeStatus::Running {
                result = status;
                boundary = idx + 1;
                break;
            }
        }

        // Children past the break point may still be running from an
        // earlier pass where control reached further. Preempt them.
        for child in self.children[boundary..].iter_mut() {
            if child.status().is_running() {
                child.halt().await;
            }
        }

        Ok(result)
    }

    /// Memory sequence/fallback: resumes at the child that kept it
    /// running and resets on any terminal outcome.
    async fn tick_memory(&mut self, ctx: &TickContext, breaker: NodeStatus) -> Result<NodeStatus> {
        while self.running_index < self.children.len() {
            let status = self.children[self.running_index].tick(ctx).await?;
            match status {
                NodeStatus::Running => return Ok(NodeStatus::Running),
                s if s == breaker => {
                    self.running_index = 0;
                    return Ok(breaker);
                }
                _ => self.running_index += 1,
            }
        }

        self.running_index = 0;
        match breaker {
            NodeStatus::Failure => Ok(NodeStatus::Success),
            _ => Ok(NodeStatus::Failure),
        }
    }

    /// Parallel: every child is ticked on every pass, the outcomes of
    /// the current pass are counted against the thresholds. Success is
    /// checked first when both cross in one pass.
    async fn tick_parallel(
        &mut self,
        ctx: &TickContext,
        success_threshold: usize,
        failure_threshold: usize,
    ) -> Result<NodeStatus> {
        let mut successes = 0;
        let mut failures = 0;

        for child in self.children.iter_mut() {
            match child.tick(ctx).await? {
                NodeStatus::Success => successes += 1,
                NodeStatus::Failure => failures += 1,
                _ => {}
            }
        }

        let outcome = if successes >= success_threshold {
            NodeStatus::Success
        } else if failures >= failure_threshold {
            NodeStatus::Failure
        } else {
            return Ok(NodeStatus::Running);
        };

        for child in self.children.iter_mut() {
            if child.status().is_running() {
                child.halt().await;
            }
        }

        Ok(outcome)
    }

    pub(crate) async fn halt(&mut self) {
        for child in self.children.iter_mut() {
            if child.status().is_running() {
                child.halt().await;
            }
        }
        self.running_index = 0;
        if self.status.is_running() {
            self.status = NodeStatus::Halted;
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        engine::{
            context::TickContext,
            runtime::RuntimeNode,
            test_support::{scripted_tree, Script},
        },
        model::{CompositeKind, NodeStatus},
    };

    #[tokio::test]
    async fn test_sequence_fails_fast() {
        let (mut tree, probes) = scripted_tree(
            CompositeKind::Sequence,
            vec![
                Script::statuses("a", &[NodeStatus::Failure]),
                Script::statuses("b", &[NodeStatus::Success]),
            ],
        );
        let ctx = TickContext::new();

        assert_eq!(tree.tick(&ctx).await.unwrap(), NodeStatus::Failure);
        assert_eq!(probes["a"].ticks(), 1);
        // Short-circuited before b.
        assert_eq!(probes["b"].ticks(), 0);
    }

    #[tokio::test]
    async fn test_sequence_halts_preempted_child() {
        let (mut tree, probes) = scripted_tree(
            CompositeKind::Sequence,
            vec![
                Script::statuses("a", &[NodeStatus::Success, NodeStatus::Failure]),
                Script::statuses("b", &[NodeStatus::Running, NodeStatus::Running]),
            ],
        );
        let ctx = TickContext::new();

        assert_eq!(tree.tick(&ctx).await.unwrap(), NodeStatus::Running);
        assert_eq!(probes["b"].ticks(), 1);

        // a now fails, the running b must be preempted.
        assert_eq!(tree.tick(&ctx).await.unwrap(), NodeStatus::Failure);
        assert_eq!(probes["b"].ticks(), 1);
        assert_eq!(probes["b"].halts(), 1);
    }

    #[tokio::test]
    async fn test_memory_sequence_resumes() {
        let (mut tree, probes) = scripted_tree(
            CompositeKind::MemorySequence,
            vec![
                Script::statuses("a", &[NodeStatus::Success]),
                Script::statuses("b", &[NodeStatus::Running, NodeStatus::Success]),
            ],
        );
        let ctx = TickContext::new();

        assert_eq!(tree.tick(&ctx).await.unwrap(), NodeStatus::Running);
        assert_eq!(tree.tick(&ctx).await.unwrap(), NodeStatus::Success);
        // a was not re-ticked on the second pass.
        assert_eq!(probes["a"].ticks(), 1);
        assert_eq!(probes["b"].ticks(), 2);
    }

    #[tokio::test]
    async fn test_fallback_tries_next_child() {
        let (mut tree, probes) = scripted_tree(
            CompositeKind::Fallback,
            vec![
                Script::statuses("a", &[NodeStatus::Failure]),
                Script::statuses("b", &[NodeStatus::Success]),
            ],
        );
        let ctx = TickContext::new();

        assert_eq!(tree.tick(&ctx).await.unwrap(), NodeStatus::Success);
        assert_eq!(probes["a"].ticks(), 1);
        assert_eq!(probes["b"].ticks(), 1);
    }

    #[tokio::test]
    async fn test_parallel_success_threshold() {
        let (mut tree, probes) = scripted_tree(
            CompositeKind::Parallel {
                success_threshold: 2,
                failure_threshold: 3,
            },
            vec![
                Script::statuses("a", &[NodeStatus::Success, NodeStatus::Success]),
                Script::statuses("b", &[NodeStatus::Running, NodeStatus::Success]),
                Script::statuses("c", &[NodeStatus::Running, NodeStatus::Running]),
            ],
        );
        let ctx = TickContext::new();

        assert_eq!(tree.tick(&ctx).await.unwrap(), NodeStatus::Running);
        assert_eq!(tree.tick(&ctx).await.unwrap(), NodeStatus::Success);
        // The still-running child was preempted on the deciding pass.
        assert_eq!(probes["c"].halts(), 1);
    }

    #[tokio::test]
    async fn test_parallel_failure_threshold() {
        let (mut tree, probes) = scripted_tree(
            CompositeKind::Parallel {
                success_threshold: 2,
                failure_threshold: 1,
            },
            vec![
                Script::statuses("a", &[NodeStatus::Failure]),
                Script::statuses("b", &[NodeStatus::Running]),
            ],
        );
        let ctx = TickContext::new();

        assert_eq!(tree.tick(&ctx).await.unwrap(), NodeStatus::Failure);
        assert_eq!(probes["b"].halts(), 1);
    }

    #[tokio::test]
    async fn test_halt_is_recursive() {
        let (mut tree, probes) = scripted_tree(
            CompositeKind::Sequence,
            vec![Script::statuses("a", &[NodeStatus::Running])],
        );
        let ctx = TickContext::new();

        assert_eq!(tree.tick(&ctx).await.unwrap(), NodeStatus::Running);
        tree.halt().await;
        assert_eq!(probes["a"].halts(), 1);
        assert_eq!(tree.status(), NodeStatus::Halted);

        // Halting an already halted tree is a no-op.
        tree.halt().await;
        assert_eq!(probes["a"].halts(), 1);
    }

    #[tokio::test]
    async fn test_reactive_sequence_restarts_from_first() {
        let (mut tree, probes) = scripted_tree(
            CompositeKind::Sequence,
            vec![
                Script::statuses("a", &[NodeStatus::Success, NodeStatus::Success]),
                Script::statuses("b", &[NodeStatus::Running, NodeStatus::Success]),
            ],
        );
        let ctx = TickContext::new();

        assert_eq!(tree.tick(&ctx).await.unwrap(), NodeStatus::Running);
        assert_eq!(tree.tick(&ctx).await.unwrap(), NodeStatus::Success);
        // Unlike the memory variant, a is re-checked on every pass.
        assert_eq!(probes["a"].ticks(), 2);
    }

    #[test]
    fn test_scripted_tree_shape() {
        let (tree, _) = scripted_tree(
            CompositeKind::Sequence,
            vec![Script::statuses("only", &[NodeStatus::Success])],
        );
        match tree {
            RuntimeNode::Composite(ref c) => assert_eq!(c.children.len(), 1),
            _ => panic!("expected composite root"),
        }
    }
}
