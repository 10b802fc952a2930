// Copyright 2023 Behavior Tree Project Authors. Licensed under Apache-2.0.

//! Tick semantics of the decorator nodes

use crate::{
    engine::{context::TickContext, runtime::RuntimeNode},
    errors::Result,
    model::{DecoratorKind, NodeStatus},
};

pub(crate) struct DecoratorState {
    pub(crate) kind: DecoratorKind,
    #[allow(dead_code)]
    pub(crate) name: String,
    pub(crate) child: Box<RuntimeNode>,
    pub(crate) status: NodeStatus,
    // Completed cycles (repeat) or failed attempts (retry), kept across
    // passes while the child is running.
    counter: usize,
}

impl DecoratorState {
    pub(crate) fn new(kind: DecoratorKind, name: String, child: RuntimeNode) -> Self {
        Self {
            kind,
            name,
            child: Box::new(child),
            status: NodeStatus::Idle,
            counter: 0,
        }
    }

    pub(crate) async fn tick(&mut self, ctx: &TickContext) -> Result<NodeStatus> {
        let status = match self.kind {
            DecoratorKind::Inverter => match self.child.tick(ctx).await? {
                NodeStatus::Success => NodeStatus::Failure,
                NodeStatus::Failure => NodeStatus::Success,
                other => other,
            },
            // Zero is treated as one, the child always gets its tick.
            DecoratorKind::Repeat { cycles } => self.tick_repeat(ctx, cycles.max(1)).await?,
            DecoratorKind::Retry { attempts } => self.tick_retry(ctx, attempts.max(1)).await?,
        };
        self.status = status;
        Ok(status)
    }

    /// Re-ticks a succeeding child within the same pass until the cycle
    /// budget is spent, failing fast on child failure.
    async fn tick_repeat(&mut self, ctx: &TickContext, cycles: usize) -> Result<NodeStatus> {
        loop {
            match self.child.tick(ctx).await? {
                NodeStatus::Success => {
                    self.counter += 1;
                    if self.counter >= cycles {
                        self.counter = 0;
                        return Ok(NodeStatus::Success);
                    }
                }
                NodeStatus::Running => return Ok(NodeStatus::Running),
                _ => {
                    self.counter = 0;
                    return Ok(NodeStatus::Failure);
                }
            }
        }
    }

    /// Mirror image of repeat: re-ticks a failing child, succeeding
    /// fast on child success.
    async fn tick_retry(&mut self, ctx: &TickContext, attempts: usize) -> Result<NodeStatus> {
        loop {
            match self.child.tick(ctx).await? {
                NodeStatus::Failure => {
                    self.counter += 1;
                    if self.counter >= attempts {
                        self.counter = 0;
                        return Ok(NodeStatus::Failure);
                    }
                }
                NodeStatus::Running => return Ok(NodeStatus::Running),
                _ => {
                    self.counter = 0;
                    return Ok(NodeStatus::Success);
                }
            }
        }
    }

    pub(crate) async fn halt(&mut self) {
        if self.child.status().is_running() {
            self.child.halt().await;
        }
        self.counter = 0;
        if self.status.is_running() {
            self.status = NodeStatus::Halted;
        }
    }
}
