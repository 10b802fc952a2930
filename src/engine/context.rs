// Copyright 2023 Behavior Tree Project Authors. Licensed under Apache-2.0.

use std::sync::Arc;

use crate::{
    errors::{Error, Result},
    model::Blackboard,
    sim_client::{SimClient, SimContext},
};

/// Context handed to every leaf on every tick.
///
/// Carries the run-wide blackboard, the simulator connection (if any)
/// and the index of the current root tick.
#[derive(Clone)]
pub struct TickContext {
    pub blackboard: Arc<Blackboard>,
    pub sim_ctx: SimContext,
    pub tick_index: u64,
    sim: Option<Arc<dyn SimClient>>,
}

impl TickContext {
    pub fn new() -> Self {
        Self {
            blackboard: Arc::new(Blackboard::new()),
            sim_ctx: SimContext::default(),
            tick_index: 0,
            sim: None,
        }
    }

    pub fn sim_client(mut self, sim: Arc<dyn SimClient>) -> Self {
        self.sim = Some(sim);
        self
    }

    pub fn sim_ctx(mut self, sim_ctx: SimContext) -> Self {
        self.sim_ctx = sim_ctx;
        self
    }

    /// The simulator connection, for leaves that need one.
    pub fn sim(&self) -> Result<&Arc<dyn SimClient>> {
        self.sim
            .as_ref()
            .ok_or_else(|| Error::Client("no sim client attached to this run".to_string()))
    }
}

impl Default for TickContext {
    fn default() -> Self {
        Self::new()
    }
}
