// Copyright 2023 Behavior Tree Project Authors. Licensed under Apache-2.0.

pub mod codec;
mod mock_sim_client;
pub mod protocol;
mod sim_client_impl;

use std::{fmt::Display, time::Duration};

use async_trait::async_trait;
pub use mock_sim_client::MockSimClient;
pub use sim_client_impl::TcpSimClient;

use crate::errors::Result;

/// Handle naming one scene object inside the simulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectHandle(pub i32);

impl ObjectHandle {
    pub fn raw(&self) -> i32 {
        self.0
    }
}

impl Display for ObjectHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("#{}", self.0))
    }
}

/// One proximity sensor readout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProximityReading {
    pub detected: bool,
    /// Distance to the detected point in meters, 0.0 when nothing is
    /// detected.
    pub distance: f64,
}

/// Context for one request.
#[derive(Clone, Debug, Default)]
pub struct SimContext {
    pub timeout: Option<Duration>,
}

impl SimContext {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Client side of the simulator remote API.
#[async_trait]
pub trait SimClient: Send + Sync {
    async fn start_simulation(&self, ctx: &SimContext) -> Result<()>;
    async fn stop_simulation(&self, ctx: &SimContext) -> Result<()>;
    /// Advance one simulation step (synchronous mode).
    async fn step(&self, ctx: &SimContext) -> Result<()>;
    async fn object_handle(&self, ctx: &SimContext, name: &str) -> Result<ObjectHandle>;
    async fn joint_position(&self, ctx: &SimContext, handle: ObjectHandle) -> Result<f64>;
    async fn set_joint_target_position(
        &self,
        ctx: &SimContext,
        handle: ObjectHandle,
        position: f64,
    ) -> Result<()>;
    async fn set_joint_target_velocity(
        &self,
        ctx: &SimContext,
        handle: ObjectHandle,
        velocity: f64,
    ) -> Result<()>;
    async fn read_proximity_sensor(
        &self,
        ctx: &SimContext,
        handle: ObjectHandle,
    ) -> Result<ProximityReading>;
}
