// Copyright 2023 Behavior Tree Project Authors. Licensed under Apache-2.0.

use std::sync::{
    atomic::{AtomicBool, AtomicU64, Ordering},
    Arc,
};

use async_trait::async_trait;
use dashmap::DashMap;

use super::{protocol::RemoteStatus, ObjectHandle, ProximityReading, SimClient, SimContext};
use crate::errors::{Error, RemoteError, Result};

/// Sim client used for testing.
///
/// Scene state lives in shared tables so a test can mutate the "scene"
/// while a tree is running against it.
#[derive(Default)]
pub struct MockSimClient {
    pub handle_table: Arc<DashMap<String, ObjectHandle>>,
    pub joint_positions: Arc<DashMap<i32, f64>>,
    pub joint_velocities: Arc<DashMap<i32, f64>>,
    pub proximity_table: Arc<DashMap<i32, ProximityReading>>,
    running: AtomicBool,
    steps: AtomicU64,
}

impl MockSimClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Number of synchronous steps taken since start.
    pub fn steps(&self) -> u64 {
        self.steps.load(Ordering::Relaxed)
    }
}

fn remote_err(status: RemoteStatus) -> Error {
    Error::Remote(RemoteError {
        code: status.as_u32(),
        msg: status.to_string(),
    })
}

#[async_trait]
impl SimClient for MockSimClient {
    async fn start_simulation(&self, _ctx: &SimContext) -> Result<()> {
        self.running.store(true, Ordering::Relaxed);
        Ok(())
    }

    async fn stop_simulation(&self, _ctx: &SimContext) -> Result<()> {
        self.running.store(false, Ordering::Relaxed);
        Ok(())
    }

    async fn step(&self, _ctx: &SimContext) -> Result<()> {
        if !self.is_running() {
            return Err(remote_err(RemoteStatus::SimulationNotRunning));
        }
        self.steps.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    async fn object_handle(&self, _ctx: &SimContext, name: &str) -> Result<ObjectHandle> {
        match self.handle_table.get(name) {
            Some(pair) => Ok(*pair.value()),
            None => Err(remote_err(RemoteStatus::UnknownObject)),
        }
    }

    async fn joint_position(&self, _ctx: &SimContext, handle: ObjectHandle) -> Result<f64> {
        match self.joint_positions.get(&handle.raw()) {
            Some(pair) => Ok(*pair.value()),
            None => Err(remote_err(RemoteStatus::UnknownObject)),
        }
    }

    async fn set_joint_target_position(
        &self,
        _ctx: &SimContext,
        handle: ObjectHandle,
        position: f64,
    ) -> Result<()> {
        // The mock scene reaches its target instantly.
        let _ = self.joint_positions.insert(handle.raw(), position);
        Ok(())
    }

    async fn set_joint_target_velocity(
        &self,
        _ctx: &SimContext,
        handle: ObjectHandle,
        velocity: f64,
    ) -> Result<()> {
        let _ = self.joint_velocities.insert(handle.raw(), velocity);
        Ok(())
    }

    async fn read_proximity_sensor(
        &self,
        _ctx: &SimContext,
        handle: ObjectHandle,
    ) -> Result<ProximityReading> {
        // An unconfigured sensor reads as "nothing detected".
        let reading = self
            .proximity_table
            .get(&handle.raw())
            .map(|pair| *pair.value())
            .unwrap_or(ProximityReading {
                detected: false,
                distance: 0.0,
            });
        Ok(reading)
    }
}
