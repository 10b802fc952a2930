// Copyright 2023 Behavior Tree Project Authors. Licensed under Apache-2.0.

use std::fmt::Display;

/// Commands understood by the remote simulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimCommand {
    StartSimulation,
    StopSimulation,
    /// Advance one step while the simulator runs in synchronous mode.
    Step,
    GetObjectHandle,
    GetJointPosition,
    SetJointTargetPosition,
    SetJointTargetVelocity,
    ReadProximitySensor,
}

impl SimCommand {
    pub fn as_u32(&self) -> u32 {
        match self {
            SimCommand::StartSimulation => 1,
            SimCommand::StopSimulation => 2,
            SimCommand::Step => 3,
            SimCommand::GetObjectHandle => 16,
            SimCommand::GetJointPosition => 17,
            SimCommand::SetJointTargetPosition => 18,
            SimCommand::SetJointTargetVelocity => 19,
            SimCommand::ReadProximitySensor => 20,
        }
    }

    pub fn from_u32(v: u32) -> Option<Self> {
        let cmd = match v {
            1 => SimCommand::StartSimulation,
            2 => SimCommand::StopSimulation,
            3 => SimCommand::Step,
            16 => SimCommand::GetObjectHandle,
            17 => SimCommand::GetJointPosition,
            18 => SimCommand::SetJointTargetPosition,
            19 => SimCommand::SetJointTargetVelocity,
            20 => SimCommand::ReadProximitySensor,
            _ => return None,
        };
        Some(cmd)
    }
}

/// Status carried in the header of a response frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteStatus {
    Ok,
    UnknownObject,
    SimulationNotRunning,
    IllegalCommand,
    InternalError,
}

impl RemoteStatus {
    pub fn as_u32(&self) -> u32 {
        match self {
            RemoteStatus::Ok => 0,
            RemoteStatus::UnknownObject => 1,
            RemoteStatus::SimulationNotRunning => 2,
            RemoteStatus::IllegalCommand => 3,
            RemoteStatus::InternalError => 4,
        }
    }

    pub fn from_u32(v: u32) -> Option<Self> {
        let status = match v {
            0 => RemoteStatus::Ok,
            1 => RemoteStatus::UnknownObject,
            2 => RemoteStatus::SimulationNotRunning,
            3 => RemoteStatus::IllegalCommand,
            4 => RemoteStatus::InternalError,
            _ => return None,
        };
        Some(status)
    }

    #[inline]
    pub fn is_ok(&self) -> bool {
        matches!(self, RemoteStatus::Ok)
    }
}

impl Display for RemoteStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RemoteStatus::Ok => "ok",
            RemoteStatus::UnknownObject => "unknown object",
            RemoteStatus::SimulationNotRunning => "simulation not running",
            RemoteStatus::IllegalCommand => "illegal command",
            RemoteStatus::InternalError => "internal simulator error",
        };
        f.write_str(s)
    }
}
