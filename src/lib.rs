// Copyright 2023 Behavior Tree Project Authors. Licensed under Apache-2.0.

pub mod editor;
pub mod engine;
pub mod errors;
mod handles;
pub mod model;
pub mod options;
pub mod sim_client;

pub use crate::{
    engine::{ActionNode, ConditionNode, LeafRegistry, TickContext, TreeRunner},
    errors::{Error, Result},
    handles::HandleCache,
    model::{NodeStatus, TreeSpec},
    options::{SimConfig, TickOptions},
    sim_client::{MockSimClient, ObjectHandle, SimClient, SimContext, TcpSimClient},
};
