// Copyright 2023 Behavior Tree Project Authors. Licensed under Apache-2.0.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use behavior_tree::{
    editor, ActionNode, ConditionNode, Error, LeafRegistry, MockSimClient, NodeStatus,
    ObjectHandle, SimClient, SimContext, TickContext, TickOptions, TreeRunner,
};

const TREE: &str = r#"{
    "name": "wave",
    "root": 3,
    "nodes": [
        { "id": 0, "kind": "condition", "name": "path_clear",
          "params": { "sensor": "front_sensor" } },
        { "id": 1, "kind": "action", "name": "move_joint",
          "params": { "joint": "shoulder_joint", "target_rad": "1.57" } },
        { "id": 2, "kind": "action", "name": "move_joint",
          "params": { "joint": "shoulder_joint", "target_rad": "0.0" } },
        { "id": 3, "kind": "memory_sequence", "name": "wave_once",
          "children": [0, 1, 2] }
    ]
}"#;

/// Commands a joint towards a target and succeeds once it arrives.
struct MoveJoint {
    joint: String,
    target: f64,
    handle: Option<ObjectHandle>,
}

#[async_trait]
impl ActionNode for MoveJoint {
    async fn tick(&mut self, ctx: &TickContext) -> behavior_tree::Result<NodeStatus> {
        let sim = ctx.sim()?;
        let handle = match self.handle {
            Some(handle) => handle,
            None => {
                let handle = sim.object_handle(&ctx.sim_ctx, &self.joint).await?;
                self.handle = Some(handle);
                handle
            }
        };

        sim.set_joint_target_position(&ctx.sim_ctx, handle, self.target)
            .await?;
        let position = sim.joint_position(&ctx.sim_ctx, handle).await?;
        if (position - self.target).abs() < 1e-3 {
            Ok(NodeStatus::Success)
        } else {
            Ok(NodeStatus::Running)
        }
    }
}

struct PathClear {
    sensor: String,
    handle: Option<ObjectHandle>,
}

#[async_trait]
impl ConditionNode for PathClear {
    async fn check(&mut self, ctx: &TickContext) -> behavior_tree::Result<bool> {
        let sim = ctx.sim()?;
        let handle = match self.handle {
            Some(handle) => handle,
            None => {
                let handle = sim.object_handle(&ctx.sim_ctx, &self.sensor).await?;
                self.handle = Some(handle);
                handle
            }
        };

        let reading = sim.read_proximity_sensor(&ctx.sim_ctx, handle).await?;
        Ok(!reading.detected)
    }
}

fn param(spec: &behavior_tree::model::NodeSpec, key: &str) -> behavior_tree::Result<String> {
    spec.params
        .get(key)
        .cloned()
        .ok_or_else(|| Error::Client(format!("{} needs a {} param", spec.name, key)))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    // A mock scene with one joint and one proximity sensor.
    let sim = Arc::new(MockSimClient::new());
    sim.handle_table
        .insert("shoulder_joint".to_string(), ObjectHandle(7));
    sim.joint_positions.insert(7, 0.0);
    sim.handle_table
        .insert("front_sensor".to_string(), ObjectHandle(3));

    let mut registry = LeafRegistry::with_builtins();
    registry.register_action("move_joint", |spec| {
        let joint = param(spec, "joint")?;
        let raw = param(spec, "target_rad")?;
        let target: f64 = raw
            .parse()
            .map_err(|e| Error::Client(format!("bad target_rad:{}, err:{}", raw, e)))?;
        Ok(Box::new(MoveJoint {
            joint,
            target,
            handle: None,
        }))
    });
    registry.register_condition("path_clear", |spec| {
        Ok(Box::new(PathClear {
            sensor: param(spec, "sensor")?,
            handle: None,
        }))
    });

    let spec = editor::parse_tree(TREE)?;
    for layout in editor::layout_tree(&spec) {
        println!(
            "{:<16} at ({:.2}, {:.0})",
            spec.node(layout.id).name,
            layout.x,
            layout.y
        );
    }

    let sim_ctx = SimContext::default();
    sim.start_simulation(&sim_ctx).await?;

    let ctx = TickContext::new().sim_client(sim.clone());
    let opts = TickOptions {
        tick_interval: Duration::from_millis(10),
        max_ticks: Some(500),
    };
    let mut runner = TreeRunner::new(&spec, &registry, ctx, opts)?;
    let outcome = runner.run().await?;
    println!("tree finished with {}", outcome);

    sim.stop_simulation(&sim_ctx).await?;
    Ok(())
}
