// Copyright 2023 Behavior Tree Project Authors. Licensed under Apache-2.0.

mod composite;
mod context;
mod decorator;
mod leaf;
mod runner;
mod runtime;

pub use context::TickContext;
pub use leaf::{ActionNode, ConditionNode, LeafRegistry, Wait};
pub use runner::TreeRunner;

#[cfg(test)]
pub(crate) mod test_support {
    use std::{
        collections::HashMap,
        sync::{
            atomic::{AtomicUsize, Ordering},
            Arc,
        },
    };

    use async_trait::async_trait;

    use crate::{
        engine::{
            composite::CompositeState,
            context::TickContext,
            leaf::ActionNode,
            runtime::{ActionState, RuntimeNode},
        },
        errors::Result,
        model::{CompositeKind, NodeStatus},
    };

    /// Shared counters observing one scripted leaf from the outside.
    #[derive(Clone, Default)]
    pub(crate) struct Probe {
        ticks: Arc<AtomicUsize>,
        halts: Arc<AtomicUsize>,
    }

    impl Probe {
        pub(crate) fn ticks(&self) -> usize {
            self.ticks.load(Ordering::Relaxed)
        }

        pub(crate) fn halts(&self) -> usize {
            self.halts.load(Ordering::Relaxed)
        }
    }

    pub(crate) struct Script {
        name: &'static str,
        statuses: Vec<NodeStatus>,
    }

    impl Script {
        /// A leaf that plays the given statuses in order, repeating the
        /// last one forever.
        pub(crate) fn statuses(name: &'static str, statuses: &[NodeStatus]) -> Self {
            Self {
                name,
                statuses: statuses.to_vec(),
            }
        }
    }

    struct ScriptedAction {
        statuses: Vec<NodeStatus>,
        cursor: usize,
        probe: Probe,
    }

    #[async_trait]
    impl ActionNode for ScriptedAction {
        async fn tick(&mut self, _ctx: &TickContext) -> Result<NodeStatus> {
            self.probe.ticks.fetch_add(1, Ordering::Relaxed);
            let idx = self.cursor.min(self.statuses.len() - 1);
            self.cursor += 1;
            Ok(self.statuses[idx])
        }

        async fn halt(&mut self) {
            self.probe.halts.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub(crate) fn scripted_child(script: Script) -> (RuntimeNode, Probe) {
        let probe = Probe::default();
        let node = RuntimeNode::Action(ActionState {
            name: script.name.to_string(),
            node: Box::new(ScriptedAction {
                statuses: script.statuses,
                cursor: 0,
                probe: probe.clone(),
            }),
            status: NodeStatus::Idle,
        });
        (node, probe)
    }

    pub(crate) fn scripted_tree(
        kind: CompositeKind,
        scripts: Vec<Script>,
    ) -> (RuntimeNode, HashMap<&'static str, Probe>) {
        let mut probes = HashMap::new();
        let mut children = Vec::new();
        for script in scripts {
            let name = script.name;
            let (child, probe) = scripted_child(script);
            children.push(child);
            probes.insert(name, probe);
        }

        let root = RuntimeNode::Composite(CompositeState::new(kind, "root".to_string(), children));
        (root, probes)
    }
}
