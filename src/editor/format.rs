// Copyright 2023 Behavior Tree Project Authors. Licensed under Apache-2.0.

//! The tree file format and its conversions

use std::{collections::BTreeMap, fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::{
    errors::{Error, Result},
    model::{CompositeKind, DecoratorKind, NodeKind, NodeSpec, TreeSpec},
};

/// Serialized form of a tree document.
#[derive(Debug, Serialize, Deserialize)]
struct TreeFile {
    name: String,
    root: usize,
    nodes: Vec<NodeEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
struct NodeEntry {
    id: usize,
    #[serde(flatten)]
    kind: KindEntry,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    children: Vec<usize>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    params: BTreeMap<String, String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum KindEntry {
    Sequence,
    MemorySequence,
    Fallback,
    MemoryFallback,
    Parallel {
        success_threshold: usize,
        failure_threshold: usize,
    },
    Inverter,
    Repeat {
        cycles: usize,
    },
    Retry {
        attempts: usize,
    },
    Action,
    Condition,
}

impl KindEntry {
    fn into_kind(self) -> NodeKind {
        match self {
            KindEntry::Sequence => NodeKind::Composite(CompositeKind::Sequence),
            KindEntry::MemorySequence => NodeKind::Composite(CompositeKind::MemorySequence),
            KindEntry::Fallback => NodeKind::Composite(CompositeKind::Fallback),
            KindEntry::MemoryFallback => NodeKind::Composite(CompositeKind::MemoryFallback),
            KindEntry::Parallel {
                success_threshold,
                failure_threshold,
            } => NodeKind::Composite(CompositeKind::Parallel {
                success_threshold,
                failure_threshold,
            }),
            KindEntry::Inverter => NodeKind::Decorator(DecoratorKind::Inverter),
            KindEntry::Repeat { cycles } => NodeKind::Decorator(DecoratorKind::Repeat { cycles }),
            KindEntry::Retry { attempts } => {
                NodeKind::Decorator(DecoratorKind::Retry { attempts })
            }
            KindEntry::Action => NodeKind::Action,
            KindEntry::Condition => NodeKind::Condition,
        }
    }

    fn from_kind(kind: &NodeKind) -> Self {
        match kind {
            NodeKind::Composite(CompositeKind::Sequence) => KindEntry::Sequence,
            NodeKind::Composite(CompositeKind::MemorySequence) => KindEntry::MemorySequence,
            NodeKind::Composite(CompositeKind::Fallback) => KindEntry::Fallback,
            NodeKind::Composite(CompositeKind::MemoryFallback) => KindEntry::MemoryFallback,
            NodeKind::Composite(CompositeKind::Parallel {
                success_threshold,
                failure_threshold,
            }) => KindEntry::Parallel {
                success_threshold: *success_threshold,
                failure_threshold: *failure_threshold,
            },
            NodeKind::Decorator(DecoratorKind::Inverter) => KindEntry::Inverter,
            NodeKind::Decorator(DecoratorKind::Repeat { cycles }) => {
                KindEntry::Repeat { cycles: *cycles }
            }
            NodeKind::Decorator(DecoratorKind::Retry { attempts }) => {
                KindEntry::Retry {
                    attempts: *attempts,
                }
            }
            NodeKind::Action => KindEntry::Action,
            NodeKind::Condition => KindEntry::Condition,
        }
    }

    /// Display label used when a control node carries no name of its
    /// own.
    fn default_name(&self) -> &'static str {
        match self {
            KindEntry::Sequence => "sequence",
            KindEntry::MemorySequence => "memory_sequence",
            KindEntry::Fallback => "fallback",
            KindEntry::MemoryFallback => "memory_fallback",
            KindEntry::Parallel { .. } => "parallel",
            KindEntry::Inverter => "inverter",
            KindEntry::Repeat { .. } => "repeat",
            KindEntry::Retry { .. } => "retry",
            KindEntry::Action => "action",
            KindEntry::Condition => "condition",
        }
    }
}

/// Parse a tree document, validating the structure.
pub fn parse_tree(raw: &str) -> Result<TreeSpec> {
    let file: TreeFile = serde_json::from_str(raw)?;

    let mut slots: Vec<Option<NodeSpec>> = Vec::new();
    slots.resize_with(file.nodes.len(), || None);

    for entry in file.nodes {
        if entry.id >= slots.len() {
            return Err(Error::InvalidTree(format!(
                "node id:{} out of range (len:{})",
                entry.id,
                slots.len()
            )));
        }
        if slots[entry.id].is_some() {
            return Err(Error::InvalidTree(format!("duplicate node id:{}", entry.id)));
        }

        let is_leaf = matches!(entry.kind, KindEntry::Action | KindEntry::Condition);
        let name = match entry.name {
            Some(name) => name,
            // Leaves need a name, it selects the implementation.
            None if is_leaf => {
                return Err(Error::InvalidTree(format!(
                    "leaf node id:{} has no name",
                    entry.id
                )))
            }
            None => entry.kind.default_name().to_string(),
        };

        let id = entry.id;
        let mut spec = NodeSpec::new(entry.kind.into_kind(), name).with_children(entry.children);
        spec.params = entry.params;
        slots[id] = Some(spec);
    }

    // resize_with filled every slot, a None here means a gap in the ids.
    let nodes = slots
        .into_iter()
        .enumerate()
        .map(|(id, slot)| slot.ok_or_else(|| Error::InvalidTree(format!("missing node id:{}", id))))
        .collect::<Result<Vec<_>>>()?;

    TreeSpec::new(file.name, nodes, file.root)
}

/// Render a spec back into the document form.
pub fn render_tree(spec: &TreeSpec) -> Result<String> {
    let nodes = spec
        .nodes()
        .iter()
        .enumerate()
        .map(|(id, node)| NodeEntry {
            id,
            kind: KindEntry::from_kind(&node.kind),
            name: Some(node.name.clone()),
            children: node.children.clone(),
            params: node.params.clone(),
        })
        .collect();

    let file = TreeFile {
        name: spec.name().to_string(),
        root: spec.root(),
        nodes,
    };
    Ok(serde_json::to_string_pretty(&file)?)
}

pub fn load_tree(path: impl AsRef<Path>) -> Result<TreeSpec> {
    let raw = fs::read_to_string(path)?;
    parse_tree(&raw)
}

pub fn save_tree(spec: &TreeSpec, path: impl AsRef<Path>) -> Result<()> {
    let raw = render_tree(spec)?;
    fs::write(path, raw)?;
    Ok(())
}
