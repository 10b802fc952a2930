// Copyright 2023 Behavior Tree Project Authors. Licensed under Apache-2.0.

//! Tree geometry for rendering

use crate::model::{NodeId, TreeSpec};

/// Placement of one node on the drawing plane.
///
/// `y` is the depth row, `x` counts leaf slots from the left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeLayout {
    pub id: NodeId,
    pub x: f32,
    pub y: f32,
}

/// Compute a deterministic layout for a valid spec.
///
/// Leaves are placed on consecutive x slots in left-to-right order,
/// every parent is centered over its children and sits one row above
/// them. The result is indexed by node id.
pub fn layout_tree(spec: &TreeSpec) -> Vec<NodeLayout> {
    let mut layouts = vec![
        NodeLayout {
            id: 0,
            x: 0.0,
            y: 0.0
        };
        spec.len()
    ];
    for (id, layout) in layouts.iter_mut().enumerate() {
        layout.id = id;
    }

    let mut next_leaf_x = 0.0f32;
    place(spec, spec.root(), 0, &mut next_leaf_x, &mut layouts);
    layouts
}

fn place(
    spec: &TreeSpec,
    id: NodeId,
    depth: usize,
    next_leaf_x: &mut f32,
    layouts: &mut [NodeLayout],
) -> f32 {
    let node = spec.node(id);
    let x = if node.children.is_empty() {
        let x = *next_leaf_x;
        *next_leaf_x += 1.0;
        x
    } else {
        let mut sum = 0.0;
        for child in &node.children {
            sum += place(spec, *child, depth + 1, next_leaf_x, layouts);
        }
        sum / node.children.len() as f32
    };

    layouts[id] = NodeLayout {
        id,
        x,
        y: depth as f32,
    };
    x
}

#[cfg(test)]
mod tests {
    use super::layout_tree;
    use crate::model::{CompositeKind, TreeSpec};

    #[test]
    fn test_layout_geometry() {
        let mut builder = TreeSpec::builder("layout");
        let a = builder.action("a");
        let b = builder.action("b");
        let c = builder.action("c");
        let inner = builder.composite(CompositeKind::Sequence, "inner", vec![b, c]);
        let root = builder.composite(CompositeKind::Fallback, "root", vec![a, inner]);
        let spec = builder.build(root).unwrap();

        let layouts = layout_tree(&spec);

        // Leaves occupy consecutive slots left to right.
        assert_eq!(layouts[a].x, 0.0);
        assert_eq!(layouts[b].x, 1.0);
        assert_eq!(layouts[c].x, 2.0);

        // Depth rows.
        assert_eq!(layouts[root].y, 0.0);
        assert_eq!(layouts[a].y, 1.0);
        assert_eq!(layouts[inner].y, 1.0);
        assert_eq!(layouts[b].y, 2.0);

        // Parents are centered over their children.
        assert_eq!(layouts[inner].x, 1.5);
        assert_eq!(layouts[root].x, 0.75);
    }

    #[test]
    fn test_layout_single_node() {
        let mut builder = TreeSpec::builder("one");
        let only = builder.action("only");
        let spec = builder.build(only).unwrap();

        let layouts = layout_tree(&spec);
        assert_eq!(layouts.len(), 1);
        assert_eq!(layouts[0].x, 0.0);
        assert_eq!(layouts[0].y, 0.0);
    }
}
