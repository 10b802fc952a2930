// Copyright 2023 Behavior Tree Project Authors. Licensed under Apache-2.0.

//! Collapsed tree views
//!
//! An editor folds subtrees away to keep large trees readable. The
//! collapsed view is the quotient of the tree under the partition that
//! merges each folded subtree into a single block: one view node per
//! block, represented by the block's topmost spec node.

use std::collections::HashSet;

use crate::{
    errors::{Error, Result},
    model::{NodeId, TreeSpec},
};

/// One block of the collapsed view.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewNode {
    /// The spec node representing the block.
    pub rep: NodeId,
    pub label: String,
    /// How many spec nodes were merged into this block, 1 for an
    /// unfolded node.
    pub folded: usize,
    /// Indices into the view arena.
    pub children: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CollapsedView {
    pub nodes: Vec<ViewNode>,
    pub root: usize,
}

/// Compute the view of `spec` with each subtree rooted in `fold_roots`
/// folded into one node.
///
/// A fold root nested inside another folded subtree merges into the
/// outer block. Folding the tree root yields a single-node view.
pub fn collapsed_view(spec: &TreeSpec, fold_roots: &[NodeId]) -> Result<CollapsedView> {
    for id in fold_roots {
        if *id >= spec.len() {
            return Err(Error::InvalidTree(format!(
                "fold root:{} out of range (len:{})",
                id,
                spec.len()
            )));
        }
    }

    let folds: HashSet<NodeId> = fold_roots.iter().copied().collect();
    let mut nodes = Vec::new();
    let root = build_block(spec, spec.root(), &folds, &mut nodes);
    Ok(CollapsedView { nodes, root })
}

fn build_block(
    spec: &TreeSpec,
    id: NodeId,
    folds: &HashSet<NodeId>,
    nodes: &mut Vec<ViewNode>,
) -> usize {
    let node = spec.node(id);
    let idx = nodes.len();

    if folds.contains(&id) {
        // The whole subtree becomes one block, nothing below it is
        // visited, so nested fold roots merge in for free.
        nodes.push(ViewNode {
            rep: id,
            label: node.name.clone(),
            folded: subtree_size(spec, id),
            children: Vec::new(),
        });
        return idx;
    }

    nodes.push(ViewNode {
        rep: id,
        label: node.name.clone(),
        folded: 1,
        children: Vec::new(),
    });
    let children: Vec<usize> = node
        .children
        .iter()
        .map(|child| build_block(spec, *child, folds, nodes))
        .collect();
    nodes[idx].children = children;
    idx
}

fn subtree_size(spec: &TreeSpec, id: NodeId) -> usize {
    1 + spec
        .node(id)
        .children
        .iter()
        .map(|child| subtree_size(spec, *child))
        .sum::<usize>()
}

#[cfg(test)]
mod tests {
    use super::collapsed_view;
    use crate::model::{CompositeKind, TreeSpec};

    fn sample() -> (TreeSpec, usize, usize) {
        // root -> [a, inner -> [b, c]]
        let mut builder = TreeSpec::builder("sample");
        let a = builder.action("a");
        let b = builder.action("b");
        let c = builder.action("c");
        let inner = builder.composite(CompositeKind::Sequence, "inner", vec![b, c]);
        let root = builder.composite(CompositeKind::Fallback, "root", vec![a, inner]);
        (builder.build(root).unwrap(), root, inner)
    }

    #[test]
    fn test_no_folds_preserves_shape() {
        let (spec, _, _) = sample();
        let view = collapsed_view(&spec, &[]).unwrap();

        assert_eq!(view.nodes.len(), spec.len());
        assert!(view.nodes.iter().all(|n| n.folded == 1));
        assert_eq!(view.nodes[view.root].label, "root");
        assert_eq!(view.nodes[view.root].children.len(), 2);
    }

    #[test]
    fn test_fold_inner_subtree() {
        let (spec, _, inner) = sample();
        let view = collapsed_view(&spec, &[inner]).unwrap();

        // root, a and the folded block.
        assert_eq!(view.nodes.len(), 3);
        let block = view
            .nodes
            .iter()
            .find(|n| n.rep == inner)
            .expect("folded block");
        assert_eq!(block.label, "inner");
        assert_eq!(block.folded, 3);
        assert!(block.children.is_empty());
    }

    #[test]
    fn test_fold_root_gives_single_node() {
        let (spec, root, _) = sample();
        let view = collapsed_view(&spec, &[root]).unwrap();

        assert_eq!(view.nodes.len(), 1);
        assert_eq!(view.nodes[0].folded, spec.len());
    }

    #[test]
    fn test_nested_folds_merge() {
        let (spec, root, inner) = sample();
        let outer_only = collapsed_view(&spec, &[root]).unwrap();
        let nested = collapsed_view(&spec, &[root, inner]).unwrap();
        assert_eq!(outer_only, nested);
    }

    #[test]
    fn test_fold_root_out_of_range() {
        let (spec, _, _) = sample();
        assert!(collapsed_view(&spec, &[99]).is_err());
    }
}
