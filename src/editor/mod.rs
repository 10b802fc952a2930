// Copyright 2023 Behavior Tree Project Authors. Licensed under Apache-2.0.

pub mod collapse;
pub mod format;
pub mod layout;

pub use collapse::{collapsed_view, CollapsedView, ViewNode};
pub use format::{load_tree, parse_tree, render_tree, save_tree};
pub use layout::{layout_tree, NodeLayout};
