//! Property-based invariants of call-tree rasterization.
//!
//! 1. Every display row tags exactly as many pixels as the nodes at that
//!    depth have samples.
//! 2. Each node's run of pixels carries that node's frame, and children sit
//!    inside their parent's run.
//! 3. A tagged pixel always has a tagged pixel below it, down to row 1.

use flameview_core::model::{CallTree, FlameFrame, FrameRef, NodeId};
use flameview_core::{RasterOptions, rasterize};
use flameview_protocol::Color;
use proptest::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────────

fn frame(i: u8) -> FlameFrame {
    FlameFrame::new(format!("src/m{i}.py"), format!("f{i}"), u32::from(i) + 1)
}

fn stacks_strategy() -> impl Strategy<Value = Vec<(Vec<u8>, u32)>> {
    prop::collection::vec((prop::collection::vec(0u8..4, 1..6), 1u32..20), 1..20)
}

fn build(stacks: &[(Vec<u8>, u32)]) -> Option<CallTree> {
    let mut tree = CallTree::new();
    for (stack, count) in stacks {
        tree.add_stack(stack.iter().copied().map(frame), *count).ok()?;
    }
    Some(tree)
}

/// `(node, x0, depth)` for every node, laid out from the left edge of its
/// parent in child order.
fn layout(tree: &CallTree) -> Vec<(NodeId, u32, u32)> {
    let mut out = Vec::new();
    let mut pending = vec![(CallTree::ROOT, 0u32, 0u32)];
    while let Some((id, x0, depth)) = pending.pop() {
        out.push((id, x0, depth));
        let Some(node) = tree.node(id) else {
            continue;
        };
        let mut x = x0;
        for &child in &node.children {
            pending.push((child, x, depth + 1));
            x += tree.node(child).map_or(0, |c| c.width);
        }
    }
    out
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Per-depth coverage
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn rows_cover_their_depth(stacks in stacks_strategy()) {
        let tree = build(&stacks).ok_or_else(|| TestCaseError::fail("stack rejected"))?;
        let raster = rasterize(&tree, |_| Color::BLACK, &RasterOptions::default())
            .ok_or_else(|| TestCaseError::fail("nothing rasterized"))?;
        let total: u32 = stacks.iter().map(|(_, c)| c).sum();
        prop_assert_eq!(raster.width(), total);
        prop_assert_eq!(raster.rows(), tree.max_depth() + 1);

        let mut expected = vec![0u32; raster.rows() as usize];
        for (id, _, depth) in layout(&tree) {
            if depth > 0
                && let Some(node) = tree.node(id)
            {
                expected[depth as usize] += node.width;
            }
        }
        let tags = raster.tag_image();
        for y in 1..raster.rows() {
            let tagged = tags.row(y).iter().filter(|t| !t.is_unknown()).count() as u32;
            prop_assert_eq!(tagged, expected[y as usize], "row {}", y);
        }
        prop_assert!(tags.row(0).iter().all(|t| t.is_unknown()));
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Per-pixel tags
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn pixels_carry_their_node_frame(stacks in stacks_strategy()) {
        let tree = build(&stacks).ok_or_else(|| TestCaseError::fail("stack rejected"))?;
        let raster = rasterize(&tree, |_| Color::BLACK, &RasterOptions::default())
            .ok_or_else(|| TestCaseError::fail("nothing rasterized"))?;
        let tags = raster.tag_image();

        for (id, x0, depth) in layout(&tree) {
            let Some(node) = tree.node(id) else {
                continue;
            };
            if depth > 0 {
                for x in x0..x0 + node.width {
                    prop_assert_eq!(tags.get(x, depth), node.frame, "({}, {})", x, depth);
                }
                let resolved = raster.resolve(node.frame);
                let interned = node.frame.frame_id().and_then(|f| tree.frame(f));
                prop_assert!(resolved.is_some());
                prop_assert_eq!(resolved, interned);
            }
            let children: u32 = node
                .children
                .iter()
                .filter_map(|&c| tree.node(c))
                .map(|c| c.width)
                .sum();
            prop_assert!(children <= node.width);
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Nesting
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn tagged_pixels_rest_on_their_parent(stacks in stacks_strategy()) {
        let tree = build(&stacks).ok_or_else(|| TestCaseError::fail("stack rejected"))?;
        let raster = rasterize(&tree, |_| Color::BLACK, &RasterOptions::default())
            .ok_or_else(|| TestCaseError::fail("nothing rasterized"))?;
        let tags = raster.tag_image();
        for y in 2..raster.rows() {
            for x in 0..raster.width() {
                if tags.get(x, y) != FrameRef::Unknown {
                    prop_assert!(!tags.get(x, y - 1).is_unknown(), "({}, {}) floats", x, y);
                }
            }
        }
    }
}
