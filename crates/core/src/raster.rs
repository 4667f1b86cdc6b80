//! Call tree → (color image, tag image).
//!
//! Each node becomes a horizontal run of `width` pixels in row `depth`;
//! children are packed left to right from their parent's x-offset. The tag
//! image records, per pixel, which frame produced it so pointer positions can
//! be resolved back to source locations in O(1).

use std::sync::Arc;

use flameview_protocol::{Color, Rect};
use image::{Rgba, RgbaImage};

use crate::model::{CallTree, FlameFrame, FrameRef, NodeId};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterOptions {
    /// Fill for pixels no frame covers and for synthetic nodes.
    pub background: Color,
}

impl Default for RasterOptions {
    fn default() -> Self {
        Self {
            background: Color::rgb(0xf8, 0xf8, 0xf8),
        }
    }
}

/// Grid of [`FrameRef`] parallel to the color image.
#[derive(Debug, Clone)]
pub struct TagImage {
    width: u32,
    height: u32,
    cells: Vec<FrameRef>,
    frames: Arc<[FlameFrame]>,
}

impl TagImage {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Tag at `(x, y)` in image space (row 0 = synthetic root), or
    /// `Unknown` outside the image.
    pub fn get(&self, x: u32, y: u32) -> FrameRef {
        if x >= self.width || y >= self.height {
            return FrameRef::Unknown;
        }
        self.cells[y as usize * self.width as usize + x as usize]
    }

    pub fn row(&self, y: u32) -> &[FrameRef] {
        let w = self.width as usize;
        let start = y as usize * w;
        self.cells.get(start..start + w).unwrap_or(&[])
    }

    pub fn frame(&self, tag: FrameRef) -> Option<&FlameFrame> {
        tag.frame_id().and_then(|id| self.frames.get(id.index()))
    }
}

/// Immutable color/tag image pair for one view session.
#[derive(Debug, Clone)]
pub struct Raster {
    color: RgbaImage,
    tags: TagImage,
}

impl Raster {
    pub fn color_image(&self) -> &RgbaImage {
        &self.color
    }

    pub fn tag_image(&self) -> &TagImage {
        &self.tags
    }

    pub fn width(&self) -> u32 {
        self.color.width()
    }

    /// Rows including the synthetic root row.
    pub fn rows(&self) -> u32 {
        self.color.height()
    }

    /// Rows shown on screen: everything but the synthetic root row.
    pub fn display_rows(&self) -> u32 {
        self.rows() - 1
    }

    /// Full extent in user coordinates: one unit per image pixel, root row
    /// excluded.
    pub fn extent(&self) -> Rect {
        Rect::new(0.0, 0.0, f64::from(self.width()), f64::from(self.display_rows()))
    }

    /// Image row backing display row `row` (0 = outermost real frames).
    pub fn image_row(display_row: u32) -> u32 {
        display_row + 1
    }

    /// Color of the displayed cell at `(col, display_row)`. Indices are
    /// clamped into range.
    pub fn display_pixel(&self, col: u32, display_row: u32) -> [u8; 4] {
        let x = col.min(self.width() - 1);
        let y = Self::image_row(display_row.min(self.display_rows() - 1));
        self.color.get_pixel(x, y).0
    }

    pub fn resolve(&self, tag: FrameRef) -> Option<&FlameFrame> {
        self.tags.frame(tag)
    }
}

/// Rasterize `tree`, coloring each distinct frame with `color_of`.
///
/// Returns `None` when the tree has nothing to display.
pub fn rasterize<F>(tree: &CallTree, mut color_of: F, options: &RasterOptions) -> Option<Raster>
where
    F: FnMut(&FlameFrame) -> Color,
{
    if tree.is_empty() {
        return None;
    }
    let width = tree.total_width();
    let rows = tree.max_depth() + 1;

    let background = Rgba(options.background.to_array());
    let mut color = RgbaImage::from_pixel(width, rows, background);
    let mut cells = vec![FrameRef::Unknown; width as usize * rows as usize];

    // One palette lookup per distinct frame.
    let mut palette: Vec<Option<Rgba<u8>>> = vec![None; tree.frames().len()];

    let mut stack: Vec<(NodeId, u32, u32)> = vec![(CallTree::ROOT, 0, 0)];
    while let Some((id, x0, depth)) = stack.pop() {
        let Some(node) = tree.node(id) else {
            continue;
        };

        let fill = match node.frame.frame_id() {
            Some(fid) => {
                let slot = &mut palette[fid.index()];
                *slot.get_or_insert_with(|| {
                    let frame = &tree.frames()[fid.index()];
                    Rgba(color_of(frame).to_array())
                })
            }
            None => background,
        };

        let row_start = depth as usize * width as usize;
        for x in x0..x0 + node.width {
            color.put_pixel(x, depth, fill);
            cells[row_start + x as usize] = node.frame;
        }

        // Children are packed from the parent's left edge; any slack is on the right.
        let mut child_x = x0;
        let mut children = Vec::with_capacity(node.children.len());
        for &child in &node.children {
            let Some(child_node) = tree.node(child) else {
                continue;
            };
            children.push((child, child_x, depth + 1));
            child_x += child_node.width;
        }
        // Reversed so children pop in tree order.
        stack.extend(children.into_iter().rev());
    }

    tracing::debug!(
        width,
        rows,
        nodes = tree.node_count(),
        frames = tree.frames().len(),
        "rasterized call tree"
    );

    Some(Raster {
        color,
        tags: TagImage {
            width,
            height: rows,
            cells,
            frames: Arc::from(tree.frames()),
        },
    })
}
