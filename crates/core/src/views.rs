use std::collections::BTreeMap;

use flameview_protocol::Color;

use crate::config::ViewerConfig;
use crate::model::{CallTree, FlameFrame};
use crate::raster::{Raster, RasterOptions, rasterize};
use crate::viewer::{ViewError, Viewer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewId(u32);

/// The open views of one host, in opening order.
#[derive(Debug, Default)]
pub struct Views {
    config: ViewerConfig,
    next_id: u32,
    open: BTreeMap<ViewId, Viewer>,
}

impl Views {
    pub fn new(config: ViewerConfig) -> Self {
        Self {
            config,
            next_id: 0,
            open: BTreeMap::new(),
        }
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    /// Rasterize `tree` and open a view on it.
    pub fn view<F>(&mut self, tree: &CallTree, color_of: F) -> Result<ViewId, ViewError>
    where
        F: FnMut(&FlameFrame) -> Color,
    {
        let options = RasterOptions {
            background: self.config.render.background,
        };
        let Some(raster) = rasterize(tree, color_of, &options) else {
            tracing::warn!(samples = tree.total_width(), "call tree has nothing to display");
            return Err(ViewError::NothingToShow);
        };
        self.view_raster(raster)
    }

    /// Open a view on an already rasterized tree.
    pub fn view_raster(&mut self, raster: Raster) -> Result<ViewId, ViewError> {
        let viewer = Viewer::new(raster, &self.config)?;
        let id = ViewId(self.next_id);
        self.next_id += 1;
        tracing::debug!(?id, "view opened");
        self.open.insert(id, viewer);
        Ok(id)
    }

    pub fn get(&self, id: ViewId) -> Option<&Viewer> {
        self.open.get(&id)
    }

    pub fn get_mut(&mut self, id: ViewId) -> Option<&mut Viewer> {
        self.open.get_mut(&id)
    }

    pub fn ids(&self) -> impl Iterator<Item = ViewId> + '_ {
        self.open.keys().copied()
    }

    pub fn close(&mut self, id: ViewId) -> bool {
        let closed = self.open.remove(&id).is_some();
        if closed {
            tracing::debug!(?id, "view closed");
        }
        closed
    }

    /// Close every open view. Returns how many were open.
    pub fn close_all(&mut self) -> usize {
        let n = self.open.len();
        self.open.clear();
        tracing::debug!(closed = n, "closed all views");
        n
    }

    pub fn len(&self) -> usize {
        self.open.len()
    }

    pub fn is_empty(&self) -> bool {
        self.open.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> CallTree {
        let mut tree = CallTree::new();
        assert!(tree.add_stack([FlameFrame::new("a.rs", "a", 1)], 2).is_ok());
        tree
    }

    #[test]
    fn view_and_close() {
        let mut views = Views::default();
        let a = views.view(&tree(), |_| Color::BLACK).unwrap();
        let b = views.view(&tree(), |_| Color::WHITE).unwrap();
        assert_ne!(a, b);
        assert_eq!(views.len(), 2);
        assert_eq!(views.ids().collect::<Vec<_>>(), vec![a, b]);
        assert!(views.close(a));
        assert!(!views.close(a));
        assert!(views.get(a).is_none());
        assert!(views.get(b).is_some());
    }

    #[test]
    fn empty_tree_has_nothing_to_show() {
        let mut views = Views::default();
        assert_eq!(
            views.view(&CallTree::new(), |_| Color::BLACK),
            Err(ViewError::NothingToShow)
        );
        assert!(views.is_empty());
    }

    #[test]
    fn close_all_clears_registry() {
        let mut views = Views::default();
        for _ in 0..3 {
            assert!(views.view(&tree(), |_| Color::BLACK).is_ok());
        }
        assert_eq!(views.close_all(), 3);
        assert!(views.is_empty());
        assert_eq!(views.close_all(), 0);
    }

    #[test]
    fn ids_are_not_reused() {
        let mut views = Views::default();
        let a = views.view(&tree(), |_| Color::BLACK).unwrap();
        views.close_all();
        let b = views.view(&tree(), |_| Color::BLACK).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn view_raster_uses_configured_background() {
        let mut views = Views::default();
        let id = views.view(&tree(), |_| Color::BLACK).unwrap();
        let raster = views.get(id).map(|v| v.raster().color_image().get_pixel(0, 0).0);
        assert_eq!(raster, Some(views.config().render.background.to_array()));
    }
}
