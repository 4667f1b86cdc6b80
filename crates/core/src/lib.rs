//! Interactive flame-graph viewport engine.
//!
//! A [`model::CallTree`] is rasterized once into a color image and a
//! parallel tag image ([`raster::Raster`]). A [`viewer::Viewer`] then maps
//! host input onto zoom and pan of that raster, redraws a widget-sized
//! surface, and resolves pointer positions back to source frames.

pub mod config;
pub mod interaction;
pub mod model;
pub mod raster;
pub mod render;
pub mod viewer;
pub mod viewport;
pub mod views;

pub use config::{ConfigError, ViewerConfig};
pub use raster::{Raster, RasterOptions, rasterize};
pub use viewer::{ViewError, ViewUpdate, Viewer, ViewerEvent};
pub use viewport::Viewport;
pub use views::{ViewId, Views};
