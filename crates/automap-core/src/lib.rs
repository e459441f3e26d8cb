#![forbid(unsafe_code)]

//! Wiki map layers: registry + marker composition (headless).
//!
//! Pages declare named layers of points (usually one JSON file per layer, generated from page
//! metadata) and optionally "main" points belonging to the page itself. [`compose_map`] merges
//! them into a [`MergedView`]: one group per layer, each point id shown once (first layer wins),
//! popup HTML per marker, and the viewport to fit.
//!
//! Mounting a view onto an actual map widget lives in `automap-render`.

pub mod compose;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod escape;
pub mod geom;
pub mod hooks;
pub mod manifest;
pub mod point;
pub mod popup;
pub mod registry;
pub mod source;

pub use compose::{
    ComposeOptions, GroupKind, LayerControlEntry, LayerGroup, Marker, MergedView, Viewport,
    compose_map,
};
pub use config::MapConfig;
pub use diagnostics::{Diagnostic, DiagnosticKind};
pub use error::{Error, Result};
pub use geom::{GeoBounds, LatLng, latlng};
pub use hooks::{Hooks, MAP_LAYERS_HOOK, MAPS_HOOK, PageContext, PageSession};
pub use manifest::{LayerEntry, MapEntry, PageManifest};
pub use point::{Point, PointIssue};
pub use registry::{Layer, LayerSpec, LoadOptions, Registry, SELF_LAYER};
pub use source::{FileSource, InlineSource, LayerSource};

#[cfg(test)]
mod tests;
