use crate::Result;
use automap_core::{GeoBounds, GroupKind, LatLng};
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct GroupHandle(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct MarkerHandle(pub usize);

/// The mapping library, seen only through its construction and mutation calls.
pub trait MapWidget {
    /// Sets a defined initial view so later calls (popups, bounds) have something to work on.
    fn fit_world(&mut self) -> Result<()>;

    fn add_tile_layer(&mut self, template: &str, attribution: &str, max_zoom: u32) -> Result<()>;

    /// `cluster_options` is only meaningful for [`GroupKind::Cluster`].
    fn create_group(&mut self, kind: GroupKind, cluster_options: &Value) -> Result<GroupHandle>;

    /// Adds a marker to `group` with its popup bound (not opened).
    fn add_marker(
        &mut self,
        group: GroupHandle,
        coord: LatLng,
        popup_html: &str,
    ) -> Result<MarkerHandle>;

    fn add_group_to_map(&mut self, group: GroupHandle) -> Result<()>;

    fn fit_bounds(&mut self, bounds: &GeoBounds) -> Result<()>;

    fn open_popup(&mut self, marker: MarkerHandle) -> Result<()>;

    /// Layer switcher with one toggle per overlay, in order.
    fn add_layer_control(&mut self, overlays: &[(&str, GroupHandle)]) -> Result<()>;
}
