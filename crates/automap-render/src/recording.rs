use crate::widget::{GroupHandle, MapWidget, MarkerHandle};
use crate::{Error, Result};
use automap_core::{GeoBounds, GroupKind, LatLng};
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "call", rename_all = "snake_case")]
pub enum WidgetCall {
    FitWorld,
    AddTileLayer {
        template: String,
        attribution: String,
        max_zoom: u32,
    },
    CreateGroup {
        group: GroupHandle,
        kind: GroupKind,
    },
    AddMarker {
        group: GroupHandle,
        marker: MarkerHandle,
        coord: LatLng,
        popup_html: String,
    },
    AddGroupToMap {
        group: GroupHandle,
    },
    FitBounds {
        bounds: GeoBounds,
    },
    OpenPopup {
        marker: MarkerHandle,
    },
    AddLayerControl {
        overlays: Vec<(String, GroupHandle)>,
    },
}

/// A widget that only records what it was asked to do.
#[derive(Debug, Clone, Default)]
pub struct RecordingWidget {
    pub calls: Vec<WidgetCall>,
    groups: usize,
    markers: usize,
}

impl RecordingWidget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> &[WidgetCall] {
        &self.calls
    }

    /// Popups opened so far, as their HTML.
    pub fn opened_popups(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                WidgetCall::OpenPopup { marker } => self.popup_of(*marker),
                _ => None,
            })
            .collect()
    }

    fn popup_of(&self, marker: MarkerHandle) -> Option<&str> {
        self.calls.iter().find_map(|c| match c {
            WidgetCall::AddMarker {
                marker: m,
                popup_html,
                ..
            } if *m == marker => Some(popup_html.as_str()),
            _ => None,
        })
    }

    fn check_group(&self, group: GroupHandle) -> Result<()> {
        if group.0 < self.groups {
            Ok(())
        } else {
            Err(Error::UnknownHandle { handle: group.0 })
        }
    }
}

impl MapWidget for RecordingWidget {
    fn fit_world(&mut self) -> Result<()> {
        self.calls.push(WidgetCall::FitWorld);
        Ok(())
    }

    fn add_tile_layer(&mut self, template: &str, attribution: &str, max_zoom: u32) -> Result<()> {
        self.calls.push(WidgetCall::AddTileLayer {
            template: template.to_string(),
            attribution: attribution.to_string(),
            max_zoom,
        });
        Ok(())
    }

    fn create_group(&mut self, kind: GroupKind, _cluster_options: &Value) -> Result<GroupHandle> {
        let group = GroupHandle(self.groups);
        self.groups += 1;
        self.calls.push(WidgetCall::CreateGroup { group, kind });
        Ok(group)
    }

    fn add_marker(
        &mut self,
        group: GroupHandle,
        coord: LatLng,
        popup_html: &str,
    ) -> Result<MarkerHandle> {
        self.check_group(group)?;
        let marker = MarkerHandle(self.markers);
        self.markers += 1;
        self.calls.push(WidgetCall::AddMarker {
            group,
            marker,
            coord,
            popup_html: popup_html.to_string(),
        });
        Ok(marker)
    }

    fn add_group_to_map(&mut self, group: GroupHandle) -> Result<()> {
        self.check_group(group)?;
        self.calls.push(WidgetCall::AddGroupToMap { group });
        Ok(())
    }

    fn fit_bounds(&mut self, bounds: &GeoBounds) -> Result<()> {
        self.calls.push(WidgetCall::FitBounds { bounds: *bounds });
        Ok(())
    }

    fn open_popup(&mut self, marker: MarkerHandle) -> Result<()> {
        if marker.0 >= self.markers {
            return Err(Error::UnknownHandle { handle: marker.0 });
        }
        self.calls.push(WidgetCall::OpenPopup { marker });
        Ok(())
    }

    fn add_layer_control(&mut self, overlays: &[(&str, GroupHandle)]) -> Result<()> {
        self.calls.push(WidgetCall::AddLayerControl {
            overlays: overlays
                .iter()
                .map(|(name, group)| (name.to_string(), *group))
                .collect(),
        });
        Ok(())
    }
}
