use crate::widget::{GroupHandle, MapWidget};
use crate::{Error, Result};
use automap_core::{MapConfig, MergedView, Viewport};

/// Replays a composed view onto a map widget.
///
/// Call order: whole-world view, tile layer, then per group: create, add markers with popups,
/// show unless hidden, and for the self group fit its bounds and open every popup. Without a
/// (non-empty) self group the view's fallback viewport is fitted afterwards; `Viewport::World`
/// keeps the initial view. The layer switcher is added last.
pub fn mount(view: &MergedView, widget: &mut dyn MapWidget, config: &MapConfig) -> Result<()> {
    widget.fit_world()?;
    widget.add_tile_layer(config.tiles(), config.attribution(), config.max_zoom())?;

    let cluster_options = config.cluster_options();
    let mut handles: Vec<GroupHandle> = Vec::with_capacity(view.groups.len());
    let mut fitted = false;

    for group in &view.groups {
        let handle = widget.create_group(group.kind, &cluster_options)?;
        handles.push(handle);

        let mut markers = Vec::with_capacity(group.markers.len());
        for marker in &group.markers {
            let m = widget.add_marker(handle, marker.coord, &marker.popup_html)?;
            markers.push((m, marker.open_popup));
        }

        if group.visible {
            widget.add_group_to_map(handle)?;
        }

        if group.is_self {
            if let Some(bounds) = &group.bounds {
                widget.fit_bounds(bounds)?;
                fitted = true;
            }
            for (m, open) in markers {
                if open {
                    widget.open_popup(m)?;
                }
            }
        }
    }

    if !fitted {
        if let Viewport::Bounds(bounds) = &view.viewport {
            widget.fit_bounds(bounds)?;
        }
    }

    let overlays = view
        .layer_control
        .iter()
        .map(|entry| {
            handles
                .get(entry.group)
                .map(|h| (entry.description.as_str(), *h))
                .ok_or(Error::UnknownHandle {
                    handle: entry.group,
                })
        })
        .collect::<Result<Vec<_>>>()?;
    widget.add_layer_control(&overlays)?;

    tracing::debug!(
        container = %view.container,
        groups = view.groups.len(),
        markers = view.marker_count(),
        "mounted map"
    );
    Ok(())
}
