use crate::diagnostics::Diagnostic;
use crate::geom::{GeoBounds, LatLng, extend_bounds, union_bounds};
use crate::point::Point;
use crate::popup::{PopupContext, normalize_base_url, popup_html};
use crate::registry::{Layer, Registry, SELF_LAYER};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Per-map link settings, as passed by the embedding page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComposeOptions {
    /// Prefix for page links. A `/` is appended when missing.
    #[serde(default)]
    pub base_url: String,
    /// Wiki page embedding the map; points on this page are not hyperlinked.
    #[serde(default)]
    pub page: String,
    /// Prefix of the page-creation URL for points whose page does not exist.
    #[serde(default)]
    pub create_url: String,
}

impl ComposeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_page(mut self, page: impl Into<String>) -> Self {
        self.page = page.into();
        self
    }

    pub fn with_create_url(mut self, create_url: impl Into<String>) -> Self {
        self.create_url = create_url.into();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub id: String,
    pub coord: LatLng,
    pub popup_html: String,
    /// Set for markers of the self layer; their popups open as soon as the map is shown.
    pub open_popup: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupKind {
    Feature,
    Cluster,
}

/// One visual group: a layer's metadata plus the markers it contributed after deduplication.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerGroup {
    pub name: String,
    pub description: String,
    pub kind: GroupKind,
    pub visible: bool,
    pub is_self: bool,
    pub markers: Vec<Marker>,
    pub bounds: Option<GeoBounds>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Viewport {
    Bounds(GeoBounds),
    /// No markers anywhere: the map keeps its initial whole-world view.
    World,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerControlEntry {
    pub description: String,
    /// Index into [`MergedView::groups`].
    pub group: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergedView {
    pub container: String,
    pub groups: Vec<LayerGroup>,
    pub viewport: Viewport,
    pub layer_control: Vec<LayerControlEntry>,
    /// Points dropped because an earlier layer already contributed their id.
    pub duplicates_skipped: usize,
    /// Load problems of the layers this map asked for.
    pub diagnostics: Vec<Diagnostic>,
}

impl MergedView {
    pub fn markers(&self) -> impl Iterator<Item = &Marker> {
        self.groups.iter().flat_map(|g| g.markers.iter())
    }

    pub fn marker_count(&self) -> usize {
        self.groups.iter().map(|g| g.markers.len()).sum()
    }

    pub fn marker(&self, id: &str) -> Option<&Marker> {
        self.markers().find(|m| m.id == id)
    }

    pub fn group(&self, name: &str) -> Option<&LayerGroup> {
        self.groups.iter().find(|g| g.name == name && !g.is_self)
    }
}

struct Candidate<'a> {
    name: &'a str,
    description: &'a str,
    points: &'a [Point],
    clustered: bool,
    hidden: bool,
    base_url: Option<&'a str>,
    is_self: bool,
}

impl<'a> Candidate<'a> {
    fn main(points: &'a [Point]) -> Self {
        Self {
            name: SELF_LAYER,
            description: SELF_LAYER,
            points,
            clustered: false,
            hidden: false,
            base_url: None,
            is_self: true,
        }
    }

    fn layer(layer: &'a Layer) -> Self {
        Self {
            name: &layer.name,
            description: &layer.description,
            points: &layer.points,
            clustered: layer.clustered,
            hidden: layer.hidden_by_default,
            base_url: layer.base_url.as_deref(),
            is_self: false,
        }
    }
}

/// Merges the container's main data and the requested layers into one deduplicated view.
///
/// Candidate order is the self layer (when the container has main data) followed by the
/// requested layers in the order given; names missing from the registry are ignored. A point
/// whose id was already contributed by an earlier candidate is dropped.
pub fn compose_map<S: AsRef<str>>(
    registry: &Registry,
    container: &str,
    requested_layers: &[S],
    options: &ComposeOptions,
) -> MergedView {
    let mut candidates: Vec<Candidate<'_>> = Vec::with_capacity(requested_layers.len() + 1);
    if let Some(points) = registry.main_data(container) {
        candidates.push(Candidate::main(points));
    }
    for name in requested_layers {
        let name = name.as_ref();
        let Some(layer) = registry.lookup_layer(name) else {
            tracing::debug!(container, layer = name, "unknown layer requested, ignoring");
            continue;
        };
        if candidates.iter().any(|c| !c.is_self && c.name == name) {
            continue;
        }
        candidates.push(Candidate::layer(layer));
    }

    let map_base_url = normalize_base_url(&options.base_url);
    let mut seen_ids: HashSet<&str> = HashSet::new();
    let mut duplicates_skipped = 0usize;
    let mut groups = Vec::with_capacity(candidates.len());
    let mut control: IndexMap<&str, usize> = IndexMap::new();
    let mut self_bounds = None;
    let mut all_bounds = None;

    for candidate in &candidates {
        let layer_base_url = candidate.base_url.map(normalize_base_url);
        let ctx = PopupContext {
            base_url: layer_base_url.as_deref().unwrap_or(&map_base_url),
            page: &options.page,
            create_url: &options.create_url,
        };

        let mut markers = Vec::new();
        let mut bounds = None;
        for point in candidate.points {
            if !seen_ids.insert(point.id.as_str()) {
                duplicates_skipped += 1;
                tracing::debug!(
                    container,
                    layer = candidate.name,
                    id = %point.id,
                    "point already shown by an earlier layer"
                );
                continue;
            }
            extend_bounds(&mut bounds, point.coord);
            markers.push(Marker {
                id: point.id.clone(),
                coord: point.coord,
                popup_html: popup_html(point, &ctx),
                open_popup: candidate.is_self,
            });
        }

        if candidate.is_self {
            self_bounds = bounds;
        } else {
            control.insert(candidate.description, groups.len());
        }
        all_bounds = union_bounds(all_bounds, bounds);

        groups.push(LayerGroup {
            name: candidate.name.to_string(),
            description: candidate.description.to_string(),
            kind: if candidate.clustered {
                GroupKind::Cluster
            } else {
                GroupKind::Feature
            },
            visible: !candidate.hidden,
            is_self: candidate.is_self,
            markers,
            bounds,
        });
    }

    let viewport = match self_bounds.or(all_bounds) {
        Some(b) => Viewport::Bounds(b),
        None => Viewport::World,
    };

    let diagnostics = registry
        .diagnostics()
        .iter()
        .filter(|d| match d.container.as_deref() {
            Some(c) => d.layer == SELF_LAYER && c == container,
            None => requested_layers.iter().any(|n| n.as_ref() == d.layer),
        })
        .cloned()
        .collect();

    MergedView {
        container: container.to_string(),
        groups,
        viewport,
        layer_control: control
            .into_iter()
            .map(|(description, group)| LayerControlEntry {
                description: description.to_string(),
                group,
            })
            .collect(),
        duplicates_skipped,
        diagnostics,
    }
}
