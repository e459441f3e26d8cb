use serde_json::{Map, Value, json};

pub const DEFAULT_TILES: &str = "http://{s}.tile.openstreetmap.fr/hot/{z}/{x}/{y}.png";
pub const DEFAULT_ATTRIBUTION: &str = concat!(
    r#"Map data &copy; <a href="http://openstreetmap.org">OpenStreetMap</a> contributors, "#,
    r#"<a href="http://creativecommons.org/licenses/by-sa/2.0/">CC-BY-SA</a>"#
);
pub const DEFAULT_MAX_ZOOM: u32 = 18;

/// Map widget settings (tiles, attribution, zoom, cluster behaviour, container size).
///
/// Kept as a JSON object so pages can override any key, including ones passed straight through
/// to the mapping library such as `cluster.*`.
#[derive(Debug, Clone, PartialEq)]
pub struct MapConfig(Value);

impl Default for MapConfig {
    fn default() -> Self {
        Self(json!({
            "tiles": DEFAULT_TILES,
            "attribution": DEFAULT_ATTRIBUTION,
            "maxZoom": DEFAULT_MAX_ZOOM,
            "width": "100%",
            "height": "400px",
            "cluster": {
                "spiderfyOnMaxZoom": false,
                "showCoverageOnHover": false,
                "zoomToBoundsOnClick": true,
                "disableClusteringAtZoom": DEFAULT_MAX_ZOOM,
            },
        }))
    }
}

impl MapConfig {
    fn get(&self, dotted_path: &str) -> Option<&Value> {
        let mut cur = &self.0;
        for segment in dotted_path.split('.') {
            cur = cur.as_object()?.get(segment)?;
        }
        Some(cur)
    }

    pub fn get_str(&self, dotted_path: &str) -> Option<&str> {
        self.get(dotted_path)?.as_str()
    }

    pub fn get_f64(&self, dotted_path: &str) -> Option<f64> {
        self.get(dotted_path)?.as_f64()
    }

    pub fn deep_merge(&mut self, other: &Value) {
        deep_merge_value(&mut self.0, other);
    }

    /// Defaults with `overrides` merged on top.
    pub fn with_overrides(overrides: &Value) -> Self {
        let mut cfg = Self::default();
        cfg.deep_merge(overrides);
        cfg
    }

    pub fn tiles(&self) -> &str {
        self.get_str("tiles")
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_TILES)
    }

    pub fn attribution(&self) -> &str {
        self.get_str("attribution").unwrap_or(DEFAULT_ATTRIBUTION)
    }

    pub fn max_zoom(&self) -> u32 {
        self.get_f64("maxZoom")
            .filter(|z| z.is_finite() && *z >= 0.0)
            .map(|z| z as u32)
            .unwrap_or(DEFAULT_MAX_ZOOM)
    }

    /// Options handed verbatim to the cluster group constructor.
    pub fn cluster_options(&self) -> Value {
        self.get("cluster")
            .filter(|v| v.is_object())
            .cloned()
            .unwrap_or_else(|| Value::Object(Map::new()))
    }

    pub fn width(&self) -> &str {
        self.get_str("width").unwrap_or("100%")
    }

    pub fn height(&self) -> &str {
        self.get_str("height").unwrap_or("400px")
    }
}

fn deep_merge_value(base: &mut Value, incoming: &Value) {
    match (base, incoming) {
        (Value::Object(base_map), Value::Object(in_map)) => {
            for (key, in_value) in in_map {
                match base_map.get_mut(key) {
                    Some(base_value) => deep_merge_value(base_value, in_value),
                    None => {
                        base_map.insert(key.clone(), in_value.clone());
                    }
                }
            }
        }
        (base_slot, in_value) => {
            *base_slot = in_value.clone();
        }
    }
}
