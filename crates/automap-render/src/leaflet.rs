use crate::widget::{GroupHandle, MapWidget, MarkerHandle};
use crate::{Error, Result};
use automap_core::{GeoBounds, GroupKind, LatLng};
use serde_json::Value;
use std::fmt::Write as _;

/// Emits the JavaScript that builds the map with Leaflet (plus Leaflet.markercluster for
/// clustered layers).
///
/// Each call appends one statement; [`LeafletScript::finish`] wraps them in an IIFE so several
/// maps can share a page.
#[derive(Debug, Clone)]
pub struct LeafletScript {
    out: String,
    groups: usize,
    markers: usize,
}

impl LeafletScript {
    pub fn new(container: &str) -> Result<Self> {
        let mut out = String::from("(function() {\n");
        let _ = writeln!(&mut out, "  var map = new L.Map({});", js_string(container)?);
        Ok(Self {
            out,
            groups: 0,
            markers: 0,
        })
    }

    pub fn finish(mut self) -> String {
        self.out.push_str("})();\n");
        self.out
    }

    fn line(&mut self, args: std::fmt::Arguments<'_>) {
        self.out.push_str("  ");
        let _ = self.out.write_fmt(args);
        self.out.push('\n');
    }

    fn check_group(&self, group: GroupHandle) -> Result<()> {
        if group.0 < self.groups {
            Ok(())
        } else {
            Err(Error::UnknownHandle { handle: group.0 })
        }
    }
}

/// JSON string literal that is also safe inside an inline `<script>` element.
fn js_string(s: &str) -> Result<String> {
    Ok(serde_json::to_string(s)?.replace("</", "<\\/"))
}

fn js_number(v: f64) -> String {
    if v.is_finite() {
        format!("{v}")
    } else {
        "0".to_string()
    }
}

fn js_latlng(c: LatLng) -> String {
    format!("[{}, {}]", js_number(c.lat), js_number(c.lon))
}

impl MapWidget for LeafletScript {
    fn fit_world(&mut self) -> Result<()> {
        self.line(format_args!("map.fitWorld();"));
        Ok(())
    }

    fn add_tile_layer(&mut self, template: &str, attribution: &str, max_zoom: u32) -> Result<()> {
        let template = js_string(template)?;
        let attribution = js_string(attribution)?;
        self.line(format_args!(
            "map.addLayer(L.tileLayer({template}, {{attribution: {attribution}, maxZoom: {max_zoom}}}));"
        ));
        Ok(())
    }

    fn create_group(&mut self, kind: GroupKind, cluster_options: &Value) -> Result<GroupHandle> {
        let group = GroupHandle(self.groups);
        self.groups += 1;
        match kind {
            GroupKind::Feature => {
                self.line(format_args!("var g{} = new L.FeatureGroup();", group.0));
            }
            GroupKind::Cluster => {
                let options = serde_json::to_string(cluster_options)?.replace("</", "<\\/");
                self.line(format_args!(
                    "var g{} = new L.MarkerClusterGroup({options});",
                    group.0
                ));
            }
        }
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
        let popup = js_string(popup_html)?;
        self.line(format_args!(
            "var m{} = new L.Marker({});",
            marker.0,
            js_latlng(coord)
        ));
        self.line(format_args!("g{}.addLayer(m{});", group.0, marker.0));
        self.line(format_args!("m{}.bindPopup({popup});", marker.0));
        Ok(marker)
    }

    fn add_group_to_map(&mut self, group: GroupHandle) -> Result<()> {
        self.check_group(group)?;
        self.line(format_args!("map.addLayer(g{});", group.0));
        Ok(())
    }

    fn fit_bounds(&mut self, bounds: &GeoBounds) -> Result<()> {
        self.line(format_args!(
            "map.fitBounds([[{}, {}], [{}, {}]]);",
            js_number(bounds.south),
            js_number(bounds.west),
            js_number(bounds.north),
            js_number(bounds.east)
        ));
        Ok(())
    }

    fn open_popup(&mut self, marker: MarkerHandle) -> Result<()> {
        if marker.0 >= self.markers {
            return Err(Error::UnknownHandle { handle: marker.0 });
        }
        // Added to the map directly so several popups can stay open at once.
        self.line(format_args!(
            "map.addLayer(m{0}.getPopup().setLatLng(m{0}.getLatLng()));",
            marker.0
        ));
        Ok(())
    }

    fn add_layer_control(&mut self, overlays: &[(&str, GroupHandle)]) -> Result<()> {
        let mut entries = Vec::with_capacity(overlays.len());
        for (name, group) in overlays {
            self.check_group(*group)?;
            entries.push(format!("{}: g{}", js_string(name)?, group.0));
        }
        self.line(format_args!(
            "L.control.layers(undefined, {{{}}}).addTo(map);",
            entries.join(", ")
        ));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use automap_core::latlng;
    use serde_json::json;

    #[test]
    fn strings_cannot_close_the_script_element() {
        assert_eq!(js_string("<b>x</b>").unwrap(), r#""<b>x<\/b>""#);
    }

    #[test]
    fn emits_statements_in_call_order() {
        let mut w = LeafletScript::new("map").unwrap();
        w.fit_world().unwrap();
        let g = w
            .create_group(GroupKind::Cluster, &json!({"spiderfyOnMaxZoom": false}))
            .unwrap();
        let m = w.add_marker(g, latlng(1.5, -2.0), "<b>A</b>").unwrap();
        w.add_group_to_map(g).unwrap();
        w.open_popup(m).unwrap();
        w.add_layer_control(&[("Pubs", g)]).unwrap();
        let js = w.finish();
        assert_eq!(
            js,
            concat!(
                "(function() {\n",
                "  var map = new L.Map(\"map\");\n",
                "  map.fitWorld();\n",
                "  var g0 = new L.MarkerClusterGroup({\"spiderfyOnMaxZoom\":false});\n",
                "  var m0 = new L.Marker([1.5, -2]);\n",
                "  g0.addLayer(m0);\n",
                "  m0.bindPopup(\"<b>A<\\/b>\");\n",
                "  map.addLayer(g0);\n",
                "  map.addLayer(m0.getPopup().setLatLng(m0.getLatLng()));\n",
                "  L.control.layers(undefined, {\"Pubs\": g0}).addTo(map);\n",
                "})();\n",
            )
        );
    }

    #[test]
    fn rejects_unknown_handles() {
        let mut w = LeafletScript::new("map").unwrap();
        assert!(matches!(
            w.add_group_to_map(GroupHandle(3)),
            Err(Error::UnknownHandle { handle: 3 })
        ));
        assert!(w.open_popup(MarkerHandle(0)).is_err());
    }
}
