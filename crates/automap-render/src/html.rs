use crate::leaflet::LeafletScript;
use crate::mount::mount;
use crate::Result;
use automap_core::escape::escape_html;
use automap_core::{MapConfig, MergedView};
use std::fmt::Write as _;

/// Renders the container element plus the inline script that mounts `view` into it.
///
/// The element id is `view.container` passed through [`sanitize_container_id`]; the script looks
/// the element up by that same id. Leaflet (and Leaflet.markercluster when any group is
/// clustered) must already be loaded by the page.
pub fn render_map_html(view: &MergedView, config: &MapConfig) -> Result<String> {
    let id = sanitize_container_id(&view.container);
    let mut script = LeafletScript::new(&id)?;
    mount(view, &mut script, config)?;

    let mut out = String::new();
    let _ = writeln!(
        &mut out,
        r#"<div id="{}" class="map" style="width: {}; height: {};"></div>"#,
        escape_html(&id),
        escape_html(config.width()),
        escape_html(config.height()),
    );
    out.push_str("<script type=\"text/javascript\">\n");
    out.push_str(&script.finish());
    out.push_str("</script>\n");
    Ok(out)
}

/// Turns a container name into a DOM `id`: ASCII letters, digits and `_`, with every other run
/// of characters collapsed to a single `-`. Ids that would not start with a letter get a `map-`
/// prefix; names with nothing usable become `map-untitled`.
pub fn sanitize_container_id(raw: &str) -> String {
    let mut id = String::with_capacity(raw.len());
    let mut gap = false;
    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() || ch == '_' {
            if gap && !id.is_empty() {
                id.push('-');
            }
            gap = false;
            id.push(ch);
        } else {
            gap = true;
        }
    }

    match id.chars().next() {
        None => "map-untitled".to_string(),
        Some(c) if c.is_ascii_alphabetic() => id,
        Some(_) => format!("map-{id}"),
    }
}
