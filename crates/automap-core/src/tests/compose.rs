use crate::*;

fn pt(id: &str, lat: f64, lon: f64) -> Point {
    Point::new(id, lat, lon)
        .with_page(format!("places/{id}"))
        .with_title(format!("Place {id}"))
}

fn opts() -> ComposeOptions {
    ComposeOptions::new()
        .with_base_url("/wiki")
        .with_page("places/home")
        .with_create_url("/cgi?do=create")
}

#[test]
fn earlier_layer_wins_shared_id() {
    let mut reg = Registry::new();
    reg.register_layer(LayerSpec::new("A"), vec![pt("1", 1.0, 1.0)]);
    reg.register_layer(
        LayerSpec::new("B"),
        vec![pt("1", 2.0, 2.0), pt("2", 3.0, 3.0)],
    );

    let view = compose_map(&reg, "map", &["A", "B"], &opts());
    assert_eq!(view.marker_count(), 2);
    assert_eq!(view.marker("1").unwrap().coord, latlng(1.0, 1.0));
    assert_eq!(view.marker("2").unwrap().coord, latlng(3.0, 3.0));
    assert_eq!(view.group("A").unwrap().markers.len(), 1);
    assert_eq!(view.group("B").unwrap().markers.len(), 1);
    assert_eq!(view.duplicates_skipped, 1);

    // Reversing the request order reverses precedence.
    let view = compose_map(&reg, "map", &["B", "A"], &opts());
    assert_eq!(view.marker("1").unwrap().coord, latlng(2.0, 2.0));
    assert!(view.group("A").unwrap().markers.is_empty());
}

#[test]
fn unknown_layer_is_ignored() {
    let mut reg = Registry::new();
    reg.register_layer(LayerSpec::new("pubs"), vec![pt("1", 1.0, 1.0)]);

    let view = compose_map(&reg, "map", &["nope", "pubs"], &opts());
    assert_eq!(view.groups.len(), 1);
    assert_eq!(view.groups[0].name, "pubs");
    assert!(view.group("nope").is_none());
    assert!(view.diagnostics.is_empty());
}

#[test]
fn self_layer_is_first_visible_and_opens_popups() {
    let mut reg = Registry::new();
    reg.register_layer(
        LayerSpec::new("pubs").clustered(true).hidden(true),
        vec![pt("home", 9.0, 9.0), pt("2", 3.0, 3.0)],
    );
    reg.register_main_data("map", vec![pt("home", 1.0, 2.0)]);

    let view = compose_map(&reg, "map", &["pubs"], &opts());
    let first = &view.groups[0];
    assert!(first.is_self);
    assert_eq!(first.name, SELF_LAYER);
    assert!(first.visible);
    assert_eq!(first.kind, GroupKind::Feature);
    assert!(first.markers.iter().all(|m| m.open_popup));
    assert_eq!(view.marker("home").unwrap().coord, latlng(1.0, 2.0));

    let pubs = view.group("pubs").unwrap();
    assert!(!pubs.visible);
    assert_eq!(pubs.kind, GroupKind::Cluster);
    assert!(pubs.markers.iter().all(|m| !m.open_popup));

    // The viewport follows the self layer only.
    assert_eq!(
        view.viewport,
        Viewport::Bounds(GeoBounds::from_coord(latlng(1.0, 2.0)))
    );
    // The self layer never appears in the layer switcher.
    assert_eq!(
        view.layer_control,
        vec![LayerControlEntry {
            description: "pubs".to_string(),
            group: 1,
        }]
    );
}

#[test]
fn main_data_of_other_containers_is_not_used() {
    let mut reg = Registry::new();
    reg.register_main_data("other", vec![pt("x", 1.0, 1.0)]);
    let view = compose_map::<&str>(&reg, "map", &[], &opts());
    assert!(view.groups.is_empty());
}

#[test]
fn popups_follow_link_rules() {
    let mut reg = Registry::new();
    reg.register_layer(
        LayerSpec::new("places"),
        vec![
            pt("a", 0.0, 0.0),
            Point::new("b", 0.0, 0.0).with_page("places/new").with_title("New").creating(),
            Point::new("c", 0.0, 0.0).with_page("places/home").with_title("Home"),
        ],
    );
    let view = compose_map(&reg, "map", &["places"], &opts());

    assert_eq!(
        view.marker("a").unwrap().popup_html,
        r#"<b><a href="/wiki/places/a">Place a</a></b>"#
    );

    let create = &view.marker("b").unwrap().popup_html;
    assert!(create.contains(r#"href="/cgi?do=create&amp;page=places/new""#));
    assert!(create.contains(r#"rel="nofollow""#));
    assert!(!create.contains(r#"href="/wiki/places/new""#));

    let own = &view.marker("c").unwrap().popup_html;
    assert!(!own.contains("<a "));
    assert!(own.contains("selflink"));
}

#[test]
fn layer_base_url_overrides_map_base_url() {
    let mut reg = Registry::new();
    reg.register_layer(
        LayerSpec::new("remote").with_base_url("https://other.example/wiki"),
        vec![pt("r", 0.0, 0.0)],
    );
    let view = compose_map(&reg, "map", &["remote"], &opts());
    assert_eq!(
        view.marker("r").unwrap().popup_html,
        r#"<b><a href="https://other.example/wiki/places/r">Place r</a></b>"#
    );
}

#[test]
fn empty_composition_falls_back_to_world_view() {
    let reg = Registry::new();
    let view = compose_map(&reg, "map", &["a", "b"], &opts());
    assert!(view.groups.is_empty());
    assert_eq!(view.marker_count(), 0);
    assert_eq!(view.viewport, Viewport::World);

    let mut reg = Registry::new();
    reg.register_layer(LayerSpec::new("empty"), vec![]);
    reg.register_main_data("map", vec![]);
    let view = compose_map(&reg, "map", &["empty"], &opts());
    assert_eq!(view.groups.len(), 2);
    assert_eq!(view.viewport, Viewport::World);
}

#[test]
fn without_self_layer_viewport_is_union_of_groups() {
    let mut reg = Registry::new();
    reg.register_layer(LayerSpec::new("a"), vec![pt("1", 1.0, 1.0)]);
    reg.register_layer(LayerSpec::new("b").hidden(true), vec![pt("2", -2.0, 5.0)]);
    let view = compose_map(&reg, "map", &["a", "b"], &opts());
    assert_eq!(
        view.viewport,
        Viewport::Bounds(GeoBounds {
            south: -2.0,
            west: 1.0,
            north: 1.0,
            east: 5.0,
        })
    );
}

#[test]
fn empty_self_layer_falls_back_to_other_groups() {
    let mut reg = Registry::new();
    reg.register_main_data("map", vec![]);
    reg.register_layer(LayerSpec::new("a"), vec![pt("1", 4.0, 4.0)]);
    let view = compose_map(&reg, "map", &["a"], &opts());
    assert_eq!(
        view.viewport,
        Viewport::Bounds(GeoBounds::from_coord(latlng(4.0, 4.0)))
    );
}

#[test]
fn duplicate_ids_within_a_layer_keep_the_first() {
    let mut reg = Registry::new();
    reg.register_layer(
        LayerSpec::new("a"),
        vec![pt("1", 1.0, 1.0), pt("1", 2.0, 2.0)],
    );
    let view = compose_map(&reg, "map", &["a"], &opts());
    assert_eq!(view.marker_count(), 1);
    assert_eq!(view.marker("1").unwrap().coord, latlng(1.0, 1.0));
}

#[test]
fn repeated_layer_name_is_composed_once() {
    let mut reg = Registry::new();
    reg.register_layer(LayerSpec::new("a"), vec![pt("1", 1.0, 1.0)]);
    let view = compose_map(&reg, "map", &["a", "a"], &opts());
    assert_eq!(view.groups.len(), 1);
}

#[test]
fn layer_control_uses_descriptions_in_order() {
    let mut reg = Registry::new();
    reg.register_layer(
        LayerSpec::new("pubs").with_description("Pubs"),
        vec![pt("1", 1.0, 1.0)],
    );
    reg.register_layer(LayerSpec::new("shops"), vec![pt("2", 1.0, 1.0)]);
    let view = compose_map(&reg, "map", &["shops", "pubs"], &opts());
    let entries: Vec<_> = view
        .layer_control
        .iter()
        .map(|e| (e.description.as_str(), e.group))
        .collect();
    assert_eq!(entries, vec![("shops", 0), ("Pubs", 1)]);
}

#[test]
fn view_serializes_to_json() {
    let mut reg = Registry::new();
    reg.register_main_data("map", vec![pt("1", 1.0, 2.0)]);
    let view = compose_map::<&str>(&reg, "map", &[], &opts());
    let v = serde_json::to_value(&view).unwrap();
    assert_eq!(v["container"], "map");
    assert_eq!(v["viewport"]["kind"], "bounds");
    assert_eq!(v["viewport"]["south"], 1.0);
    assert_eq!(v["groups"][0]["kind"], "feature");
    assert_eq!(v["groups"][0]["markers"][0]["open_popup"], true);
}
