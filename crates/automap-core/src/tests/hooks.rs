use crate::*;
use std::cell::RefCell;

#[test]
fn layer_hooks_run_before_map_hooks() {
    let log = RefCell::new(Vec::new());
    let mut session = PageSession::new();

    // Registered in the "wrong" order on purpose: the page template emits maps first.
    session.on_maps(|ctx| {
        log.borrow_mut().push("maps");
        ctx.create_map("map", &["pubs"], &ComposeOptions::default());
        Ok(())
    });
    session.on_map_layers(|ctx| {
        log.borrow_mut().push("map_layers");
        ctx.registry
            .register_layer(LayerSpec::new("pubs"), vec![Point::new("1", 1.0, 1.0)]);
        Ok(())
    });

    let ctx = session.on_load().unwrap();
    assert_eq!(ctx.map("map").unwrap().marker_count(), 1);
    assert_eq!(*log.borrow(), vec!["map_layers", "maps"]);

    // A second load is a no-op.
    session.on_load().unwrap();
    assert_eq!(log.borrow().len(), 2);
}

#[test]
fn run_hooks_drains_in_registration_order() {
    let mut hooks: Hooks<'_, Vec<u32>> = Hooks::new();
    hooks.hook("x", |v| {
        v.push(1);
        Ok(())
    });
    hooks.hook("x", |v| {
        v.push(2);
        Ok(())
    });
    hooks.hook("y", |v| {
        v.push(9);
        Ok(())
    });
    assert_eq!(hooks.pending("x"), 2);

    let mut out = Vec::new();
    assert_eq!(hooks.run_hooks("x", &mut out).unwrap(), 2);
    assert_eq!(out, vec![1, 2]);
    assert_eq!(hooks.pending("x"), 0);
    assert_eq!(hooks.run_hooks("x", &mut out).unwrap(), 0);
    assert_eq!(hooks.run_hooks("nothing", &mut out).unwrap(), 0);
    assert_eq!(hooks.pending("y"), 1);
}

#[test]
fn hook_error_stops_the_run() {
    let mut hooks: Hooks<'_, Vec<u32>> = Hooks::new();
    hooks.hook("x", |_| {
        Err(Error::Manifest {
            message: "boom".to_string(),
        })
    });
    hooks.hook("x", |v| {
        v.push(1);
        Ok(())
    });
    let mut out = Vec::new();
    assert!(hooks.run_hooks("x", &mut out).is_err());
    assert!(out.is_empty());
}

#[test]
fn create_map_replaces_previous_view_for_container() {
    let mut reg = Registry::new();
    reg.register_layer(LayerSpec::new("a"), vec![Point::new("1", 0.0, 0.0)]);
    let mut ctx = PageContext::new(reg);
    ctx.create_map::<&str>("map", &[], &ComposeOptions::default());
    assert_eq!(ctx.map("map").unwrap().groups.len(), 0);
    ctx.create_map("map", &["a"], &ComposeOptions::default());
    assert_eq!(ctx.maps().count(), 1);
    assert_eq!(ctx.map("map").unwrap().groups.len(), 1);
}
