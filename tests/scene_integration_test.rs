use portal_room::{
    Color, PortalError,
    bindings::{self, BAKED_NODE, LAMP_A_NODE, LAMP_B_NODE, PORTAL_LIGHT_NODE},
    debug_panel::{DebugPanel, PORTAL_COLOR_START},
    materials::{Material, MaterialRole, UniformValue},
    particles,
};

use crate::common::test_utils::{model, state};

mod common;

#[test]
fn resize_updates_camera_and_particle_pixel_ratio() {
    let mut app = state();
    let outcome = app.on_resize(800.0, 600.0, 2.0);

    assert!((app.camera.projection.aspect() - 800.0 / 600.0).abs() < 1e-6);
    assert_eq!(app.materials.particle_material().pixel_ratio(), 2.0);
    // The renderer itself is held to the logical size after a resize.
    assert_eq!(outcome.render_size, [800, 600]);
    assert_eq!(outcome.render_pixel_ratio, 1.0);
}

#[test]
fn repeated_resize_is_idempotent() {
    let mut app = state();
    let first = app.on_resize(1280.0, 720.0, 3.0);
    let material = app.materials.particle_material().clone();
    let aspect = app.camera.projection.aspect();

    let second = app.on_resize(1280.0, 720.0, 3.0);
    assert_eq!(first, second);
    assert_eq!(app.materials.particle_material(), &material);
    assert_eq!(app.camera.projection.aspect(), aspect);
    assert_eq!(material.pixel_ratio(), 2.0);
}

#[test]
fn portal_colour_start_from_the_debug_panel() {
    let mut app = state();
    let mut panel = DebugPanel::portal_room(&app.settings);
    panel.set_color(&mut app, PORTAL_COLOR_START, "#ff0000").unwrap();

    assert_eq!(app.materials.portal_material().color_start().to_rgb8(), [255, 0, 0]);
    assert_eq!(
        app.materials
            .get(app.materials.portal())
            .uniform("uColorStart"),
        Some(UniformValue::Color(Color::from_rgb8(255, 0, 0)))
    );
}

#[test]
fn portal_light_shares_the_portal_material() {
    let mut app = state();
    app.attach_model(model(&[
        BAKED_NODE,
        PORTAL_LIGHT_NODE,
        LAMP_A_NODE,
        LAMP_B_NODE,
        "floor",
    ]))
    .unwrap();
    let room = app.model.as_ref().unwrap();
    let portal_light = room.child(PORTAL_LIGHT_NODE).unwrap().material.unwrap();
    assert_eq!(room.child(LAMP_A_NODE).unwrap().material, room.child(LAMP_B_NODE).unwrap().material);
    assert_eq!(room.child("floor").unwrap().material, None);

    let picked = Color::from_rgb8(0x3a, 0xc0, 0x9e);
    app.materials.set_portal_color_start(picked);

    let color_start = |id| match app.materials.get(id) {
        Material::Portal(portal) => portal.color_start(),
        other => panic!("expected the portal material, found {:?}", other.role()),
    };

    assert_eq!(color_start(app.materials.portal()), picked);
    assert_eq!(color_start(portal_light), picked);
    assert_eq!(app.materials.get(portal_light).role(), MaterialRole::Portal);
}

#[test]
fn model_without_second_lamp_is_rejected() {
    let mut app = state();
    let err = app
        .attach_model(model(&[BAKED_NODE, PORTAL_LIGHT_NODE, LAMP_A_NODE]))
        .unwrap_err();
    assert!(matches!(err, PortalError::MissingNode(name) if name == LAMP_B_NODE));
    assert!(app.model.is_none());

    let mut partial = model(&[BAKED_NODE, PORTAL_LIGHT_NODE, LAMP_A_NODE]);
    assert!(bindings::on_model_loaded(&mut partial, &app.materials).is_err());
    assert!(partial.children.iter().all(|child| child.material.is_none()));
}

#[test]
fn thirty_fireflies_by_default() {
    let field = particles::generate(30);
    assert_eq!(field.position_floats().len(), 90);
    assert_eq!(field.scales.len(), 30);
    assert!(field.positions.iter().all(|[x, y, z]| {
        (-2.0..=2.0).contains(x) && (0.0..=1.5).contains(y) && (-2.0..=2.0).contains(z)
    }));
    assert!(field.scales.iter().all(|s| (0.0..1.0).contains(s)));
}
