use portal_room::frame::{FrameLoop, FrameState};

use crate::common::test_utils::{ManualClock, RecordingHost, state};

mod common;

#[test]
fn time_uniforms_follow_the_clock_exactly() {
    let mut app = state();
    let mut frame_loop = FrameLoop::with_clock(ManualClock::default());
    let mut host = RecordingHost::default();

    for t in [0.25, 1.5, 7.125] {
        frame_loop.clock().set(t);
        let rendered_at = frame_loop.tick(&mut app, &mut host).unwrap();
        assert_eq!(rendered_at, t);
    }

    assert_eq!(host.rendered, [(0.25, 0.25), (1.5, 1.5), (7.125, 7.125)]);
    assert_eq!(host.requested, 3);
    assert_eq!(frame_loop.frames(), 3);
    assert_eq!(frame_loop.state(), FrameState::Idle);
}

#[test]
fn tick_steps_the_orbit_camera() {
    let mut app = state();
    let start = app.camera.camera.position;
    app.camera.controls.handle_drag(120.0, 0.0, 768.0);

    let mut frame_loop = FrameLoop::with_clock(ManualClock::default());
    let mut host = RecordingHost::default();
    frame_loop.tick(&mut app, &mut host).unwrap();
    let after_one = app.camera.camera.position;
    assert_ne!(after_one, start);

    // Damping keeps the camera moving on later frames without new input.
    frame_loop.tick(&mut app, &mut host).unwrap();
    assert_ne!(app.camera.camera.position, after_one);
}

#[test]
fn every_tick_bumps_the_animated_material_revisions() {
    let mut app = state();
    let portal = app.materials.portal();
    let lamp = app.materials.lamp();
    let (portal_before, lamp_before) = (app.materials.revision(portal), app.materials.revision(lamp));

    let mut frame_loop = FrameLoop::with_clock(ManualClock::default());
    frame_loop
        .tick(&mut app, &mut RecordingHost::default())
        .unwrap();

    assert!(app.materials.revision(portal) > portal_before);
    assert_eq!(app.materials.revision(lamp), lamp_before);
}
