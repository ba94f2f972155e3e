// Host-side tests for the view controller.

use glam::Vec2;
use tree_core::{SceneState, ViewConfig, ViewController};

#[test]
fn deadzone_zeroes_small_offsets() {
    let cfg = ViewConfig::default();
    assert_eq!(cfg.target_yaw(0.04), 0.0);
    assert_eq!(cfg.target_yaw(-0.049), 0.0);
}

#[test]
fn half_offset_maps_to_expected_yaw() {
    let yaw = ViewConfig::default().target_yaw(0.5);
    assert!((yaw - -1.2566).abs() < 1e-4, "got {yaw}");
}

#[test]
fn hand_steers_yaw_toward_target() {
    let mut view = ViewController::new(ViewConfig::default());
    let state = SceneState {
        camera_enabled: true,
        hand_position: Vec2::new(0.5, 0.0),
        ..Default::default()
    };
    for _ in 0..600 {
        view.tick(&state, 1.0 / 60.0);
    }
    assert!((view.yaw() - -1.2566).abs() < 1e-3);
    assert!(view.pitch().abs() < 1e-6 && view.roll().abs() < 1e-6);
}

#[test]
fn auto_rotate_advances_when_gesture_mode_is_off() {
    let mut view = ViewController::new(ViewConfig::default());
    view.tick(&SceneState::default(), 1.0);
    assert!((view.yaw() - 0.1).abs() < 1e-6);
}

#[test]
fn gesture_takeover_unwinds_less_than_half_a_turn() {
    use std::f32::consts::{PI, TAU};
    let mut view = ViewController::new(ViewConfig::default());
    for _ in 0..600 {
        view.tick(&SceneState::default(), 0.1);
    }
    let before = view.yaw();
    assert!((before - (6.0 - TAU)).abs() < 1e-3, "got {before}");

    let steering = SceneState {
        camera_enabled: true,
        ..Default::default()
    };
    view.tick(&steering, 1.0 / 60.0);
    assert!(view.yaw() > before && view.yaw() < 0.0);
    assert!(before.abs() < PI);
}
