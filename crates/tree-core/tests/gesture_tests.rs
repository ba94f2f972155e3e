// Host-side tests for gesture bindings against the scene store.

use glam::Vec2;
use tree_core::{Gesture, GestureAction, GestureBindings, GestureReading, SceneStore};

#[test]
fn open_palm_explodes_and_publishes_position() {
    let mut store = SceneStore::new();
    store.set_camera_enabled(true);
    let reading = GestureReading::single(Gesture::OpenPalm, Vec2::new(0.8, 0.25));
    let action = GestureBindings::default().apply(&reading, &mut store);
    assert_eq!(action, Some(GestureAction::Explode));
    let s = store.get();
    assert!(s.exploded && s.hand_open && !s.hand_closed);
    assert!((s.hand_position - Vec2::new(0.3, -0.25)).length() < 1e-6);
}

#[test]
fn fist_grabs_without_gathering() {
    let mut store = SceneStore::new();
    let b = GestureBindings::default();
    b.apply(&GestureReading::single(Gesture::OpenPalm, Vec2::splat(0.5)), &mut store);
    b.apply(&GestureReading::single(Gesture::ClosedFist, Vec2::splat(0.5)), &mut store);
    let s = store.get();
    assert!(s.exploded && s.hand_closed && !s.hand_open);
}

#[test]
fn victory_gathers() {
    let mut store = SceneStore::new();
    let b = GestureBindings::default();
    b.apply(&GestureReading::single(Gesture::OpenPalm, Vec2::splat(0.5)), &mut store);
    b.apply(&GestureReading::single(Gesture::Victory, Vec2::splat(0.5)), &mut store);
    assert!(!store.get().exploded);
}

#[test]
fn unbound_label_keeps_flags() {
    let mut store = SceneStore::new();
    let b = GestureBindings::default();
    b.apply(&GestureReading::single(Gesture::OpenPalm, Vec2::splat(0.5)), &mut store);
    let before = store.get();
    let action = b.apply(&GestureReading::single(Gesture::ThumbUp, Vec2::splat(0.5)), &mut store);
    assert_eq!(action, None);
    assert_eq!(store.get(), before);
}

#[test]
fn empty_reading_changes_nothing() {
    let mut store = SceneStore::new();
    let action = GestureBindings::default().apply(&GestureReading::default(), &mut store);
    assert_eq!(action, None);
    assert_eq!(store.get(), Default::default());
}
