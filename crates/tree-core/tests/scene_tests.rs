// Host-side tests driving the whole scene the way a frame loop does.

use chrono::{TimeZone, Utc};
use glam::{Mat4, Vec2, Vec4};
use std::collections::BTreeMap;
use tree_core::{
    GalleryFocus, InstanceSink, InstanceTransform, LayerId, SceneConfig, SceneState, Scene,
    WishDraft,
};

#[derive(Default)]
struct Recorder {
    counts: BTreeMap<LayerId, usize>,
    colored: BTreeMap<LayerId, usize>,
}

impl InstanceSink for Recorder {
    fn write_layer(
        &mut self,
        layer: LayerId,
        _model: Mat4,
        transforms: &[InstanceTransform],
        colors: Option<&[Vec4]>,
    ) {
        self.counts.insert(layer, transforms.len());
        if let Some(c) = colors {
            assert_eq!(c.len(), transforms.len());
            *self.colored.entry(layer).or_default() += 1;
        }
    }
}

fn small_scene() -> Scene {
    Scene::new(SceneConfig::default().thinned(50)).unwrap()
}

#[test]
fn every_layer_is_emitted() {
    let mut scene = small_scene();
    let mut sink = Recorder::default();
    scene.tick(&SceneState::default(), 1.0 / 60.0);
    scene.emit(&mut sink);
    for id in [
        LayerId::Deep,
        LayerId::Shine,
        LayerId::Glow,
        LayerId::Ribbon,
        LayerId::Gems,
        LayerId::Topper,
        LayerId::Sparkles,
        LayerId::Snow,
        LayerId::Photos,
        LayerId::Wishes,
    ] {
        assert!(sink.counts.contains_key(&id), "{id:?} missing");
    }
    assert_eq!(sink.counts[&LayerId::Photos], 9);
    assert_eq!(sink.counts[&LayerId::Wishes], 0);

    // static layers send colors once, photo tints every frame
    scene.emit(&mut sink);
    assert_eq!(sink.colored[&LayerId::Deep], 1);
    assert_eq!(sink.colored[&LayerId::Photos], 2);
}

#[test]
fn layers_converge_to_dispersed_and_back() {
    let mut scene = small_scene();
    let exploded = SceneState {
        exploded: true,
        ..Default::default()
    };
    for _ in 0..600 {
        scene.tick(&exploded, 1.0 / 60.0);
    }
    assert!(scene.layers().iter().all(|l| l.factor() > 0.999));
    for _ in 0..600 {
        scene.tick(&SceneState::default(), 1.0 / 60.0);
    }
    assert!(scene.layers().iter().all(|l| l.factor() < 0.001));
}

#[test]
fn grabbing_focuses_a_photo() {
    let mut scene = small_scene();
    let state = SceneState {
        exploded: true,
        camera_enabled: true,
        hand_closed: true,
        hand_open: false,
        hand_position: Vec2::ZERO,
    };
    for _ in 0..30 {
        scene.tick(&state, 1.0 / 60.0);
    }
    assert!(matches!(scene.focus(), GalleryFocus::Focused(_)));
}

#[test]
fn wishes_join_the_orbit() {
    let mut scene = small_scene();
    for i in 0..12 {
        let at = Utc.timestamp_millis_opt(1_700_000_000_000 + i).unwrap();
        let w = WishDraft::new(&format!("guest{i}"), "joy").unwrap().into_synthetic(at);
        scene.wishes_mut().add(w);
    }
    scene.tick(&SceneState::default(), 1.0 / 60.0);
    assert_eq!(scene.wish_positions().len(), 10);
    let mut sink = Recorder::default();
    scene.emit(&mut sink);
    assert_eq!(sink.counts[&LayerId::Wishes], 10);
}

#[test]
fn non_finite_dt_is_a_zero_step() {
    let mut scene = small_scene();
    scene.tick(&SceneState::default(), 0.05);
    let before = scene.elapsed();
    for dt in [f32::NAN, f32::INFINITY, f32::NEG_INFINITY] {
        scene.tick(&SceneState::default(), dt);
    }
    assert_eq!(scene.elapsed(), before);
    scene.tick(&SceneState::default(), 0.05);
    assert!((scene.elapsed() - 0.1).abs() < 1e-6);
    assert!(scene
        .frames()
        .transforms()
        .iter()
        .all(|t| t.position().is_finite()));
}
