// Host-side tests for the photo queue and the debounced focus state machine.

use glam::{Mat4, Vec2};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tree_core::gallery::{dispersed_pose, focused_pose, rest_pose};
use tree_core::{
    Camera, Gallery, GalleryConfig, GalleryFocus, GalleryQueue, PhotoFrames, SceneState, SceneStore,
};

fn armed(closed: bool) -> SceneState {
    SceneState {
        exploded: true,
        camera_enabled: true,
        hand_open: false,
        hand_closed: closed,
        hand_position: Vec2::ZERO,
    }
}

#[test]
fn nine_dequeues_are_a_permutation_then_reshuffle() {
    let mut q = GalleryQueue::new(9, StdRng::seed_from_u64(11)).unwrap();
    let mut first: Vec<usize> = (0..9).map(|_| q.next()).collect();
    assert_eq!(q.remaining(), 0);
    first.sort_unstable();
    assert_eq!(first, (0..9).collect::<Vec<_>>());
    q.next();
    assert_eq!(q.remaining(), 8);
}

#[test]
fn every_cycle_is_a_permutation() {
    for seed in 0..20u64 {
        let mut q = GalleryQueue::new(9, StdRng::seed_from_u64(seed)).unwrap();
        for _ in 0..5 {
            let mut cycle: Vec<usize> = (0..9).map(|_| q.next()).collect();
            cycle.sort_unstable();
            assert_eq!(cycle, (0..9).collect::<Vec<_>>());
        }
    }
}

#[test]
fn flicker_faster_than_window_never_focuses() {
    let mut g = Gallery::new(&GalleryConfig::default(), StdRng::seed_from_u64(1)).unwrap();
    for i in 0..200 {
        // toggles every 50 ms
        let closed = (i / 3) % 2 == 0;
        assert_eq!(g.tick(&armed(closed), 1.0 / 60.0), GalleryFocus::Idle);
    }
}

#[test]
fn steady_hold_focuses_exactly_once() {
    let mut g = Gallery::new(&GalleryConfig::default(), StdRng::seed_from_u64(2)).unwrap();
    let mut transitions = 0;
    let mut last = g.focus();
    for _ in 0..120 {
        let now = g.tick(&armed(true), 1.0 / 60.0);
        if now != last {
            transitions += 1;
        }
        last = now;
    }
    assert_eq!(transitions, 1);
    assert!(matches!(last, GalleryFocus::Focused(_)));
    assert_eq!(g.queue().remaining(), 8);
}

#[test]
fn release_after_window_unfocuses() {
    let mut g = Gallery::new(&GalleryConfig::default(), StdRng::seed_from_u64(3)).unwrap();
    for _ in 0..20 {
        g.tick(&armed(true), 1.0 / 60.0);
    }
    assert!(g.focus().index().is_some());
    // a brief release is ignored
    for _ in 0..3 {
        g.tick(&armed(false), 1.0 / 60.0);
    }
    g.tick(&armed(true), 1.0 / 60.0);
    assert!(g.focus().index().is_some());
    for _ in 0..20 {
        g.tick(&armed(false), 1.0 / 60.0);
    }
    assert_eq!(g.focus(), GalleryFocus::Idle);
}

#[test]
fn gathering_forces_idle_without_debounce() {
    let mut g = Gallery::new(&GalleryConfig::default(), StdRng::seed_from_u64(4)).unwrap();
    for _ in 0..20 {
        g.tick(&armed(true), 1.0 / 60.0);
    }
    let mut gathered = armed(true);
    gathered.exploded = false;
    assert_eq!(g.tick(&gathered, 0.0), GalleryFocus::Idle);
}

#[test]
fn no_focus_without_gesture_mode() {
    let mut g = Gallery::new(&GalleryConfig::default(), StdRng::seed_from_u64(5)).unwrap();
    let mut s = armed(true);
    s.camera_enabled = false;
    for _ in 0..60 {
        assert_eq!(g.tick(&s, 1.0 / 60.0), GalleryFocus::Idle);
    }
}

#[test]
fn switching_gesture_mode_off_releases_and_resets_debounce() {
    let mut store = SceneStore::new();
    store.set_exploded(true);
    store.set_camera_enabled(true);
    store.set_hand_closed(true);
    let mut g = Gallery::new(&GalleryConfig::default(), StdRng::seed_from_u64(6)).unwrap();
    for _ in 0..20 {
        g.tick(&store.get(), 1.0 / 60.0);
    }
    assert!(g.focus().index().is_some());

    store.set_camera_enabled(false);
    assert_eq!(g.tick(&store.get(), 1.0 / 60.0), GalleryFocus::Idle);

    // the hold before the switch does not count toward the next window
    store.set_camera_enabled(true);
    store.set_hand_closed(true);
    for _ in 0..3 {
        assert_eq!(g.tick(&store.get(), 1.0 / 60.0), GalleryFocus::Idle);
    }
    for _ in 0..10 {
        g.tick(&store.get(), 1.0 / 60.0);
    }
    assert!(g.focus().index().is_some());
}

const DT: f32 = 1.0 / 60.0;

fn run_frames(frames: &mut PhotoFrames, focus: GalleryFocus, steps: usize) {
    let camera = Camera::default();
    for step in 0..steps {
        frames.tick(&armed(true), focus, &camera, Mat4::IDENTITY, step as f32 * DT, DT);
    }
}

#[test]
fn focused_frame_settles_in_front_of_the_camera() {
    let cfg = GalleryConfig::default();
    let mut frames = PhotoFrames::new(cfg.clone(), Mat4::IDENTITY);
    run_frames(&mut frames, GalleryFocus::Focused(2), 300);

    let (position, _, scale) = focused_pose(&Camera::default(), cfg.focus_distance, cfg.focus_fill);
    let t = frames.transforms()[2];
    assert!((t.position() - position).length() < 1e-3, "{:?}", t.position());
    assert!((t.scale - scale).abs() < 1e-3);
}

#[test]
fn focused_frame_moves_at_twice_the_rate_of_the_rest() {
    let cfg = GalleryConfig::default();
    let total = cfg.photo_count;
    let camera = Camera::default();
    let mut frames = PhotoFrames::new(cfg.clone(), Mat4::IDENTITY);
    frames.tick(&armed(true), GalleryFocus::Focused(2), &camera, Mat4::IDENTITY, 0.0, DT);

    let remaining = |start: glam::Vec3, target: glam::Vec3, now: glam::Vec3| {
        (now - target).length() / (start - target).length()
    };
    let (focus_target, _, _) = focused_pose(&camera, cfg.focus_distance, cfg.focus_fill);
    let focused = remaining(
        rest_pose(2, total).0,
        focus_target,
        frames.transforms()[2].position(),
    );
    let other = remaining(
        rest_pose(5, total).0,
        dispersed_pose(5, 0.0).0,
        frames.transforms()[5].position(),
    );
    assert!((focused - (-cfg.focus_rate * DT).exp()).abs() < 1e-4, "focused {focused}");
    assert!((other - (-cfg.move_rate * DT).exp()).abs() < 1e-4, "other {other}");
}

#[test]
fn focused_frame_is_tinted_brighter() {
    let mut frames = PhotoFrames::new(GalleryConfig::default(), Mat4::IDENTITY);
    run_frames(&mut frames, GalleryFocus::Focused(4), 300);

    let colors = frames.colors();
    let lit = colors[4];
    assert_eq!(lit.w, 1.5);
    for (i, c) in colors.iter().enumerate().filter(|(i, _)| *i != 4) {
        assert_eq!(c.w, 1.0, "frame {i}");
        assert!(lit.truncate().min_element() > c.truncate().max_element(), "frame {i}");
    }
}
