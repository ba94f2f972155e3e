//! Keyboard stand-in for the camera recognizer.
//!
//! Held keys play the role of a held hand pose and the cursor plays the palm
//! landmark. Readings go through the same throttle and bindings as camera
//! readings, so the scene cannot tell the difference.

use glam::Vec2;
use tree_core::{
    Gesture, GestureAction, GestureBindings, GestureReading, InferenceThrottle, SceneStore,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimKey {
    ToggleGestures,
    OpenPalm,
    ClosedFist,
    Victory,
    ToggleExplode,
    Quit,
}

impl SimKey {
    fn pose(self) -> Option<Gesture> {
        match self {
            SimKey::OpenPalm => Some(Gesture::OpenPalm),
            SimKey::ClosedFist => Some(Gesture::ClosedFist),
            SimKey::Victory => Some(Gesture::Victory),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimOutcome {
    Continue,
    Quit,
}

pub struct KeyboardGestures {
    bindings: GestureBindings,
    throttle: InferenceThrottle,
    held: Gesture,
    /// Cursor position in normalized window coordinates.
    cursor: Vec2,
}

impl KeyboardGestures {
    pub fn new(bindings: GestureBindings) -> Self {
        Self {
            bindings,
            throttle: InferenceThrottle::default(),
            held: Gesture::None,
            cursor: Vec2::splat(0.5),
        }
    }

    pub fn held(&self) -> Gesture {
        self.held
    }

    pub fn set_cursor(&mut self, uv: Vec2) {
        self.cursor = uv.clamp(Vec2::ZERO, Vec2::ONE);
    }

    pub fn press(&mut self, key: SimKey, store: &mut SceneStore) -> SimOutcome {
        if let Some(pose) = key.pose() {
            self.held = pose;
            return SimOutcome::Continue;
        }
        match key {
            SimKey::ToggleGestures => {
                let enable = !store.get().camera_enabled;
                store.set_camera_enabled(enable);
                self.throttle.reset();
                self.held = Gesture::None;
            }
            SimKey::ToggleExplode => {
                let exploded = !store.get().exploded;
                store.set_exploded(exploded);
            }
            SimKey::Quit => return SimOutcome::Quit,
            _ => {}
        }
        SimOutcome::Continue
    }

    pub fn release(&mut self, key: SimKey) {
        if key.pose() == Some(self.held) {
            self.held = Gesture::None;
        }
    }

    /// Run one simulated inference if gesture mode is on and the throttle allows.
    pub fn poll(&mut self, now_ms: f64, store: &mut SceneStore) -> Option<GestureAction> {
        if !store.get().camera_enabled || !self.throttle.ready(now_ms) {
            return None;
        }
        let reading = GestureReading::single(self.held, self.cursor);
        self.bindings.apply(&reading, store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn poses_only_count_in_gesture_mode() {
        let mut store = SceneStore::new();
        let mut sim = KeyboardGestures::new(GestureBindings::default());
        sim.press(SimKey::OpenPalm, &mut store);
        assert_eq!(sim.poll(0.0, &mut store), None);
        assert!(!store.get().exploded);

        sim.press(SimKey::ToggleGestures, &mut store);
        sim.press(SimKey::OpenPalm, &mut store);
        assert_eq!(sim.poll(0.0, &mut store), Some(GestureAction::Explode));
        assert!(store.get().exploded && store.get().hand_open);
    }

    #[test]
    fn polls_are_throttled() {
        let mut store = SceneStore::new();
        let mut sim = KeyboardGestures::new(GestureBindings::default());
        sim.press(SimKey::ToggleGestures, &mut store);
        sim.press(SimKey::ClosedFist, &mut store);
        assert!(sim.poll(0.0, &mut store).is_some());
        assert!(sim.poll(50.0, &mut store).is_none());
        assert!(sim.poll(100.0, &mut store).is_some());
    }

    #[test]
    fn cursor_becomes_hand_position() {
        let mut store = SceneStore::new();
        let mut sim = KeyboardGestures::new(GestureBindings::default());
        sim.press(SimKey::ToggleGestures, &mut store);
        sim.set_cursor(Vec2::new(1.0, 0.25));
        sim.poll(0.0, &mut store);
        let p = store.get().hand_position;
        assert!((p.x - 0.5).abs() < 1e-6 && (p.y + 0.25).abs() < 1e-6);
    }

    #[test]
    fn releasing_the_held_key_clears_the_pose() {
        let mut store = SceneStore::new();
        let mut sim = KeyboardGestures::new(GestureBindings::default());
        sim.press(SimKey::ClosedFist, &mut store);
        sim.release(SimKey::OpenPalm);
        assert_eq!(sim.held(), Gesture::ClosedFist);
        sim.release(SimKey::ClosedFist);
        assert_eq!(sim.held(), Gesture::None);
    }

    #[test]
    fn space_and_escape() {
        let mut store = SceneStore::new();
        let mut sim = KeyboardGestures::new(GestureBindings::default());
        assert_eq!(sim.press(SimKey::ToggleExplode, &mut store), SimOutcome::Continue);
        assert!(store.get().exploded);
        assert_eq!(sim.press(SimKey::Quit, &mut store), SimOutcome::Quit);
    }
}
