//! Gesture vocabulary, recognizer readings and the bindings that turn them
//! into scene state changes.

use crate::constants::{HAND_LANDMARK_INDEX, INFERENCE_INTERVAL_MS};
use crate::error::{check_window, SceneResult};
use crate::state::SceneStore;
use glam::Vec2;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

/// Labels produced by the hand gesture recognizer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gesture {
    None,
    ClosedFist,
    OpenPalm,
    PointingUp,
    ThumbDown,
    ThumbUp,
    Victory,
    ILoveYou,
    Other,
}

impl Gesture {
    pub fn from_label(label: &str) -> Self {
        match label {
            "None" => Gesture::None,
            "Closed_Fist" => Gesture::ClosedFist,
            "Open_Palm" => Gesture::OpenPalm,
            "Pointing_Up" => Gesture::PointingUp,
            "Thumb_Down" => Gesture::ThumbDown,
            "Thumb_Up" => Gesture::ThumbUp,
            "Victory" => Gesture::Victory,
            "ILoveYou" => Gesture::ILoveYou,
            _ => Gesture::Other,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Gesture::None => "None",
            Gesture::ClosedFist => "Closed_Fist",
            Gesture::OpenPalm => "Open_Palm",
            Gesture::PointingUp => "Pointing_Up",
            Gesture::ThumbDown => "Thumb_Down",
            Gesture::ThumbUp => "Thumb_Up",
            Gesture::Victory => "Victory",
            Gesture::ILoveYou => "ILoveYou",
            Gesture::Other => "Other",
        }
    }
}

impl fmt::Display for Gesture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub gesture: Gesture,
    pub score: f32,
}

/// One recognizer result for the first detected hand.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GestureReading {
    /// Ranked best first.
    pub categories: SmallVec<[Category; 4]>,
    /// Normalized image-space landmarks, `[0, 1]` on both axes.
    pub landmarks: Vec<Vec2>,
}

impl GestureReading {
    /// Reading with a single category and only the tracked landmark filled in.
    pub fn single(gesture: Gesture, landmark: Vec2) -> Self {
        let mut landmarks = vec![Vec2::splat(0.5); HAND_LANDMARK_INDEX + 1];
        landmarks[HAND_LANDMARK_INDEX] = landmark;
        let mut categories = SmallVec::new();
        categories.push(Category {
            gesture,
            score: 1.0,
        });
        Self {
            categories,
            landmarks,
        }
    }

    pub fn top(&self) -> Option<Gesture> {
        self.categories.first().map(|c| c.gesture)
    }

    /// Tracked palm point made centre-relative (`x − 0.5`, `y − 0.5`).
    pub fn hand_position(&self) -> Option<Vec2> {
        self.landmarks
            .get(HAND_LANDMARK_INDEX)
            .map(|p| *p - Vec2::splat(0.5))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GestureAction {
    /// Disperse the tree and mark the hand open.
    Explode,
    /// Mark the hand closed; used to grab a photo while dispersed.
    Grab,
    /// Gather back into the tree and clear the hand flags.
    Gather,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GestureBindings {
    pub bindings: Vec<(Gesture, GestureAction)>,
}

impl Default for GestureBindings {
    fn default() -> Self {
        Self {
            bindings: vec![
                (Gesture::OpenPalm, GestureAction::Explode),
                (Gesture::ClosedFist, GestureAction::Grab),
                (Gesture::Victory, GestureAction::Gather),
            ],
        }
    }
}

impl GestureBindings {
    pub fn action_for(&self, gesture: Gesture) -> Option<GestureAction> {
        self.bindings
            .iter()
            .find(|(g, _)| *g == gesture)
            .map(|(_, a)| *a)
    }

    /// Apply a recognizer reading to the store. Unbound labels leave the flags
    /// untouched but still update the hand position.
    pub fn apply(&self, reading: &GestureReading, store: &mut SceneStore) -> Option<GestureAction> {
        let action = reading.top().and_then(|g| self.action_for(g));
        if let Some(action) = action {
            store.update(|s| match action {
                GestureAction::Explode => {
                    s.exploded = true;
                    s.hand_open = true;
                    s.hand_closed = false;
                }
                GestureAction::Grab => {
                    s.hand_open = false;
                    s.hand_closed = true;
                }
                GestureAction::Gather => {
                    s.exploded = false;
                    s.hand_open = false;
                    s.hand_closed = false;
                }
            });
        }
        if let Some(p) = reading.hand_position() {
            store.set_hand_position(p);
        }
        action
    }
}

/// Lets an inference through at most once per interval.
#[derive(Clone, Debug)]
pub struct InferenceThrottle {
    interval_ms: f64,
    last_ms: Option<f64>,
}

impl Default for InferenceThrottle {
    fn default() -> Self {
        Self {
            interval_ms: INFERENCE_INTERVAL_MS,
            last_ms: None,
        }
    }
}

impl InferenceThrottle {
    pub fn new(interval_ms: f64) -> SceneResult<Self> {
        check_window("inference_interval", interval_ms as f32)?;
        Ok(Self {
            interval_ms,
            last_ms: None,
        })
    }

    /// True if an inference may run at `now_ms`; records it as the last run.
    /// A clock that steps backwards restarts the spacing.
    pub fn ready(&mut self, now_ms: f64) -> bool {
        match self.last_ms {
            Some(last) if now_ms >= last && now_ms - last < self.interval_ms => false,
            _ => {
                self.last_ms = Some(now_ms);
                true
            }
        }
    }

    pub fn reset(&mut self) {
        self.last_ms = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_labels_map_to_other() {
        assert_eq!(Gesture::from_label("Open_Palm"), Gesture::OpenPalm);
        assert_eq!(Gesture::from_label("Wave"), Gesture::Other);
        assert_eq!(Gesture::from_label(Gesture::ILoveYou.label()), Gesture::ILoveYou);
    }

    #[test]
    fn throttle_spacing() {
        let mut t = InferenceThrottle::default();
        assert!(t.ready(0.0));
        assert!(!t.ready(50.0));
        assert!(t.ready(100.0));
        assert!(!t.ready(199.0));
    }

    #[test]
    fn throttle_survives_a_clock_stepping_back() {
        let mut t = InferenceThrottle::default();
        assert!(t.ready(60_000.0));
        assert!(t.ready(1_000.0));
        assert!(!t.ready(1_050.0));
        assert!(t.ready(1_100.0));
    }
}
