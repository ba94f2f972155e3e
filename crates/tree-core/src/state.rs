//! Scene state shared between the gesture source, UI controls and animators.
//!
//! These types avoid platform-specific APIs and are used by both the native
//! and web frontends. The store is passed explicitly to whoever needs it;
//! there is no ambient global.

use crate::constants::{CAMERA_FOV_DEG, CAMERA_Z};
use glam::{Mat4, Quat, Vec2, Vec3, Vec4};

/// Flags and hand position read by every animator each tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SceneState {
    pub exploded: bool,
    pub camera_enabled: bool,
    pub hand_open: bool,
    pub hand_closed: bool,
    /// Centre-relative landmark position, roughly in `[-0.5, 0.5]`.
    pub hand_position: Vec2,
}

impl SceneState {
    /// Gesture mode is on and the palm is open.
    pub fn hand_spread(&self) -> bool {
        self.camera_enabled && self.hand_open
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber = Box<dyn FnMut(&SceneState)>;

/// Owner of [`SceneState`] with change notification.
///
/// Subscribers run synchronously after a write that actually changed
/// something; writes that leave the state unchanged are silent.
#[derive(Default)]
pub struct SceneStore {
    state: SceneState,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_id: u64,
}

impl std::fmt::Debug for SceneStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneStore")
            .field("state", &self.state)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl SceneStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn get(&self) -> SceneState {
        self.state
    }

    pub fn subscribe(&mut self, f: impl FnMut(&SceneState) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, Box::new(f)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        before != self.subscribers.len()
    }

    /// Apply `f` to a copy of the state; commit and notify if it changed.
    pub fn update(&mut self, f: impl FnOnce(&mut SceneState)) -> bool {
        let mut next = self.state;
        f(&mut next);
        if next == self.state {
            return false;
        }
        self.state = next;
        for (_, sub) in self.subscribers.iter_mut() {
            sub(&self.state);
        }
        true
    }

    pub fn set_exploded(&mut self, exploded: bool) -> bool {
        self.update(|s| s.exploded = exploded)
    }

    pub fn set_camera_enabled(&mut self, enabled: bool) -> bool {
        let changed = self.update(|s| {
            s.camera_enabled = enabled;
            if !enabled {
                // a stale fist must not survive into the next session
                s.hand_open = false;
                s.hand_closed = false;
            }
        });
        if changed {
            log::info!("[gesture] camera mode {}", if enabled { "on" } else { "off" });
        }
        changed
    }

    pub fn set_hand_open(&mut self, open: bool) -> bool {
        self.update(|s| s.hand_open = open)
    }

    pub fn set_hand_closed(&mut self, closed: bool) -> bool {
        self.update(|s| s.hand_closed = closed)
    }

    pub fn set_hand_position(&mut self, position: Vec2) -> bool {
        self.update(|s| s.hand_position = position)
    }
}

/// Simple right-handed camera description with perspective projection.
#[derive(Clone, Debug)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub aspect: f32,
    pub fovy_radians: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 0.0, CAMERA_Z),
            target: Vec3::ZERO,
            up: Vec3::Y,
            aspect: 16.0 / 9.0,
            fovy_radians: CAMERA_FOV_DEG.to_radians(),
            znear: 0.1,
            zfar: 200.0,
        }
    }
}

impl Camera {
    /// Compute the clip-space projection matrix.
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fovy_radians, self.aspect, self.znear, self.zfar)
    }
    /// Compute the view matrix that transforms world to view space.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// World-space orientation of the camera (looks down its local −Z).
    pub fn orientation(&self) -> Quat {
        Quat::from_mat4(&self.view_matrix().inverse())
    }

    /// Visible (width, height) of a plane `distance` in front of the eye.
    pub fn viewport_at(&self, distance: f32) -> (f32, f32) {
        let h = 2.0 * (self.fovy_radians * 0.5).tan() * distance;
        (h * self.aspect, h)
    }

    /// Project a world point to normalized screen UV (0,0 top-left).
    /// Returns `None` for points behind the camera.
    pub fn project_to_uv(&self, world: Vec3) -> Option<[f32; 2]> {
        let clip = self.view_proj() * Vec4::new(world.x, world.y, world.z, 1.0);
        if clip.w <= 1e-6 {
            return None;
        }
        let ndc = clip.truncate() / clip.w;
        Some([ndc.x * 0.5 + 0.5, 0.5 - ndc.y * 0.5])
    }
}
