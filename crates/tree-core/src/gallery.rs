//! Photo gallery: shuffled queue, debounced grab detection and frame poses.

use crate::constants::*;
use crate::damping::{damp, damp_quat, damp_vec3};
use crate::error::{check_rate, check_window, SceneError, SceneResult};
use crate::layer::{InstanceSink, InstanceTransform, LayerId};
use crate::state::{Camera, SceneState};
use glam::{Mat3, Mat4, Quat, Vec3, Vec4};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::VecDeque;
use std::f32::consts::TAU;

/// Photo indices handed out one at a time; every index appears once per cycle.
#[derive(Clone, Debug)]
pub struct GalleryQueue<R> {
    len: usize,
    queue: VecDeque<usize>,
    rng: R,
}

impl<R: Rng> GalleryQueue<R> {
    pub fn new(len: usize, rng: R) -> SceneResult<Self> {
        if len == 0 {
            return Err(SceneError::EmptyGallery);
        }
        Ok(Self {
            len,
            queue: VecDeque::with_capacity(len),
            rng,
        })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Indices left in the current cycle.
    pub fn remaining(&self) -> usize {
        self.queue.len()
    }

    pub fn next(&mut self) -> usize {
        if self.queue.is_empty() {
            let mut fresh: Vec<usize> = (0..self.len).collect();
            fresh.shuffle(&mut self.rng);
            self.queue.extend(fresh);
            log::debug!("[gallery] reshuffled {} photos", self.len);
        }
        // refilled above, never empty here
        self.queue.pop_front().unwrap_or(0)
    }
}

/// Reports a boolean only after it has held steady for longer than `window`.
#[derive(Clone, Debug)]
pub struct Debouncer {
    window: f32,
    last: bool,
    held: f32,
}

impl Debouncer {
    pub fn new(window: f32) -> SceneResult<Self> {
        Ok(Self {
            window: check_window("debounce", window)?,
            last: false,
            held: 0.0,
        })
    }

    /// Feed the raw value for this frame; returns it once it has settled.
    pub fn update(&mut self, raw: bool, dt: f32) -> Option<bool> {
        if raw != self.last {
            self.last = raw;
            self.held = 0.0;
        } else {
            self.held += dt.max(0.0);
        }
        (self.held > self.window).then_some(raw)
    }

    pub fn reset(&mut self) {
        self.last = false;
        self.held = 0.0;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GalleryFocus {
    Idle,
    Focused(usize),
}

impl GalleryFocus {
    pub fn index(self) -> Option<usize> {
        match self {
            GalleryFocus::Idle => None,
            GalleryFocus::Focused(i) => Some(i),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct GalleryConfig {
    pub photo_count: usize,
    pub debounce: f32,
    pub move_rate: f32,
    pub focus_rate: f32,
    pub focus_distance: f32,
    pub focus_fill: f32,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            photo_count: PHOTO_COUNT,
            debounce: GESTURE_DEBOUNCE_SEC,
            move_rate: PHOTO_MOVE_RATE,
            focus_rate: PHOTO_FOCUS_RATE,
            focus_distance: PHOTO_FOCUS_DISTANCE,
            focus_fill: PHOTO_FOCUS_FILL,
        }
    }
}

impl GalleryConfig {
    pub fn validate(&self) -> SceneResult<()> {
        if self.photo_count == 0 {
            return Err(SceneError::EmptyGallery);
        }
        check_window("debounce", self.debounce)?;
        check_rate("photo_move", self.move_rate)?;
        check_rate("photo_focus", self.focus_rate)?;
        Ok(())
    }
}

/// Focus state machine driven by the debounced hand-closed flag.
#[derive(Clone, Debug)]
pub struct Gallery<R> {
    queue: GalleryQueue<R>,
    debounce: Debouncer,
    focus: GalleryFocus,
}

impl<R: Rng> Gallery<R> {
    pub fn new(config: &GalleryConfig, rng: R) -> SceneResult<Self> {
        config.validate()?;
        Ok(Self {
            queue: GalleryQueue::new(config.photo_count, rng)?,
            debounce: Debouncer::new(config.debounce)?,
            focus: GalleryFocus::Idle,
        })
    }

    pub fn focus(&self) -> GalleryFocus {
        self.focus
    }

    pub fn queue(&self) -> &GalleryQueue<R> {
        &self.queue
    }

    pub fn tick(&mut self, state: &SceneState, dt: f32) -> GalleryFocus {
        if !state.camera_enabled || !state.exploded {
            self.debounce.reset();
            if let GalleryFocus::Focused(i) = self.focus {
                log::info!("[gallery] photo {i} released (gesture mode or dispersal off)");
                self.focus = GalleryFocus::Idle;
            }
            return self.focus;
        }

        match (self.debounce.update(state.hand_closed, dt), self.focus) {
            (Some(true), GalleryFocus::Idle) => {
                let i = self.queue.next();
                log::info!("[gallery] focus photo {i}");
                self.focus = GalleryFocus::Focused(i);
            }
            (Some(false), GalleryFocus::Focused(i)) => {
                log::info!("[gallery] photo {i} released");
                self.focus = GalleryFocus::Idle;
            }
            _ => {}
        }
        self.focus
    }
}

/// Face `dir` with +Y kept as close to up as possible.
fn facing(dir: Vec3) -> Quat {
    let z = dir.normalize_or_zero();
    let x = Vec3::Y.cross(z);
    if z == Vec3::ZERO || x.length_squared() < 1e-8 {
        return Quat::IDENTITY;
    }
    let x = x.normalize();
    Quat::from_mat3(&Mat3::from_cols(x, z.cross(x), z))
}

/// Pose of a frame placed on the tree, in assembly space.
pub fn rest_pose(index: usize, total: usize) -> (Vec3, Quat) {
    let seed = index as f32 * 123.45;
    let random = |offset: f32| (seed + offset).sin() * 0.5 + 0.5;
    let y = -3.5 + index as f32 / total.max(1) as f32 * 5.5 + (random(1.0) - 0.5);
    let cone = 1.0 - y / 3.5;
    let r = (cone + 0.2 + random(2.0) * 0.3).max(0.5);
    let angle = random(2.0) * TAU;
    let position = Vec3::new(angle.cos() * r, y, angle.sin() * r);
    let outward = Vec3::new(position.x, 0.0, position.z);
    let rotation = facing(outward) * Quat::from_rotation_x(-0.2);
    (position, rotation)
}

/// Pose of a frame floating in the dispersed cloud, in assembly space.
pub fn dispersed_pose(index: usize, time: f32) -> (Vec3, Quat) {
    let seed = index as f32 * 789.12;
    let random = |offset: f32| (seed + offset).sin();
    let r = 3.0 + random(1.0).abs() * 2.5;
    let theta = random(2.0) * TAU;
    let phi = std::f32::consts::FRAC_PI_2 + random(3.0) * 0.5;
    let center = Vec3::new(0.0, PHOTO_DISPERSED_CENTER_Y, 0.0);
    let mut position = Vec3::new(
        r * phi.sin() * theta.cos(),
        r * phi.sin() * theta.sin() + PHOTO_DISPERSED_CENTER_Y,
        r * phi.cos(),
    );
    position.y += (time + index as f32).sin() * 0.1;
    (position, facing(position - center))
}

/// World pose of a frame held up in front of the camera.
pub fn focused_pose(camera: &Camera, distance: f32, fill: f32) -> (Vec3, Quat, f32) {
    let orientation = camera.orientation();
    let position = camera.eye + orientation * Vec3::new(0.0, 0.0, -distance);
    let (w, h) = camera.viewport_at(distance);
    let scale = (h * fill / PHOTO_FRAME_HEIGHT).min(w * fill / PHOTO_FRAME_WIDTH);
    (position, orientation, scale)
}

#[derive(Clone, Copy, Debug)]
struct FrameState {
    position: Vec3,
    rotation: Quat,
    scale: f32,
    tint: Vec3,
}

/// Damped world-space poses of every photo frame.
#[derive(Clone, Debug)]
pub struct PhotoFrames {
    config: GalleryConfig,
    frames: Vec<FrameState>,
    transforms: Vec<InstanceTransform>,
    colors: Vec<Vec4>,
}

impl PhotoFrames {
    pub fn new(config: GalleryConfig, assembly: Mat4) -> Self {
        let total = config.photo_count;
        let frames = (0..total)
            .map(|i| {
                let (p, q) = rest_pose(i, total);
                let (scale, rotation, _) = assembly.to_scale_rotation_translation();
                FrameState {
                    position: assembly.transform_point3(p),
                    rotation: rotation * q,
                    scale: PHOTO_REST_SCALE * scale.x,
                    tint: Vec3::from(hex_rgb(PHOTO_BORDER)),
                }
            })
            .collect();
        Self {
            transforms: vec![InstanceTransform::new(Vec3::ZERO, 0.0, Quat::IDENTITY); total],
            colors: vec![Vec4::ONE; total],
            frames,
            config,
        }
    }

    pub fn transforms(&self) -> &[InstanceTransform] {
        &self.transforms
    }

    /// Per-frame tint; `w` is 1.5 on the focused frame and 1.0 elsewhere.
    pub fn colors(&self) -> &[Vec4] {
        &self.colors
    }

    pub fn tick(
        &mut self,
        state: &SceneState,
        focus: GalleryFocus,
        camera: &Camera,
        assembly: Mat4,
        elapsed: f32,
        dt: f32,
    ) {
        let total = self.frames.len();
        let (assembly_scale, assembly_rot, _) = assembly.to_scale_rotation_translation();
        let idle_tint = Vec3::from(hex_rgb(PHOTO_BORDER));
        for (i, frame) in self.frames.iter_mut().enumerate() {
            let active = focus.index() == Some(i);
            let (position, rotation, scale) = if active {
                focused_pose(camera, self.config.focus_distance, self.config.focus_fill)
            } else {
                let ((p, q), s) = if state.exploded {
                    (dispersed_pose(i, elapsed), PHOTO_DISPERSED_SCALE)
                } else {
                    (rest_pose(i, total), PHOTO_REST_SCALE)
                };
                (assembly.transform_point3(p), assembly_rot * q, s * assembly_scale.x)
            };
            let rate = if active {
                self.config.focus_rate
            } else {
                self.config.move_rate
            };
            frame.position = damp_vec3(frame.position, position, rate, dt);
            frame.rotation = damp_quat(frame.rotation, rotation, rate, dt);
            frame.scale = damp(frame.scale, scale, rate, dt);
            let tint = if active { Vec3::ONE } else { idle_tint };
            frame.tint = damp_vec3(frame.tint, tint, 5.0, dt);

            self.transforms[i] = InstanceTransform::new(frame.position, frame.scale, frame.rotation);
            // w > 1 marks the focused frame for the shader
            self.colors[i] = frame.tint.extend(if active { 1.5 } else { 1.0 });
        }
    }

    /// Frames are already in world space; colors change every frame.
    pub fn emit(&self, sink: &mut dyn InstanceSink) {
        sink.write_layer(LayerId::Photos, Mat4::IDENTITY, &self.transforms, Some(&self.colors));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn empty_gallery_is_rejected() {
        assert_eq!(
            GalleryQueue::new(0, StdRng::seed_from_u64(0)).err().map(|e| e.to_string()),
            Some("gallery needs at least one photo".into())
        );
    }

    #[test]
    fn focused_frame_fits_viewport() {
        let cam = Camera::default();
        let (p, _, s) = focused_pose(&cam, 1.0, 0.98);
        assert!((p - Vec3::new(0.0, 0.0, 14.0)).length() < 1e-4);
        let (w, h) = cam.viewport_at(1.0);
        assert!(s * PHOTO_FRAME_HEIGHT <= h + 1e-5);
        assert!(s * PHOTO_FRAME_WIDTH <= w + 1e-5);
    }

    #[test]
    fn debounce_resets_on_change() {
        let mut d = Debouncer::new(0.1).unwrap();
        assert_eq!(d.update(true, 0.06), None);
        assert_eq!(d.update(true, 0.06), None);
        assert_eq!(d.update(true, 0.06), Some(true));
        assert_eq!(d.update(false, 0.06), None);
    }
}
