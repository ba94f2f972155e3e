//! Yaw/pitch/roll and scale of the rotating tree assembly.

use crate::constants::*;
use crate::damping::{damp, wrap_angle, DampRates};
use crate::error::{check_rate, SceneResult};
use crate::state::SceneState;
use glam::{Mat4, Quat, Vec3};
use std::f32::consts::PI;

#[derive(Clone, Debug, PartialEq)]
pub struct ViewConfig {
    pub deadzone: f32,
    /// Fraction of π reached at a full hand offset of 1.0.
    pub yaw_gain: f32,
    pub damp_rate: f32,
    pub auto_rotate_speed: f32,
    pub scale: f32,
    pub exploded_scale_ratio: f32,
    pub scale_rates: DampRates,
    pub offset_y: f32,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            deadzone: HAND_DEADZONE,
            yaw_gain: YAW_GAIN,
            damp_rate: VIEW_DAMP_RATE,
            auto_rotate_speed: AUTO_ROTATE_SPEED,
            scale: ASSEMBLY_SCALE,
            exploded_scale_ratio: ASSEMBLY_EXPLODED_SCALE_RATIO,
            scale_rates: DampRates::default(),
            offset_y: ASSEMBLY_OFFSET_Y,
        }
    }
}

impl ViewConfig {
    pub fn validate(&self) -> SceneResult<()> {
        check_rate("view", self.damp_rate)?;
        check_rate("auto_rotate", self.auto_rotate_speed)?;
        DampRates::new(self.scale_rates.outward, self.scale_rates.inward)?;
        Ok(())
    }

    /// Yaw the assembly should face for a centre-relative hand x.
    pub fn target_yaw(&self, hand_x: f32) -> f32 {
        let x = if hand_x.abs() < self.deadzone { 0.0 } else { hand_x };
        -x * PI * self.yaw_gain
    }
}

#[derive(Clone, Debug)]
pub struct ViewController {
    config: ViewConfig,
    yaw: f32,
    pitch: f32,
    roll: f32,
    scale: f32,
}

impl ViewController {
    pub fn new(config: ViewConfig) -> Self {
        let scale = config.scale;
        Self {
            config,
            yaw: 0.0,
            pitch: 0.0,
            roll: 0.0,
            scale,
        }
    }

    pub fn config(&self) -> &ViewConfig {
        &self.config
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn roll(&self) -> f32 {
        self.roll
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn tick(&mut self, state: &SceneState, dt: f32) {
        let cfg = &self.config;
        if state.camera_enabled {
            let target = cfg.target_yaw(state.hand_position.x);
            self.yaw = damp(self.yaw, target, cfg.damp_rate, dt);
            self.pitch = damp(self.pitch, 0.0, cfg.damp_rate, dt);
            self.roll = damp(self.roll, 0.0, cfg.damp_rate, dt);
        } else {
            self.yaw = wrap_angle(self.yaw + cfg.auto_rotate_speed * dt.max(0.0));
        }

        let spread = state.hand_spread();
        let target_scale = if spread {
            cfg.scale * cfg.exploded_scale_ratio
        } else {
            cfg.scale
        };
        // shrinking toward the exploded scale counts as the outward direction
        self.scale = damp(self.scale, target_scale, cfg.scale_rates.for_target(spread), dt);
    }

    /// Model matrix applied to every layer of the assembly.
    pub fn model(&self) -> Mat4 {
        let rotation = Quat::from_euler(glam::EulerRot::YXZ, self.yaw, self.pitch, self.roll);
        Mat4::from_scale_rotation_translation(
            Vec3::splat(self.scale),
            rotation,
            Vec3::new(0.0, self.config.offset_y, 0.0),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    #[test]
    fn auto_rotate_wraps() {
        let mut view = ViewController::new(ViewConfig::default());
        for _ in 0..1_000 {
            view.tick(&SceneState::default(), 0.1);
        }
        assert!(view.yaw() > -PI && view.yaw() <= PI);
    }

    #[test]
    fn open_hand_shrinks_assembly() {
        let mut view = ViewController::new(ViewConfig::default());
        let state = SceneState {
            camera_enabled: true,
            hand_open: true,
            hand_position: Vec2::ZERO,
            ..Default::default()
        };
        for _ in 0..600 {
            view.tick(&state, 1.0 / 60.0);
        }
        assert!((view.scale() - ASSEMBLY_SCALE * ASSEMBLY_EXPLODED_SCALE_RATIO).abs() < 1e-3);
    }
}
