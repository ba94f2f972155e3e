//! Frame-rate independent exponential smoothing.
//!
//! Every animated value in the scene approaches its target with the same law:
//! `x ← x + (target − x)·(1 − e^(−rate·Δt))`. For `rate ≥ 0` and `Δt ≥ 0` the
//! step fraction lies in `[0, 1)`, so a value never overshoots its target and
//! a zero-length step is a no-op.

use crate::constants::{EXPLODE_RATE, GATHER_RATE};
use crate::error::{check_rate, SceneResult};
use glam::{Quat, Vec3};
use std::f32::consts::{PI, TAU};

/// Fraction of the remaining distance covered in one step.
#[inline]
pub fn damp_alpha(rate: f32, dt: f32) -> f32 {
    1.0 - (-rate * dt.max(0.0)).exp()
}

#[inline]
pub fn damp(current: f32, target: f32, rate: f32, dt: f32) -> f32 {
    current + (target - current) * damp_alpha(rate, dt)
}

#[inline]
pub fn damp_vec3(current: Vec3, target: Vec3, rate: f32, dt: f32) -> Vec3 {
    current.lerp(target, damp_alpha(rate, dt))
}

#[inline]
pub fn damp_quat(current: Quat, target: Quat, rate: f32, dt: f32) -> Quat {
    current.slerp(target, damp_alpha(rate, dt))
}

/// Wrap an angle into `(-π, π]`.
#[inline]
pub fn wrap_angle(angle: f32) -> f32 {
    PI - (PI - angle).rem_euclid(TAU)
}

/// Rates used when a value heads toward 1 (`outward`) versus toward 0 (`inward`).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DampRates {
    pub outward: f32,
    pub inward: f32,
}

impl DampRates {
    pub fn new(outward: f32, inward: f32) -> SceneResult<Self> {
        Ok(Self {
            outward: check_rate("outward", outward)?,
            inward: check_rate("inward", inward)?,
        })
    }

    #[inline]
    pub fn for_target(&self, toward_outward: bool) -> f32 {
        if toward_outward {
            self.outward
        } else {
            self.inward
        }
    }
}

impl Default for DampRates {
    fn default() -> Self {
        Self {
            outward: EXPLODE_RATE,
            inward: GATHER_RATE,
        }
    }
}

/// A scalar in `[0, 1]` eased toward 0 or 1.
#[derive(Clone, Copy, Debug)]
pub struct BlendFactor {
    value: f32,
    rates: DampRates,
}

impl BlendFactor {
    pub fn new(rates: DampRates) -> Self {
        Self { value: 0.0, rates }
    }

    pub fn with_value(rates: DampRates, value: f32) -> Self {
        Self {
            value: value.clamp(0.0, 1.0),
            rates,
        }
    }

    #[inline]
    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn rates(&self) -> DampRates {
        self.rates
    }

    /// Advance one step toward 1 when `dispersed`, else toward 0.
    pub fn step(&mut self, dispersed: bool, dt: f32) -> f32 {
        let target = if dispersed { 1.0 } else { 0.0 };
        let rate = self.rates.for_target(dispersed);
        // clamp only guards against float rounding at the ends
        self.value = damp(self.value, target, rate, dt).clamp(0.0, 1.0);
        self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn damp_reaches_expected_fraction() {
        let v = damp(0.0, 1.0, 3.0, 1.0);
        assert!((v - (1.0 - (-3.0f32).exp())).abs() < 1e-6);
    }

    #[test]
    fn wrap_angle_stays_within_half_turn() {
        assert!((wrap_angle(TAU + 0.5) - 0.5).abs() < 1e-5);
        assert!((wrap_angle(-0.1) + 0.1).abs() < 1e-6);
        assert!((wrap_angle(6.0) - (6.0 - TAU)).abs() < 1e-5);
        assert_eq!(wrap_angle(PI), PI);
    }

    #[test]
    fn negative_rate_rejected() {
        assert!(DampRates::new(-1.0, 6.0).is_err());
        assert!(DampRates::new(3.0, f32::NAN).is_err());
    }
}
