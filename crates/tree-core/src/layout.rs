//! Rest and dispersed layout generators plus per-layer motion styles.
//!
//! Rest positions are sampled once at startup from a seeded RNG. Dispersed
//! positions are recomputed every frame from the particle's seed via
//! [`hash01`], so they cost no storage and never change between toggles.

use crate::constants::{FLOAT_AMPLITUDE, FLOAT_FREQUENCY, TREE_HEIGHT, TREE_RADIUS};
use crate::seed::{hash01, range};
use glam::{Quat, Vec3};
use rand::Rng;
use std::f32::consts::{PI, TAU};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TreeDims {
    pub height: f32,
    pub radius: f32,
}

impl Default for TreeDims {
    fn default() -> Self {
        Self {
            height: TREE_HEIGHT,
            radius: TREE_RADIUS,
        }
    }
}

impl TreeDims {
    /// Cone radius at a centred height `y ∈ [-h/2, h/2]`.
    #[inline]
    pub fn radius_at(&self, y: f32) -> f32 {
        let normalized = ((y + self.height / 2.0) / self.height).clamp(0.0, 1.0);
        (1.0 - normalized) * self.radius
    }

    /// Scale falloff toward the tip: 1 at the base, 0.2 at the top, never below 0.1.
    #[inline]
    pub fn scale_by_height(&self, y: f32) -> f32 {
        let normalized = (y + self.height / 2.0) / self.height;
        (1.0 - normalized * 0.8).max(0.1)
    }
}

/// How rest positions are sampled at generation time.
#[derive(Clone, Debug, PartialEq)]
pub enum RestLayout {
    /// Uniform volume sampling of the tree cone.
    Cone { radius_scale: f32 },
    /// Cone restricted to a centred band covering `fraction` of the height.
    MidBand { fraction: f32 },
    /// Loose spiral band winding up the outside of the cone.
    Spiral {
        turns: f32,
        clearance: f32,
        radial_jitter: f32,
    },
    /// Every particle at one point.
    Point { position: Vec3 },
    /// Ring around a vertical axis at `center`.
    Ring {
        center: Vec3,
        radius_min: f32,
        radius_max: f32,
        height: f32,
    },
    /// Axis-aligned box centred on the origin.
    Box { extent: Vec3 },
}

impl RestLayout {
    pub fn sample(&self, i: usize, count: usize, dims: &TreeDims, rng: &mut impl Rng) -> Vec3 {
        match *self {
            RestLayout::Cone { radius_scale } => {
                let y = rng.gen::<f32>() * dims.height;
                let r = (1.0 - y / dims.height) * dims.radius * radius_scale;
                let angle = rng.gen::<f32>() * TAU;
                // sqrt keeps the disc density uniform
                let distance = rng.gen::<f32>().sqrt() * r;
                Vec3::new(
                    angle.cos() * distance,
                    y - dims.height / 2.0,
                    angle.sin() * distance,
                )
            }
            RestLayout::MidBand { fraction } => {
                let y = (rng.gen::<f32>() - 0.5) * dims.height * fraction;
                let r = dims.radius_at(y);
                let angle = rng.gen::<f32>() * TAU;
                let distance = rng.gen::<f32>().sqrt() * r;
                Vec3::new(angle.cos() * distance, y, angle.sin() * distance)
            }
            RestLayout::Spiral {
                turns,
                clearance,
                radial_jitter,
            } => {
                let t = i as f32 / count.max(1) as f32;
                let angle = t * TAU * turns + (rng.gen::<f32>() - 0.5) * 0.05 * TAU;
                let y = (t - 0.5) * dims.height + (rng.gen::<f32>() - 0.5) * 0.3;
                let r = (1.0 - t) * dims.radius + clearance + (rng.gen::<f32>() - 0.5) * radial_jitter;
                Vec3::new(angle.cos() * r, y, angle.sin() * r)
            }
            RestLayout::Point { position } => position,
            RestLayout::Ring {
                center,
                radius_min,
                radius_max,
                height,
            } => {
                let angle = i as f32 / count.max(1) as f32 * TAU;
                let r = range(rng, radius_min, radius_max);
                let y = (rng.gen::<f32>() - 0.5) * height;
                center + Vec3::new(angle.cos() * r, y, angle.sin() * r)
            }
            RestLayout::Box { extent } => Vec3::new(
                (rng.gen::<f32>() - 0.5) * extent.x,
                (rng.gen::<f32>() - 0.5) * extent.y,
                (rng.gen::<f32>() - 0.5) * extent.z,
            ),
        }
    }
}

/// How the exploded position of a particle is derived from its seed.
#[derive(Clone, Debug, PartialEq)]
pub enum DispersedLayout {
    /// Slowly rotating spherical shell above the tree.
    Shell { weight: f32 },
    /// Flat rotating spiral galaxy.
    Galaxy {
        min_radius: f32,
        spread: f32,
        thickness: f32,
    },
    /// Pushed straight out from the origin.
    Radial { distance: f32 },
    /// Shifted by a constant offset.
    Lift { offset: Vec3 },
    /// Dispersed equals rest.
    Still,
}

impl DispersedLayout {
    /// `rest_now` is the animated rest position for this frame.
    pub fn position(&self, seed: u32, rest_now: Vec3, time: f32, dims: &TreeDims) -> Vec3 {
        match *self {
            DispersedLayout::Shell { weight } => {
                let u = hash01(seed) * TAU;
                let v = hash01(seed.wrapping_add(100)) * PI - PI / 2.0;
                let r = 5.0 + hash01(seed.wrapping_add(200)) * 15.0 * weight;
                let p = Vec3::new(
                    r * v.cos() * u.cos(),
                    r * v.sin() + dims.height / 2.0,
                    r * v.cos() * u.sin(),
                );
                // heavier particles drift more slowly
                let spin = 0.2 * (1.0 - weight * 0.5);
                rotate_y(p, time * spin)
            }
            DispersedLayout::Galaxy {
                min_radius,
                spread,
                thickness,
            } => {
                let r = min_radius + hash01(seed) * spread;
                let theta = time * 0.2 + hash01(seed.wrapping_add(500)) * TAU;
                let y = (hash01(seed.wrapping_add(200)) - 0.5) * thickness + dims.height / 2.0;
                Vec3::new(theta.cos() * r, y, theta.sin() * r)
            }
            DispersedLayout::Radial { distance } => {
                let len = rest_now.length();
                let dir = if len > 1e-6 { rest_now / len } else { Vec3::Y };
                rest_now + dir * distance
            }
            DispersedLayout::Lift { offset } => rest_now + offset,
            DispersedLayout::Still => rest_now,
        }
    }
}

/// Rotate `p` about the world Y axis.
#[inline]
pub fn rotate_y(p: Vec3, angle: f32) -> Vec3 {
    let (s, c) = angle.sin_cos();
    Vec3::new(p.x * c - p.z * s, p.y, p.x * s + p.z * c)
}

/// Shared breathing offset so every tree layer rises and falls together.
#[inline]
pub fn breathing(rest: Vec3, time: f32) -> f32 {
    (time * FLOAT_FREQUENCY + rest.x).sin() * FLOAT_AMPLITUDE
}

/// Position, Euler rotation and uniform scale of one particle at one endpoint.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    pub euler: Vec3,
    pub scale: f32,
}

impl Pose {
    #[inline]
    pub fn lerp(&self, other: &Pose, t: f32) -> Pose {
        Pose {
            position: self.position.lerp(other.position, t),
            euler: self.euler.lerp(other.euler, t),
            scale: self.scale + (other.scale - self.scale) * t,
        }
    }

    #[inline]
    pub fn rotation(&self) -> Quat {
        Quat::from_euler(glam::EulerRot::XYZ, self.euler.x, self.euler.y, self.euler.z)
    }
}

/// Per-particle inputs a motion style reads.
#[derive(Clone, Copy, Debug)]
pub struct MotionInput {
    pub rest: Vec3,
    pub euler: Vec3,
    pub scale: f32,
    pub phase: f32,
    pub speed: f32,
    pub index: usize,
    pub time: f32,
    /// Current rest-to-dispersed blend factor.
    pub blend: f32,
}

/// Continuous-time oscillation layered on both endpoints.
#[derive(Clone, Debug, PartialEq)]
pub enum Motion {
    /// Breathing bob at rest, full tumble when dispersed.
    Tumble,
    /// Breathing bob with a slow spin at rest, jittering fast spin when dispersed.
    Glint,
    /// Helical drift and heartbeat pulse; grows and flickers when dispersed.
    Twinkle,
    /// Whole layer rotates about the Y axis with a bob and shimmer.
    Swirl {
        rate: f32,
        bob_frequency: f32,
        bob_amplitude: f32,
        shimmer: bool,
    },
    /// Constant spin on x/y.
    Spin { rate: f32 },
    /// Gentle hover and turn, used for the topper star.
    Hover,
    /// Falls through the scene box and wraps around.
    Fall { half_height: f32 },
}

impl Motion {
    /// Pose at the rest endpoint (position before any dispersal).
    pub fn rest_pose(&self, m: &MotionInput) -> Pose {
        let t = m.time;
        match *self {
            Motion::Tumble => Pose {
                position: m.rest + Vec3::Y * breathing(m.rest, t),
                euler: m.euler,
                scale: m.scale,
            },
            Motion::Glint => Pose {
                position: m.rest + Vec3::Y * breathing(m.rest, t),
                euler: m.euler + Vec3::new(0.0, t * 0.2, 0.0),
                scale: m.scale,
            },
            Motion::Twinkle => {
                let angle = t * 0.1 + m.rest.y * 0.5;
                let position = Vec3::new(
                    m.rest.x + angle.cos() * 0.05,
                    m.rest.y + breathing(m.rest, t) + (t * m.speed).sin() * 0.1,
                    m.rest.z + angle.sin() * 0.05,
                );
                let pulse = ((t * 3.0 + m.phase).sin() + 1.0) * 0.5 + 0.5;
                Pose {
                    position,
                    euler: Vec3::splat(t),
                    scale: m.scale * pulse,
                }
            }
            Motion::Swirl {
                rate,
                bob_frequency,
                bob_amplitude,
                shimmer,
            } => {
                let mut position = rotate_y(m.rest, t * rate * m.speed);
                position.y += (t * bob_frequency + m.phase).sin() * bob_amplitude;
                let scale = if shimmer {
                    m.scale * ((t * 3.0 + m.phase).sin() * 0.3 + 1.0)
                } else {
                    m.scale
                };
                Pose {
                    position,
                    euler: m.euler + Vec3::new(t * 0.5, t * 0.5, 0.0),
                    scale,
                }
            }
            Motion::Spin { rate } => Pose {
                position: m.rest,
                euler: m.euler + Vec3::new(t * rate, t * rate, 0.0),
                scale: m.scale,
            },
            Motion::Hover => Pose {
                position: m.rest + Vec3::Y * (t.sin() * 0.07),
                euler: Vec3::new(0.2, t * 0.3, 0.1 + (t * 0.5).sin() * 0.07),
                scale: m.scale,
            },
            Motion::Fall { half_height } => {
                let span = half_height * 2.0;
                let y = half_height - (half_height - m.rest.y + t * m.speed).rem_euclid(span);
                Pose {
                    position: Vec3::new(
                        m.rest.x + (t * 0.5 + y).sin() * 0.2,
                        y,
                        m.rest.z + (t * 0.3 + y).cos() * 0.2,
                    ),
                    euler: Vec3::ZERO,
                    scale: m.scale,
                }
            }
        }
    }

    /// Pose at the dispersed endpoint, given its already-computed position.
    pub fn dispersed_pose(&self, m: &MotionInput, rest: &Pose, position: Vec3) -> Pose {
        let t = m.time;
        match *self {
            Motion::Tumble => Pose {
                position,
                euler: m.euler + Vec3::splat(t),
                scale: m.scale,
            },
            Motion::Glint => Pose {
                position: position + Vec3::splat((t * 5.0 + m.index as f32).sin() * 0.2 * m.blend),
                euler: Vec3::splat(t * 2.0),
                scale: m.scale,
            },
            Motion::Twinkle => {
                let pulse = ((t * 10.0 + m.index as f32).sin() + 1.0) * 0.5;
                Pose {
                    position,
                    euler: Vec3::splat(t),
                    scale: m.scale * (3.0 + pulse),
                }
            }
            _ => Pose { position, ..*rest },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn cone_samples_stay_inside_the_cone() {
        let dims = TreeDims::default();
        let mut rng = StdRng::seed_from_u64(7);
        let layout = RestLayout::Cone { radius_scale: 1.0 };
        for i in 0..2_000 {
            let p = layout.sample(i, 2_000, &dims, &mut rng);
            assert!(p.y >= -dims.height / 2.0 && p.y <= dims.height / 2.0);
            let horizontal = (p.x * p.x + p.z * p.z).sqrt();
            assert!(horizontal <= dims.radius_at(p.y) + 1e-4);
        }
    }

    #[test]
    fn snow_wraps_inside_its_box() {
        let fall = Motion::Fall { half_height: 10.0 };
        for step in 0..500 {
            let m = MotionInput {
                rest: Vec3::new(0.0, 3.0, 0.0),
                euler: Vec3::ZERO,
                scale: 1.0,
                phase: 0.0,
                speed: 1.7,
                index: 0,
                time: step as f32 * 0.37,
                blend: 0.0,
            };
            let y = fall.rest_pose(&m).position.y;
            assert!(y > -10.0 - 1e-4 && y <= 10.0 + 1e-4, "y = {y}");
        }
    }

    #[test]
    fn ribbon_floats_a_band_clear_of_the_cone() {
        let dims = TreeDims::default();
        let mut rng = StdRng::seed_from_u64(3);
        let ribbon = crate::layer::LayerConfig::ribbon().rest;
        let count = 1_000;
        let (mut lo, mut hi) = (f32::MAX, f32::MIN);
        for i in 0..count {
            let p = ribbon.sample(i, count, &dims, &mut rng);
            let t = i as f32 / count as f32;
            let offset = (p.x * p.x + p.z * p.z).sqrt() - (1.0 - t) * dims.radius;
            lo = lo.min(offset);
            hi = hi.max(offset);
        }
        assert!(lo >= 0.6 - 1e-4 && hi <= 1.4 + 1e-4, "{lo}..{hi}");
        // the band actually uses most of its width
        assert!(hi - lo > 0.6);
    }

    #[test]
    fn glint_jitter_fades_with_the_blend() {
        let m = |blend| MotionInput {
            rest: Vec3::ZERO,
            euler: Vec3::ZERO,
            scale: 1.0,
            phase: 0.0,
            speed: 1.0,
            index: 3,
            time: 0.4,
            blend,
        };
        let target = Vec3::new(4.0, 1.0, -2.0);
        let at = |blend| {
            let input = m(blend);
            let rest = Motion::Glint.rest_pose(&input);
            Motion::Glint.dispersed_pose(&input, &rest, target).position
        };
        assert_eq!(at(0.0), target);
        let full = (0.4f32 * 5.0 + 3.0).sin() * 0.2;
        assert!((at(1.0) - (target + Vec3::splat(full))).length() < 1e-6);
        assert!((at(0.5) - (target + Vec3::splat(full * 0.5))).length() < 1e-6);
    }

    #[test]
    fn radial_push_moves_away_from_origin() {
        let dims = TreeDims::default();
        let rest = Vec3::new(1.0, 2.0, 0.0);
        let p = DispersedLayout::Radial { distance: 6.0 }.position(0, rest, 0.0, &dims);
        assert!((p.length() - (rest.length() + 6.0)).abs() < 1e-4);
    }
}
