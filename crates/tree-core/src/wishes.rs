//! Visitor wishes: validation, the in-memory book and the orbit layout of
//! the name-tag diamonds.

use crate::constants::*;
use crate::error::{SceneError, SceneResult};
use crate::layer::{InstanceSink, InstanceTransform, LayerId};
use chrono::{DateTime, Utc};
use glam::{Mat4, Quat, Vec3, Vec4};
use serde::{Deserialize, Serialize};
use std::f32::consts::{PI, TAU};

/// A stored wish as returned by the persistence service.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Wish {
    pub id: i64,
    pub name: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// Validated insert payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WishDraft {
    pub name: String,
    pub message: String,
}

fn check_field(field: &'static str, value: &str, max: usize) -> SceneResult<String> {
    let trimmed = value.trim();
    let len = trimmed.chars().count();
    if len == 0 {
        return Err(SceneError::EmptyField { field });
    }
    if len > max {
        return Err(SceneError::FieldTooLong { field, len, max });
    }
    Ok(trimmed.to_owned())
}

impl WishDraft {
    pub fn new(name: &str, message: &str) -> SceneResult<Self> {
        Ok(Self {
            name: check_field("name", name, WISH_NAME_MAX_CHARS)?,
            message: check_field("message", message, WISH_MESSAGE_MAX_CHARS)?,
        })
    }

    /// Local stand-in used when persistence fails; the id is the submit time in ms.
    pub fn into_synthetic(self, now: DateTime<Utc>) -> Wish {
        Wish {
            id: now.timestamp_millis(),
            name: self.name,
            message: self.message,
            created_at: now,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct WishBook {
    wishes: Vec<Wish>,
}

impl WishBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.wishes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wishes.is_empty()
    }

    /// Add a wish; a wish with an id already present replaces the old one.
    pub fn add(&mut self, wish: Wish) {
        match self.wishes.iter_mut().find(|w| w.id == wish.id) {
            Some(existing) => *existing = wish,
            None => self.wishes.push(wish),
        }
    }

    pub fn extend(&mut self, wishes: impl IntoIterator<Item = Wish>) {
        for w in wishes {
            self.add(w);
        }
    }

    /// Newest first, at most `limit`. Ties keep insertion order, latest first.
    pub fn recent(&self, limit: usize) -> Vec<&Wish> {
        let mut sorted: Vec<(usize, &Wish)> = self.wishes.iter().enumerate().collect();
        sorted.sort_by(|(ia, a), (ib, b)| b.created_at.cmp(&a.created_at).then(ib.cmp(ia)));
        sorted.into_iter().take(limit).map(|(_, w)| w).collect()
    }

    pub fn orbiting(&self) -> Vec<&Wish> {
        self.recent(WISH_ORBIT_LIMIT)
    }
}

/// Position of the `k`-th of `n` orbiting wishes at `time`.
pub fn orbit_position(k: usize, n: usize, time: f32) -> Vec3 {
    let n = n.max(1) as f32;
    let kf = k as f32;
    let base = kf / n * TAU;
    let radius = 5.5 + (k / 3) as f32 * 1.5 + (k % 3) as f32 * 0.5;
    let y = -2.0 + kf / n * 6.0;
    let angle = base + time * WISH_ORBIT_SPEED;
    let x = angle.cos() * radius;
    let z = angle.sin() * radius;
    let incline = PI / 6.0;
    let y_rot = y * incline.cos() - z * incline.sin();
    let z_rot = y * incline.sin() + z * incline.cos();
    Vec3::new(x, y_rot + (time * 1.5 + kf).sin() * 0.2, z_rot)
}

/// Diamond instances for the orbiting wishes.
#[derive(Clone, Debug, Default)]
pub struct WishOrbit {
    transforms: Vec<InstanceTransform>,
    colors: Vec<Vec4>,
    colors_dirty: bool,
}

impl WishOrbit {
    pub fn positions(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.transforms.iter().map(InstanceTransform::position)
    }

    pub fn tick(&mut self, book: &WishBook, elapsed: f32) {
        let n = book.orbiting().len();
        if n != self.transforms.len() {
            let [r, g, b] = hex_rgb(WHITE);
            self.colors = vec![Vec4::new(r, g, b, 2.0); n];
            self.colors_dirty = true;
        }
        self.transforms = (0..n)
            .map(|k| {
                let spin = Quat::from_euler(glam::EulerRot::XYZ, elapsed * 1.2, elapsed * 1.8, 0.0);
                InstanceTransform::new(orbit_position(k, n, elapsed), 0.12, spin)
            })
            .collect();
    }

    pub fn emit(&mut self, sink: &mut dyn InstanceSink) {
        let colors = if self.colors_dirty {
            self.colors_dirty = false;
            Some(self.colors.as_slice())
        } else {
            None
        };
        sink.write_layer(LayerId::Wishes, Mat4::IDENTITY, &self.transforms, colors);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draft_trims_and_counts_chars() {
        let d = WishDraft::new("  Ann ", "  hi  ").unwrap();
        assert_eq!(d.name, "Ann");
        assert_eq!(d.message, "hi");
        // twenty multi-byte characters fit
        assert!(WishDraft::new(&"雪".repeat(20), "x").is_ok());
    }

    #[test]
    fn first_orbit_slot() {
        let p = orbit_position(0, 1, 0.0);
        let incline = PI / 6.0;
        assert!((p.x - 5.5).abs() < 1e-5);
        assert!((p.y - (-2.0 * incline.cos())).abs() < 1e-5);
        assert!((p.z - (-2.0 * incline.sin())).abs() < 1e-5);
    }

    /// Undo the bob and the incline, giving the flat orbit point.
    fn flat(p: Vec3, k: usize, time: f32) -> Vec3 {
        let incline = PI / 6.0;
        let y_rot = p.y - (time * 1.5 + k as f32).sin() * 0.2;
        Vec3::new(
            p.x,
            y_rot * incline.cos() + p.z * incline.sin(),
            -y_rot * incline.sin() + p.z * incline.cos(),
        )
    }

    #[test]
    fn later_slots_spread_into_wider_rings() {
        // (k, n, radius, height)
        for (k, n, radius, height) in [(3, 5, 7.0, 1.6), (4, 6, 7.5, 2.0), (7, 10, 9.0, 2.2)] {
            for time in [0.0, 2.5] {
                let p = flat(orbit_position(k, n, time), k, time);
                assert!((p.x.hypot(p.z) - radius).abs() < 1e-4, "k={k} radius {}", p.x.hypot(p.z));
                assert!((p.y - height).abs() < 1e-4, "k={k} height {}", p.y);
            }
        }
    }
}
