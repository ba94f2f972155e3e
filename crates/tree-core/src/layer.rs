//! Generic dual-state particle layer.
//!
//! Every decorative layer of the tree is one [`ParticleLayer`] built from a
//! [`LayerConfig`]: rest positions are sampled once, the dispersed layout is
//! rebuilt each frame from the particle seed, and a single damped
//! [`BlendFactor`] interpolates between the two poses.

use crate::constants::*;
use crate::damping::{BlendFactor, DampRates};
use crate::error::{SceneError, SceneResult};
use crate::layout::{DispersedLayout, Motion, MotionInput, Pose, RestLayout, TreeDims};
use crate::seed::range;
use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Quat, Vec3, Vec4};
use rand::Rng;
use std::f32::consts::TAU;

/// Per-instance transform as uploaded to the GPU.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct InstanceTransform {
    pub position: [f32; 3],
    pub scale: f32,
    pub rotation: [f32; 4],
}

impl InstanceTransform {
    pub fn new(position: Vec3, scale: f32, rotation: Quat) -> Self {
        Self {
            position: position.to_array(),
            scale,
            rotation: rotation.to_array(),
        }
    }

    #[inline]
    pub fn position(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }
}

/// Identifies a drawable instance group; the renderer picks a mesh per id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LayerId {
    Deep,
    Shine,
    Glow,
    Ribbon,
    Gems,
    Topper,
    Sparkles,
    Snow,
    Photos,
    Wishes,
}

impl LayerId {
    pub const ALL: [LayerId; 10] = [
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
    ];

    pub fn name(self) -> &'static str {
        match self {
            LayerId::Deep => "deep",
            LayerId::Shine => "shine",
            LayerId::Glow => "glow",
            LayerId::Ribbon => "ribbon",
            LayerId::Gems => "gems",
            LayerId::Topper => "topper",
            LayerId::Sparkles => "sparkles",
            LayerId::Snow => "snow",
            LayerId::Photos => "photos",
            LayerId::Wishes => "wishes",
        }
    }
}

/// Receives per-frame instance data. Implemented by the GPU renderer.
pub trait InstanceSink {
    /// `model` is applied to every transform of the layer. `colors` is
    /// `Some` only when the colors changed since the last write.
    fn write_layer(
        &mut self,
        layer: LayerId,
        model: Mat4,
        transforms: &[InstanceTransform],
        colors: Option<&[Vec4]>,
    );
}

/// How base scale is drawn at generation time.
#[derive(Clone, Debug, PartialEq)]
pub enum ScaleRule {
    Uniform { min: f32, max: f32 },
    /// Uniform draw multiplied by the cone's height falloff.
    ByHeight { min: f32, max: f32 },
}

/// Weighted colour choices; weights need not sum to one.
pub type Palette = &'static [(u32, f32)];

/// Immutable description of one layer.
#[derive(Clone, Debug, PartialEq)]
pub struct LayerConfig {
    pub id: LayerId,
    pub count: usize,
    pub rest: RestLayout,
    pub dispersed: DispersedLayout,
    pub motion: Motion,
    pub scale: ScaleRule,
    pub speed: (f32, f32),
    pub palette: Palette,
    pub emissive: f32,
    pub seed_offset: u32,
    pub rates: DampRates,
}

impl LayerConfig {
    pub fn validate(&self) -> SceneResult<()> {
        if self.count == 0 {
            return Err(SceneError::EmptyLayer(self.id.name()));
        }
        DampRates::new(self.rates.outward, self.rates.inward)?;
        Ok(())
    }

    pub fn deep() -> Self {
        Self {
            id: LayerId::Deep,
            count: DEEP_COUNT,
            rest: RestLayout::Cone { radius_scale: 1.0 },
            dispersed: DispersedLayout::Shell { weight: 0.8 },
            motion: Motion::Tumble,
            scale: ScaleRule::ByHeight { min: 0.4, max: 0.7 },
            speed: (0.5, 1.5),
            palette: &[(DEEP_BASE, 0.4), (VIVID_PINK, 0.6)],
            emissive: 0.2,
            seed_offset: 0,
            rates: DampRates::default(),
        }
    }

    pub fn shine() -> Self {
        Self {
            id: LayerId::Shine,
            count: SHINE_COUNT,
            rest: RestLayout::Cone { radius_scale: 0.95 },
            dispersed: DispersedLayout::Shell { weight: 1.5 },
            motion: Motion::Glint,
            scale: ScaleRule::Uniform { min: 0.05, max: 0.25 },
            speed: (0.5, 1.5),
            palette: &[
                (LUXURY_GOLD, 0.125),
                (CHAMPAGNE, 0.125),
                (DREAMY_PINK, 0.375),
                (ROSE_GOLD, 0.375),
            ],
            emissive: 0.8,
            seed_offset: SHINE_SEED_OFFSET,
            rates: DampRates::default(),
        }
    }

    pub fn glow() -> Self {
        Self {
            id: LayerId::Glow,
            count: GLOW_COUNT,
            rest: RestLayout::Cone { radius_scale: 1.05 },
            dispersed: DispersedLayout::Galaxy {
                min_radius: 2.0,
                spread: 20.0,
                thickness: 10.0,
            },
            motion: Motion::Twinkle,
            scale: ScaleRule::Uniform { min: 0.02, max: 0.07 },
            speed: (0.5, 2.0),
            palette: &[(WHITE, 0.2), (DREAMY_PINK, 0.8)],
            emissive: 2.0,
            seed_offset: 0,
            rates: DampRates::default(),
        }
    }

    pub fn ribbon() -> Self {
        Self {
            id: LayerId::Ribbon,
            count: RIBBON_COUNT,
            rest: RestLayout::Spiral {
                turns: 3.5,
                clearance: 1.0,
                radial_jitter: 0.8,
            },
            dispersed: DispersedLayout::Radial { distance: 15.0 },
            motion: Motion::Swirl {
                rate: 0.3,
                bob_frequency: 0.5,
                bob_amplitude: 0.2,
                shimmer: true,
            },
            scale: ScaleRule::Uniform { min: 0.03, max: 0.08 },
            speed: (1.0, 1.0),
            palette: &[(WHITE, 1.0)],
            emissive: 1.5,
            seed_offset: 0,
            rates: DampRates::default(),
        }
    }

    pub fn gems() -> Self {
        Self {
            id: LayerId::Gems,
            count: GEM_COUNT,
            rest: RestLayout::MidBand { fraction: 0.6 },
            dispersed: DispersedLayout::Radial { distance: 6.0 },
            motion: Motion::Spin { rate: 0.3 },
            scale: ScaleRule::Uniform { min: 0.1, max: 0.2 },
            speed: (1.0, 1.0),
            palette: &[(DREAMY_PINK, 1.0)],
            emissive: 0.6,
            seed_offset: 0,
            rates: DampRates::default(),
        }
    }

    pub fn topper() -> Self {
        Self {
            id: LayerId::Topper,
            count: 1,
            rest: RestLayout::Point {
                position: Vec3::new(0.0, TREE_HEIGHT / 2.0 + 0.5, 0.0),
            },
            dispersed: DispersedLayout::Lift {
                offset: Vec3::new(0.0, 5.0, 0.0),
            },
            motion: Motion::Hover,
            scale: ScaleRule::Uniform { min: 0.8, max: 0.8 },
            speed: (1.0, 1.0),
            palette: &[(WHITE, 1.0)],
            emissive: 3.0,
            seed_offset: 0,
            rates: DampRates::default(),
        }
    }

    pub fn sparkles() -> Self {
        Self {
            id: LayerId::Sparkles,
            count: SPARKLE_COUNT,
            rest: RestLayout::Ring {
                center: Vec3::new(0.0, TREE_HEIGHT / 2.0 + 0.5, 0.0),
                radius_min: 0.6,
                radius_max: 1.0,
                height: 0.8,
            },
            dispersed: DispersedLayout::Lift {
                offset: Vec3::new(0.0, 5.0, 0.0),
            },
            motion: Motion::Swirl {
                rate: 0.5,
                bob_frequency: 1.0,
                bob_amplitude: 0.05,
                shimmer: false,
            },
            scale: ScaleRule::Uniform { min: 0.03, max: 0.06 },
            speed: (0.2, 0.4),
            palette: &[(LUXURY_GOLD, 1.0)],
            emissive: 2.5,
            seed_offset: 0,
            rates: DampRates::default(),
        }
    }

    pub fn snow() -> Self {
        Self {
            id: LayerId::Snow,
            count: SNOW_COUNT,
            rest: RestLayout::Box {
                extent: Vec3::new(30.0, 20.0, 30.0),
            },
            dispersed: DispersedLayout::Still,
            motion: Motion::Fall { half_height: 10.0 },
            scale: ScaleRule::Uniform { min: 0.03, max: 0.08 },
            speed: (0.5, 2.0),
            palette: &[(WHITE, 1.0)],
            emissive: 0.8,
            seed_offset: 0,
            rates: DampRates::default(),
        }
    }

    /// Every tree layer in draw order. Snow is separate: it ignores the
    /// blend target and lives outside the rotating assembly.
    pub fn tree_catalogue() -> Vec<LayerConfig> {
        vec![
            Self::deep(),
            Self::shine(),
            Self::glow(),
            Self::ribbon(),
            Self::gems(),
            Self::topper(),
            Self::sparkles(),
        ]
    }
}

/// Generated per-particle constants.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParticleSpec {
    pub rest_position: Vec3,
    pub dispersed_seed: u32,
    pub base_scale: f32,
    pub phase: f32,
    pub speed: f32,
    pub rotation: Vec3,
    pub color: Vec4,
}

/// Colour with the layer's emissive strength packed into `w`.
fn pick_color(palette: Palette, emissive: f32, rng: &mut impl Rng) -> Vec4 {
    let total: f32 = palette.iter().map(|(_, w)| w).sum();
    let mut roll = rng.gen::<f32>() * total;
    let mut chosen = palette.last().map(|(c, _)| *c).unwrap_or(WHITE);
    for &(color, weight) in palette {
        if roll < weight {
            chosen = color;
            break;
        }
        roll -= weight;
    }
    let [r, g, b] = hex_rgb(chosen);
    Vec4::new(r, g, b, emissive)
}

pub struct ParticleLayer {
    config: LayerConfig,
    dims: TreeDims,
    particles: Vec<ParticleSpec>,
    blend: BlendFactor,
    transforms: Vec<InstanceTransform>,
    colors: Vec<Vec4>,
    colors_dirty: bool,
}

impl ParticleLayer {
    pub fn new(config: LayerConfig, dims: TreeDims, rng: &mut impl Rng) -> SceneResult<Self> {
        config.validate()?;
        let count = config.count;
        let particles: Vec<ParticleSpec> = (0..count)
            .map(|i| {
                let rest_position = config.rest.sample(i, count, &dims, rng);
                let base_scale = match config.scale {
                    ScaleRule::Uniform { min, max } => range(rng, min, max),
                    ScaleRule::ByHeight { min, max } => {
                        dims.scale_by_height(rest_position.y) * range(rng, min, max)
                    }
                };
                ParticleSpec {
                    rest_position,
                    dispersed_seed: i as u32 + config.seed_offset,
                    base_scale,
                    phase: rng.gen::<f32>() * TAU,
                    speed: range(rng, config.speed.0, config.speed.1),
                    rotation: Vec3::new(
                        rng.gen::<f32>() * TAU,
                        rng.gen::<f32>() * TAU,
                        rng.gen::<f32>() * TAU,
                    ),
                    color: pick_color(config.palette, config.emissive, rng),
                }
            })
            .collect();
        let colors = particles.iter().map(|p| p.color).collect();
        Ok(Self {
            blend: BlendFactor::new(config.rates),
            transforms: vec![InstanceTransform::zeroed(); count],
            colors,
            colors_dirty: true,
            particles,
            dims,
            config,
        })
    }

    pub fn id(&self) -> LayerId {
        self.config.id
    }

    pub fn config(&self) -> &LayerConfig {
        &self.config
    }

    pub fn particles(&self) -> &[ParticleSpec] {
        &self.particles
    }

    pub fn transforms(&self) -> &[InstanceTransform] {
        &self.transforms
    }

    #[inline]
    pub fn factor(&self) -> f32 {
        self.blend.value()
    }

    /// Evaluate one particle at `time` for blend factor `f`.
    pub fn pose(&self, index: usize, time: f32, f: f32) -> Pose {
        let p = &self.particles[index];
        let input = MotionInput {
            rest: p.rest_position,
            euler: p.rotation,
            scale: p.base_scale,
            phase: p.phase,
            speed: p.speed,
            index,
            time,
            blend: f,
        };
        let rest = self.config.motion.rest_pose(&input);
        if f == 0.0 {
            return rest;
        }
        let position = self
            .config
            .dispersed
            .position(p.dispersed_seed, rest.position, time, &self.dims);
        let dispersed = self.config.motion.dispersed_pose(&input, &rest, position);
        rest.lerp(&dispersed, f)
    }

    /// Step the blend factor and rebuild every instance transform.
    pub fn tick(&mut self, elapsed: f32, dt: f32, dispersed: bool) {
        let f = self.blend.step(dispersed, dt);
        for i in 0..self.particles.len() {
            let pose = self.pose(i, elapsed, f);
            self.transforms[i] = InstanceTransform::new(pose.position, pose.scale, pose.rotation());
        }
    }

    pub fn emit(&mut self, model: Mat4, sink: &mut dyn InstanceSink) {
        let colors = if self.colors_dirty {
            self.colors_dirty = false;
            Some(self.colors.as_slice())
        } else {
            None
        };
        sink.write_layer(self.config.id, model, &self.transforms, colors);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::layer_rng;

    #[test]
    fn instance_transform_is_tightly_packed() {
        assert_eq!(std::mem::size_of::<InstanceTransform>(), 32);
    }

    #[test]
    fn empty_layer_is_rejected() {
        let mut cfg = LayerConfig::gems();
        cfg.count = 0;
        let mut rng = layer_rng(1, 2);
        assert_eq!(
            ParticleLayer::new(cfg, TreeDims::default(), &mut rng).err(),
            Some(SceneError::EmptyLayer("gems"))
        );
    }

    #[test]
    fn generation_is_reproducible() {
        let a = ParticleLayer::new(LayerConfig::deep(), TreeDims::default(), &mut layer_rng(9, 1))
            .unwrap();
        let b = ParticleLayer::new(LayerConfig::deep(), TreeDims::default(), &mut layer_rng(9, 1))
            .unwrap();
        assert_eq!(a.particles(), b.particles());
    }

    #[test]
    fn palette_weights_are_respected() {
        let mut rng = layer_rng(3, 3);
        let pink = Vec4::new(1.0, 0x69 as f32 / 255.0, 0xB4 as f32 / 255.0, 0.5);
        let hits = (0..10_000)
            .filter(|_| pick_color(&[(WHITE, 0.2), (DREAMY_PINK, 0.8)], 0.5, &mut rng) == pink)
            .count();
        assert!((7_500..8_500).contains(&hits), "{hits}");
    }

    struct Capture(Vec<(LayerId, usize, bool)>);

    impl InstanceSink for Capture {
        fn write_layer(
            &mut self,
            layer: LayerId,
            _model: Mat4,
            transforms: &[InstanceTransform],
            colors: Option<&[Vec4]>,
        ) {
            self.0.push((layer, transforms.len(), colors.is_some()));
        }
    }

    #[test]
    fn colors_are_sent_once() {
        let mut layer =
            ParticleLayer::new(LayerConfig::sparkles(), TreeDims::default(), &mut layer_rng(0, 0))
                .unwrap();
        let mut sink = Capture(Vec::new());
        layer.tick(0.0, 0.016, false);
        layer.emit(Mat4::IDENTITY, &mut sink);
        layer.emit(Mat4::IDENTITY, &mut sink);
        assert_eq!(
            sink.0,
            vec![(LayerId::Sparkles, SPARKLE_COUNT, true), (LayerId::Sparkles, SPARKLE_COUNT, false)]
        );
    }
}
