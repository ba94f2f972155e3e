//! The whole animated scene, driven by one `tick` per display frame.

use crate::config::SceneConfig;
use crate::error::SceneResult;
use crate::gallery::{Gallery, GalleryFocus, PhotoFrames};
use crate::layer::{InstanceSink, ParticleLayer};
use crate::seed::layer_rng;
use crate::state::{Camera, SceneState};
use crate::view::ViewController;
use crate::wishes::{WishBook, WishOrbit};
use glam::{Mat4, Vec3};
use rand::rngs::StdRng;

/// Longest step fed to the animators; a backgrounded tab can report seconds.
const MAX_FRAME_DT: f32 = 0.1;

pub struct Scene {
    layers: Vec<ParticleLayer>,
    snow: ParticleLayer,
    view: ViewController,
    gallery: Gallery<StdRng>,
    frames: PhotoFrames,
    wishes: WishBook,
    orbit: WishOrbit,
    camera: Camera,
    elapsed: f32,
}

impl Scene {
    pub fn new(config: SceneConfig) -> SceneResult<Self> {
        config.validate()?;
        let layers = config
            .layers
            .iter()
            .enumerate()
            .map(|(i, layer)| {
                ParticleLayer::new(layer.clone(), config.dims, &mut layer_rng(config.seed, i as u64 + 1))
            })
            .collect::<SceneResult<Vec<_>>>()?;
        let snow = ParticleLayer::new(config.snow.clone(), config.dims, &mut layer_rng(config.seed, 0))?;
        let view = ViewController::new(config.view.clone());
        let gallery = Gallery::new(&config.gallery, layer_rng(config.seed, u64::MAX))?;
        let frames = PhotoFrames::new(config.gallery.clone(), view.model());
        log::info!(
            "scene ready: {} layers, {} particles",
            layers.len() + 1,
            layers.iter().map(|l| l.particles().len()).sum::<usize>() + snow.particles().len()
        );
        Ok(Self {
            layers,
            snow,
            view,
            gallery,
            frames,
            wishes: WishBook::new(),
            orbit: WishOrbit::default(),
            camera: Camera::default(),
            elapsed: 0.0,
        })
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        if aspect.is_finite() && aspect > 0.0 {
            self.camera.aspect = aspect;
        }
    }

    pub fn view(&self) -> &ViewController {
        &self.view
    }

    pub fn layers(&self) -> &[ParticleLayer] {
        &self.layers
    }

    pub fn focus(&self) -> GalleryFocus {
        self.gallery.focus()
    }

    pub fn frames(&self) -> &PhotoFrames {
        &self.frames
    }

    pub fn wishes(&self) -> &WishBook {
        &self.wishes
    }

    pub fn wishes_mut(&mut self) -> &mut WishBook {
        &mut self.wishes
    }

    /// Current world positions of the orbiting wish diamonds, in
    /// [`WishBook::orbiting`] order.
    pub fn wish_positions(&self) -> Vec<Vec3> {
        self.orbit.positions().collect()
    }

    /// Advance every animator by `dt` seconds against a snapshot of the state.
    /// A non-finite `dt` counts as a zero-length step.
    pub fn tick(&mut self, state: &SceneState, dt: f32) {
        let dt = if dt.is_finite() {
            dt.clamp(0.0, MAX_FRAME_DT)
        } else {
            0.0
        };
        self.elapsed += dt;
        let t = self.elapsed;

        self.view.tick(state, dt);
        for layer in &mut self.layers {
            layer.tick(t, dt, state.exploded);
        }
        self.snow.tick(t, dt, false);

        let focus = self.gallery.tick(state, dt);
        self.frames
            .tick(state, focus, &self.camera, self.view.model(), t, dt);
        self.orbit.tick(&self.wishes, t);
    }

    /// Hand the current frame to the renderer.
    pub fn emit(&mut self, sink: &mut dyn InstanceSink) {
        let model = self.view.model();
        for layer in &mut self.layers {
            layer.emit(model, sink);
        }
        self.snow.emit(Mat4::IDENTITY, sink);
        self.frames.emit(sink);
        self.orbit.emit(sink);
    }
}
