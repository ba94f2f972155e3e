mod photos;
mod sim;

use glam::Vec2;
use sim::{KeyboardGestures, SimKey, SimOutcome};
use std::path::PathBuf;
use std::time::Instant;
use tree_core::{Scene, SceneConfig, SceneStore};
use tree_render::Renderer;
use winit::{
    event::*,
    event_loop::EventLoop,
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowBuilder},
};

const DEFAULT_PHOTO_DIR: &str = "assets/photos";

fn sim_key(code: KeyCode) -> Option<SimKey> {
    match code {
        KeyCode::KeyG => Some(SimKey::ToggleGestures),
        KeyCode::KeyO => Some(SimKey::OpenPalm),
        KeyCode::KeyF => Some(SimKey::ClosedFist),
        KeyCode::KeyV => Some(SimKey::Victory),
        KeyCode::Space => Some(SimKey::ToggleExplode),
        KeyCode::Escape => Some(SimKey::Quit),
        _ => None,
    }
}

struct App<'w> {
    window: &'w Window,
    renderer: Renderer<'w>,
    scene: Scene,
    store: SceneStore,
    gestures: KeyboardGestures,
    started: Instant,
    last_frame: Instant,
}

impl<'w> App<'w> {
    fn resize(&mut self, size: winit::dpi::PhysicalSize<u32>) {
        self.renderer.resize(size.width, size.height);
        if size.height > 0 {
            self.scene
                .set_aspect(size.width as f32 / size.height as f32);
        }
    }

    fn set_cursor(&mut self, x: f64, y: f64) {
        let size = self.window.inner_size();
        let w = size.width.max(1) as f32;
        let h = size.height.max(1) as f32;
        self.gestures.set_cursor(Vec2::new(x as f32 / w, y as f32 / h));
    }

    fn key(&mut self, key: SimKey, state: ElementState) -> SimOutcome {
        match state {
            ElementState::Pressed => self.gestures.press(key, &mut self.store),
            ElementState::Released => {
                self.gestures.release(key);
                SimOutcome::Continue
            }
        }
    }

    fn frame(&mut self) -> Result<(), wgpu::SurfaceError> {
        let now = Instant::now();
        let dt = (now - self.last_frame).as_secs_f32();
        self.last_frame = now;

        let now_ms = (now - self.started).as_secs_f64() * 1000.0;
        self.gestures.poll(now_ms, &mut self.store);

        let state = self.store.get();
        self.scene.tick(&state, dt);
        self.scene.emit(&mut self.renderer);
        self.renderer.set_camera(self.scene.camera());
        self.renderer.render()
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .init();

    let photo_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_PHOTO_DIR));

    let config = SceneConfig::default();
    let bindings = config.bindings.clone();
    let scene = Scene::new(config)?;

    let event_loop = EventLoop::new()?;
    let window = WindowBuilder::new()
        .with_title("Particle Tree (native)")
        .build(&event_loop)?;
    let size = window.inner_size();
    let mut renderer = pollster::block_on(Renderer::new(&window, size.width, size.height))?;
    photos::upload_dir(&mut renderer, &photo_dir);
    log::info!("keys: G gestures, O palm, F fist, V victory, Space explode, Esc quit");

    let now = Instant::now();
    let mut app = App {
        window: &window,
        renderer,
        scene,
        store: SceneStore::new(),
        gestures: KeyboardGestures::new(bindings),
        started: now,
        last_frame: now,
    };
    app.resize(size);
    app.store.subscribe(|s| {
        log::info!(
            "[gesture] state {}",
            if s.hand_open { "UNLEASH" } else { "NORMAL" }
        )
    });

    event_loop.run(move |event, elwt| match event {
        Event::WindowEvent {
            event: WindowEvent::Resized(size),
            ..
        } => app.resize(size),
        Event::WindowEvent {
            event: WindowEvent::CloseRequested,
            ..
        } => elwt.exit(),
        Event::WindowEvent {
            event: WindowEvent::CursorMoved { position, .. },
            ..
        } => app.set_cursor(position.x, position.y),
        Event::WindowEvent {
            event:
                WindowEvent::KeyboardInput {
                    event:
                        KeyEvent {
                            physical_key: PhysicalKey::Code(code),
                            state,
                            repeat: false,
                            ..
                        },
                    ..
                },
            ..
        } => {
            if let Some(key) = sim_key(code) {
                if app.key(key, state) == SimOutcome::Quit {
                    elwt.exit();
                }
            }
        }
        Event::AboutToWait => match app.frame() {
            Ok(_) => app.window.request_redraw(),
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                app.renderer.reconfigure()
            }
            Err(wgpu::SurfaceError::OutOfMemory) => elwt.exit(),
            Err(e) => log::warn!("[render] {e:?}"),
        },
        _ => {}
    })?;
    Ok(())
}
