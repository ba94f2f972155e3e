//! wgpu renderer shared by the web and native front-ends.
//!
//! The scene pass draws every instanced layer into an HDR target with depth,
//! then the post chain (bright pass, separable blur, composite) tone-maps it
//! onto the surface.

mod helpers;
mod instances;
pub mod mesh;
mod photos;
mod post;
mod targets;

use glam::{Mat4, Vec3, Vec4};
use instances::LayerBuffers;
use photos::PhotoTextures;
use post::{PostBindGroups, PostResources};
use std::collections::BTreeMap;
use targets::RenderTargets;
use tree_core::constants::{BLOOM_STRENGTH, BLOOM_THRESHOLD, PHOTO_COUNT};
use tree_core::{Camera, InstanceSink, InstanceTransform, LayerId};

pub static SCENE_WGSL: &str = include_str!("../shaders/scene.wgsl");
pub static POST_WGSL: &str = include_str!("../shaders/post.wgsl");

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct Globals {
    view_proj: [[f32; 4]; 4],
    eye: [f32; 4],
    light_dir: [f32; 4],
}

pub struct Renderer<'w> {
    surface: wgpu::Surface<'w>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    targets: RenderTargets,
    post: PostResources,
    post_groups: PostBindGroups,
    globals_buffer: wgpu::Buffer,
    globals_bg: wgpu::BindGroup,
    scene_pipeline: wgpu::RenderPipeline,
    photo_pipeline: wgpu::RenderPipeline,
    layers: BTreeMap<LayerId, LayerBuffers>,
    photos: PhotoTextures,
    width: u32,
    height: u32,
    clear_color: wgpu::Color,
    bloom_strength: f32,
    bloom_threshold: f32,
}

fn scene_pipeline(
    device: &wgpu::Device,
    label: &str,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    entries: (&str, &str),
    cull_mode: Option<wgpu::Face>,
) -> wgpu::RenderPipeline {
    let buffers = instances::vertex_layouts();
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some(entries.0),
            buffers: &buffers,
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        primitive: wgpu::PrimitiveState {
            cull_mode,
            ..Default::default()
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: helpers::DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some(entries.1),
            targets: &[Some(wgpu::ColorTargetState {
                format: helpers::HDR_FORMAT,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        cache: None,
        multiview: None,
    })
}

impl<'w> Renderer<'w> {
    pub async fn new(
        target: impl Into<wgpu::SurfaceTarget<'w>>,
        width: u32,
        height: u32,
    ) -> anyhow::Result<Self> {
        let width = width.max(1);
        let height = height.max(1);
        let instance = wgpu::Instance::default();
        let surface = instance.create_surface(target)?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow::anyhow!("No GPU adapter"))?;
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    required_features: wgpu::Features::empty(),
                    // default limits keep older WebGPU implementations happy
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::Performance,
                    label: None,
                },
                None,
            )
            .await
            .map_err(|e| anyhow::anyhow!("request_device error: {e:?}"))?;
        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| {
                matches!(
                    f,
                    wgpu::TextureFormat::Bgra8UnormSrgb | wgpu::TextureFormat::Rgba8UnormSrgb
                )
            })
            .or_else(|| caps.formats.first().copied())
            .ok_or_else(|| anyhow::anyhow!("surface reports no formats"))?;
        let alpha_mode = caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let targets = RenderTargets::new(&device, width, height);

        let post_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("post_shader"),
            source: wgpu::ShaderSource::Wgsl(POST_WGSL.into()),
        });
        let post = post::create_post_resources(&device, &post_shader, format);
        let post_groups = post.bind_groups(&device, &targets);

        let scene_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("scene_shader"),
            source: wgpu::ShaderSource::Wgsl(SCENE_WGSL.into()),
        });
        let globals_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("globals_bgl"),
            entries: &[helpers::uniform_entry(0, wgpu::ShaderStages::VERTEX_FRAGMENT)],
        });
        let layer_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("layer_bgl"),
            entries: &[helpers::uniform_entry(0, wgpu::ShaderStages::VERTEX)],
        });
        let globals_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("globals"),
            size: std::mem::size_of::<Globals>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let globals_bg = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("globals_bg"),
            layout: &globals_bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: globals_buffer.as_entire_binding(),
            }],
        });
        let photos = PhotoTextures::new(&device, &queue, PHOTO_COUNT);

        let scene_pl = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("pl_scene"),
            bind_group_layouts: &[&globals_bgl, &layer_bgl],
            push_constant_ranges: &[],
        });
        let photo_pl = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("pl_photo"),
            bind_group_layouts: &[&globals_bgl, &layer_bgl, &photos.layout],
            push_constant_ranges: &[],
        });
        let scene_pipe = scene_pipeline(
            &device,
            "scene_pipeline",
            &scene_pl,
            &scene_shader,
            ("vs_main", "fs_main"),
            Some(wgpu::Face::Back),
        );
        // frames are seen from both sides
        let photo_pipeline = scene_pipeline(
            &device,
            "photo_pipeline",
            &photo_pl,
            &scene_shader,
            ("vs_photo", "fs_photo"),
            None,
        );

        let layers = LayerId::ALL
            .iter()
            .map(|&id| (id, LayerBuffers::new(&device, &layer_bgl, id)))
            .collect();

        log::info!("[render] ready {width}x{height} {format:?}");
        Ok(Self {
            surface,
            device,
            queue,
            config,
            targets,
            post,
            post_groups,
            globals_buffer,
            globals_bg,
            scene_pipeline: scene_pipe,
            photo_pipeline,
            layers,
            photos,
            width,
            height,
            clear_color: wgpu::Color {
                r: 0.01,
                g: 0.0,
                b: 0.02,
                a: 1.0,
            },
            bloom_strength: BLOOM_STRENGTH,
            bloom_threshold: BLOOM_THRESHOLD,
        })
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn set_bloom(&mut self, strength: f32, threshold: f32) {
        self.bloom_strength = strength.max(0.0);
        self.bloom_threshold = threshold.max(0.0);
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 || (width == self.width && height == self.height) {
            return;
        }
        self.width = width;
        self.height = height;
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.targets.recreate(&self.device, width, height);
        // bind groups hold views of the old targets
        self.post_groups = self.post.bind_groups(&self.device, &self.targets);
    }

    /// Re-apply the current configuration, e.g. after `SurfaceError::Lost`.
    pub fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
    }

    pub fn set_camera(&mut self, camera: &Camera) {
        let globals = Globals {
            view_proj: camera.view_proj().to_cols_array_2d(),
            eye: camera.eye.extend(1.0).to_array(),
            light_dir: Vec3::new(0.4, 0.8, 0.6).normalize().extend(0.0).to_array(),
        };
        self.queue
            .write_buffer(&self.globals_buffer, 0, bytemuck::bytes_of(&globals));
    }

    /// Replace the texture of gallery slot `index` with tightly packed RGBA8.
    pub fn upload_photo(
        &mut self,
        index: usize,
        width: u32,
        height: u32,
        rgba: &[u8],
    ) -> anyhow::Result<()> {
        self.photos
            .upload(&self.device, &self.queue, index, width, height, rgba)
    }

    pub fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        let frame = self.surface.get_current_texture()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("encoder"),
            });
        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.targets.hdr_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.targets.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            rpass.set_bind_group(0, &self.globals_bg, &[]);

            rpass.set_pipeline(&self.scene_pipeline);
            for (id, layer) in self.layers.iter() {
                if *id == LayerId::Photos || layer.count == 0 {
                    continue;
                }
                rpass.set_bind_group(1, &layer.bind_group, &[]);
                rpass.set_vertex_buffer(0, layer.mesh.slice(..));
                rpass.set_vertex_buffer(1, layer.transforms.slice(..));
                rpass.set_vertex_buffer(2, layer.colors.slice(..));
                rpass.draw(0..layer.vertex_count, 0..layer.count);
            }

            if let Some(photos) = self.layers.get(&LayerId::Photos) {
                rpass.set_pipeline(&self.photo_pipeline);
                rpass.set_bind_group(1, &photos.bind_group, &[]);
                rpass.set_vertex_buffer(0, photos.mesh.slice(..));
                rpass.set_vertex_buffer(1, photos.transforms.slice(..));
                rpass.set_vertex_buffer(2, photos.colors.slice(..));
                for i in 0..photos.count {
                    if let Some(tex) = self.photos.slot(i as usize) {
                        rpass.set_bind_group(2, tex, &[]);
                        rpass.draw(0..photos.vertex_count, i..i + 1);
                    }
                }
            }
        }

        self.post.write_uniforms(
            &self.queue,
            self.width,
            self.height,
            self.bloom_strength,
            self.bloom_threshold,
        );
        self.post
            .run(&mut encoder, &self.post_groups, &self.targets, &view);

        self.queue.submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }
}

impl InstanceSink for Renderer<'_> {
    fn write_layer(
        &mut self,
        layer: LayerId,
        model: Mat4,
        transforms: &[InstanceTransform],
        colors: Option<&[Vec4]>,
    ) {
        let Some(buffers) = self.layers.get_mut(&layer) else {
            return;
        };
        buffers.write(&self.device, &self.queue, model, transforms, colors);
    }
}
