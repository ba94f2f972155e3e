use crate::helpers::{sampler_entry, texture_entry};

/// One texture + bind group per gallery slot; unloaded slots show a
/// neutral placeholder.
pub(crate) struct PhotoTextures {
    pub(crate) layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    slots: Vec<wgpu::BindGroup>,
    textures: Vec<Option<wgpu::Texture>>,
}

const PLACEHOLDER: [u8; 4] = [0x2a, 0x1a, 0x24, 0xff];

impl PhotoTextures {
    pub(crate) fn new(device: &wgpu::Device, queue: &wgpu::Queue, count: usize) -> Self {
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("photo_bgl"),
            entries: &[texture_entry(0), sampler_entry(1)],
        });
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("photo_sampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });
        let mut photos = Self {
            layout,
            sampler,
            slots: Vec::with_capacity(count),
            textures: Vec::with_capacity(count),
        };
        for _ in 0..count {
            let (tex, bg) = photos.make(device, queue, 1, 1, &PLACEHOLDER);
            photos.slots.push(bg);
            photos.textures.push(Some(tex));
        }
        photos
    }

    fn make(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        width: u32,
        height: u32,
        rgba: &[u8],
    ) -> (wgpu::Texture, wgpu::BindGroup) {
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let tex = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("photo_tex"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &tex,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            rgba,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            size,
        );
        let view = tex.create_view(&wgpu::TextureViewDescriptor::default());
        let bg = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("photo_bg"),
            layout: &self.layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });
        (tex, bg)
    }

    pub(crate) fn upload(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        index: usize,
        width: u32,
        height: u32,
        rgba: &[u8],
    ) -> anyhow::Result<()> {
        if index >= self.slots.len() {
            anyhow::bail!("photo slot {index} out of range ({} slots)", self.slots.len());
        }
        if width == 0 || height == 0 || rgba.len() != (width * height * 4) as usize {
            anyhow::bail!("photo {index}: {width}x{height} does not match {} bytes", rgba.len());
        }
        let (tex, bg) = self.make(device, queue, width, height, rgba);
        if let Some(old) = self.textures[index].replace(tex) {
            old.destroy();
        }
        self.slots[index] = bg;
        log::info!("[render] photo {index} uploaded ({width}x{height})");
        Ok(())
    }

    pub(crate) fn slot(&self, index: usize) -> Option<&wgpu::BindGroup> {
        self.slots.get(index)
    }
}
