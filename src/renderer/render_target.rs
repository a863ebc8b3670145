//! Render Target and Render Target Manager: double-buffered color targets
//! with deterministic per-frame read/write index rotation.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use crate::constants::RENDER_TARGET_FLIP_COUNT;
use crate::error::{EngineError, EngineResult};
use crate::gpu::bindless::{BindlessResourceManager, GpuResourceId};
use crate::renderer::flip_state::RenderTargetFlipState;

static NEXT_RESOURCE_ID: AtomicU64 = AtomicU64::new(1);

fn next_resource_id() -> GpuResourceId {
    GpuResourceId(NEXT_RESOURCE_ID.fetch_add(1, Ordering::Relaxed))
}

/// Externally supplied mip-generation strategy. Shader compilation and
/// pipeline construction are out of this core's scope; the manager only
/// knows *when* mips need regenerating, not *how* to blit them.
pub trait MipmapGenerator {
    fn generate(&self, encoder: &mut wgpu::CommandEncoder, texture: &wgpu::Texture, mip_level_count: u32);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadAction {
    Load,
    Clear,
    DontCare,
}

/// Builder inputs for one render target.
#[derive(Debug, Clone)]
pub struct RenderTargetDesc {
    pub name: String,
    pub width_scale: f32,
    pub height_scale: f32,
    pub absolute_dims: Option<(u32, u32)>,
    pub format: wgpu::TextureFormat,
    pub enable_flipper: bool,
    pub load_action: LoadAction,
    pub clear_value: wgpu::Color,
    pub enable_mipmap: bool,
    pub allow_linear_filter: bool,
    pub sample_count: u32,
}

impl RenderTargetDesc {
    fn resolve_dims(&self, base_width: u32, base_height: u32) -> (u32, u32) {
        self.absolute_dims.unwrap_or((
            ((base_width as f32) * self.width_scale).round().max(1.0) as u32,
            ((base_height as f32) * self.height_scale).round().max(1.0) as u32,
        ))
    }

    fn mip_level_count(&self, width: u32, height: u32) -> u32 {
        if self.enable_mipmap {
            32 - width.max(height).leading_zeros()
        } else {
            1
        }
    }
}

struct TextureSlot {
    resource_id: GpuResourceId,
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    bindless_index: u32,
}

/// A pair (Main, Alt) of color textures, each registered bindless. When
/// `enable_flipper` is false, Alt aliases Main (same underlying resource
/// and bindless index).
pub struct RenderTarget {
    desc: RenderTargetDesc,
    main: TextureSlot,
    alt: TextureSlot,
    width: u32,
    height: u32,
}

impl RenderTarget {
    pub fn create(
        device: &wgpu::Device,
        bindless: &BindlessResourceManager,
        desc: RenderTargetDesc,
        base_width: u32,
        base_height: u32,
    ) -> EngineResult<Self> {
        let (width, height) = desc.resolve_dims(base_width, base_height);
        let mip_level_count = desc.mip_level_count(width, height);

        let main = Self::create_slot(device, bindless, &desc, width, height, mip_level_count, "main")?;
        let alt = if desc.enable_flipper {
            Self::create_slot(device, bindless, &desc, width, height, mip_level_count, "alt")?
        } else {
            // Alias: same texture/view/resource id/bindless index as Main.
            TextureSlot {
                resource_id: main.resource_id,
                texture: main.texture.clone(),
                view: main.texture.create_view(&wgpu::TextureViewDescriptor::default()),
                bindless_index: main.bindless_index,
            }
        };

        Ok(Self {
            desc,
            main,
            alt,
            width,
            height,
        })
    }

    fn create_slot(
        device: &wgpu::Device,
        bindless: &BindlessResourceManager,
        desc: &RenderTargetDesc,
        width: u32,
        height: u32,
        mip_level_count: u32,
        slot_name: &str,
    ) -> EngineResult<TextureSlot> {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(&format!("{}-{}", desc.name, slot_name)),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count,
            sample_count: desc.sample_count,
            dimension: wgpu::TextureDimension::D2,
            format: desc.format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let resource_id = next_resource_id();
        let bindless_index = bindless.register_texture_2d(resource_id)?;
        Ok(TextureSlot {
            resource_id,
            texture,
            view,
            bindless_index,
        })
    }

    pub fn get_main_texture_index(&self) -> u32 {
        self.main.bindless_index
    }

    pub fn get_alt_texture_index(&self) -> u32 {
        self.alt.bindless_index
    }

    pub fn main_view(&self) -> &wgpu::TextureView {
        &self.main.view
    }

    pub fn alt_view(&self) -> &wgpu::TextureView {
        &self.alt.view
    }

    pub fn dims(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// `{ readIndices[16], writeIndices[16] }` uploaded once per frame when the
/// flip state changes.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct RenderTargetsBuffer {
    pub read_indices: [u32; RENDER_TARGET_FLIP_COUNT],
    pub write_indices: [u32; RENDER_TARGET_FLIP_COUNT],
}

impl Default for RenderTargetsBuffer {
    fn default() -> Self {
        Self {
            read_indices: [0; RENDER_TARGET_FLIP_COUNT],
            write_indices: [0; RENDER_TARGET_FLIP_COUNT],
        }
    }
}

/// Owns ≤16 render targets, a `BufferFlipState<16>`, and the per-frame
/// upload of their read/write index table.
pub struct RenderTargetManager {
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    bindless: Arc<BindlessResourceManager>,
    targets: Vec<RenderTarget>,
    flip_state: RenderTargetFlipState,
    base_width: u32,
    base_height: u32,
    upload_buffer: Option<wgpu::Buffer>,
    upload_bindless_index: Option<u32>,
    upload_resource_id: Option<GpuResourceId>,
}

impl RenderTargetManager {
    pub fn new(
        device: Arc<wgpu::Device>,
        queue: Arc<wgpu::Queue>,
        bindless: Arc<BindlessResourceManager>,
        base_width: u32,
        base_height: u32,
        descs: Vec<RenderTargetDesc>,
    ) -> EngineResult<Self> {
        if descs.is_empty() || descs.len() > RENDER_TARGET_FLIP_COUNT {
            return Err(EngineError::InvalidConfig {
                field: "render_targets".into(),
                value: descs.len().to_string(),
                reason: "must register between 1 and 16 render targets".into(),
            });
        }
        let mut targets = Vec::with_capacity(descs.len());
        for desc in descs {
            targets.push(RenderTarget::create(&device, &bindless, desc, base_width, base_height)?);
        }
        Ok(Self {
            device,
            queue,
            bindless,
            targets,
            flip_state: RenderTargetFlipState::new(),
            base_width,
            base_height,
            upload_buffer: None,
            upload_bindless_index: None,
            upload_resource_id: None,
        })
    }

    fn check_index(&self, i: usize) -> EngineResult<()> {
        if i >= self.targets.len() {
            return Err(EngineError::InvalidConfig {
                field: "render_target_index".into(),
                value: i.to_string(),
                reason: format!("out of range for {} registered targets", self.targets.len()),
            });
        }
        Ok(())
    }

    pub fn flip(&mut self, i: usize) -> EngineResult<()> {
        self.check_index(i)?;
        self.flip_state.flip(i);
        Ok(())
    }

    pub fn flip_all(&mut self) {
        self.flip_state.flip_all();
    }

    pub fn reset(&mut self) {
        self.flip_state.reset();
    }

    pub fn is_flipped(&self, i: usize) -> EngineResult<bool> {
        self.check_index(i)?;
        Ok(self.flip_state.is_flipped(i))
    }

    pub fn target(&self, i: usize) -> EngineResult<&RenderTarget> {
        self.check_index(i)?;
        Ok(&self.targets[i])
    }

    /// Recreates each render target at the new base resolution, which
    /// re-registers bindless indices (they change), then regenerates the
    /// upload buffer.
    pub fn on_resize(&mut self, new_width: u32, new_height: u32) -> EngineResult<()> {
        let mut rebuilt = Vec::with_capacity(self.targets.len());
        for target in &self.targets {
            self.bindless.unregister(target.main.resource_id);
            if target.desc.enable_flipper {
                self.bindless.unregister(target.alt.resource_id);
            }
            rebuilt.push(RenderTarget::create(
                &self.device,
                &self.bindless,
                target.desc.clone(),
                new_width,
                new_height,
            )?);
        }
        self.targets = rebuilt;
        self.base_width = new_width;
        self.base_height = new_height;
        self.build_render_targets_buffer()?;
        Ok(())
    }

    /// Rebuilds `readIndices`/`writeIndices` from the current flip state
    /// and uploads them, returning the buffer's bindless index.
    pub fn build_render_targets_buffer(&mut self) -> EngineResult<u32> {
        let mut buffer = RenderTargetsBuffer::default();
        for (i, target) in self.targets.iter().enumerate() {
            let flipped = self.flip_state.is_flipped(i);
            let (read, write) = if flipped {
                (target.get_alt_texture_index(), target.get_main_texture_index())
            } else {
                (target.get_main_texture_index(), target.get_alt_texture_index())
            };
            buffer.read_indices[i] = read;
            buffer.write_indices[i] = write;
        }

        let gpu_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("render-targets-buffer"),
                contents: bytemuck::bytes_of(&buffer),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            });

        if let Some(old_id) = self.upload_resource_id.take() {
            self.bindless.unregister(old_id);
        }
        let resource_id = next_resource_id();
        let index = self.bindless.register_buffer(resource_id)?;
        self.upload_resource_id = Some(resource_id);
        self.upload_bindless_index = Some(index);
        self.upload_buffer = Some(gpu_buffer);
        Ok(index)
    }

    pub fn generate_mipmaps(&self, encoder: &mut wgpu::CommandEncoder, generator: &dyn MipmapGenerator) {
        for target in &self.targets {
            if !target.desc.enable_mipmap {
                continue;
            }
            let mip_level_count = target.desc.mip_level_count(target.width, target.height);
            generator.generate(encoder, &target.main.texture, mip_level_count);
            if target.desc.enable_flipper {
                generator.generate(encoder, &target.alt.texture, mip_level_count);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}
