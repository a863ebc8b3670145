//! Shadow Render Target Manager: the same flip-managed design as
//! `RenderTargetManager`, specialized for a fixed-square-resolution shadow
//! atlas with lazy color-target creation and two depth textures.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::constants::{DEFAULT_SHADOW_RESOLUTION, SHADOW_FLIP_COUNT};
use crate::error::{EngineError, EngineResult};
use crate::gpu::bindless::{BindlessResourceManager, GpuResourceId};
use crate::renderer::flip_state::ShadowFlipState;

static NEXT_SHADOW_RESOURCE_ID: AtomicU64 = AtomicU64::new(1);

fn next_resource_id() -> GpuResourceId {
    GpuResourceId(NEXT_SHADOW_RESOURCE_ID.fetch_add(1 << 32, Ordering::Relaxed))
}

struct ShadowColorTarget {
    texture: wgpu::Texture,
    main_view: wgpu::TextureView,
    alt_view: wgpu::TextureView,
    main_index: u32,
    alt_index: u32,
    main_resource: GpuResourceId,
    alt_resource: GpuResourceId,
}

/// Parallel to `RenderTargetManager` but: (a) lazily creates each color
/// target on first `get_or_create`, (b) uses a fixed square resolution
/// independent of the window, (c) has no resize.
pub struct ShadowRenderTargetManager {
    device: Arc<wgpu::Device>,
    bindless: Arc<BindlessResourceManager>,
    resolution: u32,
    format: wgpu::TextureFormat,
    color_targets: Vec<Option<ShadowColorTarget>>,
    flip_state: ShadowFlipState,
    depth_textures: [Option<wgpu::Texture>; 2],
}

impl ShadowRenderTargetManager {
    pub fn new(device: Arc<wgpu::Device>, bindless: Arc<BindlessResourceManager>, resolution: u32) -> Self {
        Self {
            device,
            bindless,
            resolution: if resolution == 0 {
                DEFAULT_SHADOW_RESOLUTION
            } else {
                resolution
            },
            format: wgpu::TextureFormat::Rgba8Unorm,
            color_targets: (0..SHADOW_FLIP_COUNT).map(|_| None).collect(),
            flip_state: ShadowFlipState::new(),
            depth_textures: [None, None],
        }
    }

    fn check_index(&self, i: usize) -> EngineResult<()> {
        if i >= self.color_targets.len() {
            return Err(EngineError::ShadowTargetOutOfRange {
                index: i,
                capacity: self.color_targets.len(),
            });
        }
        Ok(())
    }

    /// Creates the color target at `i` on first access; subsequent calls
    /// return the existing target.
    pub fn get_or_create(&mut self, i: usize) -> EngineResult<()> {
        self.check_index(i)?;
        if self.color_targets[i].is_some() {
            return Ok(());
        }
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(&format!("shadow-color-{}", i)),
            size: wgpu::Extent3d {
                width: self.resolution,
                height: self.resolution,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: self.format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let main_view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let alt_view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let main_resource = next_resource_id();
        let alt_resource = next_resource_id();
        let main_index = self.bindless.register_texture_2d(main_resource)?;
        let alt_index = self.bindless.register_texture_2d(alt_resource)?;
        self.color_targets[i] = Some(ShadowColorTarget {
            texture,
            main_view,
            alt_view,
            main_index,
            alt_index,
            main_resource,
            alt_resource,
        });
        Ok(())
    }

    pub fn get_main_rtv(&self, i: usize) -> EngineResult<&wgpu::TextureView> {
        self.check_index(i)?;
        self.color_targets[i]
            .as_ref()
            .map(|t| &t.main_view)
            .ok_or(EngineError::ShadowTargetNotCreated { index: i })
    }

    pub fn get_alt_rtv(&self, i: usize) -> EngineResult<&wgpu::TextureView> {
        self.check_index(i)?;
        self.color_targets[i]
            .as_ref()
            .map(|t| &t.alt_view)
            .ok_or(EngineError::ShadowTargetNotCreated { index: i })
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

    pub fn set_depth_texture(&mut self, slot: usize, texture: wgpu::Texture) -> EngineResult<()> {
        if slot >= self.depth_textures.len() {
            return Err(EngineError::ShadowTargetOutOfRange {
                index: slot,
                capacity: self.depth_textures.len(),
            });
        }
        self.depth_textures[slot] = Some(texture);
        Ok(())
    }

    pub fn depth_texture(&self, slot: usize) -> EngineResult<&wgpu::Texture> {
        if slot >= self.depth_textures.len() {
            return Err(EngineError::ShadowTargetOutOfRange {
                index: slot,
                capacity: self.depth_textures.len(),
            });
        }
        self.depth_textures[slot]
            .as_ref()
            .ok_or(EngineError::ShadowTargetNotCreated { index: slot })
    }
}
