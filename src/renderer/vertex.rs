//! GPU vertex layout produced by the chunk mesh builder.

use bytemuck::{Pod, Zeroable};

/// Matches the HLSL layout:
/// `float3 position; float2 uv; float3 normal; float2 lightmapCoord; unorm4 color;`
///
/// Color packing depends on render type (see the mesh builder): SOLID and
/// CUTOUT store shade in rgb and AO in alpha ("separate AO" mode);
/// TRANSLUCENT stores shade premultiplied by AO in rgb with alpha at full
/// opacity.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct TerrainVertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
    pub normal: [f32; 3],
    pub lightmap_coord: [f32; 2],
    pub color: [u8; 4],
}

impl TerrainVertex {
    pub fn new(
        position: [f32; 3],
        uv: [f32; 2],
        normal: [f32; 3],
        lightmap_coord: [f32; 2],
        color: [u8; 4],
    ) -> Self {
        Self {
            position,
            uv,
            normal,
            lightmap_coord,
            color,
        }
    }
}
