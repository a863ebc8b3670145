//! Two-pass chunk mesh builder: pass 1 counts visible faces per render
//! type to pre-size the vertex streams, pass 2 emits geometry.

use std::sync::Arc;

use crate::constants::{CHUNK_SIZE_X, CHUNK_SIZE_Y, CHUNK_SIZE_Z, MAX_LIGHT_LEVEL, MIN_AMBIENT_SKYLIGHT};
use crate::world::block_iterator::BlockIterator;
use crate::world::chunk::{Chunk, ChunkState};
use crate::world::core::block_state::{BlockState, RenderShape, RenderType};
use crate::world::core::direction::Direction;
use crate::world::light_cache_operations::{get_block_light, get_sky_light, local_index};
use crate::world::mesh::ao::{calculate_face_ao, should_flip_quad};
use crate::world::mesh::chunk_mesh::ChunkMesh;
use crate::renderer::vertex::TerrainVertex;

fn should_render_block<B: BlockState>(block: Option<&Arc<B>>) -> bool {
    match block {
        None => false,
        Some(b) => b.render_shape() != RenderShape::Invisible,
    }
}

/// `ShouldRenderFace`: cull against a solid neighbor of the same occlusion
/// strength, but always draw cutout/translucent faces against an opaque
/// neighbor since they have transparent parts that must show through.
fn should_render_face<B: BlockState>(iter: &BlockIterator<B>, dir: Direction) -> bool {
    let Some(current) = iter.block() else {
        return false;
    };

    let neighbor = iter.get_neighbor(dir);
    if !neighbor.is_valid() {
        return true;
    }
    let Some(neighbor_block) = neighbor.block() else {
        return true;
    };

    if current.skip_rendering(neighbor_block.as_ref(), dir) {
        return false;
    }

    if neighbor_block.can_occlude() {
        current.render_type() != RenderType::Solid
    } else {
        true
    }
}

/// `(blockLight, skyLight)` normalized to `[0,1]`, with a floor so unlit
/// exterior faces stay faintly visible. Missing or unloaded neighbors read
/// as `(0, 1/15)`.
fn neighbor_lighting<B: BlockState>(neighbor: &BlockIterator<B>) -> (f32, f32) {
    let mut sky = MIN_AMBIENT_SKYLIGHT;
    let mut block = 0.0f32;

    if let Some(chunk) = neighbor.chunk() {
        let (sky_raw, block_raw) = chunk.with_light_cache(|cache| {
            (
                get_sky_light(cache, neighbor.index()),
                get_block_light(cache, neighbor.index()),
            )
        });
        sky = sky_raw as f32 / MAX_LIGHT_LEVEL as f32;
        block = block_raw as f32 / MAX_LIGHT_LEVEL as f32;
        if sky.max(block) < MIN_AMBIENT_SKYLIGHT {
            sky = MIN_AMBIENT_SKYLIGHT;
        }
    }

    (block, sky)
}

fn block_index(x: u16, y: u16, z: u16) -> u16 {
    local_index(x, y, z)
}

fn block_offset(x: u16, y: u16, z: u16) -> [f32; 3] {
    [x as f32, y as f32, z as f32]
}

/// Runs the full face-visit twice: once to count faces per render type
/// (sizing the vectors), once to actually emit them. Aborts (returns
/// `None`) if the chunk or any horizontal neighbor leaves `Active` mid-build.
pub fn build_mesh<B: BlockState>(chunk: &Arc<Chunk<B>>) -> Option<ChunkMesh> {
    if chunk.state() != ChunkState::Active {
        log::debug!("mesh builder: chunk not Active, aborting");
        return None;
    }
    if !chunk.neighbors_active() {
        log::debug!("mesh builder: not all 4 horizontal neighbors are Active, aborting");
        return None;
    }

    let mut opaque_quads = 0usize;
    let mut cutout_quads = 0usize;
    let mut translucent_quads = 0usize;

    for x in 0..CHUNK_SIZE_X as u16 {
        for y in 0..CHUNK_SIZE_Y as u16 {
            for z in 0..CHUNK_SIZE_Z as u16 {
                let iter = BlockIterator::new(chunk.clone(), block_index(x, y, z));
                let block = iter.block();
                if !should_render_block(block.as_ref()) {
                    continue;
                }
                let render_type = block.as_ref().unwrap().render_type();
                for dir in Direction::ALL {
                    if should_render_face(&iter, dir) {
                        match render_type {
                            RenderType::Solid => opaque_quads += 1,
                            RenderType::Cutout => cutout_quads += 1,
                            RenderType::Translucent => translucent_quads += 1,
                        }
                    }
                }
            }
        }
    }

    let mut mesh = ChunkMesh::default();
    mesh.reserve(opaque_quads, cutout_quads, translucent_quads);

    for x in 0..CHUNK_SIZE_X as u16 {
        for y in 0..CHUNK_SIZE_Y as u16 {
            for z in 0..CHUNK_SIZE_Z as u16 {
                if chunk.state() != ChunkState::Active {
                    log::debug!("mesh builder: chunk state changed mid-build, aborting");
                    return None;
                }
                let iter = BlockIterator::new(chunk.clone(), block_index(x, y, z));
                let block = iter.block();
                if !should_render_block(block.as_ref()) {
                    continue;
                }
                let block = block.unwrap();
                emit_block_faces(&mut mesh, &iter, &block, block_offset(x, y, z));
            }
        }
    }

    Some(mesh)
}

fn emit_block_faces<B: BlockState>(
    mesh: &mut ChunkMesh,
    iter: &BlockIterator<B>,
    block: &Arc<B>,
    offset: [f32; 3],
) {
    let render_type = block.render_type();

    for dir in Direction::ALL {
        if !should_render_face(iter, dir) {
            continue;
        }

        let faces = block.render_faces(dir);
        if faces.is_empty() {
            continue;
        }

        let neighbor = iter.get_neighbor(dir);
        let (neighbor_block_light, neighbor_sky_light) = neighbor_lighting(&neighbor);
        let lightmap_coord = [neighbor_block_light, neighbor_sky_light];

        let normal = dir.normal();
        let shade = dir.shade_u8();
        let ao = calculate_face_ao(iter, dir);
        let flip = should_flip_quad(&ao);

        for face in faces {
            let mut quad = [TerrainVertex::new([0.0; 3], [0.0; 2], normal, lightmap_coord, [0; 4]); 4];
            for v in 0..4 {
                let position = [
                    offset[0] + face.positions[v][0],
                    offset[1] + face.positions[v][1],
                    offset[2] + face.positions[v][2],
                ];
                let color = if render_type == RenderType::Translucent {
                    let shaded = (shade as f32 * ao[v]) as u8;
                    [shaded, shaded, shaded, 255]
                } else {
                    let a = (ao[v] * 255.0).round() as u8;
                    [shade, shade, shade, a]
                };
                quad[v] = TerrainVertex::new(position, face.uvs[v], normal, lightmap_coord, color);
            }

            let stream = match render_type {
                RenderType::Solid => &mut mesh.opaque,
                RenderType::Cutout => &mut mesh.cutout,
                RenderType::Translucent => &mut mesh.translucent,
            };
            stream.push_quad(quad, flip, false);

            if render_type == RenderType::Translucent && dir == Direction::Up && !block.fluid_state().is_empty() {
                emit_water_backface(mesh, iter, block, quad, flip, normal);
            }
        }
    }
}

/// Generates the underwater-looking-up view of a water surface: a second
/// quad with flipped winding and inverted normal, skipped only when the
/// block directly above is the same fluid (that face would be culled anyway).
fn emit_water_backface<B: BlockState>(
    mesh: &mut ChunkMesh,
    iter: &BlockIterator<B>,
    block: &Arc<B>,
    quad: [TerrainVertex; 4],
    flip: bool,
    normal: [f32; 3],
) {
    let up = iter.get_neighbor(Direction::Up);
    if up.is_valid() {
        if let Some(up_block) = up.block() {
            if !up_block.fluid_state().is_empty() && up_block.fluid_state().is_same(block.fluid_state()) {
                return;
            }
        }
    }

    let flipped_normal = [-normal[0], -normal[1], -normal[2]];
    let mut backface = quad;
    for v in backface.iter_mut() {
        v.normal = flipped_normal;
    }
    mesh.translucent_backface.push_quad(backface, flip, true);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::core::block_state::{FluidState, RenderFace, StaticBlockState};
    use crate::world::core::position::ChunkPos;

    fn cube_faces() -> [Vec<RenderFace>; 6] {
        Direction::ALL.map(|dir| {
            vec![RenderFace {
                direction: dir,
                positions: [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]],
                uvs: [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]],
                source_color: [255, 255, 255, 255],
            }]
        })
    }

    fn solid_cube() -> Arc<StaticBlockState> {
        Arc::new(StaticBlockState {
            light_emission: 0,
            light_block: 15,
            propagates_skylight_down: false,
            can_occlude: true,
            is_full_opaque: true,
            same_type_skip: false,
            render_shape: RenderShape::Model,
            render_type: RenderType::Solid,
            render_faces: cube_faces(),
            fluid_state: FluidState::empty(),
        })
    }

    /// Returns the center chunk plus the four neighbor `Arc`s, which the
    /// caller must keep alive for the `Weak` neighbor links to resolve.
    fn active_chunk_with_neighbors() -> (Arc<Chunk<StaticBlockState>>, Vec<Arc<Chunk<StaticBlockState>>>) {
        let chunk = Arc::new(Chunk::new(ChunkPos::new(0, 0)));
        chunk.set_state(ChunkState::Active);
        let mut neighbors = Vec::new();
        for (dx, dy) in [(0, 1), (0, -1), (1, 0), (-1, 0)] {
            let n = Arc::new(Chunk::<StaticBlockState>::new(ChunkPos::new(dx, dy)));
            n.set_state(ChunkState::Active);
            match (dx, dy) {
                (0, 1) => chunk.set_north(Some(Arc::downgrade(&n))),
                (0, -1) => chunk.set_south(Some(Arc::downgrade(&n))),
                (1, 0) => chunk.set_east(Some(Arc::downgrade(&n))),
                (-1, 0) => chunk.set_west(Some(Arc::downgrade(&n))),
                _ => unreachable!(),
            }
            neighbors.push(n);
        }
        (chunk, neighbors)
    }

    #[test]
    fn refuses_to_build_without_active_neighbors() {
        let chunk = Arc::new(Chunk::<StaticBlockState>::new(ChunkPos::new(0, 0)));
        chunk.set_state(ChunkState::Active);
        assert!(build_mesh(&chunk).is_none());
    }

    #[test]
    fn single_isolated_block_emits_six_opaque_faces() {
        let (chunk, _neighbors) = active_chunk_with_neighbors();
        chunk.set_block(block_index(5, 5, 5), Some(solid_cube()));
        let mesh = build_mesh(&chunk).expect("chunk meshable");
        assert_eq!(mesh.opaque.quad_count(), 6);
        assert!(mesh.cutout.is_empty());
        assert!(mesh.translucent.is_empty());
    }

    #[test]
    fn adjacent_solid_blocks_cull_the_shared_face() {
        let (chunk, _neighbors) = active_chunk_with_neighbors();
        chunk.set_block(block_index(5, 5, 5), Some(solid_cube()));
        chunk.set_block(block_index(5, 5, 6), Some(solid_cube()));
        let mesh = build_mesh(&chunk).expect("chunk meshable");
        // each cube would be 6 faces alone; the shared up/down pair is culled
        assert_eq!(mesh.opaque.quad_count(), 10);
    }

    #[test]
    fn vertex_count_matches_face_count_invariant() {
        let (chunk, _neighbors) = active_chunk_with_neighbors();
        chunk.set_block(block_index(0, 0, 0), Some(solid_cube()));
        let mesh = build_mesh(&chunk).unwrap();
        assert_eq!(mesh.opaque.vertices.len(), mesh.opaque.quad_count() * 4);
        assert_eq!(mesh.opaque.indices.len(), mesh.opaque.quad_count() * 6);
    }
}
