//! End-to-end scenarios spanning a full module each: sky light passing
//! through a transparent block, face culling across a chunk boundary, the
//! buffer-flip read/write table, and adaptive quad triangulation.

use std::sync::Arc;

use voxel_render_core::renderer::flip_state::BufferFlipState;
use voxel_render_core::world::core::block_state::{
    FluidState, RenderFace, RenderShape, RenderType, StaticBlockState,
};
use voxel_render_core::world::core::direction::Direction;
use voxel_render_core::world::core::position::ChunkPos;
use voxel_render_core::world::light_cache_operations::{local_index, set_is_sky, set_sky_light};
use voxel_render_core::world::lighting::CompositeLightEngine;
use voxel_render_core::world::mesh::ao::should_flip_quad;
use voxel_render_core::world::{build_mesh, BlockIterator, Chunk, ChunkState};

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

fn glass_block() -> Arc<StaticBlockState> {
    Arc::new(StaticBlockState {
        light_emission: 0,
        light_block: 0,
        propagates_skylight_down: true,
        can_occlude: false,
        is_full_opaque: false,
        same_type_skip: false,
        render_shape: RenderShape::Model,
        render_type: RenderType::Cutout,
        render_faces: cube_faces(),
        fluid_state: FluidState::empty(),
    })
}

/// Builds an `(xs.len() x ys.len())` grid of `Active` chunks with every
/// horizontal neighbor link wired up, so any interior chunk satisfies
/// `neighbors_active()`. Returns the grid indexed `[xi][yi]`.
fn active_chunk_grid(
    xs: std::ops::RangeInclusive<i32>,
    ys: std::ops::RangeInclusive<i32>,
) -> Vec<Vec<Arc<Chunk<StaticBlockState>>>> {
    let xs: Vec<i32> = xs.collect();
    let ys: Vec<i32> = ys.collect();
    let grid: Vec<Vec<Arc<Chunk<StaticBlockState>>>> = xs
        .iter()
        .map(|&x| {
            ys.iter()
                .map(|&y| {
                    let chunk = Arc::new(Chunk::new(ChunkPos::new(x, y)));
                    chunk.set_state(ChunkState::Active);
                    chunk
                })
                .collect()
        })
        .collect();

    for (xi, _) in xs.iter().enumerate() {
        for (yi, _) in ys.iter().enumerate() {
            let chunk = &grid[xi][yi];
            if xi + 1 < xs.len() {
                chunk.set_east(Some(Arc::downgrade(&grid[xi + 1][yi])));
            }
            if xi > 0 {
                chunk.set_west(Some(Arc::downgrade(&grid[xi - 1][yi])));
            }
            if yi + 1 < ys.len() {
                chunk.set_north(Some(Arc::downgrade(&grid[xi][yi + 1])));
            }
            if yi > 0 {
                chunk.set_south(Some(Arc::downgrade(&grid[xi][yi - 1])));
            }
        }
    }
    grid
}

/// S3 — a glass block sitting at the top of an otherwise empty column lets
/// the sky-light engine's skylight-above-exactly-15 shortcut carry full
/// brightness down through it and every open air cell beneath.
#[test]
fn glass_block_passes_full_skylight_into_the_column_below() {
    let chunk = Arc::new(Chunk::<StaticBlockState>::new(ChunkPos::new(0, 0)));
    chunk.with_light_cache_mut(|cache| {
        for z in 65u16..=255 {
            set_is_sky(cache, local_index(0, 0, z), true);
            set_sky_light(cache, local_index(0, 0, z), 15);
        }
    });
    chunk.set_block(local_index(0, 0, 64), Some(glass_block()));

    let mut engine = CompositeLightEngine::<StaticBlockState>::new();
    for z in 0u16..=64 {
        engine
            .sky_engine_mut()
            .mark_dirty(BlockIterator::new(chunk.clone(), local_index(0, 0, z)));
    }
    engine.run_light_updates().unwrap();

    let get = |z: u16| {
        let iter = BlockIterator::new(chunk.clone(), local_index(0, 0, z));
        engine.get_sky_light(&iter)
    };
    assert_eq!(get(64), 15, "glass itself reads the full skylight value above it");
    assert_eq!(get(0), 15, "open air below transparent glass is never attenuated");
}

/// S4 — two chunks, each with a solid block abutting the shared boundary:
/// with both present and `Active`, the touching east/west faces are culled
/// from both chunks' opaque streams.
#[test]
fn chunk_boundary_faces_cull_when_the_neighbor_is_present() {
    let grid = active_chunk_grid(-1..=2, -1..=1);
    let chunk_a = grid[1][1].clone(); // (0, 0)
    let chunk_b = grid[2][1].clone(); // (1, 0)

    chunk_a.set_block(local_index(15, 0, 64), Some(solid_cube()));
    chunk_b.set_block(local_index(0, 0, 64), Some(solid_cube()));

    let mesh_a = build_mesh(&chunk_a).expect("chunk A meshable");
    let mesh_b = build_mesh(&chunk_b).expect("chunk B meshable");
    // each cube alone emits 6 faces; the shared east/west pair is culled
    assert_eq!(mesh_a.opaque.quad_count(), 5);
    assert_eq!(mesh_b.opaque.quad_count(), 5);
}

/// S5 — buffer-flip table: with 4 render targets and `Flip(1); Flip(2)`
/// from reset, target `i` reads its `alt` half and writes `main` exactly
/// when `i` is flipped, otherwise the reverse.
#[test]
fn buffer_flip_table_matches_expected_read_write_assignment() {
    let mut state: BufferFlipState<4> = BufferFlipState::new();
    state.flip(1);
    state.flip(2);

    let labels = |i: usize, flipped: bool| if flipped { format!("alt{i}") } else { format!("main{i}") };
    let read: Vec<String> = (0..4).map(|i| labels(i, state.is_flipped(i))).collect();
    let write: Vec<String> = (0..4)
        .map(|i| labels(i, !state.is_flipped(i)))
        .collect();

    assert_eq!(read, vec!["main0", "alt1", "alt2", "main3"]);
    assert_eq!(write, vec!["alt0", "main1", "main2", "alt3"]);
}

/// S6 — adaptive triangulation: AO `(1.0, 1.0, 0.2, 1.0)` must flip to the
/// `(1,3)` diagonal since `ao[1]+ao[3]=2.0 > ao[0]+ao[2]=1.2`.
#[test]
fn adaptive_triangulation_flips_to_the_brighter_diagonal() {
    let ao = [1.0f32, 1.0, 0.2, 1.0];
    assert!(should_flip_quad(&ao));
}
