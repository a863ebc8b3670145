//! Smooth per-vertex ambient occlusion and adaptive-diagonal quad
//! triangulation, Minecraft-style: for each face vertex, sample three
//! neighbor blocks (two edges + one corner) and darken by how many of
//! them occlude light.

use crate::world::block_iterator::BlockIterator;
use crate::world::core::block_state::BlockState;
use crate::world::core::direction::Direction;

pub const AO_CURVE: [f32; 4] = [1.0, 0.7, 0.5, 0.2];

#[derive(Clone, Copy)]
struct AoOffset {
    dx: i32,
    dy: i32,
    dz: i32,
}

const fn o(dx: i32, dy: i32, dz: i32) -> AoOffset {
    AoOffset { dx, dy, dz }
}

// Index: [vertex][side1, side2, corner]. Must stay in lockstep with the
// quad vertex order baked into each block's static `RenderFace` positions.
const AO_OFFSETS_UP: [[AoOffset; 3]; 4] = [
    [o(-1, 0, 1), o(0, -1, 1), o(-1, -1, 1)],
    [o(1, 0, 1), o(0, -1, 1), o(1, -1, 1)],
    [o(1, 0, 1), o(0, 1, 1), o(1, 1, 1)],
    [o(-1, 0, 1), o(0, 1, 1), o(-1, 1, 1)],
];

const AO_OFFSETS_DOWN: [[AoOffset; 3]; 4] = [
    [o(-1, 0, -1), o(0, -1, -1), o(-1, -1, -1)],
    [o(-1, 0, -1), o(0, 1, -1), o(-1, 1, -1)],
    [o(1, 0, -1), o(0, 1, -1), o(1, 1, -1)],
    [o(1, 0, -1), o(0, -1, -1), o(1, -1, -1)],
];

const AO_OFFSETS_NORTH: [[AoOffset; 3]; 4] = [
    [o(-1, 1, 0), o(0, 1, -1), o(-1, 1, -1)],
    [o(-1, 1, 0), o(0, 1, 1), o(-1, 1, 1)],
    [o(1, 1, 0), o(0, 1, 1), o(1, 1, 1)],
    [o(1, 1, 0), o(0, 1, -1), o(1, 1, -1)],
];

const AO_OFFSETS_SOUTH: [[AoOffset; 3]; 4] = [
    [o(1, -1, 0), o(0, -1, -1), o(1, -1, -1)],
    [o(1, -1, 0), o(0, -1, 1), o(1, -1, 1)],
    [o(-1, -1, 0), o(0, -1, 1), o(-1, -1, 1)],
    [o(-1, -1, 0), o(0, -1, -1), o(-1, -1, -1)],
];

const AO_OFFSETS_EAST: [[AoOffset; 3]; 4] = [
    [o(1, 1, 0), o(1, 0, -1), o(1, 1, -1)],
    [o(1, 1, 0), o(1, 0, 1), o(1, 1, 1)],
    [o(1, -1, 0), o(1, 0, 1), o(1, -1, 1)],
    [o(1, -1, 0), o(1, 0, -1), o(1, -1, -1)],
];

const AO_OFFSETS_WEST: [[AoOffset; 3]; 4] = [
    [o(-1, -1, 0), o(-1, 0, -1), o(-1, -1, -1)],
    [o(-1, -1, 0), o(-1, 0, 1), o(-1, -1, 1)],
    [o(-1, 1, 0), o(-1, 0, 1), o(-1, 1, 1)],
    [o(-1, 1, 0), o(-1, 0, -1), o(-1, 1, -1)],
];

fn offsets_for(dir: Direction) -> &'static [[AoOffset; 3]; 4] {
    match dir {
        Direction::North => &AO_OFFSETS_NORTH,
        Direction::South => &AO_OFFSETS_SOUTH,
        Direction::East => &AO_OFFSETS_EAST,
        Direction::West => &AO_OFFSETS_WEST,
        Direction::Up => &AO_OFFSETS_UP,
        Direction::Down => &AO_OFFSETS_DOWN,
    }
}

fn block_at_offset<B: BlockState>(iter: &BlockIterator<B>, offset: AoOffset) -> BlockIterator<B> {
    let mut result = iter.clone();
    result = match offset.dx {
        dx if dx > 0 => result.get_neighbor(Direction::East),
        dx if dx < 0 => result.get_neighbor(Direction::West),
        _ => result,
    };
    if !result.is_valid() {
        return result;
    }
    result = match offset.dy {
        dy if dy > 0 => result.get_neighbor(Direction::North),
        dy if dy < 0 => result.get_neighbor(Direction::South),
        _ => result,
    };
    if !result.is_valid() {
        return result;
    }
    match offset.dz {
        dz if dz > 0 => result.get_neighbor(Direction::Up),
        dz if dz < 0 => result.get_neighbor(Direction::Down),
        _ => result,
    }
}

fn is_occluder<B: BlockState>(iter: &BlockIterator<B>) -> bool {
    if !iter.is_valid() {
        return false;
    }
    iter.block().map(|b| b.can_occlude()).unwrap_or(false)
}

/// `occluderCount = (side1 && side2) ? 3 : side1+side2+corner`, looked up
/// against [`AO_CURVE`]. Both sides occluding forces the corner fully dark
/// since the corner block can't be seen past them anyway.
fn vertex_ao(side1: bool, side2: bool, corner: bool) -> f32 {
    let count = if side1 && side2 {
        3
    } else {
        side1 as usize + side2 as usize + corner as usize
    };
    AO_CURVE[count]
}

pub fn calculate_face_ao<B: BlockState>(iter: &BlockIterator<B>, dir: Direction) -> [f32; 4] {
    let offsets = offsets_for(dir);
    let mut ao = [0.0f32; 4];
    for v in 0..4 {
        let side1 = is_occluder(&block_at_offset(iter, offsets[v][0]));
        let side2 = is_occluder(&block_at_offset(iter, offsets[v][1]));
        let corner = is_occluder(&block_at_offset(iter, offsets[v][2]));
        ao[v] = vertex_ao(side1, side2, corner);
    }
    ao
}

/// `true` picks the `(1,3)` diagonal split instead of the default `(0,2)`
/// when it would interpolate brighter, hiding diagonal-crease artifacts.
pub fn should_flip_quad(ao: &[f32; 4]) -> bool {
    let d02 = ao[0] + ao[2];
    let d13 = ao[1] + ao[3];
    d13 > d02
}
