//! `BlockState`: the external collaborator contract the mesh builder and
//! light engines read from. Block/blockstate registry loading is out of
//! scope; this module only defines the read-only surface consumers need.
//!
//! Per the design notes, the mesh build's hot path must not pay for
//! virtual dispatch on every block query: `BlockState` is a trait so an
//! external registry can supply any storage it likes, but the concrete
//! `StaticBlockState` below is plain precomputed data, and callers that
//! are generic over `B: BlockState` monomorphize rather than going through
//! a vtable.

use crate::world::core::direction::Direction;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderShape {
    Invisible,
    Model,
    EntityBlockAnimated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderType {
    Solid,
    Cutout,
    Translucent,
}

/// One quad (or more, for multi-face blocks like stairs) of a block's
/// render mesh for a given direction. Positions are block-local `[0,1]^3`.
#[derive(Debug, Clone, Copy)]
pub struct RenderFace {
    pub direction: Direction,
    /// Quad-ordered vertex positions, block-local `[0,1]^3`.
    pub positions: [[f32; 3]; 4],
    pub uvs: [[f32; 2]; 4],
    /// Source color before shading/AO is applied.
    pub source_color: [u8; 4],
}

/// Identity of a fluid for same-fluid culling (`SkipRendering`) and the
/// water-backface special case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FluidState {
    pub fluid_id: Option<u32>,
}

impl FluidState {
    pub fn empty() -> Self {
        Self { fluid_id: None }
    }

    pub fn is_empty(self) -> bool {
        self.fluid_id.is_none()
    }

    pub fn is_same(self, other: FluidState) -> bool {
        self.fluid_id.is_some() && self.fluid_id == other.fluid_id
    }
}

/// `-1` in the source API spells "use the implicit default"; this is that
/// default policy, resolved once here rather than scattered through the
/// light engine.
pub fn resolve_light_block(raw: i8, is_full_opaque: bool, propagates_skylight_down: bool) -> u8 {
    if raw >= 0 {
        raw as u8
    } else if is_full_opaque {
        15
    } else if propagates_skylight_down {
        0
    } else {
        1
    }
}

/// Read-only capabilities the light engine and mesh builder need from a
/// block. Air is represented by `Option::None` at the call site, not by a
/// `BlockState` value.
pub trait BlockState {
    fn light_emission(&self) -> u8;
    /// Light attenuation in `0..=15`, already resolved through
    /// [`resolve_light_block`] (no `-1` sentinel at this layer).
    fn light_block(&self) -> u8;
    fn propagates_skylight_down(&self) -> bool;
    fn can_occlude(&self) -> bool;
    fn is_full_opaque(&self) -> bool;
    /// Same-type fluid/glass culling: true if `self`'s face against
    /// `neighbor` in `dir` should never be drawn.
    fn skip_rendering(&self, neighbor: &Self, dir: Direction) -> bool
    where
        Self: Sized;
    fn render_shape(&self) -> RenderShape;
    fn render_type(&self) -> RenderType;
    fn render_faces(&self, dir: Direction) -> &[RenderFace];
    fn fluid_state(&self) -> FluidState;
}

/// Plain-data implementation: every field is precomputed once (typically
/// when the external block registry is built) so that consulting a block's
/// properties during mesh build is a handful of field reads, never a
/// dynamic dispatch.
#[derive(Debug, Clone)]
pub struct StaticBlockState {
    pub light_emission: u8,
    pub light_block: u8,
    pub propagates_skylight_down: bool,
    pub can_occlude: bool,
    pub is_full_opaque: bool,
    pub same_type_skip: bool,
    pub render_shape: RenderShape,
    pub render_type: RenderType,
    /// Faces grouped by direction up front (a block may have multiple
    /// faces per direction, e.g. stairs), so a mesh-build lookup is a
    /// single array index, never a filter.
    pub render_faces: [Vec<RenderFace>; 6],
    pub fluid_state: FluidState,
}

fn direction_slot(dir: Direction) -> usize {
    match dir {
        Direction::North => 0,
        Direction::South => 1,
        Direction::East => 2,
        Direction::West => 3,
        Direction::Up => 4,
        Direction::Down => 5,
    }
}

impl BlockState for StaticBlockState {
    fn light_emission(&self) -> u8 {
        self.light_emission
    }

    fn light_block(&self) -> u8 {
        self.light_block
    }

    fn propagates_skylight_down(&self) -> bool {
        self.propagates_skylight_down
    }

    fn can_occlude(&self) -> bool {
        self.can_occlude
    }

    fn is_full_opaque(&self) -> bool {
        self.is_full_opaque
    }

    fn skip_rendering(&self, neighbor: &Self, dir: Direction) -> bool {
        let _ = dir;
        self.same_type_skip
            && self.fluid_state.is_same(neighbor.fluid_state)
    }

    fn render_shape(&self) -> RenderShape {
        self.render_shape
    }

    fn render_type(&self) -> RenderType {
        self.render_type
    }

    fn render_faces(&self, dir: Direction) -> &[RenderFace] {
        &self.render_faces[direction_slot(dir)]
    }

    fn fluid_state(&self) -> FluidState {
        self.fluid_state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_light_block_sentinel_defaults() {
        assert_eq!(resolve_light_block(5, false, false), 5);
        assert_eq!(resolve_light_block(-1, true, false), 15);
        assert_eq!(resolve_light_block(-1, false, true), 0);
        assert_eq!(resolve_light_block(-1, false, false), 1);
    }

    #[test]
    fn fluid_identity() {
        let water = FluidState { fluid_id: Some(1) };
        let lava = FluidState { fluid_id: Some(2) };
        assert!(water.is_same(water));
        assert!(!water.is_same(lava));
        assert!(!FluidState::empty().is_same(water));
    }
}
