//! Direction enum ordered to match the face-normal, AO-offset, and
//! neighbor-query tables used throughout the mesh builder and light
//! engines. Engine convention: `+X = forward, +Y = left, +Z = up`.

/// The six axis-aligned directions a block face or light propagation step
/// can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    North,
    South,
    East,
    West,
    Up,
    Down,
}

impl Direction {
    pub const ALL: [Direction; 6] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
        Direction::Up,
        Direction::Down,
    ];

    pub fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
        }
    }

    /// Face normal in engine coordinates.
    pub fn normal(self) -> [f32; 3] {
        match self {
            Direction::North => [0.0, 1.0, 0.0],
            Direction::South => [0.0, -1.0, 0.0],
            Direction::East => [1.0, 0.0, 0.0],
            Direction::West => [-1.0, 0.0, 0.0],
            Direction::Up => [0.0, 0.0, 1.0],
            Direction::Down => [0.0, 0.0, -1.0],
        }
    }

    /// `{E:0.7, W:0.6, S:0.8, N:0.75, U:1.0, D:0.5}`, as a `u8 =
    /// round(shade*255)`.
    pub fn directional_shade(self) -> f32 {
        match self {
            Direction::East => 0.7,
            Direction::West => 0.6,
            Direction::South => 0.8,
            Direction::North => 0.75,
            Direction::Up => 1.0,
            Direction::Down => 0.5,
        }
    }

    pub fn shade_u8(self) -> u8 {
        (self.directional_shade() * 255.0).round() as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposite_is_involution() {
        for dir in Direction::ALL {
            assert_eq!(dir.opposite().opposite(), dir);
        }
    }

    #[test]
    fn normals_match_engine_convention() {
        assert_eq!(Direction::North.normal(), [0.0, 1.0, 0.0]);
        assert_eq!(Direction::South.normal(), [0.0, -1.0, 0.0]);
        assert_eq!(Direction::East.normal(), [1.0, 0.0, 0.0]);
        assert_eq!(Direction::West.normal(), [-1.0, 0.0, 0.0]);
        assert_eq!(Direction::Up.normal(), [0.0, 0.0, 1.0]);
        assert_eq!(Direction::Down.normal(), [0.0, 0.0, -1.0]);
    }
}
