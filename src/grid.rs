//! The bounded square grid hosts live on.
//!
//! Positions are pairs of signed coordinates, each in `[-k, k]`. The grid is a torus: a host that
//! steps past one edge reappears on the opposite edge.

use std::fmt::{self, Display};

use rand::distr::{Distribution, StandardUniform};
use rand::Rng;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const ORIGIN: Position = Position { x: 0, y: 0 };

    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Position { x, y }
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// One unit step. North increases `y`, east increases `x`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];
}

/// Each of the four directions with equal probability.
impl Distribution<Direction> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Direction {
        Direction::ALL[rng.random_range(0..Direction::ALL.len())]
    }
}

/// The coordinate bound `k` of a `(2k+1) x (2k+1)` grid.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    bound: i32,
}

impl Grid {
    /// # Panics
    /// Panics if `bound` is negative.
    #[must_use]
    pub fn new(bound: i32) -> Self {
        assert!(bound >= 0, "grid bound must be non-negative, got {bound}");
        Grid { bound }
    }

    #[must_use]
    pub fn bound(&self) -> i32 {
        self.bound
    }

    /// Number of cells along one side, `2k + 1`.
    #[must_use]
    pub fn side(&self) -> u32 {
        2 * self.bound.unsigned_abs() + 1
    }

    #[must_use]
    pub fn cell_count(&self) -> u64 {
        u64::from(self.side()) * u64::from(self.side())
    }

    #[must_use]
    pub fn contains(&self, position: Position) -> bool {
        (-self.bound..=self.bound).contains(&position.x)
            && (-self.bound..=self.bound).contains(&position.y)
    }

    /// Moves `position` one cell in `direction`, wrapping around at the edges.
    #[must_use]
    pub fn step(&self, position: Position, direction: Direction) -> Position {
        let Position { x, y } = position;
        match direction {
            Direction::North => Position::new(x, self.wrap(y + 1)),
            Direction::East => Position::new(self.wrap(x + 1), y),
            Direction::South => Position::new(x, self.wrap(y - 1)),
            Direction::West => Position::new(self.wrap(x - 1), y),
        }
    }

    /// A coordinate that has moved at most one cell off the grid.
    fn wrap(&self, value: i32) -> i32 {
        if value > self.bound {
            -self.bound
        } else if value < -self.bound {
            self.bound
        } else {
            value
        }
    }

    /// Draws a cell uniformly at random, `x` first.
    pub fn sample_position<R: Rng + ?Sized>(&self, rng: &mut R) -> Position {
        let x = rng.random_range(-self.bound..=self.bound);
        let y = rng.random_range(-self.bound..=self.bound);
        Position::new(x, y)
    }
}
