use std::collections::BTreeSet;

use drift_core::{Direction, PathId, Position, SimulationError};
use rand::Rng;

/// Single board cell carrying a fixed direction and its visitation record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tile {
    direction: Direction,
    visited_by: BTreeSet<PathId>,
}

impl Tile {
    fn new(direction: Direction) -> Self {
        Self {
            direction,
            visited_by: BTreeSet::new(),
        }
    }

    /// Direction a path follows when stepping off this tile.
    #[must_use]
    pub const fn direction(&self) -> Direction {
        self.direction
    }

    /// Identifiers of every path that stepped onto this tile, in ascending order.
    pub fn visited_by(&self) -> impl Iterator<Item = PathId> + '_ {
        self.visited_by.iter().copied()
    }

    /// Reports whether any path has visited the tile.
    #[must_use]
    pub fn was_visited(&self) -> bool {
        !self.visited_by.is_empty()
    }

    /// Reports whether the given path has visited the tile.
    #[must_use]
    pub fn was_visited_by_path(&self, path: PathId) -> bool {
        self.visited_by.contains(&path)
    }

    fn visit(&mut self, path: PathId) {
        let _ = self.visited_by.insert(path);
    }
}

/// Rectangular grid of tiles whose directions never change after construction.
#[derive(Clone, Debug)]
pub struct Board {
    width: u32,
    height: u32,
    tiles: Vec<Tile>,
}

impl Board {
    /// Generates a board whose tile directions are drawn uniformly from `rng`.
    pub fn generate<R: Rng>(width: i64, height: i64, rng: &mut R) -> Result<Self, SimulationError> {
        let (columns, rows, cells) = validate_dimensions(width, height)?;
        let tiles = (0..cells)
            .map(|_| Tile::new(random_direction(rng)))
            .collect();
        Ok(Self {
            width: columns,
            height: rows,
            tiles,
        })
    }

    /// Builds a board from a row-major list of directions.
    pub fn from_directions(
        width: i64,
        height: i64,
        directions: Vec<Direction>,
    ) -> Result<Self, SimulationError> {
        let (columns, rows, cells) = validate_dimensions(width, height)?;
        if directions.len() != cells {
            return Err(SimulationError::DirectionCountMismatch {
                expected: cells,
                actual: directions.len(),
            });
        }

        Ok(Self {
            width: columns,
            height: rows,
            tiles: directions.into_iter().map(Tile::new).collect(),
        })
    }

    /// Number of columns.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Total number of tiles, which is also the number of possible starting cells.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.tiles.len()
    }

    /// Reports whether the position lies on the board.
    #[must_use]
    pub fn is_in_bounds(&self, position: Position) -> bool {
        self.index(position).is_some()
    }

    /// Direction painted on the tile at `position`.
    pub fn direction(&self, position: Position) -> Result<Direction, SimulationError> {
        self.tile(position).map(Tile::direction)
    }

    /// Tile stored at `position`.
    pub fn tile(&self, position: Position) -> Result<&Tile, SimulationError> {
        let index = self.checked_index(position)?;
        Ok(&self.tiles[index])
    }

    /// Records that `path` stepped onto the tile at `position`.
    ///
    /// Visiting the same tile twice with the same path has no further effect.
    pub fn visit(&mut self, position: Position, path: PathId) -> Result<(), SimulationError> {
        let index = self.checked_index(position)?;
        self.tiles[index].visit(path);
        Ok(())
    }

    /// Reports whether `path` already stepped onto the tile at `position`.
    ///
    /// Loop detection relies exclusively on this path-scoped query. Positions
    /// off the board have never been visited.
    #[must_use]
    pub fn was_visited_by_path(&self, position: Position, path: PathId) -> bool {
        self.index(position)
            .is_some_and(|index| self.tiles[index].was_visited_by_path(path))
    }

    /// Reports whether any path stepped onto the tile at `position`.
    #[must_use]
    pub fn was_visited(&self, position: Position) -> bool {
        self.index(position)
            .is_some_and(|index| self.tiles[index].was_visited())
    }

    /// Iterates over every tile in row-major order alongside its position.
    pub fn tiles(&self) -> impl Iterator<Item = (Position, &Tile)> + '_ {
        let width = self.width as usize;
        self.tiles.iter().enumerate().map(move |(index, tile)| {
            let column = (index % width) as i32;
            let row = (index / width) as i32;
            (Position::new(column, row), tile)
        })
    }

    /// Row-major list of tile directions, suitable for [`Board::from_directions`].
    #[must_use]
    pub fn directions(&self) -> Vec<Direction> {
        self.tiles.iter().map(Tile::direction).collect()
    }

    /// Position of the `ordinal`-th cell in row-major order, wrapping around the board.
    #[must_use]
    pub(crate) fn position_at(&self, ordinal: usize) -> Position {
        let width = self.width as usize;
        let wrapped = ordinal % self.tiles.len();
        Position::new((wrapped % width) as i32, (wrapped / width) as i32)
    }

    /// Row-major ordinal of an in-bounds position.
    pub(crate) fn ordinal(&self, position: Position) -> Result<usize, SimulationError> {
        self.checked_index(position)
    }

    fn checked_index(&self, position: Position) -> Result<usize, SimulationError> {
        self.index(position).ok_or(SimulationError::OutOfRange {
            position,
            width: self.width,
            height: self.height,
        })
    }

    fn index(&self, position: Position) -> Option<usize> {
        let column = u32::try_from(position.x()).ok()?;
        let row = u32::try_from(position.y()).ok()?;
        if column < self.width && row < self.height {
            let column = usize::try_from(column).ok()?;
            let row = usize::try_from(row).ok()?;
            let width = usize::try_from(self.width).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}

fn validate_dimensions(width: i64, height: i64) -> Result<(u32, u32, usize), SimulationError> {
    let invalid = SimulationError::InvalidDimensions { width, height };
    if width <= 0 || height <= 0 || width > i64::from(i32::MAX) || height > i64::from(i32::MAX) {
        return Err(invalid);
    }

    let columns = u32::try_from(width).map_err(|_| invalid.clone())?;
    let rows = u32::try_from(height).map_err(|_| invalid.clone())?;
    let cells = usize::try_from(u64::from(columns) * u64::from(rows)).map_err(|_| invalid)?;
    Ok((columns, rows, cells))
}

fn random_direction<R: Rng>(rng: &mut R) -> Direction {
    Direction::ALL[rng.gen_range(0..Direction::ALL.len())]
}
