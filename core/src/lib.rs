#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Drift engine.
//!
//! This crate defines the vocabulary that connects adapters, the authoritative
//! simulation, and pure systems. Adapters submit [`Command`] values describing
//! the traversal operation they want performed, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! for systems (sound, statistics) to react to deterministically.

mod config;

pub use config::{
    parse_lenient_int, RawConfig, SimulationConfig, DEFAULT_BOARD_HEIGHT, DEFAULT_BOARD_WIDTH,
};

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Movement direction painted onto a tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Movement toward decreasing row indices.
    Up,
    /// Movement toward increasing column indices.
    Right,
    /// Movement toward increasing row indices.
    Down,
    /// Movement toward decreasing column indices.
    Left,
}

impl Direction {
    /// Every direction in the order used for uniform sampling.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Right,
        Direction::Down,
        Direction::Left,
    ];

    /// Column and row offsets applied when a path steps off a tile.
    #[must_use]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Self::Up => (0, -1),
            Self::Right => (1, 0),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
        }
    }

    /// Single-character symbol used by compact board encodings.
    #[must_use]
    pub const fn symbol(self) -> char {
        match self {
            Self::Up => 'U',
            Self::Right => 'R',
            Self::Down => 'D',
            Self::Left => 'L',
        }
    }

    /// Parses a direction symbol produced by [`Direction::symbol`].
    ///
    /// Any other symbol violates the board encoding and is reported as an
    /// internal invariant error.
    pub fn from_symbol(symbol: char) -> Result<Self, SimulationError> {
        match symbol {
            'U' => Ok(Self::Up),
            'R' => Ok(Self::Right),
            'D' => Ok(Self::Down),
            'L' => Ok(Self::Left),
            other => Err(SimulationError::InvalidDirection { symbol: other }),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Up => "up",
            Self::Right => "right",
            Self::Down => "down",
            Self::Left => "left",
        };
        f.write_str(name)
    }
}

/// Location on (or just off) the board expressed as column and row.
///
/// Coordinates are signed so that a step off the top or left edge remains
/// representable in a path's history.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    x: i32,
    y: i32,
}

impl Position {
    /// Origin of the board, used when a requested start must be corrected.
    pub const ORIGIN: Position = Position::new(0, 0);

    /// Creates a new position.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Zero-based column.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Zero-based row.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Position one step away in the provided direction.
    #[must_use]
    pub const fn offset(self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Unique identifier assigned to a path in creation order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PathId(u32);

impl PathId {
    /// Creates a new path identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Terminal outcome recorded on a path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PathResult {
    /// The path stepped onto a cell it had already visited.
    Loop,
    /// The path stepped outside the board.
    Fell,
}

/// Overall state of a simulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SimulationStatus {
    /// The most recent path can keep advancing.
    Ok,
    /// The most recent path revisited one of its own cells.
    Loop,
    /// The most recent path left the board.
    Fell,
    /// Every cell has served as a starting point.
    Complete,
}

impl From<PathResult> for SimulationStatus {
    fn from(result: PathResult) -> Self {
        match result {
            PathResult::Loop => Self::Loop,
            PathResult::Fell => Self::Fell,
        }
    }
}

impl fmt::Display for SimulationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Ok => "OK",
            Self::Loop => "LOOP",
            Self::Fell => "FELL",
            Self::Complete => "COMPLETE",
        };
        f.write_str(name)
    }
}

/// Commands that express every traversal operation adapters may request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Command {
    /// Moves the most recent path a single step.
    AdvancePath,
    /// Steps the most recent path until it loops or falls.
    CompletePath,
    /// Starts a new path on the next cell in row-major order.
    AdvanceBoard,
    /// Starts a new path and immediately runs it to completion.
    AdvanceBoardAndCompletePath,
    /// Runs every remaining path until the board is complete.
    CompleteBoard,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Event {
    /// Announces that a new path was created.
    PathStarted {
        /// Identifier of the new path.
        path: PathId,
        /// Cell the path starts on.
        start: Position,
    },
    /// Confirms that a path moved between two positions.
    PathAdvanced {
        /// Identifier of the path that moved.
        path: PathId,
        /// Position before the step.
        from: Position,
        /// Position after the step, possibly off the board.
        to: Position,
    },
    /// Reports that a path reached its terminal outcome.
    PathEnded {
        /// Identifier of the path that ended.
        path: PathId,
        /// Outcome recorded on the path.
        result: PathResult,
        /// Final position stored in the path history.
        at: Position,
    },
    /// Reports the simulation status once a command finished.
    StatusChanged {
        /// Status after the command was applied.
        status: SimulationStatus,
    },
}

/// Non-fatal condition recorded while the simulation recovered locally.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Diagnostic {
    /// The requested starting cell lay outside the board and was replaced.
    StartCorrected {
        /// Requested column.
        requested_x: i64,
        /// Requested row.
        requested_y: i64,
        /// Position the simulation started from instead.
        corrected: Position,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StartCorrected {
                requested_x,
                requested_y,
                corrected,
            } => write!(
                f,
                "starting position was out of bounds: x->{requested_x} y->{requested_y}, using {corrected}"
            ),
        }
    }
}

/// Broad classification of [`SimulationError`] values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The board could not be constructed from the supplied parameters.
    Configuration,
    /// A position outside the board was queried.
    OutOfRange,
    /// A value that the engine never produces was encountered.
    InternalInvariant,
    /// An operation was requested in a state that does not permit it.
    Misuse,
}

/// Errors surfaced by the traversal engine.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SimulationError {
    /// Board dimensions must both be positive.
    #[error("board dimensions must be positive (received {width}x{height})")]
    InvalidDimensions {
        /// Requested number of columns.
        width: i64,
        /// Requested number of rows.
        height: i64,
    },
    /// A fixed board layout did not provide one direction per cell.
    #[error("board layout provides {actual} directions but {expected} cells exist")]
    DirectionCountMismatch {
        /// Number of cells on the board.
        expected: usize,
        /// Number of directions supplied.
        actual: usize,
    },
    /// The queried position lies outside the board.
    #[error("position {position} lies outside the {width}x{height} board")]
    OutOfRange {
        /// Offending position.
        position: Position,
        /// Board columns.
        width: u32,
        /// Board rows.
        height: u32,
    },
    /// A direction symbol outside the four known values was encountered.
    #[error("unrecognised direction symbol '{symbol}'")]
    InvalidDirection {
        /// Symbol that failed to parse.
        symbol: char,
    },
    /// The most recent path already reached a terminal outcome.
    #[error("path {} already ended", .path.get())]
    PathFinished {
        /// Identifier of the finished path.
        path: PathId,
    },
    /// The simulation already reached its terminal state.
    #[error("board is complete")]
    BoardComplete,
}

impl SimulationError {
    /// Classifies the error according to the engine's error taxonomy.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidDimensions { .. } | Self::DirectionCountMismatch { .. } => {
                ErrorKind::Configuration
            }
            Self::OutOfRange { .. } => ErrorKind::OutOfRange,
            Self::InvalidDirection { .. } => ErrorKind::InternalInvariant,
            Self::PathFinished { .. } | Self::BoardComplete => ErrorKind::Misuse,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        Direction, ErrorKind, PathId, PathResult, Position, SimulationError, SimulationStatus,
    };
    use serde::{de::DeserializeOwned, Serialize};

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn offsets_follow_screen_coordinates() {
        let origin = Position::new(3, 3);
        assert_eq!(origin.offset(Direction::Up), Position::new(3, 2));
        assert_eq!(origin.offset(Direction::Right), Position::new(4, 3));
        assert_eq!(origin.offset(Direction::Down), Position::new(3, 4));
        assert_eq!(origin.offset(Direction::Left), Position::new(2, 3));
    }

    #[test]
    fn stepping_off_the_origin_goes_negative() {
        assert_eq!(Position::ORIGIN.offset(Direction::Up), Position::new(0, -1));
        assert_eq!(Position::ORIGIN.offset(Direction::Left), Position::new(-1, 0));
    }

    #[test]
    fn direction_symbols_parse_back() {
        for direction in Direction::ALL {
            assert_eq!(Direction::from_symbol(direction.symbol()), Ok(direction));
        }
    }

    #[test]
    fn unknown_direction_symbol_is_an_invariant_violation() {
        let error = Direction::from_symbol('x').expect_err("x is not a direction");
        assert_eq!(error, SimulationError::InvalidDirection { symbol: 'x' });
        assert_eq!(error.kind(), ErrorKind::InternalInvariant);
    }

    #[test]
    fn error_kinds_follow_taxonomy() {
        let configuration = SimulationError::InvalidDimensions {
            width: 0,
            height: 4,
        };
        let out_of_range = SimulationError::OutOfRange {
            position: Position::new(9, 9),
            width: 4,
            height: 4,
        };
        let finished = SimulationError::PathFinished {
            path: PathId::new(2),
        };

        assert_eq!(configuration.kind(), ErrorKind::Configuration);
        assert_eq!(out_of_range.kind(), ErrorKind::OutOfRange);
        assert_eq!(finished.kind(), ErrorKind::Misuse);
        assert_eq!(SimulationError::BoardComplete.kind(), ErrorKind::Misuse);
    }

    #[test]
    fn path_results_map_onto_status() {
        assert_eq!(SimulationStatus::from(PathResult::Loop), SimulationStatus::Loop);
        assert_eq!(SimulationStatus::from(PathResult::Fell), SimulationStatus::Fell);
    }

    #[test]
    fn position_round_trips_through_bincode() {
        assert_round_trip(&Position::new(-1, 27));
    }

    #[test]
    fn status_round_trips_through_bincode() {
        assert_round_trip(&SimulationStatus::Complete);
    }
}
