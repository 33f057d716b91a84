use std::{error::Error, fmt};

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use drift_core::{Direction, SimulationError};
use drift_world::Board;
use serde::{Deserialize, Serialize};

const SNAPSHOT_DOMAIN: &str = "drift";
const SNAPSHOT_VERSION: &str = "v1";

/// Identifier prefix emitted before the encoded snapshot payload.
pub(crate) const SNAPSHOT_HEADER: &str = "drift:v1";
/// Delimiter used to separate the prefix, grid dimensions and payload.
const FIELD_DELIMITER: char = ':';

/// Tile directions of a board, detached from any visitation state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct BoardSnapshot {
    /// Number of board columns.
    pub(crate) columns: u32,
    /// Number of board rows.
    pub(crate) rows: u32,
    /// Row-major tile directions.
    pub(crate) directions: Vec<Direction>,
}

impl BoardSnapshot {
    /// Captures the directions painted on `board`.
    #[must_use]
    pub(crate) fn capture(board: &Board) -> Self {
        Self {
            columns: board.width(),
            rows: board.height(),
            directions: board.directions(),
        }
    }

    /// Rebuilds an unvisited board from the snapshot.
    pub(crate) fn into_board(self) -> Result<Board, SimulationError> {
        Board::from_directions(
            i64::from(self.columns),
            i64::from(self.rows),
            self.directions,
        )
    }

    /// Encodes the snapshot into a single-line string.
    pub(crate) fn encode(&self) -> Result<String, BoardTransferError> {
        let payload = SerializableSnapshot {
            directions: self.directions.iter().map(|direction| direction.symbol()).collect(),
        };
        let json = serde_json::to_vec(&payload).map_err(BoardTransferError::InvalidPayload)?;
        let encoded = STANDARD_NO_PAD.encode(json);
        Ok(format!(
            "{SNAPSHOT_HEADER}:{}x{}:{encoded}",
            self.columns, self.rows
        ))
    }

    /// Decodes a snapshot from the provided string representation.
    pub(crate) fn decode(value: &str) -> Result<Self, BoardTransferError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(BoardTransferError::EmptyPayload);
        }

        let mut parts = trimmed.split(FIELD_DELIMITER);
        let domain = parts.next().ok_or(BoardTransferError::MissingPrefix)?;
        let version = parts.next().ok_or(BoardTransferError::MissingVersion)?;
        let dimensions = parts.next().ok_or(BoardTransferError::MissingDimensions)?;
        let payload = parts.next().ok_or(BoardTransferError::MissingPayload)?;

        if domain != SNAPSHOT_DOMAIN {
            return Err(BoardTransferError::InvalidPrefix(domain.to_owned()));
        }
        if version != SNAPSHOT_VERSION {
            return Err(BoardTransferError::UnsupportedVersion(version.to_owned()));
        }

        let (columns, rows) = parse_dimensions(dimensions)?;
        let bytes = STANDARD_NO_PAD
            .decode(payload.as_bytes())
            .map_err(BoardTransferError::InvalidEncoding)?;
        let decoded: SerializableSnapshot =
            serde_json::from_slice(&bytes).map_err(BoardTransferError::InvalidPayload)?;
        let directions = decoded
            .directions
            .chars()
            .map(Direction::from_symbol)
            .collect::<Result<Vec<_>, _>>()
            .map_err(BoardTransferError::InvalidDirection)?;

        Ok(Self {
            columns,
            rows,
            directions,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct SerializableSnapshot {
    directions: String,
}

/// Errors that can occur while encoding or decoding board transfer strings.
#[derive(Debug)]
pub(crate) enum BoardTransferError {
    /// The provided string was empty or contained only whitespace.
    EmptyPayload,
    /// The prefix segment was missing from the encoded snapshot.
    MissingPrefix,
    /// The encoded snapshot did not contain a version segment.
    MissingVersion,
    /// The encoded snapshot did not include grid dimensions.
    MissingDimensions,
    /// The encoded snapshot did not include the payload segment.
    MissingPayload,
    /// The encoded snapshot used an unexpected prefix segment.
    InvalidPrefix(String),
    /// The encoded snapshot used an unsupported version identifier.
    UnsupportedVersion(String),
    /// The grid dimensions could not be parsed from the encoded snapshot.
    InvalidDimensions(String),
    /// The base64 payload could not be decoded.
    InvalidEncoding(base64::DecodeError),
    /// The payload could not be serialised or deserialised.
    InvalidPayload(serde_json::Error),
    /// The payload contained a character that names no direction.
    InvalidDirection(SimulationError),
}

impl fmt::Display for BoardTransferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPayload => write!(f, "board snapshot was empty"),
            Self::MissingPrefix => write!(f, "board string is missing the prefix"),
            Self::MissingVersion => write!(f, "board string is missing the version"),
            Self::MissingDimensions => write!(f, "board string is missing the grid dimensions"),
            Self::MissingPayload => write!(f, "board string is missing the payload"),
            Self::InvalidPrefix(prefix) => write!(f, "board prefix '{prefix}' is not supported"),
            Self::UnsupportedVersion(version) => {
                write!(f, "board version '{version}' is not supported")
            }
            Self::InvalidDimensions(dimensions) => {
                write!(f, "could not parse grid dimensions '{dimensions}'")
            }
            Self::InvalidEncoding(error) => {
                write!(f, "could not decode board payload: {error}")
            }
            Self::InvalidPayload(error) => {
                write!(f, "could not process board payload: {error}")
            }
            Self::InvalidDirection(error) => {
                write!(f, "board payload is corrupt: {error}")
            }
        }
    }
}

impl Error for BoardTransferError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidEncoding(error) => Some(error),
            Self::InvalidPayload(error) => Some(error),
            Self::InvalidDirection(error) => Some(error),
            _ => None,
        }
    }
}

fn parse_dimensions(dimensions: &str) -> Result<(u32, u32), BoardTransferError> {
    let (columns, rows) = dimensions
        .split_once(['x', 'X'])
        .ok_or_else(|| BoardTransferError::InvalidDimensions(dimensions.to_owned()))?;

    let columns = columns
        .trim()
        .parse::<u32>()
        .map_err(|_| BoardTransferError::InvalidDimensions(dimensions.to_owned()))?;
    let rows = rows
        .trim()
        .parse::<u32>()
        .map_err(|_| BoardTransferError::InvalidDimensions(dimensions.to_owned()))?;

    if columns == 0 || rows == 0 {
        return Err(BoardTransferError::InvalidDimensions(
            dimensions.to_owned(),
        ));
    }

    Ok((columns, rows))
}
