#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Drift adapters.
//!
//! Adapters build a [`Scene`] from a simulation snapshot and hand a
//! [`Presentation`] to a [`RenderingBackend`]. The [`svg`] module provides a
//! backend that writes the scene as a standalone SVG document.

pub mod svg;

use anyhow::Result as AnyResult;
use drift_core::{Direction, PathId, PathResult, Position, SimulationStatus};
use drift_world::{query, Simulation};
use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::fmt;

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self::from_rgba_u8(red, green, blue, 1.0)
    }

    /// Creates a color from byte RGB values and a floating point alpha.
    #[must_use]
    pub const fn from_rgba_u8(red: u8, green: u8, blue: u8, alpha: f32) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha,
        }
    }
}

fn channel_byte(channel: f32) -> u8 {
    (channel.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Formats the color as a CSS `rgb()` or `rgba()` function.
impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (red, green, blue) = (
            channel_byte(self.red),
            channel_byte(self.green),
            channel_byte(self.blue),
        );
        if self.alpha >= 1.0 {
            write!(f, "rgb({red}, {green}, {blue})")
        } else {
            write!(f, "rgba({red}, {green}, {blue}, {})", self.alpha.max(0.0))
        }
    }
}

/// Colors and stroke widths used to draw a scene.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Palette {
    /// Fill of tiles no path has visited.
    pub unvisited: Color,
    /// Fill of tiles visited by any path.
    pub visited: Color,
    /// Fill of the tile under the current path's head.
    pub head: Color,
    /// Stroke used for path polylines.
    pub path: Color,
    /// Stroke width of path polylines in pixels.
    pub path_width: f32,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            unvisited: Color::from_rgb_u8(66, 77, 88),
            visited: Color::from_rgb_u8(60, 184, 120),
            head: Color::from_rgb_u8(158, 11, 15),
            path: Color::from_rgba_u8(20, 220, 250, 0.3),
            path_width: 2.0,
        }
    }
}

impl Palette {
    /// Fill used for a tile in the provided state.
    #[must_use]
    pub const fn tile_fill(&self, state: TileState) -> Color {
        match state {
            TileState::Unvisited => self.unvisited,
            TileState::Visited => self.visited,
            TileState::Head => self.head,
        }
    }
}

/// Pixel geometry of the tile grid.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TileGridPresentation {
    /// Number of columns contained in the grid.
    pub columns: u32,
    /// Number of rows contained in the grid.
    pub rows: u32,
    /// Side length of a single tile in pixels.
    pub tile_px: f32,
    /// Gap between neighbouring tiles in pixels.
    pub padding_px: f32,
}

impl Default for TileGridPresentation {
    fn default() -> Self {
        Self {
            columns: 0,
            rows: 0,
            tile_px: Self::DEFAULT_TILE_PX,
            padding_px: Self::DEFAULT_PADDING_PX,
        }
    }
}

impl TileGridPresentation {
    /// Default tile side length in pixels.
    pub const DEFAULT_TILE_PX: f32 = 4.0;

    /// Default gap between tiles in pixels.
    pub const DEFAULT_PADDING_PX: f32 = 16.0;

    /// Creates a new tile grid descriptor.
    ///
    /// Returns an error when the tile size is not positive or the padding is negative.
    pub fn new(
        columns: u32,
        rows: u32,
        tile_px: f32,
        padding_px: f32,
    ) -> Result<Self, RenderingError> {
        if !(tile_px.is_finite() && tile_px > 0.0) {
            return Err(RenderingError::InvalidTileSize { tile_px });
        }
        if !(padding_px.is_finite() && padding_px >= 0.0) {
            return Err(RenderingError::InvalidPadding { padding_px });
        }

        Ok(Self {
            columns,
            rows,
            tile_px,
            padding_px,
        })
    }

    /// Grid with the default geometry sized for `columns` by `rows` tiles.
    #[must_use]
    pub fn with_dimensions(columns: u32, rows: u32) -> Self {
        Self {
            columns,
            rows,
            ..Self::default()
        }
    }

    /// Distance between the origins of neighbouring tiles.
    #[must_use]
    pub fn stride(&self) -> f32 {
        self.tile_px + self.padding_px
    }

    /// Calculates the total width of the canvas.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.columns as f32 * self.stride()
    }

    /// Calculates the total height of the canvas.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.rows as f32 * self.stride()
    }

    /// Top-left corner of the tile drawn for `position`.
    #[must_use]
    pub fn tile_origin(&self, position: Position) -> Vec2 {
        self.cell_corner(position) + Vec2::splat(self.padding_px / 2.0)
    }

    /// Centre of the cell at `position`, used as a path vertex.
    ///
    /// Positions off the board map to points outside the canvas.
    #[must_use]
    pub fn tile_center(&self, position: Position) -> Vec2 {
        self.cell_corner(position) + Vec2::splat(self.stride() / 2.0)
    }

    fn cell_corner(&self, position: Position) -> Vec2 {
        Vec2::new(position.x() as f32, position.y() as f32) * self.stride()
    }
}

/// How a tile should be filled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TileState {
    /// No path stepped onto the tile.
    Unvisited,
    /// At least one path stepped onto the tile.
    Visited,
    /// The current path's head sits on the tile.
    Head,
}

/// Immutable snapshot of one tile within the scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SceneTile {
    /// Cell the tile occupies.
    pub position: Position,
    /// Direction painted on the tile.
    pub direction: Direction,
    /// Fill state derived from visitation.
    pub state: TileState,
}

/// Polyline connecting the centres of every cell a path visited.
#[derive(Clone, Debug, PartialEq)]
pub struct PathPolyline {
    /// Identifier of the path.
    pub path: PathId,
    /// Vertices in visiting order.
    pub points: Vec<Vec2>,
    /// Terminal outcome, if the path ended.
    pub result: Option<PathResult>,
}

/// Scene description combining the tile grid and the walked paths.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Geometry of the grid.
    pub tile_grid: TileGridPresentation,
    /// Tiles in row-major order.
    pub tiles: Vec<SceneTile>,
    /// Paths in creation order.
    pub paths: Vec<PathPolyline>,
    /// Simulation status when the scene was captured.
    pub status: SimulationStatus,
}

impl Scene {
    /// Captures a scene from the current simulation state.
    ///
    /// The grid's column and row counts are taken from the board; only its
    /// pixel sizes are read from `tile_grid`.
    #[must_use]
    pub fn from_simulation(simulation: &Simulation, tile_grid: TileGridPresentation) -> Self {
        let board = query::board(simulation);
        let head = query::current_path(simulation).position();
        let tile_grid = TileGridPresentation {
            columns: board.width(),
            rows: board.height(),
            ..tile_grid
        };

        let tiles = board
            .tiles()
            .map(|(position, tile)| {
                let state = if position == head {
                    TileState::Head
                } else if tile.was_visited() {
                    TileState::Visited
                } else {
                    TileState::Unvisited
                };
                SceneTile {
                    position,
                    direction: tile.direction(),
                    state,
                }
            })
            .collect();

        let paths = query::paths(simulation)
            .iter()
            .map(|path| PathPolyline {
                path: path.id(),
                points: path
                    .moves()
                    .iter()
                    .map(|position| tile_grid.tile_center(*position))
                    .collect(),
                result: path.result(),
            })
            .collect();

        Self {
            tile_grid,
            tiles,
            paths,
            status: query::status(simulation),
        }
    }
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title embedded in the rendered output.
    pub title: String,
    /// Colors used to draw the scene.
    pub palette: Palette,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(title: T, palette: Palette, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            title: title.into(),
            palette,
            scene,
        }
    }
}

/// Rendering backend capable of presenting Drift scenes.
pub trait RenderingBackend {
    /// Draws one presentation.
    fn present(&mut self, presentation: &Presentation) -> AnyResult<()>;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum RenderingError {
    /// Tiles must have a positive size.
    #[error("tile size must be positive (received {tile_px})")]
    InvalidTileSize {
        /// Provided tile size that failed validation.
        tile_px: f32,
    },
    /// Padding cannot be negative.
    #[error("tile padding must not be negative (received {padding_px})")]
    InvalidPadding {
        /// Provided padding that failed validation.
        padding_px: f32,
    },
}
