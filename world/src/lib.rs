#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative simulation state for Drift.
//!
//! A [`Simulation`] owns one [`Board`] and the ordered [`Path`] values walked
//! on it. Callers drive it either through its operation methods or through
//! [`apply`], which additionally reports what changed as [`Event`] values.
//! Read-only access for adapters lives in the [`query`] module.

mod board;
mod path;

pub use board::{Board, Tile};
pub use path::Path;

use drift_core::{
    Command, Diagnostic, Event, PathId, PathResult, Position, SimulationConfig, SimulationError,
    SimulationStatus,
};
use rand::Rng;

/// Orchestrates one board and every path started on it.
#[derive(Clone, Debug)]
pub struct Simulation {
    board: Board,
    paths: Vec<Path>,
    status: SimulationStatus,
    next_path_id: u32,
    diagnostics: Vec<Diagnostic>,
}

impl Simulation {
    /// Starts a simulation on `board`, creating its first path.
    ///
    /// Omitted coordinates are drawn uniformly from the board using `rng`. A
    /// requested start outside the board is replaced with the origin and the
    /// correction is recorded as a [`Diagnostic`].
    pub fn start<R: Rng>(
        board: Board,
        start_x: Option<i64>,
        start_y: Option<i64>,
        rng: &mut R,
    ) -> Self {
        let x = start_x.unwrap_or_else(|| rng.gen_range(0..i64::from(board.width())));
        let y = start_y.unwrap_or_else(|| rng.gen_range(0..i64::from(board.height())));

        let mut diagnostics = Vec::new();
        let start = match in_bounds_position(&board, x, y) {
            Some(position) => position,
            None => {
                tracing::warn!(x, y, "starting position was out of bounds, using origin");
                diagnostics.push(Diagnostic::StartCorrected {
                    requested_x: x,
                    requested_y: y,
                    corrected: Position::ORIGIN,
                });
                Position::ORIGIN
            }
        };

        let mut simulation = Self {
            board,
            paths: Vec::new(),
            status: SimulationStatus::Ok,
            next_path_id: 0,
            diagnostics,
        };
        let pushed = simulation.push_path(start);
        debug_assert!(pushed.is_ok(), "corrected start lies on the board");
        simulation
    }

    /// Generates a board from `config` and starts a simulation on it.
    pub fn from_config<R: Rng>(
        config: &SimulationConfig,
        rng: &mut R,
    ) -> Result<Self, SimulationError> {
        let board = Board::generate(config.width, config.height, rng)?;
        Ok(Self::start(board, config.start_x, config.start_y, rng))
    }

    /// Moves the most recent path one step and returns the resulting status.
    ///
    /// Exactly one of three outcomes occurs: the path leaves the board
    /// ([`SimulationStatus::Fell`]), it revisits one of its own cells
    /// ([`SimulationStatus::Loop`]), or it lands on a fresh cell and may
    /// continue ([`SimulationStatus::Ok`]).
    pub fn advance_path(&mut self) -> Result<SimulationStatus, SimulationError> {
        if self.status == SimulationStatus::Complete {
            return Err(SimulationError::BoardComplete);
        }

        let index = self.current_index();
        let path = &self.paths[index];
        if path.result().is_some() {
            return Err(SimulationError::PathFinished { path: path.id() });
        }

        let direction = self.board.direction(path.position())?;
        let path = &mut self.paths[index];
        let id = path.id();
        let next = path.step(direction);

        if !self.board.is_in_bounds(next) {
            self.finish_current(PathResult::Fell);
        } else if self.board.was_visited_by_path(next, id) {
            self.finish_current(PathResult::Loop);
        } else {
            self.board.visit(next, id)?;
            self.status = SimulationStatus::Ok;
        }

        Ok(self.status)
    }

    /// Advances the most recent path until it loops or falls.
    ///
    /// Performs no steps when the simulation is not in the OK state.
    pub fn complete_path(&mut self) -> Result<SimulationStatus, SimulationError> {
        while self.is_ok() {
            let _ = self.advance_path()?;
        }
        Ok(self.status)
    }

    /// Starts a new path on the next cell in row-major order.
    ///
    /// The k-th path starts k cells after the first path's start, wrapping
    /// from the end of a row to the next row and from the last row back to
    /// the first. Does nothing once the board is complete.
    pub fn advance_board(&mut self) -> Result<(), SimulationError> {
        if self.is_complete() {
            return Ok(());
        }

        let first_start = self.paths[0].start_position();
        let ordinal = self.board.ordinal(first_start)? + self.paths.len();
        let start = self.board.position_at(ordinal);
        self.push_path(start)
    }

    /// Starts the next path and runs it to completion, unless the board is complete.
    pub fn advance_board_and_complete_path(&mut self) -> Result<(), SimulationError> {
        if self.is_complete() {
            return Ok(());
        }

        self.advance_board()?;
        let _ = self.complete_path()?;
        Ok(())
    }

    /// Completes the current path and then every remaining starting cell.
    pub fn complete_board(&mut self) -> Result<(), SimulationError> {
        let _ = self.complete_path()?;
        while !self.is_complete() {
            self.advance_board_and_complete_path()?;
        }
        Ok(())
    }

    /// Reports whether the most recent path can keep advancing.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status == SimulationStatus::Ok
    }

    /// Reports whether every cell has served as a starting point.
    ///
    /// This is the only place the simulation enters
    /// [`SimulationStatus::Complete`].
    pub fn is_complete(&mut self) -> bool {
        if self.status == SimulationStatus::Complete {
            return true;
        }
        if self.paths.len() < self.board.cell_count() {
            return false;
        }

        tracing::debug!(paths = self.paths.len(), "board complete");
        self.status = SimulationStatus::Complete;
        true
    }

    fn current_index(&self) -> usize {
        self.paths.len() - 1
    }

    fn push_path(&mut self, start: Position) -> Result<(), SimulationError> {
        let id = PathId::new(self.next_path_id);
        self.board.visit(start, id)?;
        self.next_path_id = self.next_path_id.saturating_add(1);
        self.paths.push(Path::new(id, start));
        self.status = SimulationStatus::Ok;
        Ok(())
    }

    fn finish_current(&mut self, result: PathResult) {
        let index = self.current_index();
        let path = &mut self.paths[index];
        path.set_result(result);
        tracing::debug!(
            path = path.id().get(),
            steps = path.step_count(),
            ?result,
            "path ended"
        );
        self.status = SimulationStatus::from(result);
    }
}

fn in_bounds_position(board: &Board, x: i64, y: i64) -> Option<Position> {
    let position = Position::new(i32::try_from(x).ok()?, i32::try_from(y).ok()?);
    board.is_in_bounds(position).then_some(position)
}

/// Applies the provided command to the simulation and reports what changed.
///
/// On success `out_events` receives, in order, every path start, step and
/// termination caused by the command followed by a single
/// [`Event::StatusChanged`] carrying the resulting status. Failed commands
/// leave the simulation untouched and emit nothing.
pub fn apply(
    simulation: &mut Simulation,
    command: Command,
    out_events: &mut Vec<Event>,
) -> Result<(), SimulationError> {
    let first_touched = simulation.current_index();
    let known_moves = simulation.paths[first_touched].moves().len();
    let known_result = simulation.paths[first_touched].result();

    match command {
        Command::AdvancePath => {
            let _ = simulation.advance_path()?;
        }
        Command::CompletePath => {
            let _ = simulation.complete_path()?;
        }
        Command::AdvanceBoard => simulation.advance_board()?,
        Command::AdvanceBoardAndCompletePath => simulation.advance_board_and_complete_path()?,
        Command::CompleteBoard => simulation.complete_board()?,
    }

    for (index, path) in simulation.paths.iter().enumerate().skip(first_touched) {
        let replayed_from = if index == first_touched {
            known_moves
        } else {
            out_events.push(Event::PathStarted {
                path: path.id(),
                start: path.start_position(),
            });
            1
        };

        for step in path.moves().windows(2).skip(replayed_from - 1) {
            out_events.push(Event::PathAdvanced {
                path: path.id(),
                from: step[0],
                to: step[1],
            });
        }

        let newly_ended = index != first_touched || known_result.is_none();
        if let (Some(result), true) = (path.result(), newly_ended) {
            out_events.push(Event::PathEnded {
                path: path.id(),
                result,
                at: path.position(),
            });
        }
    }

    out_events.push(Event::StatusChanged {
        status: simulation.status,
    });
    Ok(())
}

/// Query functions that provide read-only access to the simulation state.
pub mod query {
    use super::{Board, Path, Simulation};
    use drift_core::{Diagnostic, PathResult, SimulationStatus};

    /// Provides read-only access to the board.
    #[must_use]
    pub fn board(simulation: &Simulation) -> &Board {
        &simulation.board
    }

    /// Every path in creation order.
    #[must_use]
    pub fn paths(simulation: &Simulation) -> &[Path] {
        &simulation.paths
    }

    /// The most recently created path.
    #[must_use]
    pub fn current_path(simulation: &Simulation) -> &Path {
        &simulation.paths[simulation.current_index()]
    }

    /// Current simulation status.
    #[must_use]
    pub fn status(simulation: &Simulation) -> SimulationStatus {
        simulation.status
    }

    /// Non-fatal corrections recorded while the simulation started.
    #[must_use]
    pub fn diagnostics(simulation: &Simulation) -> &[Diagnostic] {
        &simulation.diagnostics
    }

    /// Number of paths that ended with the provided outcome.
    #[must_use]
    pub fn count_results(simulation: &Simulation, result: PathResult) -> usize {
        simulation
            .paths
            .iter()
            .filter(|path| path.result() == Some(result))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drift_core::{Direction, ErrorKind};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(0x5eed)
    }

    fn loop_board() -> Board {
        Board::from_directions(
            2,
            2,
            vec![
                Direction::Right,
                Direction::Down,
                Direction::Up,
                Direction::Left,
            ],
        )
        .expect("valid board")
    }

    #[test]
    fn start_marks_the_first_cell_visited() {
        let simulation = Simulation::start(loop_board(), Some(1), Some(1), &mut rng());

        let path = query::current_path(&simulation);
        assert_eq!(path.id(), PathId::new(0));
        assert_eq!(path.start_position(), Position::new(1, 1));
        assert!(query::board(&simulation).was_visited_by_path(Position::new(1, 1), path.id()));
        assert_eq!(query::status(&simulation), SimulationStatus::Ok);
        assert!(query::diagnostics(&simulation).is_empty());
    }

    #[test]
    fn random_start_lies_on_the_board() {
        let board = Board::generate(7, 5, &mut rng()).expect("board");
        let simulation = Simulation::start(board, None, None, &mut rng());

        let start = query::current_path(&simulation).start_position();
        assert!(query::board(&simulation).is_in_bounds(start));
        assert!(query::diagnostics(&simulation).is_empty());
    }

    #[test]
    fn out_of_bounds_start_is_corrected_to_origin() {
        let simulation = Simulation::start(loop_board(), Some(2), Some(0), &mut rng());

        assert_eq!(
            query::current_path(&simulation).start_position(),
            Position::ORIGIN
        );
        assert_eq!(
            query::diagnostics(&simulation),
            &[Diagnostic::StartCorrected {
                requested_x: 2,
                requested_y: 0,
                corrected: Position::ORIGIN,
            }]
        );
    }

    #[test]
    fn advance_path_after_path_ended_is_rejected() {
        let board = Board::from_directions(1, 1, vec![Direction::Down]).expect("board");
        let mut simulation = Simulation::start(board, Some(0), Some(0), &mut rng());
        assert_eq!(simulation.advance_path(), Ok(SimulationStatus::Fell));

        let error = simulation.advance_path().expect_err("path already fell");
        assert_eq!(
            error,
            SimulationError::PathFinished {
                path: PathId::new(0)
            }
        );
        assert_eq!(error.kind(), ErrorKind::Misuse);
        assert_eq!(query::current_path(&simulation).moves().len(), 2);
    }

    #[test]
    fn advance_path_after_completion_is_rejected() {
        let board = Board::from_directions(1, 1, vec![Direction::Left]).expect("board");
        let mut simulation = Simulation::start(board, Some(0), Some(0), &mut rng());
        simulation.complete_board().expect("complete");

        assert_eq!(
            simulation.advance_path(),
            Err(SimulationError::BoardComplete)
        );
    }

    #[test]
    fn advance_board_uses_next_cell_in_row_major_order() {
        let mut simulation = Simulation::start(loop_board(), Some(1), Some(0), &mut rng());
        let _ = simulation.complete_path().expect("path completes");

        simulation.advance_board().expect("advance");
        assert_eq!(
            query::current_path(&simulation).start_position(),
            Position::new(0, 1)
        );
        assert_eq!(query::status(&simulation), SimulationStatus::Ok);

        let _ = simulation.complete_path().expect("path completes");
        simulation.advance_board().expect("advance");
        assert_eq!(
            query::current_path(&simulation).start_position(),
            Position::new(1, 1)
        );

        let _ = simulation.complete_path().expect("path completes");
        simulation.advance_board().expect("advance");
        assert_eq!(
            query::current_path(&simulation).start_position(),
            Position::new(0, 0)
        );
    }

    #[test]
    fn advance_board_is_a_no_op_once_complete() {
        let board = Board::from_directions(1, 1, vec![Direction::Up]).expect("board");
        let mut simulation = Simulation::start(board, Some(0), Some(0), &mut rng());
        let _ = simulation.complete_path().expect("path completes");

        simulation.advance_board().expect("no-op");

        assert_eq!(query::paths(&simulation).len(), 1);
        assert_eq!(query::status(&simulation), SimulationStatus::Complete);
    }

    #[test]
    fn advance_board_and_complete_path_runs_the_next_path_to_its_end() {
        let board = Board::from_directions(2, 1, vec![Direction::Right; 2]).expect("board");
        let mut simulation = Simulation::start(board, Some(0), Some(0), &mut rng());
        assert_eq!(simulation.complete_path(), Ok(SimulationStatus::Fell));

        simulation
            .advance_board_and_complete_path()
            .expect("next path runs");

        let path = query::current_path(&simulation);
        assert_eq!(query::paths(&simulation).len(), 2);
        assert_eq!(path.start_position(), Position::new(1, 0));
        assert_eq!(path.moves(), &[Position::new(1, 0), Position::new(2, 0)]);
        assert_eq!(path.result(), Some(PathResult::Fell));
        assert_eq!(query::status(&simulation), SimulationStatus::Fell);
    }

    #[test]
    fn advance_board_and_complete_path_is_skipped_once_complete() {
        let board = Board::from_directions(2, 1, vec![Direction::Right; 2]).expect("board");
        let mut simulation = Simulation::start(board, Some(0), Some(0), &mut rng());
        simulation.complete_board().expect("complete");
        let before: Vec<_> = query::paths(&simulation).to_vec();
        let mut events = Vec::new();

        apply(
            &mut simulation,
            Command::AdvanceBoardAndCompletePath,
            &mut events,
        )
        .expect("no-op");

        assert_eq!(query::paths(&simulation), before.as_slice());
        assert_eq!(
            events,
            vec![Event::StatusChanged {
                status: SimulationStatus::Complete,
            }]
        );
    }

    #[test]
    fn advancing_past_the_last_start_can_leave_an_unfinished_path() {
        let board = Board::from_directions(2, 1, vec![Direction::Left; 2]).expect("board");
        let mut simulation = Simulation::start(board, Some(0), Some(0), &mut rng());

        simulation.advance_board().expect("second path");
        assert_eq!(query::status(&simulation), SimulationStatus::Ok);
        simulation.advance_board().expect("board complete");

        assert_eq!(query::paths(&simulation).len(), 2);
        assert_eq!(query::status(&simulation), SimulationStatus::Complete);
        assert_eq!(query::current_path(&simulation).result(), None);
        assert_eq!(
            simulation.advance_path(),
            Err(SimulationError::BoardComplete)
        );
    }

    #[test]
    fn path_outside_the_board_is_rejected_without_side_effects() {
        let mut simulation = Simulation::start(loop_board(), Some(0), Some(0), &mut rng());

        let error = simulation
            .push_path(Position::new(5, 5))
            .expect_err("outside the board");

        assert_eq!(error.kind(), ErrorKind::OutOfRange);
        assert_eq!(query::paths(&simulation).len(), 1);
        simulation.advance_board().expect("advance");
        assert_eq!(query::current_path(&simulation).id(), PathId::new(1));
    }

    #[test]
    fn path_ids_increase_in_creation_order() {
        let board = Board::generate(4, 3, &mut rng()).expect("board");
        let mut simulation = Simulation::start(board, Some(0), Some(0), &mut rng());
        simulation.complete_board().expect("complete");

        let ids: Vec<_> = query::paths(&simulation)
            .iter()
            .map(|path| path.id().get())
            .collect();
        assert_eq!(ids, (0..12).collect::<Vec<_>>());
    }

    #[test]
    fn apply_reports_each_step_and_the_final_status() {
        let mut simulation = Simulation::start(loop_board(), Some(0), Some(0), &mut rng());
        let mut events = Vec::new();

        apply(&mut simulation, Command::CompletePath, &mut events).expect("apply");

        let id = PathId::new(0);
        assert_eq!(
            events,
            vec![
                Event::PathAdvanced {
                    path: id,
                    from: Position::new(0, 0),
                    to: Position::new(1, 0),
                },
                Event::PathAdvanced {
                    path: id,
                    from: Position::new(1, 0),
                    to: Position::new(1, 1),
                },
                Event::PathAdvanced {
                    path: id,
                    from: Position::new(1, 1),
                    to: Position::new(0, 1),
                },
                Event::PathAdvanced {
                    path: id,
                    from: Position::new(0, 1),
                    to: Position::new(0, 0),
                },
                Event::PathEnded {
                    path: id,
                    result: PathResult::Loop,
                    at: Position::new(0, 0),
                },
                Event::StatusChanged {
                    status: SimulationStatus::Loop,
                },
            ]
        );
    }

    #[test]
    fn apply_reports_new_paths() {
        let mut simulation = Simulation::start(loop_board(), Some(0), Some(0), &mut rng());
        let _ = simulation.complete_path().expect("complete");
        let mut events = Vec::new();

        apply(&mut simulation, Command::AdvanceBoard, &mut events).expect("apply");

        assert_eq!(
            events,
            vec![
                Event::PathStarted {
                    path: PathId::new(1),
                    start: Position::new(1, 0),
                },
                Event::StatusChanged {
                    status: SimulationStatus::Ok,
                },
            ]
        );
    }

    #[test]
    fn failed_command_emits_nothing() {
        let board = Board::from_directions(1, 1, vec![Direction::Right]).expect("board");
        let mut simulation = Simulation::start(board, Some(0), Some(0), &mut rng());
        let _ = simulation.advance_path().expect("falls");
        let mut events = Vec::new();

        let outcome = apply(&mut simulation, Command::AdvancePath, &mut events);

        assert!(outcome.is_err());
        assert!(events.is_empty());
    }

    #[test]
    fn count_results_tallies_outcomes() {
        let board = Board::from_directions(
            2,
            1,
            vec![Direction::Left, Direction::Right],
        )
        .expect("board");
        let mut simulation = Simulation::start(board, Some(0), Some(0), &mut rng());
        simulation.complete_board().expect("complete");

        assert_eq!(query::count_results(&simulation, PathResult::Fell), 2);
        assert_eq!(query::count_results(&simulation, PathResult::Loop), 0);
    }
}
