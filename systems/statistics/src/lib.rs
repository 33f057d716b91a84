#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Statistics system that summarises the simulation after every command.

use std::fmt;

use drift_core::{Event, PathResult, Position, SimulationStatus};
use drift_world::{query, Simulation};

/// User actions a controller may offer in the current state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AvailableActions {
    /// Single-step the current path.
    pub next: bool,
    /// Run the current path until it ends.
    pub complete: bool,
    /// Start the next path.
    pub advance: bool,
    /// Run every remaining path.
    pub run: bool,
}

impl AvailableActions {
    /// Actions permitted while the simulation is in `status`.
    #[must_use]
    pub const fn for_status(status: SimulationStatus) -> Self {
        let path_open = matches!(status, SimulationStatus::Ok);
        let board_open = !matches!(status, SimulationStatus::Complete);
        Self {
            next: path_open,
            complete: path_open,
            advance: board_open,
            run: board_open,
        }
    }
}

/// Human-facing summary of the simulation state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatsReport {
    /// Steps taken by the current path.
    pub move_count: usize,
    /// Number of paths created so far.
    pub path_count: usize,
    /// Paths that ended in a loop.
    pub loop_count: usize,
    /// Paths that fell off the board.
    pub fell_count: usize,
    /// Status the report was captured in.
    pub status: SimulationStatus,
    /// Last position of the current path.
    pub position: Position,
    /// Actions a controller should offer next.
    pub actions: AvailableActions,
}

impl StatsReport {
    /// Captures a report from the current simulation state.
    #[must_use]
    pub fn capture(simulation: &Simulation) -> Self {
        let current = query::current_path(simulation);
        let status = query::status(simulation);
        Self {
            move_count: current.step_count(),
            path_count: query::paths(simulation).len(),
            loop_count: query::count_results(simulation, PathResult::Loop),
            fell_count: query::count_results(simulation, PathResult::Fell),
            status,
            position: current.position(),
            actions: AvailableActions::for_status(status),
        }
    }

    /// Status line describing what just happened.
    #[must_use]
    pub fn message(&self) -> String {
        match self.status {
            SimulationStatus::Ok => "Can continue.".to_owned(),
            SimulationStatus::Loop => "Detected Loop.".to_owned(),
            SimulationStatus::Fell => format!(
                "Fell Off at: {} x {}",
                self.position.x(),
                self.position.y()
            ),
            SimulationStatus::Complete => "Board is Complete".to_owned(),
        }
    }
}

impl fmt::Display for StatsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} moves: {} paths: {} loops: {} fell: {}",
            self.message(),
            self.move_count,
            self.path_count,
            self.loop_count,
            self.fell_count
        )
    }
}

/// Pure statistics system that captures a report whenever the status is published.
#[derive(Debug, Default)]
pub struct Statistics;

impl Statistics {
    /// Creates a statistics system.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Captures a fresh report when `events` publish a status.
    ///
    /// Returns `None` when no status event was observed.
    pub fn handle(&mut self, events: &[Event], simulation: &Simulation) -> Option<StatsReport> {
        events
            .iter()
            .any(|event| matches!(event, Event::StatusChanged { .. }))
            .then(|| StatsReport::capture(simulation))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ok_status_offers_every_action() {
        let actions = AvailableActions::for_status(SimulationStatus::Ok);
        assert!(actions.next && actions.complete && actions.advance && actions.run);
    }

    #[test]
    fn ended_path_only_offers_board_actions() {
        for status in [SimulationStatus::Loop, SimulationStatus::Fell] {
            let actions = AvailableActions::for_status(status);
            assert!(!actions.next);
            assert!(!actions.complete);
            assert!(actions.advance);
            assert!(actions.run);
        }
    }

    #[test]
    fn complete_board_offers_nothing() {
        let actions = AvailableActions::for_status(SimulationStatus::Complete);
        assert_eq!(
            actions,
            AvailableActions {
                next: false,
                complete: false,
                advance: false,
                run: false,
            }
        );
    }
}
