use drift_core::{Direction, PathId, PathResult, Position};

/// Append-only history of the positions visited by one traversal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Path {
    id: PathId,
    moves: Vec<Position>,
    result: Option<PathResult>,
}

impl Path {
    /// Creates a path that starts (and currently sits) on `start`.
    #[must_use]
    pub fn new(id: PathId, start: Position) -> Self {
        Self {
            id,
            moves: vec![start],
            result: None,
        }
    }

    /// Identifier assigned when the path was created.
    #[must_use]
    pub const fn id(&self) -> PathId {
        self.id
    }

    /// Most recent position; may lie off the board once the path fell.
    #[must_use]
    pub fn position(&self) -> Position {
        self.moves[self.moves.len() - 1]
    }

    /// Cell the path started on.
    #[must_use]
    pub fn start_position(&self) -> Position {
        self.moves[0]
    }

    /// Every position in visiting order, starting with the start cell.
    #[must_use]
    pub fn moves(&self) -> &[Position] {
        &self.moves
    }

    /// Number of steps taken so far.
    #[must_use]
    pub fn step_count(&self) -> usize {
        self.moves.len() - 1
    }

    /// Terminal outcome, once the path looped or fell.
    #[must_use]
    pub const fn result(&self) -> Option<PathResult> {
        self.result
    }

    /// Appends the position one step away in `direction` and returns it.
    ///
    /// Bounds and loop checks belong to the caller.
    pub fn step(&mut self, direction: Direction) -> Position {
        let next = self.position().offset(direction);
        self.moves.push(next);
        next
    }

    /// Records the terminal outcome of the path.
    pub fn set_result(&mut self, result: PathResult) {
        self.result = Some(result);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_path_holds_only_its_start() {
        let path = Path::new(PathId::new(4), Position::new(2, 3));

        assert_eq!(path.id(), PathId::new(4));
        assert_eq!(path.moves(), &[Position::new(2, 3)]);
        assert_eq!(path.position(), path.start_position());
        assert_eq!(path.step_count(), 0);
        assert_eq!(path.result(), None);
    }

    #[test]
    fn step_appends_without_touching_history() {
        let mut path = Path::new(PathId::new(0), Position::new(1, 1));

        assert_eq!(path.step(Direction::Up), Position::new(1, 0));
        assert_eq!(path.step(Direction::Left), Position::new(0, 0));
        assert_eq!(path.step(Direction::Left), Position::new(-1, 0));

        assert_eq!(
            path.moves(),
            &[
                Position::new(1, 1),
                Position::new(1, 0),
                Position::new(0, 0),
                Position::new(-1, 0),
            ]
        );
        assert_eq!(path.start_position(), Position::new(1, 1));
        assert_eq!(path.position(), Position::new(-1, 0));
        assert_eq!(path.step_count(), 3);
    }

    #[test]
    fn result_is_recorded() {
        let mut path = Path::new(PathId::new(0), Position::ORIGIN);
        path.set_result(PathResult::Fell);
        assert_eq!(path.result(), Some(PathResult::Fell));
    }
}
