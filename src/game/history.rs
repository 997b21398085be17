use super::Player;

/// One completed placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    pub player: Player,
    pub row: usize,
    pub col: usize,
}

/// Append-only record of the moves of one game.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct History {
    moves: Vec<Move>,
}

impl History {
    pub fn new() -> Self {
        History { moves: Vec::new() }
    }

    pub fn push(&mut self, mv: Move) {
        self.moves.push(mv);
    }

    /// Most recent move, if any
    pub fn latest(&self) -> Option<&Move> {
        self.moves.last()
    }

    /// Moves in play order; index 0 is the opening move
    pub fn get(&self, index: usize) -> Option<&Move> {
        self.moves.get(index)
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Move> {
        self.moves.iter()
    }

    /// Moves from the most recent back to the first
    pub fn iter_recent(&self) -> impl Iterator<Item = &Move> {
        self.moves.iter().rev()
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    pub(crate) fn clear(&mut self) {
        self.moves.clear();
    }
}
