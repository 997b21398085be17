use super::board::Cell;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Player {
    A,
    B,
}

impl Player {
    /// Get the other player
    pub fn other(self) -> Player {
        match self {
            Player::A => Player::B,
            Player::B => Player::A,
        }
    }

    /// Convert player to cell type
    pub fn to_cell(self) -> Cell {
        Cell::Occupied(self)
    }

    /// Get player name for display
    pub fn name(self) -> &'static str {
        match self {
            Player::A => "Player A",
            Player::B => "Player B",
        }
    }
}
