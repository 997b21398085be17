//! Core game logic: board and drop rule, players, move history, and the
//! session state machine that sequences turns and evaluates each move.

mod board;
mod history;
mod player;
mod state;

pub use board::{Board, Cell};
pub use history::{History, Move};
pub use player::Player;
pub use state::{GameSession, MoveError, Phase};
