//! Terminal front end: the renderer and input-source seams the app loop is
//! written against, their ratatui/crossterm implementations, and the loop
//! itself.

mod app;
mod game_view;
mod input;

use std::io;
use std::time::Duration;

use crate::game::{Board, GameSession, Phase};

pub use app::App;
pub use game_view::TerminalRenderer;
pub use input::CrosstermInput;

/// Pointer position in the drawing surface's coordinate space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerPos {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    PointerMoved(PointerPos),
    Click(PointerPos),
    SelectLeft,
    SelectRight,
    DropSelected,
    TogglePause,
    NewGame,
    Quit,
}

/// Where the board's cells sit on the drawing surface, as laid out by the
/// last frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoardGeometry {
    pub origin_x: f32,
    pub origin_y: f32,
    pub cell_width: f32,
}

impl BoardGeometry {
    /// Column under horizontal position `x`: `floor((x - origin_x) / cell_width)`.
    ///
    /// Positions left of the board give negative columns and positions past
    /// the right edge give columns `>= width`; rejecting them is up to the
    /// session.
    pub fn column_at(&self, x: f32) -> i64 {
        ((x - self.origin_x) / self.cell_width).floor() as i64
    }
}

/// Read-only snapshot handed to a [`Renderer`] each frame.
#[derive(Debug, Clone, Copy)]
pub struct GameView<'a> {
    pub phase: Phase,
    pub board: &'a Board,
    /// Column to highlight; only set while a turn is in progress
    pub hover_column: Option<usize>,
    /// Cells of the winning run once the game is won
    pub winning_line: Option<&'a [(usize, usize)]>,
    pub paused: bool,
    pub message: Option<&'a str>,
}

impl<'a> GameView<'a> {
    pub fn new(
        session: &'a GameSession,
        hover_column: Option<usize>,
        message: Option<&'a str>,
    ) -> Self {
        let phase = session.phase();
        let paused = session.is_paused();
        let hover_column = hover_column
            .filter(|&col| col < session.board().width())
            .filter(|_| matches!(phase, Phase::TurnOf(_)) && !paused);

        GameView {
            phase,
            board: session.board(),
            hover_column,
            winning_line: session.winning_line(),
            paused,
            message,
        }
    }

    pub fn is_winning_cell(&self, row: usize, col: usize) -> bool {
        self.winning_line
            .is_some_and(|line| line.contains(&(row, col)))
    }

    /// End-of-game banner, `None` while the game is running
    pub fn banner(&self) -> Option<String> {
        match self.phase {
            Phase::Won(player) => Some(format!("{} wins!", player.name())),
            Phase::Draw => Some("Draw!".to_string()),
            Phase::Init | Phase::TurnOf(_) => None,
        }
    }
}

/// Draws one frame. Must not change game state.
pub trait Renderer {
    fn draw(&mut self, view: &GameView<'_>) -> io::Result<BoardGeometry>;
}

/// Source of pointer, click and key events.
pub trait InputSource {
    /// Wait up to `timeout` for the next event.
    fn next_event(&mut self, timeout: Duration) -> io::Result<Option<InputEvent>>;
}
