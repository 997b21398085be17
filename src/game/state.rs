use std::fmt;

use tracing::{debug, error, info, instrument};

use super::{Board, Cell, History, Move, Player};
use crate::config::GameConfig;
use crate::error::ConfigError;

/// Authoritative status of a game session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Init,
    TurnOf(Player),
    Won(Player),
    Draw,
}

impl Phase {
    /// Won and Draw have no outgoing transitions
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Won(_) | Phase::Draw)
    }

    /// Whether the state machine may move from `self` to `next`.
    pub fn can_transition_to(self, next: Phase) -> bool {
        match (self, next) {
            (Phase::Init, Phase::TurnOf(Player::A)) => true,
            (Phase::TurnOf(current), Phase::TurnOf(following)) => following == current.other(),
            (Phase::TurnOf(current), Phase::Won(winner)) => winner == current,
            (Phase::TurnOf(_), Phase::Draw) => true,
            _ => false,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Init => write!(f, "waiting to start"),
            Phase::TurnOf(player) => write!(f, "{} to move", player.name()),
            Phase::Won(player) => write!(f, "{} won", player.name()),
            Phase::Draw => write!(f, "draw"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoveError {
    #[error("column {column} is outside the board (width {width})")]
    InvalidColumn { column: i64, width: usize },

    #[error("column {0} is full")]
    ColumnFull(usize),

    #[error("game is over")]
    GameOver,

    #[error("game has not started")]
    NotStarted,

    #[error("game is paused")]
    Paused,

    #[error("invalid phase transition: {from} -> {to}")]
    InvalidPhaseTransition { from: Phase, to: Phase },
}

impl MoveError {
    /// Fatal errors are programming errors; everything else is a rejected click.
    pub fn is_fatal(&self) -> bool {
        matches!(self, MoveError::InvalidPhaseTransition { .. })
    }
}

/// One game: board, move history and phase, driven one input at a time.
#[derive(Debug, Clone)]
pub struct GameSession {
    config: GameConfig,
    board: Board,
    history: History,
    phase: Phase,
    /// Cells of the run that ended the game, set together with `Phase::Won`
    winning_line: Option<Vec<(usize, usize)>>,
    paused: bool,
}

impl GameSession {
    /// Create a session in `Phase::Init` with an empty board.
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::with_config(config))
    }

    fn with_config(config: GameConfig) -> Self {
        GameSession {
            board: Board::new(config.board_height, config.board_width),
            history: History::new(),
            phase: Phase::Init,
            winning_line: None,
            paused: false,
            config,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Get reference to board
    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Player to move, or `None` before the start and after the end
    pub fn current_player(&self) -> Option<Player> {
        match self.phase {
            Phase::TurnOf(player) => Some(player),
            _ => None,
        }
    }

    /// Check if game is over
    pub fn is_terminal(&self) -> bool {
        self.phase.is_terminal()
    }

    /// Cells of the winning run, in line order. `None` unless the game was won.
    pub fn winning_line(&self) -> Option<&[(usize, usize)]> {
        self.winning_line.as_deref()
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Pause or resume a game in progress. Returns whether the session is
    /// paused afterwards; before the start and after the end this does nothing.
    pub fn toggle_pause(&mut self) -> bool {
        if matches!(self.phase, Phase::TurnOf(_)) {
            self.paused = !self.paused;
            info!(paused = self.paused, "pause toggled");
        }
        self.paused
    }

    /// Advance one simulation tick. Only `Init` reacts: the first turn goes to
    /// player A.
    pub fn tick(&mut self) -> Result<Phase, MoveError> {
        if self.phase == Phase::Init {
            self.transition_to(Phase::TurnOf(Player::A))?;
        }
        Ok(self.phase)
    }

    /// Drop the current player's piece into `column`.
    ///
    /// Either the whole turn happens (place, record, evaluate, change phase)
    /// or nothing is mutated and the reason is returned.
    #[instrument(skip(self))]
    pub fn handle_input(&mut self, column: usize) -> Result<Move, MoveError> {
        let player = match self.phase {
            Phase::TurnOf(player) => player,
            Phase::Init => {
                debug!("input before the first tick ignored");
                return Err(MoveError::NotStarted);
            }
            Phase::Won(_) | Phase::Draw => {
                debug!(phase = %self.phase, "input after game end ignored");
                return Err(MoveError::GameOver);
            }
        };

        if self.paused {
            debug!("input while paused ignored");
            return Err(MoveError::Paused);
        }

        // Place and evaluate on a copy so a refused transition leaves the
        // session untouched
        let mut board = self.board.clone();
        let row = board
            .drop_piece(column, player)
            .inspect_err(|err| debug!(reason = %err, "move rejected"))?;
        let mv = Move {
            player,
            row,
            col: column,
        };
        let (next, winning_line) = evaluate_board(&board, &self.config, &mv);

        self.transition_to(next)?;
        self.board = board;
        self.history.push(mv);
        self.winning_line = winning_line;
        info!(player = player.name(), row, col = column, moves = self.history.len(), "piece placed");

        Ok(mv)
    }

    /// Phase that follows `last_move` on the current board.
    pub fn evaluate(&self, last_move: &Move) -> Phase {
        evaluate_board(&self.board, &self.config, last_move).0
    }

    /// Start a new game with the same configuration.
    pub fn reset(&mut self) {
        self.board = Board::new(self.config.board_height, self.config.board_width);
        self.history.clear();
        self.phase = Phase::Init;
        self.winning_line = None;
        self.paused = false;
        info!("new game");
    }

    fn transition_to(&mut self, next: Phase) -> Result<(), MoveError> {
        if !self.phase.can_transition_to(next) {
            error!(from = %self.phase, to = %next, "refusing invalid phase transition");
            return Err(MoveError::InvalidPhaseTransition {
                from: self.phase,
                to: next,
            });
        }

        if next.is_terminal() {
            info!(outcome = %next, "game over");
        } else {
            debug!(from = %self.phase, to = %next, "phase change");
        }
        self.phase = next;
        Ok(())
    }
}

impl Default for GameSession {
    fn default() -> Self {
        Self::with_config(GameConfig::default())
    }
}

/// Win, draw or next turn after `last` was placed on `board`, with the
/// winning cells when the move won.
fn evaluate_board(
    board: &Board,
    config: &GameConfig,
    last: &Move,
) -> (Phase, Option<Vec<(usize, usize)>>) {
    if let Some(line) = find_winning_line(board, config, last) {
        return (Phase::Won(last.player), Some(line));
    }

    let next = if board.is_full() {
        Phase::Draw
    } else {
        Phase::TurnOf(last.player.other())
    };
    (next, None)
}

/// Lines are scanned whole: the row, then the column, then (when enabled) the
/// two diagonals through the move. Counting resets on any other cell, so a
/// full-line scan finds the same runs as a window around the move.
fn find_winning_line(board: &Board, config: &GameConfig, last: &Move) -> Option<Vec<(usize, usize)>> {
    let target = last.player.to_cell();
    let win_length = config.win_length;
    let (row, col) = (last.row, last.col);

    if let Some(run) = find_run(board, (0..board.width()).map(|c| (row, c)), target, win_length) {
        debug!(row, "horizontal run");
        return Some(run);
    }
    if let Some(run) = find_run(board, (0..board.height()).map(|r| (r, col)), target, win_length) {
        debug!(col, "vertical run");
        return Some(run);
    }
    if !config.diagonal_wins {
        return None;
    }

    let run = find_run(board, falling_diagonal(board, row, col), target, win_length)
        .or_else(|| find_run(board, rising_diagonal(board, row, col), target, win_length));
    if run.is_some() {
        debug!(row, col, "diagonal run");
    }
    run
}

/// First `win_length` consecutive `target` cells along `line`
fn find_run(
    board: &Board,
    line: impl Iterator<Item = (usize, usize)>,
    target: Cell,
    win_length: usize,
) -> Option<Vec<(usize, usize)>> {
    let mut run = Vec::with_capacity(win_length);
    for (row, col) in line {
        if board.get(row, col) == target {
            run.push((row, col));
            if run.len() >= win_length {
                return Some(run);
            }
        } else {
            run.clear();
        }
    }
    None
}

/// The `\` diagonal through `(row, col)`, top-left to bottom-right
fn falling_diagonal(board: &Board, row: usize, col: usize) -> impl Iterator<Item = (usize, usize)> {
    let back = row.min(col);
    let (start_row, start_col) = (row - back, col - back);
    let len = (board.height() - start_row).min(board.width() - start_col);
    (0..len).map(move |i| (start_row + i, start_col + i))
}

/// The `/` diagonal through `(row, col)`, top-right to bottom-left
fn rising_diagonal(board: &Board, row: usize, col: usize) -> impl Iterator<Item = (usize, usize)> {
    let back = row.min(board.width() - 1 - col);
    let (start_row, start_col) = (row - back, col + back);
    let len = (board.height() - start_row).min(start_col + 1);
    (0..len).map(move |i| (start_row + i, start_col - i))
}
