use std::time::Duration;

use tracing::{debug, info};

use super::{BoardGeometry, GameView, InputEvent, InputSource, PointerPos, Renderer};
use crate::error::AppError;
use crate::game::{GameSession, MoveError};

/// Drives one game session: per tick it advances the session, applies at
/// most one input event, then draws the result.
pub struct App<R, I> {
    session: GameSession,
    renderer: R,
    input: I,
    tick: Duration,
    geometry: Option<BoardGeometry>,
    selected_column: usize,
    should_quit: bool,
    message: Option<String>,
}

impl<R: Renderer, I: InputSource> App<R, I> {
    pub fn new(session: GameSession, renderer: R, input: I, tick: Duration) -> Self {
        let selected_column = session.board().width() / 2;
        App {
            session,
            renderer,
            input,
            tick,
            geometry: None,
            selected_column,
            should_quit: false,
            message: None,
        }
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    /// Main application loop. Returns on quit, on terminal I/O failure, or on
    /// a fatal game state error.
    pub fn run(&mut self) -> Result<(), AppError> {
        self.draw()?;

        while !self.should_quit {
            self.session.tick()?;
            if let Some(event) = self.input.next_event(self.tick)? {
                self.handle_event(event)?;
            }
            self.draw()?;
        }
        Ok(())
    }

    fn draw(&mut self) -> Result<(), AppError> {
        let view = GameView::new(
            &self.session,
            Some(self.selected_column),
            self.message.as_deref(),
        );
        self.geometry = Some(self.renderer.draw(&view)?);
        Ok(())
    }

    fn handle_event(&mut self, event: InputEvent) -> Result<(), AppError> {
        if let InputEvent::PointerMoved(pos) = event {
            self.hover(pos);
            return Ok(());
        }

        // Clear message on anything but pointer movement
        self.message = None;

        match event {
            InputEvent::PointerMoved(_) => {}
            InputEvent::Click(pos) => self.click(pos)?,
            InputEvent::SelectLeft => {
                self.selected_column = self.selected_column.saturating_sub(1);
            }
            InputEvent::SelectRight => {
                let last = self.session.board().width() - 1;
                self.selected_column = (self.selected_column + 1).min(last);
            }
            InputEvent::DropSelected => self.drop_piece(self.selected_column)?,
            InputEvent::TogglePause => {
                if self.session.toggle_pause() {
                    self.message = Some("Paused. Press 'p' to resume.".to_string());
                }
            }
            InputEvent::NewGame => {
                self.session.reset();
                self.selected_column = self.session.board().width() / 2;
                self.message = Some("New game started!".to_string());
            }
            InputEvent::Quit => {
                info!("quit requested");
                self.should_quit = true;
            }
        }
        Ok(())
    }

    /// Column under `pos` according to the last drawn frame
    fn column_at(&self, pos: PointerPos) -> Option<i64> {
        self.geometry.map(|geometry| geometry.column_at(pos.x))
    }

    fn hover(&mut self, pos: PointerPos) {
        if let Some(col) = self.column_at(pos).and_then(|c| usize::try_from(c).ok()) {
            if col < self.session.board().width() {
                self.selected_column = col;
            }
        }
    }

    fn click(&mut self, pos: PointerPos) -> Result<(), AppError> {
        let Some(column) = self.column_at(pos) else {
            debug!(x = pos.x, "click before first frame ignored");
            return Ok(());
        };
        debug!(x = pos.x, y = pos.y, column, "click");

        match usize::try_from(column) {
            Ok(col) => {
                self.hover(pos);
                self.drop_piece(col)
            }
            Err(_) => self.rejected(MoveError::InvalidColumn {
                column,
                width: self.session.board().width(),
            }),
        }
    }

    /// Drop piece in the given column
    fn drop_piece(&mut self, column: usize) -> Result<(), AppError> {
        match self.session.handle_input(column) {
            Ok(_) => Ok(()),
            Err(err) => self.rejected(err),
        }
    }

    fn rejected(&mut self, err: MoveError) -> Result<(), AppError> {
        if err.is_fatal() {
            return Err(err.into());
        }
        debug!(reason = %err, "move rejected");

        self.message = match err {
            MoveError::ColumnFull(_) => Some("Column is full!".to_string()),
            MoveError::InvalidColumn { .. } => Some("Click inside the board!".to_string()),
            MoveError::GameOver => Some("Game over! Press 'r' to restart.".to_string()),
            MoveError::Paused => Some("Paused. Press 'p' to resume.".to_string()),
            MoveError::NotStarted | MoveError::InvalidPhaseTransition { .. } => None,
        };
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::game::{Cell, Phase, Player};
    use crate::ui::TerminalRenderer;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use std::collections::VecDeque;
    use std::io;

    /// Replays a fixed list of events, then quits.
    struct ScriptedInput {
        events: VecDeque<InputEvent>,
    }

    impl ScriptedInput {
        fn new(events: Vec<InputEvent>) -> Self {
            ScriptedInput {
                events: events.into(),
            }
        }
    }

    impl InputSource for ScriptedInput {
        fn next_event(&mut self, _timeout: Duration) -> io::Result<Option<InputEvent>> {
            Ok(Some(self.events.pop_front().unwrap_or(InputEvent::Quit)))
        }
    }

    /// Records what each frame showed.
    #[derive(Default)]
    struct RecordingRenderer {
        frames: Vec<(Phase, Option<usize>, Option<String>)>,
    }

    impl Renderer for RecordingRenderer {
        fn draw(&mut self, view: &GameView<'_>) -> io::Result<BoardGeometry> {
            self.frames
                .push((view.phase, view.hover_column, view.banner()));
            Ok(BoardGeometry {
                origin_x: 10.0,
                origin_y: 2.0,
                cell_width: 3.0,
            })
        }
    }

    fn click(col: i64) -> InputEvent {
        InputEvent::Click(PointerPos {
            x: 10.0 + 3.0 * col as f32 + 1.0,
            y: 5.0,
        })
    }

    fn scripted_app(config: GameConfig, events: Vec<InputEvent>) -> App<RecordingRenderer, ScriptedInput> {
        App::new(
            GameSession::new(config).unwrap(),
            RecordingRenderer::default(),
            ScriptedInput::new(events),
            Duration::ZERO,
        )
    }

    fn small() -> GameConfig {
        GameConfig {
            board_height: 4,
            board_width: 4,
            win_length: 4,
            diagonal_wins: false,
        }
    }

    #[test]
    fn test_clicks_drop_pieces() {
        let mut app = scripted_app(small(), vec![click(1), click(1), click(3)]);
        app.run().unwrap();

        let board = app.session().board();
        assert_eq!(board.get(3, 1), Cell::Occupied(Player::A));
        assert_eq!(board.get(2, 1), Cell::Occupied(Player::B));
        assert_eq!(board.get(3, 3), Cell::Occupied(Player::A));
        assert_eq!(app.session().phase(), Phase::TurnOf(Player::B));
    }

    #[test]
    fn test_render_after_update() {
        let mut app = scripted_app(small(), vec![click(0)]);
        app.run().unwrap();

        let frames = &app.renderer.frames;
        // Initial frame, the click frame, the quit frame
        assert_eq!(frames.len(), 3);
        assert_eq!(frames[0].0, Phase::Init);
        assert_eq!(frames[1].0, Phase::TurnOf(Player::B));
    }

    #[test]
    fn test_clicks_outside_board_rejected() {
        let mut app = scripted_app(small(), vec![click(-1), click(4), click(9)]);
        app.run().unwrap();

        assert!(app.session().history().is_empty());
        assert_eq!(app.session().board().empty_cells(), 16);
        assert_eq!(app.session().phase(), Phase::TurnOf(Player::A));
    }

    #[test]
    fn test_full_column_message() {
        let mut app = scripted_app(small(), vec![click(2); 5]);
        app.run().unwrap();

        assert_eq!(app.session().history().len(), 4);
        assert_eq!(app.message.as_deref(), None); // cleared by the quit event

        let mut app = scripted_app(small(), vec![click(2); 5]);
        for _ in 0..5 {
            app.session.tick().unwrap();
            app.draw().unwrap();
            let event = app.input.next_event(Duration::ZERO).unwrap().unwrap();
            app.handle_event(event).unwrap();
        }
        assert_eq!(app.message.as_deref(), Some("Column is full!"));
    }

    #[test]
    fn test_game_ends_with_banner() {
        let mut config = small();
        config.win_length = 2;
        let mut app = scripted_app(config, vec![click(0), click(1), click(0), click(2)]);
        app.run().unwrap();

        assert_eq!(app.session().phase(), Phase::Won(Player::A));
        assert_eq!(app.session().history().len(), 3);

        let (phase, hover, banner) = app.renderer.frames.last().unwrap();
        assert_eq!(*phase, Phase::Won(Player::A));
        assert_eq!(*hover, None);
        assert_eq!(banner.as_deref(), Some("Player A wins!"));
    }

    #[test]
    fn test_keyboard_selection_and_drop() {
        let events = vec![
            InputEvent::SelectLeft,
            InputEvent::SelectLeft,
            InputEvent::SelectLeft,
            InputEvent::DropSelected,
            InputEvent::SelectRight,
            InputEvent::SelectRight,
            InputEvent::SelectRight,
            InputEvent::SelectRight,
            InputEvent::DropSelected,
        ];
        let mut app = scripted_app(small(), events);
        app.run().unwrap();

        let board = app.session().board();
        assert_eq!(board.get(3, 0), Cell::Occupied(Player::A));
        assert_eq!(board.get(3, 3), Cell::Occupied(Player::B));
    }

    #[test]
    fn test_pointer_moves_highlight() {
        let moved = InputEvent::PointerMoved(PointerPos { x: 10.0 + 3.0 * 3.0, y: 0.0 });
        let mut app = scripted_app(small(), vec![moved]);
        app.run().unwrap();

        assert_eq!(app.renderer.frames[1].1, Some(3));
    }

    #[test]
    fn test_pause_holds_moves() {
        let events = vec![
            click(0),
            InputEvent::TogglePause,
            click(1),
            click(2),
            InputEvent::TogglePause,
            click(3),
        ];
        let mut app = scripted_app(small(), events);
        app.run().unwrap();

        let board = app.session().board();
        assert_eq!(app.session().history().len(), 2);
        assert_eq!(board.get(3, 0), Cell::Occupied(Player::A));
        assert_eq!(board.get(3, 1), Cell::Empty);
        assert_eq!(board.get(3, 2), Cell::Empty);
        assert_eq!(board.get(3, 3), Cell::Occupied(Player::B));

        // Frames after pausing show no hover highlight
        assert_eq!(app.renderer.frames[2].1, None);
        assert_eq!(app.renderer.frames[3].1, None);
    }

    #[test]
    fn test_click_while_paused_shows_message() {
        let mut app = scripted_app(small(), vec![]);
        app.session.tick().unwrap();
        app.draw().unwrap();

        app.handle_event(InputEvent::TogglePause).unwrap();
        assert!(app.session().is_paused());
        app.handle_event(click(0)).unwrap();
        assert_eq!(app.message.as_deref(), Some("Paused. Press 'p' to resume."));
        assert!(app.session().history().is_empty());
    }

    #[test]
    fn test_new_game_resets_session() {
        let events = vec![click(0), click(1), InputEvent::NewGame];
        let mut app = scripted_app(small(), events);
        app.run().unwrap();

        assert!(app.session().history().is_empty());
        assert_eq!(app.session().board().empty_cells(), 16);
        assert_eq!(app.session().phase(), Phase::TurnOf(Player::A));
    }

    #[test]
    fn test_runs_against_terminal_renderer() {
        let renderer = TerminalRenderer::new(Terminal::new(TestBackend::new(40, 22)).unwrap(), 3);
        // Board origin is x = 8 on this terminal
        let events = vec![InputEvent::Click(PointerPos { x: 9.0, y: 10.0 })];
        let mut app = App::new(
            GameSession::default(),
            renderer,
            ScriptedInput::new(events),
            Duration::ZERO,
        );
        app.run().unwrap();

        assert_eq!(app.session().board().get(7, 0), Cell::Occupied(Player::A));
    }
}
