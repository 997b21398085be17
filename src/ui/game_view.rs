use std::io;

use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame, Terminal,
};

use super::{BoardGeometry, GameView, Renderer};
use crate::game::{Cell, Phase, Player};

/// Draws the game with ratatui. One board cell is `cell_width` terminal
/// columns wide and one row tall.
pub struct TerminalRenderer<B: Backend> {
    terminal: Terminal<B>,
    cell_width: u16,
}

impl<B: Backend> TerminalRenderer<B> {
    pub fn new(terminal: Terminal<B>, cell_width: u16) -> Self {
        TerminalRenderer {
            terminal,
            cell_width: cell_width.max(1),
        }
    }
}

impl<B: Backend> Renderer for TerminalRenderer<B> {
    fn draw(&mut self, view: &GameView<'_>) -> io::Result<BoardGeometry> {
        let cell_width = self.cell_width;
        let mut geometry = BoardGeometry {
            origin_x: 0.0,
            origin_y: 0.0,
            cell_width: f32::from(cell_width),
        };

        self.terminal
            .draw(|frame| geometry = render(frame, view, cell_width))
            .map_err(|e| io::Error::other(e.to_string()))?;

        Ok(geometry)
    }
}

fn player_color(player: Player) -> Color {
    match player {
        Player::A => Color::Red,
        Player::B => Color::Blue,
    }
}

fn highlight_color(player: Player) -> Color {
    match player {
        Player::A => Color::Rgb(96, 0, 0),
        Player::B => Color::Rgb(0, 0, 96),
    }
}

fn render(frame: &mut Frame, view: &GameView<'_>, cell_width: u16) -> BoardGeometry {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(4),    // Board
            Constraint::Length(3), // Banner / message
            Constraint::Length(3), // Controls
        ])
        .split(frame.area());

    render_header(frame, view, chunks[0]);
    let geometry = render_board(frame, view, cell_width, chunks[1]);
    render_message(frame, view, chunks[2]);
    render_controls(frame, chunks[3]);
    geometry
}

fn render_header(frame: &mut Frame, view: &GameView<'_>, area: Rect) {
    let color = match view.phase {
        Phase::TurnOf(player) | Phase::Won(player) => player_color(player),
        Phase::Init | Phase::Draw => Color::White,
    };
    let status = if view.paused {
        format!("Paused ({})", view.phase)
    } else {
        view.phase.to_string()
    };

    let header = Paragraph::new(status)
        .style(Style::default().fg(color).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title("Drop Four"));

    frame.render_widget(header, area);
}

fn render_board(frame: &mut Frame, view: &GameView<'_>, cell_width: u16, area: Rect) -> BoardGeometry {
    let block = Block::default().borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let board = view.board;
    let width = cell_width as usize;
    let board_width = (board.width() as u16).saturating_mul(cell_width);
    let x = inner.x + inner.width.saturating_sub(board_width) / 2;
    let board_area = Rect::new(x, inner.y, board_width.min(inner.width), inner.height);

    let highlight = match (view.phase, view.hover_column) {
        (Phase::TurnOf(player), Some(col)) => Some((col, highlight_color(player))),
        _ => None,
    };
    let column_style = |col: usize| match highlight {
        Some((hovered, bg)) if hovered == col => Style::default().bg(bg),
        _ => Style::default(),
    };

    let mut lines = Vec::with_capacity(board.height() + 1);

    // Column numbers
    let numbers: Vec<Span> = (0..board.width())
        .map(|col| {
            let label = format!("{:^width$}", (col + 1) % 100, width = width);
            let style = if highlight.is_some_and(|(hovered, _)| hovered == col) {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            Span::styled(label, style)
        })
        .collect();
    lines.push(Line::from(numbers));

    for row in 0..board.height() {
        let spans: Vec<Span> = board
            .row_cells(row)
            .enumerate()
            .map(|(col, cell)| {
                let (symbol, fg) = match cell {
                    Cell::Empty => (".", Color::DarkGray),
                    Cell::Occupied(player) => ("\u{25cf}", player_color(player)),
                };
                let mut style = column_style(col).fg(fg);
                if view.is_winning_cell(row, col) {
                    style = style.add_modifier(Modifier::REVERSED | Modifier::BOLD);
                }
                Span::styled(format!("{:^width$}", symbol, width = width), style)
            })
            .collect();
        lines.push(Line::from(spans));
    }

    frame.render_widget(Paragraph::new(lines), board_area);

    BoardGeometry {
        origin_x: f32::from(board_area.x),
        origin_y: f32::from(board_area.y + 1),
        cell_width: f32::from(cell_width),
    }
}

fn render_message(frame: &mut Frame, view: &GameView<'_>, area: Rect) {
    let widget = match view.banner() {
        Some(banner) => {
            let color = match view.phase {
                Phase::Won(player) => player_color(player),
                _ => Color::Yellow,
            };
            Paragraph::new(banner).style(Style::default().fg(color).add_modifier(Modifier::BOLD))
        }
        None => Paragraph::new(view.message.unwrap_or("")).style(Style::default().fg(Color::Yellow)),
    };

    frame.render_widget(
        widget
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL)),
        area,
    );
}

fn render_controls(frame: &mut Frame, area: Rect) {
    let controls = Paragraph::new(
        "Click/Enter: Drop  |  \u{2190}/\u{2192}: Move  |  P: Pause  |  R: New game  |  Q: Quit",
    )
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title("Controls"));

    frame.render_widget(controls, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::game::GameSession;
    use ratatui::backend::TestBackend;
    use ratatui::buffer::Buffer;

    fn screen_text(buffer: &Buffer) -> String {
        let mut text = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                text.push_str(buffer[(x, y)].symbol());
            }
            text.push('\n');
        }
        text
    }

    fn renderer() -> TerminalRenderer<TestBackend> {
        TerminalRenderer::new(Terminal::new(TestBackend::new(40, 22)).unwrap(), 3)
    }

    #[test]
    fn test_geometry_centers_board() {
        let mut renderer = renderer();
        let mut session = GameSession::default();
        session.tick().unwrap();

        let geometry = renderer.draw(&GameView::new(&session, Some(0), None)).unwrap();

        // 38 inner columns, 24 used by the board
        assert_eq!(geometry.origin_x, 8.0);
        assert_eq!(geometry.cell_width, 3.0);
        assert_eq!(geometry.column_at(8.0 + 3.0 * 2.0 + 1.0), 2);
    }

    #[test]
    fn test_pieces_drawn_at_bottom() {
        let mut renderer = renderer();
        let mut session = GameSession::default();
        session.tick().unwrap();
        session.handle_input(0).unwrap();

        let geometry = renderer.draw(&GameView::new(&session, None, None)).unwrap();
        let buffer = renderer.terminal.backend().buffer();

        // Bottom row of the board, centre of the first cell
        let x = geometry.origin_x as u16 + 1;
        let y = geometry.origin_y as u16 + 7;
        assert_eq!(buffer[(x, y)].symbol(), "\u{25cf}");
        assert_eq!(buffer[(x, y - 1)].symbol(), ".");
    }

    #[test]
    fn test_status_and_banner() {
        let mut renderer = renderer();
        let mut session = GameSession::new(GameConfig {
            board_height: 4,
            board_width: 4,
            win_length: 2,
            diagonal_wins: false,
        })
        .unwrap();
        session.tick().unwrap();

        renderer.draw(&GameView::new(&session, None, Some("Column is full!"))).unwrap();
        let text = screen_text(renderer.terminal.backend().buffer());
        assert!(text.contains("Player A to move"));
        assert!(text.contains("Column is full!"));

        for col in [0, 1, 0] {
            session.handle_input(col).unwrap();
        }
        assert_eq!(session.phase(), Phase::Won(Player::A));

        renderer.draw(&GameView::new(&session, None, None)).unwrap();
        let text = screen_text(renderer.terminal.backend().buffer());
        assert!(text.contains("Player A wins!"));
    }

    #[test]
    fn test_winning_cells_highlighted() {
        let mut renderer = renderer();
        let mut session = GameSession::new(GameConfig {
            board_height: 4,
            board_width: 4,
            win_length: 2,
            diagonal_wins: false,
        })
        .unwrap();
        session.tick().unwrap();
        for col in [0, 1, 0] {
            session.handle_input(col).unwrap();
        }

        let geometry = renderer.draw(&GameView::new(&session, None, None)).unwrap();
        let buffer = renderer.terminal.backend().buffer();
        let pos = |row: u16, col: u16| {
            (
                geometry.origin_x as u16 + 3 * col + 1,
                geometry.origin_y as u16 + row,
            )
        };

        // A won with (2, 0) and (3, 0); B's piece at (3, 1) is not part of it
        assert!(buffer[pos(3, 0)].modifier.contains(Modifier::REVERSED));
        assert!(buffer[pos(2, 0)].modifier.contains(Modifier::REVERSED));
        assert!(!buffer[pos(3, 1)].modifier.contains(Modifier::REVERSED));
        assert_eq!(buffer[pos(3, 1)].symbol(), "\u{25cf}");
    }

    #[test]
    fn test_paused_header() {
        let mut renderer = renderer();
        let mut session = GameSession::default();
        session.tick().unwrap();
        session.toggle_pause();

        renderer.draw(&GameView::new(&session, Some(3), None)).unwrap();
        let text = screen_text(renderer.terminal.backend().buffer());
        assert!(text.contains("Paused (Player A to move)"));
    }
}
