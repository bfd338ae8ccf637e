use crate::shared::{GRID_COLS, LedState, PadView};
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Paragraph};
use ratatui::Frame;

// Draws the pads row by row and returns where each one landed, tagged with its
// trigger key, so clicks can find their way back.
pub fn draw_pad_grid(frame: &mut Frame, area: Rect, pads: &[PadView]) -> Vec<(Rect, char)> {
    let cells = grid_cells(area, pads.len());

    for (pad, cell) in pads.iter().zip(&cells) {
        let style = match pad.led {
            LedState::Lit => Style::default().fg(Color::LightMagenta).bg(Color::Magenta),
            LedState::Ready => Style::default().fg(Color::White),
            LedState::Unloaded => Style::default().fg(Color::DarkGray),
            LedState::Failed => Style::default().fg(Color::Red),
        };
        let lines = vec![
            Line::styled(
                pad.trigger_key.to_ascii_uppercase().to_string(),
                style.add_modifier(Modifier::BOLD),
            ),
            Line::styled(pad.id.clone(), style),
        ];
        let block = Block::bordered().border_style(style).style(style);
        let body = Paragraph::new(lines).alignment(Alignment::Center).block(block);
        frame.render_widget(body, *cell);
    }

    pads.iter().map(|p| p.trigger_key).zip(cells).map(|(k, r)| (r, k)).collect()
}

// Even split into GRID_COLS columns and however many rows the pads need.
pub fn grid_cells(area: Rect, count: usize) -> Vec<Rect> {
    let rows = count.div_ceil(GRID_COLS).max(1);
    let rows_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Ratio(1, rows as u32); rows])
        .split(area);

    let mut cells = Vec::with_capacity(count);
    for row_area in rows_layout.iter() {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![Constraint::Ratio(1, GRID_COLS as u32); GRID_COLS])
            .split(*row_area);
        cells.extend(cols.iter().copied());
    }
    cells.truncate(count);
    cells
}
