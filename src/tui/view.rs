use crate::shared::{DisplayState, GAIN_MAX, UiState};
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Gauge, Paragraph};
use ratatui::Frame;

use super::grid::draw_pad_grid;
use super::mode::TuiState;

pub fn render(frame: &mut Frame, area: Rect, state: &DisplayState, ui: &UiState, ts: &mut TuiState) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // title
            Constraint::Min(9),    // pad grid
            Constraint::Length(3), // gain + display
            Constraint::Length(1), // help / status
        ])
        .split(area);

    draw_title(frame, sections[0]);
    ts.pad_cells = draw_pad_grid(frame, sections[1], &state.pads);
    ts.gain_track = Some(draw_controls(frame, sections[2], ui));
    draw_status(frame, sections[3], state);
}

fn draw_title(frame: &mut Frame, area: Rect) {
    let title = Paragraph::new(Line::from(Span::styled(
        "drum machine",
        Style::default().add_modifier(Modifier::BOLD),
    )))
    .alignment(Alignment::Center);
    frame.render_widget(title, area);
}

// returns the gauge's inner track so the mouse can hit it
fn draw_controls(frame: &mut Frame, area: Rect, ui: &UiState) -> Rect {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    let gain_block = Block::bordered().title(" gain ");
    let track = gain_block.inner(cols[0]);
    let gauge = Gauge::default()
        .block(gain_block)
        .gauge_style(Style::default().fg(Color::Cyan).bg(Color::Black))
        .ratio(gain_ratio(ui.gain))
        .label(format!("{:.2}", ui.gain));
    frame.render_widget(gauge, cols[0]);

    let display = Paragraph::new(ui.last_played_id.as_str())
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::LightMagenta).add_modifier(Modifier::BOLD))
        .block(Block::bordered().title(" last played "));
    frame.render_widget(display, cols[1]);

    track
}

fn draw_status(frame: &mut Frame, area: Rect, state: &DisplayState) {
    let progress = if state.loading {
        format!("loading {}/{}", state.loaded, state.pads.len())
    } else {
        format!("{}/{} pads ready", state.loaded, state.pads.len())
    };
    let help = "keys/click: play  -/=: gain  [/]: gain x10  bksp: reset  esc: quit";
    let line = Line::from(vec![
        Span::styled(progress, Style::default().fg(Color::Yellow)),
        Span::raw("  "),
        Span::styled(help, Style::default().fg(Color::DarkGray)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

// Gauge panics outside 0..=1
fn gain_ratio(gain: f32) -> f64 {
    (gain / GAIN_MAX).clamp(0.0, 1.0) as f64
}
