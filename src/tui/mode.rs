use ratatui::layout::{Position, Rect};

// state local to the tui: where things were drawn last frame, so a mouse
// click can be turned back into "which pad" or "how much gain"
#[derive(Clone, Debug, Default)]
pub struct TuiState {
    pub pad_cells: Vec<(Rect, char)>, // each cell carries its pad's trigger key
    pub gain_track: Option<Rect>,     // inside of the gain gauge
}

impl TuiState {
    pub fn pad_at(&self, column: u16, row: u16) -> Option<char> {
        let pos = Position::new(column, row);
        self.pad_cells
            .iter()
            .find(|(rect, _)| rect.contains(pos))
            .map(|(_, key)| *key)
    }

    // 0.0 at the left edge of the track, 1.0 at the right
    pub fn gain_ratio_at(&self, column: u16, row: u16) -> Option<f32> {
        let track = self.gain_track?;
        if !track.contains(Position::new(column, row)) {
            return None;
        }
        let span = track.width.saturating_sub(1).max(1) as f32;
        Some((column - track.x) as f32 / span)
    }
}
