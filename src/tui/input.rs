use std::time::Duration;
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind,
};
use crate::shared::{GAIN_MAX, GAIN_STEP, InputEvent, key_code_for};
use super::mode::TuiState;

const COARSE_STEP: f32 = 0.1;

// poll the terminal for input and turn it into semantic events for the middle
// layer. keys become key codes, clicks get resolved against last frame's layout
pub fn poll_input(timeout: Duration, ts: &TuiState) -> anyhow::Result<Vec<InputEvent>> {
    if !event::poll(timeout)? {
        return Ok(vec![]);
    }

    match event::read()? {
        Event::Key(key) => Ok(handle_key_event(key)),
        Event::Mouse(mouse) => Ok(handle_mouse(mouse, ts)),
        _ => Ok(vec![]),
    }
}

// a held key auto-repeats like a browser keydown: pads retrigger, gain keeps
// sliding. releases are dropped
fn handle_key_event(key: KeyEvent) -> Vec<InputEvent> {
    match key.kind {
        KeyEventKind::Press => handle_key(key.code),
        KeyEventKind::Repeat => match key.code {
            KeyCode::Esc | KeyCode::Backspace => vec![],
            code => handle_key(code),
        },
        _ => vec![],
    }
}

fn handle_key(code: KeyCode) -> Vec<InputEvent> {
    match code {
        KeyCode::Esc => vec![InputEvent::Quit],

        // gain slider
        KeyCode::Char('-') => vec![InputEvent::NudgeGain(-GAIN_STEP)],
        KeyCode::Char('=') | KeyCode::Char('+') => vec![InputEvent::NudgeGain(GAIN_STEP)],
        KeyCode::Char('[') => vec![InputEvent::NudgeGain(-COARSE_STEP)],
        KeyCode::Char(']') => vec![InputEvent::NudgeGain(COARSE_STEP)],
        KeyCode::Backspace => vec![InputEvent::ResetGain],

        // anything that could be a pad key; the middle decides if one answers
        KeyCode::Char(c) if c.is_ascii_alphanumeric() => vec![InputEvent::KeyDown(key_code_for(c))],

        _ => vec![],
    }
}

fn handle_mouse(mouse: MouseEvent, ts: &TuiState) -> Vec<InputEvent> {
    let (column, row) = (mouse.column, mouse.row);
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            if let Some(ratio) = ts.gain_ratio_at(column, row) {
                return vec![InputEvent::SetGain(ratio_to_gain(ratio))];
            }
            match ts.pad_at(column, row) {
                Some(key) => vec![InputEvent::PadClick(key)],
                None => vec![],
            }
        }
        // dragging along the slider keeps moving it, dragging over pads does nothing
        MouseEventKind::Drag(MouseButton::Left) => ts
            .gain_ratio_at(column, row)
            .map(|ratio| vec![InputEvent::SetGain(ratio_to_gain(ratio))])
            .unwrap_or_default(),
        _ => vec![],
    }
}

fn ratio_to_gain(ratio: f32) -> f32 {
    ((ratio * GAIN_MAX) / GAIN_STEP).round() * GAIN_STEP
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use ratatui::layout::Rect;

    fn click(kind: MouseEventKind, column: u16, row: u16) -> MouseEvent {
        MouseEvent { kind, column, row, modifiers: KeyModifiers::NONE }
    }

    fn layout() -> TuiState {
        TuiState {
            pad_cells: vec![(Rect::new(0, 0, 10, 4), 'q'), (Rect::new(10, 0, 10, 4), 'x')],
            gain_track: Some(Rect::new(0, 10, 201, 1)),
        }
    }

    #[test]
    fn letters_become_key_codes_either_case() {
        assert_eq!(handle_key(KeyCode::Char('q')), vec![InputEvent::KeyDown(81)]);
        assert_eq!(handle_key(KeyCode::Char('Q')), vec![InputEvent::KeyDown(81)]);
        assert_eq!(handle_key(KeyCode::Char('c')), vec![InputEvent::KeyDown(67)]);
    }

    #[test]
    fn held_pad_key_retriggers_and_release_is_ignored() {
        let held = KeyEvent::new_with_kind(KeyCode::Char('x'), KeyModifiers::NONE, KeyEventKind::Repeat);
        assert_eq!(handle_key_event(held), vec![InputEvent::KeyDown(88)]);

        let up = KeyEvent::new_with_kind(KeyCode::Char('x'), KeyModifiers::NONE, KeyEventKind::Release);
        assert!(handle_key_event(up).is_empty());

        let esc = KeyEvent::new_with_kind(KeyCode::Esc, KeyModifiers::NONE, KeyEventKind::Repeat);
        assert!(handle_key_event(esc).is_empty());
    }

    #[test]
    fn slider_and_quit_keys() {
        assert_eq!(handle_key(KeyCode::Esc), vec![InputEvent::Quit]);
        assert_eq!(handle_key(KeyCode::Char('=')), vec![InputEvent::NudgeGain(GAIN_STEP)]);
        assert_eq!(handle_key(KeyCode::Char('[')), vec![InputEvent::NudgeGain(-COARSE_STEP)]);
        assert_eq!(handle_key(KeyCode::Backspace), vec![InputEvent::ResetGain]);
        assert!(handle_key(KeyCode::Char('!')).is_empty());
        assert!(handle_key(KeyCode::Tab).is_empty());
    }

    #[test]
    fn clicking_a_pad_sends_its_key() {
        let ts = layout();
        let events = handle_mouse(click(MouseEventKind::Down(MouseButton::Left), 12, 1), &ts);
        assert_eq!(events, vec![InputEvent::PadClick('x')]);
        assert!(handle_mouse(click(MouseEventKind::Down(MouseButton::Right), 12, 1), &ts).is_empty());
        assert!(handle_mouse(click(MouseEventKind::Down(MouseButton::Left), 50, 5), &ts).is_empty());
    }

    #[test]
    fn clicking_the_slider_sets_gain() {
        let ts = layout();
        match handle_mouse(click(MouseEventKind::Down(MouseButton::Left), 100, 10), &ts).as_slice() {
            [InputEvent::SetGain(g)] => assert!((g - 1.0).abs() < 1e-5),
            other => panic!("unexpected {other:?}"),
        }
        match handle_mouse(click(MouseEventKind::Drag(MouseButton::Left), 200, 10), &ts).as_slice() {
            [InputEvent::SetGain(g)] => assert!((g - 2.0).abs() < 1e-5),
            other => panic!("unexpected {other:?}"),
        }
        assert!(handle_mouse(click(MouseEventKind::Drag(MouseButton::Left), 2, 2), &ts).is_empty());
    }
}
