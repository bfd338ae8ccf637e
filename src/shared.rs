// The input plan:
//
// Pads (the 9 grid buttons, default kit):
//   q w e         //  KeyDown(81) KeyDown(87) KeyDown(69)
//   a s d         //  KeyDown(65) KeyDown(83) KeyDown(68)
//   z x c         //  KeyDown(90) KeyDown(88) KeyDown(67)
//
//   Any letter or digit goes out as KeyDown(<upper-case ascii code>), the middle
//   layer decides whether a pad answers to it. Clicking a pad cell sends
//   PadClick(<trigger key>) instead, resolved from the cell that was hit.
//
// Gain slider:
//   - / =         //  NudgeGain(-0.01 / 0.01)
//   [ / ]         //  NudgeGain(-0.10 / 0.10)
//   Backspace     //  ResetGain
//   click/drag    //  SetGain(proportional to the column hit)
//
// Quit:
//   Esc           //  Quit
//
// Rendering works the same way as before: the middle layer owns all the state,
// each frame the TUI asks it for a DisplayState and draws that. The two values the
// user actually cares about (gain, last played) come through a UiState
// subscription so the view never reaches into the dispatcher for them.

use serde::{Deserialize, Serialize};

pub const NUM_PADS: usize = 9;
pub const GRID_COLS: usize = 3;

pub const GAIN_MIN: f32 = 0.0;
pub const GAIN_MAX: f32 = 2.0;
pub const GAIN_STEP: f32 = 0.01;
pub const GAIN_DEFAULT: f32 = 1.0;

// how long a pad stays lit after it fires
pub const FLASH_SECS: f64 = 0.15;

/// One pad of the kit. The whole set is fixed once the kit is loaded.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PadConfig {
    pub trigger_key: char,
    pub id: String,
    pub source: String, // relative to the kit dir, or absolute
}

impl PadConfig {
    pub fn new(trigger_key: char, id: &str, source: &str) -> Self {
        Self {
            trigger_key,
            id: id.to_string(),
            source: source.to_string(),
        }
    }

    // same numbering a browser keydown uses: upper-case ascii
    pub fn key_code(&self) -> u32 {
        key_code_for(self.trigger_key)
    }

    pub fn matches_key(&self, key: char) -> bool {
        self.trigger_key.eq_ignore_ascii_case(&key)
    }
}

pub fn key_code_for(c: char) -> u32 {
    c.to_ascii_uppercase() as u32
}

// the classic heater kit, grid order
pub fn default_pads() -> Vec<PadConfig> {
    vec![
        PadConfig::new('q', "heater-1", "heater-1.mp3"),
        PadConfig::new('w', "heater-2", "heater-2.mp3"),
        PadConfig::new('e', "heater-3", "heater-3.mp3"),
        PadConfig::new('a', "heater-4", "heater-4.mp3"),
        PadConfig::new('s', "clap", "clap.mp3"),
        PadConfig::new('d', "open-hh", "open-hh.mp3"),
        PadConfig::new('z', "kick-n-hat", "kick-n-hat.mp3"),
        PadConfig::new('x', "kick", "kick.mp3"),
        PadConfig::new('c', "closed-hh", "closed-hh.mp3"),
    ]
}

#[derive(Clone, Debug, PartialEq)]
pub enum InputEvent {
    KeyDown(u32),       // keyboard, ascii key code
    PadClick(char),     // pointer on a pad cell, carries the cell's trigger key
    SetGain(f32),       // pointer on the slider
    NudgeGain(f32),     // slider keys
    ResetGain,
    Quit,
}

/// The observable application state. Published to subscribers on every change.
#[derive(Clone, Debug, PartialEq)]
pub struct UiState {
    pub gain: f32,
    pub last_played_id: String,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            gain: GAIN_DEFAULT,
            last_played_id: String::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PadView {
    pub trigger_key: char,
    pub id: String,
    pub led: LedState,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DisplayState {
    pub pads: Vec<PadView>, // grid order, row major
    pub loading: bool,      // loader still has pads in flight
    pub loaded: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LedState {
    Unloaded, // buffer not decoded yet
    Failed,   // decode failed, stays silent until restart
    Ready,
    Lit,      // fired in the last FLASH_SECS
}
