// The middle layer: everything between "a key went down" and "the audio thread
// plays something". Owns the kit, the sound bank and the observable UiState; the
// TUI only ever sees DisplayState snapshots and UiState notifications.

use crossbeam_channel::{Receiver, Sender};

use crate::audio::GainStage;
use crate::audio_api::AudioCommand;
use crate::config::KitConfig;
use crate::loader::{LoadEvent, SoundBank};
use crate::shared::{
    DisplayState, FLASH_SECS, GAIN_DEFAULT, GAIN_STEP, InputEvent, LedState, PadConfig, PadView,
    UiState,
};

pub struct Middle {
    pads: Vec<PadConfig>,
    bank: SoundBank,
    gain: GainStage,
    ui: UiState,
    subscribers: Vec<Sender<UiState>>,
    flash: Vec<f64>, // seconds left on each pad's light
    failed: Vec<bool>,
    loading: bool,
}

impl Middle {
    pub fn new(kit: &KitConfig, gain: GainStage) -> Self {
        let g = gain.set(kit.gain);
        Self {
            pads: kit.pads.clone(),
            bank: SoundBank::new(),
            gain,
            ui: UiState { gain: g, last_played_id: String::new() },
            subscribers: Vec::new(),
            flash: vec![0.0; kit.pads.len()],
            failed: vec![false; kit.pads.len()],
            loading: true,
        }
    }

    pub fn pads(&self) -> &[PadConfig] {
        &self.pads
    }

    pub fn sound_bank(&self) -> &SoundBank {
        &self.bank
    }

    pub fn ui_state(&self) -> &UiState {
        &self.ui
    }

    /// Get told about every UiState change. The current state is sent right away
    /// so a new subscriber doesn't start blank.
    pub fn subscribe(&mut self) -> Receiver<UiState> {
        let (tx, rx) = crossbeam_channel::unbounded();
        let _ = tx.send(self.ui.clone());
        self.subscribers.push(tx);
        rx
    }

    fn publish(&mut self) {
        let state = self.ui.clone();
        self.subscribers.retain(|tx| tx.send(state.clone()).is_ok());
    }

    pub fn handle_input(&mut self, event: InputEvent) -> Vec<AudioCommand> {
        match event {
            InputEvent::KeyDown(code) => self.trigger_key_code(code).into_iter().collect(),
            InputEvent::PadClick(key) => self.trigger_pad(key).into_iter().collect(),
            InputEvent::SetGain(v) => {
                self.set_gain(v);
                vec![]
            }
            InputEvent::NudgeGain(delta) => {
                self.nudge_gain(delta);
                vec![]
            }
            InputEvent::ResetGain => {
                self.set_gain(GAIN_DEFAULT);
                vec![]
            }
            InputEvent::Quit => vec![], // main owns shutdown
        }
    }

    // keyboard path: match on key code
    pub fn trigger_key_code(&mut self, code: u32) -> Option<AudioCommand> {
        let slot = self
            .pads
            .iter()
            .position(|p| p.key_code() == code)?;
        self.fire(slot)
    }

    // pointer path: the clicked cell tells us its trigger key
    pub fn trigger_pad(&mut self, key: char) -> Option<AudioCommand> {
        let slot = self.pads.iter().position(|p| p.matches_key(key))?;
        self.fire(slot)
    }

    fn fire(&mut self, slot: usize) -> Option<AudioCommand> {
        let pad = &self.pads[slot];
        if !self.bank.is_ready(pad.trigger_key) {
            // not decoded yet (or never will be): dropped, not queued
            log::debug!("pad {} triggered before its sample was ready, ignoring", pad.id);
            return None;
        }

        self.ui.last_played_id = pad.id.clone();
        self.flash[slot] = FLASH_SECS;
        self.publish();
        Some(AudioCommand::Trigger { slot: slot as u8 })
    }

    /// `gain := clamp(value, 0, 2)`, straight onto the shared gain stage.
    pub fn set_gain(&mut self, value: f32) {
        let g = self.gain.set(value);
        if g != self.ui.gain {
            log::debug!("gain {} -> {}", self.ui.gain, g);
            self.ui.gain = g;
            self.publish();
        }
    }

    // slider movement, snapped to the slider's step
    pub fn nudge_gain(&mut self, delta: f32) {
        let target = ((self.ui.gain + delta) / GAIN_STEP).round() * GAIN_STEP;
        self.set_gain(target);
    }

    /// Apply a loader report. A decoded buffer goes into the bank and gets
    /// handed to the audio thread.
    pub fn on_load_event(&mut self, event: LoadEvent) -> Option<AudioCommand> {
        match event {
            LoadEvent::Loaded { slot, key, buffer } => {
                match self.pads.get(slot as usize) {
                    Some(pad) if pad.matches_key(key) => {}
                    _ => {
                        log::warn!("loader reported pad {key} in slot {slot}, which isn't in the kit");
                        return None;
                    }
                }
                self.bank.insert(key, buffer.clone());
                Some(AudioCommand::RegisterSample { slot, buffer })
            }
            LoadEvent::Failed { slot, key, error } => {
                // the loader already logged it at error level
                log::debug!("pad {key} will stay silent: {error}");
                if let Some(f) = self.failed.get_mut(slot as usize) {
                    *f = true;
                }
                None
            }
            LoadEvent::Finished => {
                self.loading = false;
                log::info!("sound bank ready: {}/{} pads", self.bank.len(), self.pads.len());
                None
            }
        }
    }

    pub fn tick(&mut self, elapsed: f64) {
        for f in self.flash.iter_mut() {
            *f = (*f - elapsed).max(0.0);
        }
    }

    pub fn display_state(&self) -> DisplayState {
        let pads = self
            .pads
            .iter()
            .zip(self.flash.iter().zip(&self.failed))
            .map(|(p, (&flash, &failed))| PadView {
                trigger_key: p.trigger_key,
                id: p.id.clone(),
                led: if failed {
                    LedState::Failed
                } else if !self.bank.is_ready(p.trigger_key) {
                    LedState::Unloaded
                } else if flash > 0.0 {
                    LedState::Lit
                } else {
                    LedState::Ready
                },
            })
            .collect();

        DisplayState {
            pads,
            loading: self.loading,
            loaded: self.bank.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{SampleBuffer, StereoFrame};

    fn buffer() -> SampleBuffer {
        SampleBuffer::from_frames(vec![StereoFrame::mono(0.1); 32])
    }

    fn middle() -> Middle {
        Middle::new(&KitConfig::default(), GainStage::default())
    }

    // everything decoded, the way it looks once the loader is done
    fn loaded_middle() -> Middle {
        let mut m = middle();
        let keys: Vec<char> = m.pads().iter().map(|p| p.trigger_key).collect();
        for (slot, key) in keys.into_iter().enumerate() {
            m.on_load_event(LoadEvent::Loaded { slot: slot as u8, key, buffer: buffer() });
        }
        m.on_load_event(LoadEvent::Finished);
        m
    }

    #[test]
    fn key_81_plays_heater_1() {
        let mut m = loaded_middle();
        let cmd = m.trigger_key_code(81);
        assert!(matches!(cmd, Some(AudioCommand::Trigger { slot: 0 })));
        assert_eq!(m.ui_state().last_played_id, "heater-1");
    }

    #[test]
    fn clicking_x_plays_kick() {
        let mut m = loaded_middle();
        let cmds = m.handle_input(InputEvent::PadClick('x'));
        assert!(matches!(cmds.as_slice(), [AudioCommand::Trigger { slot: 7 }]));
        assert_eq!(m.ui_state().last_played_id, "kick");
    }

    #[test]
    fn unmatched_key_changes_nothing() {
        let mut m = loaded_middle();
        let before = m.ui_state().clone();
        assert!(m.handle_input(InputEvent::KeyDown(80)).is_empty()); // 'P'
        assert!(m.handle_input(InputEvent::PadClick('p')).is_empty());
        assert_eq!(*m.ui_state(), before);
    }

    #[test]
    fn trigger_before_decode_is_dropped() {
        let mut m = middle();
        assert!(m.trigger_key_code(81).is_none());
        assert!(m.trigger_pad('q').is_none());
        assert_eq!(m.ui_state().last_played_id, "");

        // only the kick has arrived so far
        m.on_load_event(LoadEvent::Loaded { slot: 7, key: 'x', buffer: buffer() });
        assert!(m.trigger_key_code(88).is_some());
        assert!(m.trigger_key_code(81).is_none());
        assert_eq!(m.ui_state().last_played_id, "kick");
    }

    #[test]
    fn full_load_fills_one_entry_per_pad() {
        let m = loaded_middle();
        assert_eq!(m.sound_bank().len(), 9);
        for pad in m.pads() {
            assert!(m.sound_bank().is_ready(pad.trigger_key));
        }
        assert!(!m.display_state().loading);
    }

    #[test]
    fn loading_twice_matches_loading_once() {
        let once = loaded_middle();
        let mut twice = loaded_middle();
        let keys: Vec<char> = twice.pads().iter().map(|p| p.trigger_key).collect();
        for (slot, key) in keys.into_iter().enumerate() {
            twice.on_load_event(LoadEvent::Loaded { slot: slot as u8, key, buffer: buffer() });
        }

        assert_eq!(twice.sound_bank().len(), once.sound_bank().len());
        let mut a: Vec<char> = once.sound_bank().keys().collect();
        let mut b: Vec<char> = twice.sound_bank().keys().collect();
        a.sort();
        b.sort();
        assert_eq!(a, b);
        for key in a {
            let first = once.sound_bank().get(key).unwrap();
            let second = twice.sound_bank().get(key).unwrap();
            assert_eq!(first.len(), second.len());
            assert_eq!(first.data, second.data);
        }
        assert_eq!(twice.display_state(), once.display_state());
    }

    #[test]
    fn loaded_buffer_is_registered_with_the_engine() {
        let mut m = middle();
        let cmd = m.on_load_event(LoadEvent::Loaded { slot: 4, key: 's', buffer: buffer() });
        assert!(matches!(cmd, Some(AudioCommand::RegisterSample { slot: 4, .. })));
    }

    #[test]
    fn load_event_for_the_wrong_slot_is_ignored() {
        let mut m = middle();
        let cmd = m.on_load_event(LoadEvent::Loaded { slot: 0, key: 'x', buffer: buffer() });
        assert!(cmd.is_none());
        assert!(m.sound_bank().is_empty());
    }

    #[test]
    fn gain_is_clamped_and_reaches_the_stage() {
        let stage = GainStage::default();
        let mut m = Middle::new(&KitConfig::default(), stage.clone());
        m.set_gain(5.0);
        assert_eq!(stage.get(), 2.0);
        assert_eq!(m.ui_state().gain, 2.0);
        m.set_gain(-3.0);
        assert_eq!(stage.get(), 0.0);
    }

    #[test]
    fn nudges_snap_to_the_step() {
        let mut m = middle();
        m.handle_input(InputEvent::NudgeGain(0.013));
        assert!((m.ui_state().gain - 1.01).abs() < 1e-5);
        m.handle_input(InputEvent::NudgeGain(-0.1));
        assert!((m.ui_state().gain - 0.91).abs() < 1e-5);
        m.handle_input(InputEvent::ResetGain);
        assert_eq!(m.ui_state().gain, 1.0);
    }

    #[test]
    fn kit_gain_is_applied_at_startup() {
        let stage = GainStage::default();
        let kit = KitConfig { gain: 0.3, ..KitConfig::default() };
        let m = Middle::new(&kit, stage.clone());
        assert_eq!(stage.get(), 0.3);
        assert_eq!(m.ui_state().gain, 0.3);
    }

    #[test]
    fn subscribers_hear_about_changes() {
        let mut m = loaded_middle();
        let rx = m.subscribe();
        assert_eq!(rx.try_recv().unwrap(), UiState::default());

        m.trigger_key_code(67);
        m.set_gain(0.5);
        m.set_gain(0.5); // no change, no notification

        let updates: Vec<UiState> = rx.try_iter().collect();
        assert_eq!(updates.len(), 2);
        assert_eq!(updates[0].last_played_id, "closed-hh");
        assert_eq!(updates[1].gain, 0.5);
    }

    #[test]
    fn dropped_subscribers_are_forgotten() {
        let mut m = loaded_middle();
        drop(m.subscribe());
        m.trigger_key_code(81);
        assert!(m.subscribers.is_empty());
    }

    #[test]
    fn failed_pad_is_shown_and_stays_silent() {
        let mut m = middle();
        let error = crate::audio::SampleLoadError::Empty;
        assert!(m.on_load_event(LoadEvent::Failed { slot: 1, key: 'w', error }).is_none());
        assert_eq!(m.display_state().pads[1].led, LedState::Failed);
        assert!(m.trigger_key_code(87).is_none());
        assert_eq!(m.ui_state().last_played_id, "");
    }

    #[test]
    fn pads_light_up_and_fade() {
        let mut m = loaded_middle();
        m.trigger_key_code(83);
        assert_eq!(m.display_state().pads[4].led, LedState::Lit);
        m.tick(FLASH_SECS + 0.01);
        assert_eq!(m.display_state().pads[4].led, LedState::Ready);
        assert_eq!(middle().display_state().pads[4].led, LedState::Unloaded);
    }
}
