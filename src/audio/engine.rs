use crate::audio_api::AudioCommand;
use crate::shared::NUM_PADS;

use super::frame::StereoFrame;
use super::gain::GainStage;
use super::sample_buffer::SampleBuffer;
use super::voice::Voice;

pub const MAX_VOICES: usize = 32; // hard cap so we wont malloc in audio callback

pub struct Engine {
    bank: [Option<SampleBuffer>; NUM_PADS], // audio-thread copy of the sound bank
    voices: [Voice; MAX_VOICES],            // fixed pool of voices
    gain: GainStage,
    triggers: u64,
}

impl Engine {
    pub fn new(gain: GainStage) -> Self {
        Self {
            bank: std::array::from_fn(|_| None),
            voices: std::array::from_fn(|_| Voice::default()),
            gain,
            triggers: 0,
        }
    }

    pub fn handle_cmd(&mut self, cmd: AudioCommand) {
        match cmd {
            AudioCommand::RegisterSample { slot, buffer } => {
                if let Some(entry) = self.bank.get_mut(slot as usize) {
                    *entry = Some(buffer);
                }
            }
            AudioCommand::Trigger { slot } => self.trigger_voice(slot),
        }
    }

    fn trigger_voice(&mut self, slot: u8) {
        // nothing registered yet, nothing to play
        if !matches!(self.bank.get(slot as usize), Some(Some(_))) {
            return;
        }

        // free slot first, otherwise steal the oldest voice
        let idx = self
            .voices
            .iter()
            .position(|v| !v.active)
            .or_else(|| {
                self.voices
                    .iter()
                    .enumerate()
                    .min_by_key(|(_, v)| v.started_at)
                    .map(|(i, _)| i)
            })
            .unwrap_or(0);

        self.voices[idx].start(slot, self.triggers);
        self.triggers += 1;
    }

    // Fill `out` with the mix of every live voice, scaled by the gain stage as
    // it stands right now.
    pub fn render_block(&mut self, out: &mut [StereoFrame]) {
        out.fill(StereoFrame::zero());

        for v in self.voices.iter_mut().filter(|v| v.active) {
            match self.bank.get(v.slot as usize) {
                Some(Some(buffer)) => v.render_into(buffer, out),
                _ => v.active = false,
            }
        }

        let g = self.gain.get();
        for f in out.iter_mut() {
            f.scale(g);
        }
    }

    #[cfg(test)]
    pub fn active_voices(&self) -> usize {
        self.voices.iter().filter(|v| v.active).count()
    }
}
