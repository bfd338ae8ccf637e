pub use crate::audio::SampleBuffer;

#[derive(Clone, Debug)]
pub enum AudioCommand {
    // The engine can't decode files (it would stall the audio thread), so the
    // loader decodes first and the buffer gets registered under its pad slot.
    RegisterSample { slot: u8, buffer: SampleBuffer },

    // Start a fresh one-shot voice for a registered slot.
    Trigger { slot: u8 },
}
