pub mod sample_loader;
pub mod sound_bank;

pub use sample_loader::{LoadEvent, SoundBankLoader};
pub use sound_bank::SoundBank;
