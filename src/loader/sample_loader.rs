use std::path::{Path, PathBuf};
use std::thread::JoinHandle;

use crossbeam_channel::Receiver;

use crate::audio::{SampleBuffer, SampleLoadError};
use crate::shared::PadConfig;

/// Progress reports from the loader thread, one per pad and then `Finished`.
#[derive(Debug)]
pub enum LoadEvent {
    Loaded { slot: u8, key: char, buffer: SampleBuffer },
    Failed { slot: u8, key: char, error: SampleLoadError },
    Finished,
}

// relative sources live next to the kit manifest
pub fn resolve_source(kit_dir: &Path, source: &str) -> PathBuf {
    let path = Path::new(source);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        kit_dir.join(path)
    }
}

/// Decode every pad in order, one at a time. A pad that fails is logged and
/// skipped; the rest still load. `emit` returning false means nobody is
/// listening any more and the loop stops early.
pub fn load_pads(
    pads: &[PadConfig],
    kit_dir: &Path,
    target_rate: u32,
    mut emit: impl FnMut(LoadEvent) -> bool,
) {
    for (slot, pad) in pads.iter().enumerate() {
        let path = resolve_source(kit_dir, &pad.source);
        let event = match SampleBuffer::decode_file(&path, target_rate) {
            Ok(buffer) => {
                log::info!(
                    "loaded pad {} ({}) from {}: {} frames",
                    pad.trigger_key,
                    pad.id,
                    path.display(),
                    buffer.len()
                );
                LoadEvent::Loaded { slot: slot as u8, key: pad.trigger_key, buffer }
            }
            Err(error) => {
                log::error!("error decoding audio data for pad {} ({}): {error}", pad.id, path.display());
                LoadEvent::Failed { slot: slot as u8, key: pad.trigger_key, error }
            }
        };
        if !emit(event) {
            return;
        }
    }
    emit(LoadEvent::Finished);
}

/// Owns the background thread that fills the sound bank. Spawned once at
/// startup; the UI thread drains its events every tick.
pub struct SoundBankLoader {
    rx: Receiver<LoadEvent>,
    _handle: JoinHandle<()>,
}

impl SoundBankLoader {
    pub fn spawn(pads: Vec<PadConfig>, kit_dir: PathBuf, target_rate: u32) -> std::io::Result<Self> {
        let (tx, rx) = crossbeam_channel::unbounded();
        let handle = std::thread::Builder::new()
            .name("sound-bank-loader".into())
            .spawn(move || {
                load_pads(&pads, &kit_dir, target_rate, |event| tx.send(event).is_ok());
            })?;
        Ok(Self { rx, _handle: handle })
    }

    pub fn poll(&self) -> Vec<LoadEvent> {
        self.rx.try_iter().collect()
    }
}
