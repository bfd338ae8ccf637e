//! Kit manifest: `<kit_dir>/kit.json`.
//!
//! ```json
//! { "gain": 1.0,
//!   "pads": [ { "trigger_key": "q", "id": "heater-1", "source": "heater-1.mp3" }, ... ] }
//! ```
//!
//! No manifest means the built-in heater kit, with the mp3s expected next to
//! where the program was pointed.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::shared::{GAIN_DEFAULT, GAIN_MAX, GAIN_MIN, NUM_PADS, PadConfig, default_pads};

const KIT_FILE: &str = "kit.json";

#[derive(Debug, Error)]
pub enum KitError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("a kit needs exactly 9 pads, got {0}")]
    PadCount(usize),

    #[error("trigger key {0:?} must be an ascii letter or digit")]
    BadKey(char),

    #[error("trigger key {0:?} is used by more than one pad")]
    DuplicateKey(char),

    #[error("pad id {0:?} is used by more than one pad")]
    DuplicateId(String),

    #[error("pad {0} has an empty id or source")]
    EmptyField(usize),

    #[error("gain {0} is outside 0..=2")]
    GainOutOfRange(f32),

    #[error("kit directory {} does not exist", .0.display())]
    NoKitDir(PathBuf),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KitConfig {
    #[serde(default = "default_gain")]
    pub gain: f32,
    pub pads: Vec<PadConfig>,
}

fn default_gain() -> f32 {
    GAIN_DEFAULT
}

impl Default for KitConfig {
    fn default() -> Self {
        Self {
            gain: GAIN_DEFAULT,
            pads: default_pads(),
        }
    }
}

impl KitConfig {
    pub fn validate(&self) -> Result<(), KitError> {
        if self.pads.len() != NUM_PADS {
            return Err(KitError::PadCount(self.pads.len()));
        }
        if !(GAIN_MIN..=GAIN_MAX).contains(&self.gain) {
            return Err(KitError::GainOutOfRange(self.gain));
        }

        let mut keys = HashSet::new();
        let mut ids = HashSet::new();
        for (i, pad) in self.pads.iter().enumerate() {
            if !pad.trigger_key.is_ascii_alphanumeric() {
                return Err(KitError::BadKey(pad.trigger_key));
            }
            if !keys.insert(pad.trigger_key.to_ascii_lowercase()) {
                return Err(KitError::DuplicateKey(pad.trigger_key));
            }
            if pad.id.trim().is_empty() || pad.source.trim().is_empty() {
                return Err(KitError::EmptyField(i));
            }
            if !ids.insert(pad.id.as_str()) {
                return Err(KitError::DuplicateId(pad.id.clone()));
            }
        }
        Ok(())
    }
}

pub fn kit_file_path(kit_dir: &Path) -> PathBuf {
    kit_dir.join(KIT_FILE)
}

// Checked before anything touches the kit dir, so a typo'd path fails fast
// instead of growing a log dir and a kit of silent pads.
pub fn check_kit_dir(kit_dir: &Path) -> Result<(), KitError> {
    if kit_dir.is_dir() {
        Ok(())
    } else {
        Err(KitError::NoKitDir(kit_dir.to_path_buf()))
    }
}

/// Read and validate the kit manifest, falling back to the default kit when
/// there isn't one.
pub fn load_kit(kit_dir: &Path) -> Result<KitConfig, KitError> {
    let path = kit_file_path(kit_dir);
    let data = match std::fs::read_to_string(&path) {
        Ok(data) => data,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            log::info!("no {} in {}, using the default kit", KIT_FILE, kit_dir.display());
            return Ok(KitConfig::default());
        }
        Err(source) => return Err(KitError::Io { path, source }),
    };
    let kit: KitConfig =
        serde_json::from_str(&data).map_err(|source| KitError::Parse { path: path.clone(), source })?;
    kit.validate()?;
    log::info!("loaded kit from {}", path.display());
    Ok(kit)
}
