use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use crate::shared::{GAIN_DEFAULT, GAIN_MAX, GAIN_MIN};

/// The single gain node every voice is summed through.
///
/// Stored as the bit pattern of an `f32` so the UI thread can write it and the
/// audio callback can read it without a lock. The engine reads it once per
/// block, which means a change is heard by voices that are already playing.
#[derive(Clone, Debug)]
pub struct GainStage {
    bits: Arc<AtomicU32>,
}

impl GainStage {
    pub fn new(initial: f32) -> Self {
        let stage = Self {
            bits: Arc::new(AtomicU32::new(GAIN_DEFAULT.to_bits())),
        };
        stage.set(initial);
        stage
    }

    /// `gain := clamp(value, 0, 2)`. Returns the value actually stored.
    /// NaN and infinities leave the current value alone.
    pub fn set(&self, value: f32) -> f32 {
        if !value.is_finite() {
            return self.get();
        }
        let g = value.clamp(GAIN_MIN, GAIN_MAX);
        self.bits.store(g.to_bits(), Ordering::Relaxed);
        g
    }

    pub fn get(&self) -> f32 {
        f32::from_bits(self.bits.load(Ordering::Relaxed))
    }
}

impl Default for GainStage {
    fn default() -> Self {
        Self::new(GAIN_DEFAULT)
    }
}
