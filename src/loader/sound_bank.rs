use std::collections::HashMap;

use crate::audio::SampleBuffer;

/// Decoded buffers by trigger key. Filled in one pad at a time as the loader
/// finishes; entries are never removed. Keys are stored lower-case.
#[derive(Clone, Debug, Default)]
pub struct SoundBank {
    buffers: HashMap<char, SampleBuffer>,
}

impl SoundBank {
    pub fn new() -> Self {
        Self::default()
    }

    // a second insert for the same key replaces the first
    pub fn insert(&mut self, key: char, buffer: SampleBuffer) {
        self.buffers.insert(key.to_ascii_lowercase(), buffer);
    }

    pub fn get(&self, key: char) -> Option<&SampleBuffer> {
        self.buffers.get(&key.to_ascii_lowercase())
    }

    pub fn is_ready(&self, key: char) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }

    #[cfg(test)]
    pub fn keys(&self) -> impl Iterator<Item = char> + '_ {
        self.buffers.keys().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::StereoFrame;

    fn buf(n: usize) -> SampleBuffer {
        SampleBuffer::from_frames(vec![StereoFrame::zero(); n])
    }

    #[test]
    fn reinsert_overwrites_instead_of_duplicating() {
        let mut bank = SoundBank::new();
        bank.insert('q', buf(4));
        bank.insert('q', buf(8));
        assert_eq!(bank.len(), 1);
        assert_eq!(bank.get('q').map(|b| b.len()), Some(8));
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let mut bank = SoundBank::new();
        bank.insert('X', buf(1));
        assert!(bank.is_ready('x'));
        assert!(bank.is_ready('X'));
        assert!(!bank.is_ready('c'));
    }
}
