use super::frame::StereoFrame;
use super::sample_buffer::SampleBuffer;

/// One playback of one pad: starts at frame 0, plays the buffer through once,
/// then goes inactive so the engine can reuse the slot.
#[derive(Clone, Debug, Default)]
pub struct Voice {
    pub slot: u8,
    pub pos: usize,
    pub active: bool,
    pub started_at: u64, // engine trigger count at start, used to find the oldest voice
}

impl Voice {
    pub fn start(&mut self, slot: u8, started_at: u64) {
        self.slot = slot;
        self.pos = 0;
        self.active = true;
        self.started_at = started_at;
    }

    // Mix this voice into `out`. Additive, so overlapping hits stack up; gain is
    // applied later to the whole mix.
    pub fn render_into(&mut self, buffer: &SampleBuffer, out: &mut [StereoFrame]) {
        if !self.active {
            return;
        }
        // the slot can be re-registered under us with a shorter buffer
        let Some(rest) = buffer.data.get(self.pos..) else {
            self.active = false;
            return;
        };
        let n = rest.len().min(out.len());

        for (frame, sample) in out.iter_mut().zip(&rest[..n]) {
            frame.left += sample.left;
            frame.right += sample.right;
        }
        self.pos += n;

        if self.pos >= buffer.data.len() {
            self.active = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(n: usize) -> SampleBuffer {
        SampleBuffer::from_frames((0..n).map(|i| StereoFrame::mono(i as f32)).collect())
    }

    #[test]
    fn plays_once_and_stops() {
        let buf = ramp(5);
        let mut v = Voice::default();
        v.start(0, 0);

        let mut out = [StereoFrame::zero(); 3];
        v.render_into(&buf, &mut out);
        assert_eq!(out[2].left, 2.0);
        assert!(v.active);

        let mut out = [StereoFrame::zero(); 3];
        v.render_into(&buf, &mut out);
        assert_eq!(out[0].left, 3.0);
        assert_eq!(out[1].left, 4.0);
        assert_eq!(out[2].left, 0.0); // ran off the end, silence after
        assert!(!v.active);
    }

    #[test]
    fn mixes_on_top_of_existing_output() {
        let buf = ramp(2);
        let mut v = Voice::default();
        v.start(0, 0);
        let mut out = [StereoFrame::mono(1.0); 2];
        v.render_into(&buf, &mut out);
        assert_eq!(out[1].right, 2.0);
    }

    #[test]
    fn position_past_the_end_stops_quietly() {
        let mut v = Voice::default();
        v.start(0, 0);
        let mut out = [StereoFrame::zero(); 4];
        v.render_into(&ramp(10), &mut out);
        assert_eq!(v.pos, 4);

        // buffer swapped for one shorter than where we are
        let mut out = [StereoFrame::zero(); 4];
        v.render_into(&ramp(2), &mut out);
        assert!(!v.active);
        assert!(out.iter().all(|f| *f == StereoFrame::zero()));
    }

    #[test]
    fn inactive_voice_is_silent() {
        let buf = ramp(4);
        let mut v = Voice::default();
        let mut out = [StereoFrame::zero(); 4];
        v.render_into(&buf, &mut out);
        assert!(out.iter().all(|f| *f == StereoFrame::zero()));
    }
}
