use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use symphonia::core::{
    audio::SampleBuffer as SymphoniaSampleBuffer, codecs::DecoderOptions,
    errors::Error as SymphoniaError, formats::FormatOptions, io::MediaSourceStream,
    meta::MetadataOptions, probe::Hint,
};
use symphonia::default::{get_codecs, get_probe};

use super::errors::SampleLoadError;
use super::frame::StereoFrame;

/// A fully decoded clip, stereo, at the output rate. Cloning only bumps a
/// refcount, so the same data can sit in the sound bank and on the audio thread.
#[derive(Clone, Debug)]
pub struct SampleBuffer {
    pub data: Arc<[StereoFrame]>,
}

impl SampleBuffer {
    pub fn from_frames(frames: Vec<StereoFrame>) -> Self {
        Self { data: Arc::from(frames.into_boxed_slice()) }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    // Decode any format symphonia knows about (mp3, wav, flac, ogg...) into stereo
    // frames at `target_rate`.
    pub fn decode_file(path: &Path, target_rate: u32) -> Result<Self, SampleLoadError> {
        let file = File::open(path)?;
        let mss = MediaSourceStream::new(Box::new(file), Default::default());

        let mut hint = Hint::new();
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            hint.with_extension(ext);
        }

        let probed = get_probe().format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )?;
        let mut format = probed.format;

        let track = format
            .default_track()
            .ok_or(SampleLoadError::NoDefaultTrack)?;
        let track_id = track.id;
        let codec_params = track.codec_params.clone();

        let mut decoder = get_codecs().make(&codec_params, &DecoderOptions::default())?;

        let mut file_rate = codec_params.sample_rate;
        let mut file_channels = codec_params.channels.map(|c| c.count());
        let mut interleaved: Vec<f32> = Vec::new();
        loop {
            let packet = match format.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(err))
                    if err.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    break;
                }
                Err(SymphoniaError::ResetRequired) => break,
                Err(err) => return Err(err.into()),
            };
            if packet.track_id() != track_id {
                continue;
            }

            let audio_buf = match decoder.decode(&packet) {
                Ok(buf) => buf,
                Err(SymphoniaError::DecodeError(msg)) => {
                    // one bad frame in an mp3 shouldn't lose the whole clip
                    log::warn!("skipping undecodable packet in {}: {msg}", path.display());
                    continue;
                }
                Err(err) => return Err(err.into()),
            };
            let spec = *audio_buf.spec();
            if file_rate.is_none() {
                file_rate = Some(spec.rate);
            }
            if file_channels.is_none() {
                file_channels = Some(spec.channels.count());
            }

            let mut sample_buf = SymphoniaSampleBuffer::<f32>::new(audio_buf.capacity() as u64, spec);
            sample_buf.copy_interleaved_ref(audio_buf);
            interleaved.extend_from_slice(sample_buf.samples());
        }

        let file_rate = file_rate.ok_or(SampleLoadError::MissingSampleRate)?;
        let frames = to_stereo(&interleaved, file_channels.unwrap_or(0))?;
        if frames.is_empty() {
            return Err(SampleLoadError::Empty);
        }

        Ok(Self::from_frames(resample_linear(&frames, file_rate, target_rate)))
    }
}

// mono is duplicated, anything wider than stereo keeps its front pair
fn to_stereo(samples: &[f32], channels: usize) -> Result<Vec<StereoFrame>, SampleLoadError> {
    match channels {
        0 => Err(SampleLoadError::UnsupportedChannels(0)),
        1 => Ok(samples.iter().map(|&x| StereoFrame::mono(x)).collect()),
        n => Ok(samples
            .chunks_exact(n)
            .map(|c| StereoFrame { left: c[0], right: c[1] })
            .collect()),
    }
}

fn resample_linear(frames: &[StereoFrame], source_rate: u32, target_rate: u32) -> Vec<StereoFrame> {
    // plain linear interpolation, plenty for one-shot drum hits
    if source_rate == target_rate || source_rate == 0 {
        return frames.to_vec();
    }
    let Some(&last) = frames.last() else {
        return Vec::new();
    };
    let step = source_rate as f64 / target_rate as f64; // source frames per output frame
    let out_len = (frames.len() as f64 / step).ceil() as usize;

    (0..out_len)
        .map(|i| {
            let pos = i as f64 * step; // ex. 3.7 -> between frame 3 and 4, 70% of the way
            let idx = pos as usize;
            match (frames.get(idx), frames.get(idx + 1)) {
                (Some(&a), Some(&b)) => a.lerp(b, pos.fract() as f32),
                _ => last, // past the final pair, hold the tail
            }
        })
        .collect()
}
