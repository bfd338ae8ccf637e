use anyhow::Context;
use crossbeam_channel::{Receiver, Sender};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

use crate::audio_api::AudioCommand;

mod engine;
mod errors;
mod frame;
mod gain;
mod sample_buffer;
mod voice;

pub use errors::SampleLoadError;
pub use frame::StereoFrame;
pub use gain::GainStage;
pub use sample_buffer::SampleBuffer;

use engine::Engine;

pub struct AudioHandle {
    tx: Sender<AudioCommand>,
    sample_rate: u32,
    _output_stream: cpal::Stream,
}

impl AudioHandle {
    pub fn send(&self, cmd: AudioCommand) {
        if self.tx.try_send(cmd).is_err() {
            log::warn!("audio command queue full, dropping command");
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

pub fn start_audio(gain: GainStage) -> anyhow::Result<AudioHandle> {
    let (tx, rx) = crossbeam_channel::bounded::<AudioCommand>(1024);

    let host = cpal::default_host();
    let device = host.default_output_device().context("no default output device")?;
    let config = device.default_output_config().context("no default output config")?;

    let sample_rate = config.sample_rate();
    let channels = config.channels() as usize;

    log::info!("starting audio output ({} ch @ {} Hz)", channels, sample_rate);

    match config.sample_format() {
        cpal::SampleFormat::F32 => {
            let output_stream =
                build_output_stream_f32(&device, &config.into(), rx, gain, channels)?;
            output_stream.play().context("failed to play output stream")?;

            Ok(AudioHandle {
                tx,
                sample_rate,
                _output_stream: output_stream,
            })
        }
        other => anyhow::bail!("unsupported sample format {other:?} (only f32 supported)"),
    }
}

fn build_output_stream_f32(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    rx: Receiver<AudioCommand>,
    gain: GainStage,
    channels: usize,
) -> anyhow::Result<cpal::Stream> {
    let mut engine = Engine::new(gain);
    let mut scratch: Vec<StereoFrame> = vec![StereoFrame::zero(); 4096];

    let err_fn = |err| log::error!("audio output stream error: {err}");

    let stream = device.build_output_stream(
        config,
        move |data: &mut [f32], _info| {
            while let Ok(cmd) = rx.try_recv() {
                engine.handle_cmd(cmd);
            }

            let n_frames = data.len() / channels.max(1);
            if scratch.len() < n_frames {
                // only happens if the host hands us a bigger block than ever before
                scratch.resize(n_frames, StereoFrame::zero());
            }
            let block = &mut scratch[..n_frames];
            engine.render_block(block);
            write_interleaved(block, data, channels);
        },
        err_fn,
        None,
    )?;

    Ok(stream)
}

// Spread stereo frames over however many channels the device has.
fn write_interleaved(frames: &[StereoFrame], data: &mut [f32], channels: usize) {
    match channels {
        0 => {}
        1 => {
            for (out, f) in data.iter_mut().zip(frames) {
                *out = (f.left + f.right) * 0.5;
            }
        }
        n => {
            for (chunk, f) in data.chunks_exact_mut(n).zip(frames) {
                chunk[0] = f.left;
                chunk[1] = f.right;
                for extra in &mut chunk[2..] {
                    *extra = 0.0;
                }
            }
        }
    }
}
