//! CPAL output stream driving the render engine
//!
//! Builds one output stream whose callback IS the real-time render
//! context: it owns the [`RenderEngine`] exclusively, drains commands at
//! block start, and interleaves the rendered block into the device
//! buffer. Dropping the returned handle stops the stream, releasing the
//! render context and everything it owns (sample buffer and both queue
//! ends) with it.

use cpal::traits::{DeviceTrait, StreamTrait};
use cpal::{BufferSize as CpalBufferSize, SampleFormat, Stream, StreamConfig};

use crate::engine::{command_channel, event_channel, RenderEngine};
use crate::facade::EngineFacade;
use crate::types::Sample;

use super::config::{AudioConfig, BufferSize, DEFAULT_BUFFER_SIZE, MAX_BUFFER_SIZE};
use super::device::{find_device_by_id, get_default_device};
use super::error::{AudioError, AudioResult};

/// Handle to the active output stream
///
/// Keeps the stream (and the render context inside its callback) alive.
/// Drop this to stop audio.
pub struct AudioHandle {
    _stream: Stream,
    sample_rate: u32,
    buffer_size: u32,
}

impl AudioHandle {
    /// Sample rate of the output stream
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Negotiated block size in frames
    pub fn buffer_size(&self) -> u32 {
        self.buffer_size
    }

    /// Output latency in milliseconds (one block)
    pub fn latency_ms(&self) -> f32 {
        (self.buffer_size as f32 / self.sample_rate as f32) * 1000.0
    }
}

/// Result of starting the audio system
pub struct AudioSystemResult {
    /// Keeps the stream alive; drop to stop
    pub handle: AudioHandle,
    /// Control-side facade wired to the stream's render engine
    pub facade: EngineFacade,
    /// Sample rate of the output stream
    pub sample_rate: u32,
    /// Negotiated block size in frames
    pub buffer_size: u32,
}

/// Start the output stream and return its control facade
pub fn start_audio_system(config: &AudioConfig) -> AudioResult<AudioSystemResult> {
    let device = match &config.device {
        Some(id) => find_device_by_id(id)?,
        None => get_default_device()?,
    };
    let device_name = device.name().unwrap_or_else(|_| "Unknown".to_string());
    log::info!("Using audio device: {}", device_name);

    let (supported_config, buffer_size) = get_output_config(&device, config)?;
    let sample_rate = supported_config.sample_rate().0;

    let stream_config = StreamConfig {
        channels: supported_config.channels(),
        sample_rate: supported_config.sample_rate(),
        buffer_size: CpalBufferSize::Fixed(buffer_size),
    };

    log::info!(
        "Audio config: {} channels, {}Hz, {} frames (~{:.1}ms latency)",
        stream_config.channels,
        sample_rate,
        buffer_size,
        (buffer_size as f32 / sample_rate as f32) * 1000.0
    );

    // Control channel: facade keeps the sender and event receiver, the
    // render engine moves into the stream callback with the other halves
    let (command_tx, command_rx) = command_channel();
    let (event_tx, event_rx) = event_channel();
    let engine = RenderEngine::new(command_rx, event_tx);
    let facade = EngineFacade::new(command_tx, event_rx);

    let stream = build_output_stream(&device, &stream_config, engine)?;
    stream
        .play()
        .map_err(|e| AudioError::StreamPlayError(e.to_string()))?;

    log::info!("Audio stream started");

    Ok(AudioSystemResult {
        handle: AudioHandle {
            _stream: stream,
            sample_rate,
            buffer_size,
        },
        facade,
        sample_rate,
        buffer_size,
    })
}

/// Pick the best output configuration for a device
///
/// Prefers f32, stereo, and the requested sample rate; falls back to
/// whatever the device offers.
fn get_output_config(
    device: &cpal::Device,
    config: &AudioConfig,
) -> AudioResult<(cpal::SupportedStreamConfig, u32)> {
    let supported_configs: Vec<_> = device
        .supported_output_configs()
        .map_err(|e| AudioError::ConfigError(e.to_string()))?
        .collect();

    if supported_configs.is_empty() {
        return Err(AudioError::ConfigError(
            "No supported output configurations".to_string(),
        ));
    }

    let target_sample_rate = config.sample_rate.unwrap_or(44100);

    let best_config = supported_configs
        .iter()
        .filter(|c| c.sample_format() == SampleFormat::F32)
        .filter(|c| c.channels() >= 2)
        .find(|c| {
            target_sample_rate >= c.min_sample_rate().0
                && target_sample_rate <= c.max_sample_rate().0
        })
        .or_else(|| supported_configs.iter().find(|c| c.channels() >= 2))
        .or_else(|| supported_configs.first())
        .ok_or_else(|| {
            AudioError::ConfigError("No suitable output configuration found".to_string())
        })?;

    let sample_rate = if target_sample_rate >= best_config.min_sample_rate().0
        && target_sample_rate <= best_config.max_sample_rate().0
    {
        cpal::SampleRate(target_sample_rate)
    } else {
        let fallback = best_config.max_sample_rate();
        log::warn!(
            "Audio device doesn't support {}Hz, falling back to {}Hz",
            target_sample_rate,
            fallback.0
        );
        fallback
    };

    let stream_config = best_config.clone().with_sample_rate(sample_rate);

    let buffer_size = match config.buffer_size {
        BufferSize::Default => DEFAULT_BUFFER_SIZE,
        BufferSize::Fixed(frames) => frames.clamp(64, MAX_BUFFER_SIZE as u32),
        BufferSize::LowLatency => 256,
    };

    Ok((stream_config, buffer_size))
}

/// Build the output stream around a render engine
///
/// The engine and its planar scratch buffers move into the callback;
/// buffers are pre-allocated to [`MAX_BUFFER_SIZE`] so the callback never
/// allocates regardless of the block size the device settles on.
fn build_output_stream(
    device: &cpal::Device,
    config: &StreamConfig,
    mut engine: RenderEngine,
) -> AudioResult<Stream> {
    let channels = config.channels as usize;
    let render_channels = channels.min(2);
    let mut planar: Vec<Vec<Sample>> = vec![vec![0.0; MAX_BUFFER_SIZE]; render_channels];

    let stream = device
        .build_output_stream(
            config,
            move |data: &mut [f32], _info: &cpal::OutputCallbackInfo| {
                let n_frames = (data.len() / channels).min(MAX_BUFFER_SIZE);

                // Borrow the planar buffers as a stack-built slice set;
                // no allocation happens in this callback
                if render_channels == 2 {
                    let (left, right) = planar.split_at_mut(1);
                    engine.render(&mut [&mut left[0][..n_frames], &mut right[0][..n_frames]]);
                } else {
                    engine.render(&mut [&mut planar[0][..n_frames]]);
                }

                // Interleave the rendered block; channels beyond the
                // rendered pair stay silent
                for (i, frame) in data.chunks_mut(channels).enumerate() {
                    for (ch, out) in frame.iter_mut().enumerate() {
                        *out = if ch < render_channels && i < n_frames {
                            planar[ch][i]
                        } else {
                            0.0
                        };
                    }
                }
            },
            move |err| {
                log::error!("Audio stream error: {}", err);
            },
            None,
        )
        .map_err(|e| AudioError::StreamBuildError(e.to_string()))?;

    Ok(stream)
}
