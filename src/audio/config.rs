//! Audio backend configuration
//!
//! Device selection and buffer settings for the output stream. Serde
//! derives let an embedding application persist these; the crate itself
//! keeps no state across sessions.

use serde::{Deserialize, Serialize};

/// Maximum block size to pre-allocate render buffers for (frames)
///
/// Covers common device configurations (64 through 4096); pre-allocating
/// to this size keeps the audio callback free of allocations.
pub const MAX_BUFFER_SIZE: usize = 8192;

/// Default block size when no preference is specified (frames)
///
/// 512 frames is a safe default that works on most systems.
pub const DEFAULT_BUFFER_SIZE: u32 = 512;

/// Preferred block size for the output stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BufferSize {
    /// Let the system choose
    #[default]
    Default,
    /// Request a specific size in frames (may be adjusted by the device)
    Fixed(u32),
    /// Small known-good block for responsive scratching (~256 frames)
    LowLatency,
}

impl BufferSize {
    /// Latency in milliseconds for a given sample rate, if determinate
    pub fn latency_ms(&self, sample_rate: u32) -> Option<f32> {
        let frames = match self {
            BufferSize::Default => return None,
            BufferSize::Fixed(frames) => *frames,
            BufferSize::LowLatency => 256,
        };
        Some((frames as f32 / sample_rate as f32) * 1000.0)
    }
}

/// Audio device identifier
///
/// Name plus optional host backend (ALSA, WASAPI, CoreAudio, ...), so
/// devices can be distinguished on systems with several backends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceId {
    /// Device name as reported by the system
    pub name: String,
    /// Audio host identifier; None uses the default host
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
}

impl DeviceId {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            host: None,
        }
    }

    pub fn with_host(name: &str, host: &str) -> Self {
        Self {
            name: name.to_string(),
            host: Some(host.to_string()),
        }
    }

    /// Display label that includes the host if known
    pub fn display_label(&self) -> String {
        match &self.host {
            Some(host) => format!("[{}] {}", host, self.name),
            None => self.name.clone(),
        }
    }
}

/// Configuration for the audio output stream
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Output device (None = system default)
    pub device: Option<DeviceId>,
    /// Preferred block size
    pub buffer_size: BufferSize,
    /// Preferred sample rate (None = device default)
    pub sample_rate: Option<u32>,
}

impl AudioConfig {
    /// Set the output device
    pub fn with_device(mut self, device: DeviceId) -> Self {
        self.device = Some(device);
        self
    }

    /// Request a fixed block size in frames
    pub fn with_buffer_frames(mut self, frames: u32) -> Self {
        self.buffer_size = BufferSize::Fixed(frames);
        self
    }

    /// Set the preferred sample rate
    pub fn with_sample_rate(mut self, rate: u32) -> Self {
        self.sample_rate = Some(rate);
        self
    }

    /// Prefer a small block for responsive scratching
    pub fn with_low_latency(mut self) -> Self {
        self.buffer_size = BufferSize::LowLatency;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_size_latency() {
        assert_eq!(BufferSize::Default.latency_ms(44100), None);
        let ms = BufferSize::Fixed(441).latency_ms(44100).unwrap();
        assert!((ms - 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_device_id_label() {
        assert_eq!(DeviceId::new("hw:0,0").display_label(), "hw:0,0");
        assert_eq!(
            DeviceId::with_host("hw:0,0", "ALSA").display_label(),
            "[ALSA] hw:0,0"
        );
    }
}
