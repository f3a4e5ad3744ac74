//! Common types for Platter
//!
//! The fundamental audio types shared by the render engine and the
//! control-side facade.

use crate::error::EngineError;

/// Audio sample type (32-bit float throughout)
pub type Sample = f32;

/// Reference platter speed in RPM
///
/// One full rotation at this speed takes 60/33.333 seconds. Scratch
/// gestures are calibrated against this physical speed regardless of the
/// track's current pitch/RPM setting.
pub const REFERENCE_RPM: f64 = 33.333;

/// Decoded audio for one loaded track
///
/// Planar per-channel storage plus the track's sample rate. All channels
/// have identical length. Immutable after construction: ownership moves to
/// the render context at load time and the data is never written again.
#[derive(Debug, Clone)]
pub struct SampleBuffer {
    channels: Vec<Vec<Sample>>,
    sample_rate: u32,
}

impl SampleBuffer {
    /// Create a buffer from planar channel data
    ///
    /// Validates the channel layout; a failed load leaves the engine
    /// untouched and may be retried with fresh data.
    pub fn new(channels: Vec<Vec<Sample>>, sample_rate: u32) -> Result<Self, EngineError> {
        if channels.is_empty() {
            return Err(EngineError::NoChannels);
        }
        if sample_rate == 0 {
            return Err(EngineError::InvalidSampleRate(sample_rate));
        }
        let expected = channels[0].len();
        for (channel, data) in channels.iter().enumerate() {
            if data.len() != expected {
                return Err(EngineError::ChannelLengthMismatch {
                    channel,
                    expected,
                    got: data.len(),
                });
            }
        }
        Ok(Self {
            channels,
            sample_rate,
        })
    }

    /// Number of channels
    #[inline]
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Length of every channel in samples
    #[inline]
    pub fn len(&self) -> usize {
        self.channels[0].len()
    }

    /// Check if the track holds no samples
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sample rate in Hz
    #[inline]
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Get one channel's samples
    #[inline]
    pub fn channel(&self, index: usize) -> &[Sample] {
        &self.channels[index]
    }

    /// Track duration in seconds
    pub fn duration_seconds(&self) -> f64 {
        self.len() as f64 / self.sample_rate as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_validation() {
        assert!(matches!(
            SampleBuffer::new(vec![], 44100),
            Err(EngineError::NoChannels)
        ));
        assert!(matches!(
            SampleBuffer::new(vec![vec![0.0; 10], vec![0.0; 9]], 44100),
            Err(EngineError::ChannelLengthMismatch {
                channel: 1,
                expected: 10,
                got: 9
            })
        ));
        assert!(matches!(
            SampleBuffer::new(vec![vec![0.0; 10]], 0),
            Err(EngineError::InvalidSampleRate(0))
        ));
    }

    #[test]
    fn test_buffer_accessors() {
        let buffer = SampleBuffer::new(vec![vec![0.5; 441], vec![0.25; 441]], 44100).unwrap();
        assert_eq!(buffer.channel_count(), 2);
        assert_eq!(buffer.len(), 441);
        assert_eq!(buffer.sample_rate(), 44100);
        assert_eq!(buffer.channel(1)[0], 0.25);
        assert!((buffer.duration_seconds() - 0.01).abs() < 1e-9);
    }

    #[test]
    fn test_empty_track_is_valid() {
        // Zero-length tracks are a legal layout, just silent
        let buffer = SampleBuffer::new(vec![vec![]], 48000).unwrap();
        assert!(buffer.is_empty());
    }
}
