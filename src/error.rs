//! Engine error types

use thiserror::Error;

/// Errors surfaced to the control context
///
/// Setup failures are recoverable: the engine stays Uninitialized and a
/// fresh load may be attempted. Nothing in the render path ever returns
/// one of these - per-block faults degrade to silence instead.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Track buffer has no channels
    #[error("sample buffer has no channels")]
    NoChannels,

    /// Channels of a track buffer differ in length
    #[error("channel {channel} has {got} samples, expected {expected}")]
    ChannelLengthMismatch {
        channel: usize,
        expected: usize,
        got: usize,
    },

    /// Sample rate must be nonzero
    #[error("invalid sample rate: {0} Hz")]
    InvalidSampleRate(u32),

    /// The control->render command queue is full
    #[error("command queue full, command dropped")]
    CommandQueueFull,
}
