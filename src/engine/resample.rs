//! Variable-rate block rendering
//!
//! Pure functions mapping a start position and a per-block rate onto an
//! output block via two-tap linear interpolation. Deliberately cheap: it
//! trades high-frequency aliasing for guaranteed real-time feasibility.

use crate::types::{Sample, SampleBuffer};

/// Read one sample at a fractional position with linear interpolation
///
/// Both taps must be in range; anything touching `< 0` or `>= len` is
/// silence. The range check runs on the `f64` before any integer cast,
/// so positions beyond integer range (or NaN) cannot overflow the index
/// arithmetic; they are silence like any other out-of-range read.
#[inline]
pub fn read_interpolated(channel: &[Sample], position: f64) -> Sample {
    if channel.len() < 2 {
        return 0.0;
    }
    let max = (channel.len() - 1) as f64;
    if !(position >= 0.0 && position < max) {
        return 0.0;
    }
    let lo = position.floor();
    let index = lo as usize;
    let frac = (position - lo) as Sample;
    let a = channel[index];
    let b = channel[index + 1];
    a + (b - a) * frac
}

/// Render one block at constant rate into planar output channels
///
/// For output sample `i`, the read position is `start + i * rate`. Fills
/// `min(buffer channels, output channels)`; surplus output channels are
/// left untouched.
pub fn render_block(buffer: &SampleBuffer, start: f64, rate: f64, output: &mut [&mut [Sample]]) {
    let channels = buffer.channel_count().min(output.len());
    for ch in 0..channels {
        let source = buffer.channel(ch);
        for (i, out) in output[ch].iter_mut().enumerate() {
            *out = read_interpolated(source, start + i as f64 * rate);
        }
    }
}
