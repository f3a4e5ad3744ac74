//! Scratch gesture tracking
//!
//! Converts a stream of absolute platter angles (radians, `[-pi, pi]`)
//! into a target playhead position. Angle deltas are unwrapped along the
//! shortest path so a 359-degree -> 1-degree hop registers as a 2-degree
//! move, not a near-full rotation.
//!
//! Rotation maps to tape time against the physical reference platter
//! speed ([`REFERENCE_RPM`]), independent of the track's current
//! pitch/RPM setting: one full turn always covers 60/33.333 seconds of
//! tape, which is what makes scratching feel like touching vinyl.

use std::f64::consts::{PI, TAU};

use crate::types::REFERENCE_RPM;

/// Seconds of tape per radian of platter rotation at reference speed
pub const RADIANS_TO_SECONDS: f64 = (60.0 / REFERENCE_RPM) / TAU;

/// State of one continuous scratch gesture
///
/// Created on start-scratch, updated on every angle message, consumed on
/// end-scratch. At most one session exists per engine; the transport enum
/// in [`PlayheadController`](super::PlayheadController) enforces that by
/// construction.
#[derive(Debug, Clone)]
pub struct ScratchSession {
    /// Playhead position when the gesture opened
    initial_position: f64,
    /// Absolute position the playhead is being dragged towards
    target_position: f64,
    /// Total unwrapped rotation since the gesture opened
    accumulated_angle: f64,
    /// Last absolute angle received
    last_angle: f64,
}

impl ScratchSession {
    /// Open a gesture at the given angle and playhead position
    pub fn begin(angle: f64, position: f64) -> Self {
        Self {
            initial_position: position,
            target_position: position,
            accumulated_angle: 0.0,
            last_angle: angle,
        }
    }

    /// Feed a new absolute angle into the gesture
    ///
    /// Accumulates the shortest-path delta and recomputes the target
    /// position, clamped to the track bounds.
    pub fn move_to_angle(&mut self, angle: f64, sample_rate: f64, track_len: usize) {
        let mut delta = angle - self.last_angle;
        if delta > PI {
            delta -= TAU;
        } else if delta < -PI {
            delta += TAU;
        }
        self.accumulated_angle += delta;
        self.last_angle = angle;

        let sample_delta = self.accumulated_angle * RADIANS_TO_SECONDS * sample_rate;
        let max = track_len.saturating_sub(1) as f64;
        self.target_position = (self.initial_position + sample_delta).clamp(0.0, max);
    }

    /// The position the playhead is currently being dragged towards
    #[inline]
    pub fn target_position(&self) -> f64 {
        self.target_position
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_angle_unwrap_across_pi() {
        // 3.0 -> -3.0 crosses +pi; must accumulate a small positive delta
        // of 2*pi - 6.0, not a near-full negative rotation
        let mut session = ScratchSession::begin(3.0, 1000.0);
        session.move_to_angle(-3.0, 44100.0, 441_000);

        let expected = (TAU - 6.0) * RADIANS_TO_SECONDS * 44100.0;
        let got = session.target_position() - 1000.0;
        assert!((got - expected).abs() < 1e-6, "got delta {}", got);
    }

    #[test]
    fn test_angle_unwrap_reverse() {
        // -3.0 -> 3.0 crosses -pi going backwards. The expected delta is
        // about -3577 samples, so the session starts far enough in that
        // the track-start clamp cannot mask a wrong unwrap
        let mut session = ScratchSession::begin(-3.0, 10_000.0);
        session.move_to_angle(3.0, 44100.0, 441_000);

        let expected = -(TAU - 6.0) * RADIANS_TO_SECONDS * 44100.0;
        let got = session.target_position() - 10_000.0;
        assert!((got - expected).abs() < 1e-6, "got delta {}", got);
    }

    #[test]
    fn test_quarter_turn_target() {
        // startScratch(0) then scratchToAngle(pi/2) at 44100 Hz
        let mut session = ScratchSession::begin(0.0, 0.0);
        session.move_to_angle(PI / 2.0, 44100.0, 441_000);

        let expected = (PI / 2.0) * RADIANS_TO_SECONDS * 44100.0;
        assert!((session.target_position() - expected).abs() < 1e-6);
    }

    #[test]
    fn test_target_clamped_to_track() {
        let mut session = ScratchSession::begin(0.0, 50.0);
        // Wind far backwards in several small steps
        for angle in [-1.0, -2.0, -3.0] {
            session.move_to_angle(angle, 44100.0, 441_000);
        }
        assert_eq!(session.target_position(), 0.0);
    }

    #[test]
    fn test_accumulation_over_many_small_moves() {
        let mut a = ScratchSession::begin(0.0, 0.0);
        let mut b = ScratchSession::begin(0.0, 0.0);
        // Many small moves must land where one big move does
        for i in 1..=10 {
            a.move_to_angle(i as f64 * 0.1, 44100.0, 441_000);
        }
        b.move_to_angle(1.0, 44100.0, 441_000);
        assert!((a.target_position() - b.target_position()).abs() < 1e-6);
    }
}
