//! Playhead position and rate evolution
//!
//! The [`PlayheadController`] is the sole authority over playback position.
//! Once per audio block it produces the block's effective rate and advances
//! the position, applying the scratch-vs-free-play policy:
//!
//! - Free-running blocks use the commanded rate directly, unfiltered -
//!   continuous playback must not be smoothed.
//! - Scratch blocks chase the gesture target: the desired rate is clamped
//!   to a worst-case jump of 200 ms of tape per block, then low-pass
//!   filtered to damp pointer-device jitter while keeping reversed
//!   playback audibly intelligible.

use super::scratch::ScratchSession;

/// Fixed gain of the scratch-rate low-pass filter
pub const SCRATCH_SMOOTHING: f64 = 0.65;

/// Worst-case tape jump per block while scratching, in seconds
///
/// Bounds click/alias severity: `max_rate = sample_rate * 0.2 / block_size`.
pub const MAX_SCRATCH_JUMP_SECS: f64 = 0.2;

/// Transport state
///
/// A tagged union rather than independent booleans: only `Scratching`
/// carries a session, so "scratching while stopped" and "two concurrent
/// gestures" are unrepresentable.
#[derive(Debug, Clone)]
pub enum Transport {
    Paused,
    Playing,
    Scratching(ScratchSession),
}

/// Rate trajectory for one block, consumed by the resampler
///
/// The rate is held constant within a block (recomputed once per block),
/// so per-sample read positions derive as `start_position + i * rate`.
#[derive(Debug, Clone, Copy)]
pub struct BlockPlan {
    /// Read position of the block's first output sample
    pub start_position: f64,
    /// Source samples advanced per output sample across the block
    pub rate: f64,
    /// Forward free-running playback hit the end of the track this block
    pub reached_end: bool,
}

/// Owns the playback position and rate for one loaded track
#[derive(Debug)]
pub struct PlayheadController {
    /// Current read position in fractional samples
    position: f64,
    /// Commanded free-running rate
    rate: f64,
    /// Low-pass filter state for scratch blocks
    smoothed_rate: f64,
    transport: Transport,
    sample_rate: f64,
    track_len: usize,
}

impl PlayheadController {
    /// Create a controller for a track of the given rate and length
    pub fn new(sample_rate: u32, track_len: usize) -> Self {
        Self {
            position: 0.0,
            rate: 0.0,
            smoothed_rate: 0.0,
            transport: Transport::Paused,
            sample_rate: sample_rate as f64,
            track_len,
        }
    }

    /// Current playhead position in fractional samples
    #[inline]
    pub fn position(&self) -> f64 {
        self.position
    }

    /// Commanded free-running rate
    #[inline]
    pub fn rate(&self) -> f64 {
        self.rate
    }

    #[inline]
    pub fn is_scratching(&self) -> bool {
        matches!(self.transport, Transport::Scratching(_))
    }

    #[inline]
    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    /// Set the free-running rate; nonzero resumes, zero pauses
    ///
    /// Ignored while a scratch gesture is open.
    pub fn set_rate(&mut self, rate: f64) {
        if self.is_scratching() {
            return;
        }
        self.rate = rate;
        self.transport = if rate != 0.0 {
            Transport::Playing
        } else {
            Transport::Paused
        };
    }

    /// Jump to an absolute position, clamped to the track bounds
    ///
    /// Ignored while scratching - the gesture owns the position.
    pub fn seek(&mut self, position: f64) {
        if self.is_scratching() {
            return;
        }
        let max = self.track_len.saturating_sub(1) as f64;
        self.position = position.clamp(0.0, max);
    }

    /// Open a scratch gesture at the current position
    ///
    /// No-op if a gesture is already open.
    pub fn start_scratch(&mut self, angle: f64) {
        if self.is_scratching() {
            return;
        }
        self.smoothed_rate = 0.0;
        self.transport = Transport::Scratching(ScratchSession::begin(angle, self.position));
    }

    /// Feed an angle into the open gesture; no-op without one
    pub fn scratch_to_angle(&mut self, angle: f64) {
        if let Transport::Scratching(session) = &mut self.transport {
            session.move_to_angle(angle, self.sample_rate, self.track_len);
        }
    }

    /// Close the gesture, snapping the playhead to its target
    ///
    /// Leaves the transport Paused; the caller decides whether to re-issue
    /// a rate to resume free-running playback. No-op without a gesture.
    pub fn end_scratch(&mut self) {
        if let Transport::Scratching(session) = &self.transport {
            self.position = session.target_position();
            self.rate = 0.0;
            self.smoothed_rate = 0.0;
            self.transport = Transport::Paused;
        }
    }

    /// Compute the block's rate and advance the position past it
    ///
    /// Boundary policy: forward free-running playback that crosses `N - 1`
    /// clamps there with the rate forced to zero and `reached_end` set
    /// (exactly once - subsequent blocks are paused). Negative positions
    /// clamp to zero silently.
    pub fn advance_block(&mut self, block_size: usize) -> BlockPlan {
        let block = block_size as f64;

        let rate = match &self.transport {
            Transport::Scratching(session) => {
                let desired = (session.target_position() - self.position) / block;
                let max_rate = self.sample_rate * MAX_SCRATCH_JUMP_SECS / block;
                let clamped = desired.clamp(-max_rate, max_rate);
                self.smoothed_rate += (clamped - self.smoothed_rate) * SCRATCH_SMOOTHING;
                self.smoothed_rate
            }
            Transport::Playing => self.rate,
            Transport::Paused => 0.0,
        };

        let start_position = self.position;
        let mut new_position = start_position + rate * block;
        let mut reached_end = false;
        let end = self.track_len.saturating_sub(1) as f64;

        if !self.is_scratching() && rate > 0.0 && new_position >= end {
            new_position = end;
            self.rate = 0.0;
            self.transport = Transport::Paused;
            reached_end = true;
        } else if new_position < 0.0 {
            new_position = 0.0;
        }
        self.position = new_position;

        BlockPlan {
            start_position,
            rate,
            reached_end,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: u32 = 44100;

    #[test]
    fn test_free_running_advance() {
        let mut playhead = PlayheadController::new(SR, 441_000);
        playhead.set_rate(1.0);

        let plan = playhead.advance_block(512);
        assert_eq!(plan.start_position, 0.0);
        assert_eq!(plan.rate, 1.0);
        assert!(!plan.reached_end);
        assert_eq!(playhead.position(), 512.0);
    }

    #[test]
    fn test_paused_block_is_stationary() {
        let mut playhead = PlayheadController::new(SR, 441_000);
        playhead.seek(100.0);
        let plan = playhead.advance_block(512);
        assert_eq!(plan.rate, 0.0);
        assert_eq!(playhead.position(), 100.0);
    }

    #[test]
    fn test_track_end_fires_once() {
        let mut playhead = PlayheadController::new(SR, 1000);
        playhead.seek(900.0);
        playhead.set_rate(1.0);

        let plan = playhead.advance_block(512);
        assert!(plan.reached_end);
        assert_eq!(playhead.position(), 999.0);
        assert_eq!(playhead.rate(), 0.0);

        // Repeated blocks stay clamped without re-signalling
        let plan = playhead.advance_block(512);
        assert!(!plan.reached_end);
        assert_eq!(plan.rate, 0.0);
        assert_eq!(playhead.position(), 999.0);
    }

    #[test]
    fn test_reverse_clamps_to_zero_without_event() {
        let mut playhead = PlayheadController::new(SR, 1000);
        playhead.seek(100.0);
        playhead.set_rate(-1.0);

        let plan = playhead.advance_block(512);
        assert!(!plan.reached_end);
        assert_eq!(playhead.position(), 0.0);
    }

    #[test]
    fn test_scratch_rate_clamp() {
        let mut playhead = PlayheadController::new(SR, 441_000);
        playhead.start_scratch(0.0);
        // Drag a quarter turn instantly: an enormous desired rate
        playhead.scratch_to_angle(std::f64::consts::FRAC_PI_2);

        let max_rate = 44100.0 * 0.2 / 128.0; // ~68.9
        for _ in 0..32 {
            let plan = playhead.advance_block(128);
            assert!(
                plan.rate.abs() <= max_rate + 1e-9,
                "rate {} exceeds clamp {}",
                plan.rate,
                max_rate
            );
        }
    }

    #[test]
    fn test_scratch_rate_is_smoothed() {
        let mut playhead = PlayheadController::new(SR, 441_000);
        playhead.start_scratch(0.0);
        playhead.scratch_to_angle(0.5);

        // First block: smoothing starts from zero, so the rate must be
        // 0.65 of the clamped desired rate, not the full value
        let target = {
            let mut s = ScratchSession::begin(0.0, 0.0);
            s.move_to_angle(0.5, 44100.0, 441_000);
            s.target_position()
        };
        let desired = target / 128.0;
        let clamped = desired.min(44100.0 * 0.2 / 128.0);
        let plan = playhead.advance_block(128);
        assert!((plan.rate - clamped * 0.65).abs() < 1e-9);
    }

    #[test]
    fn test_scratch_converges_to_target() {
        let mut playhead = PlayheadController::new(SR, 441_000);
        playhead.seek(10_000.0);
        playhead.start_scratch(0.0);
        playhead.scratch_to_angle(0.2);

        let target = {
            let mut s = ScratchSession::begin(0.0, 10_000.0);
            s.move_to_angle(0.2, 44100.0, 441_000);
            s.target_position()
        };
        for _ in 0..200 {
            playhead.advance_block(128);
        }
        assert!(
            (playhead.position() - target).abs() < 1.0,
            "position {} did not converge to {}",
            playhead.position(),
            target
        );
    }

    #[test]
    fn test_end_scratch_syncs_position() {
        let mut playhead = PlayheadController::new(SR, 441_000);
        playhead.start_scratch(0.0);
        playhead.scratch_to_angle(1.0);
        let target = match playhead.transport() {
            Transport::Scratching(s) => s.target_position(),
            _ => unreachable!(),
        };

        playhead.end_scratch();
        assert!(!playhead.is_scratching());
        assert_eq!(playhead.position(), target);
        assert_eq!(playhead.rate(), 0.0);
    }

    #[test]
    fn test_rate_ignored_while_scratching() {
        let mut playhead = PlayheadController::new(SR, 441_000);
        playhead.start_scratch(0.0);
        playhead.set_rate(2.0);
        assert!(playhead.is_scratching());
        assert_eq!(playhead.rate(), 0.0);
    }

    #[test]
    fn test_stray_scratch_messages_ignored() {
        let mut playhead = PlayheadController::new(SR, 441_000);
        // No open gesture: these must be harmless no-ops
        playhead.scratch_to_angle(1.0);
        playhead.end_scratch();
        assert_eq!(playhead.position(), 0.0);
        assert!(!playhead.is_scratching());
    }

    #[test]
    fn test_duplicate_start_scratch_keeps_first_session() {
        let mut playhead = PlayheadController::new(SR, 441_000);
        playhead.start_scratch(0.0);
        playhead.scratch_to_angle(0.5);
        let target_before = match playhead.transport() {
            Transport::Scratching(s) => s.target_position(),
            _ => unreachable!(),
        };
        playhead.start_scratch(2.0);
        let target_after = match playhead.transport() {
            Transport::Scratching(s) => s.target_position(),
            _ => unreachable!(),
        };
        assert_eq!(target_before, target_after);
    }
}
