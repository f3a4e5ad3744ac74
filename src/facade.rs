//! Control-side engine facade
//!
//! Runs where the embedding application lives and may block or allocate
//! freely. Translates user intents (play/pause, pitch, RPM, scratch
//! gestures) into [`EngineCommand`]s and folds the engine's event stream
//! into observable state: ready, playing, elapsed time.
//!
//! The facade never touches the render context directly - everything
//! crosses the lock-free control channel, so a stalled UI can never cause
//! an audio dropout.

use crate::engine::{CommandSender, EngineCommand, EngineEvent, EventReceiver};
use crate::error::EngineError;
use crate::types::{Sample, SampleBuffer, REFERENCE_RPM};

/// Non-real-time coordinator for one render engine
pub struct EngineFacade {
    commands: CommandSender,
    events: EventReceiver,
    /// Load accepted by the render context
    ready: bool,
    /// Free-running playback commanded (not scratching)
    playing: bool,
    /// A scratch gesture is open
    scratching: bool,
    /// Resume free-running playback when the gesture ends
    resume_after_scratch: bool,
    /// Forward playback hit the end of the track (cleared on play/seek/load)
    ended: bool,
    /// Last reported playhead position in samples
    position: f64,
    sample_rate: u32,
    track_len: usize,
    /// Platter speed setting in RPM
    target_rpm: f64,
    /// Pitch fader setting in percent (+8 = 8% faster)
    pitch_percent: f64,
}

impl EngineFacade {
    /// Create a facade over the given control channel halves
    pub fn new(commands: CommandSender, events: EventReceiver) -> Self {
        Self {
            commands,
            events,
            ready: false,
            playing: false,
            scratching: false,
            resume_after_scratch: false,
            ended: false,
            position: 0.0,
            sample_rate: 0,
            track_len: 0,
            target_rpm: REFERENCE_RPM,
            pitch_percent: 0.0,
        }
    }

    fn send(&mut self, cmd: EngineCommand) -> Result<(), EngineError> {
        self.commands
            .send(cmd)
            .map_err(|_| EngineError::CommandQueueFull)
    }

    /// Load a decoded track into the engine
    ///
    /// Validates the channel layout before any ownership transfer; on
    /// failure the engine is untouched and the load may be retried.
    /// `ready` goes true once the render context acknowledges with
    /// [`EngineEvent::Initialized`].
    pub fn load_track(
        &mut self,
        channels: Vec<Vec<Sample>>,
        sample_rate: u32,
    ) -> Result<(), EngineError> {
        let buffer = SampleBuffer::new(channels, sample_rate)?;
        let len = buffer.len();
        self.send(EngineCommand::Load(Box::new(buffer)))?;

        self.ready = false;
        self.playing = false;
        self.scratching = false;
        self.resume_after_scratch = false;
        self.ended = false;
        self.position = 0.0;
        self.sample_rate = sample_rate;
        self.track_len = len;
        log::info!(
            "track load queued: {} samples at {} Hz ({:.1}s)",
            len,
            sample_rate,
            len as f64 / sample_rate as f64
        );
        Ok(())
    }

    /// Unload the current track
    pub fn clear_track(&mut self) -> Result<(), EngineError> {
        self.send(EngineCommand::Clear)?;
        self.ready = false;
        self.playing = false;
        self.scratching = false;
        self.resume_after_scratch = false;
        self.ended = false;
        self.position = 0.0;
        self.track_len = 0;
        Ok(())
    }

    /// Drain pending engine events and fold them into facade state
    ///
    /// Call periodically from the control context (e.g. the UI tick).
    pub fn poll(&mut self) {
        while let Some(event) = self.events.poll() {
            match event {
                EngineEvent::Initialized => {
                    self.ready = true;
                    self.position = 0.0;
                    log::debug!("engine ready");
                }
                EngineEvent::TimeUpdate { position } => {
                    self.position = position;
                }
                EngineEvent::TrackEnd => {
                    self.playing = false;
                    self.ended = true;
                    self.position = self.track_len.saturating_sub(1) as f64;
                    log::debug!("track end reached");
                }
            }
        }
    }

    /// Current free-running rate from the pitch/RPM policy:
    /// `(target_rpm / 33.333) * (1 + pitch_percent / 100)`
    pub fn rate(&self) -> f64 {
        (self.target_rpm / REFERENCE_RPM) * (1.0 + self.pitch_percent / 100.0)
    }

    /// Start or resume free-running playback at the current pitch/RPM
    pub fn play(&mut self) -> Result<(), EngineError> {
        if !self.ready || self.scratching {
            return Ok(());
        }
        let rate = self.rate();
        self.send(EngineCommand::SetRate(rate))?;
        self.playing = rate != 0.0;
        self.ended = false;
        Ok(())
    }

    /// Pause playback (takes effect at the next block boundary)
    pub fn pause(&mut self) -> Result<(), EngineError> {
        if self.scratching {
            return Ok(());
        }
        self.send(EngineCommand::SetRate(0.0))?;
        self.playing = false;
        Ok(())
    }

    /// Toggle play/pause
    pub fn toggle_play(&mut self) -> Result<(), EngineError> {
        if self.playing {
            self.pause()
        } else {
            self.play()
        }
    }

    /// Jump to an absolute sample position
    pub fn seek(&mut self, position: f64) -> Result<(), EngineError> {
        if self.scratching {
            return Ok(());
        }
        self.send(EngineCommand::Seek(position))?;
        self.position = position.clamp(0.0, self.track_len.saturating_sub(1) as f64);
        self.ended = false;
        Ok(())
    }

    /// Set the pitch fader in percent; +8.0 plays 8% fast
    pub fn set_pitch_percent(&mut self, percent: f64) -> Result<(), EngineError> {
        self.pitch_percent = percent;
        self.push_rate_if_playing()
    }

    /// Set the platter speed in RPM (33.333 or 45.0, typically)
    pub fn set_target_rpm(&mut self, rpm: f64) -> Result<(), EngineError> {
        self.target_rpm = rpm;
        self.push_rate_if_playing()
    }

    fn push_rate_if_playing(&mut self) -> Result<(), EngineError> {
        if self.playing && !self.scratching {
            let rate = self.rate();
            self.send(EngineCommand::SetRate(rate))?;
            self.playing = rate != 0.0;
        }
        Ok(())
    }

    /// Open a scratch gesture at an absolute platter angle in radians
    ///
    /// Remembers whether playback was running so
    /// [`scratch_end`](Self::scratch_end) can resume it.
    pub fn scratch_begin(&mut self, angle: f64) -> Result<(), EngineError> {
        if !self.ready || self.scratching {
            return Ok(());
        }
        self.resume_after_scratch = self.playing;
        self.scratching = true;
        self.playing = false;
        self.ended = false;
        self.send(EngineCommand::ScratchStart { angle })
    }

    /// Feed a new platter angle into the open gesture
    pub fn scratch_move(&mut self, angle: f64) -> Result<(), EngineError> {
        if !self.scratching {
            return Ok(());
        }
        self.send(EngineCommand::ScratchMove { angle })
    }

    /// Close the gesture, resuming playback if it was running before
    pub fn scratch_end(&mut self) -> Result<(), EngineError> {
        if !self.scratching {
            return Ok(());
        }
        self.scratching = false;
        self.send(EngineCommand::ScratchEnd)?;
        if self.resume_after_scratch {
            self.resume_after_scratch = false;
            self.play()?;
        }
        Ok(())
    }

    // --- Observable state ---

    /// Whether the engine has accepted a track
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Whether free-running playback is commanded
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Whether a scratch gesture is open
    pub fn is_scratching(&self) -> bool {
        self.scratching
    }

    /// Whether forward playback reached the end of the track
    pub fn has_ended(&self) -> bool {
        self.ended
    }

    /// Last reported playhead position in samples
    pub fn position(&self) -> f64 {
        self.position
    }

    /// Last reported playhead position in seconds
    pub fn elapsed_seconds(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.position / self.sample_rate as f64
    }

    /// Loaded track duration in seconds
    pub fn duration_seconds(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.track_len as f64 / self.sample_rate as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{command_channel, event_channel, RenderEngine};

    /// Facade and engine wired back-to-back, with the render side driven
    /// manually - the same topology the cpal backend builds.
    fn facade_and_engine() -> (EngineFacade, RenderEngine) {
        let (command_tx, command_rx) = command_channel();
        let (event_tx, event_rx) = event_channel();
        (
            EngineFacade::new(command_tx, event_rx),
            RenderEngine::new(command_rx, event_tx),
        )
    }

    fn render_blocks(engine: &mut RenderEngine, blocks: usize) {
        let mut block = vec![0.0; 512];
        for _ in 0..blocks {
            engine.render(&mut [&mut block[..]]);
        }
    }

    #[test]
    fn test_rate_policy() {
        let (facade, _engine) = facade_and_engine();
        assert!((facade.rate() - 1.0).abs() < 1e-9);

        let (mut facade, _engine) = facade_and_engine();
        facade.set_pitch_percent(8.0).unwrap();
        assert!((facade.rate() - 1.08).abs() < 1e-9);
        facade.set_target_rpm(45.0).unwrap();
        assert!((facade.rate() - (45.0 / 33.333) * 1.08).abs() < 1e-9);
    }

    #[test]
    fn test_ready_after_roundtrip() {
        let (mut facade, mut engine) = facade_and_engine();
        facade.load_track(vec![vec![0.0; 44100]], 44100).unwrap();
        assert!(!facade.is_ready());

        render_blocks(&mut engine, 1);
        facade.poll();
        assert!(facade.is_ready());
        assert_eq!(facade.position(), 0.0);
    }

    #[test]
    fn test_invalid_track_rejected_without_side_effects() {
        let (mut facade, mut engine) = facade_and_engine();
        let result = facade.load_track(vec![vec![0.0; 10], vec![0.0; 11]], 44100);
        assert!(matches!(
            result,
            Err(EngineError::ChannelLengthMismatch { .. })
        ));

        render_blocks(&mut engine, 1);
        facade.poll();
        assert!(!facade.is_ready());

        // Retry with a valid layout succeeds
        facade.load_track(vec![vec![0.0; 10]], 44100).unwrap();
        render_blocks(&mut engine, 1);
        facade.poll();
        assert!(facade.is_ready());
    }

    #[test]
    fn test_play_pause_roundtrip() {
        let (mut facade, mut engine) = facade_and_engine();
        facade.load_track(vec![vec![0.1; 441_000]], 44100).unwrap();
        render_blocks(&mut engine, 1);
        facade.poll();

        facade.play().unwrap();
        assert!(facade.is_playing());
        render_blocks(&mut engine, 100);
        facade.poll();
        assert!(facade.position() > 0.0);
        assert!(facade.elapsed_seconds() > 0.0);

        facade.pause().unwrap();
        assert!(!facade.is_playing());
    }

    #[test]
    fn test_track_end_observed() {
        let (mut facade, mut engine) = facade_and_engine();
        facade.load_track(vec![vec![0.1; 2000]], 44100).unwrap();
        render_blocks(&mut engine, 1);
        facade.poll();

        facade.play().unwrap();
        render_blocks(&mut engine, 10);
        facade.poll();
        assert!(facade.has_ended());
        assert!(!facade.is_playing());
        assert_eq!(facade.position(), 1999.0);
    }

    #[test]
    fn test_scratch_resumes_previous_state() {
        let (mut facade, mut engine) = facade_and_engine();
        facade.load_track(vec![vec![0.1; 441_000]], 44100).unwrap();
        render_blocks(&mut engine, 1);
        facade.poll();

        facade.play().unwrap();
        facade.scratch_begin(0.0).unwrap();
        assert!(facade.is_scratching());
        assert!(!facade.is_playing());
        facade.scratch_move(0.5).unwrap();
        render_blocks(&mut engine, 10);

        facade.scratch_end().unwrap();
        assert!(!facade.is_scratching());
        assert!(facade.is_playing());
    }

    #[test]
    fn test_scratch_from_pause_stays_paused() {
        let (mut facade, mut engine) = facade_and_engine();
        facade.load_track(vec![vec![0.1; 441_000]], 44100).unwrap();
        render_blocks(&mut engine, 1);
        facade.poll();

        facade.scratch_begin(0.0).unwrap();
        facade.scratch_move(1.0).unwrap();
        render_blocks(&mut engine, 10);
        facade.scratch_end().unwrap();
        assert!(!facade.is_playing());
    }

    #[test]
    fn test_scratch_before_ready_is_ignored() {
        let (mut facade, _engine) = facade_and_engine();
        facade.scratch_begin(0.0).unwrap();
        assert!(!facade.is_scratching());
    }
}
