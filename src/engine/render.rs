//! The real-time render engine
//!
//! Driven once per fixed-size block by the audio backend. Drains the
//! command queue, advances the playhead, resamples one block, and pushes
//! events back to the control context. Owns the loaded [`SampleBuffer`]
//! exclusively - ownership transfers in via the `Load` command and the
//! data is never written again.
//!
//! Nothing in here may block, allocate, or fail per block: a malformed
//! command is ignored and an out-of-range playhead degrades to silence,
//! so the render cadence is never interrupted.

use crate::types::{Sample, SampleBuffer};

use super::command::{EngineCommand, EngineEvent};
use super::playhead::PlayheadController;
use super::resample;

/// Minimum interval between progress events, in seconds of rendered audio
///
/// Advisory telemetry only - 20 Hz is plenty for UI animation and keeps
/// the event queue quiet.
pub const PROGRESS_INTERVAL_SECS: f64 = 0.05;

/// Render-context playback engine
///
/// Constructed once with both ends of the control protocol; there is no
/// hidden registry or global callback registration. The engine is
/// Uninitialized until a `Load` command arrives.
pub struct RenderEngine {
    /// Loaded track (None = Uninitialized)
    buffer: Option<SampleBuffer>,
    playhead: PlayheadController,
    command_rx: rtrb::Consumer<EngineCommand>,
    event_tx: rtrb::Producer<EngineEvent>,
    /// Output frames rendered since the last progress event
    frames_since_progress: usize,
}

impl RenderEngine {
    /// Create an engine wired to the given control channel halves
    pub fn new(
        command_rx: rtrb::Consumer<EngineCommand>,
        event_tx: rtrb::Producer<EngineEvent>,
    ) -> Self {
        Self {
            buffer: None,
            playhead: PlayheadController::new(44100, 0),
            command_rx,
            event_tx,
            frames_since_progress: 0,
        }
    }

    /// Whether a track is loaded
    pub fn is_initialized(&self) -> bool {
        self.buffer.is_some()
    }

    /// Apply all pending commands, in the order sent
    ///
    /// Runs at block start only, so every command takes effect at a block
    /// boundary. Tolerates zero or many pending commands.
    fn process_commands(&mut self) {
        while let Ok(cmd) = self.command_rx.pop() {
            match cmd {
                EngineCommand::Load(buffer) => {
                    self.playhead = PlayheadController::new(buffer.sample_rate(), buffer.len());
                    // Replacing the Option drops the previous track here on
                    // the render thread, after the swap
                    self.buffer = Some(*buffer);
                    self.frames_since_progress = 0;
                    let _ = self.event_tx.push(EngineEvent::Initialized);
                }
                EngineCommand::Clear => {
                    self.buffer = None;
                    self.playhead = PlayheadController::new(44100, 0);
                }
                EngineCommand::SetRate(rate) => self.playhead.set_rate(rate),
                EngineCommand::Seek(position) => self.playhead.seek(position),
                EngineCommand::ScratchStart { angle } => self.playhead.start_scratch(angle),
                EngineCommand::ScratchMove { angle } => self.playhead.scratch_to_angle(angle),
                EngineCommand::ScratchEnd => self.playhead.end_scratch(),
            }
        }
    }

    /// Render one block into planar output channels
    ///
    /// All output channels are silenced first; `min(track, output)`
    /// channels are then overwritten with resampled audio. The block size
    /// is the length of the output channels (all equal).
    pub fn render(&mut self, output: &mut [&mut [Sample]]) {
        self.process_commands();

        for channel in output.iter_mut() {
            channel.fill(0.0);
        }

        let Some(buffer) = &self.buffer else {
            return;
        };
        let block_size = match output.first() {
            Some(channel) if !channel.is_empty() => channel.len(),
            _ => return,
        };

        let plan = self.playhead.advance_block(block_size);
        resample::render_block(buffer, plan.start_position, plan.rate, output);

        if plan.reached_end {
            let _ = self.event_tx.push(EngineEvent::TrackEnd);
        }

        // Progress telemetry, paced by rendered audio time. Reports the
        // playhead position even mid-scratch (not the gesture target).
        self.frames_since_progress += block_size;
        let interval = (buffer.sample_rate() as f64 * PROGRESS_INTERVAL_SECS) as usize;
        if self.frames_since_progress >= interval {
            // Carry the remainder so the long-run cadence stays at the
            // interval even when blocks do not divide it evenly
            self.frames_since_progress -= interval;
            let _ = self.event_tx.push(EngineEvent::TimeUpdate {
                position: self.playhead.position(),
            });
        }
    }
}
