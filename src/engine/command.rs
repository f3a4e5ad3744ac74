//! Lock-free command and event queues for the render engine
//!
//! The control context sends [`EngineCommand`]s via a lock-free SPSC ring
//! buffer and the render context answers with [`EngineEvent`]s on a second
//! ring buffer in the opposite direction. There is no shared mutable state:
//! the only data crossing the boundary are these value messages plus the
//! one-time ownership transfer of the [`SampleBuffer`] inside `Load`.
//!
//! # Real-time safety
//!
//! Both push and pop are wait-free O(1). The render side drains the command
//! queue at the start of every block, so a command arriving mid-block takes
//! effect at the next block boundary, never partway through. A full event
//! queue drops the message rather than blocking; only advisory telemetry is
//! ever at risk because state-change events are rare.

use crate::types::SampleBuffer;

/// Commands sent from the control context to the render context
///
/// Each variant is applied atomically at block start, in the order sent.
#[derive(Debug)]
pub enum EngineCommand {
    /// Load a track, transferring buffer ownership to the render context
    ///
    /// Boxed so the command enum itself stays pointer-sized for
    /// cache-efficient queueing; the audio data may be hundreds of MB.
    /// Resets the playhead to 0 and the rate to 0, then emits
    /// [`EngineEvent::Initialized`]. Replaces any previously loaded track.
    Load(Box<SampleBuffer>),
    /// Unload the current track, returning the engine to Uninitialized
    Clear,
    /// Set the free-running playback rate in source samples per output
    /// sample (1.0 = normal speed, negative = reverse, 0 = paused)
    ///
    /// Ignored while a scratch gesture is open.
    SetRate(f64),
    /// Jump the playhead to an absolute sample position
    ///
    /// Clamped to the track bounds; ignored while scratching.
    Seek(f64),
    /// Open a scratch gesture at the given absolute platter angle (radians)
    ScratchStart { angle: f64 },
    /// Update the open scratch gesture with a new absolute angle
    ///
    /// Silently ignored if no gesture is open (reachable only through a
    /// racing control-context bug; must not disturb the render path).
    ScratchMove { angle: f64 },
    /// Close the scratch gesture, syncing the playhead to its target
    ScratchEnd,
}

/// Events sent from the render context back to the control context
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EngineEvent {
    /// A `Load` was accepted; the engine is Ready at position 0
    Initialized,
    /// Progress telemetry, emitted at most every 50 ms of rendered audio
    TimeUpdate { position: f64 },
    /// Forward free-running playback reached the end of the track
    TrackEnd,
}

/// Capacity of the control->render command queue
///
/// A scratch gesture streams one command per pointer move (~125 Hz from
/// typical pointer devices) against a block-rate drain, so 256 leaves
/// ample headroom.
pub const COMMAND_QUEUE_CAPACITY: usize = 256;

/// Capacity of the render->control event queue
///
/// Progress telemetry is capped at 20 Hz and state-change events are rare;
/// overflow drops telemetry rather than blocking the render context.
pub const EVENT_QUEUE_CAPACITY: usize = 256;

/// Command sender half, owned by the control context
pub struct CommandSender {
    producer: rtrb::Producer<EngineCommand>,
}

impl CommandSender {
    /// Send a command to the render context (non-blocking)
    ///
    /// Returns `Err(cmd)` with the command handed back if the queue is full.
    pub fn send(&mut self, cmd: EngineCommand) -> Result<(), EngineCommand> {
        self.producer.push(cmd).map_err(|e| match e {
            rtrb::PushError::Full(value) => value,
        })
    }

    /// Check if the queue has space for another command
    pub fn has_space(&self) -> bool {
        self.producer.slots() > 0
    }
}

/// Event receiver half, owned by the control context
pub struct EventReceiver {
    consumer: rtrb::Consumer<EngineEvent>,
}

impl EventReceiver {
    /// Take the next pending event, if any (non-blocking)
    pub fn poll(&mut self) -> Option<EngineEvent> {
        self.consumer.pop().ok()
    }
}

/// Create the control->render command channel
///
/// The sender stays with the control context; the raw consumer is handed
/// to [`RenderEngine::new`](super::RenderEngine::new).
pub fn command_channel() -> (CommandSender, rtrb::Consumer<EngineCommand>) {
    let (producer, consumer) = rtrb::RingBuffer::new(COMMAND_QUEUE_CAPACITY);
    (CommandSender { producer }, consumer)
}

/// Create the render->control event channel
///
/// The raw producer is handed to the render engine; the receiver stays
/// with the control context.
pub fn event_channel() -> (rtrb::Producer<EngineEvent>, EventReceiver) {
    let (producer, consumer) = rtrb::RingBuffer::new(EVENT_QUEUE_CAPACITY);
    (producer, EventReceiver { consumer })
}
