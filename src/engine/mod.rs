//! Real-time playback engine
//!
//! The render-context half of the crate: playhead bookkeeping, scratch
//! gesture tracking, block resampling, and the command/event protocol
//! that connects it to the control context.

pub mod command;
pub mod playhead;
pub mod render;
pub mod resample;
pub mod scratch;

pub use command::{
    command_channel, event_channel, CommandSender, EngineCommand, EngineEvent, EventReceiver,
    COMMAND_QUEUE_CAPACITY, EVENT_QUEUE_CAPACITY,
};
pub use playhead::{BlockPlan, PlayheadController, Transport};
pub use render::{RenderEngine, PROGRESS_INTERVAL_SECS};
pub use scratch::ScratchSession;
