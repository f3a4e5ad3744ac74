//! Audio output backend
//!
//! Builds the cpal output stream whose callback is the crate's real-time
//! render context. The architecture is lock-free end to end:
//!
//! - **Control context**: sends commands via a lock-free ring buffer
//! - **Render context** (the stream callback): owns the
//!   [`RenderEngine`](crate::engine::RenderEngine) exclusively, applies
//!   commands at block boundaries, renders audio
//! - **Events**: flow back on a second ring buffer, folded into the
//!   [`EngineFacade`](crate::EngineFacade) by `poll()`
//!
//! The core engine stays drivable without any device - tests and offline
//! renderers call [`RenderEngine::render`](crate::engine::RenderEngine::render)
//! directly.
//!
//! # Example
//!
//! ```ignore
//! use platter::audio::{start_audio_system, AudioConfig};
//!
//! let mut system = start_audio_system(&AudioConfig::default())?;
//! system.facade.load_track(channels, 44100)?;
//! system.facade.play()?;
//! // later, on the UI tick:
//! system.facade.poll();
//! let elapsed = system.facade.elapsed_seconds();
//! ```

mod config;
mod cpal_backend;
mod device;
mod error;

pub use config::{AudioConfig, BufferSize, DeviceId, DEFAULT_BUFFER_SIZE, MAX_BUFFER_SIZE};
pub use cpal_backend::{start_audio_system, AudioHandle, AudioSystemResult};
pub use device::{find_device_by_id, get_default_device, get_output_devices, OutputDevice};
pub use error::{AudioError, AudioResult};
