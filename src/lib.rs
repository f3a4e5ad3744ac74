//! Platter - vinyl-style variable-rate audio playback
//!
//! Loads one decoded track into a real-time render engine and manipulates
//! its playback the way a DJ handles a record: continuous-rate play,
//! instantaneous pitch/RPM changes, and scratch gestures where platter
//! rotation maps directly to tape position.
//!
//! # Architecture
//!
//! The crate is split across a hard real-time boundary:
//!
//! - **Render context**: [`engine::RenderEngine`], driven once per audio
//!   block by the output backend. Owns the sample data exclusively, never
//!   blocks, never allocates.
//! - **Control context**: [`facade::EngineFacade`], where the embedding
//!   application lives. May block and allocate freely.
//!
//! The two sides communicate only through a pair of lock-free SPSC ring
//! buffers (commands in, events out). Commands are applied at block
//! boundaries in FIFO order, never mid-block.

pub mod audio;
pub mod engine;
pub mod error;
pub mod facade;
pub mod types;

pub use engine::{EngineCommand, EngineEvent, RenderEngine};
pub use error::EngineError;
pub use facade::EngineFacade;
pub use types::{Sample, SampleBuffer};
