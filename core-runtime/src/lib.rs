//! # Core Runtime Module
//!
//! Provides foundational runtime infrastructure for the streaming-client core:
//! - Logging and tracing infrastructure
//! - Event bus system
//!
//! ## Overview
//!
//! This crate contains the runtime utilities the other core crates depend on.
//! It establishes the logging conventions and the event broadcasting
//! mechanism used throughout the system.

pub mod error;
pub mod events;
pub mod logging;

pub use error::{Error, Result};
pub use events::{CoreEvent, EventBus, LibraryEvent, PlaybackEvent};
