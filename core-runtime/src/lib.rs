//! # Core Runtime Module
//!
//! Foundational runtime infrastructure shared by the EcoLife core crates:
//! - Logging and tracing setup, with host forwarding through `LoggerSink`
//! - Configuration (`CoreConfig` builder with fail-fast validation)
//! - Event bus for bridge, storage and auth notifications
//!
//! ## Overview
//!
//! Nothing in here knows about individual capabilities. The façade, the
//! storage hooks and the session holder all receive a `CoreConfig` and an
//! `EventBus` from the composition root and report what happens through them.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use error::{Error, Result};
