//! # Core Runtime Module
//!
//! Runtime infrastructure shared by the StudySync core crates:
//! - Logging and tracing setup
//! - Configuration and host capability injection
//! - Event bus for sync progress and generator cache activity
//!
//! Nothing here knows about documents or interviews; the domain crates
//! (`core-content`, `core-sync`, `core-generator`) build on these pieces.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use error::{Error, Result};
