//! Workspace umbrella crate.
//!
//! Exposes feature flags that map to the individual workspace crates
//! (`core-service`, `core-generator`) so host applications can depend on
//! `studysync-workspace` and enable what they need without wiring each crate.

#[cfg(feature = "desktop-shims")]
pub use core_service as service;

#[cfg(feature = "generator-cache")]
pub use core_generator as generator;
