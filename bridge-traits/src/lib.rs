//! # Host Bridge Traits
//!
//! Capabilities the sync core needs from its host but must not implement
//! itself: talking HTTP, telling the time, and forwarding logs.
//!
//! ## Traits
//!
//! - [`HttpClient`](http::HttpClient) - Single-shot async HTTP
//! - [`Clock`](time::Clock) - Time source for deterministic testing
//! - [`LoggerSink`](time::LoggerSink) - Forward structured logs to the host
//!
//! ## Implementations
//!
//! | Host     | Crate            |
//! |----------|------------------|
//! | Desktop  | `bridge-desktop` |
//! | Tests    | `mockall` mocks or in-process fakes |
//!
//! ## Error Handling
//!
//! Every bridge call returns [`BridgeError`](error::BridgeError). Transport
//! failures use the `Timeout` and `Connection` variants so the sync engine can
//! classify them as transient and retry.
//!
//! All traits require `Send + Sync` so handles can be shared behind `Arc`.

pub mod error;
pub mod http;
pub mod time;

pub use error::BridgeError;

pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
pub use time::{Clock, ConsoleLogger, FixedClock, LogEntry, LogLevel, LoggerSink, SystemClock};
