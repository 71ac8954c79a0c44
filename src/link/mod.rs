//! Event channel to the assistant backend.
//!
//! The backend speaks newline-delimited JSON over a TCP socket; every message
//! carries an `"event"` tag naming it. This module defines the typed message
//! set and a fire-and-forget session handle:
//! - Reader thread: parses server lines and forwards them on a channel
//! - `ServerLink::send`: serializes one client event per line
//!
//! There is no backpressure or retry; an event sent while disconnected is
//! logged and dropped.

pub mod protocol;
mod session;

#[cfg(test)]
mod tests;

pub use protocol::{ClientEvent, ContextUsage, ResponseStats, ServerEvent, SystemNote};
pub use session::{LinkNotice, ServerLink};
