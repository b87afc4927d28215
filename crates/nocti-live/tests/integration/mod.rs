//! Integration tests for nocti-live.
//!
//! These tests verify the transport lifecycle against real sockets:
//! - Connection establishment and push delivery
//! - Mode switching and teardown
//! - Auto fallback from WebSocket to the event stream

pub mod common;
