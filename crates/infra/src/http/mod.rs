//! HTTP transport
//!
//! A pooled, blocking client shared by every connector in the process, plus
//! the gate that caps concurrent requests.

pub mod client;
pub mod gate;

pub use client::{
    set_connect_timeout, set_max_connections, set_max_connections_per_route, set_read_timeout,
    HttpTransport, RawResponse,
};
pub use gate::{ConnectionGate, GatePermit};
