//! Network side of the tablet mode.
//!
//! - **`codec`**: GfxTablet datagram encoding and decoding
//! - **`client`**: queue, UDP sender task, endpoint resolution and the
//!   [`NetworkSink`] plugged into the gesture session

pub mod client;
pub mod codec;

pub use client::{NetworkClient, NetworkSink};
pub use codec::{NetEvent, NetEventType};
