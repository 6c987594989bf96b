//! Error types shared by the configuration, codec and transport layers.
//!
//! The gesture engine itself has no failure mode; everything here is raised
//! either at a validation boundary or asynchronously by the transport worker.

use std::io;

use thiserror::Error;

/// Rejected configuration or canvas geometry.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("invalid image dimensions {width}x{height} (must be {min}-{max})")]
    InvalidDimensions {
        width: i32,
        height: i32,
        min: i32,
        max: i32,
    },
    #[error("invalid zoom factor: {0}")]
    InvalidZoom(f32),
    #[error("invalid port: {0} (must be 1-65535)")]
    InvalidPort(i32),
    #[error("tablet host is empty")]
    EmptyHost,
    #[error("tap timeout must be non-zero")]
    ZeroTapTimeout,
    #[error("invalid minimum scale factor: {0}")]
    InvalidScaleFactor(f32),
}

/// Failures of the streaming transport. Reported, never fatal to input handling.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("tablet endpoint not configured yet, event dropped")]
    NotConfigured,
    #[error("failed to resolve {host}: {source}")]
    Resolve {
        host: String,
        #[source]
        source: io::Error,
    },
    #[error("no address found for {0}")]
    NoAddress(String),
    #[error("failed to bind tablet socket: {0}")]
    Bind(#[source] io::Error),
    #[error("failed to send event to {addr}: {source}")]
    Send {
        addr: std::net::SocketAddr,
        #[source]
        source: io::Error,
    },
    #[error("transport worker is gone")]
    Closed,
}

/// Malformed tablet datagram.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("datagram truncated: {0} bytes")]
    Truncated(usize),
    #[error("bad datagram signature")]
    BadSignature,
    #[error("unsupported protocol version {0}")]
    UnsupportedVersion(u16),
    #[error("unknown event type {0}")]
    UnknownType(u8),
}
