//! Touch and stylus input engine for an Android VNC client's tablet mode.
//!
//! This crate decides, for every one-finger touch, whether the user is drawing
//! or starting a pinch, holds the stroke's first events back until that is
//! known, and then streams them to a GfxTablet receiver or applies them to an
//! emulated remote mouse.
//!
//! # Modules
//!
//! - `input`: gesture disambiguation, event building and output sinks.
//! - `net`: the GfxTablet wire codec and the UDP sender.
//! - `config`: session and transport settings.
//! - `error`: error types.
//! - `tablet_jni`: JNI bindings used by the Android application.

pub mod config;
pub mod error;
pub mod input;
pub mod net;
mod tablet_jni;

pub use config::TabletConfig;
pub use error::{CodecError, ConfigError, TransportError};
