//! Runtime configuration for the tablet input session.

use std::time::Duration;

use crate::error::ConfigError;

/// Default GfxTablet UDP port.
pub const DEFAULT_PORT: u16 = 40118;

/// Grace period during which a one-finger touch may still turn into a pinch.
pub const DEFAULT_TAP_TIMEOUT: Duration = Duration::from_millis(70);

/// Scale factors closer to 1.0 than this do not start a zoom.
pub const DEFAULT_MIN_SCALE_FACTOR: f32 = 0.2;

/// Settings for one input session and its transport.
#[derive(Debug, Clone, PartialEq)]
pub struct TabletConfig {
    /// Host name or address of the tablet receiver.
    pub host: String,
    /// UDP port of the tablet receiver.
    pub port: u16,
    /// Tap window (`T_tap`).
    pub tap_timeout: Duration,
    pub min_scale_factor: f32,
}

impl Default for TabletConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: DEFAULT_PORT,
            tap_timeout: DEFAULT_TAP_TIMEOUT,
            min_scale_factor: DEFAULT_MIN_SCALE_FACTOR,
        }
    }
}

impl TabletConfig {
    /// Builds a config for `host:port`, keeping the default timings.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Self::default()
        }
    }

    /// Checks the settings the transport and the gesture engine rely on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::EmptyHost);
        }
        if self.port == 0 {
            return Err(ConfigError::InvalidPort(0));
        }
        if self.tap_timeout.is_zero() {
            return Err(ConfigError::ZeroTapTimeout);
        }
        if !self.min_scale_factor.is_finite() || !(0.0..1.0).contains(&self.min_scale_factor) {
            return Err(ConfigError::InvalidScaleFactor(self.min_scale_factor));
        }
        Ok(())
    }

    /// Converts a JNI port argument.
    pub fn port_from_jint(port: i32) -> Result<u16, ConfigError> {
        match u16::try_from(port) {
            Ok(p) if p > 0 => Ok(p),
            _ => Err(ConfigError::InvalidPort(port)),
        }
    }
}
