//! Construction-time configuration for an `Endpoint`.

use serde::{Deserialize, Serialize};

use crate::codec::MAX_SUBFRAMES;
use crate::error::{FramecastError, Result};

/// Settings passed to `Endpoint::init_sender` / `Endpoint::init_receiver`.
///
/// `ip` is the remote address for a sender (required) or the local bind
/// address for a receiver (optional — `None` or empty binds to all
/// interfaces). `subframes` is only consulted by a receiver and defaults to
/// 1 when absent or zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub ip: Option<String>,
    pub port: u16,
    #[serde(default)]
    pub timeout_ms: u32,
    #[serde(default)]
    pub subframes: u8,
}

impl Config {
    pub fn new(port: u16) -> Self {
        Config {
            ip: None,
            port,
            timeout_ms: 0,
            subframes: 0,
        }
    }

    pub fn with_ip(mut self, ip: impl Into<String>) -> Self {
        self.ip = Some(ip.into());
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u32) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn with_subframes(mut self, subframes: u8) -> Self {
        self.subframes = subframes;
        self
    }

    /// The effective subframe count a receiver should track: 0 means 1.
    pub fn effective_subframes(&self) -> u8 {
        if self.subframes == 0 {
            1
        } else {
            self.subframes
        }
    }

    /// Checks the bounds that apply regardless of role. Role-specific
    /// requirements (e.g. a sender's non-empty `ip`) are checked by
    /// `Endpoint::init_sender` itself.
    pub fn validate(&self) -> Result<()> {
        let subframes = self.effective_subframes() as usize;
        if subframes > MAX_SUBFRAMES {
            return Err(FramecastError::TooManySubframes {
                requested: subframes,
                max: MAX_SUBFRAMES,
            });
        }
        Ok(())
    }
}
