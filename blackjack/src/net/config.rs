//! Process-wide protocol settings.

use std::time::Duration;

use super::codec::Codec;

/// Marker every protocol message starts with.
pub const MAGIC_COOKIE: u32 = 0xABCD_DCBA;

/// Well-known UDP port offers are broadcast to.
pub const DISCOVERY_PORT: u16 = 13122;

/// Time between two offer broadcasts.
pub const OFFER_INTERVAL: Duration = Duration::from_secs(1);

/// Default timeout for a client to send its request after connecting.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Default timeout for reading a decision (dealer) or result (player).
pub const READ_TIMEOUT: Duration = Duration::from_secs(30);

/// Default timeout for writing to a peer.
pub const WRITE_TIMEOUT: Duration = Duration::from_secs(5);

/// Immutable protocol configuration. Built once at startup and handed to
/// the codec, dispatcher, sessions and broadcaster.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProtocolConfig {
    pub magic_cookie: u32,
    pub discovery_port: u16,
    pub offer_interval: Duration,
    pub request_timeout: Duration,
    pub read_timeout: Duration,
    pub write_timeout: Duration,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            magic_cookie: MAGIC_COOKIE,
            discovery_port: DISCOVERY_PORT,
            offer_interval: OFFER_INTERVAL,
            request_timeout: REQUEST_TIMEOUT,
            read_timeout: READ_TIMEOUT,
            write_timeout: WRITE_TIMEOUT,
        }
    }
}

impl ProtocolConfig {
    #[must_use]
    pub fn codec(&self) -> Codec {
        Codec::new(self)
    }
}
