//! Network error types for the codec, sessions and discovery.

use std::io;

use thiserror::Error;

use crate::game::RoundError;

/// Malformed framing: the bytes are not a message of the expected kind.
#[derive(Debug, Eq, Error, PartialEq)]
pub enum ProtocolError {
    #[error("invalid magic cookie {0:#010x}")]
    InvalidMagicCookie(u32),

    #[error("invalid message type {0:#04x}")]
    InvalidType(u8),

    #[error("invalid message length {actual} (expected {expected})")]
    InvalidLength { expected: usize, actual: usize },
}

/// Well-framed message with field values the game can't accept.
#[derive(Debug, Eq, Error, PartialEq)]
pub enum ValidationError {
    #[error("requested {0} rounds, must be 1-255")]
    RoundsOutOfRange(u8),

    #[error("unrecognized decision \"{}\"", .0.escape_ascii())]
    UnknownDecision([u8; 5]),

    #[error("name is empty")]
    EmptyName,

    #[error("invalid card (rank {rank}, suit {suit})")]
    InvalidCard { rank: u16, suit: u8 },

    #[error("unknown result code {0:#04x}")]
    UnknownResult(u8),

    #[error("unexpected result code {0:#04x}")]
    UnexpectedResult(u8),
}

/// Transport failures.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("connection closed by peer")]
    Disconnected,

    #[error("timed out waiting for peer")]
    Timeout,

    #[error("IO error: {0}")]
    Io(io::Error),
}

impl From<io::Error> for NetworkError {
    fn from(error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::UnexpectedEof
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::BrokenPipe => Self::Disconnected,
            io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => Self::Timeout,
            _ => Self::Io(error),
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("network error: {0}")]
    Network(#[from] NetworkError),

    #[error("round error: {0}")]
    Round(#[from] RoundError),
}

impl From<io::Error> for Error {
    fn from(error: io::Error) -> Self {
        Self::Network(error.into())
    }
}

impl Error {
    #[must_use]
    pub fn is_protocol(&self) -> bool {
        matches!(self, Self::Protocol(_))
    }

    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    #[must_use]
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}

/// Result type for network operations
pub type Result<T> = std::result::Result<T, Error>;
