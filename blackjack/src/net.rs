//! Networking layer for dealer-player communication.
//!
//! Every message is a fixed-size big-endian layout starting with a magic
//! cookie. Dealers advertise themselves over UDP and serve each player on
//! its own blocking TCP connection and thread.

/// Blocking TCP player client.
pub mod client;

/// Byte-exact message encoding and decoding.
pub mod codec;

/// Protocol constants and timeouts.
pub mod config;

/// UDP offer broadcaster and listener.
pub mod discovery;

pub mod errors;

/// Message types exchanged between dealer and player.
pub mod messages;

/// Connection dispatcher that runs one session per player.
pub mod server;

/// Per-connection game driver.
pub mod session;

/// Reading and writing whole messages on a stream.
pub mod utils;
