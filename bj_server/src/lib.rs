//! Blackjack dealer server.

pub mod config;
