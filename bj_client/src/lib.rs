//! Internal modules for the blackjack client.
//!
//! This library provides command parsing, statistics and the automatic
//! strategy used by the bj_client binary.

pub mod commands;
pub mod stats;
pub mod strategy;
