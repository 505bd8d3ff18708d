//! Blackjack game engine - deck/hand model and the round FSM.
//!
//! This module provides:
//! - Cards, decks and hands with the table's fixed arithmetic (aces are 11)
//! - A type-safe finite state machine for one round of play
//! - Round events describing what the player is allowed to see

pub mod constants;
pub mod entities;
pub mod state_machine;
pub mod states;

pub use state_machine::{Round, RoundData, RoundError, RoundEvent, RoundState, RoundStateManagement};
