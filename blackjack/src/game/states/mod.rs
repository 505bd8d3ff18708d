//! Round state definitions for the blackjack FSM.
//!
//! Each state represents a specific phase of a single round.

use serde::{Deserialize, Serialize};

use crate::game::entities::Outcome;

/// Shuffling and dealing the opening hands
#[derive(Debug)]
pub struct Dealing {}

/// Waiting for the player to hit or stand
#[derive(Debug)]
pub struct PlayerTurn {}

/// Revealing the hole card and drawing to 17
#[derive(Debug)]
pub struct DealerTurn {}

/// Round finished with a known outcome
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct Done {
    pub outcome: Outcome,
}
