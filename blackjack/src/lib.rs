//! # Blackjack
//!
//! A networked blackjack dealer and player built around a type-safe round
//! state machine and a byte-exact binary protocol.
//!
//! Dealers announce themselves with UDP offers. A player connects over
//! TCP, asks for a number of rounds and plays them one decision at a
//! time. Each connection is served by its own session thread.
//!
//! A round moves through these phases:
//!
//! - **Dealing**: two cards to the player, two to the dealer (one hidden)
//! - **PlayerTurn**: hit or stand until standing, reaching 21 or busting
//! - **DealerTurn**: reveal the hole card and draw while below 17
//! - **Done**: the outcome from the player's point of view
//!
//! Aces are always worth 11.
//!
//! ## Core Modules
//!
//! - [`game`]: Cards, decks, hands and the round state machine
//! - [`net`]: Codec, discovery, sessions, the dealer and the player client
//!
//! ## Example
//!
//! ```
//! use blackjack::{RoundState, game::entities::Deck};
//!
//! // Deal a round from an unshuffled deck
//! let round = RoundState::new(Deck::default()).advance().unwrap();
//! assert!(round.is_awaiting_decision() || round.is_done());
//! ```

/// Networking components for dealer-player communication.
pub mod net;
pub use net::{
    client::Client,
    codec::Codec,
    config::ProtocolConfig,
    errors::{Error, Result},
    messages,
    server::{self, Dealer, DealerConfig, DealerHandle},
    utils,
};

/// Core game logic, entities, and state machine.
pub mod game;
pub use game::{
    RoundError, RoundEvent, RoundState, RoundStateManagement,
    constants,
    entities::{self, Card, Deck, DeckSource, Decision, Hand, Outcome, ShuffledDecks, Suit},
};
