//! Blackjack round state machine.
//!
//! A round moves through `Dealing -> PlayerTurn -> DealerTurn -> Done`.
//! Each phase is its own type wrapped in [`Round`], and [`RoundState`]
//! is the enum that owns whichever phase is current. Transitions consume
//! the old phase and return the next one, so a round can never be in two
//! phases at once.

use enum_dispatch::enum_dispatch;
use log::debug;
use serde::{Deserialize, Serialize};
use std::{cmp::Ordering, collections::VecDeque, fmt};
use thiserror::Error;

use super::constants::{BLACKJACK, DEALER_STANDS_ON, INITIAL_HAND_SIZE};
use super::entities::{Card, Deck, Decision, Hand, Outcome};
use super::states::{DealerTurn, Dealing, Done, PlayerTurn};

/// Errors from driving a round incorrectly
#[derive(Debug, Deserialize, Eq, Error, PartialEq, Serialize)]
pub enum RoundError {
    #[error("not the player's turn")]
    NotPlayerTurn,
    #[error("deck ran out of cards")]
    DeckExhausted,
    #[error("round is not finished")]
    Unfinished,
}

/// Card movements and results the player is allowed to see, in the
/// order they happened.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum RoundEvent {
    PlayerCard(Card),
    DealerUpCard(Card),
    HoleCardRevealed(Card),
    DealerCard(Card),
    Finished(Outcome),
}

impl RoundEvent {
    /// The card this event shows, if any.
    #[must_use]
    pub fn card(&self) -> Option<Card> {
        match self {
            Self::PlayerCard(card)
            | Self::DealerUpCard(card)
            | Self::HoleCardRevealed(card)
            | Self::DealerCard(card) => Some(*card),
            Self::Finished(_) => None,
        }
    }
}

impl fmt::Display for RoundEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PlayerCard(card) => write!(f, "player drew {card}"),
            Self::DealerUpCard(card) => write!(f, "dealer shows {card}"),
            Self::HoleCardRevealed(card) => write!(f, "dealer reveals {card}"),
            Self::DealerCard(card) => write!(f, "dealer drew {card}"),
            Self::Finished(outcome) => write!(f, "round over: player {outcome}"),
        }
    }
}

/// Mutable round data shared across all phases
#[derive(Debug)]
pub struct RoundData {
    deck: Deck,
    player: Hand,
    dealer: Hand,
    hole_revealed: bool,
    events: VecDeque<RoundEvent>,
}

impl RoundData {
    fn new(deck: Deck) -> Self {
        Self {
            deck,
            player: Hand::new(),
            dealer: Hand::new(),
            hole_revealed: false,
            events: VecDeque::new(),
        }
    }

    fn draw(&mut self) -> Result<Card, RoundError> {
        self.deck.draw().ok_or(RoundError::DeckExhausted)
    }

    fn push_event(&mut self, event: RoundEvent) {
        debug!("{event}");
        self.events.push_back(event);
    }
}

/// Read access and event draining common to every phase
#[enum_dispatch]
pub trait RoundStateManagement {
    fn drain_events(&mut self) -> VecDeque<RoundEvent>;
    fn player_hand(&self) -> &Hand;
    /// The dealer's full hand, hole card included.
    fn dealer_hand(&self) -> &Hand;
    /// The dealer's cards as the player currently sees them.
    fn visible_dealer_cards(&self) -> &[Card];
    fn cards_left(&self) -> usize;
    /// Cards not dealt yet.
    fn deck(&self) -> &Deck;
}

/// A blackjack round in phase `T`.
#[derive(Debug)]
pub struct Round<T> {
    pub data: RoundData,
    pub state: T,
}

impl<T> RoundStateManagement for Round<T> {
    fn drain_events(&mut self) -> VecDeque<RoundEvent> {
        std::mem::take(&mut self.data.events)
    }

    fn player_hand(&self) -> &Hand {
        &self.data.player
    }

    fn dealer_hand(&self) -> &Hand {
        &self.data.dealer
    }

    fn visible_dealer_cards(&self) -> &[Card] {
        let cards = self.data.dealer.cards();
        if self.data.hole_revealed {
            cards
        } else {
            &cards[..cards.len().min(1)]
        }
    }

    fn cards_left(&self) -> usize {
        self.data.deck.len()
    }

    fn deck(&self) -> &Deck {
        &self.data.deck
    }
}

impl Round<Dealing> {
    #[must_use]
    pub fn new(deck: Deck) -> Self {
        Self {
            data: RoundData::new(deck),
            state: Dealing {},
        }
    }

    /// Deal two cards to the player, then two to the dealer with the
    /// second one face down.
    fn deal(mut self) -> Result<RoundState, RoundError> {
        for _ in 0..INITIAL_HAND_SIZE {
            let card = self.data.draw()?;
            self.data.player.push(card);
        }
        for _ in 0..INITIAL_HAND_SIZE {
            let card = self.data.draw()?;
            self.data.dealer.push(card);
        }
        for card in self.data.player.cards().to_vec() {
            self.data.push_event(RoundEvent::PlayerCard(card));
        }
        let up_card = self.data.dealer.cards()[0];
        self.data.push_event(RoundEvent::DealerUpCard(up_card));
        Ok(self.data.after_player_card())
    }
}

impl RoundData {
    /// Where the round goes after the player's hand changed. Below 21
    /// the player keeps deciding, exactly 21 stands automatically, and
    /// anything above is a bust.
    fn after_player_card(mut self) -> RoundState {
        match self.player.sum().cmp(&u32::from(BLACKJACK)) {
            Ordering::Less => Round {
                data: self,
                state: PlayerTurn {},
            }
            .into(),
            Ordering::Equal => Round {
                data: self,
                state: DealerTurn {},
            }
            .into(),
            Ordering::Greater => {
                self.push_event(RoundEvent::Finished(Outcome::Loss));
                Round {
                    data: self,
                    state: Done {
                        outcome: Outcome::Loss,
                    },
                }
                .into()
            }
        }
    }
}

impl Round<PlayerTurn> {
    fn take_decision(mut self, decision: Decision) -> Result<RoundState, RoundError> {
        match decision {
            Decision::Hit => {
                let card = self.data.draw()?;
                self.data.player.push(card);
                self.data.push_event(RoundEvent::PlayerCard(card));
                Ok(self.data.after_player_card())
            }
            Decision::Stand => Ok(Round {
                data: self.data,
                state: DealerTurn {},
            }
            .into()),
        }
    }
}

impl Round<DealerTurn> {
    /// Reveal the hole card and draw while below 17. No player input is
    /// involved.
    fn play_out(mut self) -> Result<Round<Done>, RoundError> {
        self.data.hole_revealed = true;
        if let Some(&hole) = self.data.dealer.cards().get(1) {
            self.data.push_event(RoundEvent::HoleCardRevealed(hole));
        }
        while self.data.dealer.sum() < u32::from(DEALER_STANDS_ON) {
            let card = self.data.draw()?;
            self.data.dealer.push(card);
            self.data.push_event(RoundEvent::DealerCard(card));
        }

        let player = self.data.player.sum();
        let dealer = self.data.dealer.sum();
        let outcome = if self.data.dealer.is_bust() {
            Outcome::Win
        } else {
            match player.cmp(&dealer) {
                Ordering::Greater => Outcome::Win,
                Ordering::Less => Outcome::Loss,
                Ordering::Equal => Outcome::Tie,
            }
        };
        self.data.push_event(RoundEvent::Finished(outcome));
        Ok(Round {
            data: self.data,
            state: Done { outcome },
        })
    }
}

/// The current phase of a round.
#[enum_dispatch(RoundStateManagement)]
#[derive(Debug)]
pub enum RoundState {
    Dealing(Round<Dealing>),
    PlayerTurn(Round<PlayerTurn>),
    DealerTurn(Round<DealerTurn>),
    Done(Round<Done>),
}

impl RoundState {
    /// A new round that will be dealt from `deck`.
    #[must_use]
    pub fn new(deck: Deck) -> Self {
        Round::<Dealing>::new(deck).into()
    }

    /// Perform the current phase's automatic transition. `PlayerTurn`
    /// and `Done` don't move on their own and are returned unchanged.
    pub fn step(self) -> Result<Self, RoundError> {
        match self {
            Self::Dealing(round) => round.deal(),
            Self::DealerTurn(round) => Ok(round.play_out()?.into()),
            state @ (Self::PlayerTurn(_) | Self::Done(_)) => Ok(state),
        }
    }

    /// Step until the round needs a decision or is over.
    pub fn advance(mut self) -> Result<Self, RoundError> {
        while !self.is_awaiting_decision() && !self.is_done() {
            self = self.step()?;
        }
        Ok(self)
    }

    /// Apply the player's decision. Only valid during `PlayerTurn`.
    pub fn take_decision(self, decision: Decision) -> Result<Self, RoundError> {
        match self {
            Self::PlayerTurn(round) => round.take_decision(decision),
            _ => Err(RoundError::NotPlayerTurn),
        }
    }

    #[must_use]
    pub fn is_awaiting_decision(&self) -> bool {
        matches!(self, Self::PlayerTurn(_))
    }

    #[must_use]
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done(_))
    }

    #[must_use]
    pub fn outcome(&self) -> Option<Outcome> {
        match self {
            Self::Done(round) => Some(round.state.outcome),
            _ => None,
        }
    }
}

impl fmt::Display for RoundState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Dealing(_) => "dealing",
            Self::PlayerTurn(_) => "player's turn",
            Self::DealerTurn(_) => "dealer's turn",
            Self::Done(_) => "done",
        };
        write!(f, "{repr}")
    }
}
