use rand::{Rng, SeedableRng, rngs::StdRng, seq::SliceRandom};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::constants::{BLACKJACK, DECK_SIZE, MAX_RANK, MIN_RANK};

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Suit {
    Heart,
    Diamond,
    Club,
    Spade,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Heart, Suit::Diamond, Suit::Club, Suit::Spade];

    /// Wire code of the suit (hearts=0 ... spades=3).
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Heart => 0,
            Self::Diamond => 1,
            Self::Club => 2,
            Self::Spade => 3,
        }
    }

    #[must_use]
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Heart),
            1 => Some(Self::Diamond),
            2 => Some(Self::Club),
            3 => Some(Self::Spade),
            _ => None,
        }
    }
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Heart => "♥",
            Self::Diamond => "♦",
            Self::Club => "♣",
            Self::Spade => "♠",
        };
        write!(f, "{repr}")
    }
}

/// Placeholder for card ranks (ace=1u8 ... king=13u8).
pub type Rank = u8;

/// A card is a rank in `1..=13` and a suit. Construct through
/// [`Card::new`] so the rank range always holds.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Card {
    rank: Rank,
    suit: Suit,
}

impl Card {
    #[must_use]
    pub const fn new(rank: Rank, suit: Suit) -> Option<Self> {
        if rank < MIN_RANK || rank > MAX_RANK {
            return None;
        }
        Some(Self { rank, suit })
    }

    #[must_use]
    pub const fn rank(&self) -> Rank {
        self.rank
    }

    #[must_use]
    pub const fn suit(&self) -> Suit {
        self.suit
    }

    /// Points the card adds to a hand. Aces are always worth 11; there
    /// is no soft ace.
    #[must_use]
    pub const fn value(&self) -> u8 {
        match self.rank {
            1 => 11,
            11..=13 => 10,
            rank => rank,
        }
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.rank {
            1 => write!(f, "A{}", self.suit),
            11 => write!(f, "J{}", self.suit),
            12 => write!(f, "Q{}", self.suit),
            13 => write!(f, "K{}", self.suit),
            rank => write!(f, "{rank}{}", self.suit),
        }
    }
}

/// A player's choice during their turn.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum Decision {
    Hit,
    Stand,
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Hit => "hit",
            Self::Stand => "stand",
        };
        write!(f, "{repr}")
    }
}

/// How a finished round went, from the player's point of view.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum Outcome {
    Tie,
    Loss,
    Win,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Tie => "tie",
            Self::Loss => "loss",
            Self::Win => "win",
        };
        write!(f, "{repr}")
    }
}

/// An ordered pile of distinct cards. Cards are drawn from the top.
#[derive(Clone, Debug)]
pub struct Deck {
    // The top of the deck is the end of the vec.
    cards: Vec<Card>,
}

impl Deck {
    /// A fresh deck shuffled with the given RNG.
    pub fn shuffled<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut deck = Self::default();
        deck.cards.shuffle(rng);
        deck
    }

    /// A deck that deals `cards` in the given order, first card first.
    /// Mostly useful for replaying a known shuffle.
    #[must_use]
    pub fn stacked(cards: impl IntoIterator<Item = Card>) -> Self {
        let mut cards: Vec<Card> = cards.into_iter().collect();
        cards.reverse();
        Self { cards }
    }

    pub fn draw(&mut self) -> Option<Card> {
        self.cards.pop()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Cards remaining, top card first.
    pub fn iter(&self) -> impl Iterator<Item = &Card> {
        self.cards.iter().rev()
    }
}

impl Default for Deck {
    /// An unshuffled deck, aces first.
    fn default() -> Self {
        let mut cards = Vec::with_capacity(DECK_SIZE);
        for rank in MIN_RANK..=MAX_RANK {
            for suit in Suit::ALL {
                cards.push(Card { rank, suit });
            }
        }
        cards.reverse();
        Self { cards }
    }
}

/// Produces a fresh deck for every round.
pub trait DeckSource {
    fn next_deck(&mut self) -> Deck;
}

impl<F: FnMut() -> Deck> DeckSource for F {
    fn next_deck(&mut self) -> Deck {
        self()
    }
}

/// Randomly shuffled decks.
#[derive(Debug)]
pub struct ShuffledDecks {
    rng: StdRng,
}

impl ShuffledDecks {
    /// Decks shuffled from OS entropy.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// A reproducible sequence of shuffles.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for ShuffledDecks {
    fn default() -> Self {
        Self::new()
    }
}

impl DeckSource for ShuffledDecks {
    fn next_deck(&mut self) -> Deck {
        Deck::shuffled(&mut self.rng)
    }
}

/// Cards held by one party for the current round.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Hand {
    cards: Vec<Card>,
}

impl Hand {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, card: Card) {
        self.cards.push(card);
    }

    #[must_use]
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Sum of card values. Recomputed on every call.
    #[must_use]
    pub fn sum(&self) -> u32 {
        self.cards.iter().map(|c| u32::from(c.value())).sum()
    }

    #[must_use]
    pub fn is_bust(&self) -> bool {
        self.sum() > u32::from(BLACKJACK)
    }
}

impl fmt::Display for Hand {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let cards: Vec<String> = self.cards.iter().map(Card::to_string).collect();
        write!(f, "[{}] ({})", cards.join(", "), self.sum())
    }
}
