//! Table rules shared by the round engine and clients.

/// Number of distinct cards in a deck.
pub const DECK_SIZE: usize = 52;

/// Cards dealt to each party at the start of a round.
pub const INITIAL_HAND_SIZE: usize = 2;

/// Highest sum a hand can have without busting.
pub const BLACKJACK: u8 = 21;

/// The dealer keeps drawing while their sum is below this.
pub const DEALER_STANDS_ON: u8 = 17;

/// Lowest and highest valid card ranks (ace through king).
pub const MIN_RANK: u8 = 1;
pub const MAX_RANK: u8 = 13;
