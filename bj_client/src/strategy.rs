use blackjack::{Decision, Hand, constants::DEALER_STANDS_ON};

/// Play like the dealer: hit below 17, stand otherwise.
#[must_use]
pub fn stand_on_17(hand: &Hand) -> Decision {
    if hand.sum() < u32::from(DEALER_STANDS_ON) {
        Decision::Hit
    } else {
        Decision::Stand
    }
}
