/// Integration tests for the round engine
///
/// These drive whole rounds through `RoundState` with stacked and
/// seeded decks and check the card bookkeeping and dealer rules.
use blackjack::{
    RoundEvent, RoundState, RoundStateManagement,
    game::entities::{Card, Deck, DeckSource, Decision, Hand, Outcome, ShuffledDecks, Suit},
};
use std::collections::HashSet;

fn card(rank: u8, suit: Suit) -> Card {
    Card::new(rank, suit).unwrap()
}

fn play(mut round: RoundState, mut strategy: impl FnMut(&Hand) -> Decision) -> RoundState {
    round = round.advance().unwrap();
    while round.is_awaiting_decision() {
        let decision = strategy(round.player_hand());
        round = round.take_decision(decision).unwrap().advance().unwrap();
    }
    round
}

fn dealt_cards(round: &RoundState) -> usize {
    round.player_hand().len() + round.dealer_hand().len()
}

// === Hand Value Tests ===

#[test]
fn test_ace_king_is_21() {
    let mut hand = Hand::new();
    hand.push(card(1, Suit::Spade));
    hand.push(card(13, Suit::Heart));
    assert_eq!(hand.sum(), 21);
}

#[test]
fn test_two_aces_is_22() {
    let mut hand = Hand::new();
    hand.push(card(1, Suit::Spade));
    hand.push(card(1, Suit::Heart));
    assert_eq!(hand.sum(), 22);
    assert!(hand.is_bust());
}

// === Full Round Tests ===

#[test]
fn test_alice_round() {
    let deck = Deck::stacked([
        card(2, Suit::Heart),
        card(5, Suit::Heart),
        card(10, Suit::Spade),
        card(6, Suit::Club),
        card(10, Suit::Diamond),
        card(9, Suit::Heart),
    ]);
    let mut round = RoundState::new(deck).advance().unwrap();
    assert_eq!(round.player_hand().sum(), 7);
    assert_eq!(round.visible_dealer_cards(), &[card(10, Suit::Spade)]);
    round.drain_events();

    let mut round = round.take_decision(Decision::Hit).unwrap().advance().unwrap();
    assert_eq!(round.player_hand().sum(), 17);
    assert_eq!(
        round.drain_events().into_iter().collect::<Vec<_>>(),
        vec![RoundEvent::PlayerCard(card(10, Suit::Diamond))]
    );

    let mut round = round.take_decision(Decision::Stand).unwrap().advance().unwrap();
    assert_eq!(round.outcome(), Some(Outcome::Win));
    assert_eq!(round.dealer_hand().sum(), 25);
    assert_eq!(
        round.drain_events().into_iter().collect::<Vec<_>>(),
        vec![
            RoundEvent::HoleCardRevealed(card(6, Suit::Club)),
            RoundEvent::DealerCard(card(9, Suit::Heart)),
            RoundEvent::Finished(Outcome::Win),
        ]
    );
}

#[test]
fn test_deck_conservation() {
    let mut decks = ShuffledDecks::seeded(42);
    for _ in 0..50 {
        let round = play(RoundState::new(decks.next_deck()), |hand| {
            if hand.sum() < 15 {
                Decision::Hit
            } else {
                Decision::Stand
            }
        });
        assert_eq!(round.cards_left(), 52 - dealt_cards(&round));

        let mut seen = HashSet::new();
        let all = round
            .deck()
            .iter()
            .chain(round.player_hand().cards())
            .chain(round.dealer_hand().cards());
        for card in all {
            assert!(seen.insert(*card), "{card} appears twice");
        }
        assert_eq!(seen.len(), 52);
    }
}

#[test]
fn test_seeded_dealer_never_stands_below_17() {
    for seed in 0..200 {
        let mut decks = ShuffledDecks::seeded(seed);
        let round = play(RoundState::new(decks.next_deck()), |_| Decision::Stand);
        if round.player_hand().is_bust() {
            // Ace+Ace busts at the deal and the dealer never plays.
            assert_eq!(round.dealer_hand().len(), 2, "seed {seed}");
            assert_eq!(round.outcome(), Some(Outcome::Loss), "seed {seed}");
            continue;
        }
        let dealer = round.dealer_hand().sum();
        assert!(dealer >= 17, "seed {seed}: dealer stood on {dealer}");
        if dealer > 21 {
            assert_eq!(round.outcome(), Some(Outcome::Win), "seed {seed}");
        }
    }
}

#[test]
fn test_player_bust_skips_dealer() {
    for seed in 0..100 {
        let mut decks = ShuffledDecks::seeded(seed);
        let round = play(RoundState::new(decks.next_deck()), |_| Decision::Hit);
        assert!(round.is_done());
        if round.player_hand().is_bust() {
            assert_eq!(round.outcome(), Some(Outcome::Loss));
            assert_eq!(round.dealer_hand().len(), 2, "seed {seed}");
            assert_eq!(round.visible_dealer_cards().len(), 1);
        } else {
            // Hitting stops only at exactly 21.
            assert_eq!(round.player_hand().sum(), 21);
        }
    }
}

#[test]
fn test_same_seed_same_round() {
    let a = play(
        RoundState::new(ShuffledDecks::seeded(7).next_deck()),
        |_| Decision::Stand,
    );
    let b = play(
        RoundState::new(ShuffledDecks::seeded(7).next_deck()),
        |_| Decision::Stand,
    );
    assert_eq!(a.player_hand(), b.player_hand());
    assert_eq!(a.dealer_hand(), b.dealer_hand());
    assert_eq!(a.outcome(), b.outcome());
}

#[test]
fn test_events_show_every_visible_card() {
    let mut decks = ShuffledDecks::seeded(3);
    for _ in 0..20 {
        let mut round = RoundState::new(decks.next_deck()).advance().unwrap();
        let mut shown: Vec<Card> = Vec::new();
        loop {
            shown.extend(round.drain_events().iter().filter_map(RoundEvent::card));
            if round.is_done() {
                break;
            }
            round = round.take_decision(Decision::Stand).unwrap().advance().unwrap();
        }
        let mut expected = round.player_hand().cards().to_vec();
        expected.extend_from_slice(round.visible_dealer_cards());
        shown.sort();
        expected.sort();
        assert_eq!(shown, expected);
    }
}
