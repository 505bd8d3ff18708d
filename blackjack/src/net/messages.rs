use serde::{Deserialize, Serialize};
use std::{borrow::Cow, fmt};

use super::{
    super::game::entities::{Card, Decision, Outcome, Suit},
    errors::{Result, ValidationError},
};

/// Type tag of an Offer.
pub const OFFER_TYPE: u8 = 0x2;
/// Type tag of a Request.
pub const REQUEST_TYPE: u8 = 0x3;
/// Type tag shared by Decision and Result payloads.
pub const PAYLOAD_TYPE: u8 = 0x4;

/// Cookie plus type tag.
pub const HEADER_LEN: usize = 5;

/// Fixed width of every name field.
pub const NAME_LEN: usize = 32;

pub const HIT_TOKEN: [u8; 5] = *b"Hittt";
pub const STAND_TOKEN: [u8; 5] = *b"Stand";

/// A name stored in a fixed 32-byte field. Shorter names are zero padded
/// and longer ones truncated to 32 bytes. Reading the name back strips
/// the trailing zero bytes.
#[derive(Clone, Copy, Eq, Hash, PartialEq)]
pub struct PaddedName([u8; NAME_LEN]);

impl PaddedName {
    #[must_use]
    pub fn new(name: &str) -> Self {
        let bytes = name.as_bytes();
        let len = bytes.len().min(NAME_LEN);
        let mut raw = [0; NAME_LEN];
        raw[..len].copy_from_slice(&bytes[..len]);
        Self(raw)
    }

    #[must_use]
    pub const fn from_raw(raw: [u8; NAME_LEN]) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn raw(&self) -> &[u8; NAME_LEN] {
        &self.0
    }

    /// Name bytes without the trailing zero padding.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        let len = self.0.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
        &self.0[..len]
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.as_bytes().is_empty()
    }

    /// The name as text. Bytes that aren't valid UTF-8 (e.g. a character
    /// cut in half by truncation) are replaced.
    #[must_use]
    pub fn to_string_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(self.as_bytes())
    }
}

impl From<&str> for PaddedName {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl fmt::Debug for PaddedName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", self.to_string_lossy())
    }
}

impl fmt::Display for PaddedName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.to_string_lossy())
    }
}

/// Result codes carried by a result payload.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum RoundResult {
    NotOver,
    Tie,
    Loss,
    Win,
}

impl RoundResult {
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::NotOver => 0x0,
            Self::Tie => 0x1,
            Self::Loss => 0x2,
            Self::Win => 0x3,
        }
    }

    pub fn from_code(code: u8) -> Result<Self> {
        match code {
            0x0 => Ok(Self::NotOver),
            0x1 => Ok(Self::Tie),
            0x2 => Ok(Self::Loss),
            0x3 => Ok(Self::Win),
            code => Err(ValidationError::UnknownResult(code).into()),
        }
    }

    /// The round's outcome, or `None` if the round continues.
    #[must_use]
    pub const fn outcome(self) -> Option<Outcome> {
        match self {
            Self::NotOver => None,
            Self::Tie => Some(Outcome::Tie),
            Self::Loss => Some(Outcome::Loss),
            Self::Win => Some(Outcome::Win),
        }
    }
}

impl From<Outcome> for RoundResult {
    fn from(value: Outcome) -> Self {
        match value {
            Outcome::Tie => Self::Tie,
            Outcome::Loss => Self::Loss,
            Outcome::Win => Self::Win,
        }
    }
}

impl fmt::Display for RoundResult {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::NotOver => "round not over",
            Self::Tie => "tie",
            Self::Loss => "loss",
            Self::Win => "win",
        };
        write!(f, "{repr}")
    }
}

/// UDP advertisement of a dealer's TCP port.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Offer {
    pub tcp_port: u16,
    pub server_name: PaddedName,
}

/// A client asking to play some rounds.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Request {
    pub rounds: u8,
    pub client_name: PaddedName,
}

impl Request {
    /// Check the fields the dealer relies on: at least one round and a
    /// non-empty name.
    pub fn validate(&self) -> Result<()> {
        if self.rounds == 0 {
            return Err(ValidationError::RoundsOutOfRange(self.rounds).into());
        }
        if self.client_name.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        Ok(())
    }
}

/// A player's hit or stand.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct DecisionPayload {
    pub decision: Decision,
}

impl DecisionPayload {
    #[must_use]
    pub const fn token(&self) -> [u8; 5] {
        match self.decision {
            Decision::Hit => HIT_TOKEN,
            Decision::Stand => STAND_TOKEN,
        }
    }

    pub fn from_token(token: [u8; 5]) -> Result<Self> {
        let decision = match token {
            HIT_TOKEN => Decision::Hit,
            STAND_TOKEN => Decision::Stand,
            other => return Err(ValidationError::UnknownDecision(other).into()),
        };
        Ok(Self { decision })
    }
}

/// A card shown to the player plus the round's status after it.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ResultPayload {
    pub result: RoundResult,
    pub card: Card,
}

impl ResultPayload {
    /// Rebuild a card from its wire fields.
    pub fn card_from_wire(rank: u16, suit: u8) -> Result<Card> {
        u8::try_from(rank)
            .ok()
            .zip(Suit::from_code(suit))
            .and_then(|(rank, suit)| Card::new(rank, suit))
            .ok_or_else(|| ValidationError::InvalidCard { rank, suit }.into())
    }
}

/// Any protocol message.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Message {
    Offer(Offer),
    Request(Request),
    Decision(DecisionPayload),
    Result(ResultPayload),
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Offer(offer) => {
                write!(f, "offer from {} on port {}", offer.server_name, offer.tcp_port)
            }
            Self::Request(request) => {
                write!(f, "{} requested {} rounds", request.client_name, request.rounds)
            }
            Self::Decision(payload) => write!(f, "decision: {}", payload.decision),
            Self::Result(payload) => write!(f, "{} ({})", payload.card, payload.result),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // === PaddedName Tests ===

    #[test]
    fn test_name_is_zero_padded() {
        let name = PaddedName::new("Alice");
        assert_eq!(&name.raw()[..5], b"Alice");
        assert!(name.raw()[5..].iter().all(|&b| b == 0));
        assert_eq!(name.as_bytes(), b"Alice");
        assert_eq!(name.to_string(), "Alice");
    }

    #[test]
    fn test_long_name_is_truncated() {
        let long = "x".repeat(40);
        let name = PaddedName::new(&long);
        assert_eq!(name.as_bytes().len(), NAME_LEN);
        assert_eq!(name.to_string(), "x".repeat(32));
    }

    #[test]
    fn test_exactly_32_bytes_kept() {
        let exact = "y".repeat(NAME_LEN);
        assert_eq!(PaddedName::new(&exact).to_string(), exact);
    }

    #[test]
    fn test_empty_name() {
        assert!(PaddedName::new("").is_empty());
        assert!(PaddedName::from_raw([0; NAME_LEN]).is_empty());
    }

    #[test]
    fn test_interior_zero_kept() {
        let mut raw = [0; NAME_LEN];
        raw[..4].copy_from_slice(b"ab\0c");
        assert_eq!(PaddedName::from_raw(raw).as_bytes(), b"ab\0c");
    }

    // === RoundResult Tests ===

    #[test]
    fn test_result_codes() {
        assert_eq!(RoundResult::NotOver.code(), 0);
        assert_eq!(RoundResult::Tie.code(), 1);
        assert_eq!(RoundResult::Loss.code(), 2);
        assert_eq!(RoundResult::Win.code(), 3);
        for code in 0..=3 {
            assert_eq!(RoundResult::from_code(code).unwrap().code(), code);
        }
        assert!(RoundResult::from_code(4).unwrap_err().is_validation());
    }

    #[test]
    fn test_result_outcome() {
        assert_eq!(RoundResult::NotOver.outcome(), None);
        assert_eq!(RoundResult::from(Outcome::Win), RoundResult::Win);
        assert_eq!(RoundResult::Loss.outcome(), Some(Outcome::Loss));
    }

    // === Request Tests ===

    #[test]
    fn test_request_validation() {
        let ok = Request {
            rounds: 1,
            client_name: "Alice".into(),
        };
        assert!(ok.validate().is_ok());

        let zero = Request {
            rounds: 0,
            client_name: "Alice".into(),
        };
        assert!(zero.validate().unwrap_err().is_validation());

        let nameless = Request {
            rounds: 255,
            client_name: "".into(),
        };
        assert!(nameless.validate().unwrap_err().is_validation());
    }

    // === Decision Tests ===

    #[test]
    fn test_decision_tokens() {
        assert_eq!(
            DecisionPayload::from_token(*b"Hittt").unwrap().decision,
            Decision::Hit
        );
        assert_eq!(
            DecisionPayload::from_token(*b"Stand").unwrap().decision,
            Decision::Stand
        );
        assert_eq!(
            DecisionPayload {
                decision: Decision::Hit
            }
            .token(),
            *b"Hittt"
        );
    }

    #[test]
    fn test_unknown_decision_token() {
        for token in [*b"hittt", *b"Hit  ", *b"stand", *b"\0\0\0\0\0"] {
            assert!(DecisionPayload::from_token(token).unwrap_err().is_validation());
        }
    }

    #[test]
    fn test_card_from_wire() {
        let card = ResultPayload::card_from_wire(13, 3).unwrap();
        assert_eq!(card.rank(), 13);
        assert_eq!(card.suit(), Suit::Spade);
        assert!(ResultPayload::card_from_wire(0, 0).is_err());
        assert!(ResultPayload::card_from_wire(14, 0).is_err());
        assert!(ResultPayload::card_from_wire(256 + 1, 0).is_err());
        assert!(ResultPayload::card_from_wire(1, 4).is_err());
    }

    #[test]
    fn test_message_display() {
        let msg = Message::Request(Request {
            rounds: 3,
            client_name: "Bob".into(),
        });
        assert_eq!(msg.to_string(), "Bob requested 3 rounds");
    }
}
