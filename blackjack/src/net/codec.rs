//! Byte-exact encoding of protocol messages.
//!
//! Every message is a fixed-size, big-endian layout:
//!
//! ```text
//! Offer     cookie(4) type=0x2(1) tcp_port(2) server_name(32)   39 bytes
//! Request   cookie(4) type=0x3(1) rounds(1)   client_name(32)   38 bytes
//! Decision  cookie(4) type=0x4(1) decision(5)                   10 bytes
//! Result    cookie(4) type=0x4(1) result(1) rank(2) suit(1)      9 bytes
//! ```
//!
//! A message is only decoded once all of its bytes are available; there
//! is no partial decoding.

use super::{
    config::{MAGIC_COOKIE, ProtocolConfig},
    errors::{ProtocolError, Result},
    messages::{
        DecisionPayload, HEADER_LEN, Message, NAME_LEN, OFFER_TYPE, Offer, PAYLOAD_TYPE,
        PaddedName, REQUEST_TYPE, Request, ResultPayload, RoundResult,
    },
};

/// A message with a fixed type tag and size.
pub trait WireMessage: Sized {
    const TYPE: u8;
    /// Total encoded size, header included.
    const SIZE: usize;

    /// Write the fields following the header. `body` is exactly
    /// `SIZE - HEADER_LEN` bytes long.
    fn write_body(&self, body: &mut [u8]);

    /// Parse the fields following the header. `body` is exactly
    /// `SIZE - HEADER_LEN` bytes long.
    fn read_body(body: &[u8]) -> Result<Self>;
}

fn read_name(bytes: &[u8]) -> PaddedName {
    let mut raw = [0; NAME_LEN];
    raw.copy_from_slice(&bytes[..NAME_LEN]);
    PaddedName::from_raw(raw)
}

impl WireMessage for Offer {
    const TYPE: u8 = OFFER_TYPE;
    const SIZE: usize = HEADER_LEN + 2 + NAME_LEN;

    fn write_body(&self, body: &mut [u8]) {
        body[..2].copy_from_slice(&self.tcp_port.to_be_bytes());
        body[2..].copy_from_slice(self.server_name.raw());
    }

    fn read_body(body: &[u8]) -> Result<Self> {
        Ok(Self {
            tcp_port: u16::from_be_bytes([body[0], body[1]]),
            server_name: read_name(&body[2..]),
        })
    }
}

impl WireMessage for Request {
    const TYPE: u8 = REQUEST_TYPE;
    const SIZE: usize = HEADER_LEN + 1 + NAME_LEN;

    fn write_body(&self, body: &mut [u8]) {
        body[0] = self.rounds;
        body[1..].copy_from_slice(self.client_name.raw());
    }

    fn read_body(body: &[u8]) -> Result<Self> {
        Ok(Self {
            rounds: body[0],
            client_name: read_name(&body[1..]),
        })
    }
}

impl WireMessage for DecisionPayload {
    const TYPE: u8 = PAYLOAD_TYPE;
    const SIZE: usize = HEADER_LEN + 5;

    fn write_body(&self, body: &mut [u8]) {
        body.copy_from_slice(&self.token());
    }

    fn read_body(body: &[u8]) -> Result<Self> {
        let mut token = [0; 5];
        token.copy_from_slice(body);
        Self::from_token(token)
    }
}

impl WireMessage for ResultPayload {
    const TYPE: u8 = PAYLOAD_TYPE;
    const SIZE: usize = HEADER_LEN + 4;

    fn write_body(&self, body: &mut [u8]) {
        body[0] = self.result.code();
        body[1..3].copy_from_slice(&u16::from(self.card.rank()).to_be_bytes());
        body[3] = self.card.suit().code();
    }

    fn read_body(body: &[u8]) -> Result<Self> {
        let result = RoundResult::from_code(body[0])?;
        let card = Self::card_from_wire(u16::from_be_bytes([body[1], body[2]]), body[3])?;
        Ok(Self { result, card })
    }
}

/// Encodes and decodes messages stamped with one magic cookie.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Codec {
    magic_cookie: u32,
}

impl Default for Codec {
    fn default() -> Self {
        Self {
            magic_cookie: MAGIC_COOKIE,
        }
    }
}

impl Codec {
    #[must_use]
    pub fn new(config: &ProtocolConfig) -> Self {
        Self {
            magic_cookie: config.magic_cookie,
        }
    }

    #[must_use]
    pub const fn magic_cookie(&self) -> u32 {
        self.magic_cookie
    }

    #[must_use]
    pub fn encode<M: WireMessage>(&self, msg: &M) -> Vec<u8> {
        let mut buf = vec![0; M::SIZE];
        buf[..4].copy_from_slice(&self.magic_cookie.to_be_bytes());
        buf[4] = M::TYPE;
        msg.write_body(&mut buf[HEADER_LEN..]);
        buf
    }

    #[must_use]
    pub fn encode_message(&self, msg: &Message) -> Vec<u8> {
        match msg {
            Message::Offer(offer) => self.encode(offer),
            Message::Request(request) => self.encode(request),
            Message::Decision(payload) => self.encode(payload),
            Message::Result(payload) => self.encode(payload),
        }
    }

    /// Decode a message of a known kind.
    ///
    /// # Errors
    ///
    /// Returns a `ProtocolError` if the cookie, type tag or length is
    /// wrong, and a `ValidationError` if a field holds an unknown value.
    pub fn decode<M: WireMessage>(&self, buf: &[u8]) -> Result<M> {
        let msg_type = self.check_header(buf, M::SIZE)?;
        if msg_type != M::TYPE {
            return Err(ProtocolError::InvalidType(msg_type).into());
        }
        check_len(buf, M::SIZE)?;
        M::read_body(&buf[HEADER_LEN..])
    }

    /// Decode any message. Decision and result payloads share a type tag
    /// and are told apart by length.
    ///
    /// # Errors
    ///
    /// Same as [`Codec::decode`].
    pub fn decode_message(&self, buf: &[u8]) -> Result<Message> {
        let msg_type = self.check_header(buf, HEADER_LEN)?;
        match msg_type {
            OFFER_TYPE => self.decode(buf).map(Message::Offer),
            REQUEST_TYPE => self.decode(buf).map(Message::Request),
            PAYLOAD_TYPE if buf.len() == ResultPayload::SIZE => {
                self.decode(buf).map(Message::Result)
            }
            PAYLOAD_TYPE => self.decode(buf).map(Message::Decision),
            other => Err(ProtocolError::InvalidType(other).into()),
        }
    }

    /// Validate the cookie and return the type tag. The cookie is checked
    /// as soon as its 4 bytes are there.
    fn check_header(&self, buf: &[u8], expected: usize) -> Result<u8> {
        if let [a, b, c, d, ..] = *buf {
            let cookie = u32::from_be_bytes([a, b, c, d]);
            if cookie != self.magic_cookie {
                return Err(ProtocolError::InvalidMagicCookie(cookie).into());
            }
        }
        match buf.get(4) {
            Some(&msg_type) => Ok(msg_type),
            None => Err(ProtocolError::InvalidLength {
                expected,
                actual: buf.len(),
            }
            .into()),
        }
    }
}

fn check_len(buf: &[u8], expected: usize) -> Result<()> {
    if buf.len() != expected {
        return Err(ProtocolError::InvalidLength {
            expected,
            actual: buf.len(),
        }
        .into());
    }
    Ok(())
}
