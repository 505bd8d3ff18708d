//! A blocking TCP player client.
//!
//! Follows the dealer's message flow: three payloads for the deal, one
//! per hit, then the dealer's cards until a payload carries an outcome.

use log::debug;
use std::{
    fmt, io,
    net::{SocketAddr, TcpStream},
    thread,
    time::Duration,
};

use super::{
    super::game::{
        constants::BLACKJACK,
        entities::{Decision, Hand, Outcome},
    },
    codec::Codec,
    config::ProtocolConfig,
    errors::{Result, ValidationError},
    messages::{DecisionPayload, Request, ResultPayload},
    utils::{read_message, write_message},
};

/// What the player sees when asked for a decision.
#[derive(Debug)]
pub struct RoundView<'a> {
    pub player: &'a Hand,
    pub dealer: &'a Hand,
}

/// A finished round as the player saw it.
#[derive(Clone, Debug)]
pub struct RoundReport {
    pub outcome: Outcome,
    pub player: Hand,
    /// The dealer's visible cards. Includes the hole card unless the
    /// player busted first.
    pub dealer: Hand,
}

impl fmt::Display for RoundReport {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "you {}, dealer {}: {}", self.player, self.dealer, self.outcome)
    }
}

pub struct Client {
    pub stream: TcpStream,
    codec: Codec,
}

impl Client {
    /// Connect to a dealer, retrying a few times with growing timeouts
    /// (100ms, 500ms, 1s).
    ///
    /// # Errors
    ///
    /// Returns the last `NetworkError` if every attempt fails.
    pub fn connect(addr: &SocketAddr, config: &ProtocolConfig) -> Result<Self> {
        let mut connect_timeouts = vec![
            Duration::from_secs(1),
            Duration::from_millis(500),
            Duration::from_millis(100),
        ];
        let mut last_error = io::Error::from(io::ErrorKind::NotConnected);
        while let Some(connect_timeout) = connect_timeouts.pop() {
            match TcpStream::connect_timeout(addr, connect_timeout) {
                Ok(stream) => {
                    stream.set_read_timeout(Some(config.read_timeout))?;
                    stream.set_write_timeout(Some(config.write_timeout))?;
                    debug!("connected to {addr}");
                    return Ok(Self {
                        stream,
                        codec: config.codec(),
                    });
                }
                Err(error) => {
                    last_error = error;
                    thread::sleep(connect_timeout);
                }
            }
        }
        Err(last_error.into())
    }

    /// Ask for `rounds` rounds under `name`.
    pub fn request(&mut self, rounds: u8, name: &str) -> Result<()> {
        let request = Request {
            rounds,
            client_name: name.into(),
        };
        write_message(&mut self.stream, &self.codec, &request)
    }

    pub fn decide(&mut self, decision: Decision) -> Result<()> {
        write_message(&mut self.stream, &self.codec, &DecisionPayload { decision })
    }

    pub fn recv_result(&mut self) -> Result<ResultPayload> {
        read_message(&mut self.stream, &self.codec)
    }

    /// Play one round, asking `decide` whenever the dealer waits for a
    /// decision.
    pub fn play_round<F>(&mut self, mut decide: F) -> Result<RoundReport>
    where
        F: FnMut(&RoundView) -> Decision,
    {
        let mut player = Hand::new();
        let mut dealer = Hand::new();

        for i in 0..3 {
            let payload = self.recv_result()?;
            if i < 2 {
                player.push(payload.card);
            } else {
                dealer.push(payload.card);
            }
            if let Some(outcome) = payload.result.outcome() {
                // Only the dealer's up card may end the deal.
                if i < 2 {
                    return Err(ValidationError::UnexpectedResult(payload.result.code()).into());
                }
                return Ok(RoundReport {
                    outcome,
                    player,
                    dealer,
                });
            }
        }

        while player.sum() < u32::from(BLACKJACK) {
            let decision = decide(&RoundView {
                player: &player,
                dealer: &dealer,
            });
            self.decide(decision)?;
            if decision == Decision::Stand {
                break;
            }
            let payload = self.recv_result()?;
            player.push(payload.card);
            if let Some(outcome) = payload.result.outcome() {
                return Ok(RoundReport {
                    outcome,
                    player,
                    dealer,
                });
            }
        }

        loop {
            let payload = self.recv_result()?;
            dealer.push(payload.card);
            if let Some(outcome) = payload.result.outcome() {
                return Ok(RoundReport {
                    outcome,
                    player,
                    dealer,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        game::entities::{Card, Suit},
        net::messages::RoundResult,
    };
    use std::net::TcpListener;

    fn card(rank: u8, suit: Suit) -> Card {
        Card::new(rank, suit).unwrap()
    }

    fn pair() -> (Client, TcpStream) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let client = Client::connect(&addr, &ProtocolConfig::default()).unwrap();
        let (server, _) = listener.accept().unwrap();
        (client, server)
    }

    fn send(server: &mut TcpStream, payloads: &[(RoundResult, Card)]) {
        let codec = Codec::default();
        for &(result, card) in payloads {
            write_message(server, &codec, &ResultPayload { result, card }).unwrap();
        }
    }

    #[test]
    fn test_connect_refused() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let err = Client::connect(&addr, &ProtocolConfig::default()).err().unwrap();
        assert!(err.is_network());
    }

    #[test]
    fn test_request_bytes() {
        let (mut client, mut server) = pair();
        client.request(2, "Alice").unwrap();
        let request: Request = read_message(&mut server, &Codec::default()).unwrap();
        assert_eq!(request.rounds, 2);
        assert_eq!(request.client_name.to_string(), "Alice");
    }

    #[test]
    fn test_round_over_after_deal() {
        let (mut client, mut server) = pair();
        send(
            &mut server,
            &[
                (RoundResult::NotOver, card(1, Suit::Heart)),
                (RoundResult::NotOver, card(1, Suit::Club)),
                (RoundResult::Loss, card(9, Suit::Spade)),
            ],
        );
        let report = client
            .play_round(|_| panic!("no decision expected"))
            .unwrap();
        assert_eq!(report.outcome, Outcome::Loss);
        assert_eq!(report.player.sum(), 22);
    }

    #[test]
    fn test_early_outcome_rejected() {
        let (mut client, mut server) = pair();
        send(&mut server, &[(RoundResult::Win, card(1, Suit::Heart))]);
        let err = client.play_round(|_| Decision::Stand).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_stand_reads_dealer_cards() {
        let (mut client, mut server) = pair();
        send(
            &mut server,
            &[
                (RoundResult::NotOver, card(10, Suit::Heart)),
                (RoundResult::NotOver, card(9, Suit::Heart)),
                (RoundResult::NotOver, card(10, Suit::Spade)),
                (RoundResult::Tie, card(9, Suit::Club)),
            ],
        );
        let mut asked = 0;
        let report = client
            .play_round(|view| {
                asked += 1;
                assert_eq!(view.player.sum(), 19);
                assert_eq!(view.dealer.len(), 1);
                Decision::Stand
            })
            .unwrap();
        assert_eq!(asked, 1);
        assert_eq!(report.outcome, Outcome::Tie);
        assert_eq!(report.dealer.sum(), 19);

        let decision: DecisionPayload = read_message(&mut server, &Codec::default()).unwrap();
        assert_eq!(decision.decision, Decision::Stand);
    }

    #[test]
    fn test_report_display() {
        let mut player = Hand::new();
        player.push(card(1, Suit::Spade));
        player.push(card(13, Suit::Heart));
        let mut dealer = Hand::new();
        dealer.push(card(10, Suit::Club));
        let report = RoundReport {
            outcome: Outcome::Win,
            player,
            dealer,
        };
        assert_eq!(report.to_string(), "you [A♠, K♥] (21), dealer [10♣] (10): win");
    }
}
