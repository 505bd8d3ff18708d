//! One connected player.
//!
//! A session reads a single Request, plays the requested number of rounds
//! and closes. Every card the player may see is sent as its own result
//! payload; all of them carry "round not over" except the last payload of
//! a round, which carries the outcome.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::{
    fmt,
    net::{Shutdown, TcpStream},
};

use super::{
    super::game::{
        RoundError, RoundEvent, RoundState, RoundStateManagement,
        entities::{DeckSource, Outcome},
    },
    codec::Codec,
    config::ProtocolConfig,
    errors::Result,
    messages::{DecisionPayload, Request, ResultPayload, RoundResult},
    utils::{read_message, write_message},
};

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum SessionState {
    AwaitingRequest,
    InRound { round: u8 },
    Closed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::AwaitingRequest => write!(f, "awaiting request"),
            Self::InRound { round } => write!(f, "in round {round}"),
            Self::Closed => write!(f, "closed"),
        }
    }
}

/// Tally of a finished session, from the player's point of view.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct SessionSummary {
    pub client_name: String,
    pub rounds_requested: u8,
    pub rounds_completed: u8,
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
}

impl SessionSummary {
    fn record(&mut self, outcome: Outcome) {
        self.rounds_completed += 1;
        match outcome {
            Outcome::Win => self.wins += 1,
            Outcome::Loss => self.losses += 1,
            Outcome::Tie => self.ties += 1,
        }
    }
}

impl fmt::Display for SessionSummary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} played {}/{} rounds ({} won, {} lost, {} tied)",
            self.client_name,
            self.rounds_completed,
            self.rounds_requested,
            self.wins,
            self.losses,
            self.ties
        )
    }
}

/// Drives the game for one TCP connection.
pub struct Session<D> {
    id: usize,
    stream: TcpStream,
    codec: Codec,
    config: ProtocolConfig,
    decks: D,
    state: SessionState,
    summary: SessionSummary,
}

impl<D: DeckSource> Session<D> {
    #[must_use]
    pub fn new(id: usize, stream: TcpStream, config: &ProtocolConfig, decks: D) -> Self {
        Self {
            id,
            stream,
            codec: config.codec(),
            config: config.clone(),
            decks,
            state: SessionState::AwaitingRequest,
            summary: SessionSummary::default(),
        }
    }

    #[must_use]
    pub const fn id(&self) -> usize {
        self.id
    }

    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Serve the connection until the requested rounds are done or
    /// something goes wrong. The connection is closed either way.
    ///
    /// # Errors
    ///
    /// Returns the error that aborted the session: a `ProtocolError` or
    /// `ValidationError` for bad input, a `NetworkError` for a timeout or
    /// a dropped connection.
    pub fn run(&mut self) -> Result<SessionSummary> {
        let result = self.serve();
        self.state = SessionState::Closed;
        // The peer may already be gone.
        let _ = self.stream.shutdown(Shutdown::Both);
        match result {
            Ok(()) => {
                info!("session {}: {}", self.id, self.summary);
                Ok(self.summary.clone())
            }
            Err(error) => {
                warn!(
                    "session {} aborted ({}): {error}",
                    self.id, self.state_before_close()
                );
                Err(error)
            }
        }
    }

    fn state_before_close(&self) -> String {
        if self.summary.client_name.is_empty() {
            "before request".into()
        } else {
            format!(
                "{} after {} round(s)",
                self.summary.client_name, self.summary.rounds_completed
            )
        }
    }

    fn serve(&mut self) -> Result<()> {
        self.stream
            .set_read_timeout(Some(self.config.request_timeout))?;
        self.stream
            .set_write_timeout(Some(self.config.write_timeout))?;

        let request: Request = read_message(&mut self.stream, &self.codec)?;
        request.validate()?;
        self.summary.client_name = request.client_name.to_string();
        self.summary.rounds_requested = request.rounds;
        info!(
            "session {}: {} wants to play {} round(s)",
            self.id, request.client_name, request.rounds
        );

        self.stream.set_read_timeout(Some(self.config.read_timeout))?;
        for round in 1..=request.rounds {
            self.state = SessionState::InRound { round };
            let outcome = self.play_round()?;
            debug!(
                "session {}: round {round}/{} {outcome}",
                self.id, request.rounds
            );
            self.summary.record(outcome);
        }
        Ok(())
    }

    /// Play one round on a fresh deck and return its outcome.
    pub fn play_round(&mut self) -> Result<Outcome> {
        let mut round = RoundState::new(self.decks.next_deck()).advance()?;
        loop {
            self.send_events(&mut round)?;
            if let Some(outcome) = round.outcome() {
                return Ok(outcome);
            }
            if !round.is_awaiting_decision() {
                return Err(RoundError::Unfinished.into());
            }
            let payload: DecisionPayload = read_message(&mut self.stream, &self.codec)?;
            debug!("session {}: player chose {}", self.id, payload.decision);
            round = round.take_decision(payload.decision)?.advance()?;
        }
    }

    /// Send one payload per newly visible card. If the round finished in
    /// this batch, the last card carries the outcome.
    fn send_events(&mut self, round: &mut RoundState) -> Result<()> {
        let events = round.drain_events();
        let outcome = events.iter().find_map(|event| match event {
            RoundEvent::Finished(outcome) => Some(*outcome),
            _ => None,
        });
        let cards: Vec<_> = events.iter().filter_map(RoundEvent::card).collect();
        for (i, &card) in cards.iter().enumerate() {
            let result = match outcome {
                Some(outcome) if i + 1 == cards.len() => RoundResult::from(outcome),
                _ => RoundResult::NotOver,
            };
            write_message(&mut self.stream, &self.codec, &ResultPayload { result, card })?;
        }
        Ok(())
    }
}
