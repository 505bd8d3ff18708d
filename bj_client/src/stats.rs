use blackjack::Outcome;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Results across every round played in this run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
}

impl Stats {
    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Win => self.wins += 1,
            Outcome::Loss => self.losses += 1,
            Outcome::Tie => self.ties += 1,
        }
    }

    #[must_use]
    pub fn rounds(&self) -> u32 {
        self.wins + self.losses + self.ties
    }

    /// Fraction of rounds won, 0 before the first round.
    #[must_use]
    pub fn win_rate(&self) -> f64 {
        match self.rounds() {
            0 => 0.0,
            rounds => f64::from(self.wins) / f64::from(rounds),
        }
    }
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} round(s): {} won, {} lost, {} tied (win rate {:.1}%)",
            self.rounds(),
            self.wins,
            self.losses,
            self.ties,
            self.win_rate() * 100.0
        )
    }
}
