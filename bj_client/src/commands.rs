use blackjack::Decision;
use std::fmt;

/// Something the player typed at a prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Decide(Decision),
    Help,
    Quit,
}

/// Errors that can occur during command parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Nothing was typed.
    Empty,
    /// Rounds outside 1-255 or not a number.
    InvalidRounds(String),
    /// Unrecognized command.
    UnrecognizedCommand(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "Type 'h' to hit or 's' to stand"),
            Self::InvalidRounds(value) => write!(
                f,
                "Invalid number of rounds '{value}'. Must be between 1 and 255"
            ),
            Self::UnrecognizedCommand(cmd) => write!(
                f,
                "Unrecognized command '{cmd}'. Type 'help' to see available commands"
            ),
        }
    }
}

impl std::error::Error for ParseError {}

pub const COMMANDS_HELP: &str = "\
  h, hit      Take another card
  s, stand    Keep your hand
  help        Show this message
  q, quit     Leave the table";

/// Parse a command typed during the player's turn.
///
/// # Examples
///
/// ```
/// use bj_client::commands::{Command, parse_command};
/// use blackjack::Decision;
///
/// assert_eq!(parse_command("h"), Ok(Command::Decide(Decision::Hit)));
/// assert_eq!(parse_command(" Stand "), Ok(Command::Decide(Decision::Stand)));
/// ```
pub fn parse_command(input: &str) -> Result<Command, ParseError> {
    let trimmed = input.trim();
    match trimmed.to_ascii_lowercase().as_str() {
        "" => Err(ParseError::Empty),
        "h" | "hit" => Ok(Command::Decide(Decision::Hit)),
        "s" | "stand" => Ok(Command::Decide(Decision::Stand)),
        "help" | "?" => Ok(Command::Help),
        "q" | "quit" | "exit" => Ok(Command::Quit),
        _ => Err(ParseError::UnrecognizedCommand(trimmed.to_string())),
    }
}

/// Parse the number of rounds to request.
pub fn parse_rounds(input: &str) -> Result<u8, ParseError> {
    let trimmed = input.trim();
    match trimmed.parse::<u8>() {
        Ok(rounds) if rounds > 0 => Ok(rounds),
        _ => Err(ParseError::InvalidRounds(trimmed.to_string())),
    }
}

/// Parse a yes/no answer. Anything that isn't a clear yes is a no.
pub fn parse_yes(input: &str) -> bool {
    matches!(input.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
