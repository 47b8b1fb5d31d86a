//! Domain Value Objects
//!
//! Immutable value types for the game domain.

use crate::error::{GameError, GameResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Maximum accepted length of an opaque session id
pub const SESSION_ID_MAX_LENGTH: usize = 128;

/// Length of a shared challenge code
pub const CHALLENGE_CODE_LENGTH: usize = 6;

/// Game mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    /// Endless; score is the cumulative absolute price error
    Zero,
    /// Ends on the first guess outside the tolerance band
    Streak,
    /// Fixed number of listings with cumulative points
    Challenge,
}

impl GameMode {
    pub const ALL: [GameMode; 3] = [GameMode::Zero, GameMode::Streak, GameMode::Challenge];

    pub fn as_str(&self) -> &'static str {
        match self {
            GameMode::Zero => "zero",
            GameMode::Streak => "streak",
            GameMode::Challenge => "challenge",
        }
    }

    /// Zero mode ranks ascending (less total error wins)
    pub fn lower_is_better(&self) -> bool {
        matches!(self, GameMode::Zero)
    }
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GameMode {
    type Err = GameError;

    fn from_str(s: &str) -> GameResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "zero" => Ok(GameMode::Zero),
            "streak" => Ok(GameMode::Streak),
            "challenge" => Ok(GameMode::Challenge),
            other => Err(GameError::InvalidInput(format!("unknown game mode '{other}'"))),
        }
    }
}

/// Difficulty tier of a listing pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = GameError;

    fn from_str(s: &str) -> GameResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" | "normal" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(GameError::InvalidInput(format!("unknown difficulty '{other}'"))),
        }
    }
}

/// Lifecycle of a play session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionState {
    Created,
    InProgress,
    Complete,
}

/// Opaque session identifier supplied by the caller
///
/// The engine never interprets it; it is only the key for per-session state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SessionId(String);

impl SessionId {
    pub fn new(raw: impl Into<String>) -> GameResult<Self> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(GameError::InvalidInput("session id cannot be empty".into()));
        }
        if raw.len() > SESSION_ID_MAX_LENGTH {
            return Err(GameError::InvalidInput(format!(
                "session id is longer than {SESSION_ID_MAX_LENGTH} bytes"
            )));
        }
        if !raw.bytes().all(|b| b.is_ascii_graphic()) {
            return Err(GameError::InvalidInput(
                "session id must be printable ASCII without spaces".into(),
            ));
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for SessionId {
    type Error = GameError;

    fn try_from(value: String) -> GameResult<Self> {
        Self::new(value)
    }
}

impl From<SessionId> for String {
    fn from(id: SessionId) -> Self {
        id.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Short human-readable code used to share a challenge
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ChallengeCode(String);

impl ChallengeCode {
    /// Generate a fresh random code
    pub fn generate() -> Self {
        Self(platform::crypto::random_code(CHALLENGE_CODE_LENGTH))
    }

    /// Parse user input; case-insensitive, surrounding whitespace ignored
    pub fn parse(input: &str) -> GameResult<Self> {
        let code = input.trim().to_ascii_uppercase();
        let valid = code.len() == CHALLENGE_CODE_LENGTH
            && code
                .bytes()
                .all(|b| platform::crypto::CODE_ALPHABET.contains(&b));
        if !valid {
            return Err(GameError::InvalidInput(format!(
                "challenge code must be {CHALLENGE_CODE_LENGTH} characters from the share alphabet"
            )));
        }
        Ok(Self(code))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ChallengeCode {
    type Error = GameError;

    fn try_from(value: String) -> GameResult<Self> {
        Self::parse(&value)
    }
}

impl From<ChallengeCode> for String {
    fn from(code: ChallengeCode) -> Self {
        code.0
    }
}

impl fmt::Display for ChallengeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Error returned when a leaderboard name fails validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerNameError {
    Empty,
    TooLong { length: usize, max: usize },
    ControlCharacter { position: usize },
    MarkupCharacter { char: char },
}

impl fmt::Display for PlayerNameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "Name cannot be empty"),
            Self::TooLong { length, max } => {
                write!(f, "Name is too long ({length} chars, maximum {max})")
            }
            Self::ControlCharacter { position } => {
                write!(f, "Name contains a control character at position {position}")
            }
            Self::MarkupCharacter { char } => {
                write!(f, "Name cannot contain '{char}'")
            }
        }
    }
}

impl std::error::Error for PlayerNameError {}

/// Validated display name on the leaderboard
///
/// # Invariants
/// - NFKC normalized, trimmed, internal whitespace collapsed
/// - 1..=max characters
/// - No control, zero-width or markup characters
///
/// Deserialization trusts stored data; user input goes through [`PlayerName::new`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerName(String);

impl PlayerName {
    pub fn new(input: &str, max_length: usize) -> Result<Self, PlayerNameError> {
        // checked before normalization, which would fold tabs and newlines into spaces
        if let Some(position) = input.chars().position(platform::text::is_control_char) {
            return Err(PlayerNameError::ControlCharacter { position });
        }

        let name = platform::text::normalize_display_text(input);
        if name.is_empty() {
            return Err(PlayerNameError::Empty);
        }

        let length = name.chars().count();
        if length > max_length {
            return Err(PlayerNameError::TooLong {
                length,
                max: max_length,
            });
        }

        if let Some(char) = platform::text::find_markup_char(&name) {
            return Err(PlayerNameError::MarkupCharacter { char });
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
