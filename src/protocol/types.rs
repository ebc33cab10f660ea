//! Core wire-level data types shared across event payloads.

use serde::{Deserialize, Serialize};

/// Reserved identity for server-originated chat messages. Any inbound frame
/// claiming this id is dropped.
pub const SYSTEM_USER_ID: &str = "system";

/// A stable user identity, assigned at connection time and immutable for the
/// lifetime of a connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
}

impl User {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    /// The sentinel user attached to server-originated chat messages.
    #[must_use]
    pub fn system() -> Self {
        Self {
            id: SYSTEM_USER_ID.to_string(),
            name: SYSTEM_USER_ID.to_string(),
        }
    }

    #[must_use]
    pub fn is_system(&self) -> bool {
        self.id == SYSTEM_USER_ID
    }
}

/// A single canvas coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// A committed (or in-progress) stroke: an ordered point sequence plus the
/// palette indices the client rendered it with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub points: Vec<Point>,
    #[serde(rename = "colourIdx")]
    pub colour_idx: u32,
    #[serde(rename = "thicknessIdx")]
    pub thickness_idx: u32,
}

/// A single revealed character of the current word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hint {
    #[serde(rename = "char")]
    pub character: char,
    #[serde(rename = "wordIndex")]
    pub word_index: usize,
    #[serde(rename = "charIndex")]
    pub char_index: usize,
}

/// Room-level game phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    WaitingReadyUp,
    Started,
    Over,
}

impl GamePhase {
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::WaitingReadyUp => 0,
            Self::Started => 1,
            Self::Over => 2,
        }
    }

    #[must_use]
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::WaitingReadyUp),
            1 => Some(Self::Started),
            2 => Some(Self::Over),
            _ => None,
        }
    }
}

/// Phase of the current turn while a game is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnPhase {
    NextPlayer,
    Selection,
    Drawing,
    Ended,
}

impl TurnPhase {
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::NextPlayer => 0,
            Self::Selection => 1,
            Self::Drawing => 2,
            Self::Ended => 3,
        }
    }

    #[must_use]
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::NextPlayer),
            1 => Some(Self::Selection),
            2 => Some(Self::Drawing),
            3 => Some(Self::Ended),
            _ => None,
        }
    }
}

macro_rules! int_coded_serde {
    ($ty:ident, $expected:literal) => {
        impl Serialize for $ty {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_u8(self.code())
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let code = u8::deserialize(deserializer)?;
                Self::from_code(code).ok_or_else(|| {
                    serde::de::Error::custom(format!(concat!("invalid ", $expected, " {}"), code))
                })
            }
        }
    };
}

int_coded_serde!(GamePhase, "game phase code");
int_coded_serde!(TurnPhase, "turn phase code");

/// Snapshot of one player record, as rendered to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub user: User,
    pub points: u32,
    pub wins: u32,
    #[serde(rename = "isSpectator")]
    pub is_spectator: bool,
    #[serde(rename = "isConnected")]
    pub is_connected: bool,
    #[serde(rename = "isReady")]
    pub is_ready: bool,
    #[serde(rename = "isRoomLeader")]
    pub is_room_leader: bool,
}

/// All player snapshots plus the room capacity, for rehydration and resets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayersSummary {
    #[serde(rename = "playerStates")]
    pub player_states: Vec<PlayerSnapshot>,
    #[serde(rename = "maxPlayers")]
    pub max_players: u32,
}

/// Current-word view for one recipient. `word` is populated only for the
/// drawer while a game is running; `selections` only for the drawer during
/// word selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub word: Option<String>,
    #[serde(rename = "wordLength")]
    pub word_length: Vec<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selections: Option<Vec<String>>,
}

/// Game-state view for one recipient, embedded in the rehydrate envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSummary {
    #[serde(rename = "maxRounds")]
    pub max_rounds: u32,
    #[serde(rename = "maxSelectionTime")]
    pub max_selection_time: u32,
    #[serde(rename = "maxTurnTime")]
    pub max_turn_time: u32,
    pub round: u32,
    #[serde(rename = "timeLeft")]
    pub time_left: u32,
    pub status: GamePhase,
    #[serde(rename = "turnStatus")]
    pub turn_status: TurnPhase,
    #[serde(rename = "playerOrderIds")]
    pub player_order_ids: Vec<String>,
    pub words: WordSummary,
}

/// A user paired with a point total; used for awards and the winners list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointsAward {
    pub user: User,
    pub points: u32,
}
