//! Event payload definitions for every envelope type.
//!
//! Payload shapes are the contract with the browser client; field names are
//! part of the wire format and must stay stable.

use serde::{Deserialize, Serialize};

use super::types::{
    GameSummary, Hint, Line, PlayerSnapshot, PlayersSummary, PointsAward, TurnPhase, User,
};

/// Canned chat message bodies and format templates. `%u` expands to the user
/// name, `%m` to the message, client-side.
pub const CHAT_JOINED_MSG: &str = "has joined the room.";
pub const CHAT_LEFT_MSG: &str = "has left the room.";
pub const CHAT_GUESSED_MSG: &str = "has guessed the word.";

const FORMAT_SYSTEM: &str = "%m";
const FORMAT_USER: &str = "%u: %m";
const FORMAT_USER_ACTION: &str = "%u %m";

/// Chat message classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatKind {
    System,
    UserMessage,
    Join,
    Leave,
    Guessed,
}

impl ChatKind {
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::System => 0,
            Self::UserMessage => 1,
            Self::Join => 2,
            Self::Leave => 3,
            Self::Guessed => 4,
        }
    }

    #[must_use]
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::System),
            1 => Some(Self::UserMessage),
            2 => Some(Self::Join),
            3 => Some(Self::Leave),
            4 => Some(Self::Guessed),
            _ => None,
        }
    }
}

impl Serialize for ChatKind {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

impl<'de> Deserialize<'de> for ChatKind {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = u8::deserialize(deserializer)?;
        Self::from_code(code)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid chat kind {code}")))
    }
}

/// One chat line, both on the wire and in the room's chat history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessageEvent {
    pub user: User,
    pub message: String,
    pub format: String,
    #[serde(rename = "type")]
    pub kind: ChatKind,
}

impl ChatMessageEvent {
    pub fn system(message: impl Into<String>) -> Self {
        Self {
            user: User::system(),
            message: message.into(),
            format: FORMAT_SYSTEM.to_string(),
            kind: ChatKind::System,
        }
    }

    pub fn user_message(user: User, message: impl Into<String>) -> Self {
        Self {
            user,
            message: message.into(),
            format: FORMAT_USER.to_string(),
            kind: ChatKind::UserMessage,
        }
    }

    #[must_use]
    pub fn joined(user: User) -> Self {
        Self {
            user,
            message: CHAT_JOINED_MSG.to_string(),
            format: FORMAT_USER_ACTION.to_string(),
            kind: ChatKind::Join,
        }
    }

    #[must_use]
    pub fn left(user: User) -> Self {
        Self {
            user,
            message: CHAT_LEFT_MSG.to_string(),
            format: FORMAT_USER_ACTION.to_string(),
            kind: ChatKind::Leave,
        }
    }

    #[must_use]
    pub fn guessed(user: User) -> Self {
        Self {
            user,
            message: CHAT_GUESSED_MSG.to_string(),
            format: FORMAT_USER_ACTION.to_string(),
            kind: ChatKind::Guessed,
        }
    }
}

/// Join/leave notification action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinLeaveAction {
    Join,
    Leave,
}

impl Serialize for JoinLeaveAction {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(match self {
            Self::Join => 0,
            Self::Leave => 1,
        })
    }
}

impl<'de> Deserialize<'de> for JoinLeaveAction {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match u8::deserialize(deserializer)? {
            0 => Ok(Self::Join),
            1 => Ok(Self::Leave),
            other => Err(serde::de::Error::custom(format!(
                "invalid join/leave action {other}"
            ))),
        }
    }
}

/// Broadcast whenever a user connects to or disconnects from the room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserJoinLeaveEvent {
    pub user: User,
    pub action: JoinLeaveAction,
}

/// Full room state sent to a newly connected (or reconnected) client so it can
/// render without replaying history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RehydrateEvent {
    #[serde(rename = "selfUser")]
    pub self_user: User,
    #[serde(rename = "currentTurnUser")]
    pub current_turn_user: Option<User>,
    #[serde(rename = "chatMessages")]
    pub chat_messages: Vec<ChatMessageEvent>,
    pub players: PlayersSummary,
    pub game: GameSummary,
    pub lines: Vec<Line>,
}

/// Authoritative draw-history operation from the drawer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawAction {
    /// Commit the in-progress temp stroke as a line.
    Line,
    Clear,
    Undo,
    Redo,
}

impl Serialize for DrawAction {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(match self {
            Self::Line => 0,
            Self::Clear => 1,
            Self::Undo => 2,
            Self::Redo => 3,
        })
    }
}

impl<'de> Deserialize<'de> for DrawAction {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match u8::deserialize(deserializer)? {
            0 => Ok(Self::Line),
            1 => Ok(Self::Clear),
            2 => Ok(Self::Undo),
            3 => Ok(Self::Redo),
            other => Err(serde::de::Error::custom(format!(
                "invalid draw action {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawEvent {
    pub user: User,
    #[serde(rename = "type")]
    pub action: DrawAction,
}

/// In-progress stroke points from the drawer, merged into the temp buffer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawTempEvent {
    pub user: User,
    pub line: Line,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawSelectColourEvent {
    pub user: User,
    #[serde(rename = "colourIdx")]
    pub colour_idx: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawSelectThicknessEvent {
    pub user: User,
    #[serde(rename = "thicknessIdx")]
    pub thickness_idx: u32,
}

/// Ready toggle; the server echoes the effective stored value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadyEvent {
    pub user: User,
    pub ready: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartGameIssuedEvent {
    pub issuer: User,
}

/// Broadcast when the game starts, carrying the shuffled turn order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartGameEvent {
    #[serde(rename = "playerOrderIds")]
    pub player_order_ids: Vec<String>,
    #[serde(rename = "currentUserTurn")]
    pub current_turn_user: User,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnNextPlayerNonce {
    pub user: User,
}

/// Turn-intro countdown. The nonce is populated only on the first event of
/// the phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnNextPlayerEvent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nonce: Option<TurnNextPlayerNonce>,
    #[serde(rename = "maxTime")]
    pub max_time: u32,
    #[serde(rename = "timeLeft")]
    pub time_left: u32,
    pub status: TurnPhase,
}

impl TurnNextPlayerEvent {
    #[must_use]
    pub fn begin(user: User, max_time: u32) -> Self {
        Self {
            nonce: Some(TurnNextPlayerNonce { user }),
            max_time,
            time_left: max_time,
            status: TurnPhase::NextPlayer,
        }
    }

    #[must_use]
    pub fn countdown(max_time: u32, time_left: u32) -> Self {
        Self {
            nonce: None,
            max_time,
            time_left,
            status: TurnPhase::NextPlayer,
        }
    }
}

/// `words` is populated only in the drawer's copy of the first event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordSelectionNonce {
    pub user: User,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub words: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnWordSelectionEvent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nonce: Option<WordSelectionNonce>,
    #[serde(rename = "maxTime")]
    pub max_time: u32,
    #[serde(rename = "timeLeft")]
    pub time_left: u32,
    pub status: TurnPhase,
}

impl TurnWordSelectionEvent {
    #[must_use]
    pub fn begin(user: User, max_time: u32, words: Option<Vec<String>>) -> Self {
        Self {
            nonce: Some(WordSelectionNonce { user, words }),
            max_time,
            time_left: max_time,
            status: TurnPhase::Selection,
        }
    }

    #[must_use]
    pub fn countdown(max_time: u32, time_left: u32) -> Self {
        Self {
            nonce: None,
            max_time,
            time_left,
            status: TurnPhase::Selection,
        }
    }
}

/// The drawer's choice out of the offered candidate words.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnWordSelectedEvent {
    pub user: User,
    pub index: usize,
}

/// `word` is populated only in the drawer's copy of the first event; other
/// players see the per-token length mask alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnDrawingNonce {
    pub user: User,
    #[serde(rename = "wordLength")]
    pub word_length: Vec<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub word: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnDrawingEvent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nonce: Option<TurnDrawingNonce>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hints: Vec<Hint>,
    #[serde(rename = "maxTime")]
    pub max_time: u32,
    #[serde(rename = "timeLeft")]
    pub time_left: u32,
    pub status: TurnPhase,
}

impl TurnDrawingEvent {
    #[must_use]
    pub fn begin(user: User, max_time: u32, word_length: Vec<usize>, word: Option<String>) -> Self {
        Self {
            nonce: Some(TurnDrawingNonce {
                user,
                word_length,
                word,
            }),
            hints: Vec::new(),
            max_time,
            time_left: max_time,
            status: TurnPhase::Drawing,
        }
    }

    #[must_use]
    pub fn countdown(max_time: u32, time_left: u32, hints: Vec<Hint>) -> Self {
        Self {
            nonce: None,
            hints,
            max_time,
            time_left,
            status: TurnPhase::Drawing,
        }
    }
}

/// The revealed word travels in the first turn-end event of the phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnEndNonce {
    pub user: User,
    pub word: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnEndEvent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nonce: Option<TurnEndNonce>,
    #[serde(rename = "maxTime")]
    pub max_time: u32,
    #[serde(rename = "timeLeft")]
    pub time_left: u32,
    pub status: TurnPhase,
}

impl TurnEndEvent {
    #[must_use]
    pub fn begin(user: User, max_time: u32, word: String) -> Self {
        Self {
            nonce: Some(TurnEndNonce { user, word }),
            max_time,
            time_left: max_time,
            status: TurnPhase::Ended,
        }
    }

    #[must_use]
    pub fn countdown(max_time: u32, time_left: u32) -> Self {
        Self {
            nonce: None,
            max_time,
            time_left,
            status: TurnPhase::Ended,
        }
    }
}

/// Both sides of a correct-guess award.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AwardPointsEvent {
    pub guesser: PointsAward,
    pub drawer: PointsAward,
}

/// Final standings, sorted by points descending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameOverEvent {
    pub winners: Vec<PointsAward>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewGameIssuedEvent {
    pub issuer: User,
}

/// Broadcast after a room reset; carries the wiped player snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewGameResetEvent {
    #[serde(rename = "playerStates")]
    pub player_states: Vec<PlayerSnapshot>,
}
