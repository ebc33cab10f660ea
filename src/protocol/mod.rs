// Protocol module: wire envelope, event type tags, and payload definitions

pub mod events;
pub mod types;

pub use events::{
    AwardPointsEvent, ChatKind, ChatMessageEvent, DrawAction, DrawEvent, DrawSelectColourEvent,
    DrawSelectThicknessEvent, DrawTempEvent, GameOverEvent, JoinLeaveAction, NewGameIssuedEvent,
    NewGameResetEvent, ReadyEvent, RehydrateEvent, StartGameEvent, StartGameIssuedEvent,
    TurnDrawingEvent, TurnEndEvent, TurnNextPlayerEvent, TurnWordSelectedEvent,
    TurnWordSelectionEvent, UserJoinLeaveEvent,
};
pub use types::{
    GamePhase, GameSummary, Hint, Line, PlayerSnapshot, PlayersSummary, Point, PointsAward,
    TurnPhase, User, WordSummary, SYSTEM_USER_ID,
};

use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

/// Who is allowed to originate an event type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    ServerOnly,
    ClientOnly,
    Bidirectional,
}

macro_rules! event_kinds {
    ($( $name:ident = $code:literal, $direction:ident; )+) => {
        /// Stable integer tag of every envelope type. The numeric values are
        /// part of the wire format and must never be reordered.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum EventKind {
            $( $name = $code, )+
        }

        impl EventKind {
            pub const ALL: &'static [EventKind] = &[ $( EventKind::$name, )+ ];

            #[must_use]
            pub const fn code(self) -> u8 {
                self as u8
            }

            #[must_use]
            pub const fn from_code(code: u8) -> Option<Self> {
                match code {
                    $( $code => Some(Self::$name), )+
                    _ => None,
                }
            }

            #[must_use]
            pub const fn direction(self) -> Direction {
                match self {
                    $( Self::$name => Direction::$direction, )+
                }
            }
        }
    };
}

event_kinds! {
    UserJoinLeave = 0, ServerOnly;
    Rehydrate = 1, ServerOnly;
    Chat = 2, Bidirectional;
    Draw = 3, Bidirectional;
    Ready = 4, Bidirectional;
    StartGame = 5, ServerOnly;
    StartGameIssued = 6, ClientOnly;
    TurnNextPlayer = 7, ServerOnly;
    TurnWordSelection = 8, ServerOnly;
    TurnWordSelected = 9, ClientOnly;
    TurnDrawing = 10, ServerOnly;
    TurnEnd = 11, ServerOnly;
    AwardPoints = 12, ServerOnly;
    GameOver = 13, ServerOnly;
    NewGameIssued = 14, ClientOnly;
    NewGameReset = 15, ServerOnly;
    DrawTemp = 16, Bidirectional;
    DrawSelectColour = 17, Bidirectional;
    DrawSelectThickness = 18, Bidirectional;
}

impl EventKind {
    /// True for events only the server may originate; frames of these kinds
    /// arriving from a client are protocol violations.
    #[must_use]
    pub const fn is_server_only(self) -> bool {
        matches!(self.direction(), Direction::ServerOnly)
    }
}

/// Errors produced while encoding or decoding wire frames.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("malformed frame: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("unknown event type {0}")]
    UnknownType(u8),
}

/// A fully decoded wire event: the tagged sum of every payload type.
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    UserJoinLeave(UserJoinLeaveEvent),
    Rehydrate(Box<RehydrateEvent>),
    Chat(ChatMessageEvent),
    Draw(DrawEvent),
    Ready(ReadyEvent),
    StartGame(StartGameEvent),
    StartGameIssued(StartGameIssuedEvent),
    TurnNextPlayer(TurnNextPlayerEvent),
    TurnWordSelection(TurnWordSelectionEvent),
    TurnWordSelected(TurnWordSelectedEvent),
    TurnDrawing(TurnDrawingEvent),
    TurnEnd(TurnEndEvent),
    AwardPoints(AwardPointsEvent),
    GameOver(GameOverEvent),
    NewGameIssued(NewGameIssuedEvent),
    NewGameReset(NewGameResetEvent),
    DrawTemp(DrawTempEvent),
    DrawSelectColour(DrawSelectColourEvent),
    DrawSelectThickness(DrawSelectThicknessEvent),
}

/// Serialized form of the envelope: `{"type": <int>, "data": <payload>}`.
#[derive(Serialize)]
struct EnvelopeOut<'a, T: Serialize> {
    #[serde(rename = "type")]
    kind: u8,
    data: &'a T,
}

#[derive(Deserialize)]
struct EnvelopeIn<'a> {
    #[serde(rename = "type")]
    kind: u8,
    #[serde(borrow)]
    data: &'a RawValue,
}

impl GameEvent {
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::UserJoinLeave(_) => EventKind::UserJoinLeave,
            Self::Rehydrate(_) => EventKind::Rehydrate,
            Self::Chat(_) => EventKind::Chat,
            Self::Draw(_) => EventKind::Draw,
            Self::Ready(_) => EventKind::Ready,
            Self::StartGame(_) => EventKind::StartGame,
            Self::StartGameIssued(_) => EventKind::StartGameIssued,
            Self::TurnNextPlayer(_) => EventKind::TurnNextPlayer,
            Self::TurnWordSelection(_) => EventKind::TurnWordSelection,
            Self::TurnWordSelected(_) => EventKind::TurnWordSelected,
            Self::TurnDrawing(_) => EventKind::TurnDrawing,
            Self::TurnEnd(_) => EventKind::TurnEnd,
            Self::AwardPoints(_) => EventKind::AwardPoints,
            Self::GameOver(_) => EventKind::GameOver,
            Self::NewGameIssued(_) => EventKind::NewGameIssued,
            Self::NewGameReset(_) => EventKind::NewGameReset,
            Self::DrawTemp(_) => EventKind::DrawTemp,
            Self::DrawSelectColour(_) => EventKind::DrawSelectColour,
            Self::DrawSelectThickness(_) => EventKind::DrawSelectThickness,
        }
    }

    /// Encode into a single JSON text frame.
    pub fn encode(&self) -> Result<String, ProtocolError> {
        fn envelope<T: Serialize>(kind: EventKind, data: &T) -> Result<String, ProtocolError> {
            Ok(serde_json::to_string(&EnvelopeOut {
                kind: kind.code(),
                data,
            })?)
        }

        let kind = self.kind();
        match self {
            Self::UserJoinLeave(e) => envelope(kind, e),
            Self::Rehydrate(e) => envelope(kind, e),
            Self::Chat(e) => envelope(kind, e),
            Self::Draw(e) => envelope(kind, e),
            Self::Ready(e) => envelope(kind, e),
            Self::StartGame(e) => envelope(kind, e),
            Self::StartGameIssued(e) => envelope(kind, e),
            Self::TurnNextPlayer(e) => envelope(kind, e),
            Self::TurnWordSelection(e) => envelope(kind, e),
            Self::TurnWordSelected(e) => envelope(kind, e),
            Self::TurnDrawing(e) => envelope(kind, e),
            Self::TurnEnd(e) => envelope(kind, e),
            Self::AwardPoints(e) => envelope(kind, e),
            Self::GameOver(e) => envelope(kind, e),
            Self::NewGameIssued(e) => envelope(kind, e),
            Self::NewGameReset(e) => envelope(kind, e),
            Self::DrawTemp(e) => envelope(kind, e),
            Self::DrawSelectColour(e) => envelope(kind, e),
            Self::DrawSelectThickness(e) => envelope(kind, e),
        }
    }

    /// Decode one JSON text frame into a typed event.
    pub fn decode(frame: &str) -> Result<Self, ProtocolError> {
        let envelope: EnvelopeIn<'_> = serde_json::from_str(frame)?;
        let kind =
            EventKind::from_code(envelope.kind).ok_or(ProtocolError::UnknownType(envelope.kind))?;
        let data = envelope.data.get();

        let event = match kind {
            EventKind::UserJoinLeave => Self::UserJoinLeave(serde_json::from_str(data)?),
            EventKind::Rehydrate => Self::Rehydrate(Box::new(serde_json::from_str(data)?)),
            EventKind::Chat => Self::Chat(serde_json::from_str(data)?),
            EventKind::Draw => Self::Draw(serde_json::from_str(data)?),
            EventKind::Ready => Self::Ready(serde_json::from_str(data)?),
            EventKind::StartGame => Self::StartGame(serde_json::from_str(data)?),
            EventKind::StartGameIssued => Self::StartGameIssued(serde_json::from_str(data)?),
            EventKind::TurnNextPlayer => Self::TurnNextPlayer(serde_json::from_str(data)?),
            EventKind::TurnWordSelection => Self::TurnWordSelection(serde_json::from_str(data)?),
            EventKind::TurnWordSelected => Self::TurnWordSelected(serde_json::from_str(data)?),
            EventKind::TurnDrawing => Self::TurnDrawing(serde_json::from_str(data)?),
            EventKind::TurnEnd => Self::TurnEnd(serde_json::from_str(data)?),
            EventKind::AwardPoints => Self::AwardPoints(serde_json::from_str(data)?),
            EventKind::GameOver => Self::GameOver(serde_json::from_str(data)?),
            EventKind::NewGameIssued => Self::NewGameIssued(serde_json::from_str(data)?),
            EventKind::NewGameReset => Self::NewGameReset(serde_json::from_str(data)?),
            EventKind::DrawTemp => Self::DrawTemp(serde_json::from_str(data)?),
            EventKind::DrawSelectColour => Self::DrawSelectColour(serde_json::from_str(data)?),
            EventKind::DrawSelectThickness => {
                Self::DrawSelectThickness(serde_json::from_str(data)?)
            }
        };
        Ok(event)
    }
}
