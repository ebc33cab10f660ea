//! Shared game-status holder.
//!
//! Both the event loop and the turn driver write here, each to its own set of
//! fields: the driver owns turn status, word, timer and turn counters; the
//! loop owns the phase, the player order and resets. An internal read/write
//! lock keeps cross-thread reads consistent.

use std::collections::HashSet;
use std::sync::RwLock;

use crate::config::GameSettings;
use crate::protocol::{GamePhase, GameSummary, PointsAward, TurnPhase, WordSummary};
use crate::words::GameWord;

#[derive(Debug)]
struct StatusInner {
    phase: GamePhase,
    turn_phase: TurnPhase,
    current_word: Option<GameWord>,
    current_round: u32,
    player_order_ids: Vec<String>,
    turn_index: usize,
    word_history: HashSet<String>,
    time_left: u32,
    word_selections: Vec<String>,
    winners: Vec<PointsAward>,
}

impl Default for StatusInner {
    fn default() -> Self {
        Self {
            phase: GamePhase::WaitingReadyUp,
            turn_phase: TurnPhase::NextPlayer,
            current_word: None,
            current_round: 0,
            player_order_ids: Vec::new(),
            turn_index: 0,
            word_history: HashSet::new(),
            time_left: 0,
            word_selections: Vec::new(),
            winners: Vec::new(),
        }
    }
}

#[derive(Debug, Default)]
pub struct GameStatus {
    inner: RwLock<StatusInner>,
}

impl GameStatus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read<R>(&self, f: impl FnOnce(&StatusInner) -> R) -> R {
        let inner = self
            .inner
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        f(&inner)
    }

    fn write<R>(&self, f: impl FnOnce(&mut StatusInner) -> R) -> R {
        let mut inner = self
            .inner
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        f(&mut inner)
    }

    #[must_use]
    pub fn phase(&self) -> GamePhase {
        self.read(|inner| inner.phase)
    }

    pub fn set_phase(&self, phase: GamePhase) {
        self.write(|inner| inner.phase = phase);
    }

    #[must_use]
    pub fn turn_phase(&self) -> TurnPhase {
        self.read(|inner| inner.turn_phase)
    }

    pub fn set_turn_phase(&self, turn_phase: TurnPhase) {
        self.write(|inner| inner.turn_phase = turn_phase);
    }

    /// Id of the player whose turn it is, when a turn order exists.
    #[must_use]
    pub fn current_turn_id(&self) -> Option<String> {
        self.read(|inner| inner.player_order_ids.get(inner.turn_index).cloned())
    }

    #[must_use]
    pub fn player_order_ids(&self) -> Vec<String> {
        self.read(|inner| inner.player_order_ids.clone())
    }

    /// Install a fresh turn order, rewinding to the first turn of round zero.
    pub fn set_player_order(&self, order: Vec<String>) {
        self.write(|inner| {
            inner.player_order_ids = order;
            inner.turn_index = 0;
            inner.current_round = 0;
        });
    }

    /// Advance to the next turn. Wrapping back to the first player increments
    /// the round counter; returns true on wrap.
    pub fn advance_turn(&self) -> bool {
        self.write(|inner| {
            if inner.player_order_ids.is_empty() {
                return false;
            }
            inner.turn_index += 1;
            if inner.turn_index >= inner.player_order_ids.len() {
                inner.turn_index = 0;
                inner.current_round += 1;
                return true;
            }
            false
        })
    }

    #[must_use]
    pub fn current_round(&self) -> u32 {
        self.read(|inner| inner.current_round)
    }

    #[must_use]
    pub fn current_word(&self) -> Option<GameWord> {
        self.read(|inner| inner.current_word.clone())
    }

    /// Record the chosen word for this turn; it joins the session's word
    /// history and is never offered again.
    pub fn set_current_word(&self, word: GameWord) {
        self.write(|inner| {
            inner.word_history.insert(word.word().to_string());
            inner.current_word = Some(word);
        });
    }

    #[must_use]
    pub fn is_word_used(&self, word: &str) -> bool {
        self.read(|inner| inner.word_history.contains(word))
    }

    #[must_use]
    pub fn time_left(&self) -> u32 {
        self.read(|inner| inner.time_left)
    }

    pub fn set_time_left(&self, time_left: u32) {
        self.write(|inner| inner.time_left = time_left);
    }

    #[must_use]
    pub fn word_selections(&self) -> Vec<String> {
        self.read(|inner| inner.word_selections.clone())
    }

    pub fn set_word_selections(&self, selections: Vec<String>) {
        self.write(|inner| inner.word_selections = selections);
    }

    #[must_use]
    pub fn winners(&self) -> Vec<PointsAward> {
        self.read(|inner| inner.winners.clone())
    }

    pub fn set_winners(&self, winners: Vec<PointsAward>) {
        self.write(|inner| inner.winners = winners);
    }

    /// Reset for a new game: back to the ready-up phase with all turn state,
    /// word history and winners wiped.
    pub fn reset(&self) {
        self.write(|inner| *inner = StatusInner::default());
    }

    /// The game-state view for one recipient. The concrete word (and, during
    /// selection, the candidate list) is disclosed only to the drawer of the
    /// running game.
    #[must_use]
    pub fn summary_for(&self, viewer_id: &str, settings: &GameSettings) -> GameSummary {
        self.read(|inner| {
            let is_drawer = inner.phase == GamePhase::Started
                && inner.player_order_ids.get(inner.turn_index).map(String::as_str)
                    == Some(viewer_id);

            let words = match (&inner.current_word, is_drawer) {
                (Some(word), true) => WordSummary {
                    word: Some(word.word().to_string()),
                    word_length: word.word_lengths().to_vec(),
                    selections: selections_for(inner, true),
                },
                (Some(word), false) => WordSummary {
                    word: None,
                    word_length: word.word_lengths().to_vec(),
                    selections: None,
                },
                (None, _) => WordSummary {
                    word: None,
                    word_length: Vec::new(),
                    selections: selections_for(inner, is_drawer),
                },
            };

            GameSummary {
                max_rounds: settings.max_rounds,
                max_selection_time: settings.max_selection_secs,
                max_turn_time: settings.max_drawing_secs,
                round: inner.current_round,
                time_left: inner.time_left,
                status: inner.phase,
                turn_status: inner.turn_phase,
                player_order_ids: inner.player_order_ids.clone(),
                words,
            }
        })
    }
}

fn selections_for(inner: &StatusInner, is_drawer: bool) -> Option<Vec<String>> {
    if is_drawer && inner.turn_phase == TurnPhase::Selection && !inner.word_selections.is_empty() {
        Some(inner.word_selections.clone())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(ids: &[&str]) -> Vec<String> {
        ids.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn turn_advance_wraps_and_counts_rounds() {
        let status = GameStatus::new();
        status.set_player_order(order(&["a", "b"]));
        assert_eq!(status.current_turn_id().as_deref(), Some("a"));
        assert_eq!(status.current_round(), 0);

        assert!(!status.advance_turn());
        assert_eq!(status.current_turn_id().as_deref(), Some("b"));

        assert!(status.advance_turn());
        assert_eq!(status.current_turn_id().as_deref(), Some("a"));
        assert_eq!(status.current_round(), 1);
    }

    #[test]
    fn advance_without_order_is_noop() {
        let status = GameStatus::new();
        assert!(!status.advance_turn());
        assert_eq!(status.current_turn_id(), None);
    }

    #[test]
    fn chosen_words_enter_history() {
        let status = GameStatus::new();
        assert!(!status.is_word_used("cat"));
        status.set_current_word(GameWord::new("cat"));
        assert!(status.is_word_used("cat"));
        status.set_current_word(GameWord::new("dog"));
        assert!(status.is_word_used("cat"));
        assert!(status.is_word_used("dog"));
    }

    #[test]
    fn reset_clears_everything() {
        let status = GameStatus::new();
        status.set_phase(GamePhase::Started);
        status.set_player_order(order(&["a", "b"]));
        status.set_current_word(GameWord::new("cat"));
        status.set_time_left(42);

        status.reset();
        assert_eq!(status.phase(), GamePhase::WaitingReadyUp);
        assert_eq!(status.current_turn_id(), None);
        assert!(status.current_word().is_none());
        assert!(!status.is_word_used("cat"));
        assert_eq!(status.time_left(), 0);
    }

    #[test]
    fn summary_discloses_word_only_to_drawer() {
        let settings = GameSettings::default();
        let status = GameStatus::new();
        status.set_player_order(order(&["a", "b"]));
        status.set_phase(GamePhase::Started);
        status.set_turn_phase(TurnPhase::Drawing);
        status.set_current_word(GameWord::new("cat"));

        let drawer_view = status.summary_for("a", &settings);
        assert_eq!(drawer_view.words.word.as_deref(), Some("cat"));
        assert_eq!(drawer_view.words.word_length, vec![3]);

        let other_view = status.summary_for("b", &settings);
        assert_eq!(other_view.words.word, None);
        assert_eq!(other_view.words.word_length, vec![3]);
    }

    #[test]
    fn summary_discloses_selections_only_to_drawer_in_selection() {
        let settings = GameSettings::default();
        let status = GameStatus::new();
        status.set_player_order(order(&["a", "b"]));
        status.set_phase(GamePhase::Started);
        status.set_turn_phase(TurnPhase::Selection);
        status.set_word_selections(vec!["cat".into(), "dog".into()]);

        let drawer_view = status.summary_for("a", &settings);
        assert_eq!(
            drawer_view.words.selections,
            Some(vec!["cat".to_string(), "dog".to_string()])
        );
        assert_eq!(status.summary_for("b", &settings).words.selections, None);
    }
}
