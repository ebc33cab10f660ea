//! The turn driver: the state machine that walks each turn through its
//! phases on wall-clock timers.
//!
//! Exactly one driver task exists per room while a game runs. It owns the
//! turn status, the countdown, the current word and the turn/round counters;
//! the event loop reaches it only through the selection and guess channels.

use std::sync::Arc;

use rand::Rng;
use tokio::sync::mpsc;
use tokio::time::{interval_at, sleep, Duration, Instant, MissedTickBehavior};

use crate::protocol::{
    AwardPointsEvent, ChatMessageEvent, GameEvent, GamePhase, Hint, PointsAward, TurnDrawingEvent,
    TurnEndEvent, TurnNextPlayerEvent, TurnPhase, TurnWordSelectionEvent, User,
};
use crate::words::{censor, GameWord};

use super::guess::GuessTracker;
use super::hint::HintScheduler;
use super::GameCore;

/// The drawer's pick from the offered candidates, stamped when the event
/// loop dequeued it.
pub(crate) struct WordChoice {
    pub(crate) user: User,
    pub(crate) index: usize,
    pub(crate) at: Instant,
}

/// A chat message reinterpreted as a guess during a drawing phase.
pub(crate) struct GuessAttempt {
    pub(crate) user: User,
    pub(crate) value: String,
    pub(crate) at: Instant,
}

enum DrawerLookup {
    Connected(User),
    Disconnected,
    Missing,
}

pub(crate) struct TurnDriver {
    core: Arc<GameCore>,
    selection_rx: mpsc::UnboundedReceiver<WordChoice>,
    selection_closed: bool,
    guess_rx: mpsc::UnboundedReceiver<GuessAttempt>,
    guess_closed: bool,
}

impl TurnDriver {
    pub(crate) fn new(
        core: Arc<GameCore>,
        selection_rx: mpsc::UnboundedReceiver<WordChoice>,
        guess_rx: mpsc::UnboundedReceiver<GuessAttempt>,
    ) -> Self {
        Self {
            core,
            selection_rx,
            selection_closed: false,
            guess_rx,
            guess_closed: false,
        }
    }

    pub(crate) async fn run(mut self) {
        tracing::info!("Turn driver started");
        let mut consecutive_skips = 0usize;
        loop {
            if self.core.players.all_players_disconnected() {
                // Nobody is listening; end quietly without a game-over event.
                tracing::info!("All players disconnected, ending game");
                self.core.status.set_phase(GamePhase::Over);
                return;
            }

            let drawer = match self.current_drawer() {
                DrawerLookup::Connected(user) => {
                    consecutive_skips = 0;
                    user
                }
                DrawerLookup::Disconnected => {
                    // Skip this player's turn. A full wrap without finding a
                    // connected drawer means the whole order has left.
                    consecutive_skips += 1;
                    if consecutive_skips >= self.core.status.player_order_ids().len().max(1) {
                        tracing::info!("No connected player left in the turn order, ending game");
                        break;
                    }
                    self.core.status.advance_turn();
                    continue;
                }
                DrawerLookup::Missing => {
                    tracing::error!("Current turn refers to a missing player, terminating game");
                    self.core.status.set_phase(GamePhase::Over);
                    return;
                }
            };

            tracing::info!(drawer_id = %drawer.id, "Starting next turn");
            self.next_player_phase(&drawer).await;
            let word = self.selection_phase(&drawer).await;
            self.drawing_phase(&drawer, &word).await;
            self.turn_end_phase(&drawer, &word).await;

            self.core.drawing.clear();
            self.core.status.advance_turn();
            if self.core.status.current_round() >= self.core.settings.max_rounds {
                break;
            }
        }
        self.finish_game();
    }

    fn current_drawer(&self) -> DrawerLookup {
        let Some(turn_id) = self.core.status.current_turn_id() else {
            return DrawerLookup::Missing;
        };
        match self.core.players.user_of(&turn_id) {
            Some(user) if self.core.players.is_connected(&turn_id) => {
                DrawerLookup::Connected(user)
            }
            Some(_) => DrawerLookup::Disconnected,
            None => DrawerLookup::Missing,
        }
    }

    fn finish_game(&self) {
        let winners = self.core.players.winners();
        if let Some(top) = winners.first() {
            let top_ids: Vec<String> = winners
                .iter()
                .take_while(|w| w.points == top.points)
                .map(|w| w.user.id.clone())
                .collect();
            self.core.players.record_wins(&top_ids);
        }
        self.core.status.set_winners(winners.clone());
        self.core.status.set_phase(GamePhase::Over);
        self.core
            .players
            .send_to_all(&GameEvent::GameOver(crate::protocol::GameOverEvent {
                winners,
            }));
        tracing::info!("Game over");
    }

    /// Short intro so everyone sees whose turn is coming up.
    async fn next_player_phase(&self, drawer: &User) {
        let max_time = self.core.settings.max_turn_next_secs;
        self.core.status.set_turn_phase(TurnPhase::NextPlayer);
        self.core.status.set_time_left(max_time);
        self.core
            .players
            .send_to_all(&GameEvent::TurnNextPlayer(TurnNextPlayerEvent::begin(
                drawer.clone(),
                max_time,
            )));

        let timeout = sleep(phase_deadline(max_time));
        tokio::pin!(timeout);
        let mut ticker = second_ticker();
        let mut time_left = max_time;

        loop {
            tokio::select! {
                () = &mut timeout => {
                    self.core.status.set_time_left(0);
                    self.core
                        .players
                        .send_to_all(&GameEvent::TurnNextPlayer(TurnNextPlayerEvent::countdown(max_time, 0)));
                    return;
                }
                _ = ticker.tick() => {
                    time_left = time_left.saturating_sub(1);
                    self.core.status.set_time_left(time_left);
                    self.core
                        .players
                        .send_to_all(&GameEvent::TurnNextPlayer(TurnNextPlayerEvent::countdown(max_time, time_left)));
                }
            }
        }
    }

    /// Offer candidate words to the drawer and wait for a pick (or pick one
    /// at random on timeout).
    async fn selection_phase(&mut self, drawer: &User) -> GameWord {
        let max_time = self.core.settings.max_selection_secs;
        self.core.status.set_turn_phase(TurnPhase::Selection);
        self.core.status.set_time_left(max_time);

        let words = self.generate_candidates();
        self.core.status.set_word_selections(words.clone());

        self.core.players.send_to_one(
            &GameEvent::TurnWordSelection(TurnWordSelectionEvent::begin(
                drawer.clone(),
                max_time,
                Some(words.clone()),
            )),
            &drawer.id,
        );
        self.core.players.send_to_all_except(
            &GameEvent::TurnWordSelection(TurnWordSelectionEvent::begin(
                drawer.clone(),
                max_time,
                None,
            )),
            &drawer.id,
        );

        let phase_start = Instant::now();
        let timeout = sleep(phase_deadline(max_time));
        tokio::pin!(timeout);
        let mut ticker = second_ticker();
        let mut time_left = max_time;

        let selected = loop {
            tokio::select! {
                () = &mut timeout => {
                    self.core.status.set_time_left(0);
                    self.core
                        .players
                        .send_to_all(&GameEvent::TurnWordSelection(TurnWordSelectionEvent::countdown(max_time, 0)));
                    break words[rand::rng().random_range(0..words.len())].clone();
                }
                _ = ticker.tick() => {
                    time_left = time_left.saturating_sub(1);
                    self.core.status.set_time_left(time_left);
                    self.core
                        .players
                        .send_to_all(&GameEvent::TurnWordSelection(TurnWordSelectionEvent::countdown(max_time, time_left)));
                }
                choice = self.selection_rx.recv(), if !self.selection_closed => {
                    let Some(choice) = choice else {
                        self.selection_closed = true;
                        continue;
                    };
                    if choice.at < phase_start {
                        // Left over from an earlier phase.
                        continue;
                    }
                    if choice.index >= words.len() {
                        tracing::warn!(
                            sender_id = %choice.user.id,
                            index = choice.index,
                            "Word selection index out of range"
                        );
                        continue;
                    }
                    break words[choice.index].clone();
                }
            }
        };

        self.core.status.set_word_selections(Vec::new());
        let word = GameWord::new(&selected);
        self.core.status.set_current_word(word.clone());
        word
    }

    /// Draw candidates from the bank, rejecting words already used this
    /// session. Repeats are tolerated only if the bank runs dry.
    fn generate_candidates(&self) -> Vec<String> {
        let wanted = self.core.settings.max_selectable_words;
        let mut words: Vec<String> = Vec::with_capacity(wanted);

        let max_attempts = wanted * 100;
        let mut attempts = 0;
        while words.len() < wanted && attempts < max_attempts {
            attempts += 1;
            let candidate = self.core.bank.random_word().to_lowercase();
            if candidate.is_empty()
                || self.core.status.is_word_used(&candidate)
                || words.contains(&candidate)
            {
                continue;
            }
            words.push(candidate);
        }
        if words.is_empty() {
            // Bank exhausted against the session history; reuse is better
            // than an empty offer.
            words.push(self.core.bank.random_word().to_lowercase());
        }
        words
    }

    /// The drawing countdown, guess handling and hint reveals.
    async fn drawing_phase(&mut self, drawer: &User, word: &GameWord) {
        let max_time = self.core.settings.max_drawing_secs;
        self.core.status.set_turn_phase(TurnPhase::Drawing);
        self.core.status.set_time_left(max_time);

        let guessers = self.core.players.connected_players(false);
        let mut tracker = GuessTracker::new(&drawer.id, &guessers);
        let mut scheduler = HintScheduler::new(
            word.hints().to_vec(),
            self.core.settings.hint_reveal_secs.clone(),
        );

        self.core.players.send_to_one(
            &GameEvent::TurnDrawing(TurnDrawingEvent::begin(
                drawer.clone(),
                max_time,
                word.word_lengths().to_vec(),
                Some(word.word().to_string()),
            )),
            &drawer.id,
        );
        self.core.players.send_to_all_except(
            &GameEvent::TurnDrawing(TurnDrawingEvent::begin(
                drawer.clone(),
                max_time,
                word.word_lengths().to_vec(),
                None,
            )),
            &drawer.id,
        );

        let phase_start = Instant::now();
        let timeout = sleep(phase_deadline(max_time));
        tokio::pin!(timeout);
        let mut ticker = second_ticker();
        let mut time_left = max_time;
        let mut revealed: Vec<Hint> = Vec::new();
        let mut any_correct = false;

        loop {
            tokio::select! {
                () = &mut timeout => {
                    self.core.status.set_time_left(0);
                    self.core.players.send_to_all(&GameEvent::TurnDrawing(
                        TurnDrawingEvent::countdown(max_time, 0, revealed.clone()),
                    ));
                    return;
                }
                _ = ticker.tick() => {
                    if time_left == 0 {
                        // The zero countdown has been visible for a full
                        // second; this matters after a cut, when the armed
                        // timeout still points at the original deadline.
                        return;
                    }
                    time_left -= 1;
                    self.core.status.set_time_left(time_left);
                    if !any_correct {
                        if let Some(hint) = scheduler.next_hint(time_left) {
                            revealed.push(hint);
                        }
                    }
                    self.core.players.send_to_all(&GameEvent::TurnDrawing(
                        TurnDrawingEvent::countdown(max_time, time_left, revealed.clone()),
                    ));
                }
                attempt = self.guess_rx.recv(), if !self.guess_closed => {
                    let Some(attempt) = attempt else {
                        self.guess_closed = true;
                        continue;
                    };
                    if attempt.at < phase_start {
                        continue;
                    }
                    let first = self.handle_guess(drawer, word, &mut tracker, attempt);
                    if !first {
                        continue;
                    }
                    any_correct = true;
                    if tracker.finished() {
                        // Everyone has guessed; no reason to keep drawing.
                        time_left = 0;
                        self.core.status.set_time_left(0);
                        self.core.players.send_to_all(&GameEvent::TurnDrawing(
                            TurnDrawingEvent::countdown(max_time, 0, revealed.clone()),
                        ));
                        return;
                    }
                    if time_left > self.core.settings.drawing_time_cut_secs {
                        // Squeeze the countdown; the armed timeout still fires
                        // at the original deadline, the broadcast value is
                        // what clients (and further ticks) count from.
                        time_left = self.core.settings.drawing_time_cut_secs;
                        self.core.status.set_time_left(time_left);
                        self.core.players.send_to_all(&GameEvent::TurnDrawing(
                            TurnDrawingEvent::countdown(max_time, time_left, revealed.clone()),
                        ));
                    }
                }
            }
        }
    }

    /// Apply one guess. Returns true only for the first correct guess of the
    /// turn.
    fn handle_guess(
        &self,
        drawer: &User,
        word: &GameWord,
        tracker: &mut GuessTracker,
        attempt: GuessAttempt,
    ) -> bool {
        let candidate = attempt.value.trim().to_lowercase();

        if candidate == word.word() {
            if attempt.user.id == drawer.id || tracker.has_guessed(&attempt.user.id) {
                // The drawer spelling out the word, or a repeat from someone
                // who already guessed: everyone sees the censored rendering.
                self.core
                    .send_chat_all(ChatMessageEvent::user_message(attempt.user, word.censored()));
                return false;
            }

            let Some(guesser) = self.core.players.user_of(&attempt.user.id) else {
                tracing::warn!(user_id = %attempt.user.id, "Correct guess from unknown player");
                return false;
            };

            let award = tracker.add_guessed(&guesser.id);
            self.core.players.award_points(&guesser.id, award.guesser_points);
            self.core.players.award_points(&drawer.id, award.drawer_points);

            self.core
                .send_chat_all(ChatMessageEvent::user_message(guesser.clone(), word.censored()));
            self.core
                .players
                .send_to_all(&GameEvent::AwardPoints(AwardPointsEvent {
                    guesser: PointsAward {
                        user: guesser.clone(),
                        points: award.guesser_points,
                    },
                    drawer: PointsAward {
                        user: drawer.clone(),
                        points: award.drawer_points,
                    },
                }));
            self.core.send_chat_all(ChatMessageEvent::guessed(guesser));
            return award.first;
        }

        if candidate.contains(word.word())
            && (attempt.user.id == drawer.id || tracker.has_guessed(&attempt.user.id))
        {
            // A longer phrase containing the word would leak it; censor the
            // whole message.
            let masked = censor(attempt.value.chars().count());
            self.core
                .send_chat_all(ChatMessageEvent::user_message(attempt.user, masked));
            return false;
        }

        self.core
            .send_chat_all(ChatMessageEvent::user_message(attempt.user, attempt.value));
        false
    }

    /// Reveal the word and give clients a beat before the next turn.
    async fn turn_end_phase(&self, drawer: &User, word: &GameWord) {
        let max_time = self.core.settings.max_turn_end_secs;
        self.core.status.set_turn_phase(TurnPhase::Ended);
        self.core.status.set_time_left(max_time);
        self.core
            .players
            .send_to_all(&GameEvent::TurnEnd(TurnEndEvent::begin(
                drawer.clone(),
                max_time,
                word.word().to_string(),
            )));

        let timeout = sleep(phase_deadline(max_time));
        tokio::pin!(timeout);
        let mut ticker = second_ticker();
        let mut time_left = max_time;

        loop {
            tokio::select! {
                () = &mut timeout => {
                    self.core.status.set_time_left(0);
                    self.core
                        .players
                        .send_to_all(&GameEvent::TurnEnd(TurnEndEvent::countdown(max_time, 0)));
                    return;
                }
                _ = ticker.tick() => {
                    time_left = time_left.saturating_sub(1);
                    self.core.status.set_time_left(time_left);
                    self.core
                        .players
                        .send_to_all(&GameEvent::TurnEnd(TurnEndEvent::countdown(max_time, time_left)));
                }
            }
        }
    }
}

/// One extra second past the announced duration, so the final zero tick is
/// always broadcast before the timeout lands.
fn phase_deadline(max_time_secs: u32) -> Duration {
    Duration::from_secs(u64::from(max_time_secs) + 1)
}

fn second_ticker() -> tokio::time::Interval {
    let mut ticker = interval_at(
        Instant::now() + Duration::from_secs(1),
        Duration::from_secs(1),
    );
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    ticker
}
