//! Drawing-phase behavior: hint scheduling, the first-guess countdown cut,
//! scoring order, and drawer-only authority over the canvas.

mod test_support;

use std::collections::HashMap;

use scrawl_server::config::GameSettings;
use scrawl_server::protocol::*;
use test_support::{fast_settings, ready_up_and_start, test_room, TestClient};

fn hint_settings() -> GameSettings {
    GameSettings {
        max_players: 8,
        max_rounds: 1,
        max_selectable_words: 3,
        max_turn_next_secs: 1,
        max_selection_secs: 3,
        max_drawing_secs: 25,
        max_turn_end_secs: 1,
        drawing_time_cut_secs: 10,
        hint_reveal_secs: vec![20, 15],
    }
}

/// Walk the game into the drawing phase; returns (drawer_idx, word).
async fn start_drawing_phase(clients: &mut [TestClient]) -> (usize, String) {
    let order = ready_up_and_start(clients).await;
    let drawer_id = order[0].clone();
    let drawer_idx = clients.iter().position(|c| c.user.id == drawer_id).unwrap();

    let event = clients[drawer_idx]
        .expect_event(|e| matches!(e, GameEvent::TurnWordSelection(ev) if ev.nonce.is_some()))
        .await;
    let GameEvent::TurnWordSelection(selection) = event else {
        unreachable!()
    };
    let words = selection.nonce.unwrap().words.unwrap();
    clients[drawer_idx].send_word_selected(0);

    for client in clients.iter_mut() {
        client
            .expect_event(|e| matches!(e, GameEvent::TurnDrawing(ev) if ev.nonce.is_some()))
            .await;
    }

    (drawer_idx, words[0].clone())
}

#[tokio::test(start_paused = true)]
async fn hints_reveal_at_thresholds() {
    let room = test_room(hint_settings());
    let mut clients = vec![
        TestClient::join(&room, "alice"),
        TestClient::join(&room, "bob"),
    ];

    let (drawer_idx, word) = start_drawing_phase(&mut clients).await;
    let guesser_idx = 1 - drawer_idx;

    // Nobody guesses; collect every countdown until the turn ends.
    let mut hints_by_time_left: HashMap<u32, Vec<Hint>> = HashMap::new();
    loop {
        let event = clients[guesser_idx].next_event().await;
        match event {
            GameEvent::TurnDrawing(countdown) if countdown.nonce.is_none() => {
                hints_by_time_left.insert(countdown.time_left, countdown.hints);
            }
            GameEvent::TurnEnd(_) => break,
            _ => {}
        }
    }

    assert_eq!(hints_by_time_left[&21].len(), 0);
    assert_eq!(hints_by_time_left[&20].len(), 1);
    assert_eq!(hints_by_time_left[&16].len(), 1);
    assert_eq!(hints_by_time_left[&15].len(), 2);
    assert_eq!(hints_by_time_left[&0].len(), 2);

    // Revealed characters are real non-vowel positions of the word.
    let tokens: Vec<&str> = word.split(' ').collect();
    for hint in &hints_by_time_left[&15] {
        let token = tokens[hint.word_index];
        let character = token.chars().nth(hint.char_index).unwrap();
        assert_eq!(character, hint.character);
        assert!(!"aeiou".contains(hint.character));
    }
}

#[tokio::test(start_paused = true)]
async fn first_guess_cuts_countdown_and_freezes_hints() {
    let room = test_room(hint_settings());
    let mut clients = vec![
        TestClient::join(&room, "alice"),
        TestClient::join(&room, "bob"),
        TestClient::join(&room, "carol"),
    ];

    let (drawer_idx, word) = start_drawing_phase(&mut clients).await;
    let first_guesser_idx = (drawer_idx + 1) % 3;
    let observer_idx = (drawer_idx + 2) % 3;

    // Immediate correct guess at full time: one of two guessers, so the turn
    // does not end, the countdown is truncated instead.
    clients[first_guesser_idx].send_chat(&word);

    for client in clients.iter_mut() {
        let event = client.expect_kind(EventKind::AwardPoints).await;
        let GameEvent::AwardPoints(award) = event else {
            unreachable!()
        };
        assert_eq!(award.guesser.points, 3);
        assert_eq!(award.drawer.points, 2);
    }

    let mut seen_time_lefts = Vec::new();
    loop {
        let event = clients[observer_idx].next_event().await;
        match event {
            GameEvent::TurnDrawing(countdown) if countdown.nonce.is_none() => {
                // Hint reveals are frozen after the first correct guess.
                assert!(countdown.hints.is_empty());
                seen_time_lefts.push(countdown.time_left);
            }
            GameEvent::TurnEnd(_) => break,
            _ => {}
        }
    }

    // The countdown jumped straight to the cut value and ran down from there.
    assert!(seen_time_lefts.contains(&10));
    assert!(seen_time_lefts.iter().all(|&t| t <= 10));
    assert_eq!(seen_time_lefts.last(), Some(&0));
}

#[tokio::test(start_paused = true)]
async fn later_guessers_earn_single_points_and_repeats_are_censored() {
    let room = test_room(fast_settings());
    let mut clients = vec![
        TestClient::join(&room, "alice"),
        TestClient::join(&room, "bob"),
        TestClient::join(&room, "carol"),
    ];

    let (drawer_idx, word) = start_drawing_phase(&mut clients).await;
    let first_idx = (drawer_idx + 1) % 3;
    let second_idx = (drawer_idx + 2) % 3;
    let censored = scrawl_server::words::GameWord::new(&word).censored();

    clients[first_idx].send_chat(&word);
    for idx in [drawer_idx, first_idx, second_idx] {
        let event = clients[idx].expect_kind(EventKind::AwardPoints).await;
        let GameEvent::AwardPoints(award) = event else {
            unreachable!()
        };
        assert_eq!(award.guesser.points, 3);
        assert_eq!(award.drawer.points, 2);
    }

    let second_id = clients[second_idx].user.id.clone();
    clients[second_idx].send_chat(&word);
    let event = clients[first_idx].expect_kind(EventKind::AwardPoints).await;
    let GameEvent::AwardPoints(award) = event else {
        unreachable!()
    };
    assert_eq!(award.guesser.points, 1);
    assert_eq!(award.drawer.points, 0);
    assert_eq!(award.guesser.user.id, second_id);

    // Guessing again after a correct guess only yields the censored text.
    clients[second_idx].send_chat(&word);
    let event = clients[first_idx]
        .expect_event(|e| {
            matches!(e, GameEvent::Chat(chat)
                if chat.kind == ChatKind::UserMessage && chat.user.id == second_id)
        })
        .await;
    let GameEvent::Chat(chat) = event else {
        unreachable!()
    };
    assert_eq!(chat.message, censored);
}

#[tokio::test(start_paused = true)]
async fn only_the_drawer_controls_the_canvas() {
    let room = test_room(fast_settings());
    let mut clients = vec![
        TestClient::join(&room, "alice"),
        TestClient::join(&room, "bob"),
    ];

    let (drawer_idx, _word) = start_drawing_phase(&mut clients).await;
    let guesser_idx = 1 - drawer_idx;

    let stroke = Line {
        points: vec![Point { x: 1.0, y: 2.0 }, Point { x: 3.0, y: 4.0 }],
        colour_idx: 3,
        thickness_idx: 1,
    };

    // Drawer paints: colour pick, temp stroke, commit.
    let drawer_user = clients[drawer_idx].user.clone();
    clients[drawer_idx].send(&GameEvent::DrawSelectColour(DrawSelectColourEvent {
        user: drawer_user.clone(),
        colour_idx: 3,
    }));
    clients[drawer_idx].send(&GameEvent::DrawTemp(DrawTempEvent {
        user: drawer_user.clone(),
        line: stroke.clone(),
    }));
    clients[drawer_idx].send(&GameEvent::Draw(DrawEvent {
        user: drawer_user.clone(),
        action: DrawAction::Line,
    }));

    // The guesser replays all three, in order.
    clients[guesser_idx].expect_kind(EventKind::DrawSelectColour).await;
    let event = clients[guesser_idx].expect_kind(EventKind::DrawTemp).await;
    let GameEvent::DrawTemp(temp) = event else {
        unreachable!()
    };
    assert_eq!(temp.line, stroke);
    clients[guesser_idx].expect_kind(EventKind::Draw).await;

    // A non-drawer's draw events are dropped: the drawer must see the
    // sentinel chat without any canvas event in between.
    let guesser_user = clients[guesser_idx].user.clone();
    clients[guesser_idx].send(&GameEvent::DrawTemp(DrawTempEvent {
        user: guesser_user.clone(),
        line: stroke.clone(),
    }));
    clients[guesser_idx].send(&GameEvent::Draw(DrawEvent {
        user: guesser_user,
        action: DrawAction::Undo,
    }));
    clients[drawer_idx].send_chat("!!sentinel!!");

    clients[drawer_idx]
        .expect_event(|e| {
            assert!(
                !matches!(e.kind(), EventKind::DrawTemp | EventKind::Draw),
                "non-drawer canvas event was applied"
            );
            matches!(e, GameEvent::Chat(chat) if chat.message == "!!sentinel!!")
        })
        .await;

    // A mid-game joiner rehydrates the committed line but not the word.
    let mut carol = TestClient::join(&room, "carol");
    let event = carol.expect_kind(EventKind::Rehydrate).await;
    let GameEvent::Rehydrate(rehydrate) = event else {
        unreachable!()
    };
    assert_eq!(rehydrate.lines.len(), 1);
    assert_eq!(rehydrate.lines[0], stroke);
    assert_eq!(rehydrate.game.turn_status, TurnPhase::Drawing);
    assert!(rehydrate.game.words.word.is_none());
    assert!(!rehydrate.game.words.word_length.is_empty());
    let turn_user = rehydrate.current_turn_user.expect("drawer is set");
    assert_eq!(turn_user.id, clients[drawer_idx].user.id);
}
