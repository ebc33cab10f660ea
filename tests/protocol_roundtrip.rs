//! Serialize → parse laws for every envelope type, plus property checks on
//! the censoring and scoring primitives.

use proptest::prelude::*;

use scrawl_server::game::guess::GuessTracker;
use scrawl_server::protocol::*;
use scrawl_server::words::{censor, GameWord};

fn user(id: &str) -> User {
    User::new(id, format!("name-{id}"))
}

fn sample_line() -> Line {
    Line {
        points: vec![Point { x: 0.5, y: 1.5 }, Point { x: 2.0, y: 3.0 }],
        colour_idx: 2,
        thickness_idx: 1,
    }
}

fn sample_events() -> Vec<GameEvent> {
    vec![
        GameEvent::UserJoinLeave(UserJoinLeaveEvent {
            user: user("u1"),
            action: JoinLeaveAction::Join,
        }),
        GameEvent::Rehydrate(Box::new(RehydrateEvent {
            self_user: user("u1"),
            current_turn_user: Some(user("u2")),
            chat_messages: vec![
                ChatMessageEvent::system("welcome"),
                ChatMessageEvent::user_message(user("u2"), "hi"),
            ],
            players: PlayersSummary {
                player_states: vec![PlayerSnapshot {
                    user: user("u1"),
                    points: 3,
                    wins: 1,
                    is_spectator: false,
                    is_connected: true,
                    is_ready: true,
                    is_room_leader: true,
                }],
                max_players: 8,
            },
            game: GameSummary {
                max_rounds: 2,
                max_selection_time: 5,
                max_turn_time: 60,
                round: 1,
                time_left: 42,
                status: GamePhase::Started,
                turn_status: TurnPhase::Drawing,
                player_order_ids: vec!["u1".into(), "u2".into()],
                words: WordSummary {
                    word: Some("cat".into()),
                    word_length: vec![3],
                    selections: None,
                },
            },
            lines: vec![sample_line()],
        })),
        GameEvent::Chat(ChatMessageEvent::user_message(user("u1"), "hello")),
        GameEvent::Draw(DrawEvent {
            user: user("u1"),
            action: DrawAction::Undo,
        }),
        GameEvent::Ready(ReadyEvent {
            user: user("u1"),
            ready: true,
        }),
        GameEvent::StartGame(StartGameEvent {
            player_order_ids: vec!["u2".into(), "u1".into()],
            current_turn_user: user("u2"),
        }),
        GameEvent::StartGameIssued(StartGameIssuedEvent { issuer: user("u1") }),
        GameEvent::TurnNextPlayer(TurnNextPlayerEvent::begin(user("u2"), 5)),
        GameEvent::TurnWordSelection(TurnWordSelectionEvent::begin(
            user("u2"),
            5,
            Some(vec!["cat".into(), "dog".into(), "fox".into()]),
        )),
        GameEvent::TurnWordSelected(TurnWordSelectedEvent {
            user: user("u2"),
            index: 1,
        }),
        GameEvent::TurnDrawing(TurnDrawingEvent::countdown(
            60,
            19,
            vec![Hint {
                character: 'c',
                word_index: 0,
                char_index: 0,
            }],
        )),
        GameEvent::TurnEnd(TurnEndEvent::begin(user("u2"), 5, "cat".into())),
        GameEvent::AwardPoints(AwardPointsEvent {
            guesser: PointsAward {
                user: user("u1"),
                points: 3,
            },
            drawer: PointsAward {
                user: user("u2"),
                points: 2,
            },
        }),
        GameEvent::GameOver(GameOverEvent {
            winners: vec![
                PointsAward {
                    user: user("u1"),
                    points: 4,
                },
                PointsAward {
                    user: user("u2"),
                    points: 2,
                },
            ],
        }),
        GameEvent::NewGameIssued(NewGameIssuedEvent { issuer: user("u1") }),
        GameEvent::NewGameReset(NewGameResetEvent {
            player_states: vec![],
        }),
        GameEvent::DrawTemp(DrawTempEvent {
            user: user("u1"),
            line: sample_line(),
        }),
        GameEvent::DrawSelectColour(DrawSelectColourEvent {
            user: user("u1"),
            colour_idx: 5,
        }),
        GameEvent::DrawSelectThickness(DrawSelectThicknessEvent {
            user: user("u1"),
            thickness_idx: 2,
        }),
    ]
}

#[test]
fn every_event_type_round_trips() {
    let events = sample_events();
    assert_eq!(events.len(), EventKind::ALL.len());

    for event in events {
        let frame = event.encode().expect("encode");
        let decoded = GameEvent::decode(&frame).expect("decode");
        assert_eq!(decoded, event, "round trip mismatch for {:?}", event.kind());
    }
}

#[test]
fn sample_events_cover_every_kind_exactly_once() {
    let mut kinds: Vec<u8> = sample_events().iter().map(|e| e.kind().code()).collect();
    kinds.sort_unstable();
    let expected: Vec<u8> = (0..19).collect();
    assert_eq!(kinds, expected);
}

#[test]
fn envelope_type_codes_match_the_wire_table() {
    let expectations = [
        (EventKind::UserJoinLeave, 0),
        (EventKind::Rehydrate, 1),
        (EventKind::Chat, 2),
        (EventKind::Draw, 3),
        (EventKind::Ready, 4),
        (EventKind::StartGame, 5),
        (EventKind::StartGameIssued, 6),
        (EventKind::TurnNextPlayer, 7),
        (EventKind::TurnWordSelection, 8),
        (EventKind::TurnWordSelected, 9),
        (EventKind::TurnDrawing, 10),
        (EventKind::TurnEnd, 11),
        (EventKind::AwardPoints, 12),
        (EventKind::GameOver, 13),
        (EventKind::NewGameIssued, 14),
        (EventKind::NewGameReset, 15),
        (EventKind::DrawTemp, 16),
        (EventKind::DrawSelectColour, 17),
        (EventKind::DrawSelectThickness, 18),
    ];
    for (kind, code) in expectations {
        assert_eq!(kind.code(), code);
        assert_eq!(EventKind::from_code(code), Some(kind));
    }
}

proptest! {
    #[test]
    fn chat_messages_round_trip(message in ".{0,200}", id in "[a-z0-9]{1,12}") {
        let event = GameEvent::Chat(ChatMessageEvent::user_message(
            User::new(id.clone(), id),
            message,
        ));
        let decoded = GameEvent::decode(&event.encode().unwrap()).unwrap();
        prop_assert_eq!(decoded, event);
    }

    #[test]
    fn temp_strokes_round_trip(
        xs in proptest::collection::vec(-1000.0..1000.0f64, 0..20),
        colour in 0u32..16,
        thickness in 0u32..8,
    ) {
        let points: Vec<Point> = xs.iter().map(|&x| Point { x, y: x / 2.0 }).collect();
        let event = GameEvent::DrawTemp(DrawTempEvent {
            user: User::new("u1", "u1"),
            line: Line { points, colour_idx: colour, thickness_idx: thickness },
        });
        let decoded = GameEvent::decode(&event.encode().unwrap()).unwrap();
        prop_assert_eq!(decoded, event);
    }

    #[test]
    fn censor_length_matches_input(len in 0usize..64) {
        prop_assert_eq!(censor(len).chars().count(), len);
    }

    #[test]
    fn censored_word_masks_every_token(raw in "[a-z]{1,8}( [a-z]{1,8}){0,2}") {
        let word = GameWord::new(&raw);
        let censored = word.censored();
        let masked_tokens: Vec<&str> = censored.split(' ').collect();
        let source_tokens: Vec<&str> = raw.split(' ').collect();
        prop_assert_eq!(masked_tokens.len(), source_tokens.len());
        for (masked, source) in masked_tokens.iter().zip(&source_tokens) {
            prop_assert_eq!(masked.chars().count(), source.chars().count());
            prop_assert!(masked.chars().all(|c| c == '*'));
        }
    }

    #[test]
    fn first_guesser_is_the_unique_big_award(order in proptest::sample::subsequence(
        vec!["a", "b", "c", "d", "e"], 1..5,
    )) {
        let mut players: Vec<User> = order.iter().map(|id| User::new(*id, *id)).collect();
        players.push(User::new("drawer", "drawer"));

        let mut tracker = GuessTracker::new("drawer", &players);
        let mut firsts = 0;
        let mut total_guesser_points = 0;
        let mut total_drawer_points = 0;
        for id in &order {
            let award = tracker.add_guessed(id);
            if award.first {
                firsts += 1;
                prop_assert_eq!(award.guesser_points, 3);
                prop_assert_eq!(award.drawer_points, 2);
            } else {
                prop_assert_eq!(award.guesser_points, 1);
                prop_assert_eq!(award.drawer_points, 0);
            }
            total_guesser_points += award.guesser_points;
            total_drawer_points += award.drawer_points;
        }
        prop_assert_eq!(firsts, 1);
        // Total awarded points follow directly from the guess count.
        prop_assert_eq!(total_guesser_points, 3 + (order.len() as u32 - 1));
        prop_assert_eq!(total_drawer_points, 2);
    }
}
