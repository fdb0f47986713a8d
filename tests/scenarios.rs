// Copyright 2023 Tobin Edwards
//
//    Licensed under the Apache License, Version 2.0 (the "License");
//    you may not use this file except in compliance with the License.
//    You may obtain a copy of the License at
//
//        http://www.apache.org/licenses/LICENSE-2.0
//
//    Unless required by applicable law or agreed to in writing, software
//    distributed under the License is distributed on an "AS IS" BASIS,
//    WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//    See the License for the specific language governing permissions and
//    limitations under the License.

use anyhow::Result;
use kriegspiel::Square::*;
use kriegspiel::*;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Replays a fixed list of candidates on every request.
struct Scripted(Vec<Move>);

impl Scripted {
    fn new(moves: &[&str]) -> Self {
        Self(moves.iter().map(|mv| mv.parse().unwrap()).collect())
    }
}

impl Suggest for Scripted {
    fn suggest(&mut self, _fen: &str, _depth: u8) -> Result<Vec<Move>> {
        Ok(self.0.clone())
    }
}

fn scripted_session(moves: &[&str]) -> Session<Scripted, StdRng> {
    Session::new(
        GameId::new(1),
        SessionConfig::default(),
        Scripted::new(moves),
        StdRng::seed_from_u64(1),
    )
}

#[test]
fn human_opens_and_hands_over() {
    init_logging();
    let mut session = Session::seeded(SessionConfig::default(), 2024);
    assert_eq!(session.status(), Status::YourTurn);
    session.human_move(E2, E4).unwrap();
    assert_eq!(session.turn(), Color::Black);
    assert_eq!(session.phase(), TurnPhase::AutomatedToMove);
    assert_eq!(session.status().to_string(), "AI is thinking ...");
}

#[test]
fn reach_after_king_pawn_opening() {
    init_logging();
    let mut board = Board::new();
    board.submit_move("e2e4".parse().unwrap()).unwrap();
    let reach = attackable_squares(board.position(), Color::White);
    for square in [D3, F3, E5, E2, H5, A6, A3, H3] {
        assert!(reach.contains(square), "{square} should be attackable");
    }
    // no white move lands on e3 or on black's half
    assert!(!reach.contains(E3));
    assert!(!reach.contains(E6));

    let seen = observed_squares(board.position(), Color::White);
    for square in board.position().occupied_by(Color::White).iter() {
        assert!(seen.contains(square));
    }
    assert_eq!(seen & reach, reach);
}

#[test]
fn stale_king_capture_falls_back_to_random_move() {
    init_logging();
    // the white king went to g2 unseen and a pawn now blocks the e-file
    let mut truth = Board::from_fen("4k3/4r3/8/8/8/4P3/6K1/8 b - - 0 1").unwrap();
    let mut belief = Position::from_fen("4k3/4r3/8/8/8/8/8/4K3 b - - 0 1").unwrap();
    let controller = TurnController::new(Color::Black);
    assert_eq!(controller.evaluate(&truth), TurnPhase::AutomatedToMove);

    let legal = truth.legal_moves();
    let mut player = AutomatedPlayer::new(
        Color::Black,
        Scripted::new(&["e7e1"]),
        3,
        PromotionPolicy::AlwaysQueen,
    );
    let mut rng = StdRng::seed_from_u64(99);
    let decision = player.decide(&mut truth, &mut belief, &mut rng).unwrap();

    assert_eq!(decision.source, DecisionSource::Fallback);
    assert!(legal.contains(&decision.mv));
    assert_eq!(truth.history(), &[decision.mv]);
    assert_eq!(truth.turn(), Color::White);
    assert_eq!(controller.evaluate(&truth), TurnPhase::HumanToMove);
    for square in truth.position().occupied_by(Color::Black).iter() {
        assert_eq!(belief.get(square), truth.get(square));
    }
}

#[test]
fn fallback_still_hands_turn_back() {
    init_logging();
    let nothing = |_: &str, _: u8| -> Result<Vec<Move>> { Ok(Vec::new()) };
    let mut session = Session::new(
        GameId::new(7),
        SessionConfig::default(),
        nothing,
        StdRng::seed_from_u64(7),
    );
    session.human_move(D2, D4).unwrap();
    let decision = session.tick().unwrap().unwrap();
    assert_eq!(decision.source, DecisionSource::Fallback);
    assert_eq!(session.phase(), TurnPhase::HumanToMove);
    assert_eq!(session.status(), Status::YourTurn);
    assert_eq!(session.history().len(), 2);
    assert!(!session.is_pending());
}

#[test]
fn human_in_check_sees_check_status() {
    init_logging();
    let mut session = scripted_session(&["e7e6", "f8b4"]);
    session.human_move(D2, D4).unwrap();
    session.tick().unwrap();
    session.human_move(H2, H3).unwrap();
    let decision = session.tick().unwrap().unwrap();
    assert_eq!(decision.mv, Move::new(F8, B4, None));
    assert_eq!(decision.source, DecisionSource::Suggested(1));

    assert_eq!(session.phase(), TurnPhase::HumanToMove);
    assert_eq!(session.status().to_string(), "Check!");
    // ignoring the check is rejected and changes nothing
    assert!(session.human_move(H3, H4).is_err());
    assert_eq!(session.status(), Status::Check);
    // nothing white has reaches b4, so the checking bishop stays hidden
    assert_eq!(session.visible_position().get(B4), None);
    assert!(session.fog().contains(B4));

    session.human_move(C2, C3).unwrap();
    assert_eq!(session.phase(), TurnPhase::AutomatedToMove);
}

#[test]
fn checkmate_ends_the_game() {
    init_logging();
    let mut session = scripted_session(&["e7e5", "d8h4"]);
    session.human_move(F2, F3).unwrap();
    session.tick().unwrap();
    session.human_move(G2, G4).unwrap();
    session.tick().unwrap();
    assert_eq!(
        session.phase(),
        TurnPhase::GameOver(BoardResult::CheckMate(Color::Black))
    );
    assert_eq!(session.status().to_string(), "Checkmate!");
    assert_eq!(
        session.result(),
        Some(GameResult::Win(Color::Black, WinReason::CheckMate))
    );
    assert!(session.reveal().is_some());
    assert!(session.human_move(A2, A3).is_err());
    assert_eq!(session.tick().unwrap(), None);
    let events = session.drain_events();
    assert_eq!(
        events.last(),
        Some(&Event::GameOver(GameResult::Win(Color::Black, WinReason::CheckMate)))
    );
}

#[test]
fn thinking_precedes_every_automated_move() {
    init_logging();
    let config = SessionConfig {
        search_depth: 1,
        ..SessionConfig::default()
    };
    let mut session = Session::seeded(config, 31);
    let mut rng = StdRng::seed_from_u64(31);
    let mut plies = 0;
    while !session.phase().is_game_over() && plies < 60 {
        // the human only knows its own pieces and what it can see
        let visible = session.visible_position();
        let mut intents: Vec<(Square, Square)> = visible
            .occupied_by(Color::White)
            .iter()
            .flat_map(|from| Mask::all().iter().map(move |to| (from, to)))
            .collect();
        intents.shuffle(&mut rng);
        let accepted = intents
            .into_iter()
            .any(|(from, to)| session.human_move(from, to).is_ok());
        assert!(accepted);
        if session.phase() == TurnPhase::AutomatedToMove {
            assert!(session.tick().unwrap().is_some());
        }
        plies += 2;
    }

    let events = session.drain_events();
    let mut awaiting = false;
    for event in events {
        match event {
            Event::Thinking => {
                assert!(!awaiting);
                awaiting = true;
            }
            Event::AutomatedMoved(_) => {
                assert!(awaiting);
                awaiting = false;
            }
            _ => {}
        }
    }
}
