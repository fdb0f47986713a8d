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

use kriegspiel::*;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

const GAMES: u64 = 24;
const MAX_PLIES: usize = 160;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Plays random games and hands every position reached to `check`.
fn random_games<F>(mut check: F)
where
    F: FnMut(&Board),
{
    for seed in 0..GAMES {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut board = Board::new();
        check(&board);
        for _ in 0..MAX_PLIES {
            if board.is_game_over() {
                break;
            }
            let moves = board.legal_moves();
            let mv = *moves.choose(&mut rng).unwrap();
            board.submit_move(mv).unwrap();
            check(&board);
        }
    }
}

#[test]
fn own_pieces_are_always_known() {
    init_logging();
    let mut beliefs = [Position::new(), Position::new()];
    random_games(|board| {
        if board.history().is_empty() {
            beliefs = [Position::new(), Position::new()];
        }
        for (belief, color) in beliefs.iter_mut().zip([Color::White, Color::Black]) {
            let visibility = attackable_squares(board.position(), color);
            *belief = reconcile(belief, board.position(), visibility, color);
            for square in Mask::all().iter() {
                let truth = board.get(square).filter(|m| m.color() == color);
                let believed = belief.get(square).filter(|m| m.color() == color);
                assert_eq!(believed, truth, "{color} at {square}");
            }
        }
    });
}

#[test]
fn visible_squares_match_the_truth() {
    init_logging();
    let mut belief = Position::new();
    random_games(|board| {
        if board.history().is_empty() {
            belief = Position::new();
        }
        let visibility = attackable_squares(board.position(), Color::Black);
        belief = reconcile(&belief, board.position(), visibility, Color::Black);
        for square in visibility.iter() {
            assert_eq!(belief.get(square), board.get(square), "{square}");
        }
    });
}

#[test]
fn unseen_squares_keep_their_memory() {
    init_logging();
    let color = Color::White;
    let mut belief = Position::new();
    random_games(|board| {
        if board.history().is_empty() {
            belief = Position::new();
        }
        let visibility = attackable_squares(board.position(), color);
        let next = reconcile(&belief, board.position(), visibility, color);
        for square in Mask::all().iter() {
            let ours = |m: Option<Material>| m.map_or(false, |m| m.color() == color);
            let remembered = belief.get(square);
            let foreign_king = remembered.map_or(false, |m| m == Material::BK);
            if visibility.contains(square)
                || ours(board.get(square))
                || ours(remembered)
                || foreign_king
            {
                continue;
            }
            assert_eq!(next.get(square), remembered, "{square}");
        }
        belief = next;
    });
}

#[test]
fn reach_ignores_whose_turn_it_is() {
    init_logging();
    random_games(|board| {
        let before = board.position().clone();
        for color in [Color::White, Color::Black] {
            let once = attackable_squares(board.position(), color);
            let twice = attackable_squares(board.position(), color);
            assert_eq!(once, twice);
            let flipped = board.position().with_turn(!board.turn());
            if color != board.turn() {
                assert_eq!(attackable_squares(&flipped, color), once);
            }
            // a side never moves onto its own pieces
            assert!((once & board.position().occupied_by(color)).is_empty());
        }
        assert_eq!(board.position(), &before);
    });
}

#[test]
fn reach_covers_every_legal_destination() {
    init_logging();
    random_games(|board| {
        let reach = attackable_squares(board.position(), board.turn());
        for mv in board.legal_moves() {
            assert!(reach.contains(mv.to), "{mv}");
        }
    });
}

#[test]
fn automated_player_always_moves() {
    init_logging();
    for seed in 0..8 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut truth = Board::new();
        let mut belief = Position::new();
        // suggests a random pseudo-move, usually illegal
        let noise = move |_: &str, _: u8| -> anyhow::Result<Vec<Move>> {
            let from = Square::from_index((seed as usize * 7) % 64);
            let to = Square::from_index((seed as usize * 13 + 5) % 64);
            Ok(vec![Move::new(from, to, None)])
        };
        let mut player = AutomatedPlayer::new(Color::Black, noise, 1, PromotionPolicy::AlwaysQueen);
        for _ in 0..40 {
            if truth.is_game_over() {
                break;
            }
            if truth.turn() == Color::White {
                let moves = truth.legal_moves();
                truth.submit_move(*moves.choose(&mut rng).unwrap()).unwrap();
                continue;
            }
            let legal = truth.legal_moves();
            let plies = truth.history().len();
            let decision = player.decide(&mut truth, &mut belief, &mut rng).unwrap();
            assert!(legal.contains(&decision.mv));
            assert_eq!(truth.history().len(), plies + 1);
            assert_eq!(truth.turn(), Color::White);
        }
    }
}
