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

//! Material-only alpha-beta search used as the default move suggester.

use anyhow::Result;

use crate::board::{Color, KingSafety, LegalMoves, Move, MoveState, Piece, Pos, Position};
use crate::fog::Suggest;
use crate::Turn;

const INFINITY: i32 = 1_000_000;
const CHECKMATE: i32 = 100_000;

/// Fixed-depth negamax over material. Every root move is scored with a
/// full window so the whole list can be ranked, not just the best move.
#[derive(Debug, Clone, Default)]
pub struct MaterialSearch {
    nodes: u64,
}

impl MaterialSearch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Positions visited by the most recent search.
    pub fn nodes(&self) -> u64 {
        self.nodes
    }

    /// Every move of the side to move with its score, best first. Moves
    /// with equal scores keep their generation order.
    pub fn rank(&mut self, position: &Position, depth: u8) -> Vec<(Move, i32)> {
        self.nodes = 0;
        let state = MoveState::new(position.clone());
        let mut ranked: Vec<(Move, i32)> = state
            .all_moves(KingSafety::Enforced)
            .into_iter()
            .map(|lm| {
                let mut next = position.clone();
                next.apply_move(lm);
                let score = -self.negamax(&next, depth.saturating_sub(1), -INFINITY, INFINITY, 1);
                (state.move_of(lm), score)
            })
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked
    }

    fn negamax(&mut self, position: &Position, depth: u8, mut alpha: i32, beta: i32, ply: i32) -> i32 {
        self.nodes += 1;
        let state = MoveState::new(position.clone());
        let moves = state.all_moves(KingSafety::Enforced);
        if moves.is_empty() {
            // prefer quicker mates
            return if state.is_check() { ply - CHECKMATE } else { 0 };
        }
        if depth == 0 {
            return evaluate(position);
        }
        let mut best = -INFINITY;
        for lm in moves {
            let mut next = position.clone();
            next.apply_move(lm);
            let score = -self.negamax(&next, depth - 1, -beta, -alpha, ply + 1);
            best = best.max(score);
            alpha = alpha.max(score);
            if alpha >= beta {
                break;
            }
        }
        best
    }
}

impl Suggest for MaterialSearch {
    fn suggest(&mut self, fen: &str, depth: u8) -> Result<Vec<Move>> {
        let position = Position::from_fen(fen)?;
        let ranked = self.rank(&position, depth);
        log::trace!("searched {} nodes for {fen}", self.nodes);
        Ok(ranked.into_iter().map(|(mv, _)| mv).collect())
    }
}

pub fn piece_value(piece: Piece) -> i32 {
    match piece {
        Piece::Pawn => 1,
        Piece::Knight => 3,
        Piece::Bishop => 3,
        Piece::Rook => 5,
        Piece::Queen => 9,
        Piece::King => 10,
    }
}

/// Material balance from the point of view of the side to move.
pub fn evaluate(position: &Position) -> i32 {
    let side = |color: Color| -> i32 {
        position
            .occupied_by(color)
            .iter()
            .filter_map(|square| position.contents(square))
            .map(|material| piece_value(material.piece()))
            .sum()
    };
    side(position.turn()) - side(!position.turn())
}
