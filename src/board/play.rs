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
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::ops::Index;

use super::material::{Color, Material};
use super::moves::{KingSafety, LegalMove, LegalMoves, Move, MoveState};
use super::position::{MatingMaterial, Pos, Position, PositionError, PositionKey};
use super::square::{Mask, Square};
use crate::Turn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BoardResult {
    CheckMate(Color),
    StaleMate,
    Insufficient,
    Repetition,
    FiftyMoves,
}

/// Every move `color` could make in `position`, whether or not it is
/// `color`'s turn there. The position is not modified.
pub fn moves_for(position: &Position, color: Color, safety: KingSafety) -> Vec<Move> {
    let state = MoveState::for_color(position, color);
    state
        .all_moves(safety)
        .into_iter()
        .map(|lm| state.move_of(lm))
        .collect()
}

/// An authoritative game: a position that only changes through legal
/// moves, along with what is needed to recognise the end of the game.
#[derive(Debug, Clone)]
pub struct Board {
    move_state: MoveState,
    repetitions: HashMap<PositionKey, u8>,
    history: Vec<Move>,
    board_result: Option<BoardResult>,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// A game from the standard starting position.
    pub fn new() -> Self {
        Self::from_position(Position::new())
    }

    pub fn from_position(position: Position) -> Self {
        let mut board = Self {
            move_state: MoveState::new(position),
            repetitions: HashMap::new(),
            history: Vec::new(),
            board_result: None,
        };
        board.update_result();
        board
    }

    pub fn from_fen(fen: &str) -> Result<Self> {
        Ok(Self::from_position(Position::from_fen(fen)?))
    }

    pub fn to_fen(&self) -> String {
        self.position().to_fen()
    }

    #[inline]
    pub fn position(&self) -> &Position {
        self.move_state.position()
    }

    /// Applies `mv` if it is legal for the side to move. A rejected move
    /// leaves the board exactly as it was.
    pub fn submit_move(&mut self, mv: Move) -> Result<LegalMove> {
        let lm = self.move_state.validate_move(mv)?;
        let played = self.move_state.move_of(lm);
        self.move_state.apply_move(lm);
        self.history.push(played);
        self.update_result();
        Ok(lm)
    }

    /// Every legal move of the side to move.
    pub fn legal_moves(&self) -> Vec<Move> {
        moves_for(self.position(), self.turn(), KingSafety::Enforced)
    }

    pub fn moves_for(&self, color: Color, safety: KingSafety) -> Vec<Move> {
        moves_for(self.position(), color, safety)
    }

    /// Legal destinations of the piece on `from`.
    pub fn destinations(&self, from: Square) -> Mask {
        self.move_state.legal_moves(from).destinations()
    }

    pub fn history(&self) -> &[Move] {
        &self.history
    }

    #[inline]
    pub fn is_check(&self) -> bool {
        self.move_state.is_check()
    }

    pub fn is_checkmate(&self) -> bool {
        matches!(self.board_result, Some(BoardResult::CheckMate(_)))
    }

    pub fn is_stalemate(&self) -> bool {
        matches!(self.board_result, Some(BoardResult::StaleMate))
    }

    pub fn is_game_over(&self) -> bool {
        self.board_result.is_some()
    }

    pub fn board_result(&self) -> Option<BoardResult> {
        self.board_result
    }

    #[inline]
    pub fn get(&self, square: Square) -> Option<Material> {
        self.position().get(square)
    }

    /// Square-level edit. Repetition history restarts from the edited
    /// position.
    pub fn put(&mut self, square: Square, material: Material) -> Result<Option<Material>, PositionError> {
        let mut position = self.position().clone();
        let replaced = position.put(square, material)?;
        self.reload(position);
        Ok(replaced)
    }

    pub fn remove(&mut self, square: Square) -> Option<Material> {
        let mut position = self.position().clone();
        let removed = position.remove(square);
        if removed.is_some() {
            self.reload(position);
        }
        removed
    }

    fn reload(&mut self, position: Position) {
        self.move_state.set_position(position);
        self.repetitions.clear();
        self.update_result();
    }

    fn update_result(&mut self) {
        use BoardResult::*;
        let repetitions = self.update_repetitions();
        let pos = self.position();
        self.board_result = if !self.can_move() {
            if self.move_state.is_check() {
                Some(CheckMate(!self.turn()))
            } else {
                Some(StaleMate)
            }
        } else if repetitions >= 3 {
            Some(Repetition)
        } else if pos.moves_since_progress() >= 100 {
            Some(FiftyMoves)
        } else if self.is_insufficient() {
            Some(Insufficient)
        } else {
            None
        };
    }

    fn update_repetitions(&mut self) -> u8 {
        if self.position().moves_since_progress() == 0 {
            // a pawn move or capture can never be undone, so no earlier
            // position can come back
            self.repetitions.clear();
        }
        let key = self.position().key();
        let count = self.repetitions.entry(key).or_insert(0);
        *count = count.saturating_add(1);
        *count
    }

    fn can_move(&self) -> bool {
        self.ours()
            .iter()
            .any(|from| !self.move_state.legal_moves(from).is_empty())
    }

    fn is_insufficient(&self) -> bool {
        use MatingMaterial::*;
        let pos = self.position();
        match pos.our_mating_material() {
            Sufficient => false,
            ours => match (ours, pos.their_mating_material()) {
                (_, Sufficient) => false,
                (LoneKing, _) => true,
                (_, LoneKing) => true,
                (TwoKnights, _) => false,
                (_, TwoKnights) => false,
                _ => true,
            },
        }
    }
}

impl Index<Square> for Board {
    type Output = Option<Material>;
    fn index(&self, index: Square) -> &Self::Output {
        self.position().index(index)
    }
}

impl Turn for Board {
    fn turn(&self) -> Color {
        self.position().turn()
    }
}

impl AsRef<Position> for Board {
    fn as_ref(&self) -> &Position {
        self.move_state.position()
    }
}

impl Pos for Board {}

#[cfg(test)]
mod tests {
    use super::*;
    use Square::*;

    fn play(board: &mut Board, moves: &[&str]) {
        for mv in moves {
            board.submit_move(mv.parse().unwrap()).unwrap();
        }
    }

    #[test]
    fn test_rejected_move_changes_nothing() {
        let mut board = Board::new();
        let fen = board.to_fen();
        assert!(board.submit_move("e2e5".parse().unwrap()).is_err());
        assert!(board.submit_move("e7e5".parse().unwrap()).is_err());
        assert_eq!(board.to_fen(), fen);
        assert!(board.history().is_empty());
    }
    #[test]
    fn test_fools_mate() {
        let mut board = Board::new();
        play(&mut board, &["f2f3", "e7e5", "g2g4"]);
        assert!(!board.is_game_over());
        play(&mut board, &["d8h4"]);
        assert!(board.is_check());
        assert!(board.is_checkmate());
        assert!(board.is_game_over());
        assert_eq!(board.board_result(), Some(BoardResult::CheckMate(Color::Black)));
        assert!(board.legal_moves().is_empty());
    }
    #[test]
    fn test_stalemate() {
        let board = Board::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        assert!(board.is_stalemate());
        assert!(!board.is_check());
    }
    #[test]
    fn test_insufficient_material() {
        let board = Board::from_fen("8/8/8/4k3/8/8/8/4K3 w - - 0 1").unwrap();
        assert_eq!(board.board_result(), Some(BoardResult::Insufficient));
    }
    #[test]
    fn test_fifty_moves() {
        let mut board = Board::from_fen("8/8/8/4k3/8/8/8/R3K3 w - - 99 80").unwrap();
        assert!(!board.is_game_over());
        play(&mut board, &["e1d1"]);
        assert_eq!(board.board_result(), Some(BoardResult::FiftyMoves));
    }
    #[test]
    fn test_threefold_repetition() {
        let mut board = Board::new();
        let shuffle = ["g1f3", "g8f6", "f3g1", "f6g8"];
        play(&mut board, &shuffle);
        assert!(!board.is_game_over());
        play(&mut board, &shuffle);
        assert_eq!(board.board_result(), Some(BoardResult::Repetition));
    }
    #[test]
    fn test_promotion_history_names_piece() {
        let mut board = Board::from_fen("4k3/1P6/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        play(&mut board, &["b7b8"]);
        assert_eq!(board.get(B8), Some(Material::WQ));
        assert_eq!(board.history()[0].to_string(), "b7b8q");
    }
    #[test]
    fn test_moves_for_other_side() {
        let mut board = Board::new();
        play(&mut board, &["e2e4"]);
        let fen = board.to_fen();
        let white = board.moves_for(Color::White, KingSafety::Ignored);
        assert!(white.contains(&Move::new(D1, H5, None)));
        assert!(white.contains(&Move::new(F1, A6, None)));
        assert_eq!(board.to_fen(), fen);
        assert_eq!(board.turn(), Color::Black);
        assert_eq!(board.legal_moves().len(), 20);
    }
    #[test]
    fn test_castle_only_onto_king_square() {
        let mut board = Board::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        assert!(board.submit_move("e1h1".parse().unwrap()).is_err());
        assert!(board.submit_move("e1a1".parse().unwrap()).is_err());
        assert_eq!(board.get(E1), Some(Material::WK));
        assert_eq!(board.destinations(E1) & Mask::from_squares([A1, H1]), Mask::empty());
        play(&mut board, &["e1g1"]);
        assert_eq!(board.get(G1), Some(Material::WK));
        assert_eq!(board.get(F1), Some(Material::WR));
        assert_eq!(board.history()[0].to_string(), "e1g1");
    }
    #[test]
    fn test_square_edits() {
        let mut board = Board::new();
        assert_eq!(board.remove(D8), Some(Material::BQ));
        assert_eq!(board.get(D8), None);
        assert_eq!(board.put(D3, Material::BQ), Ok(None));
        assert!(board.put(D4, Material::BK).is_err());
        assert!(board.destinations(D2).is_empty());
        assert_eq!(board.destinations(E2), Mask::from_squares([D3, E3, E4]));
    }
}
