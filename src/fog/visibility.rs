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

use crate::board::{Color, KingSafety, LegalMoves, Mask, MoveState, Pos, Position};
use crate::Turn;

/// Squares a color can observe in one position snapshot.
pub type VisibilitySet = Mask;

/// Every square `color` could move a piece onto in `position`, counting
/// moves that would leave its own king in check.
///
/// Works whether or not it is `color`'s turn. When it is not, en passant
/// is left out since the target square belongs to the other side's move.
/// The position is not modified.
pub fn attackable_squares(position: &Position, color: Color) -> VisibilitySet {
    MoveState::for_color(position, color).reach(KingSafety::Ignored)
}

/// Squares `color` sees into: its own pieces and everything attackable.
pub fn observed_squares(position: &Position, color: Color) -> Mask {
    position.occupied_by(color) | attackable_squares(position, color)
}

/// Squares hidden from `color`: neither holding one of its pieces nor
/// attackable by it.
pub fn fog(position: &Position, color: Color) -> Mask {
    !observed_squares(position, color)
}

/// What `color` is shown of `position`: its own pieces plus any piece on
/// a square it can attack. Castling rights and the en passant target are
/// not carried over.
pub fn visible_position(position: &Position, color: Color) -> Position {
    let mut visible = Position::empty().with_turn(position.turn());
    for square in observed_squares(position, color).iter() {
        if let Some(material) = position.get(square) {
            if let Err(err) = visible.put(square, material) {
                log::error!("cannot show {material} on {square}: {err}");
            }
        }
    }
    visible
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Material, Rank, Square};
    use strum::IntoEnumIterator;
    use Square::*;

    fn after_e4() -> Position {
        Position::from_fen("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1").unwrap()
    }

    #[test]
    fn test_opening_reach() {
        let position = Position::new();
        let expected = Rank::Rank3.to_mask() | Rank::Rank4.to_mask();
        assert_eq!(attackable_squares(&position, Color::White), expected);
        let expected = Rank::Rank6.to_mask() | Rank::Rank5.to_mask();
        assert_eq!(attackable_squares(&position, Color::Black), expected);
    }
    #[test]
    fn test_reach_of_side_not_to_move() {
        let position = after_e4();
        let white = attackable_squares(&position, Color::White);
        for square in [E5, D3, F3, E2, H5, A6, C4] {
            assert!(white.contains(square), "{square}");
        }
        // the c1 bishop is still stuck behind the d2 pawn
        assert!(!white.contains(E3));
        assert!(!white.contains(G5));
        assert_eq!(position, after_e4());
    }
    #[test]
    fn test_idempotent() {
        let position = after_e4();
        assert_eq!(
            attackable_squares(&position, Color::White),
            attackable_squares(&position, Color::White)
        );
    }
    #[test]
    fn test_pinned_piece_still_sees() {
        let position = Position::from_fen("4r1k1/8/8/8/8/8/4R3/4K3 w - - 0 1").unwrap();
        let white = attackable_squares(&position, Color::White);
        assert!(white.contains(A2));
        assert!(white.contains(H2));
    }
    #[test]
    fn test_en_passant_only_for_mover() {
        let position = Position::from_fen("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 1").unwrap();
        assert!(attackable_squares(&position, Color::White).contains(D6));
        let position = Position::from_fen("4k3/8/8/3pP3/8/8/8/4K3 b - d6 0 1").unwrap();
        assert!(!attackable_squares(&position, Color::White).contains(D6));
    }
    #[test]
    fn test_no_pieces_no_reach() {
        let position = Position::from_fen("8/8/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        assert!(attackable_squares(&position, Color::Black).is_empty());
        assert!(attackable_squares(&Position::empty(), Color::White).is_empty());
    }
    #[test]
    fn test_visible_position_hides_unattacked_pieces() {
        let position = Position::from_fen("4k3/8/8/3p4/4P3/8/8/4K2n w - - 0 1").unwrap();
        let visible = visible_position(&position, Color::White);
        assert_eq!(visible.get(D5), Some(Material::BP));
        assert_eq!(visible.get(E4), Some(Material::WP));
        assert_eq!(visible.get(E1), Some(Material::WK));
        assert_eq!(visible.get(E8), None);
        assert_eq!(visible.get(H1), None);
        assert_eq!(visible.turn(), Color::White);
        assert!(!visible.castling(Color::Black).oo());
    }
    #[test]
    fn test_fog_complements_sight() {
        let position = Position::new();
        let fogged = fog(&position, Color::White);
        let black_half = [Rank::Rank5, Rank::Rank6, Rank::Rank7, Rank::Rank8]
            .into_iter()
            .fold(Mask::empty(), |mask, rank| mask | rank.to_mask());
        assert_eq!(fogged, black_half);
        assert_eq!(Square::iter().filter(|sq| !fogged.contains(*sq)).count(), 32);
    }
}
