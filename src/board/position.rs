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

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::hash::Hash;
use std::ops::{Index, IndexMut};
use strum::IntoEnumIterator;
use thiserror::Error;

use super::castling::CastlingRights;
use super::material::{Color, Material, Pair, Piece};
use super::moves::LegalMove;
use super::square::{Direction, File, Mask, Rank, Square};
use crate::Turn;

use Color::*;
use Piece::*;
use Rank::*;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionError {
    #[error("{0} already has a king on {1}")]
    DuplicateKing(Color, Square),
}

/// Counts half-moves from the start of the game. Even values are white's
/// turn, odd values black's.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MoveId(u16);

impl MoveId {
    pub const START: MoveId = MoveId(0);

    #[inline]
    pub fn new(move_count: u16, turn: Color) -> Self {
        match turn {
            White => Self(move_count * 2),
            Black => Self(move_count * 2 + 1),
        }
    }
    #[inline]
    pub fn turn(&self) -> Color {
        const TURNS: [Color; 2] = [White, Black];
        let index = self.value() % 2;
        TURNS[index]
    }
    #[inline]
    pub fn value(&self) -> usize {
        self.0 as usize
    }
    #[inline]
    pub fn move_count(&self) -> u16 {
        self.0 / 2
    }
    #[inline]
    pub fn move_number(&self) -> usize {
        1 + self.move_count() as usize
    }
    #[inline]
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl Default for MoveId {
    #[inline]
    fn default() -> Self {
        MoveId::START
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatingMaterial {
    Sufficient,
    TwoKnights,
    OneKnight,
    OneBishop,
    LoneKing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Squares([Option<Material>; 64]);

impl Squares {
    fn empty() -> Self {
        Self([None; 64])
    }
}

impl Index<Square> for Squares {
    type Output = Option<Material>;
    fn index(&self, index: Square) -> &Self::Output {
        &self.0[index.to_index()]
    }
}

impl IndexMut<Square> for Squares {
    fn index_mut(&mut self, index: Square) -> &mut Self::Output {
        &mut self.0[index.to_index()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Masks {
    pieces: Pair<Mask>,
    kings: Mask,
    queens: Mask,
    rooks: Mask,
    bishops: Mask,
    knights: Mask,
    pawns: Mask,
}

impl Masks {
    fn empty() -> Self {
        Self {
            pieces: Pair::new(Mask::empty(), Mask::empty()),
            kings: Mask::empty(),
            queens: Mask::empty(),
            rooks: Mask::empty(),
            bishops: Mask::empty(),
            knights: Mask::empty(),
            pawns: Mask::empty(),
        }
    }

    fn piece_mut(&mut self, piece: Piece) -> &mut Mask {
        match piece {
            King => &mut self.kings,
            Queen => &mut self.queens,
            Rook => &mut self.rooks,
            Bishop => &mut self.bishops,
            Knight => &mut self.knights,
            Pawn => &mut self.pawns,
        }
    }
}

/// Identifies a position for repetition counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PositionKey {
    turn: Color,
    en_passant: Option<Square>,
    castling: Pair<CastlingRights>,
    masks: Masks,
}

/// A complete board state: square contents, side to move, castling rights,
/// en passant target and move counters.
///
/// Apart from `apply_move`, the square-level mutators `put` and `remove`
/// are public so that a partial (believed) position can be patched one
/// square at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    squares: Squares,
    masks: Masks,
    castling: Pair<CastlingRights>,
    en_passant: Option<Square>,
    next_move_id: MoveId,
    moves_since_progress: u16,
}

impl Default for Position {
    fn default() -> Self {
        Self::new()
    }
}

impl Position {
    /// The standard starting position.
    pub fn new() -> Self {
        const BACK_RANK: [Piece; 8] = [Rook, Knight, Bishop, Queen, King, Bishop, Knight, Rook];
        let mut position = Self::empty();
        for (file, piece) in File::iter().zip(BACK_RANK) {
            position.init_file(file, piece);
        }
        position.castling = Pair::default();
        position
    }

    /// A board with no pieces and no castling rights, white to move.
    pub fn empty() -> Self {
        Self {
            squares: Squares::empty(),
            masks: Masks::empty(),
            castling: Pair::new(
                CastlingRights::new(White, false, false),
                CastlingRights::new(Black, false, false),
            ),
            en_passant: None,
            next_move_id: MoveId::START,
            moves_since_progress: 0,
        }
    }

    fn init_file(&mut self, file: File, piece: Piece) {
        const PAWN_RANKS: Pair<Rank> = Pair::new(Rank2, Rank7);
        const BACK_RANKS: Pair<Rank> = Pair::new(Rank1, Rank8);
        for color in Color::iter() {
            self.place(Square::new(file, PAWN_RANKS[color]), Material::new(color, Pawn));
            self.place(Square::new(file, BACK_RANKS[color]), Material::new(color, piece));
        }
    }

    pub(super) fn from_parts(
        squares: [Option<Material>; 64],
        turn: Color,
        castling: Pair<CastlingRights>,
        en_passant: Option<Square>,
        moves_since_progress: u16,
        move_number: u16,
    ) -> Self {
        let mut position = Self::empty();
        for square in Square::iter() {
            if let Some(material) = squares[square.to_index()] {
                position.place(square, material);
            }
        }
        position.castling = castling;
        position.en_passant = en_passant;
        position.moves_since_progress = moves_since_progress;
        position.next_move_id = MoveId::new(move_number.saturating_sub(1), turn);
        position
    }

    pub fn key(&self) -> PositionKey {
        PositionKey {
            turn: self.turn(),
            en_passant: self.en_passant,
            castling: self.castling,
            masks: self.masks,
        }
    }

    #[inline]
    pub fn get(&self, square: Square) -> Option<Material> {
        self.squares[square]
    }

    pub fn move_number(&self) -> usize {
        self.next_move_id.move_number()
    }

    pub fn moves_since_progress(&self) -> usize {
        self.moves_since_progress as usize
    }

    pub fn en_passant(&self) -> Option<Square> {
        self.en_passant
    }

    pub fn castling(&self, color: Color) -> &CastlingRights {
        &self.castling[color]
    }

    pub(super) fn castling_pair(&self) -> &Pair<CastlingRights> {
        &self.castling
    }

    pub fn set_castling(&mut self, rights: CastlingRights) {
        self.castling[rights.color()] = rights;
    }

    /// A copy of this position with `color` to move.
    ///
    /// When the turn actually changes the en passant target is cleared: it
    /// belongs to the other side's move and would otherwise enable or
    /// disable captures that do not exist.
    pub fn with_turn(&self, color: Color) -> Position {
        let mut position = self.clone();
        if position.turn() != color {
            position.next_move_id = MoveId::new(self.next_move_id.move_count(), color);
            position.en_passant = None;
        }
        position
    }

    pub fn our_mating_material(&self) -> MatingMaterial {
        self.mating_material(self.turn())
    }

    pub fn their_mating_material(&self) -> MatingMaterial {
        self.mating_material(!self.turn())
    }

    fn mating_material(&self, side: Color) -> MatingMaterial {
        let pieces = self.masks.pieces[side] & !self.masks.kings;
        let heavy = self.masks.pawns | self.masks.rooks | self.masks.queens;
        if !(pieces & heavy).is_empty() || pieces.len() > 2 {
            return MatingMaterial::Sufficient;
        }
        let knights = pieces & self.masks.knights;
        match (pieces.len(), knights.len()) {
            (0, _) => MatingMaterial::LoneKing,
            (1, 1) => MatingMaterial::OneKnight,
            (1, _) => MatingMaterial::OneBishop,
            (2, 2) => MatingMaterial::TwoKnights,
            _ => MatingMaterial::Sufficient,
        }
    }

    /// Applies a move generated for this position and toggles the turn.
    pub fn apply_move(&mut self, mv: LegalMove) -> MoveId {
        self.moves_since_progress += 1;
        let mut progress = false;
        match mv {
            LegalMove::Standard(from, to) => {
                let material = self.lift(from);
                let captured = self.place(to, material);
                progress = captured.is_some() || material.piece() == Pawn;
                self.en_passant = None;
                self.update_castling(from, to);
            }
            LegalMove::EnPassant(from, to) => {
                let material = self.lift(from);
                let _ = self.remove(Square::new(to.file(), from.rank()));
                self.place(to, material);
                self.en_passant = None;
                progress = true;
            }
            LegalMove::DoubleAdvance(from, to) => {
                let material = self.lift(from);
                self.place(to, material);
                self.en_passant = between(from, to).iter().next();
                progress = true;
            }
            LegalMove::Promoting(from, to, promotion) => {
                let mut material = self.lift(from);
                material.set_piece(promotion.into());
                self.place(to, material);
                self.en_passant = None;
                self.update_castling(from, to);
                progress = true;
            }
            LegalMove::ShortCastle => {
                let rights = self.castling[self.turn()];
                let king = self.lift(rights.king_src());
                let rook = self.lift(rights.oo_rook_src());
                self.place(rights.oo_king_dest(), king);
                self.place(rights.oo_rook_dest(), rook);
                let turn = self.turn();
                self.castling[turn].clear();
                self.en_passant = None;
            }
            LegalMove::LongCastle => {
                let rights = self.castling[self.turn()];
                let king = self.lift(rights.king_src());
                let rook = self.lift(rights.ooo_rook_src());
                self.place(rights.ooo_king_dest(), king);
                self.place(rights.ooo_rook_dest(), rook);
                let turn = self.turn();
                self.castling[turn].clear();
                self.en_passant = None;
            }
        };
        if progress {
            self.moves_since_progress = 0;
        }
        let move_id = self.next_move_id;
        self.next_move_id = move_id.next();
        move_id
    }

    fn update_castling(&mut self, from: Square, to: Square) {
        for color in Color::iter() {
            self.castling[color].update(from);
            self.castling[color].update(to);
        }
    }

    /// Places `material` on `square`, returning whatever was there.
    ///
    /// Fails without touching the board if `material` is a king and its
    /// side already has a king on another square.
    pub fn put(&mut self, square: Square, material: Material) -> Result<Option<Material>, PositionError> {
        if material.piece() == King {
            if let Some(king) = self.king(material.color()) {
                if king != square {
                    return Err(PositionError::DuplicateKing(material.color(), king));
                }
            }
        }
        Ok(self.place(square, material))
    }

    /// Empties `square`, returning whatever was there.
    pub fn remove(&mut self, square: Square) -> Option<Material> {
        let material = self.squares[square]?;
        self.squares[square] = None;
        let mask = !square.to_mask();
        self.masks.pieces[material.color()] &= mask;
        *self.masks.piece_mut(material.piece()) &= mask;
        Some(material)
    }

    fn place(&mut self, square: Square, material: Material) -> Option<Material> {
        let replaced = self.remove(square);
        self.squares[square] = Some(material);
        let mask = square.to_mask();
        self.masks.pieces[material.color()] |= mask;
        *self.masks.piece_mut(material.piece()) |= mask;
        replaced
    }

    fn lift(&mut self, square: Square) -> Material {
        // Safety: moves are generated from this position, so there is
        // always a piece on the source square
        self.remove(square).unwrap()
    }
}

impl Turn for Position {
    #[inline]
    fn turn(&self) -> Color {
        self.next_move_id.turn()
    }
}

impl Index<Square> for Position {
    type Output = Option<Material>;
    #[inline]
    fn index(&self, index: Square) -> &Self::Output {
        &self.squares[index]
    }
}

impl AsRef<Self> for Position {
    fn as_ref(&self) -> &Self {
        self
    }
}

impl Pos for Position {}

/// Read-only bitboard queries shared by everything that wraps a position.
pub trait Pos: Turn + AsRef<Position> {
    #[inline]
    fn contents(&self, square: Square) -> Option<Material> {
        let pos: &Position = self.as_ref();
        pos.squares[square]
    }
    #[inline]
    fn occupied_by(&self, color: Color) -> Mask {
        let pos: &Position = self.as_ref();
        pos.masks.pieces[color]
    }
    #[inline]
    fn kings(&self) -> Mask {
        let pos: &Position = self.as_ref();
        pos.masks.kings
    }
    #[inline]
    fn queens(&self) -> Mask {
        let pos: &Position = self.as_ref();
        pos.masks.queens
    }
    #[inline]
    fn rooks(&self) -> Mask {
        let pos: &Position = self.as_ref();
        pos.masks.rooks
    }
    #[inline]
    fn bishops(&self) -> Mask {
        let pos: &Position = self.as_ref();
        pos.masks.bishops
    }
    #[inline]
    fn knights(&self) -> Mask {
        let pos: &Position = self.as_ref();
        pos.masks.knights
    }
    #[inline]
    fn pawns(&self) -> Mask {
        let pos: &Position = self.as_ref();
        pos.masks.pawns
    }
    /// The king of `color`, if it has exactly one.
    #[inline]
    fn king(&self, color: Color) -> Option<Square> {
        let mask = self.occupied_by(color) & self.kings();
        if mask.len() == 1 {
            mask.iter().next()
        } else {
            None
        }
    }
    #[inline]
    fn our_king(&self) -> Option<Square> {
        self.king(self.turn())
    }
    #[inline]
    fn is_vacant(&self, square: Square) -> bool {
        self.contents(square).is_none()
    }
    #[inline]
    fn occupied(&self) -> Mask {
        self.occupied_by(White) | self.occupied_by(Black)
    }
    #[inline]
    fn ours(&self) -> Mask {
        self.occupied_by(self.turn())
    }
    #[inline]
    fn theirs(&self) -> Mask {
        self.occupied_by(!self.turn())
    }
    /// Pieces that slide along ranks and files.
    #[inline]
    fn horizontals(&self) -> Mask {
        self.rooks() | self.queens()
    }
    /// Pieces that slide along diagonals.
    #[inline]
    fn diagonals(&self) -> Mask {
        self.bishops() | self.queens()
    }
}

#[inline]
pub(super) fn shielded(from: Square, to: Square) -> Mask {
    let index = from.to_index() * 64 + to.to_index();
    SQUARES_SHIELDED[index]
}

#[inline]
pub(super) fn between(from: Square, to: Square) -> Mask {
    let index = from.to_index() * 64 + to.to_index();
    SQUARES_BETWEEN[index]
}

pub(super) static SQUARES_BETWEEN: Lazy<Vec<Mask>> = Lazy::new(|| {
    // Squares strictly between `start` and `end` if they share a line,
    // otherwise empty.
    fn squares_between(start: Square, end: Square) -> Mask {
        let mut mask = Mask::empty();
        if let Some(step) = (end - start).to_unit() {
            let mut next = start + step;
            while let Some(square) = next {
                if square == end {
                    break;
                }
                mask |= square;
                next = square + step;
            }
        }
        mask
    }

    let mut array = vec![Mask::empty(); 64 * 64];
    for start in Square::iter() {
        for end in Square::iter() {
            if start != end && ALL_LINES[start].contains(end) {
                array[start.to_index() * 64 + end.to_index()] = squares_between(start, end);
            }
        }
    }
    array
});

pub(super) static SQUARES_SHIELDED: Lazy<Vec<Mask>> = Lazy::new(|| {
    // Squares beyond `end` (exclusive) up to the edge of the board on the
    // line drawn from `start` through `end`.
    fn squares_shielded(start: Square, end: Square) -> Mask {
        let mut mask = Mask::empty();
        if let Some(step) = (end - start).to_unit() {
            let mut next = end + step;
            while let Some(square) = next {
                mask |= square;
                next = square + step;
            }
        }
        mask
    }

    let mut array = vec![Mask::empty(); 64 * 64];
    for start in Square::iter() {
        for end in Square::iter() {
            if start != end && ALL_LINES[start].contains(end) {
                array[start.to_index() * 64 + end.to_index()] = squares_shielded(start, end);
            }
        }
    }
    array
});

pub(super) static HORIZONTALS: Lazy<[Mask; 64]> = Lazy::new(|| {
    let mut array = [Mask::default(); 64];
    for square in Square::iter() {
        array[square] = square.file().to_mask() | square.rank().to_mask();
    }
    array
});

pub(super) static DIAGONALS: Lazy<[Mask; 64]> = Lazy::new(|| {
    let mut array = [Mask::default(); 64];
    for square in Square::iter() {
        let mut mask = square.to_mask();
        Direction::diagonals().for_each(|dir| {
            let mut next = square + dir;
            while let Some(sq) = next {
                mask |= sq;
                next = sq + dir;
            }
        });
        array[square] = mask;
    }
    array
});

pub(super) static ALL_LINES: Lazy<[Mask; 64]> = Lazy::new(|| {
    let mut array = [Mask::default(); 64];
    for square in Square::iter() {
        array[square] = HORIZONTALS[square] | DIAGONALS[square];
    }
    array
});

#[cfg(test)]
impl Position {
    pub fn set_contents(mut self, square: Square, value: Option<Material>) -> Self {
        match value {
            Some(material) => {
                self.place(square, material);
            }
            None => {
                self.remove(square);
            }
        }
        self
    }
    pub fn set_en_passant(mut self, value: Option<Square>) -> Self {
        self.en_passant = value;
        self
    }
}
