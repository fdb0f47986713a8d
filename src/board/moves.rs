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
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::ops::Index;
use std::ops::{BitOr, BitOrAssign};
use std::str::FromStr;
use strum::IntoEnumIterator;
use thiserror::Error;

use super::material::{Color, Material, Pair, Piece};
use super::position::{between, shielded};
use super::position::{MoveId, Pos, Position};
use super::position::{ALL_LINES, DIAGONALS, HORIZONTALS};
use super::square::{Direction, File, Mask, Offset, ParseSquareError, Rank, Square};
use crate::Turn;

use Color::*;
use Piece::*;
use Rank::*;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MoveError {
    #[error("Not a legal move")]
    IllegalMove,
    #[error("Cannot parse move {0:?}")]
    Unparsable(String),
}
use MoveError::*;

impl From<ParseSquareError> for MoveError {
    fn from(value: ParseSquareError) -> Self {
        Unparsable(value.0)
    }
}

/// Whether generated moves may leave the mover's own king in check.
///
/// `Ignored` yields the raw reach of every piece: what the side could
/// move onto if its own king did not matter. Castling still follows its
/// own rules in both modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KingSafety {
    #[default]
    Enforced,
    Ignored,
}

/// A position together with the attack information needed to tell which
/// moves the side to move may play.
#[derive(Debug, Clone)]
pub struct MoveState {
    position: Position,
    checks: Mask,
    attackers: [Mask; 64],
    pinned: [Option<Mask>; 64],
}

impl Default for MoveState {
    fn default() -> Self {
        Self::new(Position::default())
    }
}

impl Turn for MoveState {
    fn turn(&self) -> Color {
        self.position.turn()
    }
}

impl AsRef<Self> for MoveState {
    fn as_ref(&self) -> &Self {
        self
    }
}

impl AsRef<Position> for MoveState {
    fn as_ref(&self) -> &Position {
        &self.position
    }
}

impl Pos for MoveState {}

impl LegalMoves for MoveState {}

impl MoveState {
    pub fn new(position: Position) -> Self {
        let mut result = Self {
            position,
            checks: Mask::empty(),
            attackers: [Mask::empty(); 64],
            pinned: [None; 64],
        };
        result.init();
        result
    }

    /// Move generation for `color` regardless of whose turn it is in
    /// `position`. The position itself is left untouched.
    pub fn for_color(position: &Position, color: Color) -> Self {
        Self::new(position.with_turn(color))
    }

    pub fn apply_move(&mut self, mv: LegalMove) -> MoveId {
        let move_id = self.position.apply_move(mv);
        self.reset();
        move_id
    }

    /// Replaces the position wholesale, e.g. after square-level edits.
    pub fn set_position(&mut self, position: Position) {
        self.position = position;
        self.reset();
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    #[inline]
    pub fn is_check(&self) -> bool {
        !self.checks.is_empty()
    }
    #[inline]
    pub fn is_double_check(&self) -> bool {
        self.checks.len() > 1
    }
    #[inline]
    pub fn is_attacked(&self, square: Square) -> bool {
        !self.attackers(square).is_empty()
    }
    #[inline]
    pub fn checks(&self) -> Mask {
        self.checks
    }
    #[inline]
    pub fn attackers(&self, square: Square) -> Mask {
        self.attackers[square]
    }
    #[inline]
    pub fn pinned(&self, square: Square) -> Option<Mask> {
        self.pinned[square]
    }

    pub fn is_lane_blocked(&self, lane: Mask) -> bool {
        !(lane & self.occupied()).is_empty()
    }

    pub fn is_lane_attacked(&self, lane: Mask) -> bool {
        lane.iter().any(|square| self.is_attacked(square))
    }

    fn reset(&mut self) {
        self.checks = Mask::empty();
        self.attackers = [Mask::empty(); 64];
        self.pinned = [None; 64];
        self.init();
    }

    fn init(&mut self) {
        for from in self.theirs().iter() {
            for to in self.attacked(from).iter() {
                self.attackers[to] |= from;
            }
        }
        let Some(king) = self.our_king() else {
            return;
        };
        self.checks = self.attackers(king);
        for from in (self.theirs() & (self.horizontals() | self.diagonals())).iter() {
            if !self.lines(from).contains(king) {
                continue;
            }
            let lane = between(from, king);
            let blockers = lane & self.occupied();
            if blockers.len() == 1 {
                if let Some(square) = (blockers & self.ours()).iter().next() {
                    // the pinned piece may still capture the pinner
                    self.pinned[square] = Some(lane | from.to_mask());
                }
            }
        }
    }

    /// The lines a sliding piece on `from` moves along.
    fn lines(&self, from: Square) -> Mask {
        match self.contents(from).map(|material| material.piece()) {
            Some(Queen) => ALL_LINES[from],
            Some(Rook) => HORIZONTALS[from],
            Some(Bishop) => DIAGONALS[from],
            _ => Mask::empty(),
        }
    }

    /// Squares the piece on `from` attacks, including squares occupied by
    /// pieces of its own color (those are defended).
    fn attacked(&self, from: Square) -> Mask {
        if let Some(material) = self.contents(from) {
            return match material.piece() {
                King => KING_MOVES[from],
                Queen => self.exclude_shadowed(from, QUEEN_MOVES[from]),
                Rook => self.exclude_shadowed(from, ROOK_MOVES[from]),
                Bishop => self.exclude_shadowed(from, BISHOP_MOVES[from]),
                Knight => KNIGHT_MOVES[from],
                Pawn => PAWN_ATTACKS[material.color()][from],
            };
        }
        Mask::empty()
    }

    fn exclude_shadowed(&self, from: Square, mut mask: Mask) -> Mask {
        let occupied = self.occupied() & mask;
        for square in occupied.iter() {
            // the first piece on a line stops the slide
            mask = mask - shielded(from, square);
        }
        mask
    }

    /// Squares that resolve a single check: capturing the checker or
    /// interposing on its line.
    fn evasions(&self) -> Mask {
        let Some(king) = self.our_king() else {
            return Mask::all();
        };
        let mut mask = self.checks;
        for checker in self.checks.iter() {
            mask |= between(checker, king);
        }
        mask
    }

    fn restrict(&self, from: Square, mut destinations: Mask) -> Mask {
        if let Some(lane) = self.pinned(from) {
            destinations &= lane;
        }
        if self.is_check() {
            destinations &= self.evasions();
        }
        destinations
    }
}

pub trait LegalMoves: AsRef<MoveState> {
    fn validate_move(&self, mv: Move) -> Result<LegalMove> {
        let state: &MoveState = self.as_ref();
        let moves = state.moves_from(mv.from, KingSafety::Enforced);
        match moves.get(mv.to) {
            Some(LegalMove::Promoting(from, to, _)) => Ok(LegalMove::Promoting(
                from,
                to,
                mv.promotion.unwrap_or(Promotion::Queen),
            )),
            Some(lm) => Ok(lm),
            None => Err(IllegalMove.into()),
        }
    }

    fn legal_moves(&self, from: Square) -> MoveSet<LegalMove> {
        let state: &MoveState = self.as_ref();
        state.moves_from(from, KingSafety::Enforced)
    }

    /// Every move of the side to move, promotions expanded to all four
    /// pieces, in board order.
    fn all_moves(&self, safety: KingSafety) -> Vec<LegalMove> {
        let state: &MoveState = self.as_ref();
        let mut result = Vec::new();
        for from in state.ours().iter() {
            let moves = state.moves_from(from, safety);
            for dest in moves.destinations().iter() {
                let lm = moves[dest];
                match lm {
                    LegalMove::Promoting(from, to, _) => {
                        for promotion in Promotion::iter() {
                            result.push(LegalMove::Promoting(from, to, promotion));
                        }
                    }
                    _ => result.push(lm),
                }
            }
        }
        result
    }

    /// Union of the destination squares of `all_moves`.
    fn reach(&self, safety: KingSafety) -> Mask {
        let state: &MoveState = self.as_ref();
        state
            .all_moves(safety)
            .into_iter()
            .map(|lm| state.move_of(lm).to)
            .collect()
    }

    /// The from/to/promotion form of a generated move.
    fn move_of(&self, lm: LegalMove) -> Move {
        let state: &MoveState = self.as_ref();
        let rights = state.position().castling(state.turn());
        match lm {
            LegalMove::Standard(from, to)
            | LegalMove::DoubleAdvance(from, to)
            | LegalMove::EnPassant(from, to) => Move::new(from, to, None),
            LegalMove::Promoting(from, to, promotion) => Move::new(from, to, Some(promotion)),
            LegalMove::ShortCastle => Move::new(rights.king_src(), rights.oo_king_dest(), None),
            LegalMove::LongCastle => Move::new(rights.king_src(), rights.ooo_king_dest(), None),
        }
    }

    fn moves_from(&self, from: Square, safety: KingSafety) -> MoveSet<LegalMove> {
        let state: &MoveState = self.as_ref();
        match state.contents(from) {
            Some(material) if material.color() == state.turn() => match material.piece() {
                King => state.king_moves(from, safety) | state.castle_moves(from),
                Queen => state.line_moves(from, QUEEN_MOVES[from], safety),
                Rook => state.line_moves(from, ROOK_MOVES[from], safety),
                Bishop => state.line_moves(from, BISHOP_MOVES[from], safety),
                Knight => state.knight_moves(from, safety),
                Pawn => state.pawn_moves(from, safety),
            },
            _ => MoveSet::new(),
        }
    }

    fn king_moves(&self, from: Square, safety: KingSafety) -> MoveSet<LegalMove> {
        let state: &MoveState = self.as_ref();
        let mut destinations = KING_MOVES[from] & !state.ours();
        let mut result = MoveSet::new();
        if safety == KingSafety::Enforced {
            let line_attackers =
                state.attackers(from) & (state.horizontals() | state.diagonals());
            for square in line_attackers.iter() {
                // stepping back along a checking line stays in check
                destinations = destinations - shielded(square, from);
            }
            for dest in destinations.iter() {
                if !state.is_attacked(dest) {
                    result.insert(dest, LegalMove::Standard(from, dest));
                }
            }
        } else {
            for dest in destinations.iter() {
                result.insert(dest, LegalMove::Standard(from, dest));
            }
        }
        result
    }

    fn castle_moves(&self, from: Square) -> MoveSet<LegalMove> {
        let mut result = MoveSet::new();
        let state: &MoveState = self.as_ref();
        let rights = *state.position().castling(state.turn());
        let king = Material::new(state.turn(), King);
        let rook = Material::new(state.turn(), Rook);
        if from != rights.king_src()
            || state.contents(from) != Some(king)
            || state.is_attacked(from)
        {
            return result;
        }
        if rights.oo()
            && state.contents(rights.oo_rook_src()) == Some(rook)
            && !state.is_lane_blocked(rights.oo_blocking_lane())
            && !state.is_lane_attacked(rights.oo_attacking_lane())
        {
            result.insert(rights.oo_king_dest(), LegalMove::ShortCastle);
        }
        if rights.ooo()
            && state.contents(rights.ooo_rook_src()) == Some(rook)
            && !state.is_lane_blocked(rights.ooo_blocking_lane())
            && !state.is_lane_attacked(rights.ooo_attacking_lane())
        {
            result.insert(rights.ooo_king_dest(), LegalMove::LongCastle);
        }
        result
    }

    fn line_moves(&self, from: Square, lines: Mask, safety: KingSafety) -> MoveSet<LegalMove> {
        let state: &MoveState = self.as_ref();
        let mut destinations = state.exclude_shadowed(from, lines) & !state.ours();
        if safety == KingSafety::Enforced {
            if state.is_double_check() {
                return MoveSet::new();
            }
            destinations = state.restrict(from, destinations);
        }
        let mut result = MoveSet::new();
        for dest in destinations.iter() {
            result.insert(dest, LegalMove::Standard(from, dest));
        }
        result
    }

    fn knight_moves(&self, from: Square, safety: KingSafety) -> MoveSet<LegalMove> {
        let state: &MoveState = self.as_ref();
        let mut destinations = KNIGHT_MOVES[from] & !state.ours();
        if safety == KingSafety::Enforced {
            if state.is_double_check() {
                return MoveSet::new();
            }
            destinations = state.restrict(from, destinations);
        }
        let mut result = MoveSet::new();
        for dest in destinations.iter() {
            result.insert(dest, LegalMove::Standard(from, dest));
        }
        result
    }

    fn pawn_moves(&self, from: Square, safety: KingSafety) -> MoveSet<LegalMove> {
        let state: &MoveState = self.as_ref();
        let mut result = MoveSet::new();
        if safety == KingSafety::Enforced && state.is_double_check() {
            return result;
        }
        let color = state.turn();
        let vacant = !state.occupied();
        let mut advances = SINGLE_ADVANCES[color][from] & vacant;
        let mut doubles = DOUBLE_ADVANCES[color][from] & vacant;
        let mut captures = PAWN_ATTACKS[color][from] & state.theirs();
        if safety == KingSafety::Enforced {
            advances = state.restrict(from, advances);
            doubles = state.restrict(from, doubles);
            captures = state.restrict(from, captures);
        }
        for dest in (advances | captures).iter() {
            if dest.rank().is_last_rank(color) {
                result.insert(dest, LegalMove::Promoting(from, dest, Promotion::Queen));
            } else {
                result.insert(dest, LegalMove::Standard(from, dest));
            }
        }
        for dest in doubles.iter() {
            if (between(from, dest) & state.occupied()).is_empty() {
                result.insert(dest, LegalMove::DoubleAdvance(from, dest));
            }
        }
        if let Some(target) = state.position().en_passant() {
            if PAWN_ATTACKS[color][from].contains(target) {
                let lm = LegalMove::EnPassant(from, target);
                if safety == KingSafety::Ignored || state.keeps_king_safe(lm) {
                    result.insert(target, lm);
                }
            }
        }
        result
    }

    /// Plays `lm` on a scratch copy and checks the mover's king is not
    /// attacked afterwards. Only used where pins and checks computed up
    /// front cannot tell (en passant removes two pieces from a line).
    fn keeps_king_safe(&self, lm: LegalMove) -> bool {
        let state: &MoveState = self.as_ref();
        let color = state.turn();
        let mut after = state.position().clone();
        after.apply_move(lm);
        match after.king(color) {
            Some(king) => attackers_to(&after, king, !color).is_empty(),
            None => true,
        }
    }
}

/// Pieces of color `by` attacking `square` in `position`.
pub fn attackers_to(position: &Position, square: Square, by: Color) -> Mask {
    let them = position.occupied_by(by);
    let occupied = position.occupied();
    let mut mask = (KNIGHT_MOVES[square] & position.knights())
        | (KING_MOVES[square] & position.kings())
        | (PAWN_ATTACKS[!by][square] & position.pawns());
    let sliders = (HORIZONTALS[square] & position.horizontals())
        | (DIAGONALS[square] & position.diagonals());
    for from in (sliders & them).iter() {
        if (between(from, square) & occupied).is_empty() {
            mask |= from;
        }
    }
    mask & them
}

/// A move as the user (or a search engine) names it: two squares and,
/// for pawns reaching the last rank, the piece to promote to.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<Promotion>,
}

impl Move {
    pub fn new(from: Square, to: Square, promotion: Option<Promotion>) -> Self {
        Self {
            from,
            to,
            promotion,
        }
    }

    pub fn with_promotion(self, promotion: Option<Promotion>) -> Self {
        Self { promotion, ..self }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(promotion) = self.promotion {
            write!(f, "{}", promotion)?;
        }
        Ok(())
    }
}

impl FromStr for Move {
    type Err = MoveError;

    /// Parses coordinate notation such as `e2e4` or `e7e8q`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if !s.is_ascii() || !(4..=5).contains(&s.len()) {
            return Err(Unparsable(s.to_string()));
        }
        let from = s[0..2].parse::<Square>()?;
        let to = s[2..4].parse::<Square>()?;
        let promotion = match s[4..].chars().next() {
            Some(c) => Some(Promotion::from_char(c).ok_or_else(|| Unparsable(s.to_string()))?),
            None => None,
        };
        Ok(Self::new(from, to, promotion))
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, strum_macros::EnumIter)]
pub enum Promotion {
    Queen,
    Rook,
    Bishop,
    Knight,
}

impl Promotion {
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            'q' => Some(Promotion::Queen),
            'r' => Some(Promotion::Rook),
            'b' => Some(Promotion::Bishop),
            'n' => Some(Promotion::Knight),
            _ => None,
        }
    }
}

impl From<Promotion> for Piece {
    fn from(value: Promotion) -> Self {
        match value {
            Promotion::Queen => Piece::Queen,
            Promotion::Rook => Piece::Rook,
            Promotion::Bishop => Piece::Bishop,
            Promotion::Knight => Piece::Knight,
        }
    }
}

impl fmt::Display for Promotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let piece: Piece = (*self).into();
        write!(f, "{}", piece.to_char())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LegalMove {
    Standard(Square, Square),
    DoubleAdvance(Square, Square),
    EnPassant(Square, Square),
    Promoting(Square, Square, Promotion),
    ShortCastle,
    LongCastle,
}

/// Moves of a single piece keyed by destination square.
#[derive(Debug, Clone)]
pub struct MoveSet<T> {
    destinations: Mask,
    map: HashMap<Square, T>,
}

impl<T: Copy> MoveSet<T> {
    pub fn new() -> Self {
        Self {
            destinations: Mask::empty(),
            map: HashMap::new(),
        }
    }
    pub fn insert(&mut self, dest: Square, mv: T) {
        self.destinations |= dest;
        self.map.insert(dest, mv);
    }
    pub fn destinations(&self) -> Mask {
        self.destinations
    }
    pub fn get(&self, dest: Square) -> Option<T> {
        self.map.get(&dest).copied()
    }
    pub fn contains(&self, dest: Square) -> bool {
        self.destinations.contains(dest)
    }
    pub fn is_empty(&self) -> bool {
        self.destinations.is_empty()
    }
}

impl<T: Copy> Default for MoveSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Copy> BitOr for MoveSet<T> {
    type Output = Self;
    fn bitor(mut self, rhs: Self) -> Self::Output {
        self |= rhs;
        self
    }
}

impl<T: Copy> BitOrAssign for MoveSet<T> {
    fn bitor_assign(&mut self, rhs: Self) {
        self.destinations |= rhs.destinations;
        self.map.extend(rhs.map);
    }
}

impl<T: Copy> Index<Square> for MoveSet<T> {
    type Output = T;
    fn index(&self, dest: Square) -> &Self::Output {
        self.map.index(&dest)
    }
}

static KING_MOVES: Lazy<[Mask; 64]> = Lazy::new(|| {
    let mut array = [Mask::default(); 64];
    for square in Square::iter() {
        array[square] = Mask::from_squares(Direction::iter().filter_map(|dir| square + dir));
    }
    array
});

static QUEEN_MOVES: Lazy<[Mask; 64]> = Lazy::new(|| {
    let mut array = [Mask::default(); 64];
    for square in Square::iter() {
        array[square] = ALL_LINES[square] - square;
    }
    array
});

static ROOK_MOVES: Lazy<[Mask; 64]> = Lazy::new(|| {
    let mut array = [Mask::default(); 64];
    for square in Square::iter() {
        array[square] = HORIZONTALS[square] - square;
    }
    array
});

static BISHOP_MOVES: Lazy<[Mask; 64]> = Lazy::new(|| {
    let mut array = [Mask::default(); 64];
    for square in Square::iter() {
        array[square] = DIAGONALS[square] - square;
    }
    array
});

static KNIGHT_MOVES: Lazy<[Mask; 64]> = Lazy::new(|| {
    const OFFSETS: [Offset; 8] = [
        Offset::new(-2, -1),
        Offset::new(-2, 1),
        Offset::new(2, -1),
        Offset::new(2, 1),
        Offset::new(-1, -2),
        Offset::new(-1, 2),
        Offset::new(1, -2),
        Offset::new(1, 2),
    ];
    let mut array = [Mask::default(); 64];
    for square in Square::iter() {
        array[square] =
            Mask::from_squares(OFFSETS.into_iter().filter_map(|offset| square + offset));
    }
    array
});

/// The direction pawns of each color advance in (rank indices grow
/// towards rank 1).
const FORWARD: Pair<isize> = Pair::new(-1, 1);

static SINGLE_ADVANCES: Lazy<Pair<[Mask; 64]>> = Lazy::new(|| {
    let build = |color: Color| {
        let mut array = [Mask::empty(); 64];
        for square in Square::iter() {
            if matches!(square.rank(), Rank1 | Rank8) {
                continue;
            }
            if let Some(dest) = square + Offset::new(0, FORWARD[color]) {
                array[square] = dest.to_mask();
            }
        }
        array
    };
    Pair::new(build(White), build(Black))
});

static DOUBLE_ADVANCES: Lazy<Pair<[Mask; 64]>> = Lazy::new(|| {
    let build = |color: Color, rank: Rank| {
        let mut array = [Mask::empty(); 64];
        for file in File::iter() {
            let square = Square::new(file, rank);
            if let Some(dest) = square + Offset::new(0, 2 * FORWARD[color]) {
                array[square] = dest.to_mask();
            }
        }
        array
    };
    Pair::new(build(White, Rank2), build(Black, Rank7))
});

// Defined for every square (not just those a pawn can stand on) so the
// table can be read backwards in `attackers_to`.
static PAWN_ATTACKS: Lazy<Pair<[Mask; 64]>> = Lazy::new(|| {
    let build = |color: Color| {
        let offsets = [Offset::new(-1, FORWARD[color]), Offset::new(1, FORWARD[color])];
        let mut array = [Mask::default(); 64];
        for square in Square::iter() {
            array[square] =
                Mask::from_squares(offsets.into_iter().filter_map(|offset| square + offset));
        }
        array
    };
    Pair::new(build(White), build(Black))
});
