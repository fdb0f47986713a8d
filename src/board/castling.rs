// Copyright 2026 Tobin Edwards
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

use serde::{Deserialize, Serialize};

use super::material::{Color, Pair};
use super::position::between;
use super::square::{File, Mask, Rank, Square};

use File::*;

/// Castling rights of one side on a standard back rank.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CastlingRights {
    color: Color,
    oo: bool,
    ooo: bool,
}

impl CastlingRights {
    pub fn new(color: Color, oo: bool, ooo: bool) -> Self {
        Self { color, oo, ooo }
    }
    #[inline]
    pub fn color(&self) -> Color {
        self.color
    }
    #[inline]
    pub fn oo(&self) -> bool {
        self.oo
    }
    #[inline]
    pub fn ooo(&self) -> bool {
        self.ooo
    }
    #[inline]
    pub fn rank(&self) -> Rank {
        Rank::back_rank(self.color)
    }
    #[inline]
    pub fn king_src(&self) -> Square {
        Square::new(FileE, self.rank())
    }
    #[inline]
    pub fn oo_rook_src(&self) -> Square {
        Square::new(FileH, self.rank())
    }
    #[inline]
    pub fn oo_king_dest(&self) -> Square {
        Square::new(FileG, self.rank())
    }
    #[inline]
    pub fn oo_rook_dest(&self) -> Square {
        Square::new(FileF, self.rank())
    }
    #[inline]
    pub fn ooo_rook_src(&self) -> Square {
        Square::new(FileA, self.rank())
    }
    #[inline]
    pub fn ooo_king_dest(&self) -> Square {
        Square::new(FileC, self.rank())
    }
    #[inline]
    pub fn ooo_rook_dest(&self) -> Square {
        Square::new(FileD, self.rank())
    }
    /// Squares that must be empty for a short castle.
    pub fn oo_blocking_lane(&self) -> Mask {
        between(self.king_src(), self.oo_rook_src())
    }
    /// Squares the king crosses or lands on during a short castle.
    pub fn oo_attacking_lane(&self) -> Mask {
        between(self.king_src(), self.oo_king_dest()) | self.oo_king_dest()
    }
    pub fn ooo_blocking_lane(&self) -> Mask {
        between(self.ooo_rook_src(), self.king_src())
    }
    pub fn ooo_attacking_lane(&self) -> Mask {
        between(self.ooo_king_dest(), self.king_src()) | self.ooo_king_dest()
    }

    /// Drops any right that depends on a piece standing on `square`.
    /// Called for both ends of every move.
    pub fn update(&mut self, square: Square) {
        if square == self.king_src() {
            self.clear();
        }
        if square == self.oo_rook_src() {
            self.oo = false;
        }
        if square == self.ooo_rook_src() {
            self.ooo = false;
        }
    }
    pub fn clear(&mut self) {
        self.oo = false;
        self.ooo = false;
    }
}

impl Default for Pair<CastlingRights> {
    fn default() -> Self {
        Pair::new(
            CastlingRights::new(Color::White, true, true),
            CastlingRights::new(Color::Black, true, true),
        )
    }
}

/// Renders the FEN castling field ("KQkq", "-", ...).
pub fn castling_to_fen(rights: &Pair<CastlingRights>) -> String {
    let mut s = String::new();
    if rights.white().oo() {
        s.push('K');
    }
    if rights.white().ooo() {
        s.push('Q');
    }
    if rights.black().oo() {
        s.push('k');
    }
    if rights.black().ooo() {
        s.push('q');
    }
    if s.is_empty() {
        s.push('-');
    }
    s
}
