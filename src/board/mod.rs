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

//! Standard chess rules
//!
//! The rules engine underneath both the true game and each side's belief
//! about it. The following features are supported:
//!
//! [x] Standard chess rules
//! [x] Enforce three-fold repetition rule
//! [x] Enforce fifty-move rule
//! [x] Recognize insuffient mating material (using chess.com's heuristics)
//! [x] Move generation for either side, with or without king safety
//! [x] Square-level edits of partial positions
//! [x] FEN import and export
//!
//! * A `Square` names one of the 64 squares (`A8` .. `H1`, in index
//!   order). `Rank` and `File` are its row and column.
//!
//! * A `Mask` is a 64-bit (u64) value in which each bit maps to a
//!   square on the board. Masks combine with `|`, `|=`, `&`, `&=`, `-`
//!   and `!`, and `iter()` walks the squares in index order.
//!
//! * `Material` is a `Piece` of a specific `Color`. `Promotion` lists the
//!   four pieces a pawn may become and converts into `Piece`.
//!
//! * A `Position` holds the contents of each square, whose turn it is,
//!   castling rights, the en passant target and the move counters. It
//!   changes through `apply_move` (a generated `LegalMove`) or through the
//!   square-level `put` and `remove`, which are what belief positions are
//!   patched with.
//!
//! * `MoveState` wraps a position with the attack, check and pin data for
//!   the side to move and generates its moves. `MoveState::for_color`
//!   builds one for either side without touching the original position,
//!   and `KingSafety::Ignored` yields the raw reach of the pieces.
//!
//! * A `Board` is an authoritative game: it only accepts legal moves,
//!   records them and detects the end of the game.

mod castling;
mod fen;
mod material;
mod moves;
mod play;
mod position;
mod square;

pub use castling::*;
pub use fen::*;
pub use material::*;
pub use moves::*;
pub use play::*;
pub use position::*;
pub use square::*;
