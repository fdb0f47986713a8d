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

//! Kriegspiel: chess where you cannot see your opponent
//!
//! A human plays one color against an automated player. Neither side sees
//! the other's pieces except on squares it could currently move onto. The
//! crate keeps one authoritative game and, next to it, the position the
//! automated player believes it is in:
//!
//! * `board` is a standard chess rules engine. Its `Board` is the true
//!   game: every committed move, by either side, goes through it.
//!
//! * `fog` holds what is particular to the variant. `attackable_squares`
//!   tells what a color can observe, `reconcile` folds such an observation
//!   into a belief position, `TurnController` decides what happens after
//!   each move and `AutomatedPlayer` picks moves from its belief alone.
//!
//! * `search` is the move-suggestion engine the automated player consults.
//!   It only ever receives the belief position as FEN.
//!
//! * `game` wires everything into a `Session` driven by human move intents
//!   and an explicit `tick` for the automated reply.
//!
//! The library logs through the `log` facade and never installs a logger.

pub mod board;
pub mod config;
pub mod fog;
pub mod game;
pub mod search;

pub use board::*;
pub use config::*;
pub use fog::*;
pub use game::*;
pub use search::*;

pub trait Turn {
    fn turn(&self) -> board::Color;
}
