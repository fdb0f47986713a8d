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

//! Imperfect information on top of the rules engine
//!
//! * `attackable_squares` is what a color can observe: every square one
//!   of its pieces could move onto, with its own king's safety ignored.
//!
//! * `reconcile` folds one such observation of the true position into a
//!   belief position. A side always knows where its own pieces are; it
//!   learns about the opponent only on observed squares and remembers
//!   everything else, stale or not.
//!
//! * `TurnController` maps the true game onto whose move it is and what
//!   to tell the human.
//!
//! * `AutomatedPlayer` decides moves from its belief alone and only ever
//!   commits moves the true game accepts.

mod belief;
mod player;
mod turn;
mod visibility;

pub use belief::*;
pub use player::*;
pub use turn::*;
pub use visibility::*;
