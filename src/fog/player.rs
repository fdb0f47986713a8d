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
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::belief::reconcile;
use super::visibility::attackable_squares;
use crate::board::{Board, Color, LegalMoves, Move, MoveState, Position, Promotion};
use crate::Turn;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerError {
    #[error("It is not {0}'s turn")]
    NotOurTurn(Color),
    #[error("The game is already over")]
    GameOver,
    #[error("{0} has no legal move")]
    NoLegalMove(Color),
}

/// A move-suggestion engine.
pub trait Suggest {
    /// Candidate moves for the side to move in `fen`, best first, looking
    /// `depth` plies ahead. Nothing guarantees the candidates are legal in
    /// any other position.
    fn suggest(&mut self, fen: &str, depth: u8) -> Result<Vec<Move>>;
}

impl<F> Suggest for F
where
    F: FnMut(&str, u8) -> Result<Vec<Move>>,
{
    fn suggest(&mut self, fen: &str, depth: u8) -> Result<Vec<Move>> {
        self(fen, depth)
    }
}

/// Which piece a suggested promotion is played with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PromotionPolicy {
    /// Every promotion is to a queen, whatever was suggested.
    #[default]
    AlwaysQueen,
    /// Play the suggested piece, or a queen if none was named.
    FollowSuggestion,
}

impl PromotionPolicy {
    fn apply(&self, mv: Move) -> Move {
        match self {
            PromotionPolicy::AlwaysQueen => mv.with_promotion(Some(Promotion::Queen)),
            PromotionPolicy::FollowSuggestion => mv,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecisionSource {
    /// The candidate at this index of the suggestion list was accepted.
    Suggested(usize),
    /// No candidate was accepted; the move was picked at random.
    Fallback,
}

/// A move committed to the true board by the automated player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Decision {
    pub mv: Move,
    pub source: DecisionSource,
}

/// Plays one color from a belief position, never from the truth.
pub struct AutomatedPlayer<S> {
    color: Color,
    engine: S,
    depth: u8,
    promotion: PromotionPolicy,
}

impl<S: Suggest> AutomatedPlayer<S> {
    pub fn new(color: Color, engine: S, depth: u8, promotion: PromotionPolicy) -> Self {
        Self {
            color,
            engine,
            depth,
            promotion,
        }
    }

    #[inline]
    pub fn color(&self) -> Color {
        self.color
    }

    pub fn engine(&self) -> &S {
        &self.engine
    }

    /// Brings `belief` up to date, asks the engine for candidates on it and
    /// commits the first one `truth` accepts. If none is accepted, commits
    /// a legal move of `truth` picked uniformly at random with `rng`.
    ///
    /// On return `belief` reflects the committed move. The engine only
    /// ever sees `belief`.
    pub fn decide<R: Rng + ?Sized>(
        &mut self,
        truth: &mut Board,
        belief: &mut Position,
        rng: &mut R,
    ) -> Result<Decision> {
        if truth.is_game_over() {
            return Err(PlayerError::GameOver.into());
        }
        if truth.turn() != self.color {
            return Err(PlayerError::NotOurTurn(self.color).into());
        }
        *belief = belief.with_turn(self.color);
        self.observe(truth, belief);

        let candidates = match self.engine.suggest(&belief.to_fen(), self.depth) {
            Ok(candidates) => candidates,
            Err(err) => {
                log::warn!("move suggestion failed: {err}");
                Vec::new()
            }
        };
        for (index, candidate) in candidates.into_iter().enumerate() {
            let mv = self.promotion.apply(candidate);
            if truth.submit_move(mv).is_ok() {
                let mv = self.committed(truth, mv);
                self.replay(truth, belief, mv);
                return Ok(Decision {
                    mv,
                    source: DecisionSource::Suggested(index),
                });
            }
            log::debug!("{} candidate {mv} rejected by the true position", self.color);
        }

        let moves = truth.legal_moves();
        let mv = *moves
            .choose(rng)
            .ok_or(PlayerError::NoLegalMove(self.color))?;
        log::debug!("no candidate was playable, {} plays {mv} at random", self.color);
        truth.submit_move(mv)?;
        self.replay(truth, belief, mv);
        Ok(Decision {
            mv,
            source: DecisionSource::Fallback,
        })
    }

    fn observe(&self, truth: &Board, belief: &mut Position) {
        let visibility = attackable_squares(truth.position(), self.color);
        *belief = reconcile(belief, truth.position(), visibility, self.color);
    }

    /// The move as the true board recorded it, which drops a promotion
    /// piece from moves that do not promote.
    fn committed(&self, truth: &Board, mv: Move) -> Move {
        truth.history().last().copied().unwrap_or(mv)
    }

    /// Plays our own move on the belief too, then re-observes. If the
    /// belief cannot make sense of the move, the turn is simply handed
    /// over; reconciling puts our pieces where they really are.
    fn replay(&self, truth: &Board, belief: &mut Position, mv: Move) {
        let mut state = MoveState::new(belief.clone());
        match state.validate_move(mv) {
            Ok(lm) => {
                state.apply_move(lm);
                *belief = state.position().clone();
            }
            Err(err) => {
                log::debug!("belief of {} cannot replay {mv}: {err}", self.color);
                *belief = belief.with_turn(!self.color);
            }
        }
        self.observe(truth, belief);
    }
}
