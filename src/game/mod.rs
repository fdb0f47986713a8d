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

use anyhow::Result;
use rand::rngs::StdRng;
#[cfg(feature = "random")]
use rand::{thread_rng, Rng};
use rand::{RngCore, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::board::{Board, BoardResult, Color, Mask, Move, Position, Promotion, Square};
use crate::config::SessionConfig;
use crate::fog::{fog, visible_position, AutomatedPlayer, Decision, Status, Suggest};
use crate::fog::{TurnController, TurnPhase};
use crate::search::MaterialSearch;
use crate::Turn;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct GameId(u64);

impl GameId {
    pub fn new(value: u64) -> Self {
        Self(value)
    }
    #[cfg(feature = "random")]
    pub fn random() -> Self {
        Self(thread_rng().gen())
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum GameResult {
    Win(Color, WinReason),
    Draw(DrawReason),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum WinReason {
    CheckMate,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DrawReason {
    StaleMate,
    Repetition,
    FiftyMoves,
    Insufficient,
}

impl From<BoardResult> for GameResult {
    fn from(value: BoardResult) -> Self {
        match value {
            BoardResult::CheckMate(winner) => GameResult::Win(winner, WinReason::CheckMate),
            BoardResult::StaleMate => GameResult::Draw(DrawReason::StaleMate),
            BoardResult::Repetition => GameResult::Draw(DrawReason::Repetition),
            BoardResult::FiftyMoves => GameResult::Draw(DrawReason::FiftyMoves),
            BoardResult::Insufficient => GameResult::Draw(DrawReason::Insufficient),
        }
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionError {
    #[error("It is not the human's turn")]
    NotHumanTurn,
    #[error("The game is over")]
    GameOver,
}

/// Something observable that happened in a session, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    HumanMoved(Move),
    /// The automated player is about to decide. Always precedes the
    /// matching `AutomatedMoved`.
    Thinking,
    AutomatedMoved(Decision),
    GameOver(GameResult),
}

/// One game between a human and an automated player.
///
/// The session owns the true board and the automated player's belief. A
/// human move that hands the turn over leaves a decision pending; it runs
/// on the next call to `tick`, so that `Event::Thinking` and the status
/// can be shown before the search starts.
pub struct Session<S = MaterialSearch, R = StdRng> {
    id: GameId,
    config: SessionConfig,
    truth: Board,
    belief: Position,
    controller: TurnController,
    player: AutomatedPlayer<S>,
    rng: R,
    phase: TurnPhase,
    pending: bool,
    events: Vec<Event>,
}

#[cfg(feature = "random")]
impl Session<MaterialSearch, StdRng> {
    pub fn standard(config: SessionConfig) -> Self {
        Self::new(GameId::random(), config, MaterialSearch::new(), StdRng::from_entropy())
    }
}

impl Session<MaterialSearch, StdRng> {
    /// A reproducible session: the seed drives the random fallback.
    pub fn seeded(config: SessionConfig, seed: u64) -> Self {
        Self::new(GameId::new(seed), config, MaterialSearch::new(), StdRng::seed_from_u64(seed))
    }
}

impl<S: Suggest, R: RngCore> Session<S, R> {
    pub fn new(id: GameId, config: SessionConfig, engine: S, rng: R) -> Self {
        let automated = config.automated();
        let player = AutomatedPlayer::new(automated, engine, config.search_depth, config.promotion);
        let mut session = Self {
            id,
            config,
            truth: Board::new(),
            // every piece is in plain sight at the start
            belief: Position::new(),
            controller: TurnController::new(automated),
            player,
            rng,
            phase: TurnPhase::HumanToMove,
            pending: false,
            events: Vec::new(),
        };
        session.transition();
        session
    }

    /// Tries the human's move from `from` to `to`. Pawns reaching the last
    /// rank become queens. A rejected move changes nothing.
    pub fn human_move(&mut self, from: Square, to: Square) -> Result<Move> {
        match self.phase {
            TurnPhase::GameOver(_) => return Err(SessionError::GameOver.into()),
            TurnPhase::AutomatedToMove => return Err(SessionError::NotHumanTurn.into()),
            TurnPhase::HumanToMove => {}
        }
        let mv = Move::new(from, to, Some(Promotion::Queen));
        if let Err(err) = self.truth.submit_move(mv) {
            log::debug!("game {}: ignoring human move {from}{to}: {err}", self.id);
            return Err(err);
        }
        let played = self.truth.history().last().copied().unwrap_or(mv);
        self.events.push(Event::HumanMoved(played));
        self.transition();
        Ok(played)
    }

    /// Runs the pending automated decision, if any. Each pending decision
    /// runs exactly once.
    pub fn tick(&mut self) -> Result<Option<Decision>> {
        if !self.pending {
            return Ok(None);
        }
        self.pending = false;
        let decision = self
            .player
            .decide(&mut self.truth, &mut self.belief, &mut self.rng)?;
        self.events.push(Event::AutomatedMoved(decision));
        self.transition();
        Ok(Some(decision))
    }

    /// Re-derives the phase after the true board changed, whichever side
    /// moved and however the move was chosen.
    fn transition(&mut self) {
        self.phase = self.controller.evaluate(&self.truth);
        match self.phase {
            TurnPhase::GameOver(result) => {
                log::info!("game {} over: {result:?}", self.id);
                self.events.push(Event::GameOver(result.into()));
            }
            TurnPhase::AutomatedToMove => {
                self.pending = true;
                self.events.push(Event::Thinking);
            }
            TurnPhase::HumanToMove => {}
        }
    }

    #[inline]
    pub fn game_id(&self) -> GameId {
        self.id
    }

    #[inline]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    #[inline]
    pub fn phase(&self) -> TurnPhase {
        self.phase
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn status(&self) -> Status {
        self.controller.status(self.phase, &self.truth)
    }

    /// The board as the human may see it.
    pub fn visible_position(&self) -> Position {
        visible_position(self.truth.position(), self.controller.human())
    }

    /// Squares hidden from the human.
    pub fn fog(&self) -> Mask {
        fog(self.truth.position(), self.controller.human())
    }

    /// Moves played so far by both sides.
    pub fn history(&self) -> &[Move] {
        self.truth.history()
    }

    /// The true position, once the game is over.
    pub fn reveal(&self) -> Option<&Position> {
        self.phase.is_game_over().then(|| self.truth.position())
    }

    pub fn result(&self) -> Option<GameResult> {
        self.truth.board_result().map(GameResult::from)
    }

    /// What the automated player currently believes.
    pub fn belief(&self) -> &Position {
        &self.belief
    }

    pub fn drain_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }
}

impl<S, R> Turn for Session<S, R> {
    fn turn(&self) -> Color {
        self.truth.turn()
    }
}
