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

use serde::{Deserialize, Serialize};
use strum_macros::Display;

use crate::board::{Board, BoardResult, Color};
use crate::Turn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TurnPhase {
    HumanToMove,
    AutomatedToMove,
    GameOver(BoardResult),
}

impl TurnPhase {
    pub fn is_game_over(&self) -> bool {
        matches!(self, TurnPhase::GameOver(_))
    }
}

/// Status line shown to the human.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    #[strum(serialize = "Your turn")]
    YourTurn,
    #[strum(serialize = "Check!")]
    Check,
    #[strum(serialize = "AI is thinking ...")]
    Thinking,
    #[strum(serialize = "Checkmate!")]
    Checkmate,
    #[strum(serialize = "Stalemate...")]
    Stalemate,
    #[strum(serialize = "Game Over")]
    GameOver,
}

/// Derives the phase of the game from the true board. Holds no state of
/// its own besides which color the automated player has.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnController {
    automated: Color,
}

impl TurnController {
    pub fn new(automated: Color) -> Self {
        Self { automated }
    }

    #[inline]
    pub fn automated(&self) -> Color {
        self.automated
    }

    #[inline]
    pub fn human(&self) -> Color {
        !self.automated
    }

    pub fn evaluate(&self, board: &Board) -> TurnPhase {
        if let Some(result) = board.board_result() {
            TurnPhase::GameOver(result)
        } else if board.turn() == self.automated {
            TurnPhase::AutomatedToMove
        } else {
            TurnPhase::HumanToMove
        }
    }

    pub fn status(&self, phase: TurnPhase, board: &Board) -> Status {
        match phase {
            TurnPhase::GameOver(BoardResult::CheckMate(_)) => Status::Checkmate,
            TurnPhase::GameOver(BoardResult::StaleMate) => Status::Stalemate,
            TurnPhase::GameOver(_) => Status::GameOver,
            TurnPhase::AutomatedToMove => Status::Thinking,
            TurnPhase::HumanToMove if board.is_check() => Status::Check,
            TurnPhase::HumanToMove => Status::YourTurn,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn phase_and_status(fen: &str) -> (TurnPhase, String) {
        let board = Board::from_fen(fen).unwrap();
        let controller = TurnController::new(Color::Black);
        let phase = controller.evaluate(&board);
        (phase, controller.status(phase, &board).to_string())
    }

    #[test]
    fn test_opening() {
        let board = Board::new();
        let controller = TurnController::new(Color::Black);
        assert_eq!(controller.human(), Color::White);
        let phase = controller.evaluate(&board);
        assert_eq!(phase, TurnPhase::HumanToMove);
        assert_eq!(controller.status(phase, &board), Status::YourTurn);
        assert_eq!(Status::YourTurn.to_string(), "Your turn");
    }
    #[test]
    fn test_automated_to_move() {
        let (phase, status) =
            phase_and_status("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1");
        assert_eq!(phase, TurnPhase::AutomatedToMove);
        assert_eq!(status, "AI is thinking ...");
    }
    #[test]
    fn test_human_in_check() {
        let (phase, status) = phase_and_status("4k3/8/8/8/8/8/8/r3K3 w - - 0 1");
        assert_eq!(phase, TurnPhase::HumanToMove);
        assert_eq!(status, "Check!");
    }
    #[test]
    fn test_endings() {
        let (phase, status) =
            phase_and_status("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3");
        assert_eq!(phase, TurnPhase::GameOver(BoardResult::CheckMate(Color::Black)));
        assert!(phase.is_game_over());
        assert_eq!(status, "Checkmate!");
        let (_, status) = phase_and_status("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1");
        assert_eq!(status, "Stalemate...");
        let (phase, status) = phase_and_status("8/8/8/4k3/8/8/8/4K3 w - - 0 1");
        assert_eq!(phase, TurnPhase::GameOver(BoardResult::Insufficient));
        assert_eq!(status, "Game Over");
    }
}
