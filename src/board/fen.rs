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

use std::fmt;
use strum::IntoEnumIterator;
use thiserror::Error;

use super::castling::{castling_to_fen, CastlingRights};
use super::material::{Color, Material, Pair};
use super::position::{Pos, Position};
use super::square::{File, Rank, Square};
use crate::Turn;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FenError {
    #[error("Expected 6 fields, found {0}")]
    FieldCount(usize),
    #[error("Bad piece placement: {0}")]
    Placement(String),
    #[error("Bad side to move: {0}")]
    Turn(String),
    #[error("Bad castling field: {0}")]
    Castling(String),
    #[error("Bad en passant field: {0}")]
    EnPassant(String),
    #[error("Bad move counter: {0}")]
    Counter(String),
}

impl Position {
    /// Parses Forsyth-Edwards Notation. The two move counters may be
    /// omitted, in which case they default to `0 1`.
    ///
    /// The placement is not required to hold one king per side: partial
    /// positions are legitimate inputs.
    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        let fields: Vec<&str> = fen.split_whitespace().collect();
        if !(4..=6).contains(&fields.len()) {
            return Err(FenError::FieldCount(fields.len()));
        }
        let squares = parse_placement(fields[0])?;
        let turn = match fields[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => return Err(FenError::Turn(other.to_string())),
        };
        let castling = parse_castling(fields[2])?;
        let en_passant = match fields[3] {
            "-" => None,
            name => {
                let square = name
                    .parse::<Square>()
                    .map_err(|_| FenError::EnPassant(name.to_string()))?;
                if !matches!(square.rank(), Rank::Rank3 | Rank::Rank6) {
                    return Err(FenError::EnPassant(name.to_string()));
                }
                Some(square)
            }
        };
        let counter = |index: usize, default: u16| match fields.get(index) {
            Some(field) => field
                .parse::<u16>()
                .map_err(|_| FenError::Counter(field.to_string())),
            None => Ok(default),
        };
        let moves_since_progress = counter(4, 0)?;
        let move_number = counter(5, 1)?;
        if move_number == 0 {
            return Err(FenError::Counter("0".to_string()));
        }
        Ok(Position::from_parts(
            squares,
            turn,
            castling,
            en_passant,
            moves_since_progress,
            move_number,
        ))
    }

    pub fn to_fen(&self) -> String {
        let en_passant = match self.en_passant() {
            Some(square) => square.to_string(),
            None => "-".to_string(),
        };
        format!(
            "{} {} {} {} {} {}",
            self.placement(),
            self.turn().to_char(),
            castling_to_fen(self.castling_pair()),
            en_passant,
            self.moves_since_progress(),
            self.move_number()
        )
    }

    /// The first FEN field: ranks 8 down to 1, runs of empty squares
    /// collapsed to a digit.
    pub fn placement(&self) -> String {
        let mut s = String::new();
        for rank in Rank::iter() {
            let mut empty = 0;
            for file in File::iter() {
                match self.contents(Square::new(file, rank)) {
                    Some(material) => {
                        if empty > 0 {
                            s.push_str(&empty.to_string());
                            empty = 0;
                        }
                        s.push(material.to_fen_char());
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                s.push_str(&empty.to_string());
            }
            if rank != Rank::Rank1 {
                s.push('/');
            }
        }
        s
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_fen())
    }
}

fn parse_placement(field: &str) -> Result<[Option<Material>; 64], FenError> {
    let mut squares = [None; 64];
    let rows: Vec<&str> = field.split('/').collect();
    if rows.len() != 8 {
        return Err(FenError::Placement(field.to_string()));
    }
    // rows run from rank 8 down, which is also square index order
    for (rank, row) in Rank::iter().zip(rows) {
        let mut files = 0;
        for c in row.chars() {
            if let Some(run) = c.to_digit(10) {
                if !(1..=8).contains(&run) {
                    return Err(FenError::Placement(row.to_string()));
                }
                files += run as usize;
            } else {
                let material =
                    Material::from_fen_char(c).ok_or_else(|| FenError::Placement(row.to_string()))?;
                if files >= 8 {
                    return Err(FenError::Placement(row.to_string()));
                }
                squares[Square::new(File::from_index(files), rank).to_index()] = Some(material);
                files += 1;
            }
        }
        if files != 8 {
            return Err(FenError::Placement(row.to_string()));
        }
    }
    Ok(squares)
}

fn parse_castling(field: &str) -> Result<Pair<CastlingRights>, FenError> {
    let mut white = CastlingRights::new(Color::White, false, false);
    let mut black = CastlingRights::new(Color::Black, false, false);
    if field == "-" {
        return Ok(Pair::new(white, black));
    }
    let error = || FenError::Castling(field.to_string());
    for c in field.chars() {
        let (rights, oo) = match c {
            'K' => (&mut white, true),
            'Q' => (&mut white, false),
            'k' => (&mut black, true),
            'q' => (&mut black, false),
            _ => return Err(error()),
        };
        *rights = if oo {
            CastlingRights::new(rights.color(), true, rights.ooo())
        } else {
            CastlingRights::new(rights.color(), rights.oo(), true)
        };
    }
    Ok(Pair::new(white, black))
}

#[cfg(test)]
mod tests {
    use super::*;
    use Square::*;

    const START: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    #[test]
    fn test_start_position() {
        let position = Position::from_fen(START).unwrap();
        assert_eq!(position, Position::new());
        assert_eq!(Position::new().to_fen(), START);
    }
    #[test]
    fn test_after_double_advance() {
        let fen = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1";
        let position = Position::from_fen(fen).unwrap();
        assert_eq!(position.turn(), Color::Black);
        assert_eq!(position.en_passant(), Some(E3));
        assert_eq!(position.get(E4), Some(Material::WP));
        assert_eq!(position.to_fen(), fen);
    }
    #[test]
    fn test_counters() {
        let fen = "8/8/8/4k3/8/8/8/4K2R b K - 17 42";
        let position = Position::from_fen(fen).unwrap();
        assert_eq!(position.moves_since_progress(), 17);
        assert_eq!(position.move_number(), 42);
        assert!(position.castling(Color::White).oo());
        assert!(!position.castling(Color::White).ooo());
        assert_eq!(position.to_fen(), fen);
    }
    #[test]
    fn test_counters_optional() {
        let position = Position::from_fen("8/8/8/8/8/8/8/R7 w - -").unwrap();
        assert_eq!(position.to_fen(), "8/8/8/8/8/8/8/R7 w - - 0 1");
    }
    #[test]
    fn test_rejects_malformed() {
        assert_eq!(
            Position::from_fen("8/8/8 w - - 0 1"),
            Err(FenError::Placement("8/8/8".to_string()))
        );
        assert_eq!(Position::from_fen("8/8/8/8/8/8/8/8"), Err(FenError::FieldCount(1)));
        assert!(matches!(
            Position::from_fen("8/8/8/8/8/8/8/9 w - - 0 1"),
            Err(FenError::Placement(_))
        ));
        assert!(matches!(
            Position::from_fen("8/8/8/8/8/8/8/8 x - - 0 1"),
            Err(FenError::Turn(_))
        ));
        assert!(matches!(
            Position::from_fen("8/8/8/8/8/8/8/8 w KX - 0 1"),
            Err(FenError::Castling(_))
        ));
        assert!(matches!(
            Position::from_fen("8/8/8/8/8/8/8/8 w - e4 0 1"),
            Err(FenError::EnPassant(_))
        ));
        assert!(matches!(
            Position::from_fen("8/8/8/8/8/8/8/8 w - - x 1"),
            Err(FenError::Counter(_))
        ));
    }
}
