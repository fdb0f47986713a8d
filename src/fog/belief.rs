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

use strum::IntoEnumIterator;

use super::visibility::VisibilitySet;
use crate::board::{Color, Material, Pos, Position, Square};

/// What `color` should believe about `square` given its prior belief, the
/// truth and whether the square is currently observed.
fn believed(
    prior: Option<Material>,
    truth: Option<Material>,
    observed: bool,
    color: Color,
) -> Option<Material> {
    match (truth, prior) {
        (Some(material), _) if material.is(color) => Some(material),
        // one of our pieces that has since left an unobserved square
        (_, Some(material)) if material.is(color) && !observed => None,
        _ if observed => truth,
        _ => prior,
    }
}

/// Brings `color`'s belief up to date with what it can currently know
/// about `truth`, returning the new belief.
///
/// * Squares holding a piece of `color` in `truth` hold exactly that piece.
/// * Unobserved squares where the belief still places one of `color`'s
///   pieces, but `truth` does not, are emptied.
/// * Squares in `visibility` match `truth`.
/// * Every other square keeps its believed content, however stale.
///
/// A foreign king seen on a new square replaces the one remembered
/// elsewhere so the belief never holds two kings of a color. The side's
/// own castling rights are taken from `truth`; everything else about the
/// belief (side to move, the opponent's rights) is left alone.
pub fn reconcile(
    belief: &Position,
    truth: &Position,
    visibility: VisibilitySet,
    color: Color,
) -> Position {
    let changes: Vec<(Square, Option<Material>)> = Square::iter()
        .filter_map(|square| {
            let prior = belief.get(square);
            let next = believed(prior, truth.get(square), visibility.contains(square), color);
            (next != prior).then_some((square, next))
        })
        .collect();

    let mut result = belief.clone();
    // clear first so pieces that moved can be put back down
    for (square, _) in &changes {
        result.remove(*square);
    }
    for (square, next) in &changes {
        let Some(material) = *next else {
            continue;
        };
        if material.piece().is_king() && !material.is(color) {
            for stale in (result.kings() & result.occupied_by(material.color())).iter() {
                log::debug!("{} king seen on {square}, forgetting {stale}", material.color());
                result.remove(stale);
            }
        }
        if let Err(err) = result.put(*square, material) {
            log::error!("belief of {color} cannot hold {material} on {square}: {err}");
        }
    }
    result.set_castling(*truth.castling(color));
    result
}
