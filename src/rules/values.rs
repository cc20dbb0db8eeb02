//! Lane arithmetic.
//!
//! Lane totals and compile eligibility are derived data: they are recomputed
//! from scratch after every board change and never edited directly.

use crate::core::{CardLocation, GameState, PlayerId, RulesConfig, Side, LANE_COUNT};
use crate::effects::ValueModifier;

/// What a face-down card is worth on one side of one lane.
///
/// The configured default, unless a face-up card on the same side of the
/// same lane says otherwise; the highest such override wins.
#[must_use]
pub fn face_down_value(side: &Side, lane: usize, config: &RulesConfig) -> i32 {
    side.lanes[lane]
        .iter()
        .filter(|card| card.face_up)
        .flat_map(|card| card.modifiers().iter())
        .filter_map(|modifier| match modifier {
            ValueModifier::FaceDownValue(n) => Some(*n),
            _ => None,
        })
        .max()
        .unwrap_or(config.face_down_value)
}

/// Effective value of the board card at `location`.
#[must_use]
pub fn effective_value(state: &GameState, config: &RulesConfig, location: CardLocation) -> i32 {
    let side = state.side(location.owner);
    match state.card_at(location) {
        Some(card) if card.face_up => card.value,
        Some(_) => face_down_value(side, location.lane, config),
        None => 0,
    }
}

fn lane_bonus(side: &Side, lane: usize, pick: impl Fn(&ValueModifier) -> Option<i32>) -> i32 {
    side.lanes[lane]
        .iter()
        .filter(|card| card.face_up)
        .flat_map(|card| card.modifiers().iter())
        .filter_map(pick)
        .sum()
}

/// One side's total in one lane.
///
/// Card values plus that side's own lane bonuses plus whatever the
/// opposing cards in the lane impose, never below zero.
#[must_use]
pub fn lane_total(state: &GameState, config: &RulesConfig, player: PlayerId, lane: usize) -> i32 {
    let side = state.side(player);
    let opposing = state.side(player.opponent());
    let down = face_down_value(side, lane, config);

    let cards: i32 = side.lanes[lane]
        .iter()
        .map(|card| if card.face_up { card.value } else { down })
        .sum();
    let own = lane_bonus(side, lane, |m| match m {
        ValueModifier::OwnLaneBonus(n) => Some(*n),
        _ => None,
    });
    let imposed = lane_bonus(opposing, lane, |m| match m {
        ValueModifier::OpposingLaneBonus(n) => Some(*n),
        _ => None,
    });

    (cards + own + imposed).max(0)
}

/// Refresh every derived lane total and compile flag in place.
pub fn recalculate(state: &mut GameState, config: &RulesConfig) {
    let mut totals = [[0; LANE_COUNT]; 2];
    for player in PlayerId::all() {
        for lane in 0..LANE_COUNT {
            totals[player.index()][lane] = lane_total(state, config, player, lane);
        }
    }

    for player in PlayerId::all() {
        let mine = totals[player.index()];
        let theirs = totals[player.opponent().index()];
        let side = state.side_mut(player);
        side.lane_values = mine;
        for lane in 0..LANE_COUNT {
            let leads = mine[lane] >= config.compile_threshold && mine[lane] > theirs[lane];
            side.compilable[lane] = !side.compiled[lane] && leads;
        }
    }
}

/// Pure form of [`recalculate`].
#[must_use]
pub fn recalculated(state: &GameState, config: &RulesConfig) -> GameState {
    let mut next = state.clone();
    recalculate(&mut next, config);
    next
}
