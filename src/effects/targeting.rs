//! Effect targeting.
//!
//! - [`TargetFilter`]: which board cards a step may touch
//! - [`LaneRestriction`]: where a shifted card may go
//! - [`candidates`] / [`legal_shift_lanes`]: pure evaluation against a board
//!
//! Evaluation never mutates anything, so the same filter can be checked
//! when a step first runs and again when a suspended choice is answered.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::{CardId, CardLocation, GameState, RulesConfig, LANE_COUNT};
use crate::rules::values::effective_value;

use super::context::{EffectContext, EffectSource};

/// Card owner, relative to the effect's card.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OwnerFilter {
    Own,
    Opponent,
    #[default]
    Any,
}

/// Card orientation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaceFilter {
    Up,
    Down,
    #[default]
    Any,
}

/// Position within a lane stack.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionFilter {
    /// Top of its lane.
    #[default]
    Uncovered,
    /// Anywhere below the top.
    Covered,
    Any,
}

/// Lane scope, relative to the effect's card.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LaneFilter {
    #[default]
    Any,
    SourceLane,
    OtherLanes,
}

/// Which board cards a step may touch.
///
/// Defaults to any uncovered card on either side, which is what card text
/// means when it just says "a card".
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetFilter {
    pub owner: OwnerFilter,
    pub face: FaceFilter,
    pub position: PositionFilter,
    /// Minimum effective value (inclusive).
    pub min_value: Option<i32>,
    /// Maximum effective value (inclusive).
    pub max_value: Option<i32>,
    /// Never match the effect's own card.
    pub exclude_source: bool,
    pub lane: LaneFilter,
}

impl TargetFilter {
    /// Restrict ownership (builder pattern).
    #[must_use]
    pub fn owned_by(mut self, owner: OwnerFilter) -> Self {
        self.owner = owner;
        self
    }

    /// Restrict orientation (builder pattern).
    #[must_use]
    pub fn facing(mut self, face: FaceFilter) -> Self {
        self.face = face;
        self
    }

    /// Restrict stack position (builder pattern).
    #[must_use]
    pub fn at(mut self, position: PositionFilter) -> Self {
        self.position = position;
        self
    }

    /// Restrict effective value to `min..=max` (builder pattern).
    #[must_use]
    pub fn valued(mut self, min: Option<i32>, max: Option<i32>) -> Self {
        self.min_value = min;
        self.max_value = max;
        self
    }

    /// Exclude the effect's own card (builder pattern).
    #[must_use]
    pub fn other_than_source(mut self) -> Self {
        self.exclude_source = true;
        self
    }

    /// Restrict lanes (builder pattern).
    #[must_use]
    pub fn in_lanes(mut self, lane: LaneFilter) -> Self {
        self.lane = lane;
        self
    }

    /// Check one board card.
    #[must_use]
    pub fn matches(
        &self,
        state: &GameState,
        config: &RulesConfig,
        location: CardLocation,
        source: &EffectSource,
        ctx: &EffectContext,
    ) -> bool {
        let Some(card) = state.card_at(location) else {
            return false;
        };

        let owner_ok = match self.owner {
            OwnerFilter::Own => location.owner == ctx.owner,
            OwnerFilter::Opponent => location.owner != ctx.owner,
            OwnerFilter::Any => true,
        };
        let face_ok = match self.face {
            FaceFilter::Up => card.face_up,
            FaceFilter::Down => !card.face_up,
            FaceFilter::Any => true,
        };
        let uncovered = state.is_uncovered(location);
        let position_ok = match self.position {
            PositionFilter::Uncovered => uncovered,
            PositionFilter::Covered => !uncovered,
            PositionFilter::Any => true,
        };
        let source_lane = source.current_lane(state);
        let lane_ok = match self.lane {
            LaneFilter::Any => true,
            LaneFilter::SourceLane => location.lane == source_lane,
            LaneFilter::OtherLanes => location.lane != source_lane,
        };
        if !(owner_ok && face_ok && position_ok && lane_ok) {
            return false;
        }
        if self.exclude_source && card.id == source.card {
            return false;
        }

        if self.min_value.is_some() || self.max_value.is_some() {
            let value = effective_value(state, config, location);
            let too_low = self.min_value.is_some_and(|min| value < min);
            let too_high = self.max_value.is_some_and(|max| value > max);
            if too_low || too_high {
                return false;
            }
        }
        true
    }
}

/// Every board card a filter currently matches, in scan order starting
/// with the effect owner's side.
#[must_use]
pub fn candidates(
    state: &GameState,
    config: &RulesConfig,
    filter: &TargetFilter,
    source: &EffectSource,
    ctx: &EffectContext,
) -> SmallVec<[CardId; 8]> {
    state
        .board_scan(ctx.owner)
        .filter(|(loc, _)| filter.matches(state, config, *loc, source, ctx))
        .map(|(_, card)| card.id)
        .collect()
}

/// Constraint on where a shifted card may land.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LaneRestriction {
    /// Any other lane.
    #[default]
    Any,
    /// Not the lane the effect's source card sits in.
    DifferentFromSource,
    /// Not a lane where either side's protocol matches the shifted card.
    NotMatchingProtocols,
    /// Either the origin or the destination must be this lane.
    MustInclude(usize),
    /// Either the origin or the destination must be the source card's lane.
    MustIncludeSourceLane,
}

/// Lanes a card may be shifted to.
///
/// A shift always leaves the card's current lane; the restriction narrows
/// the remaining lanes further.
#[must_use]
pub fn legal_shift_lanes(
    state: &GameState,
    card: CardId,
    restriction: LaneRestriction,
    source: &EffectSource,
) -> SmallVec<[usize; LANE_COUNT]> {
    let Some(location) = state.locate(card) else {
        return SmallVec::new();
    };
    let Some(shifted) = state.card_at(location) else {
        return SmallVec::new();
    };
    let source_lane = source.current_lane(state);
    let from = location.lane;

    (0..LANE_COUNT)
        .filter(|&to| to != from)
        .filter(|&to| match restriction {
            LaneRestriction::Any => true,
            LaneRestriction::DifferentFromSource => to != source_lane,
            LaneRestriction::NotMatchingProtocols => state
                .sides
                .iter()
                .all(|(_, side)| side.protocols[to] != shifted.protocol),
            LaneRestriction::MustInclude(lane) => from == lane || to == lane,
            LaneRestriction::MustIncludeSourceLane => from == source_lane || to == source_lane,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::CardEffects;
    use crate::core::{PlayerId, PlayerMap, Side};
    use crate::effects::EffectTrigger;

    fn board() -> (GameState, EffectSource, EffectContext) {
        let sides = PlayerMap::new(|p| {
            if p == PlayerId::FIRST {
                Side::new(["Fire", "Water", "Spirit"])
            } else {
                Side::new(["Death", "Light", "Speed"])
            }
        });
        let mut state = GameState::new(sides, PlayerId::FIRST, 7);
        let source = state.add_to_lane(PlayerId::FIRST, 0, "Fire", 1, true, CardEffects::Builtin);
        let ctx = EffectContext::new(PlayerId::FIRST, PlayerId::FIRST, EffectTrigger::OnPlay);
        let source = EffectSource { card: source, owner: PlayerId::FIRST, lane: 0 };
        (state, source, ctx)
    }

    #[test]
    fn test_default_filter_matches_uncovered_cards() {
        let (mut state, source, ctx) = board();
        let covered =
            state.add_to_lane(PlayerId::SECOND, 1, "Light", 2, true, CardEffects::Builtin);
        let top = state.add_to_lane(PlayerId::SECOND, 1, "Light", 4, false, CardEffects::Builtin);
        let config = RulesConfig::default();

        let found = candidates(&state, &config, &TargetFilter::default(), &source, &ctx);
        assert_eq!(found.as_slice(), &[source.card, top]);
        assert!(!found.contains(&covered));
    }

    #[test]
    fn test_owner_and_exclude_source() {
        let (mut state, source, ctx) = board();
        let theirs = state.add_to_lane(PlayerId::SECOND, 2, "Speed", 0, true, CardEffects::Builtin);
        let config = RulesConfig::default();

        let opponent = TargetFilter::default().owned_by(OwnerFilter::Opponent);
        assert_eq!(candidates(&state, &config, &opponent, &source, &ctx).as_slice(), &[theirs]);

        let own_other = TargetFilter::default().owned_by(OwnerFilter::Own).other_than_source();
        assert!(candidates(&state, &config, &own_other, &source, &ctx).is_empty());
    }

    #[test]
    fn test_value_filter_uses_face_down_value() {
        let (mut state, source, ctx) = board();
        let face_down =
            state.add_to_lane(PlayerId::SECOND, 0, "Death", 6, false, CardEffects::Builtin);
        let config = RulesConfig::default();

        let low = TargetFilter::default().owned_by(OwnerFilter::Opponent).valued(None, Some(2));
        assert_eq!(candidates(&state, &config, &low, &source, &ctx).as_slice(), &[face_down]);
    }

    #[test]
    fn test_lane_filter_follows_source() {
        let (mut state, source, ctx) = board();
        let same = state.add_to_lane(PlayerId::SECOND, 0, "Death", 1, true, CardEffects::Builtin);
        let other = state.add_to_lane(PlayerId::SECOND, 2, "Speed", 1, true, CardEffects::Builtin);
        let config = RulesConfig::default();
        let filter = TargetFilter::default().owned_by(OwnerFilter::Opponent);

        let here = filter.clone().in_lanes(LaneFilter::SourceLane);
        assert_eq!(candidates(&state, &config, &here, &source, &ctx).as_slice(), &[same]);

        let elsewhere = filter.in_lanes(LaneFilter::OtherLanes);
        assert_eq!(candidates(&state, &config, &elsewhere, &source, &ctx).as_slice(), &[other]);
    }

    #[test]
    fn test_shift_lanes() {
        let (mut state, source, _) = board();
        let card = state.add_to_lane(PlayerId::FIRST, 1, "Spirit", 2, true, CardEffects::Builtin);

        let lanes = |restriction| legal_shift_lanes(&state, card, restriction, &source).to_vec();

        assert_eq!(lanes(LaneRestriction::Any), vec![0, 2]);
        assert_eq!(lanes(LaneRestriction::DifferentFromSource), vec![2]);
        assert_eq!(lanes(LaneRestriction::NotMatchingProtocols), vec![0]);
        assert_eq!(lanes(LaneRestriction::MustInclude(2)), vec![2]);
        assert!(legal_shift_lanes(&state, CardId(999), LaneRestriction::Any, &source).is_empty());
    }

    #[test]
    fn test_filter_deserializes_with_defaults() {
        let json = r#"{"face": "down", "position": "any"}"#;
        let filter: TargetFilter = serde_json::from_str(json).unwrap();
        assert_eq!(filter.face, FaceFilter::Down);
        assert_eq!(filter.position, PositionFilter::Any);
        assert_eq!(filter.owner, OwnerFilter::Any);
        assert!(!filter.exclude_source);
    }
}
