//! Per-invocation effect context.

use serde::{Deserialize, Serialize};

use crate::core::{CardId, GameState, PlayerId};

use super::effect::{EffectTrigger, Whose};

/// Who is doing what, for one effect invocation.
///
/// The owner of the card and the side making the choices can differ ("your
/// opponent discards a card"), so filters like "own" and "opponent" are
/// always resolved against `owner`, while choices are asked of `actor`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EffectContext {
    /// Owner of the card whose effect this is.
    pub owner: PlayerId,
    /// Side performing the step and making its choices.
    pub actor: PlayerId,
    /// Whose turn it is.
    pub turn: PlayerId,
    /// What fired the effect.
    pub trigger: EffectTrigger,
}

impl EffectContext {
    /// Context for an effect performed by the card's owner.
    #[must_use]
    pub fn new(owner: PlayerId, turn: PlayerId, trigger: EffectTrigger) -> Self {
        Self {
            owner,
            actor: owner,
            turn,
            trigger,
        }
    }

    /// The owner's opponent.
    #[must_use]
    pub fn opponent(&self) -> PlayerId {
        self.owner.opponent()
    }

    /// Resolve a relative side.
    ///
    /// ```
    /// use compile_rules::core::PlayerId;
    /// use compile_rules::effects::{EffectContext, EffectTrigger, Whose};
    ///
    /// let ctx = EffectContext::new(PlayerId::SECOND, PlayerId::FIRST, EffectTrigger::OnCover);
    /// assert_eq!(ctx.side(Whose::Own), PlayerId::SECOND);
    /// assert_eq!(ctx.side(Whose::Opponent), PlayerId::FIRST);
    /// ```
    #[must_use]
    pub fn side(&self, whose: Whose) -> PlayerId {
        match whose {
            Whose::Own => self.owner,
            Whose::Opponent => self.owner.opponent(),
        }
    }

    /// The same context with the step performed by another side.
    #[must_use]
    pub fn acting_as(self, whose: Whose) -> Self {
        Self {
            actor: self.side(whose),
            ..self
        }
    }
}

/// The card an effect comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EffectSource {
    pub card: CardId,
    pub owner: PlayerId,
    /// Lane the card occupied when the effect fired.
    pub lane: usize,
}

impl EffectSource {
    /// The lane the source occupies now, falling back to where it was when
    /// the effect fired if it has since left the board.
    #[must_use]
    pub fn current_lane(&self, state: &GameState) -> usize {
        state.locate(self.card).map_or(self.lane, |loc| loc.lane)
    }

    /// Whether the source card is still on the board.
    #[must_use]
    pub fn is_on_board(&self, state: &GameState) -> bool {
        state.locate(self.card).is_some()
    }
}
