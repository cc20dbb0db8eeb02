//! Suspended and deferred work.
//!
//! An [`ActionRequired`] is the one question the engine is waiting on. A
//! [`QueuedAction`] is work put aside behind it: the rest of an interrupted
//! effect list, an uncover or on-play check, a reactive event, another
//! question. Both carry everything needed to pick up later without
//! consulting any call stack.

use crate::cards::Card;
use crate::core::{CardId, Phase, PlayerId};
use crate::effects::{
    BoxSlot, Count, EffectContext, EffectDef, EffectSource, EffectTrigger, FollowUp, LaneRef,
    LaneRestriction, TargetFilter,
};
use crate::triggers::GameEvent;

/// The remaining steps of an interrupted effect list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingEffects {
    pub source: EffectSource,
    pub ctx: EffectContext,
    pub remaining: Vec<EffectDef>,
}

/// A follow-up waiting on the step it is chained to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Chained {
    pub source: EffectSource,
    pub ctx: EffectContext,
    pub follow_up: FollowUp,
}

impl Chained {
    /// The queued work this follow-up turns into after a step that touched
    /// `affected` cards, if its condition holds.
    #[must_use]
    pub fn into_work(self, affected: usize) -> Option<QueuedAction> {
        if !self.follow_up.applies(affected) {
            return None;
        }
        Some(QueuedAction::Resume(PendingEffects {
            source: self.source,
            ctx: self.ctx,
            remaining: vec![*self.follow_up.effect],
        }))
    }
}

/// What a card selection is for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SelectionPurpose {
    Delete,
    Return,
    Flip,
    /// Pick the card to shift; the destination comes from `to` or a
    /// follow-up lane choice.
    Shift { to: Option<LaneRef>, restriction: LaneRestriction },
}

impl SelectionPurpose {
    /// Verb for logs.
    #[must_use]
    pub fn verb(&self) -> &'static str {
        match self {
            Self::Delete => "delete",
            Self::Return => "return",
            Self::Flip => "flip",
            Self::Shift { .. } => "shift",
        }
    }
}

/// Pick board cards matching a filter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CardSelection {
    pub actor: PlayerId,
    pub purpose: SelectionPurpose,
    pub filter: TargetFilter,
    pub count: Count,
    pub source: EffectSource,
    pub ctx: EffectContext,
    pub chained: Option<Chained>,
}

/// Pick a destination lane for a shift.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LaneSelection {
    pub actor: PlayerId,
    pub card: CardId,
    pub restriction: LaneRestriction,
    pub source: EffectSource,
    pub ctx: EffectContext,
    pub chained: Option<Chained>,
}

/// Pick cards from one's own hand to discard.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiscardSelection {
    /// The discarding player, who also picks.
    pub actor: PlayerId,
    pub count: usize,
    pub source: EffectSource,
    pub ctx: EffectContext,
    pub chained: Option<Chained>,
}

/// Pick two lanes whose protocols trade places.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProtocolSwap {
    pub actor: PlayerId,
    /// Whose protocols are rearranged.
    pub side: PlayerId,
    pub source: EffectSource,
    pub ctx: EffectContext,
    pub chained: Option<Chained>,
}

/// Accept or decline an optional effect.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Prompt {
    pub actor: PlayerId,
    /// The effect to run on acceptance, already marked mandatory.
    pub effect: EffectDef,
    pub source: EffectSource,
    pub ctx: EffectContext,
}

/// Discard down to the hand limit at end of turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CacheClear {
    pub actor: PlayerId,
    pub count: usize,
}

/// The choice the engine is waiting on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ActionRequired {
    SelectCards(CardSelection),
    SelectLane(LaneSelection),
    Discard(DiscardSelection),
    SwapProtocols(ProtocolSwap),
    Prompt(Prompt),
    ClearCache(CacheClear),
}

impl ActionRequired {
    /// The player who must answer.
    #[must_use]
    pub fn actor(&self) -> PlayerId {
        match self {
            Self::SelectCards(a) => a.actor,
            Self::SelectLane(a) => a.actor,
            Self::Discard(a) => a.actor,
            Self::SwapProtocols(a) => a.actor,
            Self::Prompt(a) => a.actor,
            Self::ClearCache(a) => a.actor,
        }
    }

    /// The card whose effect asked, if any.
    #[must_use]
    pub fn source(&self) -> Option<EffectSource> {
        match self {
            Self::SelectCards(a) => Some(a.source),
            Self::SelectLane(a) => Some(a.source),
            Self::Discard(a) => Some(a.source),
            Self::SwapProtocols(a) => Some(a.source),
            Self::Prompt(a) => Some(a.source),
            Self::ClearCache(_) => None,
        }
    }

    /// Short description for logs and UIs.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::SelectCards(a) => {
                format!("{} selects cards to {} ({:?})", a.actor, a.purpose.verb(), a.count)
            }
            Self::SelectLane(a) => format!("{} selects a lane to shift {} to", a.actor, a.card),
            Self::Discard(a) => format!("{} discards {}", a.actor, a.count),
            Self::SwapProtocols(a) => format!("{} swaps two of {}'s protocols", a.actor, a.side),
            Self::Prompt(a) => format!("{} may {}", a.actor, a.effect.step.verb()),
            Self::ClearCache(a) => format!("{} clears cache, discarding {}", a.actor, a.count),
        }
    }
}

/// Deferred work, run in order once nothing is awaiting a choice.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QueuedAction {
    /// Continue an interrupted effect list.
    Resume(PendingEffects),

    /// Fire one text box of a card, if it is still live for that box.
    Fire { card: CardId, slot: BoxSlot, trigger: EffectTrigger },

    /// Offer an event to reactive listeners.
    Reactive(GameEvent),

    /// Put a card on top of a lane, then run its on-play checks. The card
    /// is held here while the covered card's effects resolve.
    Place { owner: PlayerId, lane: usize, card: Card, face_up: bool },

    /// Move a card between lanes of its owner's side.
    Shift { card: CardId, to: usize, actor: PlayerId, chained: Option<Chained> },

    /// Resume start or end effects with the cards not yet visited.
    PhaseEffects { player: PlayerId, phase: Phase, remaining: Vec<CardId> },

    /// Discard down to the hand limit.
    ClearCache { player: PlayerId },

    /// Pass the turn.
    EndTurn { player: PlayerId },

    /// Another question, asked once everything ahead of it is done.
    Await(ActionRequired),
}
