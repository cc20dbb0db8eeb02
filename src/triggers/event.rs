//! Game events that reactive effects listen for.
//!
//! Unlike box triggers (on play, on cover, start, end), reactive triggers are
//! not tied to the card's own life cycle: they fire when a named event
//! happens anywhere on the board.

use serde::{Deserialize, Serialize};

use crate::core::{CardId, PlayerId};

/// The event kinds a reactive effect can declare.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReactiveTrigger {
    AfterPlay,
    AfterDelete,
    AfterShift,
    AfterFlip,
    AfterReturn,
    AfterDraw,
    AfterDiscard,
    /// This card was covered or flipped.
    OnCoverOrFlip,
    AfterCompile,
    AfterClearCache,
}

impl ReactiveTrigger {
    /// Short name for logs.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::AfterPlay => "after play",
            Self::AfterDelete => "after delete",
            Self::AfterShift => "after shift",
            Self::AfterFlip => "after flip",
            Self::AfterReturn => "after return",
            Self::AfterDraw => "after draw",
            Self::AfterDiscard => "after discard",
            Self::OnCoverOrFlip => "on cover or flip",
            Self::AfterCompile => "after compile",
            Self::AfterClearCache => "after clear cache",
        }
    }

    /// Kinds that fire at most once per card per turn, however many times
    /// the event repeats. Every other kind fires once per distinct event.
    #[must_use]
    pub fn once_per_turn(self) -> bool {
        matches!(self, Self::AfterCompile | Self::AfterClearCache)
    }

    /// Kinds that only concern the event's own card rather than every
    /// face-up card on the board.
    #[must_use]
    pub fn card_scoped(self) -> bool {
        matches!(self, Self::OnCoverOrFlip)
    }
}

impl std::fmt::Display for ReactiveTrigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Something that just happened on the board.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameEvent {
    /// What happened.
    pub kind: ReactiveTrigger,

    /// The side that performed the action.
    pub actor: PlayerId,

    /// The card the event is about, if any.
    pub card: Option<CardId>,

    /// The lane the event happened in, if any.
    pub lane: Option<usize>,

    /// How many cards were involved.
    pub count: usize,

    /// Distinct occurrence number, assigned when the event is raised.
    pub serial: u64,
}

impl GameEvent {
    /// Create a new event.
    #[must_use]
    pub fn new(kind: ReactiveTrigger, actor: PlayerId) -> Self {
        Self {
            kind,
            actor,
            card: None,
            lane: None,
            count: 1,
            serial: 0,
        }
    }

    /// Set the card (builder pattern).
    #[must_use]
    pub fn with_card(mut self, card: CardId) -> Self {
        self.card = Some(card);
        self
    }

    /// Set the lane (builder pattern).
    #[must_use]
    pub fn with_lane(mut self, lane: usize) -> Self {
        self.lane = Some(lane);
        self
    }

    /// Set the card count (builder pattern).
    #[must_use]
    pub fn with_count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }
}
