//! Effect definitions.
//!
//! A card's text is split into three boxes. Each box holds a list of
//! [`EffectDef`]s: one declarative step plus the trigger that fires it,
//! who performs it, and an optional follow-up for "do X. If you do, Y"
//! chains. Data-driven protocols are written entirely in these types and
//! can be loaded with serde.

use serde::{Deserialize, Serialize};

use crate::triggers::{ActorFilter, ReactiveTrigger};

use super::targeting::{LaneRestriction, TargetFilter};

/// The three text boxes on a card.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BoxSlot {
    /// Passive text. Active while the card is face-up, covered or not.
    Top,
    /// On-play text. Fires when the card lands uncovered and face-up.
    Middle,
    /// Triggered text. Only live while the card is face-up and uncovered.
    Bottom,
}

impl BoxSlot {
    /// Whether a card in this state can fire effects from this box.
    #[must_use]
    pub fn is_live(self, face_up: bool, uncovered: bool) -> bool {
        match self {
            BoxSlot::Top => face_up,
            BoxSlot::Middle | BoxSlot::Bottom => face_up && uncovered,
        }
    }
}

/// What causes an effect to fire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectTrigger {
    /// The card was played (or flipped face-up) uncovered.
    OnPlay,
    /// Another card is about to be placed on top of this one.
    OnCover,
    /// The card above this one left, leaving this card on top.
    OnUncover,
    /// Start of the owner's turn.
    Start,
    /// End of the owner's turn.
    End,
    /// A named game event happened somewhere on the board.
    Reactive {
        on: ReactiveTrigger,
        #[serde(default)]
        actor: ActorFilter,
        /// Only react to events in the lane this card sits in.
        #[serde(default)]
        lane_local: bool,
    },
}

impl EffectTrigger {
    /// Convenience constructor for a reactive trigger with no lane scoping.
    #[must_use]
    pub const fn reactive(on: ReactiveTrigger, actor: ActorFilter) -> Self {
        Self::Reactive { on, actor, lane_local: false }
    }

    /// Short name for logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::OnPlay => "on play",
            Self::OnCover => "on cover",
            Self::OnUncover => "on uncover",
            Self::Start => "start",
            Self::End => "end",
            Self::Reactive { on, .. } => on.name(),
        }
    }
}

/// How many targets a step affects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Count {
    /// Exactly `n`, or every candidate when fewer exist.
    Exactly(u8),
    /// Between one and `n`, at the chooser's discretion.
    UpTo(u8),
    /// Every candidate.
    All,
}

impl Count {
    /// Largest number of targets this count allows out of `available`.
    #[must_use]
    pub fn limit(self, available: usize) -> usize {
        match self {
            Count::Exactly(n) | Count::UpTo(n) => available.min(n as usize),
            Count::All => available,
        }
    }

    /// Whether the chooser must pick among `available` candidates.
    ///
    /// `All` never asks. `Exactly(n)` only asks when there are more
    /// candidates than `n`. `UpTo(n)` asks whenever there is anything to
    /// pick, since fewer than `n` is a legal answer.
    #[must_use]
    pub fn needs_choice(self, available: usize) -> bool {
        match self {
            Count::All => false,
            Count::Exactly(n) => available > n as usize,
            Count::UpTo(_) => available > 0,
        }
    }

    /// Whether `picked` targets is a legal answer out of `available`.
    #[must_use]
    pub fn accepts(self, picked: usize, available: usize) -> bool {
        match self {
            Count::All => picked == available,
            Count::Exactly(_) => picked == self.limit(available),
            Count::UpTo(_) => picked >= 1usize.min(available) && picked <= self.limit(available),
        }
    }
}

/// A side of the board, relative to the card that owns the effect.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Whose {
    /// The card's owner ("you").
    #[default]
    Own,
    /// The other player ("your opponent").
    Opponent,
}

/// Which card a shift moves.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShiftTarget {
    /// The card carrying the effect.
    ThisCard,
    /// A card picked by the acting player.
    Choose(TargetFilter),
}

/// Where a shift lands when it does not need a choice.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LaneRef {
    /// The lane the effect's source card occupies.
    SourceLane,
    /// A fixed lane index.
    Fixed(usize),
}

/// Which lanes a play-from-deck step fills.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LaneSelector {
    /// Only the source card's lane.
    SourceLane,
    /// Every lane except the source card's.
    OtherLanes,
    /// All three lanes.
    AllLanes,
}

/// One declarative effect step.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EffectStep {
    /// Send matching board cards to their owners' discard piles.
    Delete { count: Count, #[serde(default)] filter: TargetFilter },

    /// Send matching board cards back to their owners' hands.
    Return { count: Count, #[serde(default)] filter: TargetFilter },

    /// Turn matching board cards over.
    Flip { count: Count, #[serde(default)] filter: TargetFilter },

    /// Move a card to another lane of its owner's side.
    Shift {
        target: ShiftTarget,
        #[serde(default)]
        to: Option<LaneRef>,
        #[serde(default)]
        restriction: LaneRestriction,
    },

    /// Exchange two protocol labels on one side.
    SwapProtocols { #[serde(default)] whose: Whose },

    /// Draw from deck to hand.
    Draw { count: u8, #[serde(default)] whose: Whose },

    /// Discard from hand; the discarding player picks the cards.
    Discard { count: u8, #[serde(default)] whose: Whose },

    /// Show a hand to the other player.
    RevealHand { #[serde(default)] whose: Whose },

    /// Play the top card of a deck face-down.
    PlayFromDeck { lanes: LaneSelector, #[serde(default)] whose: Whose },
}

impl EffectStep {
    /// Short verb for logs.
    #[must_use]
    pub fn verb(&self) -> &'static str {
        match self {
            Self::Delete { .. } => "delete",
            Self::Return { .. } => "return",
            Self::Flip { .. } => "flip",
            Self::Shift { .. } => "shift",
            Self::SwapProtocols { .. } => "swap protocols",
            Self::Draw { .. } => "draw",
            Self::Discard { .. } => "discard",
            Self::RevealHand { .. } => "reveal hand",
            Self::PlayFromDeck { .. } => "play from deck",
        }
    }
}

/// When a follow-up runs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FollowUpCondition {
    /// Only if the preceding step affected at least one card.
    #[default]
    IfAffected,
    /// Regardless of what the preceding step did.
    Always,
}

/// A chained effect: "do X. If you do, Y".
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowUp {
    #[serde(default)]
    pub condition: FollowUpCondition,
    pub effect: Box<EffectDef>,
}

impl FollowUp {
    /// Whether this follow-up should run after a step that touched `affected` cards.
    #[must_use]
    pub fn applies(&self, affected: usize) -> bool {
        match self.condition {
            FollowUpCondition::IfAffected => affected > 0,
            FollowUpCondition::Always => true,
        }
    }
}

/// A single entry in a box's effect list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectDef {
    pub trigger: EffectTrigger,
    pub step: EffectStep,

    /// Who makes the choices for this step.
    #[serde(default)]
    pub actor: Whose,

    /// "You may ...": the actor is asked before the step runs.
    #[serde(default)]
    pub optional: bool,

    #[serde(default)]
    pub follow_up: Option<FollowUp>,
}

impl EffectDef {
    /// Create a mandatory effect performed by the card's owner.
    #[must_use]
    pub fn new(trigger: EffectTrigger, step: EffectStep) -> Self {
        Self {
            trigger,
            step,
            actor: Whose::Own,
            optional: false,
            follow_up: None,
        }
    }

    /// Make the step optional (builder pattern).
    #[must_use]
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Hand the step's choices to the given side (builder pattern).
    #[must_use]
    pub fn performed_by(mut self, actor: Whose) -> Self {
        self.actor = actor;
        self
    }

    /// Chain a conditional follow-up (builder pattern).
    #[must_use]
    pub fn then_if_affected(mut self, effect: EffectDef) -> Self {
        self.follow_up = Some(FollowUp {
            condition: FollowUpCondition::IfAffected,
            effect: Box::new(effect),
        });
        self
    }

    /// Chain an unconditional follow-up (builder pattern).
    #[must_use]
    pub fn then_always(mut self, effect: EffectDef) -> Self {
        self.follow_up = Some(FollowUp {
            condition: FollowUpCondition::Always,
            effect: Box::new(effect),
        });
        self
    }
}

/// A passive top-box modifier to lane arithmetic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueModifier {
    /// Face-down cards on this side of this lane count as `n`.
    FaceDownValue(i32),
    /// Add to this side's total in this lane.
    OwnLaneBonus(i32),
    /// Add to the opposing side's total in this lane (usually negative).
    OpposingLaneBonus(i32),
}

/// Everything printed on a data-driven card.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectBundle {
    pub top: Vec<EffectDef>,
    pub middle: Vec<EffectDef>,
    pub bottom: Vec<EffectDef>,
    pub modifiers: Vec<ValueModifier>,
}

impl EffectBundle {
    /// Entries of one box.
    #[must_use]
    pub fn slot(&self, slot: BoxSlot) -> &[EffectDef] {
        match slot {
            BoxSlot::Top => &self.top,
            BoxSlot::Middle => &self.middle,
            BoxSlot::Bottom => &self.bottom,
        }
    }

    /// Entries of one box whose trigger satisfies `pred`, in printed order.
    pub fn matching<'a>(
        &'a self,
        slot: BoxSlot,
        pred: impl Fn(&EffectTrigger) -> bool + 'a,
    ) -> impl Iterator<Item = &'a EffectDef> + 'a {
        self.slot(slot).iter().filter(move |def| pred(&def.trigger))
    }

    /// Entries of one box with exactly this trigger.
    #[must_use]
    pub fn with_trigger(&self, slot: BoxSlot, trigger: EffectTrigger) -> Vec<EffectDef> {
        self.matching(slot, |t| *t == trigger).cloned().collect()
    }
}
