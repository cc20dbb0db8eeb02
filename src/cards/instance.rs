//! Card instances - runtime card state.
//!
//! A `Card` is one physical card in a match: its protocol and printed value
//! never change, while its orientation does. Where it sits (hand, lane,
//! deck, discard) is implied by which collection holds it.

use std::sync::Arc;

use crate::core::CardId;
use crate::effects::{BoxSlot, EffectBundle, EffectDef, EffectTrigger, ValueModifier};

/// Where a card's effects come from.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum CardEffects {
    /// Fixed-catalog card; effects are looked up in the
    /// [`BuiltinRegistry`](super::BuiltinRegistry) by protocol and value.
    #[default]
    Builtin,
    /// Data-driven card carrying its own effect lists.
    Custom(Arc<EffectBundle>),
}

impl CardEffects {
    /// Wrap a bundle.
    #[must_use]
    pub fn custom(bundle: EffectBundle) -> Self {
        Self::Custom(Arc::new(bundle))
    }

    /// The bundle of a custom card.
    #[must_use]
    pub fn bundle(&self) -> Option<&EffectBundle> {
        match self {
            Self::Builtin => None,
            Self::Custom(bundle) => Some(bundle),
        }
    }
}

/// A card in a match.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Card {
    /// Unique instance ID.
    pub id: CardId,

    /// Protocol name printed on the card.
    pub protocol: String,

    /// Printed value.
    pub value: i32,

    /// Orientation on the board. Cards in hand, deck and discard are
    /// always stored face-up.
    pub face_up: bool,

    /// Set when the card's identity was shown to the other player.
    pub revealed: bool,

    /// Effect source.
    pub effects: CardEffects,
}

impl Card {
    /// Create a face-up card.
    #[must_use]
    pub fn new(id: CardId, protocol: impl Into<String>, value: i32, effects: CardEffects) -> Self {
        Self {
            id,
            protocol: protocol.into(),
            value,
            face_up: true,
            revealed: false,
            effects,
        }
    }

    /// Display name, e.g. `Fire-3`.
    #[must_use]
    pub fn name(&self) -> String {
        format!("{}-{}", self.protocol, self.value)
    }

    /// Whether this card is data-driven.
    #[must_use]
    pub fn is_custom(&self) -> bool {
        matches!(self.effects, CardEffects::Custom(_))
    }

    /// Custom effects of one box matching a trigger, in printed order.
    ///
    /// Always empty for builtin cards.
    #[must_use]
    pub fn custom_effects(&self, slot: BoxSlot, trigger: EffectTrigger) -> Vec<EffectDef> {
        self.effects
            .bundle()
            .map(|bundle| bundle.with_trigger(slot, trigger))
            .unwrap_or_default()
    }

    /// Passive value modifiers printed on the card.
    #[must_use]
    pub fn modifiers(&self) -> &[ValueModifier] {
        self.effects
            .bundle()
            .map(|bundle| bundle.modifiers.as_slice())
            .unwrap_or(&[])
    }

    /// Reset board-only state when the card leaves the board.
    pub fn reset_for_zone_change(&mut self) {
        self.face_up = true;
        self.revealed = false;
    }
}

impl std::fmt::Display for Card {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.face_up {
            write!(f, "{}-{}", self.protocol, self.value)
        } else {
            write!(f, "a face-down card")
        }
    }
}
