//! Data-driven protocol definitions.
//!
//! A custom protocol is a named set of cards, each described entirely by
//! declarative effect lists. Definitions deserialize from JSON (or any serde
//! format) and are turned into [`CardEffects`] when cards are created.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::effects::EffectBundle;

use super::instance::CardEffects;

/// One card of a custom protocol.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardDefinition {
    /// Printed value.
    pub value: i32,

    /// Box texts and passive modifiers.
    #[serde(flatten)]
    pub bundle: EffectBundle,
}

/// A custom protocol.
///
/// ```
/// use compile_rules::cards::ProtocolDefinition;
///
/// let json = r#"{
///     "name": "Echo",
///     "cards": [
///         { "value": 1, "middle": [
///             { "trigger": "on_play", "step": { "kind": "draw", "count": 1 } }
///         ] }
///     ]
/// }"#;
/// let echo: ProtocolDefinition = serde_json::from_str(json).unwrap();
///
/// assert_eq!(echo.name, "Echo");
/// assert!(echo.effects_for(1).is_some());
/// assert!(echo.effects_for(2).is_none());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolDefinition {
    pub name: String,
    pub cards: Vec<CardDefinition>,
}

impl ProtocolDefinition {
    /// Create an empty protocol.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cards: Vec::new(),
        }
    }

    /// Add a card (builder pattern).
    #[must_use]
    pub fn with_card(mut self, value: i32, bundle: EffectBundle) -> Self {
        self.cards.push(CardDefinition { value, bundle });
        self
    }

    /// Look up a card by value.
    #[must_use]
    pub fn card(&self, value: i32) -> Option<&CardDefinition> {
        self.cards.iter().find(|c| c.value == value)
    }

    /// Effects for a new instance of the card with this value.
    #[must_use]
    pub fn effects_for(&self, value: i32) -> Option<CardEffects> {
        self.card(value)
            .map(|def| CardEffects::Custom(Arc::new(def.bundle.clone())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::{BoxSlot, EffectTrigger, ValueModifier};

    #[test]
    fn test_flattened_bundle() {
        let json = r#"{
            "value": 2,
            "top": [],
            "modifiers": [{ "face_down_value": 4 }]
        }"#;
        let def: CardDefinition = serde_json::from_str(json).unwrap();

        assert_eq!(def.value, 2);
        assert_eq!(def.bundle.modifiers, vec![ValueModifier::FaceDownValue(4)]);
        assert!(def.bundle.slot(BoxSlot::Bottom).is_empty());
    }

    #[test]
    fn test_builder_and_lookup() {
        let protocol = ProtocolDefinition::new("Mirror")
            .with_card(0, EffectBundle::default())
            .with_card(5, EffectBundle::default());

        assert_eq!(protocol.cards.len(), 2);
        assert_eq!(protocol.card(5).map(|c| c.value), Some(5));

        let effects = protocol.effects_for(0).unwrap();
        let bundle = effects.bundle().unwrap();
        assert!(bundle.with_trigger(BoxSlot::Middle, EffectTrigger::OnPlay).is_empty());
    }
}
