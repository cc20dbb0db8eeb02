//! Builtin effect registry.
//!
//! Fixed-catalog cards carry no effect data of their own. Their behavior is
//! looked up here by protocol, value, text box and trigger, and runs as an
//! ordinary Rust closure against the board.

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::core::GameState;
use crate::effects::{BoxSlot, EffectContext, EffectDef, EffectSource, EffectTrigger};
use crate::rules::Engine;

/// A builtin card effect.
///
/// Handlers mutate the board in place through the engine's effect
/// primitives ([`Engine::execute_step`], [`Engine::run_effect_list`]). A
/// handler that needs a player choice installs it and returns; the engine
/// notices the suspension through the board's continuation record.
pub type BuiltinEffect =
    Arc<dyn Fn(&Engine, &mut GameState, EffectSource, EffectContext) + Send + Sync>;

/// Lookup key for a builtin effect.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BuiltinKey {
    pub protocol: String,
    pub value: i32,
    pub slot: BoxSlot,
    pub trigger: EffectTrigger,
}

impl BuiltinKey {
    #[must_use]
    pub fn new(
        protocol: impl Into<String>,
        value: i32,
        slot: BoxSlot,
        trigger: EffectTrigger,
    ) -> Self {
        Self {
            protocol: protocol.into(),
            value,
            slot,
            trigger,
        }
    }
}

/// Registry of builtin card effects.
///
/// A card with no registered handler for a given box and trigger simply
/// does nothing there.
///
/// ## Example
///
/// ```
/// use compile_rules::cards::BuiltinRegistry;
/// use compile_rules::effects::{BoxSlot, EffectDef, EffectStep, EffectTrigger, Whose};
///
/// let mut registry = BuiltinRegistry::new();
/// registry.register_steps(
///     "Spirit",
///     1,
///     BoxSlot::Middle,
///     EffectTrigger::OnPlay,
///     vec![EffectDef::new(
///         EffectTrigger::OnPlay,
///         EffectStep::Draw { count: 2, whose: Whose::Own },
///     )],
/// );
///
/// assert!(registry.contains("Spirit", 1, BoxSlot::Middle, EffectTrigger::OnPlay));
/// assert!(!registry.contains("Spirit", 1, BoxSlot::Bottom, EffectTrigger::OnPlay));
/// ```
#[derive(Clone, Default)]
pub struct BuiltinRegistry {
    handlers: FxHashMap<BuiltinKey, BuiltinEffect>,
}

impl BuiltinRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler, replacing any previous one for the same key.
    pub fn register<F>(
        &mut self,
        protocol: &str,
        value: i32,
        slot: BoxSlot,
        trigger: EffectTrigger,
        handler: F,
    ) where
        F: Fn(&Engine, &mut GameState, EffectSource, EffectContext) + Send + Sync + 'static,
    {
        self.handlers
            .insert(BuiltinKey::new(protocol, value, slot, trigger), Arc::new(handler));
    }

    /// Register a builtin whose behavior is a fixed list of declarative steps.
    pub fn register_steps(
        &mut self,
        protocol: &str,
        value: i32,
        slot: BoxSlot,
        trigger: EffectTrigger,
        steps: Vec<EffectDef>,
    ) {
        self.register(protocol, value, slot, trigger, move |engine, state, source, ctx| {
            engine.run_effect_list(state, source, ctx, steps.clone());
        });
    }

    /// Look up a handler.
    #[must_use]
    pub fn get(
        &self,
        protocol: &str,
        value: i32,
        slot: BoxSlot,
        trigger: EffectTrigger,
    ) -> Option<&BuiltinEffect> {
        self.handlers.get(&BuiltinKey::new(protocol, value, slot, trigger))
    }

    /// Whether a handler exists.
    #[must_use]
    pub fn contains(
        &self,
        protocol: &str,
        value: i32,
        slot: BoxSlot,
        trigger: EffectTrigger,
    ) -> bool {
        self.get(protocol, value, slot, trigger).is_some()
    }

    /// Registered keys matching a predicate on the trigger, for one card.
    ///
    /// Used when a scan needs every builtin trigger of a kind (reactive
    /// listeners) rather than one exact key.
    pub fn triggers_for<'a>(
        &'a self,
        protocol: &'a str,
        value: i32,
        slot: BoxSlot,
    ) -> impl Iterator<Item = EffectTrigger> + 'a {
        self.handlers
            .keys()
            .filter(move |key| key.protocol == protocol && key.value == value && key.slot == slot)
            .map(|key| key.trigger)
    }

    /// Number of registered handlers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Whether nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl fmt::Debug for BuiltinRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuiltinRegistry")
            .field("handlers", &self.handlers.len())
            .finish()
    }
}
