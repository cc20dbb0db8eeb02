//! # compile-rules
//!
//! Rules engine for a two-player, three-lane protocol card game.
//!
//! ## Design Principles
//!
//! 1. **Boards are values**: every public operation takes a `GameState` by
//!    reference and returns a new one. Collections are `im` persistent
//!    structures, so that copy is O(1).
//!
//! 2. **Suspension is data**: when a player has to choose, the engine
//!    records the question and all interrupted work on the board and
//!    returns. Nothing waits on a call stack.
//!
//! 3. **Deterministic order**: effects fire in board scan order (turn
//!    player's side first, lanes left to right, stacks bottom to top), and
//!    work cut short by a question resumes ahead of older deferred work.
//!
//! ## Modules
//!
//! - `core`: players, card ids, configuration, the board, choices, RNG, log
//! - `cards`: card instances, custom protocol definitions, builtin catalog
//! - `effects`: declarative card text, targeting and step interpretation
//! - `triggers`: reactive events and listener matching
//! - `stack`: continuation record, drain loop and choice resolution
//! - `rules`: the `Engine`, value recalculation and turn structure
//! - `decision`: decision sources and per-match memory
//!
//! ## Example
//!
//! ```
//! use compile_rules::{CardEffects, Engine, GameState, PlayerId, PlayerMap, Side};
//!
//! let engine = Engine::default();
//! let sides = PlayerMap::new(|_| Side::new(["Fire", "Water", "Spirit"]));
//! let mut state = GameState::new(sides, PlayerId::FIRST, 42);
//! let card = state.add_to_hand(PlayerId::FIRST, "Water", 4, CardEffects::Builtin);
//!
//! let next = engine.play_card(&state, PlayerId::FIRST, card, 1, true).unwrap();
//! assert_eq!(next.side(PlayerId::FIRST).lane_values[1], 4);
//! assert_eq!(state.side(PlayerId::FIRST).hand.len(), 1);
//! ```

pub mod core;
pub mod cards;
pub mod effects;
pub mod triggers;
pub mod stack;
pub mod rules;
pub mod decision;

// Re-export commonly used types
pub use crate::core::{
    CardId, Choice, GameState, Phase, PlayerId, PlayerMap, RulesConfig, Side,
    Animation, GameLog,
};

pub use crate::cards::{Card, CardEffects, ProtocolDefinition, BuiltinRegistry};

pub use crate::effects::{
    BoxSlot, Count, EffectBundle, EffectDef, EffectStep, EffectTrigger, TargetFilter, Whose,
};

pub use crate::triggers::{ActorFilter, GameEvent, ReactiveTrigger};

pub use crate::stack::{ActionRequired, FlowState};

pub use crate::rules::{Engine, IllegalMove};

pub use crate::decision::{DecisionSource, FirstLegal, MatchMemory, RandomLegal};
