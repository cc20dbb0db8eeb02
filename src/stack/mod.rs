//! Suspension and deferred work.
//!
//! Card effects cascade: a delete raises an event, a listener flips a card,
//! the flip uncovers another card whose text asks its owner to choose. The
//! engine never blocks on that choice. It records the question and every
//! piece of work cut short by it on the board, returns, and picks up again
//! when [`Engine::resolve`](crate::rules::Engine::resolve) is called.
//!
//! ```
//! use compile_rules::core::{GameState, PlayerId, PlayerMap, Side};
//! use compile_rules::stack::FlowState;
//!
//! let sides = PlayerMap::new(|_| Side::new(["Fire", "Water", "Spirit"]));
//! let state = GameState::new(sides, PlayerId::FIRST, 42);
//! assert_eq!(state.flow(), FlowState::Idle);
//! ```

mod action;
mod queue;
mod resolvers;

pub use action::{
    ActionRequired, CacheClear, CardSelection, Chained, DiscardSelection, LaneSelection,
    PendingEffects, Prompt, ProtocolSwap, QueuedAction, SelectionPurpose,
};
pub use queue::{Continuation, FlowState};
