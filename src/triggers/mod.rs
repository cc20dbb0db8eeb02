//! Reactive triggers.
//!
//! Card text can listen for game events ("after a card is deleted", "after
//! your opponent draws"). Primitives raise a [`GameEvent`]; the engine
//! offers it to every face-up card on the board in scan order.
//!
//! ## Key Components
//!
//! - [`ReactiveTrigger`]: the event kinds
//! - [`GameEvent`]: one occurrence, with actor, card, lane and count
//! - [`ActorFilter`]: whose actions a listener cares about
//! - [`listener_matches`]: actor and lane-locality matching

mod condition;
mod event;
mod reactive;

pub use condition::{listener_matches, ActorFilter, ListenerSite};
pub use event::{GameEvent, ReactiveTrigger};
