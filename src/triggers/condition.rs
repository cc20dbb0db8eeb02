//! Reactive trigger conditions.
//!
//! A reactive effect declares which event it listens for plus two filters:
//! whose action counts (the actor relationship) and whether only events in
//! its own lane count.

use serde::{Deserialize, Serialize};

use crate::core::PlayerId;

use super::event::GameEvent;

/// Which side's actions a reactive effect responds to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorFilter {
    /// Only when the card's owner performed the action.
    #[serde(rename = "self")]
    SelfSide,
    /// Only when the other side performed the action.
    Opponent,
    /// Whoever performed it.
    #[default]
    Any,
}

impl ActorFilter {
    /// Check the filter for a card owned by `owner` against an event by `actor`.
    ///
    /// ```
    /// use compile_rules::core::PlayerId;
    /// use compile_rules::triggers::ActorFilter;
    ///
    /// assert!(ActorFilter::SelfSide.matches(PlayerId::FIRST, PlayerId::FIRST));
    /// assert!(!ActorFilter::SelfSide.matches(PlayerId::FIRST, PlayerId::SECOND));
    /// assert!(ActorFilter::Opponent.matches(PlayerId::FIRST, PlayerId::SECOND));
    /// assert!(ActorFilter::Any.matches(PlayerId::SECOND, PlayerId::FIRST));
    /// ```
    #[must_use]
    pub fn matches(self, owner: PlayerId, actor: PlayerId) -> bool {
        match self {
            ActorFilter::SelfSide => owner == actor,
            ActorFilter::Opponent => owner != actor,
            ActorFilter::Any => true,
        }
    }
}

/// Where a candidate card sits when the event is checked against it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ListenerSite {
    pub owner: PlayerId,
    pub lane: usize,
}

/// Full reactive match: actor relationship plus optional lane scope.
///
/// A lane-local listener ignores events that carry no lane, and events in
/// any other lane index.
#[must_use]
pub fn listener_matches(
    event: &GameEvent,
    site: ListenerSite,
    actor: ActorFilter,
    lane_local: bool,
) -> bool {
    if !actor.matches(site.owner, event.actor) {
        return false;
    }
    if lane_local {
        return event.lane == Some(site.lane);
    }
    true
}
