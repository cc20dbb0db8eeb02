//! Reactive dispatch.
//!
//! When a game event is raised, every face-up card whose live text listens
//! for it fires, in board scan order (turn player's side first, lanes left
//! to right, stacks bottom to top). Dispatch is single-flight: events raised
//! while listeners are running are not dispatched again.

use tracing::trace;

use crate::cards::CardEffects;
use crate::core::{CardLocation, GameState, ReactiveKey};
use crate::effects::{BoxSlot, EffectTrigger};
use crate::rules::Engine;
use crate::stack::QueuedAction;

use super::condition::{listener_matches, ListenerSite};
use super::event::GameEvent;

impl Engine {
    /// Reactive triggers of one box of a board card that match an event.
    fn listening_triggers(
        &self,
        state: &GameState,
        location: CardLocation,
        slot: BoxSlot,
        event: &GameEvent,
    ) -> Vec<EffectTrigger> {
        let Some(card) = state.card_at(location) else {
            return Vec::new();
        };
        let site = ListenerSite {
            owner: location.owner,
            lane: location.lane,
        };
        let matches = |trigger: &EffectTrigger| match *trigger {
            EffectTrigger::Reactive { on, actor, lane_local } => {
                on == event.kind && listener_matches(event, site, actor, lane_local)
            }
            _ => false,
        };

        let mut found: Vec<EffectTrigger> = match &card.effects {
            CardEffects::Custom(bundle) => {
                bundle.matching(slot, matches).map(|def| def.trigger).collect()
            }
            CardEffects::Builtin => self
                .builtins
                .triggers_for(&card.protocol, card.value, slot)
                .filter(|t| matches(t))
                .collect(),
        };
        // One firing per distinct trigger; each firing runs every entry with it.
        let mut seen = Vec::with_capacity(found.len());
        found.retain(|t| {
            if seen.contains(t) {
                false
            } else {
                seen.push(*t);
                true
            }
        });
        found
    }

    /// Offer an event to every reactive listener on the board.
    pub(crate) fn process_reactive(&self, state: &mut GameState, mut event: GameEvent) {
        if state.continuation.reactive_active {
            trace!(kind = %event.kind, "reactive dispatch already running; event dropped");
            return;
        }
        if event.serial == 0 {
            event.serial = state.next_event_serial();
        }

        let mut work = Vec::new();
        let mut keys: Vec<ReactiveKey> = Vec::new();
        for (location, card) in state.board_scan(state.turn) {
            if !card.face_up {
                continue;
            }
            if event.kind.card_scoped() && event.card != Some(card.id) {
                continue;
            }
            let key: ReactiveKey = (
                card.id,
                event.kind,
                if event.kind.once_per_turn() { None } else { Some(event.serial) },
            );
            if state.guards.reactive_fired.contains(&key) {
                continue;
            }

            let uncovered = state.is_uncovered(location);
            let mut fires = Vec::new();
            for slot in [BoxSlot::Top, BoxSlot::Bottom] {
                if !slot.is_live(card.face_up, uncovered) {
                    continue;
                }
                for trigger in self.listening_triggers(state, location, slot, &event) {
                    fires.push(QueuedAction::Fire { card: card.id, slot, trigger });
                }
            }
            if !fires.is_empty() {
                keys.push(key);
                work.extend(fires);
            }
        }
        if work.is_empty() {
            return;
        }

        trace!(kind = %event.kind, listeners = keys.len(), "reactive dispatch");
        for key in keys {
            state.guards.reactive_fired.insert(key);
        }

        // Listeners left unfired by a suspension are filed ahead of the
        // cascade that raised the event.
        state.continuation.reactive_active = true;
        self.run_work(state, work);
        state.continuation.reactive_active = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{PlayerId, PlayerMap, Side};
    use crate::effects::{EffectBundle, EffectDef, EffectStep, Whose};
    use crate::triggers::{ActorFilter, ReactiveTrigger};

    fn listener(on: ReactiveTrigger, actor: ActorFilter) -> CardEffects {
        let trigger = EffectTrigger::reactive(on, actor);
        CardEffects::custom(EffectBundle {
            top: vec![EffectDef::new(trigger, EffectStep::Draw { count: 1, whose: Whose::Own })],
            ..EffectBundle::default()
        })
    }

    fn fire(engine: &Engine, state: &mut GameState, kind: ReactiveTrigger, actor: PlayerId) {
        engine.process_reactive(state, GameEvent::new(kind, actor));
    }

    fn board() -> GameState {
        let sides = PlayerMap::new(|_| Side::new(["Fire", "Water", "Spirit"]));
        let mut state = GameState::new(sides, PlayerId::FIRST, 21);
        for player in PlayerId::all() {
            for _ in 0..5 {
                state.add_to_deck(player, "Fire", 1, CardEffects::Builtin);
            }
        }
        state
    }

    #[test]
    fn test_actor_filter() {
        let engine = Engine::default();
        let mut state = board();
        let effects = listener(ReactiveTrigger::AfterPlay, ActorFilter::Opponent);
        state.add_to_lane(PlayerId::FIRST, 0, "Fire", 1, true, effects);

        fire(&engine, &mut state, ReactiveTrigger::AfterPlay, PlayerId::FIRST);
        assert!(state.side(PlayerId::FIRST).hand.is_empty());

        fire(&engine, &mut state, ReactiveTrigger::AfterPlay, PlayerId::SECOND);
        assert_eq!(state.side(PlayerId::FIRST).hand.len(), 1);
    }

    #[test]
    fn test_face_down_cards_do_not_listen() {
        let engine = Engine::default();
        let mut state = board();
        let effects = listener(ReactiveTrigger::AfterDelete, ActorFilter::Any);
        state.add_to_lane(PlayerId::FIRST, 0, "Fire", 1, false, effects);

        fire(&engine, &mut state, ReactiveTrigger::AfterDelete, PlayerId::SECOND);
        assert!(state.side(PlayerId::FIRST).hand.is_empty());
    }

    #[test]
    fn test_top_box_listens_while_covered() {
        let engine = Engine::default();
        let mut state = board();
        let effects = listener(ReactiveTrigger::AfterShift, ActorFilter::Any);
        state.add_to_lane(PlayerId::FIRST, 0, "Fire", 1, true, effects);
        state.add_to_lane(PlayerId::FIRST, 0, "Fire", 2, false, CardEffects::Builtin);

        fire(&engine, &mut state, ReactiveTrigger::AfterShift, PlayerId::SECOND);
        assert_eq!(state.side(PlayerId::FIRST).hand.len(), 1);
    }

    #[test]
    fn test_once_per_turn_guard() {
        let engine = Engine::default();
        let mut state = board();
        let effects = listener(ReactiveTrigger::AfterClearCache, ActorFilter::Any);
        state.add_to_lane(PlayerId::SECOND, 1, "Water", 1, true, effects);

        fire(&engine, &mut state, ReactiveTrigger::AfterClearCache, PlayerId::SECOND);
        fire(&engine, &mut state, ReactiveTrigger::AfterClearCache, PlayerId::SECOND);
        assert_eq!(state.side(PlayerId::SECOND).hand.len(), 1);

        state.guards.clear();
        fire(&engine, &mut state, ReactiveTrigger::AfterClearCache, PlayerId::SECOND);
        assert_eq!(state.side(PlayerId::SECOND).hand.len(), 2);
    }

    #[test]
    fn test_distinct_events_fire_again() {
        let engine = Engine::default();
        let mut state = board();
        let effects = listener(ReactiveTrigger::AfterFlip, ActorFilter::Any);
        state.add_to_lane(PlayerId::FIRST, 2, "Spirit", 1, true, effects);

        fire(&engine, &mut state, ReactiveTrigger::AfterFlip, PlayerId::FIRST);
        fire(&engine, &mut state, ReactiveTrigger::AfterFlip, PlayerId::FIRST);
        assert_eq!(state.side(PlayerId::FIRST).hand.len(), 2);
    }

    #[test]
    fn test_reentrant_dispatch_is_dropped() {
        let engine = Engine::default();
        let mut state = board();
        // Draws on every draw; without the guard this would never stop.
        let effects = listener(ReactiveTrigger::AfterDraw, ActorFilter::Any);
        state.add_to_lane(PlayerId::FIRST, 0, "Fire", 1, true, effects);

        fire(&engine, &mut state, ReactiveTrigger::AfterDraw, PlayerId::FIRST);

        assert_eq!(state.side(PlayerId::FIRST).hand.len(), 1);
        assert!(!state.continuation.reactive_active);
    }
}
