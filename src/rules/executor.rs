//! Firing card text.
//!
//! Every box trigger funnels through [`Engine::fire_card`]: locate the
//! card, check that the box is live in the card's current state, then run
//! either its declarative effect list or its builtin handler.

use tracing::trace;

use crate::cards::CardEffects;
use crate::core::{CardId, CardLocation, GameState, Phase, PlayerId};
use crate::effects::{BoxSlot, EffectContext, EffectDef, EffectSource, EffectTrigger};
use crate::stack::{PendingEffects, QueuedAction};

use super::engine::Engine;

impl Engine {
    /// Whether a card has anything to run for this box and trigger.
    pub(crate) fn has_effects(
        &self,
        state: &GameState,
        location: CardLocation,
        slot: BoxSlot,
        trigger: EffectTrigger,
    ) -> bool {
        let Some(card) = state.card_at(location) else {
            return false;
        };
        match &card.effects {
            CardEffects::Custom(bundle) => {
                bundle.matching(slot, |t| *t == trigger).next().is_some()
            }
            CardEffects::Builtin => {
                self.builtins.contains(&card.protocol, card.value, slot, trigger)
            }
        }
    }

    /// Fire one box of a board card if that box is live right now.
    ///
    /// Stale references (the card left the board, was covered or flipped
    /// since the work was queued) are silently skipped.
    pub(crate) fn fire_card(
        &self,
        state: &mut GameState,
        card: CardId,
        slot: BoxSlot,
        trigger: EffectTrigger,
    ) {
        let Some(location) = state.locate(card) else {
            trace!(%card, ?slot, "fire skipped: card left the board");
            return;
        };
        let live = state
            .card_at(location)
            .is_some_and(|c| slot.is_live(c.face_up, state.is_uncovered(location)));
        if !live {
            trace!(%card, ?slot, "fire skipped: box not live");
            return;
        }
        self.fire_box(state, location, slot, trigger);
    }

    fn fire_box(
        &self,
        state: &mut GameState,
        location: CardLocation,
        slot: BoxSlot,
        trigger: EffectTrigger,
    ) {
        let Some(card) = state.card_at(location).cloned() else {
            return;
        };
        let source = EffectSource {
            card: card.id,
            owner: location.owner,
            lane: location.lane,
        };
        let ctx = EffectContext::new(location.owner, state.turn, trigger);

        match &card.effects {
            CardEffects::Custom(bundle) => {
                let effects = bundle.with_trigger(slot, trigger);
                if effects.is_empty() {
                    return;
                }
                state
                    .log
                    .append(Some(location.owner), format!("{} ({})", card.name(), trigger.name()));
                state.log.indent();
                self.run_effect_list(state, source, ctx, effects);
                state.log.outdent();
            }
            CardEffects::Builtin => {
                let handler = self.builtins.get(&card.protocol, card.value, slot, trigger);
                let Some(handler) = handler.cloned() else {
                    let name = trigger.name();
                    trace!(card = %card.name(), ?slot, trigger = name, "no builtin effect");
                    return;
                };
                state
                    .log
                    .append(Some(location.owner), format!("{} ({})", card.name(), trigger.name()));
                state.log.indent();
                handler(self, state, source, ctx);
                state.log.outdent();
            }
        }
    }

    /// Run an effect list step by step.
    ///
    /// Stops at the first step that needs a choice and files the remaining
    /// steps on the board's continuation record. Steps whose source card
    /// has left the board are skipped.
    pub fn run_effect_list(
        &self,
        state: &mut GameState,
        source: EffectSource,
        ctx: EffectContext,
        effects: Vec<EffectDef>,
    ) {
        for (i, def) in effects.iter().enumerate() {
            if state.continuation.is_suspended() {
                state.continuation.set_pending(PendingEffects {
                    source,
                    ctx,
                    remaining: effects[i..].to_vec(),
                });
                return;
            }
            if !source.is_on_board(state) {
                trace!(card = %source.card, "effect skipped: source left the board");
                return;
            }
            self.execute_step(state, source, ctx, def);
            if state.continuation.is_suspended() {
                let remaining = effects[i + 1..].to_vec();
                if !remaining.is_empty() {
                    state.continuation.set_pending(PendingEffects { source, ctx, remaining });
                }
                return;
            }
        }
    }

    /// Fire start or end text for every eligible card of `player`, then
    /// move on to the next part of the turn.
    ///
    /// Eligible cards are collected once, on entry. A card that only
    /// becomes eligible while the phase runs waits for the next turn.
    pub(crate) fn run_phase_effects(&self, state: &mut GameState, player: PlayerId, phase: Phase) {
        let Some(trigger) = phase_trigger(phase) else {
            return;
        };
        let cards: Vec<CardId> = state
            .board_scan(player)
            .filter(|(loc, card)| loc.owner == player && card.face_up)
            .filter(|(loc, _)| !self.phase_slots(state, *loc, trigger).is_empty())
            .map(|(_, card)| card.id)
            .collect();
        trace!(%player, ?phase, eligible = cards.len(), "phase effects");
        self.fire_phase_cards(state, player, phase, cards);
    }

    /// Fire the collected phase cards in order, re-checking each one.
    ///
    /// On suspension the unvisited cards are queued to resume the phase.
    pub(crate) fn fire_phase_cards(
        &self,
        state: &mut GameState,
        player: PlayerId,
        phase: Phase,
        cards: Vec<CardId>,
    ) {
        let Some(trigger) = phase_trigger(phase) else {
            return;
        };

        for (i, &card) in cards.iter().enumerate() {
            if state.guards.phase_processed.contains(&(card, phase)) {
                continue;
            }
            let face_up = |loc| state.card_at(loc).is_some_and(|c| c.face_up);
            let slots = match state.locate(card) {
                Some(loc) if loc.owner == player && face_up(loc) => {
                    self.phase_slots(state, loc, trigger)
                }
                _ => Vec::new(),
            };
            if slots.is_empty() {
                trace!(%card, ?phase, "phase effect skipped: no longer eligible");
                continue;
            }

            state.guards.phase_processed.insert((card, phase));
            let work = slots
                .into_iter()
                .map(|slot| QueuedAction::Fire { card, slot, trigger })
                .collect();
            self.run_work(state, work);
            if state.continuation.is_suspended() {
                state.continuation.defer([QueuedAction::PhaseEffects {
                    player,
                    phase,
                    remaining: cards[i + 1..].to_vec(),
                }]);
                return;
            }
        }

        self.finish_phase(state, player, phase);
    }

    /// Live boxes of a face-up card that carry text for a phase trigger.
    fn phase_slots(
        &self,
        state: &GameState,
        location: CardLocation,
        trigger: EffectTrigger,
    ) -> Vec<BoxSlot> {
        let uncovered = state.is_uncovered(location);
        [BoxSlot::Top, BoxSlot::Bottom]
            .into_iter()
            .filter(|slot| slot.is_live(true, uncovered))
            .filter(|slot| self.has_effects(state, location, *slot, trigger))
            .collect()
    }
}

fn phase_trigger(phase: Phase) -> Option<EffectTrigger> {
    match phase {
        Phase::Start => Some(EffectTrigger::Start),
        Phase::End => Some(EffectTrigger::End),
        Phase::Action => None,
    }
}
