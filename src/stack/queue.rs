//! The continuation record and the drain loop.
//!
//! Nothing here keeps a call stack alive across a suspension. When a step
//! needs a choice it installs an [`ActionRequired`] and returns; each level
//! it returns through files what it had left to do, innermost first:
//!
//! - the effect list that suspended leaves its remaining steps in `pending`
//! - every enclosing level appends its own leftovers to `interrupted`
//!
//! When the choice is answered, that work is moved to the front of the
//! queue, ahead of anything deferred earlier, and the queue is drained
//! until it empties or the next choice is needed.

use im::Vector;
use tracing::trace;

use crate::core::GameState;
use crate::rules::Engine;

use super::action::{ActionRequired, PendingEffects, QueuedAction};

/// What the engine is doing with suspended work.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowState {
    /// Nothing outstanding; the turn player may act.
    Idle,
    /// A player must answer [`Continuation::action_required`].
    AwaitingChoice,
    /// Deferred work remains to be run.
    Draining,
}

/// Suspended and deferred work carried by the board.
#[derive(Clone, Debug, Default)]
pub struct Continuation {
    /// The outstanding question, if any.
    pub action_required: Option<ActionRequired>,
    /// Deferred work, oldest first.
    pub queue: Vector<QueuedAction>,
    /// Remaining steps of the effect list cut short by the current question.
    pub pending: Option<PendingEffects>,
    /// Work of enclosing levels cut short by the current question,
    /// innermost first.
    pub interrupted: Vector<QueuedAction>,
    /// Set while reactive listeners are being dispatched.
    pub reactive_active: bool,
}

impl Continuation {
    /// Current flow state.
    #[must_use]
    pub fn flow(&self) -> FlowState {
        if self.action_required.is_some() {
            FlowState::AwaitingChoice
        } else if self.pending.is_some() || !self.interrupted.is_empty() || !self.queue.is_empty() {
            FlowState::Draining
        } else {
            FlowState::Idle
        }
    }

    /// Whether a question is outstanding.
    #[must_use]
    pub fn is_suspended(&self) -> bool {
        self.action_required.is_some()
    }

    /// Record the leftover steps of an effect list that just suspended.
    ///
    /// Only the list that asked the question owns `pending`. Once anything
    /// has been filed, the list is an enclosing level and goes behind it.
    pub fn set_pending(&mut self, pending: PendingEffects) {
        if self.pending.is_none() && self.interrupted.is_empty() {
            self.pending = Some(pending);
        } else {
            self.interrupted.push_back(QueuedAction::Resume(pending));
        }
    }

    /// Record leftover work of an enclosing level.
    pub fn defer(&mut self, work: impl IntoIterator<Item = QueuedAction>) {
        self.interrupted.extend(work);
    }

    /// Move everything cut short by the last question to the front of the
    /// queue: pending steps, then interrupted work, then what was already
    /// queued.
    pub fn requeue_interrupted(&mut self) {
        let mut front = Vector::new();
        if let Some(pending) = self.pending.take() {
            front.push_back(QueuedAction::Resume(pending));
        }
        front.append(std::mem::take(&mut self.interrupted));
        front.append(std::mem::take(&mut self.queue));
        self.queue = front;
    }
}

impl Engine {
    /// Run a sequence of work items in order, stopping at the first
    /// suspension and deferring whatever is left.
    pub(crate) fn run_work(&self, state: &mut GameState, work: Vec<QueuedAction>) {
        let mut items = work.into_iter();
        while let Some(item) = items.next() {
            self.execute_queued(state, item);
            if state.continuation.is_suspended() {
                state.continuation.defer(items);
                return;
            }
        }
    }

    /// Run deferred work until the queue is empty or a choice is needed.
    pub(crate) fn drain(&self, state: &mut GameState) {
        loop {
            if state.continuation.is_suspended() {
                return;
            }
            if state.continuation.pending.is_some() || !state.continuation.interrupted.is_empty() {
                state.continuation.requeue_interrupted();
            }
            let Some(item) = state.continuation.queue.pop_front() else {
                return;
            };
            self.execute_queued(state, item);
        }
    }

    /// Run one work item.
    pub(crate) fn execute_queued(&self, state: &mut GameState, item: QueuedAction) {
        trace!(?item, "execute queued");
        match item {
            QueuedAction::Resume(pending) => {
                self.run_effect_list(state, pending.source, pending.ctx, pending.remaining);
            }
            QueuedAction::Fire { card, slot, trigger } => {
                self.fire_card(state, card, slot, trigger)
            }
            QueuedAction::Reactive(event) => self.process_reactive(state, event),
            QueuedAction::Place { owner, lane, card, face_up } => {
                self.place_card(state, owner, lane, card, face_up)
            }
            QueuedAction::Shift { card, to, actor, chained } => {
                self.move_card(state, card, to, actor, chained)
            }
            QueuedAction::PhaseEffects { player, phase, remaining } => {
                self.fire_phase_cards(state, player, phase, remaining)
            }
            QueuedAction::ClearCache { player } => self.clear_cache(state, player),
            QueuedAction::EndTurn { player } => self.pass_turn(state, player),
            QueuedAction::Await(action) => {
                state.log.append(Some(action.actor()), action.describe());
                state.continuation.action_required = Some(action);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CardId, PlayerId};
    use crate::effects::{EffectContext, EffectSource, EffectTrigger};
    use crate::stack::CacheClear;

    fn pending(card: u32) -> PendingEffects {
        PendingEffects {
            source: EffectSource { card: CardId(card), owner: PlayerId::FIRST, lane: 0 },
            ctx: EffectContext::new(PlayerId::FIRST, PlayerId::FIRST, EffectTrigger::OnPlay),
            remaining: Vec::new(),
        }
    }

    #[test]
    fn test_flow_states() {
        let mut cont = Continuation::default();
        assert_eq!(cont.flow(), FlowState::Idle);

        cont.queue.push_back(QueuedAction::EndTurn { player: PlayerId::FIRST });
        assert_eq!(cont.flow(), FlowState::Draining);

        let clear = CacheClear { actor: PlayerId::FIRST, count: 1 };
        cont.action_required = Some(ActionRequired::ClearCache(clear));
        assert_eq!(cont.flow(), FlowState::AwaitingChoice);
    }

    #[test]
    fn test_set_pending_keeps_innermost() {
        let mut cont = Continuation::default();
        cont.set_pending(pending(1));
        cont.set_pending(pending(2));

        assert_eq!(cont.pending.as_ref().map(|p| p.source.card), Some(CardId(1)));
        assert_eq!(cont.interrupted.len(), 1);
    }

    #[test]
    fn test_set_pending_behind_deferred_work() {
        let mut cont = Continuation::default();
        // The suspending list had nothing left; its enclosing level filed
        // work first.
        cont.defer([QueuedAction::ClearCache { player: PlayerId::SECOND }]);
        cont.set_pending(pending(4));

        assert!(cont.pending.is_none());
        cont.requeue_interrupted();
        let order: Vec<_> = cont.queue.iter().cloned().collect();
        assert_eq!(
            order,
            vec![
                QueuedAction::ClearCache { player: PlayerId::SECOND },
                QueuedAction::Resume(pending(4)),
            ]
        );
    }

    #[test]
    fn test_requeue_order() {
        let mut cont = Continuation::default();
        cont.queue.push_back(QueuedAction::EndTurn { player: PlayerId::SECOND });
        cont.set_pending(pending(1));
        cont.defer([QueuedAction::ClearCache { player: PlayerId::FIRST }]);

        cont.requeue_interrupted();

        assert!(cont.pending.is_none());
        assert!(cont.interrupted.is_empty());
        let order: Vec<_> = cont.queue.iter().cloned().collect();
        assert_eq!(
            order,
            vec![
                QueuedAction::Resume(pending(1)),
                QueuedAction::ClearCache { player: PlayerId::FIRST },
                QueuedAction::EndTurn { player: PlayerId::SECOND },
            ]
        );
    }
}
