//! Effect step interpretation.
//!
//! [`Engine::execute_step`] turns one declarative [`EffectDef`] into board
//! changes. A step either applies immediately (no choice is left to make),
//! does nothing (no legal targets), or installs an
//! [`ActionRequired`](crate::stack::ActionRequired) and suspends.

use smallvec::SmallVec;
use tracing::trace;

use crate::core::{CardId, GameState, LANE_COUNT};
use crate::rules::Engine;
use crate::stack::{
    ActionRequired, CardSelection, Chained, DiscardSelection, LaneSelection, Prompt, ProtocolSwap,
    QueuedAction, SelectionPurpose,
};

use super::context::{EffectContext, EffectSource};
use super::effect::{Count, EffectDef, EffectStep, LaneRef, LaneSelector, ShiftTarget};
use super::targeting::{candidates, legal_shift_lanes, LaneRestriction, TargetFilter};

/// Result of executing one step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepResult {
    /// The step ran; this many cards were affected.
    Applied(usize),
    /// The step is waiting on a choice.
    Suspended,
}

impl Engine {
    /// Install a question.
    ///
    /// If one is already outstanding the new one queues behind it.
    pub fn suspend(&self, state: &mut GameState, action: ActionRequired) {
        if state.continuation.is_suspended() {
            state.continuation.defer([QueuedAction::Await(action)]);
            return;
        }
        state.log.append(Some(action.actor()), action.describe());
        state.continuation.action_required = Some(action);
    }

    /// Execute one effect step of `source`.
    pub fn execute_step(
        &self,
        state: &mut GameState,
        source: EffectSource,
        ctx: EffectContext,
        def: &EffectDef,
    ) -> StepResult {
        if def.optional {
            let mut effect = def.clone();
            effect.optional = false;
            let actor = ctx.side(def.actor);
            self.suspend(state, ActionRequired::Prompt(Prompt { actor, effect, source, ctx }));
            return StepResult::Suspended;
        }

        let ctx = ctx.acting_as(def.actor);
        let chained = def
            .follow_up
            .clone()
            .map(|follow_up| Chained { source, ctx, follow_up });
        trace!(card = %source.card, actor = %ctx.actor, step = def.step.verb(), "execute step");

        let affected = match &def.step {
            EffectStep::Delete { count, filter } => {
                let purpose = SelectionPurpose::Delete;
                self.select_or_apply(state, purpose, *count, filter, source, ctx, chained)
            }
            EffectStep::Return { count, filter } => {
                let purpose = SelectionPurpose::Return;
                self.select_or_apply(state, purpose, *count, filter, source, ctx, chained)
            }
            EffectStep::Flip { count, filter } => {
                let purpose = SelectionPurpose::Flip;
                self.select_or_apply(state, purpose, *count, filter, source, ctx, chained)
            }
            EffectStep::Shift { target, to, restriction } => match target {
                ShiftTarget::ThisCard => {
                    self.shift_card(state, source.card, *to, *restriction, source, ctx, chained)
                }
                ShiftTarget::Choose(filter) => self.select_or_apply(
                    state,
                    SelectionPurpose::Shift { to: *to, restriction: *restriction },
                    Count::Exactly(1),
                    filter,
                    source,
                    ctx,
                    chained,
                ),
            },
            EffectStep::SwapProtocols { whose } => {
                let side = ctx.side(*whose);
                let swap = ProtocolSwap { actor: ctx.actor, side, source, ctx, chained };
                self.suspend(state, ActionRequired::SwapProtocols(swap));
                0
            }
            EffectStep::Draw { count, whose } => {
                self.draw_step(state, ctx.side(*whose), *count as usize, chained)
            }
            EffectStep::Discard { count, whose } => {
                let player = ctx.side(*whose);
                let in_hand = state.side(player).hand.len();
                let count = *count as usize;
                if in_hand > count {
                    let selection = DiscardSelection { actor: player, count, source, ctx, chained };
                    self.suspend(state, ActionRequired::Discard(selection));
                    0
                } else {
                    let all: Vec<CardId> = state.side(player).hand.iter().map(|c| c.id).collect();
                    self.discard_step(state, player, &all, chained)
                }
            }
            EffectStep::RevealHand { whose } => self.reveal_hand(state, ctx.side(*whose), chained),
            EffectStep::PlayFromDeck { lanes, whose } => {
                let lanes = selected_lanes(*lanes, source.current_lane(state));
                self.play_from_deck(state, ctx.side(*whose), &lanes, chained)
            }
        };

        if state.continuation.is_suspended() {
            StepResult::Suspended
        } else {
            StepResult::Applied(affected)
        }
    }

    /// Resolve the candidates of a card-targeting step, then either ask or
    /// apply right away.
    #[allow(clippy::too_many_arguments)]
    fn select_or_apply(
        &self,
        state: &mut GameState,
        purpose: SelectionPurpose,
        count: Count,
        filter: &TargetFilter,
        source: EffectSource,
        ctx: EffectContext,
        chained: Option<Chained>,
    ) -> usize {
        let found = candidates(state, &self.config, filter, &source, &ctx);
        if found.is_empty() {
            trace!(card = %source.card, verb = purpose.verb(), "no legal targets");
            self.run_work(state, chained.and_then(|c| c.into_work(0)).into_iter().collect());
            return 0;
        }
        if count.needs_choice(found.len()) {
            self.suspend(
                state,
                ActionRequired::SelectCards(CardSelection {
                    actor: ctx.actor,
                    purpose,
                    filter: filter.clone(),
                    count,
                    source,
                    ctx,
                    chained,
                }),
            );
            return 0;
        }

        let limit = count.limit(found.len());
        self.apply_selection(state, &purpose, &found[..limit], source, ctx, chained)
    }

    /// Apply a card-targeting step to chosen targets.
    pub(crate) fn apply_selection(
        &self,
        state: &mut GameState,
        purpose: &SelectionPurpose,
        targets: &[CardId],
        source: EffectSource,
        ctx: EffectContext,
        chained: Option<Chained>,
    ) -> usize {
        match purpose {
            SelectionPurpose::Delete => self.delete_cards(state, targets, ctx.actor, chained),
            SelectionPurpose::Return => self.return_cards(state, targets, ctx.actor, chained),
            SelectionPurpose::Flip => self.flip_cards(state, targets, ctx.actor, chained),
            SelectionPurpose::Shift { to, restriction } => match targets.first() {
                Some(&card) => {
                    self.shift_card(state, card, *to, *restriction, source, ctx, chained)
                }
                None => 0,
            },
        }
    }

    /// Shift a known card: to a fixed lane, to the only legal lane, or ask.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn shift_card(
        &self,
        state: &mut GameState,
        card: CardId,
        to: Option<LaneRef>,
        restriction: LaneRestriction,
        source: EffectSource,
        ctx: EffectContext,
        chained: Option<Chained>,
    ) -> usize {
        let lanes = legal_shift_lanes(state, card, restriction, &source);
        let source_lane = source.current_lane(state);
        let fixed = to.map(|lane| match lane {
            LaneRef::SourceLane => source_lane,
            LaneRef::Fixed(lane) => lane,
        });

        let destination = match fixed {
            Some(lane) => lanes.contains(&lane).then_some(lane),
            None if lanes.len() == 1 => Some(lanes[0]),
            None if lanes.len() > 1 => {
                self.suspend(
                    state,
                    ActionRequired::SelectLane(LaneSelection {
                        actor: ctx.actor,
                        card,
                        restriction,
                        source,
                        ctx,
                        chained,
                    }),
                );
                return 0;
            }
            None => None,
        };

        match destination {
            Some(lane) => {
                self.begin_shift(state, card, lane, ctx.actor, chained);
                1
            }
            None => {
                trace!(%card, "no legal shift destination");
                self.run_work(state, chained.and_then(|c| c.into_work(0)).into_iter().collect());
                0
            }
        }
    }
}

/// Lanes a play-from-deck step fills, in lane order.
fn selected_lanes(selector: LaneSelector, source_lane: usize) -> SmallVec<[usize; LANE_COUNT]> {
    match selector {
        LaneSelector::SourceLane => SmallVec::from_slice(&[source_lane]),
        LaneSelector::OtherLanes => (0..LANE_COUNT).filter(|&lane| lane != source_lane).collect(),
        LaneSelector::AllLanes => (0..LANE_COUNT).collect(),
    }
}
