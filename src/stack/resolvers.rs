//! Answering the outstanding question.
//!
//! [`Engine::resolve`] validates a [`Choice`] against the current
//! [`ActionRequired`], applies it, runs the chained follow-up and then
//! drains deferred work. An invalid answer is rejected and the input board
//! is left as it was.

use rustc_hash::FxHashSet;
use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::core::{is_valid_lane, CardId, Choice, GameState, LANE_COUNT};
use crate::effects::{candidates, legal_shift_lanes, Count};
use crate::rules::{Engine, IllegalMove};
use crate::triggers::{GameEvent, ReactiveTrigger};

use super::action::{
    ActionRequired, CacheClear, CardSelection, DiscardSelection, LaneSelection, Prompt,
    ProtocolSwap, QueuedAction,
};

/// Check that picked cards are distinct.
fn check_unique(ids: &[CardId]) -> Result<(), IllegalMove> {
    let mut seen = FxHashSet::default();
    for &id in ids {
        if !seen.insert(id) {
            return Err(IllegalMove::DuplicateCard(id));
        }
    }
    Ok(())
}

/// Every subset of `items` of size `k`, in lexicographic order.
fn combinations(items: &[CardId], k: usize) -> Vec<SmallVec<[CardId; 4]>> {
    if k == 0 {
        return vec![SmallVec::new()];
    }
    if items.len() < k {
        return Vec::new();
    }
    let mut out = Vec::new();
    for (i, &first) in items.iter().enumerate() {
        for mut rest in combinations(&items[i + 1..], k - 1) {
            rest.insert(0, first);
            out.push(rest);
        }
    }
    out
}

impl Engine {
    /// Answer the outstanding question.
    pub fn resolve(&self, state: &GameState, choice: Choice) -> Result<GameState, IllegalMove> {
        let Some(action) = state.continuation.action_required.clone() else {
            return self.reject(state, IllegalMove::NoActionRequired);
        };
        debug!(actor = %action.actor(), %choice, "resolve");

        let mut next = state.clone();
        next.continuation.action_required = None;
        next.continuation.requeue_interrupted();

        let applied = match (action, choice) {
            (ActionRequired::SelectCards(selection), Choice::Cards(ids)) => {
                self.resolve_cards(&mut next, selection, &ids)
            }
            (ActionRequired::SelectLane(selection), Choice::Lane(lane)) => {
                self.resolve_lane(&mut next, selection, lane)
            }
            (ActionRequired::Discard(selection), Choice::Cards(ids)) => {
                self.resolve_discard(&mut next, selection, &ids)
            }
            (ActionRequired::SwapProtocols(swap), Choice::SwapProtocols(a, b)) => {
                self.resolve_swap(&mut next, swap, a, b)
            }
            (ActionRequired::Prompt(prompt), Choice::Accept(accept)) => {
                self.resolve_prompt(&mut next, prompt, accept);
                Ok(())
            }
            (ActionRequired::ClearCache(clear), Choice::Cards(ids)) => {
                self.resolve_cache(&mut next, clear, &ids)
            }
            (action, _) => Err(IllegalMove::ChoiceMismatch { expected: expected_shape(&action) }),
        };
        if let Err(err) = applied {
            return self.reject(state, err);
        }

        self.drain(&mut next);
        Ok(next)
    }

    fn resolve_cards(
        &self,
        state: &mut GameState,
        selection: CardSelection,
        ids: &[CardId],
    ) -> Result<(), IllegalMove> {
        check_unique(ids)?;
        let found = candidates(
            state,
            &self.config,
            &selection.filter,
            &selection.source,
            &selection.ctx,
        );
        if let Some(&bad) = ids.iter().find(|id| !found.contains(id)) {
            return Err(IllegalMove::InvalidTarget(bad));
        }
        if !selection.count.accepts(ids.len(), found.len()) {
            return Err(IllegalMove::WrongCount {
                expected: format!("{:?} of {}", selection.count, found.len()),
                got: ids.len(),
            });
        }

        self.apply_selection(
            state,
            &selection.purpose,
            ids,
            selection.source,
            selection.ctx,
            selection.chained,
        );
        Ok(())
    }

    fn resolve_lane(
        &self,
        state: &mut GameState,
        selection: LaneSelection,
        lane: usize,
    ) -> Result<(), IllegalMove> {
        if !is_valid_lane(lane) {
            return Err(IllegalMove::InvalidLane(lane));
        }
        let legal =
            legal_shift_lanes(state, selection.card, selection.restriction, &selection.source);
        if !legal.contains(&lane) {
            return Err(IllegalMove::LaneRestricted(lane));
        }
        self.begin_shift(state, selection.card, lane, selection.actor, selection.chained);
        Ok(())
    }

    fn resolve_discard(
        &self,
        state: &mut GameState,
        selection: DiscardSelection,
        ids: &[CardId],
    ) -> Result<(), IllegalMove> {
        check_unique(ids)?;
        let hand = &state.side(selection.actor).hand;
        if let Some(&bad) = ids.iter().find(|id| !hand.iter().any(|c| c.id == **id)) {
            return Err(IllegalMove::InvalidTarget(bad));
        }
        let expected = selection.count.min(hand.len());
        if ids.len() != expected {
            return Err(IllegalMove::WrongCount {
                expected: expected.to_string(),
                got: ids.len(),
            });
        }
        self.discard_step(state, selection.actor, ids, selection.chained);
        Ok(())
    }

    fn resolve_swap(
        &self,
        state: &mut GameState,
        swap: ProtocolSwap,
        a: usize,
        b: usize,
    ) -> Result<(), IllegalMove> {
        for lane in [a, b] {
            if !is_valid_lane(lane) {
                return Err(IllegalMove::InvalidLane(lane));
            }
        }
        if a == b {
            return Err(IllegalMove::LaneRestricted(b));
        }
        self.swap_protocols(state, swap.side, a, b, swap.chained);
        Ok(())
    }

    fn resolve_prompt(&self, state: &mut GameState, prompt: Prompt, accept: bool) {
        if accept {
            if !prompt.source.is_on_board(state) {
                let card = prompt.source.card;
                trace!(%card, "accepted effect skipped: source left the board");
                return;
            }
            self.execute_step(state, prompt.source, prompt.ctx, &prompt.effect);
        } else {
            let text = format!("{} declines to {}", prompt.actor, prompt.effect.step.verb());
            state.log.append(Some(prompt.actor), text);
        }
    }

    fn resolve_cache(
        &self,
        state: &mut GameState,
        clear: CacheClear,
        ids: &[CardId],
    ) -> Result<(), IllegalMove> {
        check_unique(ids)?;
        let hand = &state.side(clear.actor).hand;
        if let Some(&bad) = ids.iter().find(|id| !hand.iter().any(|c| c.id == **id)) {
            return Err(IllegalMove::InvalidTarget(bad));
        }
        if ids.len() != clear.count {
            return Err(IllegalMove::WrongCount {
                expected: clear.count.to_string(),
                got: ids.len(),
            });
        }
        self.discard_from_hand(state, clear.actor, ids);
        self.run_work(
            state,
            vec![QueuedAction::Reactive(
                GameEvent::new(ReactiveTrigger::AfterClearCache, clear.actor).with_count(ids.len()),
            )],
        );
        Ok(())
    }

    /// Every valid answer to the outstanding question.
    ///
    /// Card selections list each legal subset; lane and swap questions list
    /// each legal pair. Empty when nothing is being asked.
    #[must_use]
    pub fn legal_choices(&self, state: &GameState) -> Vec<Choice> {
        let Some(action) = &state.continuation.action_required else {
            return Vec::new();
        };
        match action {
            ActionRequired::SelectCards(selection) => {
                let found = candidates(
                    state,
                    &self.config,
                    &selection.filter,
                    &selection.source,
                    &selection.ctx,
                );
                let sizes = match selection.count {
                    Count::Exactly(_) | Count::All => {
                        let n = selection.count.limit(found.len());
                        n..=n
                    }
                    Count::UpTo(_) => 1usize.min(found.len())..=selection.count.limit(found.len()),
                };
                sizes
                    .flat_map(|k| combinations(&found, k))
                    .map(Choice::Cards)
                    .collect()
            }
            ActionRequired::SelectLane(selection) => {
                legal_shift_lanes(state, selection.card, selection.restriction, &selection.source)
                    .into_iter()
                    .map(Choice::Lane)
                    .collect()
            }
            ActionRequired::Discard(selection) => {
                let hand: Vec<CardId> =
                    state.side(selection.actor).hand.iter().map(|c| c.id).collect();
                combinations(&hand, selection.count.min(hand.len()))
                    .into_iter()
                    .map(Choice::Cards)
                    .collect()
            }
            ActionRequired::ClearCache(clear) => {
                let hand: Vec<CardId> = state.side(clear.actor).hand.iter().map(|c| c.id).collect();
                combinations(&hand, clear.count).into_iter().map(Choice::Cards).collect()
            }
            ActionRequired::SwapProtocols(_) => (0..LANE_COUNT)
                .flat_map(|a| (a + 1..LANE_COUNT).map(move |b| Choice::SwapProtocols(a, b)))
                .collect(),
            ActionRequired::Prompt(_) => vec![Choice::Accept(true), Choice::Accept(false)],
        }
    }
}

fn expected_shape(action: &ActionRequired) -> &'static str {
    match action {
        ActionRequired::SelectCards(_)
        | ActionRequired::Discard(_)
        | ActionRequired::ClearCache(_) => "a card choice",
        ActionRequired::SelectLane(_) => "a lane",
        ActionRequired::SwapProtocols(_) => "two lanes to swap",
        ActionRequired::Prompt(_) => "accept or decline",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combinations() {
        let ids = [CardId(1), CardId(2), CardId(3)];
        let pairs = combinations(&ids, 2);
        assert_eq!(pairs.len(), 3);
        assert_eq!(pairs[0].as_slice(), &[CardId(1), CardId(2)]);
        assert_eq!(pairs[2].as_slice(), &[CardId(2), CardId(3)]);
        assert_eq!(combinations(&ids, 0).len(), 1);
        assert!(combinations(&ids, 4).is_empty());
    }

    #[test]
    fn test_check_unique() {
        assert!(check_unique(&[CardId(1), CardId(2)]).is_ok());
        assert_eq!(
            check_unique(&[CardId(1), CardId(1)]),
            Err(IllegalMove::DuplicateCard(CardId(1)))
        );
    }
}
