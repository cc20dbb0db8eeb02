//! Turn structure: start, action, end.
//!
//! A turn runs Start effects, then waits in the action phase for one of
//! [`Engine::play_card`], [`Engine::refresh`] or [`Engine::compile_lane`],
//! then [`Engine::end_turn`] runs End effects, clears the cache and passes
//! play. Every per-turn guard is cleared when a turn starts and at no other
//! point.

use smallvec::SmallVec;
use tracing::{debug, info};

use crate::core::{is_valid_lane, Animation, GameState, Phase, PlayerId, LANE_COUNT};
use crate::stack::{ActionRequired, CacheClear, QueuedAction};
use crate::triggers::{GameEvent, ReactiveTrigger};

use super::engine::Engine;
use super::error::IllegalMove;

impl Engine {
    /// Begin `player`'s turn: clear the per-turn guards and resolve Start
    /// effects. The turn reaches the action phase once they are done.
    pub fn start_turn(
        &self,
        state: &GameState,
        player: PlayerId,
    ) -> Result<GameState, IllegalMove> {
        self.check_turn_action(state, player)?;
        if state.phase != Phase::Start {
            return self.reject(state, IllegalMove::WrongPhase);
        }

        let mut next = state.clone();
        next.guards.clear();
        debug!(%player, turn = next.turn_number, "start turn");
        next.log.append(Some(player), format!("Turn {}: {}", next.turn_number, player));
        self.run_phase_effects(&mut next, player, Phase::Start);
        self.drain(&mut next);
        Ok(next)
    }

    /// Finish the action phase: resolve End effects, clear the cache and
    /// pass the turn.
    pub fn end_turn(&self, state: &GameState, player: PlayerId) -> Result<GameState, IllegalMove> {
        self.check_turn_action(state, player)?;
        if state.phase != Phase::Action {
            return self.reject(state, IllegalMove::WrongPhase);
        }

        let mut next = state.clone();
        next.phase = Phase::End;
        debug!(%player, "end turn");
        self.run_phase_effects(&mut next, player, Phase::End);
        self.drain(&mut next);
        Ok(next)
    }

    /// Draw up to the starting hand size.
    pub fn refresh(&self, state: &GameState, player: PlayerId) -> Result<GameState, IllegalMove> {
        self.check_turn_action(state, player)?;
        if state.phase != Phase::Action {
            return self.reject(state, IllegalMove::WrongPhase);
        }

        let mut next = state.clone();
        let missing = self.config.starting_hand_size.saturating_sub(next.side(player).hand.len());
        next.log.append(Some(player), format!("{} refreshes", player));
        self.draw_step(&mut next, player, missing, None);
        self.drain(&mut next);
        Ok(next)
    }

    /// Lanes `player` could compile right now.
    #[must_use]
    pub fn compilable_lanes(
        &self,
        state: &GameState,
        player: PlayerId,
    ) -> SmallVec<[usize; LANE_COUNT]> {
        let side = state.side(player);
        (0..LANE_COUNT).filter(|&lane| side.compilable[lane]).collect()
    }

    /// Compile a lane: every card in it, on both sides, goes to its owner's
    /// discard pile and the protocol is marked compiled.
    pub fn compile_lane(
        &self,
        state: &GameState,
        player: PlayerId,
        lane: usize,
    ) -> Result<GameState, IllegalMove> {
        self.check_turn_action(state, player)?;
        if state.phase != Phase::Action {
            return self.reject(state, IllegalMove::WrongPhase);
        }
        if !is_valid_lane(lane) {
            return self.reject(state, IllegalMove::InvalidLane(lane));
        }
        if !state.side(player).compilable[lane] {
            return self.reject(state, IllegalMove::NotCompilable(lane));
        }

        let mut next = state.clone();
        let protocol = next.side(player).protocols[lane].clone();
        next.log.append(Some(player), format!("{} compiles {}", player, protocol));
        next.log.indent();
        for owner in player.starting_with() {
            let cards = std::mem::take(&mut next.side_mut(owner).lanes[lane]);
            for mut card in cards {
                card.reset_for_zone_change();
                next.push_animation(Animation::Delete { card: card.id, owner });
                next.side_mut(owner).discard.push_back(card);
            }
        }
        next.log.outdent();

        let side = next.side_mut(player);
        side.compiled[lane] = true;
        side.stats.compiles += 1;
        self.recalculate_in_place(&mut next);
        info!(%player, lane, %protocol, "compiled");
        if let Some(winner) = next.winner() {
            info!(%winner, turn = next.turn_number, "game over");
            next.log.append(Some(winner), format!("{} has compiled every protocol", winner));
        }

        self.run_work(
            &mut next,
            vec![QueuedAction::Reactive(
                GameEvent::new(ReactiveTrigger::AfterCompile, player).with_lane(lane),
            )],
        );
        self.drain(&mut next);
        Ok(next)
    }

    /// Called once a phase's effects have all resolved.
    pub(crate) fn finish_phase(&self, state: &mut GameState, player: PlayerId, phase: Phase) {
        match phase {
            Phase::Start => {
                state.phase = Phase::Action;
                debug!(%player, "action phase");
            }
            Phase::End => self.run_work(
                state,
                vec![QueuedAction::ClearCache { player }, QueuedAction::EndTurn { player }],
            ),
            Phase::Action => {}
        }
    }

    /// Ask `player` to discard down to the hand limit.
    pub(crate) fn clear_cache(&self, state: &mut GameState, player: PlayerId) {
        let excess = state.side(player).hand.len().saturating_sub(self.config.hand_limit);
        if excess == 0 {
            return;
        }
        let clear = CacheClear { actor: player, count: excess };
        self.suspend(state, ActionRequired::ClearCache(clear));
    }

    /// Hand the turn to the other player.
    pub(crate) fn pass_turn(&self, state: &mut GameState, player: PlayerId) {
        state.turn = player.opponent();
        state.turn_number += 1;
        state.phase = Phase::Start;
        debug!(next = %state.turn, turn = state.turn_number, "pass turn");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::CardEffects;
    use crate::core::{Choice, PlayerMap, Side};
    use crate::effects::{EffectBundle, EffectDef, EffectStep, EffectTrigger, Whose};
    use crate::stack::FlowState;

    fn board() -> GameState {
        let sides = PlayerMap::new(|_| Side::new(["Fire", "Water", "Spirit"]));
        GameState::new(sides, PlayerId::FIRST, 5)
    }

    fn drawer(trigger: EffectTrigger) -> CardEffects {
        CardEffects::custom(EffectBundle {
            top: vec![EffectDef::new(trigger, EffectStep::Draw { count: 1, whose: Whose::Own })],
            ..EffectBundle::default()
        })
    }

    #[test]
    fn test_start_turn_fires_start_effects_once() {
        let engine = Engine::default();
        let mut state = board();
        state.phase = Phase::Start;
        for _ in 0..3 {
            state.add_to_deck(PlayerId::FIRST, "Fire", 1, CardEffects::Builtin);
        }
        state.add_to_lane(PlayerId::FIRST, 0, "Fire", 1, true, drawer(EffectTrigger::Start));
        state.add_to_lane(PlayerId::FIRST, 0, "Fire", 2, true, CardEffects::Builtin);

        let next = engine.start_turn(&state, PlayerId::FIRST).unwrap();

        assert_eq!(next.phase, Phase::Action);
        assert_eq!(next.side(PlayerId::FIRST).hand.len(), 1);
        assert_eq!(engine.start_turn(&next, PlayerId::FIRST).unwrap_err(), IllegalMove::WrongPhase);
    }

    #[test]
    fn test_end_turn_passes_play() {
        let engine = Engine::default();
        let state = board();

        let next = engine.end_turn(&state, PlayerId::FIRST).unwrap();

        assert_eq!(next.turn, PlayerId::SECOND);
        assert_eq!(next.turn_number, 2);
        assert_eq!(next.phase, Phase::Start);
        assert_eq!(next.flow(), FlowState::Idle);
    }

    #[test]
    fn test_clear_cache_suspends_until_discarded() {
        let engine = Engine::default();
        let mut state = board();
        let hand: Vec<_> = (0..7)
            .map(|v| state.add_to_hand(PlayerId::FIRST, "Fire", v, CardEffects::Builtin))
            .collect();

        let waiting = engine.end_turn(&state, PlayerId::FIRST).unwrap();
        assert_eq!(waiting.turn, PlayerId::FIRST);
        assert!(matches!(
            waiting.continuation.action_required,
            Some(ActionRequired::ClearCache(CacheClear { count: 2, .. }))
        ));

        assert!(engine.resolve(&waiting, Choice::cards(&hand[..1])).is_err());
        let done = engine.resolve(&waiting, Choice::cards(&hand[..2])).unwrap();
        assert_eq!(done.side(PlayerId::FIRST).hand.len(), 5);
        assert_eq!(done.side(PlayerId::FIRST).discard.len(), 2);
        assert_eq!(done.turn, PlayerId::SECOND);
    }

    #[test]
    fn test_refresh_draws_to_starting_size() {
        let engine = Engine::default();
        let mut state = board();
        for _ in 0..8 {
            state.add_to_deck(PlayerId::FIRST, "Water", 2, CardEffects::Builtin);
        }
        state.add_to_hand(PlayerId::FIRST, "Fire", 1, CardEffects::Builtin);

        let next = engine.refresh(&state, PlayerId::FIRST).unwrap();

        assert_eq!(next.side(PlayerId::FIRST).hand.len(), 5);
        assert_eq!(next.side(PlayerId::FIRST).deck.len(), 4);
    }

    #[test]
    fn test_compile_clears_lane_on_both_sides() {
        let engine = Engine::default();
        let mut state = board();
        for value in [5, 6] {
            state.add_to_lane(PlayerId::FIRST, 1, "Water", value, true, CardEffects::Builtin);
        }
        state.add_to_lane(PlayerId::SECOND, 1, "Water", 3, true, CardEffects::Builtin);
        let state = engine.recalculate(&state);
        assert_eq!(engine.compilable_lanes(&state, PlayerId::FIRST).as_slice(), &[1]);

        let next = engine.compile_lane(&state, PlayerId::FIRST, 1).unwrap();

        let mine = next.side(PlayerId::FIRST);
        assert!(mine.compiled[1]);
        assert!(mine.lanes[1].is_empty());
        assert_eq!(mine.discard.len(), 2);
        assert_eq!(mine.stats.compiles, 1);
        assert!(next.side(PlayerId::SECOND).lanes[1].is_empty());
        assert_eq!(next.side(PlayerId::SECOND).discard.len(), 1);

        assert_eq!(
            engine.compile_lane(&state, PlayerId::FIRST, 0).unwrap_err(),
            IllegalMove::NotCompilable(0)
        );
    }
}
