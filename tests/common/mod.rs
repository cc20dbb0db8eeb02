//! Shared board builders for integration tests.

#![allow(dead_code)]

use compile_rules::core::{CardId, GameState, PlayerId, PlayerMap, Side};
use compile_rules::effects::{EffectBundle, EffectDef, EffectStep, EffectTrigger, Whose};
use compile_rules::cards::CardEffects;
use compile_rules::triggers::{ActorFilter, ReactiveTrigger};

/// Route engine traces to the test harness. Filter with `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Fire / Water / Spirit against Death / Light / Speed, both decks stocked.
pub fn board(seed: u64) -> GameState {
    init_tracing();
    let sides = PlayerMap::new(|p| {
        if p == PlayerId::FIRST {
            Side::new(["Fire", "Water", "Spirit"])
        } else {
            Side::new(["Death", "Light", "Speed"])
        }
    });
    let mut state = GameState::new(sides, PlayerId::FIRST, seed);
    for player in PlayerId::all() {
        for value in 0..10 {
            state.add_to_deck(player, "Filler", value % 6, CardEffects::Builtin);
        }
    }
    state
}

pub fn draw(trigger: EffectTrigger, count: u8) -> EffectDef {
    EffectDef::new(trigger, EffectStep::Draw { count, whose: Whose::Own })
}

pub fn middle(effects: Vec<EffectDef>) -> CardEffects {
    CardEffects::custom(EffectBundle { middle: effects, ..EffectBundle::default() })
}

pub fn top(effects: Vec<EffectDef>) -> CardEffects {
    CardEffects::custom(EffectBundle { top: effects, ..EffectBundle::default() })
}

pub fn bottom(effects: Vec<EffectDef>) -> CardEffects {
    CardEffects::custom(EffectBundle { bottom: effects, ..EffectBundle::default() })
}

/// A top-box listener that draws one card for its owner.
pub fn draw_on(on: ReactiveTrigger, actor: ActorFilter) -> CardEffects {
    top(vec![draw(EffectTrigger::reactive(on, actor), 1)])
}

/// Position of the first log line containing `needle`.
pub fn log_position(state: &GameState, needle: &str) -> Option<usize> {
    state.log.lines().iter().position(|line| line.text.contains(needle))
}

/// Positions of every log line containing `needle`, oldest first.
pub fn log_positions(state: &GameState, needle: &str) -> Vec<usize> {
    state
        .log
        .lines()
        .iter()
        .enumerate()
        .filter(|(_, line)| line.text.contains(needle))
        .map(|(i, _)| i)
        .collect()
}

pub fn hand_ids(state: &GameState, player: PlayerId) -> Vec<CardId> {
    state.side(player).hand.iter().map(|c| c.id).collect()
}
