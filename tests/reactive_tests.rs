//! Reactive trigger tests.
//!
//! These tests verify listener matching through full engine operations:
//! - Actor filters (`self`, `opponent`, `any`)
//! - Lane-local listeners
//! - Once-per-turn kinds and the start-of-turn guard reset
//! - Data-driven protocols loaded from JSON

mod common;

use compile_rules::cards::ProtocolDefinition;
use compile_rules::core::{Choice, Phase, PlayerId};
use compile_rules::effects::{BoxSlot, EffectTrigger};
use compile_rules::stack::{ActionRequired, FlowState};
use compile_rules::triggers::{ActorFilter, ReactiveTrigger};
use compile_rules::{CardEffects, Engine};

use common::{board, draw, draw_on, hand_ids, top};

#[test]
fn test_actor_filters_on_refresh() {
    let engine = Engine::default();
    let mut state = board(11);
    let effects = draw_on(ReactiveTrigger::AfterDraw, ActorFilter::SelfSide);
    state.add_to_lane(PlayerId::FIRST, 0, "Fire", 1, true, effects);
    let effects = draw_on(ReactiveTrigger::AfterDraw, ActorFilter::SelfSide);
    state.add_to_lane(PlayerId::SECOND, 0, "Death", 1, true, effects);
    let effects = draw_on(ReactiveTrigger::AfterDraw, ActorFilter::Opponent);
    state.add_to_lane(PlayerId::SECOND, 1, "Light", 1, true, effects);

    let next = engine.refresh(&state, PlayerId::FIRST).unwrap();

    // Five from the refresh plus one from the own-side listener.
    assert_eq!(next.side(PlayerId::FIRST).hand.len(), 6);
    // Only the opponent listener fired on the other side.
    assert_eq!(next.side(PlayerId::SECOND).hand.len(), 1);
}

#[test]
fn test_lane_local_listener() {
    let engine = Engine::default();
    let mut state = board(12);
    let local = EffectTrigger::Reactive {
        on: ReactiveTrigger::AfterPlay,
        actor: ActorFilter::Any,
        lane_local: true,
    };
    state.add_to_lane(PlayerId::SECOND, 2, "Speed", 3, true, top(vec![draw(local, 1)]));
    let far = state.add_to_hand(PlayerId::FIRST, "Fire", 1, CardEffects::Builtin);
    let near = state.add_to_hand(PlayerId::FIRST, "Spirit", 1, CardEffects::Builtin);

    let next = engine.play_card(&state, PlayerId::FIRST, far, 0, false).unwrap();
    assert!(next.side(PlayerId::SECOND).hand.is_empty());

    let next = engine.play_card(&next, PlayerId::FIRST, near, 2, false).unwrap();
    assert_eq!(next.side(PlayerId::SECOND).hand.len(), 1);
}

#[test]
fn test_clear_cache_listener_once_per_turn() {
    let engine = Engine::default();
    let mut state = board(13);
    state.add_to_lane(
        PlayerId::FIRST,
        1,
        "Water",
        2,
        true,
        draw_on(ReactiveTrigger::AfterClearCache, ActorFilter::SelfSide),
    );
    for value in 0..6 {
        state.add_to_hand(PlayerId::FIRST, "Water", value, CardEffects::Builtin);
    }

    let waiting = engine.end_turn(&state, PlayerId::FIRST).unwrap();
    let pick = hand_ids(&waiting, PlayerId::FIRST)[0];
    let next = engine.resolve(&waiting, Choice::card(pick)).unwrap();

    // Discarded one, then the listener drew one back.
    assert_eq!(next.side(PlayerId::FIRST).hand.len(), 6);
    assert_eq!(next.turn, PlayerId::SECOND);
    assert_eq!(next.flow(), FlowState::Idle);
}

#[test]
fn test_compile_raises_after_compile() {
    let engine = Engine::default();
    let mut state = board(14);
    let effects = draw_on(ReactiveTrigger::AfterCompile, ActorFilter::Opponent);
    state.add_to_lane(PlayerId::SECOND, 2, "Speed", 1, true, effects);
    for value in [4, 5] {
        state.add_to_lane(PlayerId::FIRST, 0, "Fire", value, true, CardEffects::Builtin);
    }
    state.add_to_lane(PlayerId::FIRST, 0, "Fire", 1, false, CardEffects::Builtin);
    let state = engine.recalculate(&state);
    assert_eq!(state.side(PlayerId::FIRST).lane_values[0], 11);

    let next = engine.compile_lane(&state, PlayerId::FIRST, 0).unwrap();

    assert!(next.side(PlayerId::FIRST).compiled[0]);
    assert_eq!(next.side(PlayerId::FIRST).lane_values[0], 0);
    assert_eq!(next.side(PlayerId::SECOND).hand.len(), 1);
    assert!(next.winner().is_none());
}

#[test]
fn test_guards_reset_each_turn() {
    let engine = Engine::default();
    let mut state = board(15);
    let effects = draw_on(ReactiveTrigger::AfterClearCache, ActorFilter::Any);
    state.add_to_lane(PlayerId::FIRST, 0, "Fire", 0, true, effects);
    for value in 0..6 {
        state.add_to_hand(PlayerId::FIRST, "Fire", value, CardEffects::Builtin);
    }

    let waiting = engine.end_turn(&state, PlayerId::FIRST).unwrap();
    let pick = hand_ids(&waiting, PlayerId::FIRST)[0];
    let next = engine.resolve(&waiting, Choice::card(pick)).unwrap();
    assert!(!next.guards.reactive_fired.is_empty());

    let next = engine.start_turn(&next, PlayerId::SECOND).unwrap();
    assert!(next.guards.reactive_fired.is_empty());
    assert_eq!(next.phase, Phase::Action);
}

#[test]
fn test_protocol_from_json() {
    let json = r#"{
        "name": "Echo",
        "cards": [
            {
                "value": 1,
                "top": [
                    {
                        "trigger": { "reactive": { "on": "after_delete", "actor": "opponent" } },
                        "step": { "kind": "draw", "count": 1 }
                    }
                ]
            },
            {
                "value": 3,
                "middle": [
                    {
                        "trigger": "on_play",
                        "step": {
                            "kind": "delete",
                            "count": { "exactly": 1 },
                            "filter": { "owner": "opponent", "face": "down" }
                        },
                        "follow_up": {
                            "condition": "if_affected",
                            "effect": {
                                "trigger": "on_play",
                                "step": { "kind": "draw", "count": 2 }
                            }
                        }
                    }
                ]
            }
        ]
    }"#;
    let echo: ProtocolDefinition = serde_json::from_str(json).unwrap();
    let listener = echo.effects_for(1).unwrap();
    assert_eq!(listener.bundle().unwrap().slot(BoxSlot::Top).len(), 1);

    let engine = Engine::default();
    let mut state = board(16);
    state.add_to_lane(PlayerId::SECOND, 0, "Echo", 1, true, listener);
    let hidden = state.add_to_lane(PlayerId::SECOND, 1, "Light", 5, false, CardEffects::Builtin);
    let card = state.add_to_hand(PlayerId::FIRST, "Echo", 3, echo.effects_for(3).unwrap());

    let next = engine.play_card(&state, PlayerId::FIRST, card, 1, false).unwrap();
    // Face-down: no on-play text.
    assert!(next.locate(hidden).is_some());

    let mut state = state;
    state.side_mut(PlayerId::FIRST).protocols[1] = "Echo".to_string();
    let next = engine.play_card(&state, PlayerId::FIRST, card, 1, true).unwrap();

    assert!(next.locate(hidden).is_none());
    assert_eq!(next.side(PlayerId::FIRST).hand.len(), 2);
    assert_eq!(next.side(PlayerId::SECOND).hand.len(), 1);
}

#[test]
fn test_optional_effect_prompt() {
    let engine = Engine::default();
    let mut state = board(17);
    let card = state.add_to_hand(
        PlayerId::FIRST,
        "Fire",
        2,
        common::middle(vec![draw(EffectTrigger::OnPlay, 2).optional()]),
    );
    let waiting = engine.play_card(&state, PlayerId::FIRST, card, 0, true).unwrap();
    assert!(matches!(waiting.continuation.action_required, Some(ActionRequired::Prompt(_))));
    assert_eq!(engine.legal_choices(&waiting), vec![Choice::Accept(true), Choice::Accept(false)]);

    let declined = engine.resolve(&waiting, Choice::Accept(false)).unwrap();
    assert!(declined.side(PlayerId::FIRST).hand.is_empty());

    let accepted = engine.resolve(&waiting, Choice::Accept(true)).unwrap();
    assert_eq!(accepted.side(PlayerId::FIRST).hand.len(), 2);
    assert_eq!(accepted.flow(), FlowState::Idle);
}

#[test]
fn test_accepted_effect_needs_its_source() {
    let engine = Engine::default();
    let mut state = board(18);
    let card = state.add_to_hand(
        PlayerId::FIRST,
        "Fire",
        2,
        common::middle(vec![draw(EffectTrigger::OnPlay, 2).optional()]),
    );
    let mut waiting = engine.play_card(&state, PlayerId::FIRST, card, 0, true).unwrap();
    assert!(matches!(waiting.continuation.action_required, Some(ActionRequired::Prompt(_))));

    waiting.side_mut(PlayerId::FIRST).lanes[0].pop_back();
    let next = engine.resolve(&waiting, Choice::Accept(true)).unwrap();

    assert!(next.side(PlayerId::FIRST).hand.is_empty());
    assert_eq!(next.flow(), FlowState::Idle);
}
