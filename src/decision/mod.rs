//! Answering questions from outside the engine.
//!
//! The engine never decides anything for a player. When it suspends, a
//! [`DecisionSource`] (a UI, a script or an AI) is asked for a [`Choice`].
//! What an AI has learned about hidden cards lives in a [`MatchMemory`]
//! owned by the caller for the length of one match, never in the engine.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rustc_hash::FxHashMap;
use tracing::{trace, warn};

use crate::core::{CardId, Choice, GameState, PlayerId, PlayerMap};
use crate::rules::{Engine, IllegalMove};
use crate::stack::ActionRequired;

/// Something that can answer the engine's questions.
pub trait DecisionSource {
    /// Pick an answer to `action`.
    ///
    /// `legal` lists every valid answer; it is never empty when this is
    /// called.
    fn decide(
        &mut self,
        state: &GameState,
        action: &ActionRequired,
        legal: &[Choice],
        memory: &mut MatchMemory,
    ) -> Choice;
}

/// Always takes the first legal answer.
///
/// Deterministic; useful for tests and as a fallback.
#[derive(Clone, Copy, Debug, Default)]
pub struct FirstLegal;

impl DecisionSource for FirstLegal {
    fn decide(
        &mut self,
        _state: &GameState,
        _action: &ActionRequired,
        legal: &[Choice],
        _memory: &mut MatchMemory,
    ) -> Choice {
        legal.first().cloned().unwrap_or(Choice::Accept(false))
    }
}

/// Picks uniformly among legal answers with a seeded generator.
#[derive(Clone, Debug)]
pub struct RandomLegal {
    rng: ChaCha8Rng,
}

impl RandomLegal {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl DecisionSource for RandomLegal {
    fn decide(
        &mut self,
        _state: &GameState,
        _action: &ActionRequired,
        legal: &[Choice],
        _memory: &mut MatchMemory,
    ) -> Choice {
        legal.choose(&mut self.rng).cloned().unwrap_or(Choice::Accept(false))
    }
}

/// A card identity seen during the match.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct KnownCard {
    pub protocol: String,
    pub value: i32,
}

/// Per-match record of card identities each player has seen.
///
/// Face-up board cards are public. Revealed hand cards are public too.
/// Face-down cards are remembered if they were ever seen face-up.
#[derive(Clone, Debug, Default)]
pub struct MatchMemory {
    known: FxHashMap<CardId, KnownCard>,
}

impl MatchMemory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record everything publicly visible on `state`.
    pub fn observe(&mut self, state: &GameState) {
        for (_, card) in state.board_scan(PlayerId::FIRST) {
            if card.face_up {
                self.remember(card.id, &card.protocol, card.value);
            }
        }
        for (_, side) in state.sides.iter() {
            for card in side.hand.iter().filter(|c| c.revealed) {
                self.remember(card.id, &card.protocol, card.value);
            }
        }
    }

    fn remember(&mut self, card: CardId, protocol: &str, value: i32) {
        self.known.entry(card).or_insert_with(|| {
            trace!(%card, protocol, value, "remember card");
            KnownCard {
                protocol: protocol.to_string(),
                value,
            }
        });
    }

    /// What a card was last seen as, if ever.
    #[must_use]
    pub fn recall(&self, card: CardId) -> Option<&KnownCard> {
        self.known.get(&card)
    }

    /// Number of cards remembered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.known.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.known.is_empty()
    }
}

/// Upper bound on questions answered by one [`Engine::settle`] call.
pub const SETTLE_LIMIT: usize = 256;

impl Engine {
    /// Answer questions with `sources` until nothing is outstanding.
    ///
    /// Each question goes to the source of the player it names. Stops after
    /// [`SETTLE_LIMIT`] answers and returns the board as it stands.
    pub fn settle(
        &self,
        state: &GameState,
        sources: &mut PlayerMap<Box<dyn DecisionSource>>,
        memory: &mut MatchMemory,
    ) -> Result<GameState, IllegalMove> {
        let mut current = state.clone();
        for _ in 0..SETTLE_LIMIT {
            let Some(action) = current.continuation.action_required.clone() else {
                return Ok(current);
            };
            memory.observe(&current);
            let legal = self.legal_choices(&current);
            if legal.is_empty() {
                warn!(question = %action.describe(), "no legal answer");
                return Ok(current);
            }
            let choice = sources[action.actor()].decide(&current, &action, &legal, memory);
            current = self.resolve(&current, choice)?;
        }
        warn!(limit = SETTLE_LIMIT, "settle gave up with a question still outstanding");
        Ok(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::CardEffects;
    use crate::core::Side;
    use crate::stack::{CacheClear, FlowState};

    fn board() -> GameState {
        let sides = PlayerMap::new(|_| Side::new(["Fire", "Water", "Spirit"]));
        GameState::new(sides, PlayerId::FIRST, 9)
    }

    #[test]
    fn test_memory_keeps_first_sighting() {
        let mut state = board();
        let card = state.add_to_lane(PlayerId::SECOND, 2, "Spirit", 3, true, CardEffects::Builtin);
        let hidden =
            state.add_to_lane(PlayerId::SECOND, 1, "Water", 5, false, CardEffects::Builtin);
        let mut memory = MatchMemory::new();

        memory.observe(&state);
        assert_eq!(memory.recall(card).map(|k| k.value), Some(3));
        assert!(memory.recall(hidden).is_none());

        let loc = state.locate(card).unwrap();
        state.card_at_mut(loc).unwrap().face_up = false;
        memory.observe(&state);
        assert_eq!(memory.len(), 1);
    }

    #[test]
    fn test_memory_sees_revealed_hands() {
        let mut state = board();
        let card = state.add_to_hand(PlayerId::FIRST, "Fire", 4, CardEffects::Builtin);
        let mut memory = MatchMemory::new();

        memory.observe(&state);
        assert!(memory.is_empty());

        let pos = state.side(PlayerId::FIRST).hand_position(card).unwrap();
        state.side_mut(PlayerId::FIRST).hand[pos].revealed = true;
        memory.observe(&state);
        assert_eq!(memory.recall(card).map(|k| k.protocol.as_str()), Some("Fire"));
    }

    #[test]
    fn test_settle_answers_until_idle() {
        let engine = Engine::default();
        let mut state = board();
        for v in 0..6 {
            state.add_to_hand(PlayerId::FIRST, "Fire", v, CardEffects::Builtin);
        }
        let waiting = engine.end_turn(&state, PlayerId::FIRST).unwrap();
        assert!(matches!(
            waiting.continuation.action_required,
            Some(ActionRequired::ClearCache(CacheClear { count: 1, .. }))
        ));

        let mut sources: PlayerMap<Box<dyn DecisionSource>> =
            PlayerMap::new(|_| Box::new(FirstLegal) as Box<dyn DecisionSource>);
        let mut memory = MatchMemory::new();
        let settled = engine.settle(&waiting, &mut sources, &mut memory).unwrap();

        assert_eq!(settled.flow(), FlowState::Idle);
        assert_eq!(settled.side(PlayerId::FIRST).hand.len(), 5);
        assert_eq!(settled.turn, PlayerId::SECOND);
    }

    #[test]
    fn test_random_legal_is_seeded() {
        let state = board();
        let action = ActionRequired::ClearCache(CacheClear { actor: PlayerId::FIRST, count: 1 });
        let legal: Vec<Choice> = (1..=6).map(|i| Choice::card(CardId(i))).collect();
        let mut memory = MatchMemory::new();

        let mut a = RandomLegal::new(3);
        let mut b = RandomLegal::new(3);
        for _ in 0..5 {
            let pick = a.decide(&state, &action, &legal, &mut memory);
            assert!(legal.contains(&pick));
            assert_eq!(pick, b.decide(&state, &action, &legal, &mut memory));
        }
    }
}
