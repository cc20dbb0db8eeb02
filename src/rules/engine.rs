//! The rules engine.
//!
//! `Engine` holds only immutable rule data: the numeric configuration and
//! the builtin effect catalog. Every public operation takes a board by
//! reference and returns a new one, so callers (UIs, AI search, replays)
//! can keep any earlier board around for free.
//!
//! Internally an operation clones its input once and then works on the
//! clone through `&mut GameState`. The pieces of that work live next to the
//! data they manipulate:
//!
//! - [`crate::effects`]: step interpretation and board primitives
//! - [`crate::triggers`]: reactive dispatch
//! - [`crate::stack`]: the continuation record, drain loop and resolvers
//! - `turn`: start, end, refresh and compile

use tracing::{debug, error};

use crate::cards::BuiltinRegistry;
use crate::core::{is_valid_lane, CardId, GameState, Phase, PlayerId, RulesConfig};
use crate::stack::{FlowState, QueuedAction};

use super::error::IllegalMove;
use super::values;

/// The rules engine.
#[derive(Clone, Debug, Default)]
pub struct Engine {
    pub(crate) config: RulesConfig,
    pub(crate) builtins: BuiltinRegistry,
}

impl Engine {
    /// Create an engine with no builtin effects.
    #[must_use]
    pub fn new(config: RulesConfig) -> Self {
        Self {
            config,
            builtins: BuiltinRegistry::new(),
        }
    }

    /// Install a builtin effect catalog (builder pattern).
    #[must_use]
    pub fn with_builtins(mut self, builtins: BuiltinRegistry) -> Self {
        self.builtins = builtins;
        self
    }

    /// The rules configuration.
    #[must_use]
    pub fn config(&self) -> &RulesConfig {
        &self.config
    }

    /// The builtin effect catalog.
    #[must_use]
    pub fn builtins(&self) -> &BuiltinRegistry {
        &self.builtins
    }

    /// Log and return a rejection.
    pub(crate) fn reject<T>(&self, state: &GameState, err: IllegalMove) -> Result<T, IllegalMove> {
        error!(turn = state.turn_number, player = %state.turn, %err, "illegal move");
        Err(err)
    }

    /// Check that the turn player may start a turn action.
    pub(crate) fn check_turn_action(
        &self,
        state: &GameState,
        player: PlayerId,
    ) -> Result<(), IllegalMove> {
        if state.winner().is_some() {
            return self.reject(state, IllegalMove::GameOver);
        }
        if state.flow() != FlowState::Idle {
            return self.reject(state, IllegalMove::ActionPending);
        }
        if state.turn != player {
            return self.reject(state, IllegalMove::NotYourTurn(player));
        }
        Ok(())
    }

    /// Play a card from hand onto one of the player's lanes.
    ///
    /// A face-up play requires the card's protocol to match the protocol of
    /// that lane on either side. The covered card's on-cover text resolves
    /// first, then the card lands. After-play listeners fire before its
    /// on-play text, which runs only if the card is face-up and uncovered.
    pub fn play_card(
        &self,
        state: &GameState,
        player: PlayerId,
        card: CardId,
        lane: usize,
        face_up: bool,
    ) -> Result<GameState, IllegalMove> {
        self.check_turn_action(state, player)?;
        if state.phase != Phase::Action {
            return self.reject(state, IllegalMove::WrongPhase);
        }
        if !is_valid_lane(lane) {
            return self.reject(state, IllegalMove::InvalidLane(lane));
        }
        let Some(position) = state.side(player).hand_position(card) else {
            return self.reject(state, IllegalMove::CardNotInHand(card));
        };
        if face_up {
            let protocol = &state.side(player).hand[position].protocol;
            let matches = state.sides.iter().any(|(_, side)| &side.protocols[lane] == protocol);
            if !matches {
                return self.reject(state, IllegalMove::FaceUpNotAllowed { card, lane });
            }
        }

        let mut next = state.clone();
        let played = next.side_mut(player).hand.remove(position);
        debug!(%player, card = %played.name(), lane, face_up, "play card");

        let mut work = self.cover_work(&next, player, lane, player);
        work.push(QueuedAction::Place { owner: player, lane, card: played, face_up });
        self.run_work(&mut next, work);
        self.drain(&mut next);
        Ok(next)
    }

    /// Refresh derived lane values on a copy of the board.
    #[must_use]
    pub fn recalculate(&self, state: &GameState) -> GameState {
        values::recalculated(state, &self.config)
    }
}
