//! Board state.
//!
//! ## Side
//!
//! Each player owns one symmetric side of the board:
//! - Three lanes, each an ordered stack (last element = uncovered card)
//! - Hand, deck (top = back of the vector) and discard pile
//! - One protocol label per lane and the compiled flags
//! - Derived lane totals (never authoritative; see [`crate::rules::values`])
//!
//! ## GameState
//!
//! The complete board plus the engine's bookkeeping: whose turn it is, the
//! continuation record for suspended work, per-turn trigger guards, the log
//! and pending animation requests.
//!
//! All collections are `im` persistent structures, so a public engine
//! operation can clone its input board in O(1) and return the mutated copy.

use im::{HashSet as ImHashSet, Vector};
use serde::{Deserialize, Serialize};

use super::animation::Animation;
use super::config::LANE_COUNT;
use super::entity::CardId;
use super::log::GameLog;
use super::player::{PlayerId, PlayerMap};
use super::rng::GameRng;
use crate::cards::{Card, CardEffects};
use crate::stack::{Continuation, FlowState};
use crate::triggers::ReactiveTrigger;

/// One lane of one side: bottom card first, uncovered card last.
pub type Lane = Vector<Card>;

/// Turn phases the engine distinguishes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Start-of-turn effects are resolving.
    Start,
    /// The turn player may play, refresh or compile.
    #[default]
    Action,
    /// End-of-turn effects and cache clearing are resolving.
    End,
}

/// Running totals kept per side.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideStats {
    pub cards_played: u32,
    pub cards_deleted: u32,
    pub cards_drawn: u32,
    pub cards_discarded: u32,
    pub cards_flipped: u32,
    pub cards_shifted: u32,
    pub cards_returned: u32,
    pub compiles: u32,
}

/// One player's half of the board.
#[derive(Clone, Debug, Default)]
pub struct Side {
    pub lanes: [Lane; LANE_COUNT],
    pub hand: Vector<Card>,
    pub deck: Vector<Card>,
    pub discard: Vector<Card>,
    pub protocols: [String; LANE_COUNT],
    pub compiled: [bool; LANE_COUNT],

    /// Derived by recalculation.
    pub lane_values: [i32; LANE_COUNT],
    /// Derived by recalculation.
    pub compilable: [bool; LANE_COUNT],

    pub stats: SideStats,
}

impl Side {
    /// Create a side with the given protocols in lane order.
    #[must_use]
    pub fn new(protocols: [&str; LANE_COUNT]) -> Self {
        Self {
            protocols: protocols.map(str::to_string),
            ..Self::default()
        }
    }

    /// The uncovered card of a lane.
    #[must_use]
    pub fn uncovered(&self, lane: usize) -> Option<&Card> {
        self.lanes.get(lane).and_then(|cards| cards.last())
    }

    /// Position of a card in the hand.
    #[must_use]
    pub fn hand_position(&self, card: CardId) -> Option<usize> {
        self.hand.iter().position(|c| c.id == card)
    }

    /// Number of cards on this side of the board.
    #[must_use]
    pub fn board_count(&self) -> usize {
        self.lanes.iter().map(Vector::len).sum()
    }
}

/// Where a card sits on the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CardLocation {
    pub owner: PlayerId,
    pub lane: usize,
    /// Stack position, 0 = bottom.
    pub index: usize,
}

/// Key of the per-turn reactive guard: card, trigger kind and, for kinds
/// that may fire once per distinct event, that event's serial.
pub type ReactiveKey = (CardId, ReactiveTrigger, Option<u64>);

/// Once-per-phase and once-per-event bookkeeping.
///
/// Cleared at the start of every turn.
#[derive(Clone, Debug, Default)]
pub struct TurnGuards {
    /// Start/End effects already fired this turn.
    pub phase_processed: ImHashSet<(CardId, Phase)>,
    /// Reactive effects already fired.
    pub reactive_fired: ImHashSet<ReactiveKey>,
}

impl TurnGuards {
    /// Forget everything.
    pub fn clear(&mut self) {
        self.phase_processed = ImHashSet::new();
        self.reactive_fired = ImHashSet::new();
    }
}

/// Full board value.
#[derive(Clone, Debug)]
pub struct GameState {
    /// Both sides of the board.
    pub sides: PlayerMap<Side>,

    /// Whose turn it is.
    pub turn: PlayerId,

    /// Turn number (starts at 1).
    pub turn_number: u32,

    /// Current phase of the turn.
    pub phase: Phase,

    /// Suspended work: the outstanding choice, deferred actions and the
    /// remainder of an interrupted effect list.
    pub continuation: Continuation,

    /// Per-turn trigger guards.
    pub guards: TurnGuards,

    /// Narration.
    pub log: GameLog,

    /// Deterministic RNG.
    pub rng: GameRng,

    animations: Vector<Animation>,
    next_card_id: u32,
    event_serial: u64,
}

impl GameState {
    /// Create an empty board.
    #[must_use]
    pub fn new(sides: PlayerMap<Side>, first_player: PlayerId, seed: u64) -> Self {
        Self {
            sides,
            turn: first_player,
            turn_number: 1,
            phase: Phase::Action,
            continuation: Continuation::default(),
            guards: TurnGuards::default(),
            log: GameLog::default(),
            rng: GameRng::new(seed),
            animations: Vector::new(),
            next_card_id: 1,
            event_serial: 0,
        }
    }

    /// Get a side.
    #[must_use]
    pub fn side(&self, player: PlayerId) -> &Side {
        &self.sides[player]
    }

    /// Get a mutable side.
    pub fn side_mut(&mut self, player: PlayerId) -> &mut Side {
        &mut self.sides[player]
    }

    // === Cards ===

    /// Allocate a fresh card. The card is not placed anywhere yet.
    pub fn create_card(
        &mut self,
        protocol: impl Into<String>,
        value: i32,
        effects: CardEffects,
    ) -> Card {
        let id = CardId(self.next_card_id);
        self.next_card_id += 1;
        Card::new(id, protocol, value, effects)
    }

    /// Allocate a card and put it on top of a player's deck.
    pub fn add_to_deck(
        &mut self,
        player: PlayerId,
        protocol: &str,
        value: i32,
        effects: CardEffects,
    ) -> CardId {
        let card = self.create_card(protocol, value, effects);
        let id = card.id;
        self.sides[player].deck.push_back(card);
        id
    }

    /// Allocate a card directly into a player's hand.
    pub fn add_to_hand(
        &mut self,
        player: PlayerId,
        protocol: &str,
        value: i32,
        effects: CardEffects,
    ) -> CardId {
        let card = self.create_card(protocol, value, effects);
        let id = card.id;
        self.sides[player].hand.push_back(card);
        id
    }

    /// Allocate a card directly onto the board, on top of a lane.
    ///
    /// Used for setting up positions; fires nothing.
    pub fn add_to_lane(
        &mut self,
        player: PlayerId,
        lane: usize,
        protocol: &str,
        value: i32,
        face_up: bool,
        effects: CardEffects,
    ) -> CardId {
        let mut card = self.create_card(protocol, value, effects);
        card.face_up = face_up;
        let id = card.id;
        self.sides[player].lanes[lane].push_back(card);
        id
    }

    /// Find a card on the board.
    #[must_use]
    pub fn locate(&self, card: CardId) -> Option<CardLocation> {
        for (owner, side) in self.sides.iter() {
            for (lane, cards) in side.lanes.iter().enumerate() {
                if let Some(index) = cards.iter().position(|c| c.id == card) {
                    return Some(CardLocation { owner, lane, index });
                }
            }
        }
        None
    }

    /// Get a board card.
    #[must_use]
    pub fn card_at(&self, location: CardLocation) -> Option<&Card> {
        self.sides[location.owner].lanes.get(location.lane)?.get(location.index)
    }

    /// Get a board card by ID.
    #[must_use]
    pub fn board_card(&self, card: CardId) -> Option<&Card> {
        self.locate(card).and_then(|loc| self.card_at(loc))
    }

    /// Mutable access to a board card.
    pub fn card_at_mut(&mut self, location: CardLocation) -> Option<&mut Card> {
        self.sides[location.owner]
            .lanes
            .get_mut(location.lane)?
            .get_mut(location.index)
    }

    /// Whether the card at `location` is the top of its lane.
    #[must_use]
    pub fn is_uncovered(&self, location: CardLocation) -> bool {
        self.sides[location.owner].lanes[location.lane].len() == location.index + 1
    }

    /// Iterate every board card in scan order: the given player's side
    /// first, then lanes left to right, then stack bottom to top.
    pub fn board_scan(&self, first: PlayerId) -> impl Iterator<Item = (CardLocation, &Card)> + '_ {
        first.starting_with().flat_map(move |owner| {
            self.sides[owner]
                .lanes
                .iter()
                .enumerate()
                .flat_map(move |(lane, cards)| {
                    cards
                        .iter()
                        .enumerate()
                        .map(move |(index, card)| (CardLocation { owner, lane, index }, card))
                })
        })
    }

    // === Events & animations ===

    /// Allocate the serial number of a new event.
    pub fn next_event_serial(&mut self) -> u64 {
        self.event_serial += 1;
        self.event_serial
    }

    /// Queue an animation request.
    pub fn push_animation(&mut self, animation: Animation) {
        self.animations.push_back(animation);
    }

    /// Pending animation requests, oldest first.
    #[must_use]
    pub fn animations(&self) -> &Vector<Animation> {
        &self.animations
    }

    /// Drain pending animation requests.
    pub fn take_animations(&mut self) -> Vec<Animation> {
        std::mem::take(&mut self.animations).into_iter().collect()
    }

    // === Flow ===

    /// What the engine is doing with suspended work right now.
    #[must_use]
    pub fn flow(&self) -> FlowState {
        self.continuation.flow()
    }

    /// The player who has compiled all three lanes, if any.
    #[must_use]
    pub fn winner(&self) -> Option<PlayerId> {
        self.sides
            .iter()
            .find(|(_, side)| side.compiled.iter().all(|&c| c))
            .map(|(player, _)| player)
    }

    /// Whether the board is waiting on a player's choice.
    #[must_use]
    pub fn is_awaiting_choice(&self) -> bool {
        self.continuation.action_required.is_some()
    }
}
