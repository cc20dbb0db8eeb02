//! Core types: players, card ids, configuration, the board, choices, RNG,
//! the narration log and animation requests.
//!
//! Everything here is plain data. The rules that act on it live in
//! [`crate::rules`] and its helpers.

pub mod action;
pub mod animation;
pub mod config;
pub mod entity;
pub mod log;
pub mod player;
pub mod rng;
pub mod state;

pub use action::Choice;
pub use animation::Animation;
pub use config::{is_valid_lane, RulesConfig, LANE_COUNT};
pub use entity::CardId;
pub use log::{GameLog, LogLine};
pub use player::{PlayerId, PlayerMap, PLAYER_COUNT};
pub use rng::GameRng;
pub use state::{CardLocation, GameState, Lane, Phase, ReactiveKey, Side, SideStats, TurnGuards};
