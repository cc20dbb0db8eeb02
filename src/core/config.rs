//! Rules configuration.
//!
//! The board layout and the handful of numeric constants the rules depend on
//! are configured once per match. The defaults are the standard game.

use serde::{Deserialize, Serialize};

/// Number of lanes on each side of the board.
pub const LANE_COUNT: usize = 3;

/// Game constants.
///
/// ```
/// use compile_rules::core::RulesConfig;
///
/// let config = RulesConfig::default();
/// assert_eq!(config.face_down_value, 2);
/// assert_eq!(config.compile_threshold, 10);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Effective value of a face-down card with no lane modifier.
    pub face_down_value: i32,

    /// Lane total a side needs before the lane can be compiled.
    pub compile_threshold: i32,

    /// Hand size kept when the cache is cleared at end of turn.
    pub hand_limit: usize,

    /// Hand size reached by a refresh.
    pub starting_hand_size: usize,

    /// Shuffle the discard pile into an empty deck when a draw needs a card.
    pub refill_deck_from_discard: bool,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            face_down_value: 2,
            compile_threshold: 10,
            hand_limit: 5,
            starting_hand_size: 5,
            refill_deck_from_discard: true,
        }
    }
}

/// Check a lane index against the board layout.
#[must_use]
pub const fn is_valid_lane(lane: usize) -> bool {
    lane < LANE_COUNT
}
