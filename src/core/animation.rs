//! Animation requests for the presentation layer.
//!
//! The engine never waits on playback. Each board mutation appends a tagged
//! request; the caller drains them with
//! [`GameState::take_animations`](super::GameState::take_animations) and
//! plays them back in order.

use serde::{Deserialize, Serialize};

use super::entity::CardId;
use super::player::PlayerId;

/// A single playback request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Animation {
    /// A card was placed into a lane.
    Play { card: CardId, owner: PlayerId, lane: usize },
    /// A card left the board for its owner's discard pile.
    Delete { card: CardId, owner: PlayerId },
    /// A card went back to its owner's hand.
    Return { card: CardId, owner: PlayerId },
    /// A card turned over.
    Flip { card: CardId, owner: PlayerId, face_up: bool },
    /// A card moved between two lanes of its owner's side.
    Shift { card: CardId, owner: PlayerId, from: usize, to: usize },
    /// Cards moved from deck to hand.
    Draw { owner: PlayerId, cards: Vec<CardId> },
    /// Cards moved from hand to discard.
    Discard { owner: PlayerId, cards: Vec<CardId> },
    /// A hand was shown to the other player.
    Reveal { owner: PlayerId, cards: Vec<CardId> },
}

impl Animation {
    /// The player whose cards are animated.
    #[must_use]
    pub fn owner(&self) -> PlayerId {
        match self {
            Self::Play { owner, .. }
            | Self::Delete { owner, .. }
            | Self::Return { owner, .. }
            | Self::Flip { owner, .. }
            | Self::Shift { owner, .. }
            | Self::Draw { owner, .. }
            | Self::Discard { owner, .. }
            | Self::Reveal { owner, .. } => *owner,
        }
    }
}
