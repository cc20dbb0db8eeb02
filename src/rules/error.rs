//! Rejected moves.

use std::fmt;

use crate::core::{CardId, PlayerId};

/// Why the engine refused a move or a choice.
///
/// The board passed in is never modified; the caller keeps it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IllegalMove {
    /// A choice was supplied while nothing was being asked.
    NoActionRequired,
    /// A turn action was attempted while a choice or deferred work is outstanding.
    ActionPending,
    /// Someone other than the turn player tried to act.
    NotYourTurn(PlayerId),
    /// The turn action is not available in the current phase.
    WrongPhase,
    InvalidLane(usize),
    CardNotInHand(CardId),
    /// Face-up plays need a protocol match in the lane.
    FaceUpNotAllowed { card: CardId, lane: usize },
    /// The answer has the wrong shape for the question.
    ChoiceMismatch { expected: &'static str },
    /// A picked card is not a legal candidate.
    InvalidTarget(CardId),
    DuplicateCard(CardId),
    WrongCount { expected: String, got: usize },
    /// The picked lane breaks the shift's restriction.
    LaneRestricted(usize),
    NotCompilable(usize),
    /// The match already has a winner.
    GameOver,
}

impl fmt::Display for IllegalMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoActionRequired => write!(f, "no choice is outstanding"),
            Self::ActionPending => write!(f, "a choice or deferred work is outstanding"),
            Self::NotYourTurn(player) => write!(f, "it is not {}'s turn", player),
            Self::WrongPhase => write!(f, "not allowed in the current phase"),
            Self::InvalidLane(lane) => write!(f, "lane {} does not exist", lane),
            Self::CardNotInHand(card) => write!(f, "{} is not in hand", card),
            Self::FaceUpNotAllowed { card, lane } => {
                write!(f, "{} cannot be played face-up in lane {}", card, lane)
            }
            Self::ChoiceMismatch { expected } => write!(f, "expected {}", expected),
            Self::InvalidTarget(card) => write!(f, "{} is not a legal target", card),
            Self::DuplicateCard(card) => write!(f, "{} was picked twice", card),
            Self::WrongCount { expected, got } => {
                write!(f, "expected {} cards, got {}", expected, got)
            }
            Self::LaneRestricted(lane) => write!(f, "lane {} is not a legal destination", lane),
            Self::NotCompilable(lane) => write!(f, "lane {} cannot be compiled", lane),
            Self::GameOver => write!(f, "the game is over"),
        }
    }
}

impl std::error::Error for IllegalMove {}
