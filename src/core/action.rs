//! Choices supplied by a decision source.
//!
//! When the engine suspends it names exactly what it is waiting for (see
//! [`ActionRequired`](crate::stack::ActionRequired)). A human input handler
//! or an AI answers with one `Choice`, which the engine validates before
//! applying.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::entity::CardId;

/// A concrete answer to an outstanding suspension.
///
/// ```
/// use compile_rules::core::{CardId, Choice};
///
/// let pick = Choice::cards(&[CardId(4), CardId(9)]);
/// assert_eq!(pick.card_ids(), &[CardId(4), CardId(9)]);
/// assert!(Choice::Lane(1).card_ids().is_empty());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Choice {
    /// A lane index.
    Lane(usize),

    /// One or more cards, in the order they should be applied.
    /// SmallVec covers the usual one or two picks without allocating.
    Cards(SmallVec<[CardId; 4]>),

    /// Accept or decline an optional effect.
    Accept(bool),

    /// Two lanes whose protocol labels should be exchanged.
    SwapProtocols(usize, usize),
}

impl Choice {
    /// Build a card choice from a slice.
    #[must_use]
    pub fn cards(ids: &[CardId]) -> Self {
        Self::Cards(SmallVec::from_slice(ids))
    }

    /// Build a single-card choice.
    #[must_use]
    pub fn card(id: CardId) -> Self {
        Self::cards(&[id])
    }

    /// The cards named by this choice (empty for non-card choices).
    #[must_use]
    pub fn card_ids(&self) -> &[CardId] {
        match self {
            Self::Cards(ids) => ids,
            _ => &[],
        }
    }
}

impl std::fmt::Display for Choice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lane(lane) => write!(f, "lane {}", lane),
            Self::Cards(ids) => {
                write!(f, "cards [")?;
                for (i, id) in ids.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", id.raw())?;
                }
                write!(f, "]")
            }
            Self::Accept(true) => write!(f, "accept"),
            Self::Accept(false) => write!(f, "decline"),
            Self::SwapProtocols(a, b) => write!(f, "swap lanes {} and {}", a, b),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Choice::Lane(2).to_string(), "lane 2");
        assert_eq!(Choice::cards(&[CardId(1), CardId(5)]).to_string(), "cards [1, 5]");
        assert_eq!(Choice::Accept(false).to_string(), "decline");
        assert_eq!(Choice::SwapProtocols(0, 2).to_string(), "swap lanes 0 and 2");
    }

    #[test]
    fn test_serialization() {
        let choice = Choice::card(CardId(3));
        let json = serde_json::to_string(&choice).unwrap();
        let deserialized: Choice = serde_json::from_str(&json).unwrap();
        assert_eq!(choice, deserialized);
    }
}
