//! Card instance identification.
//!
//! Every physical card in a match has a unique `CardId`, allocated by the
//! board when the card is created. Ids are never reused within a match, so a
//! stale id simply fails to resolve once its card has left the board.
//!
//! ```
//! use compile_rules::core::CardId;
//!
//! let a = CardId::new(7);
//! assert_eq!(a.raw(), 7);
//! assert_eq!(format!("{}", a), "Card(7)");
//! ```

use serde::{Deserialize, Serialize};

/// Unique identifier for a card instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CardId(pub u32);

impl CardId {
    /// Create a card ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl From<u32> for CardId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for CardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Card({})", self.0)
    }
}
