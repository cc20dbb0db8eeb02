//! Human-readable game log.
//!
//! The engine narrates every effect and trigger it fires. The narration is
//! advisory: nothing in the rules ever reads it back. Lines are kept on the
//! board (so a caller can render them alongside the state they describe) and
//! mirrored to `tracing` at debug level.

use im::Vector;
use tracing::debug;

use super::player::PlayerId;

/// One line of narration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogLine {
    /// Nesting depth at the time the line was written.
    pub depth: u8,
    /// The player the line is about, if any.
    pub player: Option<PlayerId>,
    /// The text itself.
    pub text: String,
}

/// Append-only, indentable log.
///
/// ```
/// use compile_rules::core::{GameLog, PlayerId};
///
/// let mut log = GameLog::default();
/// log.append(Some(PlayerId::FIRST), "plays Fire 3");
/// log.indent();
/// log.append(None, "Fire 3 triggers");
/// log.outdent();
///
/// assert_eq!(log.len(), 2);
/// assert_eq!(log.lines()[1].depth, 1);
/// assert_eq!(log.depth(), 0);
/// ```
#[derive(Clone, Debug, Default)]
pub struct GameLog {
    lines: Vector<LogLine>,
    depth: u8,
}

impl GameLog {
    /// Append a line at the current depth.
    pub fn append(&mut self, player: Option<PlayerId>, text: impl Into<String>) {
        let text = text.into();
        debug!(target: "compile_rules::log", depth = self.depth, player = ?player, "{}", text);
        self.lines.push_back(LogLine {
            depth: self.depth,
            player,
            text,
        });
    }

    /// Nest subsequent lines one level deeper.
    pub fn indent(&mut self) {
        self.depth = self.depth.saturating_add(1);
    }

    /// Undo one `indent`. Never goes below zero.
    pub fn outdent(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Current nesting depth.
    #[must_use]
    pub fn depth(&self) -> u8 {
        self.depth
    }

    /// All lines written so far.
    #[must_use]
    pub fn lines(&self) -> &Vector<LogLine> {
        &self.lines
    }

    /// Number of lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Check if nothing has been logged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Whether any line contains `needle`. Handy in tests and tooling.
    #[must_use]
    pub fn contains(&self, needle: &str) -> bool {
        self.lines.iter().any(|line| line.text.contains(needle))
    }
}
