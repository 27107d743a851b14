//! Cleaning-mode content: activation messages, rotating tips, toast copy,
//! and the elapsed-time formatter.
//!
//! The UI shell renders these verbatim; keeping them here (rather than in
//! the shell) lets the application layer pick and rotate them without a
//! round-trip, and keeps the copy under test.

/// Header messages shown while cleaning mode is active.  One is picked per
/// activation.
pub const ACTIVATION_MESSAGES: [&str; 5] = [
    "Time to evict those crumb tenants! 🍪",
    "Your keys deserve a spa day too! 💆",
    "Dust bunnies, your time is up! 🐰",
    "Making your keyboard shine brighter than your future! ✨",
    "Operation: Clean Sweep activated! 🎯",
];

/// Pro tips rotated below the keyboard illustration while cleaning.
pub const CLEANING_TIPS: [&str; 4] = [
    "Gently wipe between the keys",
    "Use compressed air for stubborn crumbs",
    "A soft brush works wonders",
    "Don't forget the edges!",
];

/// Round-robin cycler over a fixed deck of strings.
///
/// The original app picked entries at random; a deterministic rotation keeps
/// the visible variety while making the selection order testable.
#[derive(Debug, Clone)]
pub struct MessageDeck {
    entries: &'static [&'static str],
    next: usize,
}

impl MessageDeck {
    /// Creates a deck over `entries`.
    ///
    /// # Panics
    ///
    /// Panics if `entries` is empty; both built-in decks are non-empty by
    /// construction.
    pub fn new(entries: &'static [&'static str]) -> Self {
        assert!(!entries.is_empty(), "deck must have at least one entry");
        Self { entries, next: 0 }
    }

    /// Deck over [`ACTIVATION_MESSAGES`].
    pub fn activation_messages() -> Self {
        Self::new(&ACTIVATION_MESSAGES)
    }

    /// Deck over [`CLEANING_TIPS`].
    pub fn cleaning_tips() -> Self {
        Self::new(&CLEANING_TIPS)
    }

    /// Returns the next entry, wrapping around at the end of the deck.
    pub fn draw(&mut self) -> &'static str {
        let entry = self.entries[self.next];
        self.next = (self.next + 1) % self.entries.len();
        entry
    }

    /// Number of entries in the deck.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always `false`; decks are non-empty by construction.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Formats a second count as `MM:SS` for the cleaning timer display.
///
/// Minutes are not capped at 59; a marathon cleaning session shows `75:30`
/// rather than rolling over.
pub fn format_elapsed(total_seconds: u64) -> String {
    let mins = total_seconds / 60;
    let secs = total_seconds % 60;
    format!("{mins:02}:{secs:02}")
}

// ── Toast copy ────────────────────────────────────────────────────────────────

/// Toast shown when cleaning mode activates.
pub const TOAST_ACTIVATED: (&str, &str) = (
    "Cleaning Mode Activated! 🧹",
    "All keyboard input is now disabled. Click 'Stop Cleaning' to re-enable.",
);

/// Toast shown when cleaning mode ends.
pub const TOAST_DONE: (&str, &str) = ("All done! ✨", "Your keyboard is sparkling clean!");

/// Toast shown when the Accessibility permission is missing.
pub const TOAST_PERMISSION_REQUIRED: (&str, &str) = (
    "Permission Required",
    "Please enable SudoCleaner in System Settings > Privacy & Security > Accessibility",
);

/// Toast shown when the event tap could not be installed.
pub const TOAST_INSTALL_FAILED: (&str, &str) = (
    "Warning",
    "Failed to create the keyboard event tap. Please check accessibility permissions and try again.",
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deck_draws_in_order_and_wraps() {
        // Arrange
        let mut deck = MessageDeck::cleaning_tips();
        let n = deck.len();

        // Act – draw one full cycle plus one
        let first = deck.draw();
        for _ in 1..n {
            deck.draw();
        }
        let wrapped = deck.draw();

        // Assert
        assert_eq!(first, CLEANING_TIPS[0]);
        assert_eq!(wrapped, first, "deck must wrap to the start");
    }

    #[test]
    fn test_activation_deck_covers_all_messages() {
        let mut deck = MessageDeck::activation_messages();
        let drawn: Vec<&str> = (0..deck.len()).map(|_| deck.draw()).collect();
        assert_eq!(drawn, ACTIVATION_MESSAGES);
    }

    #[test]
    fn test_format_elapsed_zero() {
        assert_eq!(format_elapsed(0), "00:00");
    }

    #[test]
    fn test_format_elapsed_pads_single_digits() {
        assert_eq!(format_elapsed(65), "01:05");
    }

    #[test]
    fn test_format_elapsed_does_not_cap_minutes() {
        assert_eq!(format_elapsed(75 * 60 + 30), "75:30");
    }
}
