//! Debounced recommendation lookups for the description fields.
//!
//! Each side of the coin has its own description field and its own
//! [`DescriptionInput`]. A qualifying keystroke schedules a lookup; every
//! keystroke cancels the one already waiting. Time is passed in by the caller,
//! so the engine owns no timers.
//!
//! ```text
//! key up ── cancel pending ──┬─ letter/backspace and text longer than min ─> schedule(now + quiet)
//!                            └─ otherwise ─> clear recommendations
//!                                            (backspace on an empty field also drops the last tag)
//! poll(now) ── deadline reached ─> Some(query)
//! ```

use std::time::{Duration, Instant};
use tracing::trace;

/// A key released in a description field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    Char(char),
    Backspace,
    Other,
}

impl KeyInput {
    /// Map a DOM `KeyboardEvent.key` value.
    pub fn from_key_name(name: &str) -> Self {
        if name == "Backspace" {
            return KeyInput::Backspace;
        }
        let mut chars = name.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => KeyInput::Char(c),
            _ => KeyInput::Other,
        }
    }

    fn triggers_lookup(self) -> bool {
        match self {
            KeyInput::Char(c) => c.is_ascii_alphabetic(),
            KeyInput::Backspace => true,
            KeyInput::Other => false,
        }
    }
}

/// What the caller should do after a keystroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    /// A lookup is scheduled; keep the current recommendations for now.
    Scheduled,
    /// Clear the recommendation list.
    Cleared,
    /// Clear the recommendation list and remove the side's last descriptor.
    RemoveLastDescriptor,
}

/// One cancellable delayed action.
#[derive(Debug, Clone)]
pub struct Debouncer {
    quiet: Duration,
    deadline: Option<Instant>,
    pending: Option<String>,
}

impl Debouncer {
    pub fn new(quiet: Duration) -> Self {
        Self { quiet, deadline: None, pending: None }
    }

    /// Replace whatever is pending with `query`, due `quiet` after `now`.
    pub fn schedule(&mut self, query: String, now: Instant) {
        self.deadline = Some(now + self.quiet);
        self.pending = Some(query);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Take the pending query if its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<String> {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                self.pending.take()
            }
            _ => None,
        }
    }
}

/// Keystroke handling for one description field.
#[derive(Debug, Clone)]
pub struct DescriptionInput {
    debouncer: Debouncer,
    min_query_chars: usize,
    last_len: usize,
}

impl DescriptionInput {
    pub fn new(quiet: Duration, min_query_chars: usize) -> Self {
        Self { debouncer: Debouncer::new(quiet), min_query_chars, last_len: 0 }
    }

    /// `text` is the field content after the key was released.
    pub fn on_key_up(&mut self, key: KeyInput, text: &str, now: Instant) -> InputAction {
        self.debouncer.cancel();
        let len = text.chars().count();
        let was_empty = self.last_len == 0;
        self.last_len = len;

        if len > self.min_query_chars && key.triggers_lookup() {
            trace!(query = text, "recommendation lookup scheduled");
            self.debouncer.schedule(text.to_string(), now);
            return InputAction::Scheduled;
        }
        if key == KeyInput::Backspace && was_empty {
            InputAction::RemoveLastDescriptor
        } else {
            InputAction::Cleared
        }
    }

    pub fn poll(&mut self, now: Instant) -> Option<String> {
        self.debouncer.poll(now)
    }

    pub fn is_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// The field was emptied programmatically (a recommendation was picked).
    pub fn reset(&mut self) {
        self.debouncer.cancel();
        self.last_len = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUIET: Duration = Duration::from_millis(300);

    #[test]
    fn lookup_fires_only_after_quiet_interval() {
        let t0 = Instant::now();
        let mut input = DescriptionInput::new(QUIET, 2);

        assert_eq!(input.on_key_up(KeyInput::Char('s'), "zeus", t0), InputAction::Scheduled);
        assert_eq!(input.poll(t0 + Duration::from_millis(299)), None);
        assert_eq!(input.poll(t0 + QUIET), Some("zeus".to_string()));
        assert_eq!(input.poll(t0 + QUIET * 2), None);
    }

    #[test]
    fn later_keystroke_cancels_pending_lookup() {
        let t0 = Instant::now();
        let mut input = DescriptionInput::new(QUIET, 2);

        input.on_key_up(KeyInput::Char('u'), "zeu", t0);
        let t1 = t0 + Duration::from_millis(200);
        input.on_key_up(KeyInput::Char('s'), "zeus", t1);

        assert_eq!(input.poll(t0 + QUIET), None);
        assert_eq!(input.poll(t1 + QUIET), Some("zeus".to_string()));
    }

    #[test]
    fn short_or_non_letter_input_clears() {
        let t0 = Instant::now();
        let mut input = DescriptionInput::new(QUIET, 2);

        input.on_key_up(KeyInput::Char('e'), "zeu", t0);
        assert_eq!(input.on_key_up(KeyInput::Char('1'), "zeu1", t0), InputAction::Cleared);
        assert!(!input.is_pending());
        assert_eq!(input.on_key_up(KeyInput::Char('z'), "ze", t0), InputAction::Cleared);
    }

    #[test]
    fn backspace_on_empty_field_removes_last_descriptor() {
        let t0 = Instant::now();
        let mut input = DescriptionInput::new(QUIET, 2);

        input.on_key_up(KeyInput::Char('a'), "a", t0);
        // Field becomes empty on this key; it was not empty before it.
        assert_eq!(input.on_key_up(KeyInput::Backspace, "", t0), InputAction::Cleared);
        assert_eq!(input.on_key_up(KeyInput::Backspace, "", t0), InputAction::RemoveLastDescriptor);
    }

    #[test]
    fn key_names() {
        assert_eq!(KeyInput::from_key_name("Backspace"), KeyInput::Backspace);
        assert_eq!(KeyInput::from_key_name("k"), KeyInput::Char('k'));
        assert_eq!(KeyInput::from_key_name("Shift"), KeyInput::Other);
    }
}
