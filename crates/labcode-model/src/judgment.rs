//! Per-record judgment state machine.
//!
//! ```text
//! UNPROCESSED ─┬─> EXCLUDED_INVALID_CODE        (terminal)
//!              ├─> EXCLUDED_NON_TEXTUAL_NAME    (terminal)
//!              ├─> EXCLUDED_NON_QUANTITATIVE    (terminal)
//!              └─> CORRECT ──> INCORRECT ─┬─> FIXED       (terminal)
//!                                         └─> UNRESOLVED  (terminal)
//! ```
//!
//! A judgment only moves forward along these edges; once a record has been
//! downgraded it never returns to `CORRECT` within the same pass.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Judgment {
    #[default]
    Unprocessed,
    ExcludedInvalidCode,
    ExcludedNonTextualName,
    ExcludedNonQuantitative,
    Correct,
    Incorrect,
    Fixed,
    Unresolved,
}

impl Judgment {
    pub const fn as_str(self) -> &'static str {
        match self {
            Judgment::Unprocessed => "UNPROCESSED",
            Judgment::ExcludedInvalidCode => "EXCLUDED_INVALID_CODE",
            Judgment::ExcludedNonTextualName => "EXCLUDED_NON_TEXTUAL_NAME",
            Judgment::ExcludedNonQuantitative => "EXCLUDED_NON_QUANTITATIVE",
            Judgment::Correct => "CORRECT",
            Judgment::Incorrect => "INCORRECT",
            Judgment::Fixed => "FIXED",
            Judgment::Unresolved => "UNRESOLVED",
        }
    }

    pub const fn is_excluded(self) -> bool {
        matches!(
            self,
            Judgment::ExcludedInvalidCode
                | Judgment::ExcludedNonTextualName
                | Judgment::ExcludedNonQuantitative
        )
    }

    pub const fn is_terminal(self) -> bool {
        self.is_excluded() || matches!(self, Judgment::Fixed | Judgment::Unresolved)
    }

    /// Whether `next` is a legal forward edge from `self`.
    pub const fn can_advance_to(self, next: Judgment) -> bool {
        match self {
            Judgment::Unprocessed => matches!(
                next,
                Judgment::ExcludedInvalidCode
                    | Judgment::ExcludedNonTextualName
                    | Judgment::ExcludedNonQuantitative
                    | Judgment::Correct
            ),
            Judgment::Correct => matches!(next, Judgment::Incorrect),
            Judgment::Incorrect => matches!(next, Judgment::Fixed | Judgment::Unresolved),
            _ => false,
        }
    }

    /// Moves to `next` if the edge is legal. Returns whether the state changed.
    pub fn advance(&mut self, next: Judgment) -> bool {
        if self.can_advance_to(next) {
            *self = next;
            true
        } else {
            false
        }
    }
}

impl fmt::Display for Judgment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_path_to_fixed() {
        let mut judgment = Judgment::default();
        assert!(judgment.advance(Judgment::Correct));
        assert!(judgment.advance(Judgment::Incorrect));
        assert!(judgment.advance(Judgment::Fixed));
        assert!(judgment.is_terminal());
    }

    #[test]
    fn never_returns_to_correct() {
        let mut judgment = Judgment::Incorrect;
        assert!(!judgment.advance(Judgment::Correct));
        assert_eq!(judgment, Judgment::Incorrect);

        let mut fixed = Judgment::Fixed;
        assert!(!fixed.advance(Judgment::Incorrect));
        assert_eq!(fixed, Judgment::Fixed);
    }

    #[test]
    fn excluded_states_are_terminal() {
        for excluded in [
            Judgment::ExcludedInvalidCode,
            Judgment::ExcludedNonTextualName,
            Judgment::ExcludedNonQuantitative,
        ] {
            let mut judgment = excluded;
            assert!(!judgment.advance(Judgment::Correct));
            assert!(!judgment.advance(Judgment::Incorrect));
            assert_eq!(judgment, excluded);
        }
    }

    #[test]
    fn correct_cannot_skip_to_fixed() {
        let mut judgment = Judgment::Correct;
        assert!(!judgment.advance(Judgment::Fixed));
        assert_eq!(judgment.as_str(), "CORRECT");
    }
}
