//! Three-valued logic for compliance determinations
//!
//! `Unknown` means "insufficient data to decide". It is never coerced into
//! `Yes` or `No`; it propagates through `and`/`or` using Kleene logic.

use serde::{Deserialize, Serialize};

/// A boolean that may be unknown.
///
/// Serialises as `true`, `false` or `null`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "Option<bool>", into = "Option<bool>")]
pub enum TriState {
    Yes,
    No,
    #[default]
    Unknown,
}

impl TriState {
    /// Three-valued AND: `No` dominates, then `Unknown`.
    pub fn and(self, other: TriState) -> TriState {
        match (self, other) {
            (TriState::No, _) | (_, TriState::No) => TriState::No,
            (TriState::Unknown, _) | (_, TriState::Unknown) => TriState::Unknown,
            (TriState::Yes, TriState::Yes) => TriState::Yes,
        }
    }

    /// Three-valued OR: `Yes` dominates, then `Unknown`.
    pub fn or(self, other: TriState) -> TriState {
        match (self, other) {
            (TriState::Yes, _) | (_, TriState::Yes) => TriState::Yes,
            (TriState::Unknown, _) | (_, TriState::Unknown) => TriState::Unknown,
            (TriState::No, TriState::No) => TriState::No,
        }
    }

    /// AND over every value; an empty input is `Yes`.
    pub fn all<I: IntoIterator<Item = TriState>>(values: I) -> TriState {
        values.into_iter().fold(TriState::Yes, TriState::and)
    }

    /// OR over every value; an empty input is `No`.
    pub fn any<I: IntoIterator<Item = TriState>>(values: I) -> TriState {
        values.into_iter().fold(TriState::No, TriState::or)
    }

    pub fn as_option(self) -> Option<bool> {
        match self {
            TriState::Yes => Some(true),
            TriState::No => Some(false),
            TriState::Unknown => None,
        }
    }

    pub fn is_yes(self) -> bool {
        self == TriState::Yes
    }

    pub fn is_no(self) -> bool {
        self == TriState::No
    }

    pub fn is_unknown(self) -> bool {
        self == TriState::Unknown
    }
}

impl From<bool> for TriState {
    fn from(value: bool) -> Self {
        if value {
            TriState::Yes
        } else {
            TriState::No
        }
    }
}

impl From<Option<bool>> for TriState {
    fn from(value: Option<bool>) -> Self {
        value.map(TriState::from).unwrap_or(TriState::Unknown)
    }
}

impl From<TriState> for Option<bool> {
    fn from(value: TriState) -> Self {
        value.as_option()
    }
}

impl std::fmt::Display for TriState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TriState::Yes => write!(f, "true"),
            TriState::No => write!(f, "false"),
            TriState::Unknown => write!(f, "unknown"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [TriState; 3] = [TriState::Yes, TriState::No, TriState::Unknown];

    #[test]
    fn test_and_truth_table() {
        assert_eq!(TriState::Yes.and(TriState::Yes), TriState::Yes);
        assert_eq!(TriState::Yes.and(TriState::Unknown), TriState::Unknown);
        assert_eq!(TriState::Unknown.and(TriState::No), TriState::No);
        assert_eq!(TriState::No.and(TriState::Yes), TriState::No);
    }

    #[test]
    fn test_or_truth_table() {
        assert_eq!(TriState::No.or(TriState::No), TriState::No);
        assert_eq!(TriState::No.or(TriState::Unknown), TriState::Unknown);
        assert_eq!(TriState::Unknown.or(TriState::Yes), TriState::Yes);
    }

    #[test]
    fn test_and_or_are_commutative() {
        for a in ALL {
            for b in ALL {
                assert_eq!(a.and(b), b.and(a));
                assert_eq!(a.or(b), b.or(a));
            }
        }
    }

    #[test]
    fn test_empty_folds() {
        assert_eq!(TriState::all([]), TriState::Yes);
        assert_eq!(TriState::any([]), TriState::No);
    }

    #[test]
    fn test_serializes_as_nullable_bool() {
        assert_eq!(serde_json::to_string(&TriState::Yes).unwrap(), "true");
        assert_eq!(serde_json::to_string(&TriState::No).unwrap(), "false");
        assert_eq!(serde_json::to_string(&TriState::Unknown).unwrap(), "null");

        let parsed: TriState = serde_json::from_str("null").unwrap();
        assert_eq!(parsed, TriState::Unknown);
    }
}
