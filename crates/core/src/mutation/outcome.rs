//! Settled-mutation outcomes for user-facing messaging

use cheapalarms_domain::ItemError;
use serde::{Deserialize, Serialize};

/// Outcome of a successfully settled mutation.
///
/// A failed mutation never produces an outcome; it propagates an error after
/// rollback. Partial success still settles (the whole key set is invalidated
/// and a refetch produces ground truth) but carries the per-item errors so
/// the caller can render a distinct message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum MutationOutcome {
    AllSucceeded { succeeded: usize },
    Partial { succeeded: usize, errors: Vec<ItemError> },
}

impl MutationOutcome {
    /// Number of items the backend confirmed.
    pub fn succeeded(&self) -> usize {
        match self {
            Self::AllSucceeded { succeeded } | Self::Partial { succeeded, .. } => *succeeded,
        }
    }

    /// Number of items the backend rejected.
    pub fn failed(&self) -> usize {
        match self {
            Self::AllSucceeded { .. } => 0,
            Self::Partial { errors, .. } => errors.len(),
        }
    }

    /// Per-item errors, empty when everything succeeded.
    pub fn errors(&self) -> &[ItemError] {
        match self {
            Self::AllSucceeded { .. } => &[],
            Self::Partial { errors, .. } => errors,
        }
    }

    /// Human-readable description, e.g. `"Deleted 2 estimates — 1 failed."`.
    ///
    /// `verb` is the past-tense action ("Deleted", "Restored") and `noun` the
    /// singular entity name ("estimate", "user").
    pub fn describe(&self, verb: &str, noun: &str) -> String {
        let succeeded = self.succeeded();
        let noun = pluralise(noun, succeeded);
        match self {
            Self::AllSucceeded { .. } => format!("{verb} {succeeded} {noun}."),
            Self::Partial { errors, .. } => {
                format!("{verb} {succeeded} {noun} — {} failed.", errors.len())
            }
        }
    }
}

fn pluralise(noun: &str, count: usize) -> String {
    if count == 1 {
        noun.to_string()
    } else {
        format!("{noun}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_success_message() {
        let outcome = MutationOutcome::AllSucceeded { succeeded: 3 };
        assert_eq!(outcome.describe("Deleted", "estimate"), "Deleted 3 estimates.");
    }

    #[test]
    fn partial_message_is_distinct_from_full_success() {
        let partial = MutationOutcome::Partial {
            succeeded: 2,
            errors: vec![ItemError { id: "e3".into(), message: "not found".into() }],
        };
        assert_eq!(partial.describe("Deleted", "estimate"), "Deleted 2 estimates — 1 failed.");

        let full = MutationOutcome::AllSucceeded { succeeded: 2 };
        assert_ne!(
            partial.describe("Deleted", "estimate"),
            full.describe("Deleted", "estimate")
        );
    }

    #[test]
    fn singular_noun() {
        let outcome = MutationOutcome::AllSucceeded { succeeded: 1 };
        assert_eq!(outcome.describe("Restored", "estimate"), "Restored 1 estimate.");
    }
}
