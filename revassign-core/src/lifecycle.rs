//! Pull request lifecycle state machine
//!
//! A pull request starts `OPEN` and may move to `MERGED` exactly once.
//! `MERGED` is terminal: it freezes the reviewer set, and merging again is a
//! no-op that reports the existing state instead of failing.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::{Error, Result};
use crate::model::PullRequest;

/// Lifecycle state of a pull request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PrStatus {
    Open,
    Merged,
}

/// Status text that is neither `OPEN` nor `MERGED`
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown pull request status: {0}")]
pub struct InvalidStatus(pub String);

/// Mutations a pull request can be subjected to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    Merge,
    Reassign,
}

/// Result of applying a merge to a pull request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The pull request moved from `OPEN` to `MERGED`
    Merged,
    /// The pull request was already merged; nothing changed
    Unchanged,
}

impl PrStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrStatus::Open => "OPEN",
            PrStatus::Merged => "MERGED",
        }
    }

    /// Whether no further transitions are possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, PrStatus::Merged)
    }

    /// Check if moving to `to` is a legal transition
    pub fn can_transition_to(&self, to: PrStatus) -> bool {
        matches!((self, to), (PrStatus::Open, PrStatus::Merged))
    }

    /// Check whether `mutation` is allowed in this state.
    ///
    /// Merge is permitted in both states because it is idempotent.
    pub fn permits(&self, mutation: Mutation) -> bool {
        match mutation {
            Mutation::Merge => true,
            Mutation::Reassign => !self.is_terminal(),
        }
    }
}

impl fmt::Display for PrStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PrStatus {
    type Err = InvalidStatus;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "OPEN" => Ok(PrStatus::Open),
            "MERGED" => Ok(PrStatus::Merged),
            other => Err(InvalidStatus(other.to_string())),
        }
    }
}

impl PullRequest {
    /// Fail with `AlreadyMerged` unless `mutation` is legal right now
    pub fn ensure_permits(&self, mutation: Mutation) -> Result<()> {
        if self.status.permits(mutation) {
            Ok(())
        } else {
            Err(Error::AlreadyMerged(self.id.to_string()))
        }
    }

    /// Apply the merge transition.
    ///
    /// The merge timestamp is clamped so it never precedes `created_at`.
    /// Merging an already merged pull request leaves it untouched.
    pub fn merge(&mut self, at: DateTime<Utc>) -> MergeOutcome {
        if !self.status.can_transition_to(PrStatus::Merged) {
            return MergeOutcome::Unchanged;
        }

        tracing::info!(
            pr_id = %self.id,
            from = %self.status,
            to = %PrStatus::Merged,
            "Pull request status transition"
        );

        self.status = PrStatus::Merged;
        self.merged_at = Some(at.max(self.created_at));
        MergeOutcome::Merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use uuid::Uuid;

    fn open_pr() -> PullRequest {
        PullRequest::new(Uuid::new_v4(), "pr", Uuid::new_v4())
    }

    #[test]
    fn test_transitions() {
        assert!(PrStatus::Open.can_transition_to(PrStatus::Merged));
        assert!(!PrStatus::Merged.can_transition_to(PrStatus::Open));
        assert!(!PrStatus::Merged.can_transition_to(PrStatus::Merged));
        assert!(!PrStatus::Open.can_transition_to(PrStatus::Open));
    }

    #[test]
    fn test_permits() {
        assert!(PrStatus::Open.permits(Mutation::Reassign));
        assert!(PrStatus::Open.permits(Mutation::Merge));
        assert!(!PrStatus::Merged.permits(Mutation::Reassign));
        assert!(PrStatus::Merged.permits(Mutation::Merge));
    }

    #[test]
    fn test_parse_round_trip() {
        assert_eq!("OPEN".parse::<PrStatus>().unwrap(), PrStatus::Open);
        assert_eq!("MERGED".parse::<PrStatus>().unwrap(), PrStatus::Merged);
        assert_eq!(
            "closed".parse::<PrStatus>(),
            Err(InvalidStatus("closed".to_string()))
        );
    }

    #[test]
    fn test_merge_stamps_once() {
        let mut pr = open_pr();
        let first = pr.created_at + Duration::seconds(5);

        assert_eq!(pr.merge(first), MergeOutcome::Merged);
        assert_eq!(pr.status, PrStatus::Merged);
        assert_eq!(pr.merged_at, Some(first));

        let later = first + Duration::seconds(60);
        assert_eq!(pr.merge(later), MergeOutcome::Unchanged);
        assert_eq!(pr.merged_at, Some(first));
    }

    #[test]
    fn test_merge_never_precedes_creation() {
        let mut pr = open_pr();
        let skewed = pr.created_at - Duration::seconds(30);
        pr.merge(skewed);
        assert_eq!(pr.merged_at, Some(pr.created_at));
    }

    #[test]
    fn test_ensure_permits_on_merged() {
        let mut pr = open_pr();
        assert!(pr.ensure_permits(Mutation::Reassign).is_ok());

        pr.merge(Utc::now());
        let err = pr.ensure_permits(Mutation::Reassign).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::AlreadyMerged);
        assert!(pr.ensure_permits(Mutation::Merge).is_ok());
    }
}
