//! Domain records: pull requests, users, teams and statistics rows

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::lifecycle::PrStatus;

/// A pull request together with its assigned reviewers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    /// Caller-supplied identity
    #[serde(rename = "pull_request_id")]
    pub id: Uuid,

    /// Display name
    #[serde(rename = "pull_request_name")]
    pub name: String,

    /// Author; never one of `assigned_reviewers`
    pub author_id: Uuid,

    /// Lifecycle state
    pub status: PrStatus,

    /// Reviewers in assignment order, without duplicates
    pub assigned_reviewers: Vec<Uuid>,

    /// When the pull request was created (server-assigned)
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,

    /// When the pull request was merged, if it has been
    #[serde(rename = "mergedAt")]
    pub merged_at: Option<DateTime<Utc>>,
}

impl PullRequest {
    /// Create a new open pull request with no reviewers
    pub fn new(id: Uuid, name: impl Into<String>, author_id: Uuid) -> Self {
        Self {
            id,
            name: name.into(),
            author_id,
            status: PrStatus::Open,
            assigned_reviewers: Vec::new(),
            created_at: Utc::now(),
            merged_at: None,
        }
    }

    /// Set the assigned reviewers
    pub fn with_reviewers(mut self, reviewers: Vec<Uuid>) -> Self {
        self.assigned_reviewers = reviewers;
        self
    }

    /// Check whether `user_id` is currently a reviewer
    pub fn is_reviewer(&self, user_id: Uuid) -> bool {
        self.assigned_reviewers.contains(&user_id)
    }

    /// Summary view of this pull request
    pub fn summary(&self) -> PullRequestShort {
        PullRequestShort {
            id: self.id,
            name: self.name.clone(),
            author_id: self.author_id,
            status: self.status,
        }
    }
}

/// Summary row returned by reviewer listings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestShort {
    #[serde(rename = "pull_request_id")]
    pub id: Uuid,
    #[serde(rename = "pull_request_name")]
    pub name: String,
    pub author_id: Uuid,
    pub status: PrStatus,
}

/// A user as known to the directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "user_id")]
    pub id: Uuid,
    pub username: String,
    /// The single team this user belongs to
    pub team_name: String,
    pub is_active: bool,
}

/// Team member as listed on a team
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMember {
    #[serde(rename = "user_id")]
    pub id: Uuid,
    pub username: String,
    pub is_active: bool,
}

impl TeamMember {
    /// Create an active member
    pub fn new(id: Uuid, username: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            is_active: true,
        }
    }

    /// Set the active flag
    pub fn with_active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }

    /// The directory record this member becomes once it joins `team_name`
    pub fn into_user(self, team_name: &str) -> User {
        User {
            id: self.id,
            username: self.username,
            team_name: team_name.to_string(),
            is_active: self.is_active,
        }
    }
}

/// A named team and its members in insertion order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub team_name: String,
    pub members: Vec<TeamMember>,
}

impl Team {
    pub fn new(team_name: impl Into<String>, members: Vec<TeamMember>) -> Self {
        Self {
            team_name: team_name.into(),
            members,
        }
    }
}

/// How many pull requests a user currently reviews
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewerStats {
    pub reviewer_id: Uuid,
    pub reviewer_name: String,
    pub assigned_count: i64,
}

/// How many reviewers a pull request currently has
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrStats {
    pub pr_id: Uuid,
    pub pr_name: String,
    pub status: PrStatus,
    pub reviewer_count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pull_request_new() {
        let author = Uuid::new_v4();
        let pr = PullRequest::new(Uuid::new_v4(), "feature-x", author);
        assert_eq!(pr.status, PrStatus::Open);
        assert!(pr.assigned_reviewers.is_empty());
        assert!(pr.merged_at.is_none());
        assert_eq!(pr.author_id, author);
    }

    #[test]
    fn test_is_reviewer() {
        let reviewer = Uuid::new_v4();
        let pr = PullRequest::new(Uuid::new_v4(), "pr", Uuid::new_v4()).with_reviewers(vec![reviewer]);
        assert!(pr.is_reviewer(reviewer));
        assert!(!pr.is_reviewer(pr.author_id));
    }

    #[test]
    fn test_pull_request_json_field_names() {
        let pr = PullRequest::new(Uuid::nil(), "pr-1", Uuid::nil());
        let json = serde_json::to_value(&pr).unwrap();
        assert_eq!(json["pull_request_name"], "pr-1");
        assert_eq!(json["status"], "OPEN");
        assert!(json["mergedAt"].is_null());
        assert!(json.get("createdAt").is_some());
    }

    #[test]
    fn test_member_into_user() {
        let id = Uuid::new_v4();
        let user = TeamMember::new(id, "alice").with_active(false).into_user("backend");
        assert_eq!(user.id, id);
        assert_eq!(user.team_name, "backend");
        assert!(!user.is_active);
    }
}
