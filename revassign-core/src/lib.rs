//! revassign-core - Reviewer assignment and reassignment engine
//!
//! This crate holds the rules for picking pull request reviewers, the
//! pull request lifecycle, and the transaction coordinator that keeps every
//! multi-step change atomic. Persistence is abstracted behind the traits in
//! [`store`]; `revassign-db` provides the SQLite implementation.

pub mod config;
pub mod error;
pub mod lifecycle;
pub mod model;
pub mod selection;
pub mod service;
pub mod store;
pub mod tx;

pub use config::Config;
pub use error::{Error, ErrorKind, Result, StoreError};
pub use lifecycle::{MergeOutcome, Mutation, PrStatus};
pub use model::{PrStats, PullRequest, PullRequestShort, ReviewerStats, Team, TeamMember, User};
pub use selection::{RandomSource, SeededRandom, ThreadRandom, DEFAULT_REVIEWER_QUOTA};
pub use service::{
    Engine, PullRequestService, Reassignment, StatisticsService, TeamService, UserService,
};
pub use store::{
    IsolationLevel, PullRequestStore, StatisticsStore, StoreResult, TeamStore, Transactor,
    UserStore,
};
pub use tx::TxManager;
