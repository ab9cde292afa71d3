//! Reviewer selection
//!
//! Two policies live here:
//!
//! - creation picks the first eligible teammates in directory order, so the
//!   same team always produces the same reviewers;
//! - reassignment picks uniformly at random among the remaining eligible
//!   teammates, through an injected [`RandomSource`].

use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use uuid::Uuid;

use crate::model::User;

/// Maximum number of reviewers assigned when a pull request is created
pub const DEFAULT_REVIEWER_QUOTA: usize = 2;

/// Source of randomness for reassignment
pub trait RandomSource: Send + Sync {
    /// Return an index in `0..upper`. `upper` is never zero.
    fn pick(&self, upper: usize) -> usize;
}

/// Thread-local RNG; the production source
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn pick(&self, upper: usize) -> usize {
        rand::thread_rng().gen_range(0..upper)
    }
}

/// Seeded RNG for reproducible runs
#[derive(Debug)]
pub struct SeededRandom {
    rng: Mutex<StdRng>,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl RandomSource for SeededRandom {
    fn pick(&self, upper: usize) -> usize {
        match self.rng.lock() {
            Ok(mut rng) => rng.gen_range(0..upper),
            Err(poisoned) => poisoned.into_inner().gen_range(0..upper),
        }
    }
}

/// Pick reviewers for a new pull request.
///
/// Walks `members` in order, skipping the author, and stops once `quota`
/// reviewers are collected. Fewer eligible members simply yields a shorter
/// list, possibly empty.
pub fn select_reviewers(members: &[User], author_id: Uuid, quota: usize) -> Vec<Uuid> {
    let mut reviewers = Vec::with_capacity(quota);
    for member in members {
        if reviewers.len() >= quota {
            break;
        }
        if member.id != author_id && !reviewers.contains(&member.id) {
            reviewers.push(member.id);
        }
    }
    reviewers
}

/// Teammates eligible to replace a reviewer: everyone except the author and
/// the reviewers already assigned (which includes the one being replaced).
pub fn replacement_candidates(members: &[User], author_id: Uuid, assigned: &[Uuid]) -> Vec<Uuid> {
    members
        .iter()
        .map(|m| m.id)
        .filter(|id| *id != author_id && !assigned.contains(id))
        .collect()
}

/// Pick a replacement reviewer uniformly at random.
///
/// Returns `None` when the candidate pool is empty.
pub fn select_replacement(
    members: &[User],
    author_id: Uuid,
    assigned: &[Uuid],
    random: &dyn RandomSource,
) -> Option<Uuid> {
    let candidates = replacement_candidates(members, author_id, assigned);
    if candidates.is_empty() {
        return None;
    }
    let index = random.pick(candidates.len()).min(candidates.len() - 1);
    Some(candidates[index])
}
