//! Random assignment of an intermediary to a new loan.

use std::sync::{Mutex, PoisonError};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use loanchain_core::Intermediary;

/// Picks one intermediary uniformly at random.
///
/// The RNG is injected so tests can fix the outcome with a seed.
pub struct IntermediarySelector {
    rng: Mutex<StdRng>,
}

impl IntermediarySelector {
    /// Seeded from OS entropy.
    pub fn from_entropy() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Deterministic selector for tests and replay.
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    pub fn with_rng(rng: StdRng) -> Self {
        Self {
            rng: Mutex::new(rng),
        }
    }

    /// Pick from `pool`, or `None` if it is empty.
    pub fn choose<'a>(&self, pool: &'a [Intermediary]) -> Option<&'a Intermediary> {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        pool.choose(&mut *rng)
    }
}

impl Default for IntermediarySelector {
    fn default() -> Self {
        Self::from_entropy()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loanchain_core::IntermediaryId;

    fn pool() -> Vec<Intermediary> {
        ["ada", "bo", "cy"]
            .iter()
            .map(|name| Intermediary {
                id: IntermediaryId::new(format!("agent-{}", name)).unwrap(),
                name: name.to_string(),
            })
            .collect()
    }

    #[test]
    fn test_empty_pool() {
        assert!(IntermediarySelector::seeded(1).choose(&[]).is_none());
    }

    #[test]
    fn test_same_seed_same_choices() {
        let pool = pool();
        let a = IntermediarySelector::seeded(42);
        let b = IntermediarySelector::seeded(42);
        for _ in 0..10 {
            assert_eq!(a.choose(&pool), b.choose(&pool));
        }
    }

    #[test]
    fn test_every_member_reachable() {
        let pool = pool();
        let selector = IntermediarySelector::seeded(7);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..200 {
            seen.insert(selector.choose(&pool).unwrap().id.clone());
        }
        assert_eq!(seen.len(), pool.len());
    }
}
