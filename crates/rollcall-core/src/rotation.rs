//! No-repeat rotation queues.
//!
//! A [`RotationQueue`] holds the unconsumed remainder of a random
//! permutation of some pool. Items are taken from the front; once the
//! queue runs dry the next take reshuffles the *current* pool, so pool
//! growth shows up at the next exhaustion and never mid-pass.
//!
//! ```text
//! Filled --take (len > 1)--> Filled
//! Filled --take (len = 1)--> Empty
//! Empty  --take, pool non-empty--> refill --> Filled --> take
//! Empty  --take, pool empty--> NoItemsAvailable
//! ```

use std::collections::{BTreeSet, VecDeque};

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// Errors raised by rotation operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RotationError {
    /// The pool is empty, so there is nothing to take.
    #[error("no items available in pool")]
    NoItemsAvailable,
}

/// The remaining part of one shuffled pass over a pool.
///
/// Serializes as a plain JSON array so queue progress survives restarts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RotationQueue<T> {
    items: VecDeque<T>,
}

impl<T> Default for RotationQueue<T> {
    fn default() -> Self {
        Self {
            items: VecDeque::new(),
        }
    }
}

impl<T: Clone + Ord> RotationQueue<T> {
    /// Create an empty queue. The first take fills it.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a queue holding a uniform random permutation of `pool`.
    pub fn shuffled<R: Rng + ?Sized>(pool: &[T], rng: &mut R) -> Self {
        let mut items = pool.to_vec();
        items.shuffle(rng);
        Self {
            items: items.into(),
        }
    }

    /// Take the next item, refilling from `pool` first when the queue is
    /// empty.
    pub fn take_next<R: Rng + ?Sized>(&mut self, pool: &[T], rng: &mut R) -> Result<T, RotationError> {
        if self.items.is_empty() {
            if pool.is_empty() {
                return Err(RotationError::NoItemsAvailable);
            }
            *self = Self::shuffled(pool, rng);
            tracing::debug!(pool_size = pool.len(), "rotation queue refilled");
        }
        self.items.pop_front().ok_or(RotationError::NoItemsAvailable)
    }

    /// Drop queued items that are no longer in `pool`, and any repeats.
    ///
    /// Returns how many items were removed.
    pub fn retain_pool(&mut self, pool: &[T]) -> usize {
        let members: BTreeSet<&T> = pool.iter().collect();
        let mut seen: BTreeSet<T> = BTreeSet::new();
        let before = self.items.len();
        self.items
            .retain(|item| members.contains(item) && seen.insert(item.clone()));
        before.saturating_sub(self.items.len())
    }

    /// Number of items left in the current pass.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the current pass is exhausted.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether `item` is still waiting in the current pass.
    pub fn contains(&self, item: &T) -> bool {
        self.items.contains(item)
    }

    /// Iterate the remaining items in take order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }
}

impl<T> From<Vec<T>> for RotationQueue<T> {
    fn from(items: Vec<T>) -> Self {
        Self {
            items: items.into(),
        }
    }
}
