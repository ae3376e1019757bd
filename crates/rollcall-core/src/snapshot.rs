//! The persisted unit of rotation state.
//!
//! A [`Snapshot`] is everything that has to survive a restart: the
//! participant registry and the progress of every rotation queue. Catalog
//! content is never stored here; it is re-read from disk on start and the
//! restored queues are reconciled against it with [`Snapshot::restore`].

use std::collections::BTreeMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::rotation::RotationQueue;
use crate::types::ParticipantId;

/// Complete mutable rotation state, written after every change.
///
/// Field names on disk follow the layout of existing state files. Unknown
/// keys are ignored and missing keys default to empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Snapshot {
    /// Registered participants: id to display label.
    pub participants: BTreeMap<ParticipantId, String>,

    /// Per-category queue of templates left in the current pass.
    #[serde(rename = "shuffled_messages", alias = "messageQueues")]
    pub message_queues: BTreeMap<String, RotationQueue<String>>,

    /// Participant ids left in the current pass.
    #[serde(rename = "shuffled_participants", alias = "participantQueue")]
    pub participant_queue: RotationQueue<ParticipantId>,
}

/// What [`Snapshot::restore`] changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RestoreReport {
    /// Queued entries dropped because they left their pool or repeated.
    pub stale_entries: usize,
    /// Categories forgotten because the catalog no longer has them.
    pub dropped_categories: usize,
    /// Queues that were empty and received a fresh permutation.
    pub refilled_queues: usize,
}

impl RestoreReport {
    /// Whether the snapshot was modified at all.
    pub const fn changed(&self) -> bool {
        self.stale_entries > 0 || self.dropped_categories > 0 || self.refilled_queues > 0
    }
}

impl Snapshot {
    /// The participant pool in stable order.
    pub fn participant_pool(&self) -> Vec<ParticipantId> {
        self.participants.keys().cloned().collect()
    }

    /// Look up a participant's label.
    pub fn label_of(&self, id: &ParticipantId) -> Option<&str> {
        self.participants.get(id).map(String::as_str)
    }

    /// Reconcile restored queues with the live catalog and participants.
    ///
    /// Every queue ends up a subsequence of a permutation of its current
    /// pool: entries outside the pool and repeats are dropped, categories
    /// missing from the catalog are forgotten, and empty queues whose pool
    /// is non-empty get a fresh permutation.
    pub fn restore<R: Rng + ?Sized>(&mut self, catalog: &Catalog, rng: &mut R) -> RestoreReport {
        let mut report = RestoreReport::default();

        let before = self.message_queues.len();
        self.message_queues
            .retain(|category, _| catalog.contains(category));
        report.dropped_categories = before.saturating_sub(self.message_queues.len());

        for (category, templates) in catalog.iter() {
            let queue = self.message_queues.entry(category.to_owned()).or_default();
            report.stale_entries = report
                .stale_entries
                .saturating_add(queue.retain_pool(templates));
            if queue.is_empty() && !templates.is_empty() {
                *queue = RotationQueue::shuffled(templates, rng);
                report.refilled_queues = report.refilled_queues.saturating_add(1);
            }
        }

        let pool = self.participant_pool();
        report.stale_entries = report
            .stale_entries
            .saturating_add(self.participant_queue.retain_pool(&pool));
        if self.participant_queue.is_empty() && !pool.is_empty() {
            self.participant_queue = RotationQueue::shuffled(&pool, rng);
            report.refilled_queues = report.refilled_queues.saturating_add(1);
        }

        report
    }
}
