//! Participant registration.
//!
//! The tracker is the only path that grows the participant pool. It does
//! not touch the participant queue: a newcomer joins the rotation when the
//! current pass runs out and the queue is reshuffled.

use tracing::info;

use crate::snapshot::Snapshot;
use crate::types::ParticipantId;

/// Register `id` with `label` if it has not been seen before.
///
/// Returns `true` when the snapshot changed and needs to be persisted.
/// A known id keeps the label it was first registered with.
pub fn observe(snapshot: &mut Snapshot, id: &ParticipantId, label: &str) -> bool {
    if snapshot.participants.contains_key(id) {
        return false;
    }
    snapshot.participants.insert(id.clone(), label.to_owned());
    info!(participant = %id, label, total = snapshot.participants.len(), "participant registered");
    true
}
