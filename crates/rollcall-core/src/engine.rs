//! The engine: single owner of rotation state and the cooldown gate.
//!
//! All mutable state sits behind one [`tokio::sync::Mutex`]. Each public
//! operation takes the lock once and keeps it for the whole mutation,
//! including the write-through to the state file, so concurrent requests
//! can neither both pass the cooldown gate nor pop from the same queue
//! state. Delivery to the chat happens after the lock is released (see
//! [`Orchestrator`](crate::orchestrator::Orchestrator)).
//!
//! # Emission ordering
//!
//! ```text
//! lock -> gate check -> compose -> record gate -> persist -> unlock
//! ```
//!
//! A composition failure returns before the gate is recorded, so it does
//! not cost the chat a cooldown period.

use chrono::{DateTime, TimeDelta, Utc};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::sync::Mutex;
use tracing::{error, info};

use crate::catalog::Catalog;
use crate::config::RollcallConfig;
use crate::cooldown::Cooldown;
use crate::emission::{self, Emission};
use crate::error::EngineError;
use crate::snapshot::Snapshot;
use crate::store::{LoadOrigin, StateStore};
use crate::tracker;
use crate::types::ParticipantId;

/// Mutable state guarded by the engine lock.
#[derive(Debug)]
struct EngineState {
    snapshot: Snapshot,
    cooldown: Cooldown,
    rng: StdRng,
}

/// Shared handle to the rotation engine. Wrap in an `Arc` to share.
#[derive(Debug)]
pub struct Engine {
    catalog: Catalog,
    store: StateStore,
    state: Mutex<EngineState>,
}

impl Engine {
    /// Load the catalog and state named by `config` and start the engine.
    pub async fn open(config: &RollcallConfig) -> Result<Self, EngineError> {
        let catalog = Catalog::load_dir(&config.storage.messages_dir).await?;
        let store = StateStore::new(config.storage.state_file.clone());
        let cooldown = Cooldown::from_std(config.rate_limit.cooldown());
        Ok(Self::restore(catalog, store, cooldown, StdRng::from_os_rng()).await)
    }

    /// Start an engine from parts, restoring persisted progress from
    /// `store` and reconciling it with `catalog`.
    pub async fn restore(
        catalog: Catalog,
        store: StateStore,
        cooldown: Cooldown,
        mut rng: StdRng,
    ) -> Self {
        let (mut snapshot, origin) = store.load(Snapshot::default()).await;
        let report = snapshot.restore(&catalog, &mut rng);
        if report.changed() && origin != LoadOrigin::Fallback {
            info!(
                stale_entries = report.stale_entries,
                dropped_categories = report.dropped_categories,
                refilled_queues = report.refilled_queues,
                "restored state reconciled with catalog"
            );
            if let Err(e) = store.save(&snapshot).await {
                error!(error = %e, "failed to persist reconciled state");
            }
        }

        info!(
            categories = catalog.len(),
            participants = snapshot.participants.len(),
            cooldown_secs = cooldown.period().num_seconds(),
            "engine ready"
        );

        Self {
            catalog,
            store,
            state: Mutex::new(EngineState {
                snapshot,
                cooldown,
                rng,
            }),
        }
    }

    /// The loaded message catalog.
    pub const fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// All category names, including ones without templates.
    pub fn list_categories(&self) -> Vec<String> {
        self.catalog.names()
    }

    /// Register an identity if it is new, persisting the change.
    ///
    /// Returns `true` if the participant was added.
    pub async fn observe_identity(&self, id: &ParticipantId, label: &str) -> bool {
        let state = &mut *self.state.lock().await;
        if !tracker::observe(&mut state.snapshot, id, label) {
            return false;
        }
        self.persist(&state.snapshot).await;
        true
    }

    /// Emit from `category` without consulting the cooldown gate.
    pub async fn emit(&self, category: &str) -> Result<Emission, EngineError> {
        let state = &mut *self.state.lock().await;
        let emission = emission::compose(
            &mut state.snapshot,
            &self.catalog,
            &normalize(category),
            &mut state.rng,
        )?;
        self.persist(&state.snapshot).await;
        Ok(emission)
    }

    /// Emit from a random category without consulting the cooldown gate.
    pub async fn emit_from_random_category(&self) -> Result<Emission, EngineError> {
        let state = &mut *self.state.lock().await;
        let category = emission::pick_random_category(&self.catalog, &mut state.rng)?;
        let emission =
            emission::compose(&mut state.snapshot, &self.catalog, &category, &mut state.rng)?;
        self.persist(&state.snapshot).await;
        Ok(emission)
    }

    /// Rate-limited emission: the entry point for user commands.
    ///
    /// `None` picks a random category.
    pub async fn request_emission(&self, category: Option<&str>) -> Result<Emission, EngineError> {
        self.request_emission_at(category, Utc::now()).await
    }

    /// [`request_emission`](Self::request_emission) with an explicit clock.
    pub async fn request_emission_at(
        &self,
        category: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Emission, EngineError> {
        let state = &mut *self.state.lock().await;

        if let Some(remaining) = state.cooldown.remaining_at(now) {
            info!(
                remaining_secs = remaining.num_seconds(),
                "emission denied by cooldown"
            );
            return Err(EngineError::RateLimited { remaining });
        }

        let category = match category {
            Some(name) => normalize(name),
            None => emission::pick_random_category(&self.catalog, &mut state.rng)?,
        };
        let emission =
            emission::compose(&mut state.snapshot, &self.catalog, &category, &mut state.rng)?;

        state.cooldown.record(now);
        self.persist(&state.snapshot).await;

        info!(
            category = %emission.category,
            participant = %emission.participant.id,
            "emission granted"
        );
        Ok(emission)
    }

    /// Time left before the cooldown gate opens, if it is closed.
    pub async fn cooldown_remaining(&self) -> Option<TimeDelta> {
        self.state.lock().await.cooldown.remaining_at(Utc::now())
    }

    /// A copy of the current snapshot.
    pub async fn snapshot(&self) -> Snapshot {
        self.state.lock().await.snapshot.clone()
    }

    /// Write the current snapshot, reporting failure to the caller.
    pub async fn flush(&self) -> Result<(), EngineError> {
        let state = self.state.lock().await;
        self.store.save(&state.snapshot).await?;
        Ok(())
    }

    /// Write-through after a mutation. Failure is logged and the
    /// in-memory snapshot stays authoritative until the next save.
    async fn persist(&self, snapshot: &Snapshot) {
        if let Err(e) = self.store.save(snapshot).await {
            error!(error = %e, "failed to persist state, keeping in-memory state");
        }
    }
}

/// Category names are matched case-insensitively.
fn normalize(category: &str) -> String {
    category.trim().to_lowercase()
}
