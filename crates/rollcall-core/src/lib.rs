//! Rotation engine for the Rollcall chat bot.
//!
//! Rollcall picks a chat participant and a message template, substitutes
//! the participant into the template, and hands the result to a transport.
//! Participants and templates are drawn from shuffled rotations so every
//! item is used once per pass. Progress survives restarts through a JSON
//! state file, and a single cooldown gate limits how often emissions
//! happen.
//!
//! # Modules
//!
//! - [`types`] -- Participant identity and template rendering.
//! - [`rotation`] -- [`RotationQueue`], the shuffle-once-per-pass queue.
//! - [`catalog`] -- Category templates loaded from `messages_<name>.json`.
//! - [`snapshot`] -- The persisted state document and restart
//!   reconciliation.
//! - [`store`] -- Atomic JSON persistence of the snapshot.
//! - [`cooldown`] -- The global emission gate.
//! - [`tracker`] -- Participant registration.
//! - [`emission`] -- Composing one message from both rotations.
//! - [`engine`] -- [`Engine`], the lock-guarded owner of all state.
//! - [`transport`] -- [`Transport`] trait for outbound delivery.
//! - [`orchestrator`] -- [`Orchestrator`], request then deliver.
//! - [`config`] -- Configuration from `rollcall-config.yaml` and env.
//! - [`error`] -- [`EngineError`].
//!
//! [`RotationQueue`]: rotation::RotationQueue
//! [`Engine`]: engine::Engine
//! [`Transport`]: transport::Transport
//! [`Orchestrator`]: orchestrator::Orchestrator
//! [`EngineError`]: error::EngineError

pub mod catalog;
pub mod config;
pub mod cooldown;
pub mod emission;
pub mod engine;
pub mod error;
pub mod orchestrator;
pub mod rotation;
pub mod snapshot;
pub mod store;
pub mod tracker;
pub mod transport;
pub mod types;

pub use catalog::Catalog;
pub use config::RollcallConfig;
pub use cooldown::{Cooldown, WaitTime};
pub use emission::Emission;
pub use engine::Engine;
pub use error::EngineError;
pub use orchestrator::{Orchestrator, OrchestratorError};
pub use snapshot::Snapshot;
pub use store::StateStore;
pub use transport::{Transport, TransportError};
pub use types::{Participant, ParticipantId};
