//! Glue between the engine and a [`Transport`].
//!
//! The engine lock is released before delivery starts, so a slow chat API
//! never blocks participant registration or other requests.

use std::sync::Arc;

use tracing::{info, warn};

use crate::emission::Emission;
use crate::engine::Engine;
use crate::error::EngineError;
use crate::transport::{Transport, TransportError};

/// Errors from a full request-and-deliver cycle.
#[derive(Debug, thiserror::Error)]
pub enum OrchestratorError {
    /// The engine declined or failed to compose the emission.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// The emission was composed (and its rotation and cooldown state
    /// committed) but the transport failed to deliver it.
    #[error("failed to deliver message from '{category}': {source}")]
    Delivery {
        /// Category of the undelivered emission.
        category: String,
        /// The transport failure.
        source: TransportError,
    },
}

/// Requests emissions from the engine and delivers them.
#[derive(Debug)]
pub struct Orchestrator<T> {
    engine: Arc<Engine>,
    transport: T,
}

impl<T: Transport> Orchestrator<T> {
    /// Pair a shared engine with a transport.
    pub const fn new(engine: Arc<Engine>, transport: T) -> Self {
        Self { engine, transport }
    }

    /// The shared engine.
    pub const fn engine(&self) -> &Arc<Engine> {
        &self.engine
    }

    /// The transport used for delivery.
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Rate-limited emission from `category` (random when `None`),
    /// delivered through the transport.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestratorError::Engine`] when the request is refused
    /// and [`OrchestratorError::Delivery`] when sending fails. A failed
    /// delivery does not roll back the rotation or the cooldown.
    pub async fn post(&self, category: Option<&str>) -> Result<Emission, OrchestratorError> {
        let emission = self.engine.request_emission(category).await?;
        self.deliver(emission).await
    }

    /// Deliver an already composed emission.
    async fn deliver(&self, emission: Emission) -> Result<Emission, OrchestratorError> {
        match self
            .transport
            .deliver(&emission.text, emission.rich_formatting)
            .await
        {
            Ok(()) => {
                info!(category = %emission.category, "emission delivered");
                Ok(emission)
            }
            Err(source) => {
                warn!(category = %emission.category, error = %source, "delivery failed");
                Err(OrchestratorError::Delivery {
                    category: emission.category,
                    source,
                })
            }
        }
    }
}
