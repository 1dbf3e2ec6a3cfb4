mod pick;
mod restaurant;

use crate::activation::{self, ActivationGate};
use crate::document::{merge, normalize, sanitize};
use crate::error::AppError;
use crate::store::{DocumentStore, MemoryStore};
use crate::types::*;
use serde_json::Value;
use std::sync::Arc;

/// Current wall-clock time in epoch milliseconds
pub fn now_ms() -> TimestampMs {
    chrono::Utc::now().timestamp_millis()
}

/// Shared application state.
///
/// Holds no document itself: every operation reads the whole document from
/// the store, changes it in memory and writes it back. Nothing serializes
/// concurrent read-modify-write cycles, so the last writer wins.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub gate: ActivationGate,
}

impl AppState {
    pub fn new(store: Arc<dyn DocumentStore>, gate: ActivationGate) -> Self {
        Self { store, gate }
    }

    /// State backed by a fresh in-memory store
    pub fn in_memory(gate: ActivationGate) -> Self {
        Self::new(Arc::new(MemoryStore::new()), gate)
    }

    /// Read and normalize the document. Store failures degrade to the
    /// default document instead of failing the request.
    pub async fn load(&self) -> ServerState {
        match self.store.read().await {
            Ok(Some(raw)) => normalize(&raw),
            Ok(None) => ServerState::default(),
            Err(e) => {
                tracing::warn!(
                    store = self.store.name(),
                    "Failed to read document, serving defaults: {}",
                    e
                );
                ServerState::default()
            }
        }
    }

    /// Normalize and persist the whole document
    pub async fn save(&self, doc: ServerState) -> Result<ServerState, AppError> {
        let doc = sanitize(doc);
        self.store.write(&doc).await.map_err(|e| {
            tracing::error!(store = self.store.name(), "Failed to write document: {}", e);
            e
        })?;
        Ok(doc)
    }

    /// GET state
    pub async fn get_document(&self) -> ServerState {
        self.load().await
    }

    /// PUT state: shallow field-level merge of `patch` over the stored document
    pub async fn put_document(&self, patch: &Value) -> Result<ServerState, AppError> {
        let current = self.load().await;
        let merged = merge(current, patch);
        tracing::debug!(
            restaurants = merged.restaurants.len(),
            cooldown_weeks = merged.cooldown_weeks,
            "Replacing document"
        );
        self.save(merged).await
    }

    /// Make `session_id` the activator if `attempt` is the shared secret
    pub async fn activate(&self, attempt: &str, session_id: &str) -> Result<ServerState, AppError> {
        let mut doc = self.load().await;
        let previous = activation::activator(&doc).cloned();

        if !self.gate.activate(&mut doc, attempt, session_id) {
            tracing::info!(session = session_id, "Activation rejected");
            return Err(AppError::ActivationRejected);
        }

        if let Some(previous) = previous.filter(|p| p != session_id) {
            tracing::info!(previous = %previous, session = session_id, "Activation taken over");
        }
        tracing::info!(session = session_id, "Session activated");
        self.save(doc).await
    }

    /// Fail unless `session_id` is the recorded activator
    fn require_activator(
        doc: &ServerState,
        session_id: &str,
        action: &'static str,
    ) -> Result<(), AppError> {
        if activation::is_activator(doc, session_id) {
            Ok(())
        } else {
            tracing::debug!(session = session_id, action, "Mutation by non-activator refused");
            Err(AppError::NotActivator(action))
        }
    }
}
