//! Server state management
//!
//! Shared state for matchmaking, live sessions and open connections.

use crate::protocol::{ClientIntent, ServerEvent};
use crate::registry::{Delivery, MatchRegistry, ParticipantId};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};
use tokio::sync::mpsc::{self, error::TrySendError};

/// Events a connection may have queued before it is dropped as too slow
pub const EVENT_BUFFER: usize = 64;

/// Outbound event channel for one connection
pub type EventSender = mpsc::Sender<ServerEvent>;

/// Server-wide shared state
pub struct ServerState {
    pub registry: MatchRegistry,
    connections: RwLock<HashMap<ParticipantId, EventSender>>,
    next_participant: AtomicU64,
}

impl ServerState {
    pub fn new(registry: MatchRegistry) -> Self {
        Self {
            registry,
            connections: RwLock::new(HashMap::new()),
            next_participant: AtomicU64::new(1),
        }
    }

    /// Register a new connection and return its identity and event stream
    pub fn connect(&self) -> (ParticipantId, mpsc::Receiver<ServerEvent>) {
        let id = ParticipantId(self.next_participant.fetch_add(1, Ordering::Relaxed));
        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        self.connections
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, tx);
        tracing::info!(participant = %id, "client connected");
        (id, rx)
    }

    /// Forget a connection and notify anyone affected
    pub fn disconnect(&self, participant: ParticipantId) {
        self.connections
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&participant);
        self.registry
            .disconnect_with(participant, |deliveries| self.dispatch(deliveries));
        tracing::info!(%participant, "client disconnected");
    }

    /// Open connections
    pub fn connection_count(&self) -> usize {
        self.connections
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Parse one text frame and run it through the registry
    pub fn handle_text(&self, participant: ParticipantId, text: &str) {
        match serde_json::from_str::<ClientIntent>(text) {
            Ok(intent) => self
                .registry
                .handle_with(participant, intent, |deliveries| self.dispatch(deliveries)),
            Err(err) => {
                tracing::debug!(%participant, error = %err, "malformed message");
                self.dispatch(vec![Delivery::new(participant, ServerEvent::malformed(err))]);
            }
        }
    }

    /// Push events to their connections without blocking
    ///
    /// A connection whose buffer is full loses its sender; its socket task
    /// then sees the stream end and disconnects through the registry.
    pub fn dispatch(&self, deliveries: Vec<Delivery>) {
        let mut overflowed: Vec<ParticipantId> = Vec::new();
        {
            let connections = self
                .connections
                .read()
                .unwrap_or_else(PoisonError::into_inner);
            for Delivery { to, event } in deliveries {
                if overflowed.contains(&to) {
                    continue;
                }
                let Some(tx) = connections.get(&to) else {
                    tracing::debug!(participant = %to, "no connection for delivery");
                    continue;
                };
                match tx.try_send(event) {
                    Ok(()) => {}
                    Err(TrySendError::Full(_)) => overflowed.push(to),
                    Err(TrySendError::Closed(_)) => {
                        tracing::debug!(participant = %to, "connection closed before delivery");
                    }
                }
            }
        }

        if overflowed.is_empty() {
            return;
        }
        let mut connections = self
            .connections
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        for participant in overflowed {
            connections.remove(&participant);
            tracing::warn!(%participant, "event buffer full, dropping slow client");
        }
    }
}

impl Default for ServerState {
    fn default() -> Self {
        Self::new(MatchRegistry::default())
    }
}
