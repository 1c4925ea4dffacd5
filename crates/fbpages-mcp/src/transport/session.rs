//! Session registry for the Streamable HTTP transport.
//!
//! Each session owns its own [`McpServer`] (and therefore its own credential).
//! The registry is the only shared mutable state in the process; every
//! read-then-write happens under a single write guard.

use crate::server::McpServer;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use uuid::Uuid;

/// Session lookup errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    /// No `mcp-session-id` header was sent.
    #[error("missing session ID")]
    Missing,

    /// The session ID is not registered.
    #[error("unknown session ID: {0}")]
    Unknown(String),
}

/// A live HTTP session.
#[derive(Debug)]
pub struct Session {
    /// Session ID (UUID v4)
    pub id: String,

    /// Server bound to this session's credential
    pub server: McpServer,

    /// Creation time
    pub created_at: DateTime<Utc>,

    /// Cancelled when the session closes
    closed: CancellationToken,
}

impl Session {
    /// Token that fires when the session closes.
    pub fn closed(&self) -> CancellationToken {
        self.closed.clone()
    }

    /// Whether the session has been closed.
    pub fn is_closed(&self) -> bool {
        self.closed.is_cancelled()
    }

    fn close(&self) {
        self.closed.cancel();
    }
}

/// Registry of live sessions, keyed by ID.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, Arc<Session>>>,
}

impl SessionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new session around `server` under a fresh ID.
    pub async fn create(&self, server: McpServer) -> Arc<Session> {
        let mut sessions = self.sessions.write().await;

        let mut id = Uuid::new_v4().to_string();
        while sessions.contains_key(&id) {
            id = Uuid::new_v4().to_string();
        }

        let session = Arc::new(Session {
            id: id.clone(),
            server,
            created_at: Utc::now(),
            closed: CancellationToken::new(),
        });
        sessions.insert(id, Arc::clone(&session));

        info!(session_id = %session.id, active = sessions.len(), "Session created");
        session
    }

    /// Look up a live session.
    pub async fn get(&self, id: &str) -> Option<Arc<Session>> {
        self.sessions.read().await.get(id).cloned()
    }

    /// Look up a session from an optional header value.
    pub async fn resolve(&self, id: Option<&str>) -> Result<Arc<Session>, SessionError> {
        let id = id.ok_or(SessionError::Missing)?;
        self.get(id)
            .await
            .ok_or_else(|| SessionError::Unknown(id.to_string()))
    }

    /// Remove a session without signalling closure.
    pub async fn remove(&self, id: &str) -> Option<Arc<Session>> {
        self.sessions.write().await.remove(id)
    }

    /// Remove a session and signal closure. Returns whether it existed.
    pub async fn close(&self, id: &str) -> bool {
        match self.remove(id).await {
            Some(session) => {
                session.close();
                info!(session_id = %id, "Session closed");
                true
            }
            None => false,
        }
    }

    /// Close every session. Returns how many were closed.
    pub async fn close_all(&self) -> usize {
        let drained: Vec<Arc<Session>> = {
            let mut sessions = self.sessions.write().await;
            sessions.drain().map(|(_, session)| session).collect()
        };

        for session in &drained {
            session.close();
            debug!(session_id = %session.id, "Session closed on shutdown");
        }

        if !drained.is_empty() {
            info!(count = drained.len(), "Closed all sessions");
        }
        drained.len()
    }

    /// Number of live sessions.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Whether there are no live sessions.
    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ToolCatalog;

    fn server() -> McpServer {
        McpServer::new(Arc::new(ToolCatalog::new(Vec::new())), None)
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let registry = SessionRegistry::new();
        let session = registry.create(server()).await;

        assert!(Uuid::parse_str(&session.id).is_ok());
        let found = registry.get(&session.id).await.unwrap();
        assert!(Arc::ptr_eq(&session, &found));
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn test_ids_are_distinct() {
        let registry = SessionRegistry::new();
        let a = registry.create(server()).await;
        let b = registry.create(server()).await;
        assert_ne!(a.id, b.id);
        assert_eq!(registry.len().await, 2);
    }

    #[tokio::test]
    async fn test_resolve_errors() {
        let registry = SessionRegistry::new();
        assert_eq!(registry.resolve(None).await.unwrap_err(), SessionError::Missing);
        assert_eq!(
            registry.resolve(Some("nope")).await.unwrap_err(),
            SessionError::Unknown("nope".to_string())
        );
    }

    #[tokio::test]
    async fn test_close_signals_and_removes() {
        let registry = SessionRegistry::new();
        let session = registry.create(server()).await;
        let closed = session.closed();

        assert!(registry.close(&session.id).await);
        assert!(closed.is_cancelled());
        assert!(registry.get(&session.id).await.is_none());
        assert!(!registry.close(&session.id).await);
    }

    #[tokio::test]
    async fn test_close_all() {
        let registry = SessionRegistry::new();
        let a = registry.create(server()).await;
        let b = registry.create(server()).await;

        assert_eq!(registry.close_all().await, 2);
        assert!(a.is_closed() && b.is_closed());
        assert!(registry.is_empty().await);
        assert_eq!(registry.close_all().await, 0);
    }
}
