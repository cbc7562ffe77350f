//! In-memory audit log for tests and development hosts. Events are also
//! mirrored to tracing output.

use async_trait::async_trait;
use solvane_application::{AuditEvent, AuditRepository};
use solvane_core::AppResult;
use tokio::sync::RwLock;
use tracing::info;

/// In-memory audit log implementation.
#[derive(Debug, Default)]
pub struct InMemoryAuditLog {
    events: RwLock<Vec<AuditEvent>>,
}

impl InMemoryAuditLog {
    /// Creates an empty in-memory audit log.
    #[must_use]
    pub fn new() -> Self {
        Self {
            events: RwLock::new(Vec::new()),
        }
    }

    /// Returns all recorded events in append order.
    pub async fn events(&self) -> Vec<AuditEvent> {
        self.events.read().await.clone()
    }
}

#[async_trait]
impl AuditRepository for InMemoryAuditLog {
    async fn append_event(&self, event: AuditEvent) -> AppResult<()> {
        info!(
            subject = event.subject,
            action = event.action.as_str(),
            resource_type = event.resource_type,
            resource_id = event.resource_id,
            "recorded audit event"
        );

        self.events.write().await.push(event);
        Ok(())
    }
}
