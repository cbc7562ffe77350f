use std::collections::HashMap;

use async_trait::async_trait;
use solvane_application::AuthorizationRepository;
use solvane_core::AppResult;
use solvane_domain::Permission;
use tokio::sync::RwLock;

/// In-memory authorization repository implementation.
#[derive(Debug, Default)]
pub struct InMemoryAuthorizationRepository {
    grants: RwLock<HashMap<String, Vec<Permission>>>,
}

impl InMemoryAuthorizationRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self {
            grants: RwLock::new(HashMap::new()),
        }
    }

    /// Grants one permission to a subject.
    pub async fn grant(&self, subject: impl Into<String>, permission: Permission) {
        let mut grants = self.grants.write().await;
        let permissions = grants.entry(subject.into()).or_default();
        if !permissions.contains(&permission) {
            permissions.push(permission);
        }
    }
}

#[async_trait]
impl AuthorizationRepository for InMemoryAuthorizationRepository {
    async fn list_permissions_for_subject(&self, subject: &str) -> AppResult<Vec<Permission>> {
        Ok(self
            .grants
            .read()
            .await
            .get(subject)
            .cloned()
            .unwrap_or_default())
    }
}
