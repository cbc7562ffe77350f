use std::collections::HashMap;

use async_trait::async_trait;
use solvane_application::ModelRegistry;
use solvane_core::AppResult;
use tokio::sync::RwLock;

/// In-memory model registry implementation.
#[derive(Debug, Default)]
pub struct InMemoryModelRegistry {
    models: RwLock<HashMap<String, Option<String>>>,
}

impl InMemoryModelRegistry {
    /// Creates an empty in-memory registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            models: RwLock::new(HashMap::new()),
        }
    }

    /// Registers one installed model.
    pub async fn register_model(&self, model: impl Into<String>) {
        self.models.write().await.insert(model.into(), None);
    }

    /// Registers one installed model that delegates its storage to
    /// attachments through the given field.
    pub async fn register_delegating_model(
        &self,
        model: impl Into<String>,
        attachment_field: impl Into<String>,
    ) {
        self.models
            .write()
            .await
            .insert(model.into(), Some(attachment_field.into()));
    }
}

#[async_trait]
impl ModelRegistry for InMemoryModelRegistry {
    async fn model_exists(&self, model: &str) -> AppResult<bool> {
        Ok(self.models.read().await.contains_key(model))
    }

    async fn attachment_delegation_field(&self, model: &str) -> AppResult<Option<String>> {
        Ok(self.models.read().await.get(model).cloned().flatten())
    }
}

#[cfg(test)]
mod tests {
    use solvane_application::ModelRegistry;

    use super::InMemoryModelRegistry;

    #[tokio::test]
    async fn registered_models_are_visible() {
        let registry = InMemoryModelRegistry::new();
        registry.register_model("crm.lead").await;
        registry
            .register_delegating_model("product.document", "attachment_id")
            .await;

        assert!(registry.model_exists("crm.lead").await.unwrap_or(false));
        assert!(!registry.model_exists("unknown").await.unwrap_or(true));

        let field = registry.attachment_delegation_field("product.document").await;
        assert_eq!(field.unwrap_or_default(), Some("attachment_id".to_owned()));

        let none = registry.attachment_delegation_field("crm.lead").await;
        assert_eq!(none.unwrap_or_default(), None);
    }
}
