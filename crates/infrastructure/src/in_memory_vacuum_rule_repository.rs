use std::collections::HashMap;

use async_trait::async_trait;
use solvane_application::VacuumRuleRepository;
use solvane_core::{AppError, AppResult};
use solvane_domain::VacuumRule;
use tokio::sync::RwLock;

/// In-memory vacuum rule repository implementation.
#[derive(Debug, Default)]
pub struct InMemoryVacuumRuleRepository {
    rules: RwLock<HashMap<String, VacuumRule>>,
}

impl InMemoryVacuumRuleRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rules: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl VacuumRuleRepository for InMemoryVacuumRuleRepository {
    async fn save_rule(&self, rule: VacuumRule) -> AppResult<()> {
        self.rules
            .write()
            .await
            .insert(rule.name().as_str().to_owned(), rule);
        Ok(())
    }

    async fn list_rules(&self) -> AppResult<Vec<VacuumRule>> {
        let rules = self.rules.read().await;

        let mut values: Vec<VacuumRule> = rules.values().cloned().collect();
        values.sort_by(|left, right| left.name().as_str().cmp(right.name().as_str()));
        Ok(values)
    }

    async fn find_rule(&self, name: &str) -> AppResult<Option<VacuumRule>> {
        Ok(self.rules.read().await.get(name).cloned())
    }

    async fn delete_rule(&self, name: &str) -> AppResult<()> {
        let mut rules = self.rules.write().await;

        if rules.remove(name).is_none() {
            return Err(AppError::NotFound(format!(
                "vacuum rule '{name}' does not exist"
            )));
        }

        Ok(())
    }
}
