use async_trait::async_trait;
use chrono::{DateTime, Utc};
use solvane_core::AppResult;
use solvane_domain::{AuditAction, VacuumRule, VacuumTarget};

/// Immutable audit event payload emitted by application services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEvent {
    /// Subject that performed the action.
    pub subject: String,
    /// Stable audit action identifier.
    pub action: AuditAction,
    /// Resource type label.
    pub resource_type: String,
    /// Resource identifier.
    pub resource_id: String,
    /// Optional audit detail payload.
    pub detail: Option<String>,
}

/// Port for persisting append-only audit events.
#[async_trait]
pub trait AuditRepository: Send + Sync {
    /// Persists one audit event.
    async fn append_event(&self, event: AuditEvent) -> AppResult<()>;
}

/// Port for persisting vacuum rules.
#[async_trait]
pub trait VacuumRuleRepository: Send + Sync {
    /// Persists one rule under its name, replacing any previous definition.
    async fn save_rule(&self, rule: VacuumRule) -> AppResult<()>;

    /// Lists rules ordered by name.
    async fn list_rules(&self) -> AppResult<Vec<VacuumRule>>;

    /// Finds one rule by name.
    async fn find_rule(&self, name: &str) -> AppResult<Option<VacuumRule>>;

    /// Deletes one rule by name.
    async fn delete_rule(&self, name: &str) -> AppResult<()>;
}

/// Port over the host's message store for rule-driven sweeps.
#[async_trait]
pub trait MessageVacuumSource: Send + Sync {
    /// Lists identifiers of messages covered by the rule and created
    /// strictly before the cutoff.
    async fn find_expired_messages(
        &self,
        rule: &VacuumRule,
        cutoff: DateTime<Utc>,
    ) -> AppResult<Vec<String>>;

    /// Deletes the identified messages and returns how many were removed.
    async fn delete_messages(&self, message_ids: &[String]) -> AppResult<usize>;
}

/// Port over the host's attachment store for rule-driven sweeps.
#[async_trait]
pub trait AttachmentVacuumSource: Send + Sync {
    /// Lists identifiers of attachments covered by the rule and created
    /// strictly before the cutoff.
    async fn find_expired_attachments(
        &self,
        rule: &VacuumRule,
        cutoff: DateTime<Utc>,
    ) -> AppResult<Vec<String>>;

    /// Deletes the identified attachments and returns how many were removed.
    async fn delete_attachments(&self, attachment_ids: &[String]) -> AppResult<usize>;
}

/// Port describing the models installed on the host.
#[async_trait]
pub trait ModelRegistry: Send + Sync {
    /// Returns whether a model name is installed.
    async fn model_exists(&self, model: &str) -> AppResult<bool>;

    /// Returns the field through which a model delegates its storage to
    /// attachments, when such delegation exists.
    async fn attachment_delegation_field(&self, model: &str) -> AppResult<Option<String>>;
}

/// Outcome of one rule execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VacuumRunReport {
    /// Name of the rule that ran.
    pub rule_name: String,
    /// Swept record kind.
    pub target: VacuumTarget,
    /// Records covered by the rule at execution time.
    pub matched: usize,
    /// Records actually deleted.
    pub deleted: usize,
}
