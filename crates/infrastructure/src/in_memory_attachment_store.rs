//! In-memory attachment store for tests and development hosts.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use solvane_application::AttachmentVacuumSource;
use solvane_core::{AppResult, CompanyId};
use solvane_domain::VacuumRule;
use tokio::sync::RwLock;
use tracing::info;

/// One attachment row held by the in-memory store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredAttachment {
    /// Stable attachment identifier.
    pub id: String,
    /// File name of the attachment.
    pub filename: String,
    /// Model of the record the attachment is linked to, when linked.
    pub linked_model: Option<String>,
    /// Model owning the attachment through storage delegation, when owned.
    pub owner_model: Option<String>,
    /// Company owning the attachment, when scoped.
    pub company_id: Option<CompanyId>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// In-memory attachment store implementation.
#[derive(Debug, Default)]
pub struct InMemoryAttachmentStore {
    attachments: RwLock<Vec<StoredAttachment>>,
}

impl InMemoryAttachmentStore {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            attachments: RwLock::new(Vec::new()),
        }
    }

    /// Adds one attachment row.
    pub async fn add_attachment(&self, attachment: StoredAttachment) {
        self.attachments.write().await.push(attachment);
    }

    /// Returns all stored attachments.
    pub async fn attachments(&self) -> Vec<StoredAttachment> {
        self.attachments.read().await.clone()
    }
}

#[async_trait]
impl AttachmentVacuumSource for InMemoryAttachmentStore {
    async fn find_expired_attachments(
        &self,
        rule: &VacuumRule,
        cutoff: DateTime<Utc>,
    ) -> AppResult<Vec<String>> {
        let attachments = self.attachments.read().await;

        Ok(attachments
            .iter()
            .filter(|attachment| attachment_is_covered(rule, attachment, cutoff))
            .map(|attachment| attachment.id.clone())
            .collect())
    }

    async fn delete_attachments(&self, attachment_ids: &[String]) -> AppResult<usize> {
        let mut attachments = self.attachments.write().await;

        let before = attachments.len();
        attachments.retain(|attachment| !attachment_ids.contains(&attachment.id));
        let deleted = before - attachments.len();

        info!(deleted = deleted, "removed expired attachments from store");
        Ok(deleted)
    }
}

fn attachment_is_covered(
    rule: &VacuumRule,
    attachment: &StoredAttachment,
    cutoff: DateTime<Utc>,
) -> bool {
    if attachment.created_at >= cutoff {
        return false;
    }

    if let Some(company_id) = rule.company_id()
        && attachment.company_id != Some(company_id)
    {
        return false;
    }

    if let Some(pattern) = rule.filename_pattern()
        && !attachment.filename.contains(pattern.as_str())
    {
        return false;
    }

    if let Some(owner) = rule.inheriting_model()
        && attachment.owner_model.as_deref() != Some(owner.as_str())
    {
        return false;
    }

    match attachment.linked_model.as_deref() {
        Some(model) => {
            rule.target_models().is_empty()
                || rule
                    .target_models()
                    .iter()
                    .any(|target| target.as_str() == model)
        }
        None => rule.include_unlinked_attachments(),
    }
}
