//! In-memory message store for tests and development hosts. Rule record
//! filters are not interpreted here; hosts with a query engine apply them
//! when selecting records.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use solvane_application::MessageVacuumSource;
use solvane_core::{AppResult, CompanyId};
use solvane_domain::{MessageCategory, VacuumRule};
use tokio::sync::RwLock;
use tracing::info;

/// One message row held by the in-memory store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredMessage {
    /// Stable message identifier.
    pub id: String,
    /// Model of the record the message belongs to, when attached.
    pub model: Option<String>,
    /// Subtype label, when the message has one.
    pub subtype: Option<String>,
    /// Category classifying how the message was produced.
    pub category: MessageCategory,
    /// Company owning the message, when scoped.
    pub company_id: Option<CompanyId>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// In-memory message store implementation.
#[derive(Debug, Default)]
pub struct InMemoryMessageStore {
    messages: RwLock<Vec<StoredMessage>>,
}

impl InMemoryMessageStore {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            messages: RwLock::new(Vec::new()),
        }
    }

    /// Adds one message row.
    pub async fn add_message(&self, message: StoredMessage) {
        self.messages.write().await.push(message);
    }

    /// Returns all stored messages.
    pub async fn messages(&self) -> Vec<StoredMessage> {
        self.messages.read().await.clone()
    }
}

#[async_trait]
impl MessageVacuumSource for InMemoryMessageStore {
    async fn find_expired_messages(
        &self,
        rule: &VacuumRule,
        cutoff: DateTime<Utc>,
    ) -> AppResult<Vec<String>> {
        let messages = self.messages.read().await;

        Ok(messages
            .iter()
            .filter(|message| message_is_covered(rule, message, cutoff))
            .map(|message| message.id.clone())
            .collect())
    }

    async fn delete_messages(&self, message_ids: &[String]) -> AppResult<usize> {
        let mut messages = self.messages.write().await;

        let before = messages.len();
        messages.retain(|message| !message_ids.contains(&message.id));
        let deleted = before - messages.len();

        info!(deleted = deleted, "removed expired messages from store");
        Ok(deleted)
    }
}

fn message_is_covered(rule: &VacuumRule, message: &StoredMessage, cutoff: DateTime<Utc>) -> bool {
    if message.created_at >= cutoff {
        return false;
    }

    if let Some(company_id) = rule.company_id()
        && message.company_id != Some(company_id)
    {
        return false;
    }

    if !rule.target_models().is_empty() {
        let covered_model = message.model.as_deref().is_some_and(|model| {
            rule.target_models()
                .iter()
                .any(|target| target.as_str() == model)
        });
        if !covered_model {
            return false;
        }
    }

    if rule.message_category() != MessageCategory::All
        && message.category != rule.message_category()
    {
        return false;
    }

    subtype_is_covered(rule, message.subtype.as_deref())
}

fn subtype_is_covered(rule: &VacuumRule, subtype: Option<&str>) -> bool {
    let covered_subtypes = rule.message_subtypes();

    match subtype {
        Some(subtype) => {
            if covered_subtypes.is_empty() {
                // An empty subtype set with the untyped flag covers only
                // messages without a subtype.
                !rule.include_untyped_messages()
            } else {
                covered_subtypes
                    .iter()
                    .any(|covered| covered.as_str() == subtype)
            }
        }
        None => rule.include_untyped_messages() || covered_subtypes.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use solvane_application::MessageVacuumSource;
    use solvane_core::CompanyId;
    use solvane_domain::{MessageCategory, VacuumRule, VacuumRuleInput, VacuumTarget};

    use super::{InMemoryMessageStore, StoredMessage};

    fn rule(input: VacuumRuleInput) -> VacuumRule {
        VacuumRule::new("expired messages", input).unwrap_or_else(|_| unreachable!())
    }

    fn message_input() -> VacuumRuleInput {
        VacuumRuleInput {
            target: VacuumTarget::Message,
            retention_days: 30,
            filename_pattern: None,
            inheriting_model: None,
            company_id: None,
            message_subtypes: Vec::new(),
            include_untyped_messages: false,
            target_models: Vec::new(),
            include_unlinked_attachments: false,
            message_category: MessageCategory::default(),
            record_filter: None,
            is_active: true,
            description: None,
        }
    }

    fn old_message(id: &str) -> StoredMessage {
        StoredMessage {
            id: id.to_owned(),
            model: None,
            subtype: None,
            category: MessageCategory::Comment,
            company_id: None,
            created_at: Utc::now() - Duration::days(90),
        }
    }

    #[tokio::test]
    async fn only_messages_before_the_cutoff_match() {
        let store = InMemoryMessageStore::new();
        store.add_message(old_message("msg-old")).await;
        store
            .add_message(StoredMessage {
                created_at: Utc::now(),
                ..old_message("msg-new")
            })
            .await;

        let cutoff = Utc::now() - Duration::days(30);
        let matched = store
            .find_expired_messages(&rule(message_input()), cutoff)
            .await;
        assert_eq!(matched.unwrap_or_default(), vec!["msg-old".to_owned()]);
    }

    #[tokio::test]
    async fn model_filter_restricts_matches() {
        let store = InMemoryMessageStore::new();
        store
            .add_message(StoredMessage {
                model: Some("crm.lead".to_owned()),
                ..old_message("msg-lead")
            })
            .await;
        store
            .add_message(StoredMessage {
                model: Some("sale.order".to_owned()),
                ..old_message("msg-order")
            })
            .await;
        store.add_message(old_message("msg-detached")).await;

        let scoped = rule(VacuumRuleInput {
            target_models: vec!["crm.lead".to_owned()],
            ..message_input()
        });
        let cutoff = Utc::now() - Duration::days(30);
        let matched = store.find_expired_messages(&scoped, cutoff).await;
        assert_eq!(matched.unwrap_or_default(), vec!["msg-lead".to_owned()]);
    }

    #[tokio::test]
    async fn subtype_set_and_untyped_flag_combine() {
        let store = InMemoryMessageStore::new();
        store
            .add_message(StoredMessage {
                subtype: Some("mail.mt_comment".to_owned()),
                ..old_message("msg-comment")
            })
            .await;
        store
            .add_message(StoredMessage {
                subtype: Some("mail.mt_note".to_owned()),
                ..old_message("msg-note")
            })
            .await;
        store.add_message(old_message("msg-untyped")).await;

        let cutoff = Utc::now() - Duration::days(30);

        let subtype_only = rule(VacuumRuleInput {
            message_subtypes: vec!["mail.mt_comment".to_owned()],
            ..message_input()
        });
        let matched = store.find_expired_messages(&subtype_only, cutoff).await;
        assert_eq!(matched.unwrap_or_default(), vec!["msg-comment".to_owned()]);

        let with_untyped = rule(VacuumRuleInput {
            message_subtypes: vec!["mail.mt_comment".to_owned()],
            include_untyped_messages: true,
            ..message_input()
        });
        let matched = store.find_expired_messages(&with_untyped, cutoff).await;
        assert_eq!(
            matched.unwrap_or_default(),
            vec!["msg-comment".to_owned(), "msg-untyped".to_owned()]
        );

        let untyped_only = rule(VacuumRuleInput {
            include_untyped_messages: true,
            ..message_input()
        });
        let matched = store.find_expired_messages(&untyped_only, cutoff).await;
        assert_eq!(matched.unwrap_or_default(), vec!["msg-untyped".to_owned()]);
    }

    #[tokio::test]
    async fn category_filter_applies_unless_all() {
        let store = InMemoryMessageStore::new();
        store
            .add_message(StoredMessage {
                category: MessageCategory::Email,
                ..old_message("msg-email")
            })
            .await;
        store
            .add_message(StoredMessage {
                category: MessageCategory::Notification,
                ..old_message("msg-notice")
            })
            .await;

        let cutoff = Utc::now() - Duration::days(30);

        let email_rule = rule(VacuumRuleInput {
            message_category: MessageCategory::Email,
            ..message_input()
        });
        let matched = store.find_expired_messages(&email_rule, cutoff).await;
        assert_eq!(matched.unwrap_or_default(), vec!["msg-email".to_owned()]);

        let all_rule = rule(message_input());
        let matched = store.find_expired_messages(&all_rule, cutoff).await;
        assert_eq!(matched.unwrap_or_default().len(), 2);
    }

    #[tokio::test]
    async fn company_scope_excludes_other_companies() {
        let company_id = CompanyId::new();
        let store = InMemoryMessageStore::new();
        store
            .add_message(StoredMessage {
                company_id: Some(company_id),
                ..old_message("msg-scoped")
            })
            .await;
        store
            .add_message(StoredMessage {
                company_id: Some(CompanyId::new()),
                ..old_message("msg-other")
            })
            .await;
        store.add_message(old_message("msg-unscoped")).await;

        let scoped = rule(VacuumRuleInput {
            company_id: Some(company_id),
            ..message_input()
        });
        let cutoff = Utc::now() - Duration::days(30);
        let matched = store.find_expired_messages(&scoped, cutoff).await;
        assert_eq!(matched.unwrap_or_default(), vec!["msg-scoped".to_owned()]);
    }

    #[tokio::test]
    async fn delete_removes_only_identified_messages() {
        let store = InMemoryMessageStore::new();
        store.add_message(old_message("msg-1")).await;
        store.add_message(old_message("msg-2")).await;
        store.add_message(old_message("msg-3")).await;

        let deleted = store
            .delete_messages(&["msg-1".to_owned(), "msg-3".to_owned()])
            .await;
        assert_eq!(deleted.unwrap_or_default(), 2);

        let remaining = store.messages().await;
        let ids: Vec<&str> = remaining.iter().map(|message| message.id.as_str()).collect();
        assert_eq!(ids, ["msg-2"]);
    }
}
