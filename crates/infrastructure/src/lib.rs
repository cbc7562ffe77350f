//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod in_memory_attachment_store;
mod in_memory_audit_log;
mod in_memory_authorization_repository;
mod in_memory_message_store;
mod in_memory_model_registry;
mod in_memory_vacuum_rule_repository;

pub use in_memory_attachment_store::{InMemoryAttachmentStore, StoredAttachment};
pub use in_memory_audit_log::InMemoryAuditLog;
pub use in_memory_authorization_repository::InMemoryAuthorizationRepository;
pub use in_memory_message_store::{InMemoryMessageStore, StoredMessage};
pub use in_memory_model_registry::InMemoryModelRegistry;
pub use in_memory_vacuum_rule_repository::InMemoryVacuumRuleRepository;
