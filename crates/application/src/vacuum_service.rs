use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use solvane_core::{AppError, AppResult, UserIdentity};
use solvane_domain::{AuditAction, Permission, VacuumRule, VacuumRuleInput, VacuumTarget};

use crate::authorization_service::AuthorizationService;
use crate::vacuum_ports::{
    AttachmentVacuumSource, AuditEvent, AuditRepository, MessageVacuumSource, ModelRegistry,
    VacuumRuleRepository, VacuumRunReport,
};

mod definitions;
mod execution;

/// Application service for configuring and executing vacuum rules.
#[derive(Clone)]
pub struct VacuumService {
    authorization_service: AuthorizationService,
    repository: Arc<dyn VacuumRuleRepository>,
    message_source: Arc<dyn MessageVacuumSource>,
    attachment_source: Arc<dyn AttachmentVacuumSource>,
    model_registry: Arc<dyn ModelRegistry>,
    audit_repository: Arc<dyn AuditRepository>,
}

impl VacuumService {
    /// Creates a vacuum service.
    #[must_use]
    pub fn new(
        authorization_service: AuthorizationService,
        repository: Arc<dyn VacuumRuleRepository>,
        message_source: Arc<dyn MessageVacuumSource>,
        attachment_source: Arc<dyn AttachmentVacuumSource>,
        model_registry: Arc<dyn ModelRegistry>,
        audit_repository: Arc<dyn AuditRepository>,
    ) -> Self {
        Self {
            authorization_service,
            repository,
            message_source,
            attachment_source,
            model_registry,
            audit_repository,
        }
    }
}
