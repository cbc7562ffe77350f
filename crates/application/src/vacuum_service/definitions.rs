use super::*;

impl VacuumService {
    /// Saves one vacuum rule under its name.
    ///
    /// Models referenced by the rule are checked against the host's model
    /// registry before the rule is persisted.
    pub async fn save_rule(
        &self,
        actor: &UserIdentity,
        name: &str,
        input: VacuumRuleInput,
    ) -> AppResult<VacuumRule> {
        self.require_rule_manage(actor).await?;

        let rule = VacuumRule::new(name, input)?;

        for model in rule.target_models() {
            if !self.model_registry.model_exists(model.as_str()).await? {
                return Err(AppError::Validation(format!(
                    "unknown model '{}'",
                    model.as_str()
                )));
            }
        }

        if let Some(model) = rule.inheriting_model() {
            if !self.model_registry.model_exists(model.as_str()).await? {
                return Err(AppError::Validation(format!(
                    "unknown model '{}'",
                    model.as_str()
                )));
            }

            let delegation_field = self
                .model_registry
                .attachment_delegation_field(model.as_str())
                .await?;
            if delegation_field.is_none() {
                return Err(AppError::Validation(format!(
                    "model '{}' does not delegate to attachments",
                    model.as_str()
                )));
            }
        }

        self.repository.save_rule(rule.clone()).await?;

        self.audit_repository
            .append_event(AuditEvent {
                subject: actor.subject().to_owned(),
                action: AuditAction::VacuumRuleSaved,
                resource_type: "vacuum_rule".to_owned(),
                resource_id: rule.name().as_str().to_owned(),
                detail: Some(format!(
                    "saved rule '{}' sweeping {}s older than {} day(s)",
                    rule.name().as_str(),
                    rule.target().as_str(),
                    rule.retention_days()
                )),
            })
            .await?;

        Ok(rule)
    }

    /// Lists vacuum rules ordered by name.
    pub async fn list_rules(&self, actor: &UserIdentity) -> AppResult<Vec<VacuumRule>> {
        self.require_rule_read(actor).await?;
        self.repository.list_rules().await
    }

    /// Finds one vacuum rule by name.
    pub async fn find_rule(&self, actor: &UserIdentity, name: &str) -> AppResult<VacuumRule> {
        self.require_rule_read(actor).await?;

        self.repository
            .find_rule(name)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("vacuum rule '{name}' does not exist")))
    }

    /// Deletes one vacuum rule by name.
    pub async fn delete_rule(&self, actor: &UserIdentity, name: &str) -> AppResult<()> {
        self.require_rule_manage(actor).await?;
        self.repository.delete_rule(name).await?;

        self.audit_repository
            .append_event(AuditEvent {
                subject: actor.subject().to_owned(),
                action: AuditAction::VacuumRuleDeleted,
                resource_type: "vacuum_rule".to_owned(),
                resource_id: name.to_owned(),
                detail: None,
            })
            .await
    }

    pub(super) async fn require_rule_manage(&self, actor: &UserIdentity) -> AppResult<()> {
        self.authorization_service
            .require_permission(actor.subject(), Permission::VacuumRuleManage)
            .await
    }

    pub(super) async fn require_rule_read(&self, actor: &UserIdentity) -> AppResult<()> {
        self.authorization_service
            .require_permission(actor.subject(), Permission::VacuumRuleRead)
            .await
    }
}
