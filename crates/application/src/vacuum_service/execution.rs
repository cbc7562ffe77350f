use super::*;

impl VacuumService {
    /// Lists identifiers the rule would delete right now, without deleting.
    pub async fn resolve_rule_targets(
        &self,
        actor: &UserIdentity,
        name: &str,
    ) -> AppResult<Vec<String>> {
        self.require_rule_read(actor).await?;

        let rule = self
            .repository
            .find_rule(name)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("vacuum rule '{name}' does not exist")))?;

        self.find_expired_records(&rule).await
    }

    /// Executes one rule by name and reports what was deleted.
    pub async fn run_rule(&self, actor: &UserIdentity, name: &str) -> AppResult<VacuumRunReport> {
        self.require_vacuum_execute(actor).await?;

        let rule = self
            .repository
            .find_rule(name)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("vacuum rule '{name}' does not exist")))?;

        if !rule.is_active() {
            return Err(AppError::Validation(format!(
                "vacuum rule '{name}' is not active"
            )));
        }

        self.sweep(actor, &rule).await
    }

    /// Executes every active rule, ordered by rule name.
    pub async fn run_active_rules(&self, actor: &UserIdentity) -> AppResult<Vec<VacuumRunReport>> {
        self.require_vacuum_execute(actor).await?;

        let mut reports = Vec::new();
        for rule in self.repository.list_rules().await? {
            if !rule.is_active() {
                continue;
            }
            reports.push(self.sweep(actor, &rule).await?);
        }

        Ok(reports)
    }

    async fn sweep(&self, actor: &UserIdentity, rule: &VacuumRule) -> AppResult<VacuumRunReport> {
        let record_ids = self.find_expired_records(rule).await?;

        let deleted = if record_ids.is_empty() {
            0
        } else {
            match rule.target() {
                VacuumTarget::Message => self.message_source.delete_messages(&record_ids).await?,
                VacuumTarget::Attachment => {
                    self.attachment_source.delete_attachments(&record_ids).await?
                }
            }
        };

        self.audit_repository
            .append_event(AuditEvent {
                subject: actor.subject().to_owned(),
                action: AuditAction::VacuumExecuted,
                resource_type: "vacuum_rule".to_owned(),
                resource_id: rule.name().as_str().to_owned(),
                detail: Some(format!(
                    "deleted {deleted} of {} expired {}(s)",
                    record_ids.len(),
                    rule.target().as_str()
                )),
            })
            .await?;

        Ok(VacuumRunReport {
            rule_name: rule.name().as_str().to_owned(),
            target: rule.target(),
            matched: record_ids.len(),
            deleted,
        })
    }

    async fn find_expired_records(&self, rule: &VacuumRule) -> AppResult<Vec<String>> {
        let cutoff = retention_cutoff(rule, Utc::now());

        match rule.target() {
            VacuumTarget::Message => self.message_source.find_expired_messages(rule, cutoff).await,
            VacuumTarget::Attachment => {
                self.attachment_source
                    .find_expired_attachments(rule, cutoff)
                    .await
            }
        }
    }

    pub(super) async fn require_vacuum_execute(&self, actor: &UserIdentity) -> AppResult<()> {
        self.authorization_service
            .require_permission(actor.subject(), Permission::VacuumExecute)
            .await
    }
}

/// Computes the creation-time cutoff below which the rule deletes records.
fn retention_cutoff(rule: &VacuumRule, now: DateTime<Utc>) -> DateTime<Utc> {
    now - Duration::days(i64::from(rule.retention_days()))
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use solvane_domain::{
        DEFAULT_RETENTION_DAYS, MessageCategory, VacuumRule, VacuumRuleInput, VacuumTarget,
    };

    use super::retention_cutoff;

    #[test]
    fn cutoff_subtracts_retention_days_from_now() {
        let rule = VacuumRule::new(
            "expired messages",
            VacuumRuleInput {
                target: VacuumTarget::Message,
                retention_days: DEFAULT_RETENTION_DAYS,
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
            },
        );
        let rule = rule.unwrap_or_else(|_| unreachable!());

        let now = Utc
            .with_ymd_and_hms(2026, 3, 1, 12, 0, 0)
            .single()
            .unwrap_or_default();
        let cutoff = retention_cutoff(&rule, now);
        let expected = Utc
            .with_ymd_and_hms(2025, 3, 1, 12, 0, 0)
            .single()
            .unwrap_or_default();
        assert_eq!(cutoff, expected);
    }
}
