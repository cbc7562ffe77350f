use std::str::FromStr;

use serde::{Deserialize, Serialize};
use solvane_core::{AppError, AppResult, CompanyId, NonEmptyString};

use crate::domain_expr::DomainExpression;

/// Default retention period, in days, for newly configured rules.
pub const DEFAULT_RETENTION_DAYS: u32 = 365;

/// Record kind a vacuum rule sweeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VacuumTarget {
    /// Rule deletes old attachments.
    Attachment,
    /// Rule deletes old messages.
    Message,
}

impl VacuumTarget {
    /// Returns stable storage value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Attachment => "attachment",
            Self::Message => "message",
        }
    }
}

impl FromStr for VacuumTarget {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "attachment" => Ok(Self::Attachment),
            "message" => Ok(Self::Message),
            _ => Err(AppError::Validation(format!(
                "unknown vacuum target '{value}'"
            ))),
        }
    }
}

/// Message category filter for message rules.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageCategory {
    /// Incoming or outgoing email messages.
    Email,
    /// User comments.
    Comment,
    /// System notifications.
    Notification,
    /// Notifications addressed to one user.
    UserNotification,
    /// Every category, equivalent to no category filter.
    #[default]
    All,
}

impl MessageCategory {
    /// Returns stable storage value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Comment => "comment",
            Self::Notification => "notification",
            Self::UserNotification => "user_notification",
            Self::All => "all",
        }
    }
}

impl FromStr for MessageCategory {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "email" => Ok(Self::Email),
            "comment" => Ok(Self::Comment),
            "notification" => Ok(Self::Notification),
            "user_notification" => Ok(Self::UserNotification),
            "all" => Ok(Self::All),
            _ => Err(AppError::Validation(format!(
                "unknown message category '{value}'"
            ))),
        }
    }
}

/// Input payload for constructing one vacuum rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VacuumRuleInput {
    /// Record kind the rule sweeps.
    pub target: VacuumTarget,
    /// Days records are kept after creation.
    pub retention_days: u32,
    /// Optional substring attachments must carry in their filename.
    pub filename_pattern: Option<String>,
    /// Optional model delegating to attachments; restricts the sweep to
    /// attachments owned by that model.
    pub inheriting_model: Option<String>,
    /// Optional company scope.
    pub company_id: Option<CompanyId>,
    /// Message subtypes covered by the rule; empty covers every subtype.
    pub message_subtypes: Vec<String>,
    /// Whether messages without a subtype are covered too.
    pub include_untyped_messages: bool,
    /// Models covered by the rule; empty covers every model.
    pub target_models: Vec<String>,
    /// Whether attachments not linked to any record are covered too.
    pub include_unlinked_attachments: bool,
    /// Message category filter.
    pub message_category: MessageCategory,
    /// Optional domain filter on the targeted model's records.
    pub record_filter: Option<String>,
    /// Active state.
    pub is_active: bool,
    /// Optional free-form description.
    pub description: Option<String>,
}

/// Retention rule deciding which old messages or attachments get deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VacuumRule {
    name: NonEmptyString,
    target: VacuumTarget,
    retention_days: u32,
    filename_pattern: Option<NonEmptyString>,
    inheriting_model: Option<NonEmptyString>,
    company_id: Option<CompanyId>,
    message_subtypes: Vec<NonEmptyString>,
    include_untyped_messages: bool,
    target_models: Vec<NonEmptyString>,
    include_unlinked_attachments: bool,
    message_category: MessageCategory,
    record_filter: Option<String>,
    is_active: bool,
    description: Option<String>,
}

impl VacuumRule {
    /// Creates a validated vacuum rule.
    ///
    /// A configured record filter is parsed as a domain expression and
    /// stored in canonical form; blank filter text counts as no filter.
    pub fn new(name: impl Into<String>, input: VacuumRuleInput) -> AppResult<Self> {
        let VacuumRuleInput {
            target,
            retention_days,
            filename_pattern,
            inheriting_model,
            company_id,
            message_subtypes,
            include_untyped_messages,
            target_models,
            include_unlinked_attachments,
            message_category,
            record_filter,
            is_active,
            description,
        } = input;

        if retention_days == 0 {
            return Err(AppError::Validation(
                "retention_days must be greater than zero".to_owned(),
            ));
        }

        let filename_pattern = filename_pattern.map(NonEmptyString::new).transpose()?;
        let inheriting_model = inheriting_model.map(NonEmptyString::new).transpose()?;

        if inheriting_model.is_some() && target != VacuumTarget::Attachment {
            return Err(AppError::Validation(
                "inheriting_model is only allowed for attachment rules".to_owned(),
            ));
        }

        if include_unlinked_attachments
            && (target != VacuumTarget::Attachment || filename_pattern.is_none())
        {
            return Err(AppError::Validation(
                "include_unlinked_attachments requires an attachment rule with a filename_pattern"
                    .to_owned(),
            ));
        }

        let message_subtypes =
            unique_names(message_subtypes, |value| format!("duplicate message subtype '{value}'"))?;
        let target_models =
            unique_names(target_models, |value| format!("duplicate target model '{value}'"))?;

        let record_filter = match record_filter {
            Some(text) if !text.trim().is_empty() => {
                Some(DomainExpression::parse(&text)?.to_source())
            }
            _ => None,
        };

        Ok(Self {
            name: NonEmptyString::new(name)?,
            target,
            retention_days,
            filename_pattern,
            inheriting_model,
            company_id,
            message_subtypes,
            include_untyped_messages,
            target_models,
            include_unlinked_attachments,
            message_category,
            record_filter,
            is_active,
            description,
        })
    }

    /// Returns rule name.
    #[must_use]
    pub fn name(&self) -> &NonEmptyString {
        &self.name
    }

    /// Returns swept record kind.
    #[must_use]
    pub fn target(&self) -> VacuumTarget {
        self.target
    }

    /// Returns retention period in days.
    #[must_use]
    pub fn retention_days(&self) -> u32 {
        self.retention_days
    }

    /// Returns optional filename substring filter.
    #[must_use]
    pub fn filename_pattern(&self) -> Option<&NonEmptyString> {
        self.filename_pattern.as_ref()
    }

    /// Returns optional attachment-delegating model filter.
    #[must_use]
    pub fn inheriting_model(&self) -> Option<&NonEmptyString> {
        self.inheriting_model.as_ref()
    }

    /// Returns optional company scope.
    #[must_use]
    pub fn company_id(&self) -> Option<CompanyId> {
        self.company_id
    }

    /// Returns covered message subtypes; empty covers every subtype.
    #[must_use]
    pub fn message_subtypes(&self) -> &[NonEmptyString] {
        &self.message_subtypes
    }

    /// Returns whether messages without a subtype are covered.
    #[must_use]
    pub fn include_untyped_messages(&self) -> bool {
        self.include_untyped_messages
    }

    /// Returns covered models; empty covers every model.
    #[must_use]
    pub fn target_models(&self) -> &[NonEmptyString] {
        &self.target_models
    }

    /// Returns whether unlinked attachments are covered.
    #[must_use]
    pub fn include_unlinked_attachments(&self) -> bool {
        self.include_unlinked_attachments
    }

    /// Returns message category filter.
    #[must_use]
    pub fn message_category(&self) -> MessageCategory {
        self.message_category
    }

    /// Returns canonical record filter text, when configured.
    #[must_use]
    pub fn record_filter(&self) -> Option<&str> {
        self.record_filter.as_deref()
    }

    /// Returns active flag.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.is_active
    }

    /// Returns optional description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the single covered model when exactly one is configured.
    #[must_use]
    pub fn target_model(&self) -> Option<&NonEmptyString> {
        match self.target_models.as_slice() {
            [single] => Some(single),
            _ => None,
        }
    }
}

fn unique_names(
    values: Vec<String>,
    duplicate_message: impl Fn(&str) -> String,
) -> AppResult<Vec<NonEmptyString>> {
    let mut names: Vec<NonEmptyString> = Vec::with_capacity(values.len());

    for value in values {
        let name = NonEmptyString::new(value)?;
        if names.contains(&name) {
            return Err(AppError::Validation(duplicate_message(name.as_str())));
        }
        names.push(name);
    }

    Ok(names)
}
