use std::str::FromStr;

use serde::{Deserialize, Serialize};
use solvane_core::AppError;

/// Permissions enforced by application policy checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    /// Allows reading vacuum rule definitions.
    VacuumRuleRead,
    /// Allows creating, editing, and deleting vacuum rules.
    VacuumRuleManage,
    /// Allows resolving targets and running vacuum sweeps.
    VacuumExecute,
}

impl Permission {
    /// Returns a stable storage value for this permission.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::VacuumRuleRead => "vacuum.rule.read",
            Self::VacuumRuleManage => "vacuum.rule.manage",
            Self::VacuumExecute => "vacuum.execute",
        }
    }

    /// Returns all known permissions.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[Permission] = &[
            Permission::VacuumRuleRead,
            Permission::VacuumRuleManage,
            Permission::VacuumExecute,
        ];

        ALL
    }
}

impl FromStr for Permission {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "vacuum.rule.read" => Ok(Self::VacuumRuleRead),
            "vacuum.rule.manage" => Ok(Self::VacuumRuleManage),
            "vacuum.execute" => Ok(Self::VacuumExecute),
            _ => Err(AppError::Validation(format!(
                "unknown permission value '{value}'"
            ))),
        }
    }
}

/// Stable audit actions emitted by application use-cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// Emitted when a vacuum rule is created or updated.
    VacuumRuleSaved,
    /// Emitted when a vacuum rule is deleted.
    VacuumRuleDeleted,
    /// Emitted when a vacuum sweep deletes records for a rule.
    VacuumExecuted,
}

impl AuditAction {
    /// Returns a stable storage value for this action.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::VacuumRuleSaved => "vacuum.rule.saved",
            Self::VacuumRuleDeleted => "vacuum.rule.deleted",
            Self::VacuumExecuted => "vacuum.executed",
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::Permission;

    #[test]
    fn permission_roundtrip_storage_value() {
        let permission = Permission::VacuumRuleManage;
        let restored = Permission::from_str(permission.as_str());
        assert!(restored.is_ok());
        assert_eq!(restored.unwrap_or(Permission::VacuumRuleRead), permission);
    }

    #[test]
    fn unknown_permission_is_rejected() {
        let parsed = Permission::from_str("vacuum.rule.unknown");
        assert!(parsed.is_err());
    }
}
