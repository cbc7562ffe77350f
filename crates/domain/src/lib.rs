//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod domain_expr;
mod literal;
mod security;
mod vacuum_rule;
mod view_patch;

pub use domain_expr::{DomainExpression, DomainOperator, DomainTerm};
pub use literal::{DictEntry, ExpressionLiteral};
pub use security::{AuditAction, Permission};
pub use vacuum_rule::{
    DEFAULT_RETENTION_DAYS, MessageCategory, VacuumRule, VacuumRuleInput, VacuumTarget,
};
pub use view_patch::{
    AttributeOperation, AttributePatch, OLD_VALUE_PLACEHOLDER, apply_attribute_patches,
};
