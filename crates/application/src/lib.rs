//! Application services and ports.

#![forbid(unsafe_code)]

mod authorization_service;
mod vacuum_ports;
mod vacuum_service;

pub use authorization_service::{AuthorizationRepository, AuthorizationService};
pub use vacuum_ports::{
    AttachmentVacuumSource, AuditEvent, AuditRepository, MessageVacuumSource, ModelRegistry,
    VacuumRuleRepository, VacuumRunReport,
};
pub use vacuum_service::VacuumService;
