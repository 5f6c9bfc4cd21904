pub mod audit;
pub mod config;
pub mod dialog;
pub mod domain;
pub mod errors;
pub mod format;

pub use audit::{AuditCategory, AuditContext, AuditEvent, AuditOutcome, AuditSink};
pub use config::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};
pub use dialog::{
    Card, DialogAction, DialogController, DialogError, DialogIntent, DialogOutcome, DialogState,
};
pub use domain::booking::{BookingField, BookingRequest, SessionState, TurnInput};
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use format::{ReferenceDay, SpeechFormatter};
