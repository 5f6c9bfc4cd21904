//! Voice platform adapter for the sitter request dialog.
//!
//! - **Envelope** (`envelope`) - typed request model: session metadata, launch, intent and
//!   session-ended requests
//! - **Response** (`response`) - speech/reprompt/card envelope builders
//! - **Skill** (`skill`) - application id check, request dispatch and fail-closed execution
//!
//! # Architecture
//!
//! ```text
//! Platform JSON → RequestEnvelope → SitterfiedSkill → DialogController
//!                                          ↓
//!                          ResponseEnvelope ← DialogAction + SessionState
//! ```

pub mod envelope;
pub mod response;
pub mod skill;

pub use envelope::{IntentRequest, PlatformRequest, RequestEnvelope, SessionEndedRequest};
pub use response::ResponseEnvelope;
pub use skill::{SitterfiedSkill, SkillError, TracingAuditSink};
