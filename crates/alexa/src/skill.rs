use sitterfied_core::audit::{AuditCategory, AuditContext, AuditEvent, AuditOutcome, AuditSink};
use sitterfied_core::config::SkillConfig;
use sitterfied_core::dialog::{DialogController, DialogError, DialogIntent};
use sitterfied_core::errors::ApplicationError;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::envelope::{
    IntentRequest, LaunchRequest, PlatformRequest, RequestEnvelope, SessionEndedRequest,
};
use crate::response::ResponseEnvelope;

const AUDIT_ACTOR: &str = "sitterfied-skill";

#[derive(Debug, Error)]
pub enum SkillError {
    #[error("malformed request envelope: {0}")]
    Payload(#[from] serde_json::Error),
    #[error("application id `{received}` does not match the configured skill")]
    ApplicationIdMismatch { received: String },
    #[error(transparent)]
    Dialog(#[from] DialogError),
}

impl From<SkillError> for ApplicationError {
    fn from(value: SkillError) -> Self {
        match value {
            SkillError::Payload(error) => Self::Payload(error.to_string()),
            error @ SkillError::ApplicationIdMismatch { .. } => Self::Unauthorized(error.to_string()),
            SkillError::Dialog(error) => error.into(),
        }
    }
}

/// Forwards audit events to the `tracing` subscriber.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn emit(&self, event: AuditEvent) {
        match event.outcome {
            AuditOutcome::Success => info!(
                event_name = event.event_type.as_str(),
                correlation_id = %event.correlation_id,
                session_id = ?event.session_id,
                actor = %event.actor,
                metadata = ?event.metadata,
                "audit event"
            ),
            AuditOutcome::Rejected | AuditOutcome::Failed => warn!(
                event_name = event.event_type.as_str(),
                correlation_id = %event.correlation_id,
                session_id = ?event.session_id,
                actor = %event.actor,
                outcome = ?event.outcome,
                metadata = ?event.metadata,
                "audit event"
            ),
        }
    }
}

/// The sitter request skill: validates where a request came from and routes it to the
/// dialog controller.
pub struct SitterfiedSkill<S = TracingAuditSink> {
    application_id: Option<String>,
    controller: DialogController,
    audit_sink: S,
}

impl SitterfiedSkill<TracingAuditSink> {
    pub fn new(application_id: Option<String>, controller: DialogController) -> Self {
        Self { application_id, controller, audit_sink: TracingAuditSink }
    }

    pub fn from_config(config: &SkillConfig) -> Self {
        let controller = DialogController::default()
            .with_session_ended_message(config.session_ended_message.clone());
        Self::new(config.application_id.clone(), controller)
    }
}

impl<S> SitterfiedSkill<S>
where
    S: AuditSink,
{
    pub fn with_audit_sink<T>(self, audit_sink: T) -> SitterfiedSkill<T>
    where
        T: AuditSink,
    {
        SitterfiedSkill {
            application_id: self.application_id,
            controller: self.controller,
            audit_sink,
        }
    }

    pub fn application_id(&self) -> Option<&str> {
        self.application_id.as_deref()
    }

    pub fn controller(&self) -> &DialogController {
        &self.controller
    }

    /// Runs one turn and fails closed: any error is logged and answered with nothing.
    pub fn execute(&self, raw: &str) -> Option<ResponseEnvelope> {
        match self.handle_json(raw) {
            Ok(response) => response,
            Err(err) => {
                error!(
                    event_name = "ingress.alexa.turn_failed",
                    error = %err,
                    "turn failed, ending conversation"
                );
                None
            }
        }
    }

    pub fn handle_json(&self, raw: &str) -> Result<Option<ResponseEnvelope>, SkillError> {
        let envelope = RequestEnvelope::from_json(raw)?;
        self.handle(&envelope)
    }

    /// `Ok(None)` means the platform expects no reply (session ended).
    pub fn handle(
        &self,
        envelope: &RequestEnvelope,
    ) -> Result<Option<ResponseEnvelope>, SkillError> {
        info!(
            event_name = "ingress.alexa.request_received",
            correlation_id = envelope.request_id(),
            session_id = envelope.session_id(),
            application_id = envelope.application_id(),
            request_type = envelope.request.kind(),
            "platform request received"
        );

        self.verify_application(envelope)?;

        if envelope.session.new {
            self.on_session_started(envelope);
        }

        match &envelope.request {
            PlatformRequest::Launch(request) => Ok(Some(self.on_launch(envelope, request))),
            PlatformRequest::Intent(request) => self.on_intent(envelope, request).map(Some),
            PlatformRequest::SessionEnded(request) => {
                self.on_session_ended(envelope, request);
                Ok(None)
            }
        }
    }

    fn verify_application(&self, envelope: &RequestEnvelope) -> Result<(), SkillError> {
        let Some(expected) = self.application_id.as_deref() else {
            return Ok(());
        };
        let received = envelope.application_id();
        if received == expected {
            return Ok(());
        }

        warn!(
            event_name = "ingress.alexa.application_rejected",
            correlation_id = envelope.request_id(),
            session_id = envelope.session_id(),
            received,
            expected,
            "application ids do not match"
        );
        self.audit_sink.emit(
            AuditEvent::new(
                &audit_context(envelope),
                "ingress.application_rejected",
                AuditCategory::Ingress,
                AuditOutcome::Rejected,
            )
            .with_metadata("received", received),
        );
        Err(SkillError::ApplicationIdMismatch { received: received.to_owned() })
    }

    fn on_session_started(&self, envelope: &RequestEnvelope) {
        info!(
            event_name = "dialog.session.started",
            correlation_id = envelope.request_id(),
            session_id = envelope.session_id(),
            "session started"
        );
        self.audit_sink.emit(AuditEvent::new(
            &audit_context(envelope),
            "session.started",
            AuditCategory::Session,
            AuditOutcome::Success,
        ));
    }

    fn on_launch(&self, envelope: &RequestEnvelope, request: &LaunchRequest) -> ResponseEnvelope {
        info!(
            event_name = "dialog.launch",
            correlation_id = %request.request_id,
            session_id = envelope.session_id(),
            "launch request"
        );
        ResponseEnvelope::from_action(&self.controller.greeting())
            .with_session(&envelope.session.booking_state())
    }

    fn on_intent(
        &self,
        envelope: &RequestEnvelope,
        request: &IntentRequest,
    ) -> Result<ResponseEnvelope, SkillError> {
        let audit = audit_context(envelope);
        let intent = match request.intent.name.parse::<DialogIntent>() {
            Ok(intent) => intent,
            Err(err) => {
                self.audit_sink.emit(
                    AuditEvent::new(
                        &audit,
                        "ingress.intent_unsupported",
                        AuditCategory::Ingress,
                        AuditOutcome::Failed,
                    )
                    .with_metadata("intent", request.intent.name.as_str()),
                );
                return Err(err.into());
            }
        };
        let input = request.turn_input();
        let mut session = envelope.session.booking_state();

        let outcome =
            self.controller.respond_with_audit(intent, &input, &mut session, &self.audit_sink, &audit);

        info!(
            event_name = "dialog.intent.handled",
            correlation_id = %request.request_id,
            session_id = envelope.session_id(),
            intent = intent.name(),
            state = outcome.state.map(|state| state.as_str()).unwrap_or("none"),
            action = outcome.action.kind(),
            "intent handled"
        );

        Ok(ResponseEnvelope::from_action(&outcome.action).with_session(&session))
    }

    fn on_session_ended(&self, envelope: &RequestEnvelope, request: &SessionEndedRequest) {
        info!(
            event_name = "dialog.session.ended",
            correlation_id = %request.request_id,
            session_id = envelope.session_id(),
            reason = request.reason.as_deref().unwrap_or("unspecified"),
            "session ended"
        );
        self.audit_sink.emit(
            AuditEvent::new(
                &audit_context(envelope),
                "session.ended",
                AuditCategory::Session,
                AuditOutcome::Success,
            )
            .with_metadata("reason", request.reason.as_deref().unwrap_or("unspecified")),
        );
    }
}

fn audit_context(envelope: &RequestEnvelope) -> AuditContext {
    AuditContext::new(
        Some(envelope.session_id().to_owned()),
        envelope.user_id().map(str::to_owned),
        envelope.request_id(),
        AUDIT_ACTOR,
    )
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use sitterfied_core::audit::{AuditCategory, AuditOutcome, InMemoryAuditSink};
    use sitterfied_core::config::SkillConfig;
    use sitterfied_core::dialog::DialogError;
    use sitterfied_core::errors::ApplicationError;

    use super::{SitterfiedSkill, SkillError};

    const APP_ID: &str = "amzn1.ask.skill.sitterfied-test";

    fn skill() -> SitterfiedSkill {
        SitterfiedSkill::from_config(&SkillConfig {
            application_id: Some(APP_ID.to_owned()),
            session_ended_message: "See you soon!".to_owned(),
        })
    }

    fn intent_event(application_id: &str, intent: &str) -> String {
        json!({
            "session": {
                "new": true,
                "sessionId": "session-1",
                "application": { "applicationId": application_id },
                "attributes": { "date": "2015-05-21" }
            },
            "request": {
                "type": "IntentRequest",
                "requestId": "request-1",
                "intent": { "name": intent }
            }
        })
        .to_string()
    }

    #[test]
    fn foreign_application_is_rejected() {
        let result = skill().handle_json(&intent_event("amzn1.ask.skill.other", "AMAZON.HelpIntent"));

        assert!(matches!(
            result,
            Err(SkillError::ApplicationIdMismatch { ref received }) if received == "amzn1.ask.skill.other"
        ));
    }

    #[test]
    fn unconfigured_application_id_accepts_any_caller() {
        let skill = SitterfiedSkill::from_config(&SkillConfig {
            application_id: None,
            session_ended_message: "See you soon!".to_owned(),
        });

        let response = skill
            .handle_json(&intent_event("amzn1.ask.skill.other", "AMAZON.HelpIntent"))
            .expect("turn should succeed")
            .expect("help should answer");
        assert!(!response.ends_session());
    }

    #[test]
    fn unsupported_intent_is_a_dialog_error_and_execute_fails_closed() {
        let skill = skill();
        let raw = intent_event(APP_ID, "BookTaxiIntent");

        let result = skill.handle_json(&raw);
        assert!(matches!(
            result,
            Err(SkillError::Dialog(DialogError::UnrecognizedIntent { ref name })) if name == "BookTaxiIntent"
        ));
        assert!(skill.execute(&raw).is_none());
    }

    #[test]
    fn cancel_uses_configured_farewell_and_drops_the_booking() {
        let response = skill()
            .handle_json(&intent_event(APP_ID, "AMAZON.CancelIntent"))
            .expect("turn should succeed")
            .expect("cancel should answer");

        assert!(response.ends_session());
        assert_eq!(response.speech(), Some("See you soon!"));
        assert!(response.session_attributes.is_empty());
    }

    #[test]
    fn slot_filling_turns_are_audited() {
        let sink = InMemoryAuditSink::default();
        let skill = skill().with_audit_sink(sink.clone());

        skill
            .handle_json(&intent_event(APP_ID, "DialogRequestSitterIntent"))
            .expect("turn should succeed");

        let events = sink.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].event_type, "session.started");
        assert_eq!(events[1].event_type, "dialog.follow_up_requested");
        assert_eq!(events[1].correlation_id, "request-1");
        assert_eq!(events[1].session_id.as_deref(), Some("session-1"));
        assert_eq!(events[1].metadata.get("state").map(String::as_str), Some("date_only"));
    }

    #[test]
    fn rejected_requests_are_audited_as_ingress_failures() {
        let sink = InMemoryAuditSink::default();
        let skill = skill().with_audit_sink(sink.clone());

        let _ = skill.handle_json(&intent_event("amzn1.ask.skill.other", "AMAZON.HelpIntent"));
        let _ = skill.handle_json(&intent_event(APP_ID, "BookTaxiIntent"));

        let events = sink.events();
        let kinds = events
            .iter()
            .map(|event| (event.event_type.as_str(), event.category.clone(), event.outcome.clone()))
            .collect::<Vec<_>>();
        assert_eq!(
            kinds,
            vec![
                ("ingress.application_rejected", AuditCategory::Ingress, AuditOutcome::Rejected),
                ("session.started", AuditCategory::Session, AuditOutcome::Success),
                ("ingress.intent_unsupported", AuditCategory::Ingress, AuditOutcome::Failed),
            ]
        );
    }

    #[test]
    fn skill_errors_map_to_application_errors() {
        let payload = SkillError::from(
            serde_json::from_str::<serde_json::Value>("{").expect_err("invalid json"),
        );
        assert!(matches!(ApplicationError::from(payload), ApplicationError::Payload(_)));

        let mismatch = SkillError::ApplicationIdMismatch { received: "x".to_owned() };
        assert!(matches!(ApplicationError::from(mismatch), ApplicationError::Unauthorized(_)));

        let dialog = SkillError::from(DialogError::UnrecognizedIntent { name: "X".to_owned() });
        assert!(matches!(ApplicationError::from(dialog), ApplicationError::Domain(_)));
    }
}
