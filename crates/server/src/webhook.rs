use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::Serialize;
use sitterfied_alexa::{RequestEnvelope, ResponseEnvelope, SitterfiedSkill, SkillError};
use sitterfied_core::errors::{ApplicationError, InterfaceError};
use tracing::{error, warn};
use uuid::Uuid;

#[derive(Clone)]
pub struct WebhookState {
    skill: Arc<SitterfiedSkill>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct WebhookError {
    pub error: String,
    pub correlation_id: String,
}

pub fn router(skill: Arc<SitterfiedSkill>) -> Router {
    Router::new().route("/alexa", post(handle_turn)).with_state(WebhookState { skill })
}

/// One platform turn. Session-ended requests get an empty 200.
pub async fn handle_turn(State(state): State<WebhookState>, body: String) -> Response {
    let envelope = match RequestEnvelope::from_json(&body) {
        Ok(envelope) => envelope,
        Err(error) => {
            return failure(SkillError::from(error), Uuid::new_v4().to_string());
        }
    };

    match state.skill.handle(&envelope) {
        Ok(Some(response)) => (StatusCode::OK, Json(response)).into_response(),
        Ok(None) => StatusCode::OK.into_response(),
        Err(error) => failure(error, envelope.request_id().to_owned()),
    }
}

fn failure(error: SkillError, correlation_id: String) -> Response {
    let interface = ApplicationError::from(error).into_interface(correlation_id);

    match &interface {
        InterfaceError::BadRequest { message, correlation_id } => {
            warn!(
                event_name = "ingress.alexa.payload_rejected",
                correlation_id = %correlation_id,
                error = %message,
                "rejected malformed platform payload"
            );
            error_response(StatusCode::BAD_REQUEST, &interface)
        }
        InterfaceError::Forbidden { message, correlation_id } => {
            warn!(
                event_name = "ingress.alexa.application_rejected",
                correlation_id = %correlation_id,
                error = %message,
                "rejected request from foreign application"
            );
            error_response(StatusCode::FORBIDDEN, &interface)
        }
        InterfaceError::Internal { message, correlation_id } => {
            error!(
                event_name = "ingress.alexa.turn_failed",
                correlation_id = %correlation_id,
                error = %message,
                "turn failed, ending conversation"
            );
            (StatusCode::OK, Json(ResponseEnvelope::end_silently())).into_response()
        }
    }
}

fn error_response(status: StatusCode, interface: &InterfaceError) -> Response {
    let body = WebhookError {
        error: interface.user_message().to_string(),
        correlation_id: interface.correlation_id().to_string(),
    };
    (status, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{Request, StatusCode},
        Router,
    };
    use chrono::NaiveDate;
    use serde_json::{json, Value};
    use sitterfied_alexa::SitterfiedSkill;
    use sitterfied_core::dialog::DialogController;
    use sitterfied_core::format::SpeechFormatter;
    use tower::ServiceExt;

    use crate::webhook::router;

    const APP_ID: &str = "amzn1.ask.skill.webhook-test";

    fn app() -> Router {
        let reference = NaiveDate::from_ymd_opt(2015, 5, 13).expect("valid reference date");
        let controller = DialogController::new(SpeechFormatter::with_reference_date(reference));
        router(Arc::new(SitterfiedSkill::new(Some(APP_ID.to_owned()), controller)))
    }

    fn event(application_id: &str, request: Value) -> String {
        json!({
            "version": "1.0",
            "session": {
                "new": false,
                "sessionId": "session-http",
                "application": { "applicationId": application_id },
                "attributes": { "date": "2015-05-21", "start": "18:00" }
            },
            "request": request
        })
        .to_string()
    }

    async fn post(body: String) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri("/alexa")
            .header("content-type", "application/json")
            .body(Body::from(body))
            .expect("request should build");

        let response = app().oneshot(request).await.expect("router should respond");
        let status = response.status();
        let bytes =
            axum::body::to_bytes(response.into_body(), usize::MAX).await.expect("body should read");
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("body should be json")
        };
        (status, value)
    }

    #[tokio::test]
    async fn intent_turn_returns_response_envelope() {
        let body = event(
            APP_ID,
            json!({
                "type": "IntentRequest",
                "requestId": "request-http-1",
                "intent": {
                    "name": "DialogRequestSitterIntent",
                    "slots": { "End": { "name": "End", "value": "22:00" } }
                }
            }),
        );

        let (status, value) = post(body).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            value["response"]["outputSpeech"]["text"],
            "You need a sitter on May 21 at 06:00 PM until 10:00 PM. Is that correct?"
        );
        assert_eq!(value["sessionAttributes"]["end"], "22:00");
    }

    #[tokio::test]
    async fn malformed_payload_is_a_bad_request() {
        let (status, value) = post("{\"session\": 42}".to_string()).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(value["error"], "The request could not be processed.");
        assert!(value["correlation_id"].is_string());
    }

    #[tokio::test]
    async fn foreign_application_is_forbidden() {
        let body = event(
            "amzn1.ask.skill.someone-else",
            json!({ "type": "LaunchRequest", "requestId": "request-http-2" }),
        );

        let (status, value) = post(body).await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(value["correlation_id"], "request-http-2");
    }

    #[tokio::test]
    async fn unknown_intent_ends_the_session_silently() {
        let body = event(
            APP_ID,
            json!({
                "type": "IntentRequest",
                "requestId": "request-http-3",
                "intent": { "name": "OrderPizzaIntent" }
            }),
        );

        let (status, value) = post(body).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(value, json!({ "version": "1.0", "response": { "shouldEndSession": true } }));
    }

    #[tokio::test]
    async fn session_ended_request_gets_an_empty_reply() {
        let body = event(
            APP_ID,
            json!({
                "type": "SessionEndedRequest",
                "requestId": "request-http-4",
                "reason": "USER_INITIATED"
            }),
        );

        let (status, value) = post(body).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(value, Value::Null);
    }
}
