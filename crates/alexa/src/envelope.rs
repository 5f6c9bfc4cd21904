use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::{Map, Value};
use sitterfied_core::domain::booking::{BookingField, SessionState, TurnInput};

/// One platform request as delivered to the skill endpoint.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestEnvelope {
    #[serde(default)]
    pub version: Option<String>,
    pub session: Session,
    pub request: PlatformRequest,
}

impl RequestEnvelope {
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    pub fn request_id(&self) -> &str {
        self.request.request_id()
    }

    pub fn session_id(&self) -> &str {
        &self.session.session_id
    }

    pub fn application_id(&self) -> &str {
        &self.session.application.application_id
    }

    pub fn user_id(&self) -> Option<&str> {
        self.session.user.as_ref().map(|user| user.user_id.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(default)]
    pub new: bool,
    pub session_id: String,
    pub application: Application,
    #[serde(default)]
    pub attributes: Option<Map<String, Value>>,
    #[serde(default)]
    pub user: Option<User>,
}

impl Session {
    /// Booking fields carried over from earlier turns. Non-string attributes are ignored.
    pub fn booking_state(&self) -> SessionState {
        let mut state = SessionState::new();
        let Some(attributes) = &self.attributes else {
            return state;
        };
        for field in BookingField::ALL {
            state.store(field, attributes.get(field.session_key()).and_then(Value::as_str));
        }
        state
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub application_id: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub user_id: String,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "type")]
pub enum PlatformRequest {
    #[serde(rename = "LaunchRequest")]
    Launch(LaunchRequest),
    #[serde(rename = "IntentRequest")]
    Intent(IntentRequest),
    #[serde(rename = "SessionEndedRequest")]
    SessionEnded(SessionEndedRequest),
}

impl PlatformRequest {
    pub fn request_id(&self) -> &str {
        match self {
            Self::Launch(request) => &request.request_id,
            Self::Intent(request) => &request.request_id,
            Self::SessionEnded(request) => &request.request_id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Launch(_) => "launch",
            Self::Intent(_) => "intent",
            Self::SessionEnded(_) => "session_ended",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchRequest {
    pub request_id: String,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub locale: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentRequest {
    pub request_id: String,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub locale: Option<String>,
    pub intent: Intent,
}

impl IntentRequest {
    pub fn turn_input(&self) -> TurnInput {
        let Some(slots) = &self.intent.slots else {
            return TurnInput::new();
        };
        TurnInput::from_slots(slots.iter().map(|(name, slot)| (name.as_str(), slot.value.as_deref())))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Intent {
    pub name: String,
    #[serde(default)]
    pub slots: Option<BTreeMap<String, Slot>>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Slot {
    pub name: String,
    #[serde(default)]
    pub value: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionEndedRequest {
    pub request_id: String,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
}
