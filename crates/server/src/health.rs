use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;

#[derive(Clone)]
pub struct HealthState {
    application_id_verified: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: HealthCheck,
    pub skill: HealthCheck,
    pub checked_at: String,
}

pub fn router(application_id_verified: bool) -> Router {
    Router::new().route("/health", get(health)).with_state(HealthState { application_id_verified })
}

pub async fn health(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let payload = HealthResponse {
        status: "ready",
        service: HealthCheck {
            status: "ready",
            detail: "sitterfied-server runtime initialized".to_string(),
        },
        skill: skill_check(state.application_id_verified),
        checked_at: Utc::now().to_rfc3339(),
    };

    (StatusCode::OK, Json(payload))
}

fn skill_check(application_id_verified: bool) -> HealthCheck {
    if application_id_verified {
        HealthCheck { status: "ready", detail: "application id verification enabled".to_string() }
    } else {
        HealthCheck {
            status: "warn",
            detail: "application id verification disabled; any skill may call this endpoint"
                .to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::{extract::State, http::StatusCode, Json};

    use crate::health::{health, HealthState};

    #[tokio::test]
    async fn health_reports_ready_with_verified_application() {
        let (status, Json(payload)) =
            health(State(HealthState { application_id_verified: true })).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload.status, "ready");
        assert_eq!(payload.service.status, "ready");
        assert_eq!(payload.skill.status, "ready");
    }

    #[tokio::test]
    async fn health_warns_when_application_id_is_not_verified() {
        let (status, Json(payload)) =
            health(State(HealthState { application_id_verified: false })).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload.skill.status, "warn");
        assert!(payload.skill.detail.contains("disabled"));
    }
}
