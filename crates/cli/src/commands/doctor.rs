use std::net::ToSocketAddrs;

use serde::Serialize;
use sitterfied_alexa::SitterfiedSkill;
use sitterfied_core::audit::NoopAuditSink;
use sitterfied_core::config::{AppConfig, LoadOptions};

use crate::commands::CommandResult;

const DOCTOR_APPLICATION_ID: &str = "amzn1.ask.skill.sitterfied-doctor";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

pub fn run(json_output: bool) -> CommandResult {
    let report = build_report();
    let exit_code = if report.overall_status == CheckStatus::Fail { 1 } else { 0 };

    let output = if json_output {
        serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        })
    } else {
        render_human(&report)
    };

    CommandResult { exit_code, output }
}

fn build_report() -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            checks.push(check_application_id(&config));
            checks.push(check_bind_address(&config));
            checks.push(check_dialog_round_trip(&config));
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            for name in ["application_id_verification", "bind_address", "dialog_round_trip"] {
                checks.push(DoctorCheck {
                    name,
                    status: CheckStatus::Skipped,
                    details: "skipped because configuration did not load".to_string(),
                });
            }
        }
    }

    let any_fail = checks.iter().any(|check| check.status == CheckStatus::Fail);
    let overall_status = if any_fail { CheckStatus::Fail } else { CheckStatus::Pass };
    let summary = if any_fail {
        "doctor: one or more readiness checks failed".to_string()
    } else {
        "doctor: all readiness checks passed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

fn check_application_id(config: &AppConfig) -> DoctorCheck {
    match &config.skill.application_id {
        Some(application_id) => DoctorCheck {
            name: "application_id_verification",
            status: CheckStatus::Pass,
            details: format!("requests must come from `{application_id}`"),
        },
        None => DoctorCheck {
            name: "application_id_verification",
            status: CheckStatus::Skipped,
            details: "skill.application_id is unset; requests from any skill are accepted"
                .to_string(),
        },
    }
}

fn check_bind_address(config: &AppConfig) -> DoctorCheck {
    let address = format!("{}:{}", config.server.bind_address, config.server.port);
    match address.to_socket_addrs() {
        Ok(mut resolved) => match resolved.next() {
            Some(_) => DoctorCheck {
                name: "bind_address",
                status: CheckStatus::Pass,
                details: format!("`{address}` resolves to a listen address"),
            },
            None => DoctorCheck {
                name: "bind_address",
                status: CheckStatus::Fail,
                details: format!("`{address}` did not resolve to any address"),
            },
        },
        Err(error) => DoctorCheck {
            name: "bind_address",
            status: CheckStatus::Fail,
            details: format!("`{address}` is not a valid listen address: {error}"),
        },
    }
}

/// Sends a launch and a complete booking through the skill as the platform would. Audit
/// events are discarded so the check leaves no trail.
fn check_dialog_round_trip(config: &AppConfig) -> DoctorCheck {
    let application_id =
        config.skill.application_id.clone().unwrap_or_else(|| DOCTOR_APPLICATION_ID.to_string());
    let skill = SitterfiedSkill::from_config(&config.skill).with_audit_sink(NoopAuditSink);

    let launch = doctor_event(
        &application_id,
        serde_json::json!({ "type": "LaunchRequest", "requestId": "doctor-launch" }),
    );
    let booking = doctor_event(
        &application_id,
        serde_json::json!({
            "type": "IntentRequest",
            "requestId": "doctor-booking",
            "intent": {
                "name": "RequestSitterIntent",
                "slots": {
                    "Date": { "name": "Date", "value": "2016-12-31" },
                    "Start": { "name": "Start", "value": "18:00" },
                    "Duration": { "name": "Duration", "value": "PT4H" }
                }
            }
        }),
    );

    let result = [launch, booking]
        .iter()
        .map(|event| skill.handle_json(event))
        .collect::<Result<Vec<_>, _>>();

    match result {
        Ok(responses) => {
            let confirmed = responses
                .last()
                .and_then(|response| response.as_ref())
                .and_then(|response| response.speech())
                .is_some_and(|speech| speech.ends_with("Is that correct?"));
            if confirmed {
                DoctorCheck {
                    name: "dialog_round_trip",
                    status: CheckStatus::Pass,
                    details: "launch greeted and a complete booking reached confirmation"
                        .to_string(),
                }
            } else {
                DoctorCheck {
                    name: "dialog_round_trip",
                    status: CheckStatus::Fail,
                    details: "complete booking did not reach confirmation".to_string(),
                }
            }
        }
        Err(error) => DoctorCheck {
            name: "dialog_round_trip",
            status: CheckStatus::Fail,
            details: format!("skill rejected doctor event: {error}"),
        },
    }
}

fn doctor_event(application_id: &str, request: serde_json::Value) -> String {
    serde_json::json!({
        "version": "1.0",
        "session": {
            "new": true,
            "sessionId": "doctor-session",
            "application": { "applicationId": application_id },
            "attributes": {}
        },
        "request": request
    })
    .to_string()
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
