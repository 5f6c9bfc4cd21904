use std::env;
use std::fs;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};

use chrono::NaiveDate;
use serde_json::Value;
use sitterfied_cli::commands::{config, doctor, simulate};
use tempfile::TempDir;

const FIXTURE_APP_ID: &str = "amzn1.ask.skill.7f3c2d10-5b1e-4c55-9a3e-2e9d4f6b8a01";

#[test]
fn config_reports_env_sources() {
    with_env(&[("SITTERFIED_SERVER_PORT", "9191"), ("SITTERFIED_LOG_LEVEL", "debug")], || {
        let output = config::run();

        assert!(output.starts_with("effective config"));
        assert!(output.contains("- server.port = 9191 (source: env (SITTERFIED_SERVER_PORT))"));
        assert!(output.contains("- logging.level = debug (source: env (SITTERFIED_LOG_LEVEL))"));
        assert!(output.contains("- skill.application_id = <unset> (source: default)"));
    });
}

#[test]
fn config_reports_validation_failure() {
    with_env(&[("SITTERFIED_SKILL_APPLICATION_ID", "not-an-id")], || {
        let output = config::run();

        assert!(output.starts_with("config validation failed"));
        assert!(output.contains("skill.application_id"));
    });
}

#[test]
fn doctor_passes_with_default_config() {
    with_env(&[], || {
        let result = doctor::run(true);
        assert_eq!(result.exit_code, 0, "expected doctor success: {}", result.output);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["overall_status"], "pass");
        let checks = payload["checks"].as_array().expect("checks array");
        let status_of = |name: &str| {
            checks
                .iter()
                .find(|check| check["name"] == name)
                .map(|check| check["status"].clone())
                .unwrap_or(Value::Null)
        };
        assert_eq!(status_of("config_validation"), "pass");
        assert_eq!(status_of("application_id_verification"), "skipped");
        assert_eq!(status_of("bind_address"), "pass");
        assert_eq!(status_of("dialog_round_trip"), "pass");
    });
}

#[test]
fn doctor_verifies_configured_application_id() {
    with_env(&[("SITTERFIED_SKILL_APPLICATION_ID", FIXTURE_APP_ID)], || {
        let result = doctor::run(false);

        assert_eq!(result.exit_code, 0, "expected doctor success: {}", result.output);
        assert!(result.output.starts_with("doctor: all readiness checks passed"));
        assert!(result.output.contains("- [ok] application_id_verification"));
        assert!(result.output.contains("- [ok] dialog_round_trip"));
    });
}

#[test]
fn doctor_fails_and_skips_when_config_is_invalid() {
    with_env(&[("SITTERFIED_LOGGING_LEVEL", "loud")], || {
        let result = doctor::run(true);
        assert_eq!(result.exit_code, 1);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["overall_status"], "fail");
        assert_eq!(payload["checks"][0]["name"], "config_validation");
        assert_eq!(payload["checks"][0]["status"], "fail");
        assert_eq!(payload["checks"][1]["status"], "skipped");
    });
}

#[test]
fn simulate_replays_launch_fixture() {
    with_env(&[("SITTERFIED_SKILL_APPLICATION_ID", FIXTURE_APP_ID)], || {
        let result = simulate::run(&fixture("launch_event.json"), None);
        assert_eq!(result.exit_code, 0, "expected simulate success: {}", result.output);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["response"]["outputSpeech"]["text"], "Hi. When do you need a sitter?");
        assert_eq!(payload["response"]["shouldEndSession"], false);
    });
}

#[test]
fn simulate_pins_relative_dates_with_today() {
    with_env(&[], || {
        let today = NaiveDate::from_ymd_opt(2016, 12, 30).expect("valid date");
        let result = simulate::run(&fixture("intent_event.json"), Some(today));
        assert_eq!(result.exit_code, 0, "expected simulate success: {}", result.output);

        let payload = parse_payload(&result.output);
        assert_eq!(
            payload["response"]["outputSpeech"]["text"],
            "You need a sitter tomorrow at 06:00 PM until 10:00 PM. Is that correct?"
        );
    });
}

#[test]
fn simulate_reports_session_end_without_response() {
    with_env(&[], || {
        let result = simulate::run(&fixture("session_ended_event.json"), None);
        assert_eq!(result.exit_code, 0);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "simulate");
        assert_eq!(payload["status"], "ok");
    });
}

#[test]
fn simulate_classifies_failures() {
    with_env(&[("SITTERFIED_SKILL_APPLICATION_ID", "amzn1.ask.skill.someone-else")], || {
        let result = simulate::run(&fixture("launch_event.json"), None);
        assert_eq!(result.exit_code, 5);
        assert_eq!(parse_payload(&result.output)["error_class"], "unauthorized");
    });

    with_env(&[], || {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ \"request\": ").expect("write event");

        let result = simulate::run(&path, None);
        assert_eq!(result.exit_code, 4);
        assert_eq!(parse_payload(&result.output)["error_class"], "payload");

        let result = simulate::run(&dir.path().join("missing.json"), None);
        assert_eq!(result.exit_code, 3);
        assert_eq!(parse_payload(&result.output)["error_class"], "event_read");
    });
}

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../alexa/tests/fixtures").join(name)
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let keys = [
        "SITTERFIED_SKILL_APPLICATION_ID",
        "SITTERFIED_SKILL_SESSION_ENDED_MESSAGE",
        "SITTERFIED_SERVER_BIND_ADDRESS",
        "SITTERFIED_SERVER_PORT",
        "SITTERFIED_SERVER_GRACEFUL_SHUTDOWN_SECS",
        "SITTERFIED_LOGGING_LEVEL",
        "SITTERFIED_LOGGING_FORMAT",
        "SITTERFIED_LOG_LEVEL",
        "SITTERFIED_LOG_FORMAT",
    ];

    let previous_values: Vec<(&str, Option<String>)> =
        keys.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in &keys {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();

    for (key, value) in previous_values {
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
    }
}
