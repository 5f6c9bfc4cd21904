use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use sitterfied_alexa::{SitterfiedSkill, SkillError};
use sitterfied_core::config::{AppConfig, LoadOptions};
use sitterfied_core::dialog::DialogController;
use sitterfied_core::format::SpeechFormatter;

use crate::commands::CommandResult;

const COMMAND: &str = "simulate";

/// Replays one recorded platform event. `today` pins relative dates for reproducible output.
pub fn run(event_path: &Path, today: Option<NaiveDate>) -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(COMMAND, "config_validation", error.to_string(), 2);
        }
    };

    let raw = match fs::read_to_string(event_path) {
        Ok(raw) => raw,
        Err(error) => {
            return CommandResult::failure(
                COMMAND,
                "event_read",
                format!("could not read `{}`: {error}", event_path.display()),
                3,
            );
        }
    };

    let skill = build_skill(&config, today);
    match skill.handle_json(&raw) {
        Ok(Some(response)) => match serde_json::to_string_pretty(&response) {
            Ok(output) => CommandResult { exit_code: 0, output },
            Err(error) => CommandResult::failure(COMMAND, "serialization", error.to_string(), 7),
        },
        Ok(None) => CommandResult::success(COMMAND, "session ended; the skill sends no response"),
        Err(error) => {
            let (error_class, exit_code) = classify(&error);
            CommandResult::failure(COMMAND, error_class, error.to_string(), exit_code)
        }
    }
}

fn build_skill(config: &AppConfig, today: Option<NaiveDate>) -> SitterfiedSkill {
    let formatter = today.map(SpeechFormatter::with_reference_date).unwrap_or_default();
    let controller = DialogController::new(formatter)
        .with_session_ended_message(config.skill.session_ended_message.clone());
    SitterfiedSkill::new(config.skill.application_id.clone(), controller)
}

fn classify(error: &SkillError) -> (&'static str, u8) {
    match error {
        SkillError::Payload(_) => ("payload", 4),
        SkillError::ApplicationIdMismatch { .. } => ("unauthorized", 5),
        SkillError::Dialog(_) => ("dialog", 6),
    }
}
