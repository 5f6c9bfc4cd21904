use std::sync::Arc;

use sitterfied_alexa::SitterfiedSkill;
use sitterfied_core::config::AppConfig;
use tracing::info;

pub struct Application {
    pub config: AppConfig,
    pub skill: Arc<SitterfiedSkill>,
}

pub fn bootstrap_with_config(config: AppConfig) -> Application {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );
    let skill = SitterfiedSkill::from_config(&config.skill);
    info!(
        event_name = "system.bootstrap.skill_ready",
        correlation_id = "bootstrap",
        application_id_verified = skill.application_id().is_some(),
        "skill initialized"
    );

    Application { config, skill: Arc::new(skill) }
}
