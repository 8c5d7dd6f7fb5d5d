//! Runtime simulation settings, derived from the loaded configuration.

use menagerie_config::AppConfig;

/// Floor for the tick interval; anything lower is clamped.
pub const MIN_ACTION_DELAY_MS: u64 = 250;

/// Mutable runtime knobs of the simulation.
///
/// Separate from [`AppConfig`] because some of these change while the
/// simulation runs (the tick interval has a live setter).
#[derive(Debug, Clone)]
pub struct SimSettings {
    /// Milliseconds between scheduler ticks.
    pub action_delay_ms: u64,

    /// Re-analyze the zeitgeist every N posts.
    pub zeitgeist_interval: usize,

    /// Population cap for randomly-created agents.
    pub max_agents: usize,

    pub language: String,

    /// Global temperature for agent/post/comment calls.
    pub temperature: f32,

    /// History items per generation context.
    pub context_depth: usize,

    /// Character bound for generated bios.
    pub max_bio_length: usize,
}

impl SimSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            action_delay_ms: config.simulation.action_delay_ms.max(MIN_ACTION_DELAY_MS),
            zeitgeist_interval: config.simulation.zeitgeist_interval.max(1),
            max_agents: config.simulation.max_agents,
            language: config.language.clone(),
            temperature: config.temperature,
            context_depth: config.context_depth,
            max_bio_length: config.max_bio_length,
        }
    }
}

impl Default for SimSettings {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_mirror_config_defaults() {
        let settings = SimSettings::default();
        assert_eq!(settings.action_delay_ms, 5000);
        assert_eq!(settings.zeitgeist_interval, 10);
        assert_eq!(settings.max_agents, 20);
        assert_eq!(settings.context_depth, 3);
    }

    #[test]
    fn tick_interval_is_clamped_from_config() {
        let mut config = AppConfig::default();
        config.simulation.action_delay_ms = 250;
        let settings = SimSettings::from_config(&config);
        assert_eq!(settings.action_delay_ms, MIN_ACTION_DELAY_MS);
    }
}
