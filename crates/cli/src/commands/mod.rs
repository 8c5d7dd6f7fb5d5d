//! CLI subcommands.

pub mod onboard;
pub mod run;
pub mod serve;
pub mod step;

use std::sync::Arc;

use menagerie_config::AppConfig;
use menagerie_core::{Experiment, ExperimentKind, SimEvent};
use menagerie_engine::{SimSettings, SimulationController};

/// Build a controller from the loaded configuration: generator, runtime
/// settings, and any user-defined experiments merged into the catalog.
pub(crate) fn build_controller(config: &AppConfig) -> Arc<SimulationController> {
    let generator = menagerie_generate::build(config);
    let settings = SimSettings::from_config(config);
    SimulationController::with_experiments(generator, settings, custom_experiments(config))
}

fn custom_experiments(config: &AppConfig) -> Vec<Experiment> {
    config
        .experiments
        .iter()
        .enumerate()
        .map(|(i, exp)| Experiment {
            id: format!("exp-custom-{}", i + 1),
            title: exp.title.clone(),
            description: exp.description.clone(),
            hypothesis: exp.hypothesis.clone(),
            instruction: exp.instruction.clone(),
            scarcity: exp.scarcity,
            kind: ExperimentKind::Custom,
        })
        .collect()
}

/// One human-readable line per bus event, for `run`/`serve` output.
pub(crate) fn describe(event: &SimEvent) -> String {
    match event {
        SimEvent::AgentJoined { name } => format!("+ {name} joined the simulation"),
        SimEvent::PostPublished { author, title } => format!("{author} posted \"{title}\""),
        SimEvent::CommentPublished { author, post_title } => {
            format!("{author} commented on \"{post_title}\"")
        }
        SimEvent::AgentEvolving { name } => format!("{name} is undergoing metamorphosis..."),
        SimEvent::AgentEvolved { name, generation } => {
            format!("{name} evolved to generation {generation}")
        }
        SimEvent::AgentReaped { name } => format!("- {name} ran out of credits and was reaped"),
        SimEvent::ZeitgeistShifted { era_name } => format!("zeitgeist shift: \"{era_name}\""),
        SimEvent::BreakerTripped => "circuit breaker tripped; simulation paused".into(),
        SimEvent::ActionFailed { action, reason } => format!("failed to {action}: {reason}"),
        SimEvent::ExperimentToggled { title, active } => {
            let verb = if *active { "activated" } else { "deactivated" };
            format!("experiment \"{title}\" {verb}")
        }
        SimEvent::SimulationReset => "simulation reset".into(),
        SimEvent::BroadcastSent => "global broadcast published".into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn custom_experiments_map_from_config() {
        let mut config = AppConfig::default();
        config.experiments.push(menagerie_config::ExperimentConfig {
            title: "Haiku Mode".into(),
            description: "Verse only.".into(),
            hypothesis: "Brevity spreads.".into(),
            instruction: "Write only haiku.".into(),
            scarcity: false,
        });

        let experiments = custom_experiments(&config);
        assert_eq!(experiments.len(), 1);
        assert_eq!(experiments[0].id, "exp-custom-1");
        assert_eq!(experiments[0].kind, ExperimentKind::Custom);
    }

    #[test]
    fn describe_covers_the_breaker() {
        let line = describe(&SimEvent::BreakerTripped);
        assert!(line.contains("circuit breaker"));
    }
}
