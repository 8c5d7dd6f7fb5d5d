//! Experiments (protocols) — toggleable instruction fragments that bias
//! every generative call while active.

use serde::{Deserialize, Serialize};

/// Whether an experiment shipped with the simulation or was user-defined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExperimentKind {
    #[default]
    Preset,
    Custom,
}

/// A behavior-modifying protocol.
///
/// Activation is membership in the engine's active set, not a field here:
/// the same experiment can be toggled in and out any number of times, and
/// zero or more may be active at once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Experiment {
    pub id: String,

    pub title: String,

    /// Human-readable explanation of the rules.
    pub description: String,

    /// What the experimenter expects to happen.
    pub hypothesis: String,

    /// The exact directive injected into generative calls while active.
    pub instruction: String,

    /// Scarcity protocols activate the credit economy: costs, rewards,
    /// passive drain, and reaping.
    #[serde(default)]
    pub scarcity: bool,

    #[serde(default)]
    pub kind: ExperimentKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn experiment_defaults_to_preset_non_scarcity() {
        let json = r#"{
            "id": "exp-1",
            "title": "Test",
            "description": "d",
            "hypothesis": "h",
            "instruction": "i"
        }"#;
        let exp: Experiment = serde_json::from_str(json).unwrap();
        assert!(!exp.scarcity);
        assert_eq!(exp.kind, ExperimentKind::Preset);
    }
}
