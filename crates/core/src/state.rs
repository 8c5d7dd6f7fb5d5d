//! The simulation run-state machine.

use serde::{Deserialize, Serialize};

/// The three run states of the simulation.
///
/// `Idle` is the initial state before the scheduler has ever armed a run
/// timer. `Running` and `Paused` are reachable from each other via the user
/// toggle; the circuit breaker additionally forces `Running → Paused`. There
/// is no path back to `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SimulationState {
    #[default]
    Idle,
    Running,
    Paused,
}

impl std::fmt::Display for SimulationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "IDLE"),
            Self::Running => write!(f, "RUNNING"),
            Self::Paused => write!(f, "PAUSED"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_state_is_idle() {
        assert_eq!(SimulationState::default(), SimulationState::Idle);
    }

    #[test]
    fn serializes_screaming_snake() {
        let json = serde_json::to_string(&SimulationState::Running).unwrap();
        assert_eq!(json, "\"RUNNING\"");
    }
}
