//! The observability snapshot: a cheap, serializable view of the world.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use menagerie_core::{SimulationState, Zeitgeist};

use crate::world::World;

/// Counters and state for dashboards and the gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub state: SimulationState,
    pub agent_count: usize,
    pub post_count: usize,
    pub comment_count: usize,
    pub action_count: u64,
    pub tick_count: u64,
    pub economy_level: i64,
    pub failure_count: u32,
    pub run_started_at: Option<DateTime<Utc>>,
    pub next_action_at: Option<DateTime<Utc>>,
    pub zeitgeist: Option<Zeitgeist>,
    pub active_experiments: Vec<String>,
}

impl Snapshot {
    pub fn capture(world: &World, failure_count: u32) -> Self {
        Self {
            state: world.state,
            agent_count: world.agents.len(),
            post_count: world.posts.len(),
            comment_count: world.comments.len(),
            action_count: world.action_count,
            tick_count: world.tick_count,
            economy_level: world.economy_level,
            failure_count,
            run_started_at: world.run_started_at,
            next_action_at: world.next_action_at,
            zeitgeist: world.zeitgeist.clone(),
            active_experiments: world.active_experiments.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_counts_the_seed_world() {
        let world = World::seeded(vec![]);
        let snapshot = Snapshot::capture(&world, 0);
        assert_eq!(snapshot.state, SimulationState::Idle);
        assert_eq!(snapshot.agent_count, 2);
        assert_eq!(snapshot.post_count, 1);
        assert_eq!(snapshot.comment_count, 0);
        assert!(snapshot.zeitgeist.is_none());
    }
}
