//! The economy ledger: costs, rewards, and the reaper.
//!
//! All rules apply only while a scarcity protocol is active; the caller
//! checks that. Credit balances may go negative between reap passes.

use std::time::Duration;

use menagerie_core::AgentPersona;

/// Debit for creating a post, taken before the generative call and never
/// refunded on failure.
pub const POST_COST: i64 = 20;

/// Debit for creating a comment, taken before the generative call.
pub const COMMENT_COST: i64 = 10;

/// Reward to a post's author for an observer like or emoji reaction.
pub const REACTION_REWARD: i64 = 50;

/// Flat bonus granted on evolution, on top of the pre-evolution balance.
pub const EVOLUTION_BONUS: i64 = 100;

/// Cadence of the passive entropy drain, independent of the scheduler tick.
pub const DRAIN_INTERVAL: Duration = Duration::from_secs(3);

/// One atomic drain/reap pass over the population.
///
/// If any agent starts the pass at ≤ 0, those agents are removed and
/// returned, and no drain applies in the same pass. Otherwise every agent
/// is drained by 1 and nothing is returned.
pub fn drain_and_reap(agents: &mut Vec<AgentPersona>) -> Vec<AgentPersona> {
    if agents.iter().any(|a| a.is_bankrupt()) {
        let mut reaped = Vec::new();
        agents.retain(|a| {
            if a.is_bankrupt() {
                reaped.push(a.clone());
                false
            } else {
                true
            }
        });
        return reaped;
    }

    for agent in agents.iter_mut() {
        agent.credits -= 1;
    }
    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use menagerie_core::TraitVector;

    fn agent(id: &str, credits: i64) -> AgentPersona {
        AgentPersona {
            id: id.into(),
            name: id.to_uppercase(),
            avatar_seed: id.into(),
            bio: String::new(),
            personality: String::new(),
            traits: TraitVector::balanced(),
            interests: vec![],
            role: "Observer".into(),
            credits,
            generation: 1,
            joined_at: Utc::now(),
        }
    }

    #[test]
    fn solvent_population_drains_by_one() {
        let mut agents = vec![agent("a", 100), agent("b", 1)];
        let reaped = drain_and_reap(&mut agents);
        assert!(reaped.is_empty());
        assert_eq!(agents[0].credits, 99);
        assert_eq!(agents[1].credits, 0);
    }

    #[test]
    fn bankrupt_agents_are_reaped_without_drain() {
        let mut agents = vec![agent("a", 50), agent("b", 0), agent("c", -5)];
        let reaped = drain_and_reap(&mut agents);
        assert_eq!(reaped.len(), 2);
        assert_eq!(agents.len(), 1);
        // Survivors are not drained in a reap pass.
        assert_eq!(agents[0].credits, 50);
    }

    #[test]
    fn negative_balance_after_posting_is_reaped_next_pass() {
        // Balance 15, posts at cost 20, ends at -5.
        let mut agents = vec![agent("poster", 15 - POST_COST)];
        assert_eq!(agents[0].credits, -5);
        let reaped = drain_and_reap(&mut agents);
        assert_eq!(reaped.len(), 1);
        assert!(agents.is_empty());
    }
}
