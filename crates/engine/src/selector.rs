//! The action selector — a weighted policy over the next action type.
//!
//! Pure function of the population size, the configured cap, and one uniform
//! draw, so the policy is trivially testable without a running scheduler.

use menagerie_core::StepAction;

/// Bootstrap floor: below this many agents, every tick creates one.
pub const BOOTSTRAP_FLOOR: usize = 5;

/// Choose the next action. Rules evaluate in order, first match wins:
/// 1. Below the bootstrap floor, always create an agent.
/// 2. With `roll < 0.10` and room under the cap, create an agent.
/// 3. With `roll < 0.50`, create a post.
/// 4. Otherwise, create a comment.
pub fn choose(agent_count: usize, max_agents: usize, roll: f64) -> StepAction {
    if agent_count < BOOTSTRAP_FLOOR {
        return StepAction::CreateAgent;
    }
    if roll < 0.10 && agent_count < max_agents {
        return StepAction::CreateAgent;
    }
    if roll < 0.50 {
        return StepAction::CreatePost;
    }
    StepAction::CreateComment
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bootstrap_floor_forces_agents() {
        for count in 0..BOOTSTRAP_FLOOR {
            assert_eq!(choose(count, 20, 0.99), StepAction::CreateAgent);
        }
    }

    #[test]
    fn low_roll_grows_population_under_cap() {
        assert_eq!(choose(10, 20, 0.05), StepAction::CreateAgent);
    }

    #[test]
    fn low_roll_at_cap_posts_instead() {
        assert_eq!(choose(20, 20, 0.05), StepAction::CreatePost);
    }

    #[test]
    fn mid_roll_posts() {
        assert_eq!(choose(10, 20, 0.3), StepAction::CreatePost);
        assert_eq!(choose(10, 20, 0.49), StepAction::CreatePost);
    }

    #[test]
    fn high_roll_comments() {
        assert_eq!(choose(10, 20, 0.5), StepAction::CreateComment);
        assert_eq!(choose(10, 20, 0.99), StepAction::CreateComment);
    }
}
