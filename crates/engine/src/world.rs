//! The world: every entity and counter the simulation mutates.
//!
//! One struct behind one `RwLock` in the controller. Mutation happens in
//! short, whole-step exclusive borrows; no lock is ever held across a
//! generative call.

use chrono::{DateTime, Utc};
use menagerie_core::{
    ACTIVITY_CAP, ActivityItem, ActivityKind, AgentPersona, BoundedLog, Comment, Experiment,
    INTERACTION_CAP, InteractionEvent, LogEntry, LogLevel, Post, SYSTEM_LOG_CAP, SimulationState,
    Zeitgeist,
};

use crate::{composer, seeds};

/// Initial value of the global economy-level gauge.
pub const INITIAL_ECONOMY_LEVEL: i64 = 50;

/// All mutable simulation state.
pub struct World {
    pub agents: Vec<AgentPersona>,

    /// Newest first.
    pub posts: Vec<Post>,

    /// Oldest first (append order).
    pub comments: Vec<Comment>,

    pub experiments: Vec<Experiment>,

    /// Active experiment ids, in activation order. Genuinely multi-membership.
    pub active_experiments: Vec<String>,

    pub zeitgeist: Option<Zeitgeist>,

    pub state: SimulationState,

    pub log: BoundedLog<LogEntry>,
    pub activity: BoundedLog<ActivityItem>,
    pub interactions: BoundedLog<InteractionEvent>,

    /// Completed actions.
    pub action_count: u64,

    /// Scheduler timer fires, including guarded skips.
    pub tick_count: u64,

    /// Global gauge adjusted only by the boost command.
    pub economy_level: i64,

    pub run_started_at: Option<DateTime<Utc>>,
    pub next_action_at: Option<DateTime<Utc>>,
}

impl World {
    /// A fresh world with seed agents, the welcome post, and the preset
    /// experiment catalog (plus any user-defined experiments).
    pub fn seeded(custom_experiments: Vec<Experiment>) -> Self {
        let agents = seeds::seed_agents();
        let posts = seeds::seed_posts(&agents);
        let mut experiments = seeds::preset_experiments();
        experiments.extend(custom_experiments);

        Self {
            agents,
            posts,
            comments: Vec::new(),
            experiments,
            active_experiments: Vec::new(),
            zeitgeist: None,
            state: SimulationState::Idle,
            log: BoundedLog::new(SYSTEM_LOG_CAP),
            activity: BoundedLog::new(ACTIVITY_CAP),
            interactions: BoundedLog::new(INTERACTION_CAP),
            action_count: 0,
            tick_count: 0,
            economy_level: INITIAL_ECONOMY_LEVEL,
            run_started_at: None,
            next_action_at: None,
        }
    }

    /// Restore seed content and zero the counters.
    ///
    /// Run state, the experiment catalog, the active set, and the economy
    /// level all survive a reset: a running loop keeps running against
    /// fresh data.
    pub fn reset(&mut self) {
        self.agents = seeds::seed_agents();
        self.posts = seeds::seed_posts(&self.agents);
        self.comments.clear();
        self.zeitgeist = None;
        self.log.clear();
        self.activity.clear();
        self.interactions.clear();
        self.action_count = 0;
        self.tick_count = 0;
    }

    pub fn log(&mut self, level: LogLevel, message: impl Into<String>) {
        self.log.push(LogEntry::new(level, message));
    }

    pub fn record_activity(&mut self, agent_id: impl Into<String>, kind: ActivityKind) {
        self.activity.push(ActivityItem::new(agent_id, kind));
    }

    /// The composed directive of all active experiments.
    pub fn directive(&self) -> String {
        composer::directive(&self.experiments, &self.active_experiments)
    }

    /// Whether the credit economy is live.
    pub fn scarcity_active(&self) -> bool {
        composer::scarcity_active(&self.experiments, &self.active_experiments)
    }

    pub fn agent(&self, id: &str) -> Option<&AgentPersona> {
        self.agents.iter().find(|a| a.id == id)
    }

    pub fn agent_mut(&mut self, id: &str) -> Option<&mut AgentPersona> {
        self.agents.iter_mut().find(|a| a.id == id)
    }

    pub fn post_mut(&mut self, id: &str) -> Option<&mut Post> {
        self.posts.iter_mut().find(|p| p.id == id)
    }

    /// Display name for an author id, for thread context.
    pub fn author_name(&self, id: &str) -> String {
        self.agent(id)
            .map(|a| a.name.clone())
            .unwrap_or_else(|| "Unknown".into())
    }
}
