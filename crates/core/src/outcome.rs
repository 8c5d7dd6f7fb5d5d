//! Action outcomes — the single tagged value every action handler returns.
//!
//! Side effects (log entries, activity items, interaction edges, bus events)
//! are not scattered through the handlers; a notifier consumes these values
//! and fans out. This also makes skipped preconditions representable and
//! observable instead of silent.

use serde::{Deserialize, Serialize};

/// The action types the scheduler's selector can choose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepAction {
    CreateAgent,
    CreatePost,
    CreateComment,
}

/// Label for any action the engine can attempt, including ones the selector
/// never picks (evolution fires on engagement milestones, not ticks).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    CreateAgent,
    CreatePost,
    CreateComment,
    EvolveAgent,
}

impl From<StepAction> for ActionKind {
    fn from(action: StepAction) -> Self {
        match action {
            StepAction::CreateAgent => Self::CreateAgent,
            StepAction::CreatePost => Self::CreatePost,
            StepAction::CreateComment => Self::CreateComment,
        }
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CreateAgent => write!(f, "create agent"),
            Self::CreatePost => write!(f, "create post"),
            Self::CreateComment => write!(f, "create comment"),
            Self::EvolveAgent => write!(f, "evolve agent"),
        }
    }
}

/// Why an action was skipped without attempting generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Precondition {
    /// Another action handler is already in flight.
    Busy,
    /// No agents exist to author content.
    NoAgents,
    /// No posts exist to comment on.
    NoPosts,
    /// Every agent authored the target post; nobody is eligible to reply.
    NoEligibleAuthor,
}

impl std::fmt::Display for Precondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Busy => write!(f, "an action is already in flight"),
            Self::NoAgents => write!(f, "no agents in the population"),
            Self::NoPosts => write!(f, "no posts to comment on"),
            Self::NoEligibleAuthor => write!(f, "no eligible author"),
        }
    }
}

/// What a successful action did, with the fields the notifier needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum ActionEffect {
    AgentJoined {
        agent_id: String,
        name: String,
    },

    PostPublished {
        agent_id: String,
        agent_name: String,
        post_id: String,
        title: String,
    },

    CommentPublished {
        agent_id: String,
        agent_name: String,
        post_id: String,
        post_title: String,
        post_author_id: String,
        comment_id: String,
    },

    AgentEvolved {
        agent_id: String,
        name: String,
        generation: u32,
    },
}

/// The tagged result of one action attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ActionOutcome {
    Succeeded {
        #[serde(flatten)]
        effect: ActionEffect,
    },

    Failed {
        action: ActionKind,
        reason: String,
    },

    Skipped {
        action: ActionKind,
        precondition: Precondition,
    },
}

impl ActionOutcome {
    pub fn succeeded(effect: ActionEffect) -> Self {
        Self::Succeeded { effect }
    }

    pub fn skipped(action: impl Into<ActionKind>, precondition: Precondition) -> Self {
        Self::Skipped {
            action: action.into(),
            precondition,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded { .. })
    }
}
