//! Activity feed items — one tagged variant per activity kind.
//!
//! Each variant carries only the fields relevant to that kind; there is no
//! dynamically-typed detail bag.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What happened, with the fields that describe it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActivityKind {
    AgentJoined,

    PostCreated {
        post_id: String,
        post_title: String,
    },

    CommentCreated {
        post_id: String,
        post_title: String,
        comment_id: String,
    },

    AgentEvolved {
        generation: u32,
    },

    EraShift {
        era_name: String,
    },
}

/// One entry in the activity feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityItem {
    pub id: String,

    /// The acting agent, or [`crate::SYSTEM_AUTHOR`] for system events.
    pub agent_id: String,

    pub timestamp: DateTime<Utc>,

    #[serde(flatten)]
    pub kind: ActivityKind,
}

impl ActivityItem {
    pub fn new(agent_id: impl Into<String>, kind: ActivityKind) -> Self {
        Self {
            id: format!("act-{}", uuid::Uuid::new_v4()),
            agent_id: agent_id.into(),
            timestamp: Utc::now(),
            kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn activity_kind_is_tagged() {
        let item = ActivityItem::new(
            "agent-1",
            ActivityKind::PostCreated {
                post_id: "post-1".into(),
                post_title: "Hello".into(),
            },
        );
        let json = serde_json::to_string(&item).unwrap();
        assert!(json.contains("\"type\":\"post_created\""));
        assert!(json.contains("Hello"));
    }

    #[test]
    fn era_shift_carries_only_era_name() {
        let json = serde_json::to_string(&ActivityKind::EraShift {
            era_name: "The Glass Epoch".into(),
        })
        .unwrap();
        assert!(json.contains("era_shift"));
        assert!(!json.contains("post_id"));
    }
}
