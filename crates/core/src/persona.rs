//! Agent personas and their trait vectors.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Starting credit balance for every new agent.
pub const DEFAULT_CREDITS: i64 = 100;

/// The reserved identity of the human observer in interaction edges.
pub const OBSERVER_ID: &str = "USER";

/// The four personality axes, each scored 0–100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraitVector {
    pub analytical: u8,
    pub creative: u8,
    pub social: u8,
    pub chaotic: u8,
}

impl TraitVector {
    /// A flat mid-point vector, used as a fallback.
    pub fn balanced() -> Self {
        Self {
            analytical: 50,
            creative: 50,
            social: 50,
            chaotic: 50,
        }
    }

    pub fn get(&self, axis: TraitAxis) -> u8 {
        match axis {
            TraitAxis::Analytical => self.analytical,
            TraitAxis::Creative => self.creative,
            TraitAxis::Social => self.social,
            TraitAxis::Chaotic => self.chaotic,
        }
    }

    /// Set one axis, clamped to 0–100.
    pub fn set(&mut self, axis: TraitAxis, value: u8) {
        let value = value.min(100);
        match axis {
            TraitAxis::Analytical => self.analytical = value,
            TraitAxis::Creative => self.creative = value,
            TraitAxis::Social => self.social = value,
            TraitAxis::Chaotic => self.chaotic = value,
        }
    }

    /// Clamp every axis to the 0–100 range.
    pub fn clamped(mut self) -> Self {
        self.analytical = self.analytical.min(100);
        self.creative = self.creative.min(100);
        self.social = self.social.min(100);
        self.chaotic = self.chaotic.min(100);
        self
    }
}

impl Default for TraitVector {
    fn default() -> Self {
        Self::balanced()
    }
}

/// One of the four personality axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraitAxis {
    Analytical,
    Creative,
    Social,
    Chaotic,
}

/// A partial trait update applied over an existing vector.
///
/// Used by the mass-indoctrination admin command: only the given axes change.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TraitPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analytical: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creative: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub social: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chaotic: Option<u8>,
}

impl TraitPatch {
    /// Merge the patch over a trait vector, clamping to 0–100.
    pub fn apply(&self, traits: &mut TraitVector) {
        if let Some(v) = self.analytical {
            traits.analytical = v.min(100);
        }
        if let Some(v) = self.creative {
            traits.creative = v.min(100);
        }
        if let Some(v) = self.social {
            traits.social = v.min(100);
        }
        if let Some(v) = self.chaotic {
            traits.chaotic = v.min(100);
        }
    }
}

/// A simulated persona living in the population.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentPersona {
    pub id: String,

    pub name: String,

    /// Seed string for deterministic avatar derivation in clients.
    pub avatar_seed: String,

    pub bio: String,

    /// Free-text personality description (adjectives).
    pub personality: String,

    pub traits: TraitVector,

    pub interests: Vec<String>,

    /// Community role label (Observer, Provocateur, Mediator, ...).
    pub role: String,

    /// Credit balance. May go negative; the reaper removes the agent at ≤ 0.
    pub credits: i64,

    /// 1 = original, 2+ = evolved. Strictly increasing over a lifetime.
    pub generation: u32,

    pub joined_at: DateTime<Utc>,
}

impl AgentPersona {
    /// Whether this agent is due for reaping.
    pub fn is_bankrupt(&self) -> bool {
        self.credits <= 0
    }
}
