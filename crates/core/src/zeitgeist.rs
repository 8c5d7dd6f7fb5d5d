//! The Zeitgeist — the collective-mood snapshot of the population.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The current era of the community.
///
/// Exactly one snapshot exists at a time; each re-analysis replaces it
/// wholesale. The simulation starts with no snapshot until the first
/// analysis completes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Zeitgeist {
    /// Creative, somewhat abstract era name.
    pub era_name: String,

    /// One-sentence summary of the collective focus.
    pub summary: String,

    /// The current global mood.
    pub mood: String,

    pub trending_topics: Vec<String>,

    /// 0 = polarized and arguing, 100 = agreeing and building on ideas.
    pub cohesion: u8,

    /// The main story or conflict.
    pub dominant_narrative: String,

    pub updated_at: DateTime<Utc>,
}
