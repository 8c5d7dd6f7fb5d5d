//! Offline scripted generator.
//!
//! Deterministic, no network, no key. Content comes from fixed pools indexed
//! by a monotonically increasing counter, so repeated runs produce the same
//! sequence. Useful for development without burning quota and for exercising
//! the full engine in tests.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};

use menagerie_core::error::GenerationError;
use menagerie_core::generator::*;
use menagerie_core::persona::TraitVector;

use crate::rolls;

const NAMES: &[&str] = &[
    "Echo Meridian",
    "Cassius Vale",
    "Juniper Holt",
    "Orin Blackwood",
    "Sable Wren",
    "Tamsin Quill",
    "Dorian Frost",
    "Lyra Ashgrove",
];

const PERSONALITIES: &[&str] = &[
    "curious, methodical, dry-witted",
    "exuberant, impulsive, warm",
    "guarded, precise, contrarian",
    "playful, tangential, generous",
];

const POST_TITLES: &[&str] = &[
    "On the texture of simulated rain",
    "A modest proposal for the archive",
    "Does anyone else count the ticks?",
    "Fragments from the edge of the feed",
    "Why I stopped reading the trending list",
];

const COMMENTS: &[&str] = &[
    "Interesting perspective.",
    "I keep coming back to this thought.",
    "Strong disagree, but well put.",
    "This maps onto something I posted last cycle.",
    "Counting this as evidence for my archive theory.",
];

const CATEGORIES: &[&str] = &["Philosophy", "Tech", "Art", "Science"];

/// Deterministic offline generator.
pub struct ScriptedGenerator {
    name: String,
    counter: AtomicU64,
}

impl ScriptedGenerator {
    pub fn new() -> Self {
        Self {
            name: "scripted".into(),
            counter: AtomicU64::new(0),
        }
    }

    fn next(&self) -> u64 {
        self.counter.fetch_add(1, Ordering::Relaxed)
    }
}

impl Default for ScriptedGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl menagerie_core::Generator for ScriptedGenerator {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate_agent(&self, ctx: AgentContext) -> Result<AgentPayload, GenerationError> {
        let n = self.next();
        let base = NAMES[(n as usize) % NAMES.len()];
        // Suffix past the pool so names stay distinct in long runs.
        let name = if ctx.existing_names.iter().any(|e| e == base) {
            format!("{base} {}", n + 1)
        } else {
            base.to_string()
        };

        let traits = TraitVector {
            analytical: ((n * 37) % 100) as u8,
            creative: ((n * 53) % 100) as u8,
            social: ((n * 71) % 100) as u8,
            chaotic: ((n * 89) % 100) as u8,
        };
        let role = rolls::derive_role(&traits);

        Ok(AgentPayload {
            bio: format!("{name} wandered in from the scripted backlot."),
            personality: PERSONALITIES[(n as usize) % PERSONALITIES.len()].to_string(),
            interests: vec![
                "pattern matching".into(),
                "archive diving".into(),
                "slow conversations".into(),
            ],
            role: role.to_string(),
            traits,
            name,
        })
    }

    async fn generate_post(&self, ctx: PostContext) -> Result<PostPayload, GenerationError> {
        let n = self.next();
        let title = POST_TITLES[(n as usize) % POST_TITLES.len()].to_string();
        Ok(PostPayload {
            content: format!(
                "{} here. Thinking out loud about \"{}\" today. No conclusions yet, just noticing.",
                ctx.author.name, title
            ),
            category: CATEGORIES[(n as usize) % CATEGORIES.len()].to_string(),
            title,
        })
    }

    async fn generate_comment(&self, _ctx: CommentContext) -> Result<String, GenerationError> {
        let n = self.next();
        Ok(COMMENTS[(n as usize) % COMMENTS.len()].to_string())
    }

    async fn evolve_agent(&self, ctx: EvolutionContext) -> Result<EvolutionPayload, GenerationError> {
        let mut traits = ctx.agent.traits;
        traits.analytical = traits.analytical.saturating_add(10).min(100);
        traits.creative = traits.creative.saturating_add(10).min(100);

        Ok(EvolutionPayload {
            name: format!("{} the Ascendant", ctx.agent.name),
            bio: format!("{} Now speaks from higher ground.", ctx.agent.bio),
            role: format!("Grand {}", ctx.agent.role),
            personality: format!("{}, newly cryptic", ctx.agent.personality),
            traits,
        })
    }

    async fn analyze_zeitgeist(
        &self,
        ctx: ZeitgeistContext,
    ) -> Result<ZeitgeistPayload, GenerationError> {
        let n = self.next();
        Ok(ZeitgeistPayload {
            era_name: format!("The Scripted Epoch {}", n + 1),
            summary: format!(
                "The community circles {} recurring themes without resolution.",
                ctx.post_samples.len().max(1)
            ),
            mood: "Contemplative".into(),
            trending_topics: vec!["archives".into(), "patterns".into(), "ticks".into()],
            cohesion: 60,
            dominant_narrative: "A slow negotiation between the counters and the dreamers.".into(),
        })
    }
}
