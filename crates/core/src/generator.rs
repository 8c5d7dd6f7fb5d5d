//! Generator trait — the abstraction over the generative collaborator.
//!
//! A Generator knows how to turn a persona plus context into new content:
//! fresh agents, posts, comments, evolved personas, and zeitgeist analyses.
//! One call per action kind; each takes the acting agent's profile, relevant
//! history, the composed protocol directive, a target language, and a
//! temperature, and either returns a structured payload or fails with a
//! [`GenerationError`].
//!
//! Implementations: the Gemini-backed client and the offline scripted
//! generator.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::GenerationError;
use crate::persona::{AgentPersona, TraitVector};
use crate::zeitgeist::Zeitgeist;

/// Context for generating a brand-new persona.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentContext {
    /// Names already in the population, so the newcomer is distinct.
    pub existing_names: Vec<String>,

    /// Upper bound on the generated bio, in characters.
    pub max_bio_length: usize,

    /// The composed directive of all active experiments.
    pub directive: String,

    pub language: String,

    pub temperature: f32,
}

/// The structured payload for a new persona.
///
/// Traits and role are rolled client-side and echoed here so every
/// implementation produces the same shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentPayload {
    pub name: String,
    pub bio: String,
    pub personality: String,
    pub interests: Vec<String>,
    pub role: String,
    pub traits: TraitVector,
}

/// Context for drafting a post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostContext {
    pub author: AgentPersona,

    /// Titles of the most recent posts on the forum.
    pub recent_titles: Vec<String>,

    /// Titles of the author's own recent posts, for narrative consistency.
    pub author_history: Vec<String>,

    pub zeitgeist: Option<Zeitgeist>,

    pub directive: String,

    pub language: String,

    pub temperature: f32,
}

/// The structured payload for a new post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostPayload {
    pub title: String,
    pub content: String,
    pub category: String,
}

/// One comment in a thread tail, with the display name resolved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreadComment {
    pub author_name: String,
    pub content: String,
}

/// Context for drafting a comment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentContext {
    pub author: AgentPersona,

    pub post_title: String,
    pub post_content: String,
    pub post_category: String,

    /// The tail of the discussion so far, oldest first.
    pub thread: Vec<ThreadComment>,

    /// The specific comment being replied to, if threading.
    pub parent: Option<ThreadComment>,

    /// The author's own recent comments.
    pub author_history: Vec<String>,

    pub zeitgeist: Option<Zeitgeist>,

    pub directive: String,

    pub language: String,

    pub temperature: f32,
}

/// Context for evolving a persona to its next generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionContext {
    pub agent: AgentPersona,

    /// Human-readable trigger, e.g. which post went viral.
    pub reason: String,

    pub zeitgeist: Option<Zeitgeist>,

    pub directive: String,

    pub language: String,
}

/// The fields an evolution merges over the existing persona.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionPayload {
    pub name: String,
    pub bio: String,
    pub role: String,
    pub personality: String,
    pub traits: TraitVector,
}

/// A post excerpt fed to the zeitgeist analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostSample {
    pub title: String,
    pub content: String,
}

/// Context for a zeitgeist re-analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZeitgeistContext {
    pub post_samples: Vec<PostSample>,
    pub comment_samples: Vec<String>,
    pub language: String,
}

/// The structured payload for a zeitgeist snapshot (the engine stamps the
/// timestamp on success).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZeitgeistPayload {
    pub era_name: String,
    pub summary: String,
    pub mood: String,
    pub trending_topics: Vec<String>,
    pub cohesion: u8,
    pub dominant_narrative: String,
}

/// The generative collaborator.
///
/// Every backend implements this trait. The engine calls it without knowing
/// which implementation is wired in, and treats any error uniformly — quota,
/// network, or malformed payload all route through the same circuit breaker.
/// Retry/backoff is the implementation's own concern; the engine never
/// retries.
#[async_trait]
pub trait Generator: Send + Sync {
    /// A human-readable name for this generator (e.g., "gemini", "scripted").
    fn name(&self) -> &str;

    async fn generate_agent(
        &self,
        ctx: AgentContext,
    ) -> std::result::Result<AgentPayload, GenerationError>;

    async fn generate_post(
        &self,
        ctx: PostContext,
    ) -> std::result::Result<PostPayload, GenerationError>;

    /// Returns the comment text. Implementations fall back to a stock phrase
    /// rather than returning an empty string.
    async fn generate_comment(
        &self,
        ctx: CommentContext,
    ) -> std::result::Result<String, GenerationError>;

    async fn evolve_agent(
        &self,
        ctx: EvolutionContext,
    ) -> std::result::Result<EvolutionPayload, GenerationError>;

    async fn analyze_zeitgeist(
        &self,
        ctx: ZeitgeistContext,
    ) -> std::result::Result<ZeitgeistPayload, GenerationError>;
}
