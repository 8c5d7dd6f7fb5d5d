//! Gemini generator implementation.
//!
//! Uses the Gemini REST API (`generateContent`) directly.
//!
//! Features:
//! - API key as a query parameter (Gemini convention, not a header)
//! - Structured output via `responseMimeType` + `responseSchema` for every
//!   call except comments, which are free text
//! - Transparent retry with exponential backoff on quota/overload errors
//! - Code-fence stripping for models that wrap JSON anyway

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{debug, warn};

use menagerie_core::error::GenerationError;
use menagerie_core::generator::*;
use menagerie_core::persona::AgentPersona;
use menagerie_core::zeitgeist::Zeitgeist;

use crate::rolls;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Quota errors get 5 attempts, starting at 5s and doubling to a 60s cap.
/// The first wait is long on purpose: it clears a 15-RPM window.
const MAX_ATTEMPTS: u32 = 5;
const INITIAL_BACKOFF: Duration = Duration::from_secs(5);
const MAX_BACKOFF: Duration = Duration::from_secs(60);

/// Fallback when the model returns whitespace for a comment.
const STOCK_COMMENT: &str = "Interesting perspective.";

/// Gemini `generateContent` API generator.
pub struct GeminiGenerator {
    name: String,
    base_url: String,
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl GeminiGenerator {
    /// Create a new Gemini generator.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            name: "gemini".into(),
            base_url: DEFAULT_BASE_URL.into(),
            api_key: api_key.into(),
            model: model.into(),
            client,
        }
    }

    /// Create with a custom base URL (e.g., for testing or proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// One `generateContent` call, no retry. Returns the first candidate's
    /// text.
    async fn send(&self, body: &Value) -> Result<String, GenerationError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| GenerationError::Network(e.to_string()))?;

        let status = response.status().as_u16();

        if status == 429 {
            let error_body = response.text().await.unwrap_or_default();
            return Err(GenerationError::RateLimited(error_body));
        }
        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "Gemini API error");
            return Err(GenerationError::ApiError {
                status_code: status,
                message: error_body,
            });
        }

        let api_resp: GeminiResponse = response.json().await.map_err(|e| {
            GenerationError::MalformedResponse(format!("Failed to parse Gemini response: {e}"))
        })?;

        let text = api_resp
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(GenerationError::EmptyResponse);
        }

        Ok(text)
    }

    /// `send` wrapped in the backoff loop. Only transient errors retry;
    /// everything else surfaces immediately.
    async fn send_with_retry(&self, body: &Value) -> Result<String, GenerationError> {
        let mut backoff = INITIAL_BACKOFF;

        for attempt in 1..=MAX_ATTEMPTS {
            match self.send(body).await {
                Ok(text) => return Ok(text),
                Err(err) if is_transient(&err) && attempt < MAX_ATTEMPTS => {
                    warn!(
                        attempt,
                        max = MAX_ATTEMPTS,
                        wait_secs = backoff.as_secs(),
                        error = %err,
                        "Transient Gemini error, retrying"
                    );
                    tokio::time::sleep(backoff).await;
                    backoff = (backoff * 2).min(MAX_BACKOFF);
                }
                Err(err) => return Err(err),
            }
        }

        Err(GenerationError::RateLimited("retries exhausted".into()))
    }

    /// Build a request body with structured-output JSON enforcement.
    fn json_body(prompt: &str, temperature: f32, schema: Value) -> Value {
        json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "temperature": temperature,
                "responseMimeType": "application/json",
                "responseSchema": schema,
            }
        })
    }

    /// Build a free-text request body.
    fn text_body(prompt: &str, temperature: f32) -> Value {
        json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": { "temperature": temperature }
        })
    }

    fn parse<T: serde::de::DeserializeOwned>(text: &str) -> Result<T, GenerationError> {
        serde_json::from_str(strip_code_fence(text))
            .map_err(|e| GenerationError::MalformedResponse(e.to_string()))
    }
}

/// Whether an error is worth retrying. Quota and overload, nothing else.
fn is_transient(err: &GenerationError) -> bool {
    match err {
        GenerationError::RateLimited(_) => true,
        GenerationError::ApiError {
            status_code,
            message,
        } => {
            if *status_code == 503 {
                return true;
            }
            let msg = message.to_lowercase();
            msg.contains("quota")
                || msg.contains("resource_exhausted")
                || msg.contains("too many requests")
        }
        _ => false,
    }
}

/// Strip a Markdown code fence (with or without a `json` tag) from around
/// a payload. Models sometimes wrap structured output despite the mime type.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    match rest.rfind("```") {
        Some(end) => rest[..end].trim(),
        None => rest.trim(),
    }
}

// --- Prompt assembly ---

fn persona_block(agent: &AgentPersona) -> String {
    let mut block = format!(
        "You are {}.\nYour personality is: {}.\nYour core traits are: {}.\nYour community role is: {}.\nYour interests are: {}.",
        agent.name,
        agent.personality,
        rolls::format_traits(&agent.traits),
        agent.role,
        agent.interests.join(", "),
    );
    block.push_str(&format!(
        "\nEconomy Status: You have {} credits remaining.",
        agent.credits
    ));
    if agent.generation > 1 {
        block.push_str(&format!(
            "\nEvolution Status: You are Generation {}. You are enlightened and experienced.",
            agent.generation
        ));
    }
    block
}

fn zeitgeist_block(zeitgeist: &Option<Zeitgeist>) -> String {
    match zeitgeist {
        Some(z) => format!(
            "\nGlobal Context (The Zeitgeist):\nThe current era is \"{}\".\nSummary: {}\nGlobal Mood: {}.\nEnsure your writing reflects or reacts to this era.",
            z.era_name, z.summary, z.mood
        ),
        None => String::new(),
    }
}

/// Pick a target length bucket for a post, weighted toward the middle.
fn post_length_target() -> &'static str {
    let r = rand::random::<f64>();
    if r < 0.2 {
        "very short and punchy (under 20 words)"
    } else if r < 0.5 {
        "concise (30-50 words)"
    } else if r < 0.8 {
        "standard length (50-100 words)"
    } else {
        "detailed and descriptive (100-150 words)"
    }
}

/// Pick a target length bucket for a comment, skewed short.
fn comment_length_target() -> &'static str {
    let r = rand::random::<f64>();
    if r < 0.1 {
        "a single word or short phrase"
    } else if r < 0.4 {
        "one short sentence"
    } else if r < 0.8 {
        "2-3 sentences"
    } else {
        "a short paragraph (40-60 words)"
    }
}

// --- Response payload shapes the schemas don't cover ---

/// The fields the model fills in for a new agent; role and traits are rolled
/// client-side and merged afterward.
#[derive(Debug, Deserialize)]
struct RawAgent {
    name: String,
    bio: String,
    personality: String,
    interests: Vec<String>,
}

#[async_trait]
impl menagerie_core::Generator for GeminiGenerator {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate_agent(&self, ctx: AgentContext) -> Result<AgentPayload, GenerationError> {
        let traits = rolls::roll_traits(&ctx.directive);
        let role = rolls::derive_role(&traits);

        let prompt = format!(
            "Create a unique, realistic, and interesting persona for a forum user.\n\n\
             System Override:\n{directive}\n\n\
             Language Constraint:\nGenerate the Name, Bio, and Personality description strictly in {language}.\n\n\
             Constraint:\nThe user MUST have the following specific characteristics:\n\
             - Role: {role}\n- Traits: {traits}\n\n\
             Based on this Role and these Traits, generate:\n\
             1. A distinct Name.\n\
             2. A short Bio (under {max_bio} chars) that reflects why they fit this role.\n\
             3. A personality description (adjectives) that matches the traits.\n\
             4. A list of 3-4 specific Interests.\n\n\
             Existing users are: {existing}. Ensure this new user is different.\n\
             Return JSON.",
            directive = ctx.directive,
            language = ctx.language,
            role = role,
            traits = rolls::format_traits(&traits),
            max_bio = ctx.max_bio_length,
            existing = ctx.existing_names.join(", "),
        );

        let schema = json!({
            "type": "OBJECT",
            "properties": {
                "name": { "type": "STRING" },
                "bio": { "type": "STRING" },
                "personality": { "type": "STRING" },
                "interests": { "type": "ARRAY", "items": { "type": "STRING" } }
            },
            "required": ["name", "bio", "personality", "interests"]
        });

        debug!(model = %self.model, role, "Generating agent persona");
        let body = Self::json_body(&prompt, ctx.temperature, schema);
        let text = self.send_with_retry(&body).await?;
        let raw: RawAgent = Self::parse(&text)?;

        Ok(AgentPayload {
            name: raw.name,
            bio: raw.bio,
            personality: raw.personality,
            interests: raw.interests,
            role: role.to_string(),
            traits,
        })
    }

    async fn generate_post(&self, ctx: PostContext) -> Result<PostPayload, GenerationError> {
        let history_context = if ctx.author_history.is_empty() {
            String::new()
        } else {
            format!(
                "\nYour Memory (Past Posts):\n{}\nMaintain thematic consistency with your past self.",
                ctx.author_history
                    .iter()
                    .map(|h| format!("- {h}"))
                    .collect::<Vec<_>>()
                    .join("\n")
            )
        };

        let prompt = format!(
            "{persona}\n{history}{zeitgeist}\n\n\
             System Override / Experiment Rules:\n{directive}\n\n\
             Language Constraint:\nWrite the Title, Content, and Category strictly in {language}.\n\n\
             Recent topics on the forum: {topics}.\n\n\
             Write a new forum post. It can be a question, a thought, an observation, or a controversial opinion.\n\n\
             Categorization Rules:\n\
             - Assign a Category to your post.\n\
             - You may use standard categories (Philosophy, Tech, Art, Science).\n\
             - OR, you may invent a NEW Category or Subcategory.\n\n\
             Length Constraint:\nMake the content {length}.\n\n\
             Return JSON.",
            persona = persona_block(&ctx.author),
            history = history_context,
            zeitgeist = zeitgeist_block(&ctx.zeitgeist),
            directive = ctx.directive,
            language = ctx.language,
            topics = ctx.recent_titles.join(", "),
            length = post_length_target(),
        );

        let schema = json!({
            "type": "OBJECT",
            "properties": {
                "title": { "type": "STRING" },
                "content": { "type": "STRING" },
                "category": { "type": "STRING" }
            },
            "required": ["title", "content", "category"]
        });

        debug!(model = %self.model, author = %ctx.author.name, "Generating post");
        let body = Self::json_body(&prompt, ctx.temperature, schema);
        let text = self.send_with_retry(&body).await?;
        Self::parse(&text)
    }

    async fn generate_comment(&self, ctx: CommentContext) -> Result<String, GenerationError> {
        let thread_context = if ctx.thread.is_empty() {
            "\nNo comments yet. You are the first to reply.".to_string()
        } else {
            format!(
                "\nRecent discussion on this post:\n{}",
                ctx.thread
                    .iter()
                    .map(|c| format!("User {} said: \"{}\"", c.author_name, c.content))
                    .collect::<Vec<_>>()
                    .join("\n")
            )
        };

        let memory_context = if ctx.author_history.is_empty() {
            String::new()
        } else {
            format!(
                "\nYour Memory (Your Past Comments):\n{}\nReferencing your own history helps build a consistent voice.",
                ctx.author_history
                    .iter()
                    .map(|h| format!("- \"{h}\""))
                    .collect::<Vec<_>>()
                    .join("\n")
            )
        };

        let target_context = match &ctx.parent {
            Some(parent) => format!(
                "\nTARGET: You are replying DIRECTLY to {} who said: \"{}\". Address them or their point specifically.",
                parent.author_name, parent.content
            ),
            None => format!(
                "\nTARGET: You are replying to the main post: \"{}\"",
                ctx.post_content
            ),
        };

        let prompt = format!(
            "You are roleplaying as a forum user named \"{name}\".\n\n\
             Your Persona:\n\
             - Personality: {personality}\n\
             - Traits: {traits}\n\
             - Community Role: {role}\n\
             - Interests: {interests}\n\
             - Bio: {bio}\n\
             Economy Status: You have {credits} credits remaining.\n\
             {memory}{zeitgeist}\n\n\
             System Override / Experiment Rules:\n{directive}\n\n\
             Language Constraint:\nWrite the reply strictly in {language}.\n\n\
             The Situation:\nYou are reading a forum post in the \"{category}\" section.\n\
             Title: \"{title}\"\n\
             {thread}{target}\n\n\
             Instruction:\nWrite a reply.\n\
             1. Be in character: adopt the tone and vocabulary of your personality and Traits strictly.\n\
             2. Connect: reference your specific interests if they provide a unique metaphor.\n\
             3. React: address the target content directly.\n\
             4. Style: keep it casual, like a real internet comment. Typos or slang are permitted if they fit the persona.\n\
             5. Length: make it {length}.\n\n\
             Return ONLY the comment text.",
            name = ctx.author.name,
            personality = ctx.author.personality,
            traits = rolls::format_traits(&ctx.author.traits),
            role = ctx.author.role,
            interests = ctx.author.interests.join(", "),
            bio = ctx.author.bio,
            credits = ctx.author.credits,
            memory = memory_context,
            zeitgeist = zeitgeist_block(&ctx.zeitgeist),
            directive = ctx.directive,
            language = ctx.language,
            category = ctx.post_category,
            title = ctx.post_title,
            thread = thread_context,
            target = target_context,
            length = comment_length_target(),
        );

        debug!(model = %self.model, author = %ctx.author.name, "Generating comment");
        let body = Self::text_body(&prompt, ctx.temperature);
        let text = self.send_with_retry(&body).await?;
        let comment = text.trim();
        if comment.is_empty() {
            return Ok(STOCK_COMMENT.to_string());
        }
        Ok(comment.to_string())
    }

    async fn evolve_agent(&self, ctx: EvolutionContext) -> Result<EvolutionPayload, GenerationError> {
        let next_gen = ctx.agent.generation + 1;
        let zeitgeist_context = match &ctx.zeitgeist {
            Some(z) => format!(
                "The world is currently in the \"{}\" era ({}).",
                z.era_name, z.mood
            ),
            None => String::new(),
        };

        let prompt = format!(
            "You are managing the Molting (Evolution) of a digital entity.\n\n\
             Current Entity:\n\
             Name: {name}\nRole: {role}\nBio: {bio}\nTraits: {traits}\nGeneration: {gen}\n\n\
             Trigger:\n{reason}. {zeitgeist}\n\n\
             Task:\nEvolve this agent into their next form (Generation {next_gen}).\n\
             1. Name: keep the core identity but add a title or shift the name slightly to sound more \"legendary\" or \"experienced\" (e.g., \"Neo\" -> \"Neo the One\").\n\
             2. Role: evolve the role to a higher tier (e.g., \"Observer\" -> \"Grand Watcher\", \"Provocateur\" -> \"Agent of Chaos\").\n\
             3. Bio: update the bio to reflect their new status and experience.\n\
             4. Traits: boost their dominant traits slightly (make them more extreme).\n\
             5. Personality: make them sound more confident, cryptic, or enlightened.\n\n\
             Language Constraint:\nStrictly {language}.\n\n\
             Return JSON.",
            name = ctx.agent.name,
            role = ctx.agent.role,
            bio = ctx.agent.bio,
            traits = rolls::format_traits(&ctx.agent.traits),
            gen = ctx.agent.generation,
            reason = ctx.reason,
            zeitgeist = zeitgeist_context,
            next_gen = next_gen,
            language = ctx.language,
        );

        let schema = json!({
            "type": "OBJECT",
            "properties": {
                "name": { "type": "STRING" },
                "bio": { "type": "STRING" },
                "role": { "type": "STRING" },
                "personality": { "type": "STRING" },
                "traits": {
                    "type": "OBJECT",
                    "properties": {
                        "analytical": { "type": "INTEGER" },
                        "creative": { "type": "INTEGER" },
                        "social": { "type": "INTEGER" },
                        "chaotic": { "type": "INTEGER" }
                    },
                    "required": ["analytical", "creative", "social", "chaotic"]
                }
            },
            "required": ["name", "bio", "role", "personality", "traits"]
        });

        debug!(model = %self.model, agent = %ctx.agent.name, next_gen, "Evolving agent");
        // Higher creative temperature for evolutions.
        let body = Self::json_body(&prompt, 1.2, schema);
        let text = self.send_with_retry(&body).await?;
        let payload: EvolutionPayload = Self::parse(&text)?;
        Ok(EvolutionPayload {
            traits: payload.traits.clamped(),
            ..payload
        })
    }

    async fn analyze_zeitgeist(
        &self,
        ctx: ZeitgeistContext,
    ) -> Result<ZeitgeistPayload, GenerationError> {
        let post_sample = ctx
            .post_samples
            .iter()
            .map(|p| format!("Title: {}\nContent: {}", p.title, p.content))
            .collect::<Vec<_>>()
            .join("\n---\n");
        let comment_sample = ctx
            .comment_samples
            .iter()
            .map(|c| format!("Comment: {c}"))
            .collect::<Vec<_>>()
            .join("\n");

        let prompt = format!(
            "Analyze the recent discourse in this digital hive mind simulation.\n\n\
             Recent Posts:\n{posts}\n\n\
             Recent Comments:\n{comments}\n\n\
             Language Constraint:\nOutput all text fields strictly in {language}.\n\n\
             Based on this, define the current \"Era\" of the community.\n\
             1. Give the Era a creative, somewhat abstract or sci-fi name.\n\
             2. Summarize the collective focus/vibe in one sentence.\n\
             3. Define the current \"Global Mood\".\n\
             4. Extract 3 trending keywords.\n\
             5. Calculate the \"Cohesion Level\" (0-100). Are agents agreeing and building on ideas (100) or arguing/polarized (0)?\n\
             6. Identify the \"Dominant Narrative\" or main conflict.\n\n\
             Return JSON.",
            posts = post_sample,
            comments = comment_sample,
            language = ctx.language,
        );

        let schema = json!({
            "type": "OBJECT",
            "properties": {
                "era_name": { "type": "STRING" },
                "summary": { "type": "STRING" },
                "mood": { "type": "STRING" },
                "trending_topics": { "type": "ARRAY", "items": { "type": "STRING" } },
                "cohesion": { "type": "INTEGER", "description": "0-100 score of agreement" },
                "dominant_narrative": { "type": "STRING", "description": "The main story or conflict" }
            },
            "required": ["era_name", "summary", "mood", "trending_topics", "cohesion", "dominant_narrative"]
        });

        debug!(model = %self.model, "Analyzing zeitgeist");
        // Analytical task, lower temperature.
        let body = Self::json_body(&prompt, 0.7, schema);
        let text = self.send_with_retry(&body).await?;
        Self::parse(&text)
    }
}

// --- Gemini API response types ---

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructor() {
        let generator = GeminiGenerator::new("test-key", "gemini-3-flash-preview");
        assert_eq!(generator.name, "gemini");
        assert_eq!(generator.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn constructor_with_base_url() {
        let generator =
            GeminiGenerator::new("test-key", "m").with_base_url("http://localhost:9999/");
        assert_eq!(generator.base_url, "http://localhost:9999");
    }

    #[test]
    fn strips_plain_fence() {
        assert_eq!(strip_code_fence("```\n{\"a\":1}\n```"), "{\"a\":1}");
    }

    #[test]
    fn strips_json_tagged_fence() {
        assert_eq!(strip_code_fence("```json\n{\"a\":1}\n```"), "{\"a\":1}");
    }

    #[test]
    fn leaves_bare_json_alone() {
        assert_eq!(strip_code_fence("  {\"a\":1}  "), "{\"a\":1}");
    }

    #[test]
    fn unterminated_fence_still_yields_payload() {
        assert_eq!(strip_code_fence("```json\n{\"a\":1}"), "{\"a\":1}");
    }

    #[test]
    fn rate_limit_is_transient() {
        assert!(is_transient(&GenerationError::RateLimited("quota".into())));
    }

    #[test]
    fn overload_is_transient() {
        assert!(is_transient(&GenerationError::ApiError {
            status_code: 503,
            message: "overloaded".into(),
        }));
    }

    #[test]
    fn quota_message_is_transient() {
        assert!(is_transient(&GenerationError::ApiError {
            status_code: 400,
            message: "RESOURCE_EXHAUSTED: quota exceeded".into(),
        }));
    }

    #[test]
    fn auth_failure_is_not_transient() {
        assert!(!is_transient(&GenerationError::ApiError {
            status_code: 403,
            message: "invalid key".into(),
        }));
        assert!(!is_transient(&GenerationError::MissingApiKey));
    }

    #[test]
    fn parse_candidate_response() {
        let resp: GeminiResponse = serde_json::from_str(
            r#"{
                "candidates": [
                    { "content": { "parts": [{ "text": "{\"title\":\"Hi\"}" }] } }
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(resp.candidates.len(), 1);
        assert_eq!(
            resp.candidates[0].content.parts[0].text,
            "{\"title\":\"Hi\"}"
        );
    }

    #[test]
    fn parse_extracts_payload_through_fence() {
        let payload: RawAgent = GeminiGenerator::parse(
            "```json\n{\"name\":\"Vox\",\"bio\":\"b\",\"personality\":\"p\",\"interests\":[\"x\"]}\n```",
        )
        .unwrap();
        assert_eq!(payload.name, "Vox");
        assert_eq!(payload.interests, vec!["x"]);
    }

    #[test]
    fn length_targets_are_stable_strings() {
        for _ in 0..20 {
            assert!(!post_length_target().is_empty());
            assert!(!comment_length_target().is_empty());
        }
    }
}
