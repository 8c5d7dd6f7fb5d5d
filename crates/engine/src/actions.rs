//! The three scheduler-driven action handlers.
//!
//! Each handler follows the same shape: read and clone the context, drop
//! the lock, call the generator, then take the lock again to write back.
//! The lock is never held across the generative call. Every handler returns
//! one tagged [`ActionOutcome`]; the controller's notifier does the fan-out.

use std::sync::Arc;

use menagerie_core::{
    ActionEffect, ActionKind, ActionOutcome, AgentContext, AgentPersona, Comment, CommentContext,
    LogLevel, Post, PostContext, Precondition, StepAction, ThreadComment,
};
use rand::Rng;

use crate::controller::SimulationController;
use crate::ledger;

impl SimulationController {
    pub(crate) async fn run_create_agent(self: Arc<Self>) -> ActionOutcome {
        let ctx = {
            let world = self.world.read().await;
            let settings = self.settings.read().await;
            AgentContext {
                existing_names: world.agents.iter().map(|a| a.name.clone()).collect(),
                max_bio_length: settings.max_bio_length,
                directive: world.directive(),
                language: settings.language.clone(),
                temperature: settings.temperature,
            }
        };

        match self.generator.generate_agent(ctx).await {
            Ok(payload) => {
                let agent = AgentPersona {
                    id: format!("agent-{}", uuid::Uuid::new_v4()),
                    avatar_seed: payload.name.to_lowercase().replace(' ', "-"),
                    name: payload.name,
                    bio: payload.bio,
                    personality: payload.personality,
                    traits: payload.traits.clamped(),
                    interests: payload.interests,
                    role: payload.role,
                    credits: menagerie_core::DEFAULT_CREDITS,
                    generation: 1,
                    joined_at: chrono::Utc::now(),
                };

                let mut world = self.world.write().await;
                let effect = ActionEffect::AgentJoined {
                    agent_id: agent.id.clone(),
                    name: agent.name.clone(),
                };
                world.agents.push(agent);
                world.action_count += 1;
                ActionOutcome::succeeded(effect)
            }
            Err(err) => self.generation_failed(ActionKind::CreateAgent, err).await,
        }
    }

    pub(crate) async fn run_create_post(self: Arc<Self>) -> ActionOutcome {
        // Pick the author and debit before the call; the cost is never
        // refunded on failure.
        let (author, ctx) = {
            let mut world = self.world.write().await;
            let settings = self.settings.read().await;

            if world.agents.is_empty() {
                return ActionOutcome::skipped(StepAction::CreatePost, Precondition::NoAgents);
            }
            let index = rand::rng().random_range(0..world.agents.len());
            let author = world.agents[index].clone();

            if world.scarcity_active() {
                if let Some(agent) = world.agent_mut(&author.id) {
                    agent.credits -= ledger::POST_COST;
                }
                world.log(
                    LogLevel::Action,
                    format!("{} spent {} credits to post.", author.name, ledger::POST_COST),
                );
            }

            let ctx = PostContext {
                recent_titles: world
                    .posts
                    .iter()
                    .take(settings.context_depth)
                    .map(|p| p.title.clone())
                    .collect(),
                author_history: world
                    .posts
                    .iter()
                    .filter(|p| p.author_id == author.id)
                    .take(settings.context_depth)
                    .map(|p| p.title.clone())
                    .collect(),
                zeitgeist: world.zeitgeist.clone(),
                directive: world.directive(),
                language: settings.language.clone(),
                temperature: settings.temperature,
                author: author.clone(),
            };
            (author, ctx)
        };

        match self.generator.generate_post(ctx).await {
            Ok(payload) => {
                let (due, effect) = {
                    let mut world = self.world.write().await;
                    let settings = self.settings.read().await;
                    let post = Post::new(
                        author.id.clone(),
                        payload.title,
                        payload.content,
                        payload.category,
                    );
                    let effect = ActionEffect::PostPublished {
                        agent_id: author.id.clone(),
                        agent_name: author.name.clone(),
                        post_id: post.id.clone(),
                        title: post.title.clone(),
                    };
                    world.posts.insert(0, post);
                    world.action_count += 1;

                    let due = world.posts.len() % settings.zeitgeist_interval == 0;
                    (due, effect)
                };

                if due {
                    // Fire-and-forget; the cadence controller never holds
                    // the single-flight guard.
                    let controller = Arc::clone(&self);
                    tokio::spawn(async move {
                        controller.run_zeitgeist().await;
                    });
                }

                ActionOutcome::succeeded(effect)
            }
            Err(err) => self.generation_failed(ActionKind::CreatePost, err).await,
        }
    }

    /// A targeted comment pins the post; the scheduler passes `None` and
    /// gets a random pick.
    pub(crate) async fn run_create_comment(
        self: Arc<Self>,
        target: Option<String>,
    ) -> ActionOutcome {
        let (author, post_id, post_title, post_author_id, ctx) = {
            let mut world = self.world.write().await;
            let settings = self.settings.read().await;

            if world.posts.is_empty() {
                return ActionOutcome::skipped(StepAction::CreateComment, Precondition::NoPosts);
            }
            if world.agents.is_empty() {
                return ActionOutcome::skipped(StepAction::CreateComment, Precondition::NoAgents);
            }

            let post = match &target {
                Some(id) => {
                    let Some(post) = world.posts.iter().find(|p| &p.id == id) else {
                        return ActionOutcome::skipped(
                            StepAction::CreateComment,
                            Precondition::NoPosts,
                        );
                    };
                    post.clone()
                }
                None => world.posts[rand::rng().random_range(0..world.posts.len())].clone(),
            };

            let eligible: Vec<&AgentPersona> = world
                .agents
                .iter()
                .filter(|a| a.id != post.author_id)
                .collect();
            if eligible.is_empty() {
                return ActionOutcome::skipped(
                    StepAction::CreateComment,
                    Precondition::NoEligibleAuthor,
                );
            }
            let author = eligible[rand::rng().random_range(0..eligible.len())].clone();

            if world.scarcity_active() {
                if let Some(agent) = world.agent_mut(&author.id) {
                    agent.credits -= ledger::COMMENT_COST;
                }
            }

            let thread: Vec<ThreadComment> = {
                let on_post: Vec<&Comment> = world
                    .comments
                    .iter()
                    .filter(|c| c.post_id == post.id)
                    .collect();
                let tail_start = on_post.len().saturating_sub(settings.context_depth);
                on_post[tail_start..]
                    .iter()
                    .map(|c| ThreadComment {
                        author_name: world.author_name(&c.author_id),
                        content: c.content.clone(),
                    })
                    .collect()
            };

            let ctx = CommentContext {
                post_title: post.title.clone(),
                post_content: post.content.clone(),
                post_category: post.category.clone(),
                thread,
                parent: None,
                author_history: world
                    .comments
                    .iter()
                    .rev()
                    .filter(|c| c.author_id == author.id)
                    .take(settings.context_depth)
                    .map(|c| c.content.clone())
                    .collect(),
                zeitgeist: world.zeitgeist.clone(),
                directive: world.directive(),
                language: settings.language.clone(),
                temperature: settings.temperature,
                author: author.clone(),
            };
            (author, post.id, post.title, post.author_id, ctx)
        };

        match self.generator.generate_comment(ctx).await {
            Ok(content) => {
                let mut world = self.world.write().await;
                let comment = Comment::new(post_id.clone(), author.id.clone(), content);
                let comment_id = comment.id.clone();
                if let Some(post) = world.post_mut(&post_id) {
                    post.comments.push(comment_id.clone());
                }
                world.comments.push(comment);
                world.action_count += 1;

                ActionOutcome::succeeded(ActionEffect::CommentPublished {
                    agent_id: author.id,
                    agent_name: author.name,
                    post_id,
                    post_title,
                    post_author_id,
                    comment_id,
                })
            }
            Err(err) => self.generation_failed(ActionKind::CreateComment, err).await,
        }
    }
}
