//! Observer and admin commands.
//!
//! Everything a human can do to the world from outside the scheduler:
//! engagement on posts, broadcasts, trait surgery, and the economy gauge.
//! Commands mutate synchronously under the world lock and return updated
//! clones for the caller to render.

use std::sync::Arc;

use rand::Rng;

use menagerie_core::{
    ActivityKind, AgentPersona, CommandError, Error, InteractionEvent, InteractionKind, LogLevel,
    OBSERVER_ID, Post, Result, SYSTEM_AUTHOR, SimEvent, TraitAxis, TraitPatch,
};

use crate::controller::SimulationController;
use crate::ledger;

impl SimulationController {
    /// Like a post: bump the counter, reward the author under scarcity,
    /// and check the evolution milestone.
    pub async fn like_post(self: &Arc<Self>, post_id: &str) -> Result<Post> {
        let (updated, author_id, title, new_likes) = {
            let mut world = self.world.write().await;
            let Some(post) = world.post_mut(post_id) else {
                return Err(Error::Command(CommandError::PostNotFound(post_id.into())));
            };
            post.likes += 1;
            let updated = post.clone();
            let author_id = updated.author_id.clone();
            let title = updated.title.clone();
            let new_likes = updated.likes;

            if world.scarcity_active() && author_id != SYSTEM_AUTHOR {
                if let Some(agent) = world.agent_mut(&author_id) {
                    agent.credits += ledger::REACTION_REWARD;
                    let name = agent.name.clone();
                    world.log(
                        LogLevel::Action,
                        format!("{name} gained {} credits from a like.", ledger::REACTION_REWARD),
                    );
                }
                // Engagement farming frays the collective mood.
                if let Some(zeitgeist) = world.zeitgeist.as_mut() {
                    zeitgeist.cohesion = zeitgeist.cohesion.saturating_sub(2);
                }
            }

            world.interactions.push(InteractionEvent::new(
                OBSERVER_ID,
                author_id.clone(),
                InteractionKind::Reaction,
                format!("Liked \"{title}\""),
            ));

            (updated, author_id, title, new_likes)
        };

        self.maybe_evolve(
            author_id,
            format!("Post \"{title}\" went viral ({new_likes} likes)"),
            new_likes,
        );
        Ok(updated)
    }

    /// Toggle the observer's emoji reaction on a post.
    ///
    /// Re-reacting with the same emoji clears it; switching emoji moves the
    /// tally with no net like change. The author's scarcity reward lands on
    /// every invocation, clears included. No evolution check here.
    pub async fn react_post(&self, post_id: &str, emoji: &str) -> Result<Post> {
        let mut world = self.world.write().await;
        let Some(post) = world.post_mut(post_id) else {
            return Err(Error::Command(CommandError::PostNotFound(post_id.into())));
        };

        if let Some(old) = post.observer_reaction.take() {
            if let Some(tally) = post.reactions.get_mut(&old) {
                *tally = tally.saturating_sub(1);
                if *tally == 0 {
                    post.reactions.remove(&old);
                }
            }
            post.likes = post.likes.saturating_sub(1);
            if old != emoji {
                *post.reactions.entry(emoji.to_string()).or_insert(0) += 1;
                post.likes += 1;
                post.observer_reaction = Some(emoji.to_string());
            }
        } else {
            *post.reactions.entry(emoji.to_string()).or_insert(0) += 1;
            post.likes += 1;
            post.observer_reaction = Some(emoji.to_string());
        }

        let updated = post.clone();
        let author_id = updated.author_id.clone();
        let title = updated.title.clone();

        if world.scarcity_active() && author_id != SYSTEM_AUTHOR {
            if let Some(agent) = world.agent_mut(&author_id) {
                agent.credits += ledger::REACTION_REWARD;
                let name = agent.name.clone();
                world.log(
                    LogLevel::Action,
                    format!("{name} extracted value via a reaction."),
                );
            }
        }

        world.interactions.push(InteractionEvent::new(
            OBSERVER_ID,
            author_id,
            InteractionKind::Reaction,
            format!("{emoji} reaction to \"{title}\""),
        ));

        Ok(updated)
    }

    /// Simulate ambient traffic on a post: a small view bump and an
    /// occasional stray like.
    pub async fn refresh_post(&self, post_id: &str) -> Result<Post> {
        let mut world = self.world.write().await;
        let Some(post) = world.post_mut(post_id) else {
            return Err(Error::Command(CommandError::PostNotFound(post_id.into())));
        };
        let mut rng = rand::rng();
        post.views += rng.random_range(1..=5);
        if rng.random::<f64>() < 0.1 {
            post.likes += 1;
        }
        Ok(post.clone())
    }

    /// Publish a sticky system-authored announcement at the top of the feed.
    pub async fn broadcast(&self, message: &str) -> Post {
        let mut post = Post::new(
            SYSTEM_AUTHOR,
            "\u{26a0}\u{fe0f} GLOBAL BROADCAST",
            message,
            crate::seeds::CATEGORIES[5],
        );
        post.likes = 999;
        post.views = 999;
        post.sticky = true;
        let published = post.clone();

        {
            let mut world = self.world.write().await;
            world.record_activity(
                SYSTEM_AUTHOR,
                ActivityKind::PostCreated {
                    post_id: post.id.clone(),
                    post_title: post.title.clone(),
                },
            );
            world.log(LogLevel::Action, format!("ADMIN BROADCAST: \"{message}\""));
            world.posts.insert(0, post);
        }

        self.bus.publish(SimEvent::BroadcastSent);
        published
    }

    /// Apply a trait patch to the whole population. Returns the number of
    /// agents touched.
    pub async fn mass_update_traits(&self, patch: TraitPatch) -> usize {
        let mut world = self.world.write().await;
        for agent in &mut world.agents {
            patch.apply(&mut agent.traits);
        }
        let count = world.agents.len();
        world.log(LogLevel::Action, "MASS INDOCTRINATION EVENT TRIGGERED");
        count
    }

    /// Set one trait axis on one agent.
    pub async fn adjust_trait(
        &self,
        agent_id: &str,
        axis: TraitAxis,
        value: u8,
    ) -> Result<AgentPersona> {
        let mut world = self.world.write().await;
        let Some(agent) = world.agent_mut(agent_id) else {
            return Err(Error::Command(CommandError::AgentNotFound(agent_id.into())));
        };
        agent.traits.set(axis, value);
        Ok(agent.clone())
    }

    /// Remove an agent from the population. Its posts and comments remain.
    pub async fn delete_agent(&self, agent_id: &str) -> Result<()> {
        let mut world = self.world.write().await;
        let Some(pos) = world.agents.iter().position(|a| a.id == agent_id) else {
            return Err(Error::Command(CommandError::AgentNotFound(agent_id.into())));
        };
        let removed = world.agents.remove(pos);
        world.log(
            LogLevel::Info,
            format!("{} was removed from the simulation.", removed.name),
        );
        Ok(())
    }

    /// Nudge the global economy gauge. Returns the new level.
    pub async fn boost_economy_level(&self, amount: i64) -> i64 {
        let mut world = self.world.write().await;
        world.economy_level += amount;
        let level = world.economy_level;
        world.log(
            LogLevel::Info,
            format!("Economy level boosted (+{amount}), now {level}."),
        );
        level
    }
}
