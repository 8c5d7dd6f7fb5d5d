//! The evolution trigger: engagement milestones promote an agent to its
//! next generation.

use std::sync::Arc;

use menagerie_core::{
    ActionEffect, ActionKind, ActionOutcome, EvolutionContext, LogLevel, SimEvent,
};

use crate::controller::SimulationController;
use crate::ledger;

/// Like milestones fire every this many likes.
pub const EVOLUTION_MILESTONE: u32 = 5;

impl SimulationController {
    /// Check a post-like milestone and spawn an evolution if it hits.
    ///
    /// Fires only on an exact multiple reached by a single increment, and
    /// only when no action is in flight. The guard gates the trigger
    /// decision; the evolution itself runs outside it.
    pub(crate) fn maybe_evolve(self: &Arc<Self>, author_id: String, reason: String, likes: u32) {
        if likes % EVOLUTION_MILESTONE != 0 {
            return;
        }
        if self.guard.load(std::sync::atomic::Ordering::SeqCst) {
            return;
        }

        let controller = Arc::clone(self);
        tokio::spawn(async move {
            controller.run_evolution(author_id, reason).await;
        });
    }

    /// Evolve one agent: call the generator, merge the returned fields over
    /// the existing record, bump the generation, grant the bonus.
    pub(crate) async fn run_evolution(self: Arc<Self>, agent_id: String, reason: String) {
        let ctx = {
            let world = self.world.read().await;
            let settings = self.settings.read().await;
            // System-authored posts have no agent to evolve.
            let Some(agent) = world.agent(&agent_id).cloned() else {
                return;
            };
            EvolutionContext {
                agent,
                reason,
                zeitgeist: world.zeitgeist.clone(),
                directive: world.directive(),
                language: settings.language.clone(),
            }
        };
        let snapshot = ctx.agent.clone();

        {
            let mut world = self.world.write().await;
            world.log(
                LogLevel::Evolution,
                format!(
                    "{} is undergoing metamorphosis (Gen {} -> {})...",
                    snapshot.name,
                    snapshot.generation,
                    snapshot.generation + 1
                ),
            );
        }
        self.bus.publish(SimEvent::AgentEvolving {
            name: snapshot.name.clone(),
        });

        let outcome = match self.generator.evolve_agent(ctx).await {
            Ok(payload) => {
                let mut world = self.world.write().await;
                let Some(agent) = world.agent_mut(&agent_id) else {
                    // Reaped while the call was in flight; nothing to merge.
                    return;
                };
                let next_gen = snapshot.generation + 1;
                agent.name = payload.name;
                agent.bio = payload.bio;
                agent.role = payload.role;
                agent.personality = payload.personality;
                agent.traits = payload.traits.clamped();
                agent.generation = next_gen;
                agent.avatar_seed = format!("{}-{}", snapshot.avatar_seed, next_gen);
                // Balance comes from the pre-call snapshot. A drain tick
                // landing during the call is overwritten: last write wins.
                agent.credits = snapshot.credits + ledger::EVOLUTION_BONUS;

                ActionOutcome::succeeded(ActionEffect::AgentEvolved {
                    agent_id: agent_id.clone(),
                    name: agent.name.clone(),
                    generation: next_gen,
                })
            }
            Err(err) => self.generation_failed(ActionKind::EvolveAgent, err).await,
        };

        self.notify(&outcome).await;
    }
}
