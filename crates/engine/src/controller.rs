//! The simulation controller.
//!
//! Owns the world, the settings, the generator handle, the single-flight
//! guard, and the circuit breaker. Every mutation goes through a method
//! here or in the sibling modules (`actions`, `evolution`, `zeitgeist`,
//! `observer`); there is no ambient global state.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Utc;
use tokio::sync::{RwLock, broadcast};
use tracing::debug;

use menagerie_core::{
    ActionEffect, ActionKind, ActionOutcome, ActivityKind, AgentPersona, Comment, CommandError,
    Error, EventBus, Experiment, Generator, GenerationError, InteractionEvent, InteractionKind,
    LogLevel, Post, Result, SimEvent, SimulationState, StepAction, Zeitgeist,
};

use crate::breaker::CircuitBreaker;
use crate::settings::SimSettings;
use crate::snapshot::Snapshot;
use crate::world::World;
use crate::{ledger, selector};

/// The simulation engine. Construct with [`SimulationController::new`] and
/// drive it through the command methods; all entities live behind the
/// internal lock.
pub struct SimulationController {
    pub(crate) world: RwLock<World>,
    pub(crate) settings: RwLock<SimSettings>,
    pub(crate) generator: Arc<dyn Generator>,
    pub(crate) bus: EventBus,
    /// Single-flight guard: at most one action handler in flight.
    pub(crate) guard: AtomicBool,
    pub(crate) breaker: CircuitBreaker,
    /// The tick and drain timers arm once, on the first transition to
    /// `Running`.
    timers_armed: AtomicBool,
}

impl SimulationController {
    /// Create a controller over a seeded world.
    pub fn new(generator: Arc<dyn Generator>, settings: SimSettings) -> Arc<Self> {
        Self::with_experiments(generator, settings, Vec::new())
    }

    /// Create a controller, merging user-defined experiments into the
    /// preset catalog.
    pub fn with_experiments(
        generator: Arc<dyn Generator>,
        settings: SimSettings,
        custom_experiments: Vec<Experiment>,
    ) -> Arc<Self> {
        Arc::new(Self {
            world: RwLock::new(World::seeded(custom_experiments)),
            settings: RwLock::new(settings),
            generator,
            bus: EventBus::default(),
            guard: AtomicBool::new(false),
            breaker: CircuitBreaker::new(),
            timers_armed: AtomicBool::new(false),
        })
    }

    // --- Observability ---

    pub fn subscribe(&self) -> broadcast::Receiver<Arc<SimEvent>> {
        self.bus.subscribe()
    }

    pub async fn snapshot(&self) -> Snapshot {
        let world = self.world.read().await;
        Snapshot::capture(&world, self.breaker.count())
    }

    pub async fn agents(&self) -> Vec<AgentPersona> {
        self.world.read().await.agents.clone()
    }

    pub async fn agent(&self, id: &str) -> Result<AgentPersona> {
        self.world
            .read()
            .await
            .agent(id)
            .cloned()
            .ok_or_else(|| CommandError::AgentNotFound(id.into()).into())
    }

    /// Posts, newest first.
    pub async fn feed(&self) -> Vec<Post> {
        self.world.read().await.posts.clone()
    }

    pub async fn comments(&self) -> Vec<Comment> {
        self.world.read().await.comments.clone()
    }

    pub async fn zeitgeist(&self) -> Option<Zeitgeist> {
        self.world.read().await.zeitgeist.clone()
    }

    pub async fn experiments(&self) -> Vec<Experiment> {
        self.world.read().await.experiments.clone()
    }

    pub async fn active_experiments(&self) -> Vec<String> {
        self.world.read().await.active_experiments.clone()
    }

    pub async fn log_entries(&self) -> Vec<menagerie_core::LogEntry> {
        self.world.read().await.log.to_vec()
    }

    pub async fn activity_items(&self) -> Vec<menagerie_core::ActivityItem> {
        self.world.read().await.activity.to_vec()
    }

    pub async fn interaction_events(&self) -> Vec<InteractionEvent> {
        self.world.read().await.interactions.to_vec()
    }

    // --- Run control ---

    /// Toggle between `Running` and `Paused` (`Idle` counts as not running).
    ///
    /// Entering `Running` stamps the run start, clears the failure counter
    /// (a user-initiated resume forgives past failures), and lazily arms
    /// the timers on the first call.
    pub async fn toggle_run(self: &Arc<Self>) -> SimulationState {
        let new_state = {
            let mut world = self.world.write().await;
            match world.state {
                SimulationState::Running => {
                    world.state = SimulationState::Paused;
                    world.run_started_at = None;
                    world.next_action_at = None;
                    world.log(LogLevel::Info, "Simulation paused.");
                }
                _ => {
                    world.state = SimulationState::Running;
                    world.run_started_at = Some(Utc::now());
                    world.log(LogLevel::Info, "Simulation running.");
                    self.breaker.reset();
                }
            }
            world.state
        };

        if new_state == SimulationState::Running {
            self.arm_timers();
        }
        new_state
    }

    /// Arm the tick and drain timer tasks exactly once.
    fn arm_timers(self: &Arc<Self>) {
        if self
            .timers_armed
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return;
        }

        let ticker = Arc::clone(self);
        tokio::spawn(async move {
            loop {
                let delay_ms = ticker.settings.read().await.action_delay_ms;
                tokio::time::sleep(std::time::Duration::from_millis(delay_ms)).await;

                if ticker.world.read().await.state != SimulationState::Running {
                    continue;
                }

                {
                    let mut world = ticker.world.write().await;
                    world.tick_count += 1;
                    if !ticker.guard.load(Ordering::SeqCst) {
                        world.next_action_at =
                            Some(Utc::now() + chrono::Duration::milliseconds(delay_ms as i64));
                    }
                }

                // Dispatch without blocking subsequent timer fires; a busy
                // guard turns the dispatch into an observable skip.
                let worker = Arc::clone(&ticker);
                tokio::spawn(async move {
                    worker.dispatch().await;
                });
            }
        });

        let drainer = Arc::clone(self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(ledger::DRAIN_INTERVAL);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                drainer.drain_pass().await;
            }
        });
    }

    /// One drain/reap pass. Gated on scarcity and a running simulation.
    pub(crate) async fn drain_pass(&self) {
        let reaped = {
            let mut world = self.world.write().await;
            if world.state != SimulationState::Running || !world.scarcity_active() {
                return;
            }
            let reaped = ledger::drain_and_reap(&mut world.agents);
            for agent in &reaped {
                world.log(
                    LogLevel::Error,
                    format!("{} ran out of credits and was reaped.", agent.name),
                );
            }
            reaped
        };

        for agent in reaped {
            self.bus.publish(SimEvent::AgentReaped { name: agent.name });
        }
    }

    // --- Dispatch ---

    /// One scheduler step: select, then execute under the guard.
    pub async fn dispatch(self: &Arc<Self>) -> ActionOutcome {
        let action = {
            let world = self.world.read().await;
            let max_agents = self.settings.read().await.max_agents;
            selector::choose(world.agents.len(), max_agents, rand::random::<f64>())
        };
        self.execute(action).await
    }

    /// Manual step-once: same selection and guard as a timer tick.
    pub async fn step(self: &Arc<Self>) -> ActionOutcome {
        self.dispatch().await
    }

    /// Force a specific action, bypassing the selector but not the guard.
    pub async fn force_action(self: &Arc<Self>, action: StepAction) -> ActionOutcome {
        self.execute(action).await
    }

    /// Force a comment onto a specific post, bypassing the random pick but
    /// not the guard.
    pub async fn force_comment_on(self: &Arc<Self>, post_id: &str) -> Result<ActionOutcome> {
        if self.world.read().await.posts.iter().all(|p| p.id != post_id) {
            return Err(CommandError::PostNotFound(post_id.into()).into());
        }
        Ok(self
            .execute_with(StepAction::CreateComment, Some(post_id.to_string()))
            .await)
    }

    async fn execute(self: &Arc<Self>, action: StepAction) -> ActionOutcome {
        self.execute_with(action, None).await
    }

    /// Run one action handler under the single-flight guard.
    async fn execute_with(
        self: &Arc<Self>,
        action: StepAction,
        target_post: Option<String>,
    ) -> ActionOutcome {
        if self
            .guard
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            let outcome = ActionOutcome::skipped(action, menagerie_core::Precondition::Busy);
            self.notify(&outcome).await;
            return outcome;
        }

        let outcome = match action {
            StepAction::CreateAgent => Arc::clone(self).run_create_agent().await,
            StepAction::CreatePost => Arc::clone(self).run_create_post().await,
            StepAction::CreateComment => Arc::clone(self).run_create_comment(target_post).await,
        };

        self.notify(&outcome).await;
        self.guard.store(false, Ordering::SeqCst);
        outcome
    }

    // --- Failure routing ---

    /// Route a generative failure through the breaker and shape the outcome.
    pub(crate) async fn generation_failed(
        &self,
        action: ActionKind,
        err: GenerationError,
    ) -> ActionOutcome {
        if self.breaker.note_failure() {
            let mut world = self.world.write().await;
            world.state = SimulationState::Paused;
            world.run_started_at = None;
            world.next_action_at = None;
            world.log(
                LogLevel::Error,
                "CRITICAL: Circuit breaker triggered. Simulation paused to prevent quota exhaustion.",
            );
            drop(world);
            self.bus.publish(SimEvent::BreakerTripped);
        }

        ActionOutcome::Failed {
            action,
            reason: err.to_string(),
        }
    }

    // --- Notifier ---

    /// The single fan-out point for action outcomes: system log, activity
    /// feed, interaction graph, and the event bus all hang off here.
    pub(crate) async fn notify(&self, outcome: &ActionOutcome) {
        match outcome {
            ActionOutcome::Succeeded { effect } => {
                self.breaker.reset();
                self.notify_effect(effect).await;
            }
            ActionOutcome::Failed { action, reason } => {
                let mut world = self.world.write().await;
                world.log(LogLevel::Error, format!("Failed to {action}: {reason}"));
                drop(world);
                self.bus.publish(SimEvent::ActionFailed {
                    action: action.to_string(),
                    reason: reason.clone(),
                });
            }
            ActionOutcome::Skipped {
                action,
                precondition,
            } => {
                debug!(action = %action, reason = %precondition, "Action skipped");
            }
        }
    }

    async fn notify_effect(&self, effect: &ActionEffect) {
        let mut world = self.world.write().await;
        match effect {
            ActionEffect::AgentJoined { agent_id, name } => {
                world.log(
                    LogLevel::Success,
                    format!("Agent {name} joined the simulation."),
                );
                world.record_activity(agent_id.clone(), ActivityKind::AgentJoined);
                drop(world);
                self.bus.publish(SimEvent::AgentJoined { name: name.clone() });
            }
            ActionEffect::PostPublished {
                agent_id,
                agent_name,
                post_id,
                title,
            } => {
                world.log(
                    LogLevel::Success,
                    format!("{agent_name} posted \"{title}\""),
                );
                world.record_activity(
                    agent_id.clone(),
                    ActivityKind::PostCreated {
                        post_id: post_id.clone(),
                        post_title: title.clone(),
                    },
                );
                drop(world);
                self.bus.publish(SimEvent::PostPublished {
                    author: agent_name.clone(),
                    title: title.clone(),
                });
            }
            ActionEffect::CommentPublished {
                agent_id,
                agent_name,
                post_id,
                post_title,
                post_author_id,
                comment_id,
            } => {
                world.log(
                    LogLevel::Success,
                    format!("{agent_name} commented on \"{post_title}\""),
                );
                world.record_activity(
                    agent_id.clone(),
                    ActivityKind::CommentCreated {
                        post_id: post_id.clone(),
                        post_title: post_title.clone(),
                        comment_id: comment_id.clone(),
                    },
                );
                world.interactions.push(InteractionEvent::new(
                    agent_id.clone(),
                    post_author_id.clone(),
                    InteractionKind::Reply,
                    post_title.clone(),
                ));
                drop(world);
                self.bus.publish(SimEvent::CommentPublished {
                    author: agent_name.clone(),
                    post_title: post_title.clone(),
                });
            }
            ActionEffect::AgentEvolved {
                agent_id,
                name,
                generation,
            } => {
                world.log(
                    LogLevel::Evolution,
                    format!("{name} has evolved (Gen {generation})."),
                );
                world.record_activity(
                    agent_id.clone(),
                    ActivityKind::AgentEvolved {
                        generation: *generation,
                    },
                );
                drop(world);
                self.bus.publish(SimEvent::AgentEvolved {
                    name: name.clone(),
                    generation: *generation,
                });
            }
        }
    }

    // --- Direct commands without handlers elsewhere ---

    /// Restore seed content; run state, experiments, the active set, and
    /// the economy level survive.
    pub async fn reset(&self) {
        {
            let mut world = self.world.write().await;
            world.reset();
            world.log(LogLevel::Info, "Simulation reset.");
        }
        self.breaker.reset();
        self.bus.publish(SimEvent::SimulationReset);
    }

    /// Change the tick interval, clamped to the floor. Takes effect on the
    /// next timer arm.
    pub async fn set_tick_interval(&self, ms: u64) -> u64 {
        let effective = ms.max(crate::settings::MIN_ACTION_DELAY_MS);
        self.settings.write().await.action_delay_ms = effective;
        let mut world = self.world.write().await;
        world.log(
            LogLevel::Info,
            format!("Tick interval set to {effective}ms."),
        );
        effective
    }

    /// Toggle an experiment in or out of the active set. Returns the new
    /// activation state.
    pub async fn toggle_experiment(&self, id: &str) -> Result<bool> {
        let (title, active) = {
            let mut world = self.world.write().await;
            let Some(experiment) = world.experiments.iter().find(|e| e.id == id) else {
                return Err(Error::Command(CommandError::ExperimentNotFound(id.into())));
            };
            let title = experiment.title.clone();

            let active = if let Some(pos) = world.active_experiments.iter().position(|e| e == id) {
                world.active_experiments.remove(pos);
                false
            } else {
                world.active_experiments.push(id.to_string());
                true
            };

            let verb = if active { "activated" } else { "deactivated" };
            world.log(LogLevel::Info, format!("Experiment \"{title}\" {verb}."));
            (title, active)
        };

        self.bus.publish(SimEvent::ExperimentToggled { title, active });
        Ok(active)
    }
}
