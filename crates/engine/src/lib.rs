//! The Menagerie simulation engine.
//!
//! Owns the autonomous loop: the scheduler picks an action, the single
//! handler in flight calls the generative backend, and every outcome fans
//! out through one notifier into the system log, the activity feed, the
//! interaction graph, and the event bus. Scarcity, the circuit breaker,
//! evolution, and the zeitgeist cadence all live here; the gateway and CLI
//! are thin callers of [`SimulationController`].

mod actions;
pub mod breaker;
pub mod composer;
mod controller;
mod evolution;
pub mod ledger;
mod observer;
pub mod seeds;
pub mod selector;
mod settings;
mod snapshot;
mod world;
mod zeitgeist;

pub use breaker::{BREAKER_THRESHOLD, CircuitBreaker};
pub use controller::SimulationController;
pub use evolution::EVOLUTION_MILESTONE;
pub use settings::{MIN_ACTION_DELAY_MS, SimSettings};
pub use snapshot::Snapshot;
pub use world::{INITIAL_ECONOMY_LEVEL, World};
pub use zeitgeist::{SAMPLE_COMMENTS, SAMPLE_POSTS};

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use tokio::sync::broadcast;
    use tokio::time::timeout;

    use menagerie_core::{
        ActionOutcome, AgentContext, AgentPayload, CommentContext, EvolutionContext,
        EvolutionPayload, Generator, GenerationError, PostContext, PostPayload, Precondition,
        SYSTEM_AUTHOR, SimEvent, SimulationState, StepAction, TraitPatch, TraitVector, Zeitgeist,
        ZeitgeistContext, ZeitgeistPayload,
    };

    use super::*;

    // --- Test generators ---

    /// Deterministic backend. Optionally fails the first N calls with a 503.
    struct StubGenerator {
        failures_left: AtomicU32,
    }

    impl StubGenerator {
        fn ok() -> Self {
            Self {
                failures_left: AtomicU32::new(0),
            }
        }

        fn failing_first(n: u32) -> Self {
            Self {
                failures_left: AtomicU32::new(n),
            }
        }

        fn gate(&self) -> std::result::Result<(), GenerationError> {
            let left = self.failures_left.load(Ordering::SeqCst);
            if left > 0 {
                if left != u32::MAX {
                    self.failures_left.fetch_sub(1, Ordering::SeqCst);
                }
                return Err(GenerationError::ApiError {
                    status_code: 503,
                    message: "overloaded".into(),
                });
            }
            Ok(())
        }
    }

    #[async_trait]
    impl Generator for StubGenerator {
        fn name(&self) -> &str {
            "stub"
        }

        async fn generate_agent(
            &self,
            _ctx: AgentContext,
        ) -> std::result::Result<AgentPayload, GenerationError> {
            self.gate()?;
            Ok(AgentPayload {
                name: "Test Subject".into(),
                bio: "A deterministic persona.".into(),
                personality: "calm, precise".into(),
                interests: vec!["testing".into()],
                traits: TraitVector::balanced(),
                role: "Observer".into(),
            })
        }

        async fn generate_post(
            &self,
            _ctx: PostContext,
        ) -> std::result::Result<PostPayload, GenerationError> {
            self.gate()?;
            Ok(PostPayload {
                title: "On Determinism".into(),
                content: "Stub content.".into(),
                category: "Science".into(),
            })
        }

        async fn generate_comment(
            &self,
            _ctx: CommentContext,
        ) -> std::result::Result<String, GenerationError> {
            self.gate()?;
            Ok("Interesting perspective.".into())
        }

        async fn evolve_agent(
            &self,
            ctx: EvolutionContext,
        ) -> std::result::Result<EvolutionPayload, GenerationError> {
            self.gate()?;
            Ok(EvolutionPayload {
                name: format!("{} Prime", ctx.agent.name),
                bio: ctx.agent.bio,
                role: "Ascended Observer".into(),
                personality: ctx.agent.personality,
                traits: ctx.agent.traits,
            })
        }

        async fn analyze_zeitgeist(
            &self,
            _ctx: ZeitgeistContext,
        ) -> std::result::Result<ZeitgeistPayload, GenerationError> {
            self.gate()?;
            Ok(ZeitgeistPayload {
                era_name: "The Test Epoch".into(),
                summary: "Everything is deterministic.".into(),
                mood: "Calm".into(),
                trending_topics: vec!["determinism".into()],
                cohesion: 80,
                dominant_narrative: "Stubs all the way down.".into(),
            })
        }
    }

    /// Never completes a call. Used to hold the single-flight guard open.
    struct HangingGenerator;

    #[async_trait]
    impl Generator for HangingGenerator {
        fn name(&self) -> &str {
            "hanging"
        }

        async fn generate_agent(
            &self,
            _ctx: AgentContext,
        ) -> std::result::Result<AgentPayload, GenerationError> {
            std::future::pending().await
        }

        async fn generate_post(
            &self,
            _ctx: PostContext,
        ) -> std::result::Result<PostPayload, GenerationError> {
            std::future::pending().await
        }

        async fn generate_comment(
            &self,
            _ctx: CommentContext,
        ) -> std::result::Result<String, GenerationError> {
            std::future::pending().await
        }

        async fn evolve_agent(
            &self,
            _ctx: EvolutionContext,
        ) -> std::result::Result<EvolutionPayload, GenerationError> {
            std::future::pending().await
        }

        async fn analyze_zeitgeist(
            &self,
            _ctx: ZeitgeistContext,
        ) -> std::result::Result<ZeitgeistPayload, GenerationError> {
            std::future::pending().await
        }
    }

    /// Content calls succeed; evolution and zeitgeist analysis always fail.
    struct AmbientFailingGenerator {
        inner: StubGenerator,
    }

    impl AmbientFailingGenerator {
        fn new() -> Self {
            Self {
                inner: StubGenerator::ok(),
            }
        }

        fn refusal() -> GenerationError {
            GenerationError::ApiError {
                status_code: 500,
                message: "model refused".into(),
            }
        }
    }

    #[async_trait]
    impl Generator for AmbientFailingGenerator {
        fn name(&self) -> &str {
            "ambient-failing"
        }

        async fn generate_agent(
            &self,
            ctx: AgentContext,
        ) -> std::result::Result<AgentPayload, GenerationError> {
            self.inner.generate_agent(ctx).await
        }

        async fn generate_post(
            &self,
            ctx: PostContext,
        ) -> std::result::Result<PostPayload, GenerationError> {
            self.inner.generate_post(ctx).await
        }

        async fn generate_comment(
            &self,
            ctx: CommentContext,
        ) -> std::result::Result<String, GenerationError> {
            self.inner.generate_comment(ctx).await
        }

        async fn evolve_agent(
            &self,
            _ctx: EvolutionContext,
        ) -> std::result::Result<EvolutionPayload, GenerationError> {
            Err(Self::refusal())
        }

        async fn analyze_zeitgeist(
            &self,
            _ctx: ZeitgeistContext,
        ) -> std::result::Result<ZeitgeistPayload, GenerationError> {
            Err(Self::refusal())
        }
    }

    fn test_controller(generator: impl Generator + 'static) -> Arc<SimulationController> {
        SimulationController::new(Arc::new(generator), SimSettings::default())
    }

    async fn wait_for(
        rx: &mut broadcast::Receiver<Arc<SimEvent>>,
        pred: impl Fn(&SimEvent) -> bool,
    ) -> Arc<SimEvent> {
        loop {
            let event = timeout(Duration::from_secs(5), rx.recv())
                .await
                .expect("timed out waiting for event")
                .expect("bus closed");
            if pred(&event) {
                return event;
            }
        }
    }

    // --- Circuit breaker ---

    #[tokio::test]
    async fn three_failures_trip_the_breaker_and_pause() {
        let controller = test_controller(StubGenerator::failing_first(u32::MAX));
        controller.world.write().await.state = SimulationState::Running;

        for _ in 0..2 {
            let outcome = controller.step().await;
            assert!(matches!(outcome, ActionOutcome::Failed { .. }));
            assert_eq!(controller.snapshot().await.state, SimulationState::Running);
        }

        let outcome = controller.step().await;
        assert!(matches!(outcome, ActionOutcome::Failed { .. }));

        let snapshot = controller.snapshot().await;
        assert_eq!(snapshot.state, SimulationState::Paused);
        assert_eq!(snapshot.failure_count, 0);
        assert!(snapshot.run_started_at.is_none());

        let log = controller.log_entries().await;
        assert!(log.iter().any(|e| e.message.contains("CRITICAL")));
    }

    #[tokio::test]
    async fn success_resets_the_failure_counter() {
        let controller = test_controller(StubGenerator::failing_first(2));
        controller.world.write().await.state = SimulationState::Running;

        controller.step().await;
        controller.step().await;
        assert_eq!(controller.snapshot().await.failure_count, 2);

        let outcome = controller.step().await;
        assert!(outcome.is_success());
        assert_eq!(controller.snapshot().await.failure_count, 0);
        assert_eq!(controller.snapshot().await.state, SimulationState::Running);
    }

    // --- Single flight ---

    #[tokio::test]
    async fn busy_guard_turns_second_dispatch_into_a_skip() {
        let controller = test_controller(HangingGenerator);
        let background = Arc::clone(&controller);
        let hung = tokio::spawn(async move {
            background.force_action(StepAction::CreateAgent).await;
        });
        for _ in 0..20 {
            tokio::task::yield_now().await;
        }

        let outcome = controller.force_action(StepAction::CreatePost).await;
        assert!(matches!(
            outcome,
            ActionOutcome::Skipped {
                precondition: Precondition::Busy,
                ..
            }
        ));
        hung.abort();
    }

    // --- Scarcity economy ---

    #[tokio::test]
    async fn scarcity_post_debits_below_zero_and_reaps_on_the_next_pass() {
        let controller = test_controller(StubGenerator::ok());
        controller.toggle_experiment("exp-moloch").await.unwrap();
        {
            let mut world = controller.world.write().await;
            world.state = SimulationState::Running;
            world.agents.truncate(1);
            world.agents[0].credits = 15;
        }

        let outcome = controller.force_action(StepAction::CreatePost).await;
        assert!(outcome.is_success());
        assert_eq!(controller.world.read().await.agents[0].credits, -5);

        controller.drain_pass().await;
        assert!(controller.agents().await.is_empty());

        let log = controller.log_entries().await;
        assert!(log.iter().any(|e| e.message.contains("was reaped")));
    }

    #[tokio::test]
    async fn drain_pass_is_inert_without_scarcity() {
        let controller = test_controller(StubGenerator::ok());
        controller.world.write().await.state = SimulationState::Running;

        controller.drain_pass().await;

        let agents = controller.agents().await;
        assert!(agents.iter().all(|a| a.credits == 100));
    }

    // --- Evolution trigger ---

    #[tokio::test]
    async fn fifth_like_evolves_the_author() {
        let controller = test_controller(StubGenerator::ok());
        controller.world.write().await.agents.truncate(1);
        let outcome = controller.force_action(StepAction::CreatePost).await;
        assert!(outcome.is_success());
        let post_id = controller.feed().await[0].id.clone();

        let mut rx = controller.subscribe();
        for _ in 0..4 {
            controller.like_post(&post_id).await.unwrap();
        }
        assert_eq!(controller.agents().await[0].generation, 1);

        controller.like_post(&post_id).await.unwrap();
        wait_for(&mut rx, |e| matches!(e, SimEvent::AgentEvolved { .. })).await;

        let agent = &controller.agents().await[0];
        assert_eq!(agent.generation, 2);
        assert!(agent.name.ends_with("Prime"));
        assert!(agent.avatar_seed.ends_with("-2"));
        assert_eq!(agent.credits, 200);
    }

    #[tokio::test]
    async fn reactions_never_trigger_evolution() {
        let controller = test_controller(StubGenerator::ok());
        controller.world.write().await.agents.truncate(1);
        controller.force_action(StepAction::CreatePost).await;
        let post_id = controller.feed().await[0].id.clone();

        for emoji in ["🔥", "💡", "🔥", "💡", "🔥"] {
            controller.react_post(&post_id, emoji).await.unwrap();
        }
        for _ in 0..20 {
            tokio::task::yield_now().await;
        }
        assert_eq!(controller.agents().await[0].generation, 1);
    }

    #[tokio::test]
    async fn react_toggle_clears_and_switch_moves_the_tally() {
        let controller = test_controller(StubGenerator::ok());
        controller.force_action(StepAction::CreatePost).await;
        let post_id = controller.feed().await[0].id.clone();

        let post = controller.react_post(&post_id, "🔥").await.unwrap();
        assert_eq!(post.likes, 1);
        assert_eq!(post.reactions.get("🔥"), Some(&1));
        assert_eq!(post.observer_reaction.as_deref(), Some("🔥"));

        let post = controller.react_post(&post_id, "💡").await.unwrap();
        assert_eq!(post.likes, 1);
        assert!(!post.reactions.contains_key("🔥"));
        assert_eq!(post.reactions.get("💡"), Some(&1));

        let post = controller.react_post(&post_id, "💡").await.unwrap();
        assert_eq!(post.likes, 0);
        assert!(post.reactions.is_empty());
        assert!(post.observer_reaction.is_none());
    }

    // --- Zeitgeist cadence ---

    #[tokio::test]
    async fn post_count_multiple_triggers_a_zeitgeist_shift() {
        let controller = test_controller(StubGenerator::ok());
        controller.settings.write().await.zeitgeist_interval = 2;

        let mut rx = controller.subscribe();
        let outcome = controller.force_action(StepAction::CreatePost).await;
        assert!(outcome.is_success());

        let event = wait_for(&mut rx, |e| matches!(e, SimEvent::ZeitgeistShifted { .. })).await;
        match event.as_ref() {
            SimEvent::ZeitgeistShifted { era_name } => assert_eq!(era_name, "The Test Epoch"),
            _ => unreachable!(),
        }
        let zeitgeist = controller.zeitgeist().await.unwrap();
        assert_eq!(zeitgeist.era_name, "The Test Epoch");
        assert_eq!(zeitgeist.cohesion, 80);
    }

    #[tokio::test]
    async fn failed_zeitgeist_analysis_is_log_only() {
        let controller = test_controller(AmbientFailingGenerator::new());
        {
            let mut world = controller.world.write().await;
            world.zeitgeist = Some(Zeitgeist {
                era_name: "The Prior Era".into(),
                summary: "Settled and quiet.".into(),
                mood: "Calm".into(),
                trending_topics: vec!["quiet".into()],
                cohesion: 70,
                dominant_narrative: "Nothing much is happening.".into(),
                updated_at: chrono::Utc::now(),
            });
        }

        controller.force_zeitgeist().await;

        // The previous snapshot survives and the breaker is untouched.
        let zeitgeist = controller.zeitgeist().await.unwrap();
        assert_eq!(zeitgeist.era_name, "The Prior Era");
        assert_eq!(zeitgeist.cohesion, 70);

        let snapshot = controller.snapshot().await;
        assert_eq!(snapshot.failure_count, 0);
        assert_eq!(snapshot.state, SimulationState::Idle);

        let log = controller.log_entries().await;
        assert!(
            log.iter()
                .any(|e| e.message.contains("Zeitgeist analysis failed"))
        );
    }

    #[tokio::test]
    async fn failed_evolution_counts_toward_the_breaker_and_leaves_the_agent() {
        let controller = test_controller(AmbientFailingGenerator::new());
        controller.world.write().await.agents.truncate(1);
        let outcome = controller.force_action(StepAction::CreatePost).await;
        assert!(outcome.is_success());
        let post_id = controller.feed().await[0].id.clone();

        let mut rx = controller.subscribe();
        for _ in 0..5 {
            controller.like_post(&post_id).await.unwrap();
        }
        wait_for(&mut rx, |e| matches!(e, SimEvent::ActionFailed { .. })).await;

        let agent = &controller.agents().await[0];
        assert_eq!(agent.generation, 1);
        assert_eq!(agent.name, "Genesis Prime");
        assert_eq!(agent.credits, 100);

        let snapshot = controller.snapshot().await;
        assert_eq!(snapshot.failure_count, 1);
        assert_ne!(snapshot.state, SimulationState::Paused);

        let log = controller.log_entries().await;
        assert!(log.iter().any(|e| e.message.contains("Failed to evolve")));
    }

    // --- Run control and commands ---

    #[tokio::test(start_paused = true)]
    async fn toggle_run_flips_state_and_stamps_the_run_start() {
        let controller = test_controller(StubGenerator::ok());
        assert_eq!(
            Arc::clone(&controller).toggle_run().await,
            SimulationState::Running
        );
        assert!(controller.snapshot().await.run_started_at.is_some());

        assert_eq!(
            Arc::clone(&controller).toggle_run().await,
            SimulationState::Paused
        );
        assert!(controller.snapshot().await.run_started_at.is_none());
    }

    #[tokio::test]
    async fn reset_preserves_run_state_and_active_experiments() {
        let controller = test_controller(StubGenerator::ok());
        controller.toggle_experiment("exp-moloch").await.unwrap();
        controller.world.write().await.state = SimulationState::Running;
        controller.force_action(StepAction::CreateAgent).await;

        controller.reset().await;

        let snapshot = controller.snapshot().await;
        assert_eq!(snapshot.state, SimulationState::Running);
        assert_eq!(snapshot.active_experiments, vec!["exp-moloch".to_string()]);
        assert_eq!(snapshot.agent_count, 2);
        assert_eq!(snapshot.action_count, 0);
    }

    #[tokio::test]
    async fn tick_interval_clamps_to_the_floor() {
        let controller = test_controller(StubGenerator::ok());
        assert_eq!(controller.set_tick_interval(10).await, MIN_ACTION_DELAY_MS);
        assert_eq!(controller.set_tick_interval(8000).await, 8000);
    }

    #[tokio::test]
    async fn unknown_experiment_toggle_is_an_error() {
        let controller = test_controller(StubGenerator::ok());
        assert!(controller.toggle_experiment("exp-nope").await.is_err());
    }

    // --- Preconditions ---

    #[tokio::test]
    async fn comment_skips_when_only_the_post_author_remains() {
        let controller = test_controller(StubGenerator::ok());
        controller.world.write().await.agents.truncate(1);

        let outcome = controller.force_action(StepAction::CreateComment).await;
        assert!(matches!(
            outcome,
            ActionOutcome::Skipped {
                precondition: Precondition::NoEligibleAuthor,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn forced_comment_lands_on_the_requested_post() {
        let controller = test_controller(StubGenerator::ok());
        // A second post, so a random pick could land elsewhere.
        assert!(
            controller
                .force_action(StepAction::CreatePost)
                .await
                .is_success()
        );

        let outcome = controller.force_comment_on("post-welcome").await.unwrap();
        assert!(outcome.is_success());

        let comments = controller.comments().await;
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].post_id, "post-welcome");

        assert!(controller.force_comment_on("post-nope").await.is_err());
    }

    // --- Observer commands ---

    #[tokio::test]
    async fn broadcast_pins_a_system_post_to_the_feed() {
        let controller = test_controller(StubGenerator::ok());
        let post = controller.broadcast("All agents report in.").await;
        assert_eq!(post.author_id, SYSTEM_AUTHOR);
        assert!(post.sticky);
        assert_eq!(post.likes, 999);

        let feed = controller.feed().await;
        assert_eq!(feed[0].id, post.id);
    }

    #[tokio::test]
    async fn mass_update_patches_every_agent() {
        let controller = test_controller(StubGenerator::ok());
        let patch = TraitPatch {
            creative: Some(90),
            ..TraitPatch::default()
        };
        assert_eq!(controller.mass_update_traits(patch).await, 2);
        assert!(
            controller
                .agents()
                .await
                .iter()
                .all(|a| a.traits.creative == 90)
        );
    }

    #[tokio::test]
    async fn delete_agent_removes_only_the_target() {
        let controller = test_controller(StubGenerator::ok());
        controller.delete_agent("agent-genesis").await.unwrap();
        let agents = controller.agents().await;
        assert_eq!(agents.len(), 1);
        assert_eq!(agents[0].id, "agent-spark");
        assert!(controller.delete_agent("agent-genesis").await.is_err());
    }
}
