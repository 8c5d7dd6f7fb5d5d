//! HTTP observer gateway for Menagerie.
//!
//! A thin REST surface over a shared [`SimulationController`]: read-only
//! views of the world plus every observer and admin command. No auth; the
//! gateway binds loopback by default and is meant for local dashboards.
//!
//! Built on Axum.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, patch, post},
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tracing::info;

use menagerie_config::AppConfig;
use menagerie_core::{
    ActionOutcome, ActivityItem, AgentPersona, Comment, CommandError, Error, Experiment,
    InteractionEvent, LogEntry, Post, StepAction, TraitAxis, TraitPatch, Zeitgeist,
};
use menagerie_engine::{SimulationController, Snapshot};

type Controller = Arc<SimulationController>;

/// Build the Axum router with all gateway routes.
pub fn build_router(controller: Controller) -> Router {
    Router::new()
        // Read-only views
        .route("/health", get(health))
        .route("/snapshot", get(snapshot))
        .route("/feed", get(feed))
        .route("/comments", get(comments))
        .route("/agents", get(agents))
        .route("/agents/{id}", get(agent))
        .route("/zeitgeist", get(zeitgeist))
        .route("/experiments", get(experiments))
        .route("/log", get(system_log))
        .route("/activity", get(activity))
        .route("/interactions", get(interactions))
        // Run control
        .route("/simulation/toggle", post(toggle_run))
        .route("/simulation/step", post(step))
        .route("/simulation/reset", post(reset))
        .route("/simulation/zeitgeist", post(force_zeitgeist))
        .route("/simulation/interval", patch(set_interval))
        // Forced actions
        .route("/actions/agent", post(force_agent))
        .route("/actions/post", post(force_post))
        .route("/actions/comment", post(force_comment))
        // Engagement
        .route("/posts/{id}/like", post(like_post))
        .route("/posts/{id}/react", post(react_post))
        .route("/posts/{id}/refresh", post(refresh_post))
        // Experiments & admin
        .route("/experiments/{id}/toggle", post(toggle_experiment))
        .route("/agents/{id}/traits", patch(adjust_trait))
        .route("/agents/{id}", delete(delete_agent))
        .route("/agents/traits", post(mass_update_traits))
        .route("/economy/boost", post(boost_economy))
        .route("/broadcast", post(broadcast))
        .layer(CorsLayer::permissive())
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(controller)
}

/// Bind and serve until the task is cancelled.
pub async fn start(
    config: &AppConfig,
    controller: Controller,
) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);
    let app = build_router(controller);

    info!(addr = %addr, "Gateway starting");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// Map a command error to an HTTP status. Unknown entities are 404;
/// everything else is a server fault.
fn command_status(err: &Error) -> StatusCode {
    match err {
        Error::Command(
            CommandError::AgentNotFound(_)
            | CommandError::PostNotFound(_)
            | CommandError::ExperimentNotFound(_),
        ) => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

// --- Read-only handlers ---

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn snapshot(State(controller): State<Controller>) -> Json<Snapshot> {
    Json(controller.snapshot().await)
}

async fn feed(State(controller): State<Controller>) -> Json<Vec<Post>> {
    Json(controller.feed().await)
}

async fn comments(State(controller): State<Controller>) -> Json<Vec<Comment>> {
    Json(controller.comments().await)
}

async fn agents(State(controller): State<Controller>) -> Json<Vec<AgentPersona>> {
    Json(controller.agents().await)
}

async fn agent(
    State(controller): State<Controller>,
    Path(id): Path<String>,
) -> Result<Json<AgentPersona>, StatusCode> {
    controller
        .agent(&id)
        .await
        .map(Json)
        .map_err(|e| command_status(&e))
}

async fn zeitgeist(State(controller): State<Controller>) -> Json<Option<Zeitgeist>> {
    Json(controller.zeitgeist().await)
}

#[derive(Serialize)]
struct ExperimentsResponse {
    experiments: Vec<Experiment>,
    active: Vec<String>,
}

async fn experiments(State(controller): State<Controller>) -> Json<ExperimentsResponse> {
    Json(ExperimentsResponse {
        experiments: controller.experiments().await,
        active: controller.active_experiments().await,
    })
}

async fn system_log(State(controller): State<Controller>) -> Json<Vec<LogEntry>> {
    Json(controller.log_entries().await)
}

async fn activity(State(controller): State<Controller>) -> Json<Vec<ActivityItem>> {
    Json(controller.activity_items().await)
}

async fn interactions(State(controller): State<Controller>) -> Json<Vec<InteractionEvent>> {
    Json(controller.interaction_events().await)
}

// --- Run control ---

#[derive(Serialize)]
struct StateResponse {
    state: menagerie_core::SimulationState,
}

async fn toggle_run(State(controller): State<Controller>) -> Json<StateResponse> {
    Json(StateResponse {
        state: controller.toggle_run().await,
    })
}

async fn step(State(controller): State<Controller>) -> Json<ActionOutcome> {
    Json(controller.step().await)
}

async fn reset(State(controller): State<Controller>) -> Json<Snapshot> {
    controller.reset().await;
    Json(controller.snapshot().await)
}

async fn force_zeitgeist(State(controller): State<Controller>) -> Json<Option<Zeitgeist>> {
    controller.force_zeitgeist().await;
    Json(controller.zeitgeist().await)
}

#[derive(Deserialize)]
struct IntervalRequest {
    ms: u64,
}

#[derive(Serialize)]
struct IntervalResponse {
    effective_ms: u64,
}

async fn set_interval(
    State(controller): State<Controller>,
    Json(req): Json<IntervalRequest>,
) -> Json<IntervalResponse> {
    Json(IntervalResponse {
        effective_ms: controller.set_tick_interval(req.ms).await,
    })
}

// --- Forced actions ---

async fn force_agent(State(controller): State<Controller>) -> Json<ActionOutcome> {
    Json(controller.force_action(StepAction::CreateAgent).await)
}

async fn force_post(State(controller): State<Controller>) -> Json<ActionOutcome> {
    Json(controller.force_action(StepAction::CreatePost).await)
}

#[derive(Deserialize)]
struct CommentActionRequest {
    post_id: Option<String>,
}

/// With a `post_id` in the body the comment lands on that post; without a
/// body the engine picks one at random.
async fn force_comment(
    State(controller): State<Controller>,
    body: Option<Json<CommentActionRequest>>,
) -> Result<Json<ActionOutcome>, StatusCode> {
    match body.and_then(|Json(req)| req.post_id) {
        Some(post_id) => controller
            .force_comment_on(&post_id)
            .await
            .map(Json)
            .map_err(|e| command_status(&e)),
        None => Ok(Json(
            controller.force_action(StepAction::CreateComment).await,
        )),
    }
}

// --- Engagement ---

async fn like_post(
    State(controller): State<Controller>,
    Path(id): Path<String>,
) -> Result<Json<Post>, StatusCode> {
    controller
        .like_post(&id)
        .await
        .map(Json)
        .map_err(|e| command_status(&e))
}

#[derive(Deserialize)]
struct ReactRequest {
    emoji: String,
}

async fn react_post(
    State(controller): State<Controller>,
    Path(id): Path<String>,
    Json(req): Json<ReactRequest>,
) -> Result<Json<Post>, StatusCode> {
    controller
        .react_post(&id, &req.emoji)
        .await
        .map(Json)
        .map_err(|e| command_status(&e))
}

async fn refresh_post(
    State(controller): State<Controller>,
    Path(id): Path<String>,
) -> Result<Json<Post>, StatusCode> {
    controller
        .refresh_post(&id)
        .await
        .map(Json)
        .map_err(|e| command_status(&e))
}

// --- Experiments & admin ---

#[derive(Serialize)]
struct ToggleResponse {
    id: String,
    active: bool,
}

async fn toggle_experiment(
    State(controller): State<Controller>,
    Path(id): Path<String>,
) -> Result<Json<ToggleResponse>, StatusCode> {
    match controller.toggle_experiment(&id).await {
        Ok(active) => Ok(Json(ToggleResponse { id, active })),
        Err(e) => Err(command_status(&e)),
    }
}

#[derive(Deserialize)]
struct AdjustTraitRequest {
    axis: TraitAxis,
    value: u8,
}

async fn adjust_trait(
    State(controller): State<Controller>,
    Path(id): Path<String>,
    Json(req): Json<AdjustTraitRequest>,
) -> Result<Json<AgentPersona>, StatusCode> {
    controller
        .adjust_trait(&id, req.axis, req.value)
        .await
        .map(Json)
        .map_err(|e| command_status(&e))
}

async fn delete_agent(
    State(controller): State<Controller>,
    Path(id): Path<String>,
) -> Result<StatusCode, StatusCode> {
    controller
        .delete_agent(&id)
        .await
        .map(|_| StatusCode::NO_CONTENT)
        .map_err(|e| command_status(&e))
}

#[derive(Serialize)]
struct MassUpdateResponse {
    updated: usize,
}

async fn mass_update_traits(
    State(controller): State<Controller>,
    Json(patch): Json<TraitPatch>,
) -> Json<MassUpdateResponse> {
    Json(MassUpdateResponse {
        updated: controller.mass_update_traits(patch).await,
    })
}

#[derive(Deserialize)]
struct BoostRequest {
    amount: i64,
}

#[derive(Serialize)]
struct BoostResponse {
    level: i64,
}

async fn boost_economy(
    State(controller): State<Controller>,
    Json(req): Json<BoostRequest>,
) -> Json<BoostResponse> {
    Json(BoostResponse {
        level: controller.boost_economy_level(req.amount).await,
    })
}

#[derive(Deserialize)]
struct BroadcastRequest {
    message: String,
}

async fn broadcast(
    State(controller): State<Controller>,
    Json(req): Json<BroadcastRequest>,
) -> Json<Post> {
    Json(controller.broadcast(&req.message).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use menagerie_engine::SimSettings;
    use menagerie_generate::ScriptedGenerator;
    use tower::ServiceExt;

    fn test_controller() -> Controller {
        SimulationController::new(Arc::new(ScriptedGenerator::new()), SimSettings::default())
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_endpoint() {
        let app = build_router(test_controller());
        let req = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn snapshot_reports_the_seed_world() {
        let app = build_router(test_controller());
        let req = Request::builder()
            .uri("/snapshot")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["agent_count"], 2);
        assert_eq!(json["post_count"], 1);
        assert_eq!(json["state"], "IDLE");
    }

    #[tokio::test]
    async fn unknown_agent_is_404() {
        let app = build_router(test_controller());
        let req = Request::builder()
            .uri("/agents/agent-nope")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn forced_post_returns_a_tagged_outcome() {
        let app = build_router(test_controller());
        let req = Request::builder()
            .method("POST")
            .uri("/actions/post")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["outcome"], "succeeded");
        assert_eq!(json["effect"], "post_published");
    }

    #[tokio::test]
    async fn forced_comment_can_target_a_post() {
        let controller = test_controller();
        let app = build_router(Arc::clone(&controller));

        let req = Request::builder()
            .method("POST")
            .uri("/actions/comment")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"post_id":"post-welcome"}"#))
            .unwrap();
        let response = app.clone().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["outcome"], "succeeded");

        let comments = controller.comments().await;
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].post_id, "post-welcome");

        let req = Request::builder()
            .method("POST")
            .uri("/actions/comment")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"post_id":"post-nope"}"#))
            .unwrap();
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn experiment_toggle_round_trips() {
        let controller = test_controller();
        let app = build_router(Arc::clone(&controller));

        let req = Request::builder()
            .method("POST")
            .uri("/experiments/exp-moloch/toggle")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["active"], true);
        assert_eq!(
            controller.active_experiments().await,
            vec!["exp-moloch".to_string()]
        );
    }

    #[tokio::test]
    async fn broadcast_prepends_a_sticky_post() {
        let controller = test_controller();
        let app = build_router(Arc::clone(&controller));

        let req = Request::builder()
            .method("POST")
            .uri("/broadcast")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"message":"Stand by."}"#))
            .unwrap();
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["sticky"], true);
        assert_eq!(json["likes"], 999);
        assert_eq!(controller.feed().await.len(), 2);
    }
}
