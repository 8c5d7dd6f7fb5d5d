//! # Menagerie Core
//!
//! Domain types, traits, and error definitions for the Menagerie persona
//! simulation. This crate has **zero framework dependencies** — it defines the
//! domain model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! The generative collaborator is defined as a trait here; implementations
//! (the Gemini client, the offline scripted generator) live in their own
//! crate. This enables:
//! - Swapping generators via configuration
//! - Easy testing with mock/stub generators
//! - Clean dependency graph (all crates depend inward on core)

pub mod activity;
pub mod buffer;
pub mod content;
pub mod error;
pub mod event;
pub mod experiment;
pub mod generator;
pub mod outcome;
pub mod persona;
pub mod state;
pub mod zeitgeist;

// Re-export key types at crate root for ergonomics
pub use activity::{ActivityItem, ActivityKind};
pub use buffer::{
    ACTIVITY_CAP, BoundedLog, INTERACTION_CAP, InteractionEvent, InteractionKind, LogEntry,
    LogLevel, SYSTEM_LOG_CAP,
};
pub use content::{Comment, Post, SYSTEM_AUTHOR};
pub use error::{CommandError, Error, GenerationError, Result};
pub use event::{EventBus, SimEvent};
pub use experiment::{Experiment, ExperimentKind};
pub use generator::{
    AgentContext, AgentPayload, CommentContext, EvolutionContext, EvolutionPayload, Generator,
    PostContext, PostPayload, PostSample, ThreadComment, ZeitgeistContext, ZeitgeistPayload,
};
pub use outcome::{ActionEffect, ActionKind, ActionOutcome, Precondition, StepAction};
pub use persona::{AgentPersona, DEFAULT_CREDITS, OBSERVER_ID, TraitAxis, TraitPatch, TraitVector};
pub use state::SimulationState;
pub use zeitgeist::Zeitgeist;
