//! Generator backends for Menagerie.
//!
//! Two implementations of [`menagerie_core::Generator`]:
//! - [`GeminiGenerator`] — calls the Gemini REST API with structured-output
//!   schemas and transparent retry on quota errors.
//! - [`ScriptedGenerator`] — deterministic offline backend for development
//!   and tests; no network, no key.
//!
//! [`build`] picks one from the loaded configuration.

pub mod gemini;
pub mod rolls;
pub mod scripted;

pub use gemini::GeminiGenerator;
pub use scripted::ScriptedGenerator;

use std::sync::Arc;

use menagerie_config::AppConfig;
use menagerie_core::Generator;

/// Construct the generator the configuration asks for.
///
/// With an API key: the Gemini client. Without one: the scripted backend,
/// with a warning so nobody mistakes canned content for the real thing.
pub fn build(config: &AppConfig) -> Arc<dyn Generator> {
    match &config.api_key {
        Some(key) => Arc::new(GeminiGenerator::new(key.clone(), config.model.clone())),
        None => {
            tracing::warn!("no API key configured, falling back to the offline scripted generator");
            Arc::new(ScriptedGenerator::new())
        }
    }
}
