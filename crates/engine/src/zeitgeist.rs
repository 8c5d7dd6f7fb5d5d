//! The zeitgeist cadence: periodic re-analysis of the collective mood.
//!
//! Runs outside the single-flight guard and outside the circuit breaker's
//! failure path. A failed analysis logs and leaves the previous snapshot in
//! place; the next cadence hit tries again.

use std::sync::Arc;

use menagerie_core::{
    ActivityKind, LogLevel, PostSample, SYSTEM_AUTHOR, SimEvent, Zeitgeist, ZeitgeistContext,
};

use crate::controller::SimulationController;

/// Newest posts sampled per analysis.
pub const SAMPLE_POSTS: usize = 8;

/// Latest comments sampled per analysis.
pub const SAMPLE_COMMENTS: usize = 10;

impl SimulationController {
    /// Re-analyze the zeitgeist from recent content and replace the
    /// snapshot wholesale.
    pub(crate) async fn run_zeitgeist(self: Arc<Self>) {
        let ctx = {
            let world = self.world.read().await;
            let settings = self.settings.read().await;
            ZeitgeistContext {
                post_samples: world
                    .posts
                    .iter()
                    .take(SAMPLE_POSTS)
                    .map(|p| PostSample {
                        title: p.title.clone(),
                        content: p.content.clone(),
                    })
                    .collect(),
                comment_samples: world
                    .comments
                    .iter()
                    .rev()
                    .take(SAMPLE_COMMENTS)
                    .map(|c| c.content.clone())
                    .collect(),
                language: settings.language.clone(),
            }
        };

        match self.generator.analyze_zeitgeist(ctx).await {
            Ok(payload) => {
                let zeitgeist = Zeitgeist {
                    era_name: payload.era_name,
                    summary: payload.summary,
                    mood: payload.mood,
                    trending_topics: payload.trending_topics,
                    cohesion: payload.cohesion.min(100),
                    dominant_narrative: payload.dominant_narrative,
                    updated_at: chrono::Utc::now(),
                };

                // A successful ambient call is proof the provider is healthy.
                self.breaker.reset();

                let era_name = zeitgeist.era_name.clone();
                {
                    let mut world = self.world.write().await;
                    world.log(
                        LogLevel::Info,
                        format!("Zeitgeist shift: the era of \"{era_name}\" begins."),
                    );
                    world.record_activity(
                        SYSTEM_AUTHOR,
                        ActivityKind::EraShift {
                            era_name: era_name.clone(),
                        },
                    );
                    world.zeitgeist = Some(zeitgeist);
                }
                self.bus.publish(SimEvent::ZeitgeistShifted { era_name });
            }
            Err(err) => {
                let mut world = self.world.write().await;
                world.log(
                    LogLevel::Error,
                    format!("Zeitgeist analysis failed: {err}"),
                );
            }
        }
    }

    /// Run an analysis immediately, outside the cadence.
    pub async fn force_zeitgeist(self: &Arc<Self>) {
        Arc::clone(self).run_zeitgeist().await;
    }
}
