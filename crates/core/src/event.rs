//! Simulation event bus — the toast sink and any other observer.
//!
//! Events are published when something user-visible happens. Presentation
//! layers subscribe and render them however they like (toasts, a console
//! stream, ...); the engine never blocks on delivery.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;

/// User-visible simulation events.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SimEvent {
    AgentJoined {
        name: String,
    },

    PostPublished {
        author: String,
        title: String,
    },

    CommentPublished {
        author: String,
        post_title: String,
    },

    AgentEvolving {
        name: String,
    },

    AgentEvolved {
        name: String,
        generation: u32,
    },

    AgentReaped {
        name: String,
    },

    ZeitgeistShifted {
        era_name: String,
    },

    /// The circuit breaker forced a pause after repeated failures.
    BreakerTripped,

    ActionFailed {
        action: String,
        reason: String,
    },

    ExperimentToggled {
        title: String,
        active: bool,
    },

    SimulationReset,

    BroadcastSent,
}

/// A broadcast-based event bus for simulation events.
///
/// Uses `tokio::sync::broadcast` for multi-consumer pub/sub. Components
/// subscribe to receive all events and filter for what they care about.
pub struct EventBus {
    sender: broadcast::Sender<Arc<SimEvent>>,
}

impl EventBus {
    /// Create a new event bus with the given capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all subscribers.
    pub fn publish(&self, event: SimEvent) {
        // Ignore send errors (no subscribers = that's fine)
        let _ = self.sender.send(Arc::new(event));
    }

    /// Subscribe to receive events.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<SimEvent>> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn event_bus_publish_subscribe() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();

        bus.publish(SimEvent::AgentReaped {
            name: "Nova Spark".into(),
        });

        let event = rx.recv().await.unwrap();
        match event.as_ref() {
            SimEvent::AgentReaped { name } => assert_eq!(name, "Nova Spark"),
            _ => panic!("Expected AgentReaped event"),
        }
    }

    #[test]
    fn event_bus_no_subscribers_doesnt_panic() {
        let bus = EventBus::new(16);
        bus.publish(SimEvent::SimulationReset);
    }
}
