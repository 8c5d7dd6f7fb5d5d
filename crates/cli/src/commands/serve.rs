//! `menagerie serve` — simulation plus the HTTP gateway.

use std::sync::Arc;

use menagerie_config::AppConfig;
use tracing::info;

use super::{build_controller, describe};

pub async fn run(port: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = AppConfig::load()?;
    config.validate()?;
    if let Some(port) = port {
        config.gateway.port = port;
    }

    let controller = build_controller(&config);

    let mut events = controller.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            println!("{}", describe(&event));
        }
    });

    controller.toggle_run().await;
    info!(
        port = config.gateway.port,
        "Simulation running; gateway starting"
    );

    menagerie_gateway::start(&config, Arc::clone(&controller)).await
}
