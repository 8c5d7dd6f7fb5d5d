//! `menagerie run` — headless simulation until Ctrl-C.

use menagerie_config::AppConfig;
use tracing::info;

use super::{build_controller, describe};

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    let controller = build_controller(&config);
    let mut events = controller.subscribe();

    controller.toggle_run().await;
    info!(
        generator = %if config.has_api_key() { "gemini" } else { "scripted" },
        "Simulation running — Ctrl-C to stop"
    );

    loop {
        tokio::select! {
            event = events.recv() => {
                match event {
                    Ok(event) => println!("{}", describe(&event)),
                    // A lagged receiver just resumes from the current tail.
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutting down");
                break;
            }
        }
    }

    Ok(())
}
