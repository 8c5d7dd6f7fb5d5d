//! `menagerie step` — one action against a fresh world.

use menagerie_config::AppConfig;

use super::build_controller;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    let controller = build_controller(&config);
    let outcome = controller.step().await;

    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}
