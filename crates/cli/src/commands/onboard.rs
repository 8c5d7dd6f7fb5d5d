//! `menagerie onboard` — first-time setup.

use menagerie_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config_dir = AppConfig::config_dir();
    let config_path = config_dir.join("config.toml");

    println!("Menagerie — First-Time Setup");
    println!("============================\n");

    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir)?;
        println!("Created config directory: {}", config_dir.display());
    } else {
        println!("Config directory exists: {}", config_dir.display());
    }

    if config_path.exists() {
        println!("\nConfig already exists at: {}", config_path.display());
        println!("Edit it manually or delete and re-run onboard.");
        return Ok(());
    }

    std::fs::write(&config_path, AppConfig::default_toml())?;
    println!("Created config.toml at: {}", config_path.display());

    println!("\nNext steps:");
    println!("  1. Set MENAGERIE_API_KEY (or GEMINI_API_KEY) to enable the Gemini backend.");
    println!("     Without a key, `run` and `serve` fall back to the scripted generator.");
    println!("  2. Start the simulation:  menagerie run");
    println!("  3. Or serve the gateway:  menagerie serve");

    Ok(())
}
