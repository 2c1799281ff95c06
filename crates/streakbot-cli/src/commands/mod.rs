pub mod config;
pub mod console;
pub mod run;
pub mod time;

use streakbot_core::Config;

/// Load the config file and apply environment overrides.
pub fn load_config() -> Result<Config, Box<dyn std::error::Error>> {
    let mut config = Config::load()?;
    config.apply_env()?;
    config.validate()?;
    Ok(config)
}
