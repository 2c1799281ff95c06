use chrono::DateTime;
use streakbot_core::commands::format_time_until;
use streakbot_core::ClockSource;

use super::load_config;

pub fn run(at: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;
    let clock = ClockSource::system(config.zone()?);

    let from = match at {
        Some(raw) => DateTime::parse_from_rfc3339(&raw)?,
        None => clock.now().fixed_offset(),
    };
    let next = clock.next_midnight(&from)?;
    let remaining = clock.until_next_midnight(&from)?;

    println!("{}", format_time_until(remaining));
    println!("Next midnight: {} ({})", next.to_rfc3339(), clock.zone());
    Ok(())
}
