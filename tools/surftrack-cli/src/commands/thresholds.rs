//! Print the default maneuver thresholds.

use surftrack_core::ManeuverConfig;

pub fn run() -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(&ManeuverConfig::default())?;
    println!("{json}");
    Ok(())
}
