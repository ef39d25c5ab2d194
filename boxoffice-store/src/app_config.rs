use boxoffice_core::seat::validate_dimensions;
use boxoffice_core::{CoreError, CoreResult};
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub venue: VenueConfig,
    pub holds: HoldConfig,
    pub simulation: SimulationConfig,
}

/// Which placement strategy fills the venue
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AllocatorKind {
    Sequential,
    FrontAndCenter,
}

#[derive(Debug, Deserialize, Clone)]
pub struct VenueConfig {
    pub rows: u32,
    pub columns: u32,
    pub allocator: AllocatorKind,
}

#[derive(Debug, Deserialize, Clone)]
pub struct HoldConfig {
    pub ttl_seconds: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SimulationConfig {
    pub workers: usize,
    pub max_party_size: usize,
    pub reserve_ratio: f64,
    pub min_think_ms: u64,
    pub max_think_ms: u64,
    /// Stop once the venue is down to this many free seats
    pub stop_when_available_at_most: usize,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());
        Self::load_from("config", &run_mode)
    }

    /// Layered load: built-in defaults, `{dir}/default`, `{dir}/{run_mode}`,
    /// `{dir}/local`, then `BOXOFFICE_*` environment variables.
    pub fn load_from(dir: &str, run_mode: &str) -> Result<Self, config::ConfigError> {
        let s = config::Config::builder()
            .set_default("venue.rows", 10)?
            .set_default("venue.columns", 24)?
            .set_default("venue.allocator", "front_and_center")?
            .set_default("holds.ttl_seconds", 6)?
            .set_default("simulation.workers", 6)?
            .set_default("simulation.max_party_size", 7)?
            .set_default("simulation.reserve_ratio", 0.8)?
            .set_default("simulation.min_think_ms", 500)?
            .set_default("simulation.max_think_ms", 2500)?
            .set_default("simulation.stop_when_available_at_most", 24)?
            .add_source(config::File::with_name(&format!("{}/default", dir)).required(false))
            .add_source(config::File::with_name(&format!("{}/{}", dir, run_mode)).required(false))
            // Local overrides, not checked in
            .add_source(config::File::with_name(&format!("{}/local", dir)).required(false))
            // Eg. `BOXOFFICE_VENUE__ROWS=20`
            .add_source(
                config::Environment::with_prefix("BOXOFFICE")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Config = s.try_deserialize()?;
        config
            .validate()
            .map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Ok(config)
    }

    pub fn validate(&self) -> CoreResult<()> {
        validate_dimensions(self.venue.rows, self.venue.columns)?;

        if self.holds.ttl_seconds == 0 {
            return Err(CoreError::ValidationError("holds.ttl_seconds must be positive".to_string()));
        }

        let sim = &self.simulation;
        if sim.workers == 0 || sim.max_party_size == 0 {
            return Err(CoreError::ValidationError(
                "simulation needs at least one worker and a party size of at least one".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&sim.reserve_ratio) {
            return Err(CoreError::ValidationError(format!(
                "simulation.reserve_ratio must be within 0..=1, got {}",
                sim.reserve_ratio
            )));
        }
        if sim.min_think_ms > sim.max_think_ms {
            return Err(CoreError::ValidationError("simulation.min_think_ms exceeds max_think_ms".to_string()));
        }
        Ok(())
    }
}
