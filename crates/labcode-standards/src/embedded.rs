//! Embedded default tables.
//!
//! The default engine configuration and unit table are compiled in with
//! `include_str!()` so the engine runs without any files on disk.

/// Default engine configuration (TOML).
pub const DEFAULT_ENGINE_CONFIG: &str = include_str!("../data/engine.toml");

/// Default raw-unit table (CSV: `raw,canonical,properties`).
pub const DEFAULT_UNIT_TABLE: &str = include_str!("../data/units.csv");
