//! Configuration for the Orrery engine.
//!
//! Settings persist to disk as a RON file and can be overridden from the
//! command line via clap. Missing sections and fields fall back to defaults,
//! unknown fields are ignored.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{
    CONFIG_FILE, CometConfig, Config, DebugConfig, GeneratorConfig, SimulationConfig,
    SolverConfig,
};
pub use error::ConfigError;
