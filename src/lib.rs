pub mod config;
pub mod engine;
pub mod metrics;
pub mod rng;
pub mod schedule;
pub mod systems;
pub mod world;

pub use config::{ConfigLoader, LuminosityMode, SimulationConfig};
pub use engine::{Engine, EngineBuilder, EngineSettings};
pub use metrics::{CsvLog, MetricsSink, TickRecord};
pub use world::World;
