use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::ValueEnum;
use rand::Rng;
use serde::Deserialize;
use thiserror::Error;

use crate::systems::MAXIMUM_POLLUTION;
use crate::world::{Age, Patch, PatchKind, World, AGE_LIMIT};

pub const MAX_START_RATIO: u32 = 50;
pub const MAX_SOLAR_LUMINOSITY: f64 = 3.0;

fn default_start_ratio() -> u32 {
    20
}

fn default_white_albedo() -> f64 {
    0.75
}

fn default_black_albedo() -> f64 {
    0.25
}

fn default_surface_albedo() -> f64 {
    0.4
}

fn default_solar_luminosity() -> f64 {
    0.8
}

fn default_ticks() -> u64 {
    1000
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum LuminosityMode {
    /// Luminosity stays at its initial value.
    #[default]
    Default,
    /// Luminosity climbs over ticks 201-400 and falls over ticks 601-850.
    RampUpRampDown,
}

/// Immutable parameters of one run.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SimulationConfig {
    /// Percent of cells seeded with white daisies.
    #[serde(default = "default_start_ratio")]
    pub white_ratio: u32,
    /// Percent of cells seeded with black daisies.
    #[serde(default = "default_start_ratio")]
    pub black_ratio: u32,
    #[serde(default = "default_white_albedo")]
    pub white_albedo: f64,
    #[serde(default = "default_black_albedo")]
    pub black_albedo: f64,
    #[serde(default = "default_surface_albedo")]
    pub surface_albedo: f64,
    #[serde(default = "default_solar_luminosity")]
    pub solar_luminosity: f64,
    #[serde(default = "default_ticks")]
    pub ticks: u64,
    #[serde(default)]
    pub mode: LuminosityMode,
    /// Stressor level in `[0, MAXIMUM_POLLUTION]`; 0 disables it.
    #[serde(default)]
    pub pollution: f64,
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            white_ratio: default_start_ratio(),
            black_ratio: default_start_ratio(),
            white_albedo: default_white_albedo(),
            black_albedo: default_black_albedo(),
            surface_albedo: default_surface_albedo(),
            solar_luminosity: default_solar_luminosity(),
            ticks: default_ticks(),
            mode: LuminosityMode::default(),
            pollution: 0.0,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{field}: start % of daisy must be int in range [0,50], got {value}")]
    StartRatio { field: &'static str, value: u32 },
    #[error("{field}: albedo must be float in range [0,1), got {value}")]
    Albedo { field: &'static str, value: f64 },
    #[error("luminosity must be float in range (0,3], got {0}")]
    Luminosity(f64),
    #[error("tick count of simulation must be int in range [1,+inf), got {0}")]
    Ticks(u64),
    #[error("pollution must be float in range [0,10], got {0}")]
    Pollution(f64),
    #[error("{requested} daisies requested but the grid only has {available} cells")]
    Capacity { requested: usize, available: usize },
}

pub fn check_start_ratio(field: &'static str, value: u32) -> Result<u32, ConfigError> {
    if value <= MAX_START_RATIO {
        Ok(value)
    } else {
        Err(ConfigError::StartRatio { field, value })
    }
}

pub fn check_albedo(field: &'static str, value: f64) -> Result<f64, ConfigError> {
    if (0.0..1.0).contains(&value) {
        Ok(value)
    } else {
        Err(ConfigError::Albedo { field, value })
    }
}

pub fn check_luminosity(value: f64) -> Result<f64, ConfigError> {
    if value > 0.0 && value <= MAX_SOLAR_LUMINOSITY {
        Ok(value)
    } else {
        Err(ConfigError::Luminosity(value))
    }
}

pub fn check_ticks(value: u64) -> Result<u64, ConfigError> {
    if value >= 1 {
        Ok(value)
    } else {
        Err(ConfigError::Ticks(value))
    }
}

pub fn check_pollution(value: f64) -> Result<f64, ConfigError> {
    if (0.0..=MAXIMUM_POLLUTION as f64).contains(&value) {
        Ok(value)
    } else {
        Err(ConfigError::Pollution(value))
    }
}

/// Albedo lookup by patch kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Albedo {
    pub white: f64,
    pub black: f64,
    pub surface: f64,
}

impl Albedo {
    pub fn of(&self, kind: PatchKind) -> f64 {
        match kind {
            PatchKind::Empty => self.surface,
            PatchKind::White => self.white,
            PatchKind::Black => self.black,
        }
    }
}

/// Number of cells a start ratio claims on a grid of `cells` cells, rounded down.
pub fn seed_count(ratio: u32, cells: usize) -> usize {
    ratio as usize * cells / 100
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_start_ratio("white_ratio", self.white_ratio)?;
        check_start_ratio("black_ratio", self.black_ratio)?;
        check_albedo("white_albedo", self.white_albedo)?;
        check_albedo("black_albedo", self.black_albedo)?;
        check_albedo("surface_albedo", self.surface_albedo)?;
        check_luminosity(self.solar_luminosity)?;
        check_ticks(self.ticks)?;
        check_pollution(self.pollution)?;
        Ok(())
    }

    pub fn albedo(&self) -> Albedo {
        Albedo {
            white: self.white_albedo,
            black: self.black_albedo,
            surface: self.surface_albedo,
        }
    }

    /// Builds an empty `side` x `side` grid and scatters the starting daisies
    /// over it: all whites first, then blacks into the cells still empty.
    /// Each daisy gets a uniform age in `[0, AGE_LIMIT]`. Temperatures are
    /// left at zero.
    pub fn seed_world<R: Rng + ?Sized>(&self, side: usize, rng: &mut R) -> Result<World, ConfigError> {
        let mut world = World::new(side);
        let cells = world.cell_count();
        let whites = seed_count(self.white_ratio, cells);
        let blacks = seed_count(self.black_ratio, cells);
        if whites + blacks > cells {
            return Err(ConfigError::Capacity {
                requested: whites + blacks,
                available: cells,
            });
        }

        for (kind, count) in [(PatchKind::White, whites), (PatchKind::Black, blacks)] {
            for _ in 0..count {
                let (row, col) = loop {
                    let row = rng.gen_range(0..side);
                    let col = rng.gen_range(0..side);
                    if world.patch(row, col).is_empty() {
                        break (row, col);
                    }
                };
                let age = Age::Years(rng.gen_range(0..=AGE_LIMIT));
                world.set(row, col, Patch::daisy(kind, 0.0, age));
            }
        }
        Ok(world)
    }
}

/// Reads YAML scenario files relative to a base directory.
pub struct ConfigLoader {
    base_dir: PathBuf,
}

impl ConfigLoader {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn load(&self, file: impl AsRef<Path>) -> Result<SimulationConfig> {
        let path = self.base_dir.join(file);
        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read scenario file {}", path.display()))?;
        let config: SimulationConfig = serde_yaml::from_str(&data)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(config)
    }
}
