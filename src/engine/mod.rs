use anyhow::Result;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    config::{Albedo, SimulationConfig},
    metrics::{MetricsSink, TickRecord},
    rng::{RngManager, StreamRng},
    schedule::LuminositySchedule,
    systems::{apply_heating, DiffusionSystem, HeatingSystem, LifeCycleSystem},
    world::{World, GRID_LEN},
};

pub struct EngineSettings {
    pub config: SimulationConfig,
    pub seed: u64,
    pub side: usize,
}

impl EngineSettings {
    pub fn new(config: SimulationConfig, seed: u64) -> Self {
        Self {
            config,
            seed,
            side: GRID_LEN,
        }
    }

    pub fn with_side(mut self, side: usize) -> Self {
        self.side = side;
        self
    }
}

pub struct EngineBuilder {
    settings: EngineSettings,
    systems: Vec<Box<dyn System>>,
}

impl EngineBuilder {
    pub fn new(settings: EngineSettings) -> Self {
        Self {
            settings,
            systems: Vec::new(),
        }
    }

    pub fn with_system(mut self, system: impl System + 'static) -> Self {
        self.systems.push(Box::new(system));
        self
    }

    /// Heating, then diffusion, then the life cycle: the per-tick order of
    /// the model.
    pub fn with_daisyworld_systems(self) -> Self {
        self.with_system(HeatingSystem::new())
            .with_system(DiffusionSystem::new())
            .with_system(LifeCycleSystem::new())
    }

    pub fn build(self) -> Engine {
        Engine {
            rng: RngManager::new(self.settings.seed),
            schedule: LuminositySchedule::new(self.settings.config.mode),
            luminosity: self.settings.config.solar_luminosity,
            systems: self.systems,
            settings: self.settings,
            phase: Phase::Uninitialized,
            extinct: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Uninitialized,
    Running { tick: u64 },
    Finished,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("engine is already initialized")]
    AlreadyInitialized,
    #[error("engine must be initialized before it can run")]
    NotInitialized,
    #[error("engine has already run")]
    AlreadyRun,
}

pub struct Engine {
    rng: RngManager,
    systems: Vec<Box<dyn System>>,
    schedule: LuminositySchedule,
    luminosity: f64,
    settings: EngineSettings,
    phase: Phase,
    extinct: bool,
}

impl Engine {
    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn luminosity(&self) -> f64 {
        self.luminosity
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Seeds the grid and applies one heating pass (no diffusion) so tick 0
    /// starts from realistic temperatures.
    pub fn initialize(&mut self) -> Result<World> {
        if self.phase != Phase::Uninitialized {
            return Err(EngineError::AlreadyInitialized.into());
        }
        let config = &self.settings.config;
        let mut world = config.seed_world(self.settings.side, &mut self.rng.stream("seeding"))?;
        apply_heating(&mut world, &config.albedo(), self.luminosity);

        let (white, black) = world.population();
        info!(
            seed = self.settings.seed,
            side = self.settings.side,
            white,
            black,
            ticks = config.ticks,
            mode = ?config.mode,
            pollution = config.pollution,
            "grid initialized"
        );
        self.phase = Phase::Running { tick: 0 };
        Ok(world)
    }

    /// Emits the tick-0 record, then runs every configured tick, emitting one
    /// record per tick before the luminosity schedule advances.
    pub fn run(&mut self, world: &mut World, sink: &mut dyn MetricsSink) -> Result<()> {
        match self.phase {
            Phase::Running { tick: 0 } => {}
            Phase::Uninitialized => return Err(EngineError::NotInitialized.into()),
            Phase::Running { .. } | Phase::Finished => return Err(EngineError::AlreadyRun.into()),
        }

        self.emit(world, 0, sink)?;
        for tick in 1..=self.settings.config.ticks {
            self.step(world, tick)?;
            self.emit(world, tick, sink)?;
            self.luminosity = self.schedule.advance(self.luminosity, tick);
            self.phase = Phase::Running { tick };
        }
        sink.finish()?;
        self.phase = Phase::Finished;

        let (white, black) = world.population();
        info!(
            ticks = self.settings.config.ticks,
            white,
            black,
            luminosity = self.luminosity,
            global_temperature = world.global_temperature(),
            "simulation finished"
        );
        Ok(())
    }

    pub fn run_with_hook<F>(&mut self, world: &mut World, hook: F) -> Result<()>
    where
        F: FnMut(&TickRecord),
    {
        self.run(world, &mut HookSink(hook))
    }

    fn step(&mut self, world: &mut World, tick: u64) -> Result<()> {
        let ctx = SystemContext {
            tick,
            luminosity: self.luminosity,
            pollution: self.settings.config.pollution,
            albedo: self.settings.config.albedo(),
        };
        for system in &mut self.systems {
            let mut rng_stream = self.rng.stream(system.name());
            system.run(&ctx, world, &mut rng_stream)?;
        }
        Ok(())
    }

    fn emit(&mut self, world: &World, tick: u64, sink: &mut dyn MetricsSink) -> Result<()> {
        let record = TickRecord::observe(tick, world, self.luminosity);
        debug!(
            tick,
            white = record.white,
            black = record.black,
            luminosity = record.luminosity,
            global_temperature = record.global_temperature,
            "tick"
        );
        if record.white + record.black == 0 && !self.extinct {
            warn!(tick, "no daisies left on the grid");
            self.extinct = true;
        }
        sink.record(&record)
    }
}

struct HookSink<F>(F);

impl<F: FnMut(&TickRecord)> MetricsSink for HookSink<F> {
    fn record(&mut self, record: &TickRecord) -> Result<()> {
        (self.0)(record);
        Ok(())
    }
}

/// Per-tick inputs shared by every system.
pub struct SystemContext {
    pub tick: u64,
    pub luminosity: f64,
    pub pollution: f64,
    pub albedo: Albedo,
}

pub trait System {
    fn name(&self) -> &str;
    fn run(&mut self, ctx: &SystemContext, world: &mut World, rng: &mut StreamRng<'_>)
        -> Result<()>;
}
