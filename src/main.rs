use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use daisyworld::{
    config::{check_albedo, check_luminosity, check_pollution, check_start_ratio, check_ticks},
    ConfigLoader, CsvLog, EngineBuilder, EngineSettings, LuminosityMode, SimulationConfig,
};

#[derive(Debug, Parser)]
#[command(author, version, about = "Daisyworld climate feedback simulator")]
struct Cli {
    /// YAML scenario used as the base configuration; flags override it
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Start % of whites [0,50] (default 20)
    #[arg(long, value_name = "start-%-whites", value_parser = |s: &str| start_ratio("white_ratio", s))]
    white_ratio: Option<u32>,

    /// Start % of blacks [0,50] (default 20)
    #[arg(long, value_name = "start-%-blacks", value_parser = |s: &str| start_ratio("black_ratio", s))]
    black_ratio: Option<u32>,

    /// Albedo of whites [0,1) (default 0.75)
    #[arg(long, value_name = "albedo-of-whites", value_parser = |s: &str| albedo("white_albedo", s))]
    white_albedo: Option<f64>,

    /// Albedo of blacks [0,1) (default 0.25)
    #[arg(long, value_name = "albedo-of-blacks", value_parser = |s: &str| albedo("black_albedo", s))]
    black_albedo: Option<f64>,

    /// Albedo of bare surface [0,1) (default 0.4)
    #[arg(long, value_name = "albedo-of-surface", value_parser = |s: &str| albedo("surface_albedo", s))]
    surface_albedo: Option<f64>,

    /// Initial solar luminosity (0,3] (default 0.8)
    #[arg(long, value_name = "solar-luminosity", value_parser = solar_luminosity)]
    solar_luminosity: Option<f64>,

    /// Ticks the simulation runs, at least 1 (default 1000)
    #[arg(long, value_parser = ticks)]
    ticks: Option<u64>,

    /// Luminosity schedule (default: default)
    #[arg(long, value_enum)]
    mode: Option<LuminosityMode>,

    /// Pollution level [0,10]; 0 disables it (default 0)
    #[arg(long, value_parser = pollution)]
    pollution: Option<f64>,

    /// Random seed; drawn from entropy when omitted
    #[arg(long)]
    seed: Option<u64>,

    /// CSV log destination
    #[arg(long, default_value = "output.csv")]
    output: PathBuf,
}

impl Cli {
    fn resolve_config(&self) -> Result<SimulationConfig> {
        let mut config = match &self.config {
            Some(path) => ConfigLoader::new(".").load(path)?,
            None => SimulationConfig::default(),
        };
        if let Some(value) = self.white_ratio {
            config.white_ratio = value;
        }
        if let Some(value) = self.black_ratio {
            config.black_ratio = value;
        }
        if let Some(value) = self.white_albedo {
            config.white_albedo = value;
        }
        if let Some(value) = self.black_albedo {
            config.black_albedo = value;
        }
        if let Some(value) = self.surface_albedo {
            config.surface_albedo = value;
        }
        if let Some(value) = self.solar_luminosity {
            config.solar_luminosity = value;
        }
        if let Some(value) = self.ticks {
            config.ticks = value;
        }
        if let Some(value) = self.mode {
            config.mode = value;
        }
        if let Some(value) = self.pollution {
            config.pollution = value;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        config.validate()?;
        Ok(config)
    }
}

fn start_ratio(field: &'static str, value: &str) -> Result<u32, String> {
    let value = value
        .trim()
        .parse::<u32>()
        .map_err(|_| format!("start % of daisy must be int in range [0,50], got '{value}'"))?;
    check_start_ratio(field, value).map_err(|err| err.to_string())
}

fn albedo(field: &'static str, value: &str) -> Result<f64, String> {
    let value = value
        .trim()
        .parse::<f64>()
        .map_err(|_| format!("albedo must be float in range [0,1), got '{value}'"))?;
    check_albedo(field, value).map_err(|err| err.to_string())
}

fn solar_luminosity(value: &str) -> Result<f64, String> {
    let value = value
        .trim()
        .parse::<f64>()
        .map_err(|_| format!("luminosity must be float in range (0,3], got '{value}'"))?;
    check_luminosity(value).map_err(|err| err.to_string())
}

fn ticks(value: &str) -> Result<u64, String> {
    let value = value.trim().parse::<u64>().map_err(|_| {
        format!("tick count of simulation must be int in range [1,+inf), got '{value}'")
    })?;
    check_ticks(value).map_err(|err| err.to_string())
}

fn pollution(value: &str) -> Result<f64, String> {
    let value = value
        .trim()
        .parse::<f64>()
        .map_err(|_| format!("pollution must be float in range [0,10], got '{value}'"))?;
    check_pollution(value).map_err(|err| err.to_string())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn run(cli: &Cli) -> Result<()> {
    let config = cli.resolve_config()?;
    let seed = config.seed.unwrap_or_else(rand::random);

    let mut engine = EngineBuilder::new(EngineSettings::new(config, seed))
        .with_daisyworld_systems()
        .build();
    let mut world = engine.initialize()?;
    let mut log = CsvLog::create(&cli.output)?;
    engine.run(&mut world, &mut log)?;

    let (white, black) = world.population();
    println!(
        "Daisyworld completed {} ticks (seed {}). Final population: {} white, {} black; global temperature {:.3}",
        engine.settings().config.ticks,
        seed,
        white,
        black,
        world.global_temperature()
    );
    Ok(())
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    run(&cli)
}
