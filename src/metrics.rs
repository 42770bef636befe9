use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use anyhow::{Context, Result};

use crate::world::World;

pub const CSV_HEADER: &str = "tick,white population,black population,luminosity,global temperature";

/// Summary of the grid emitted once per tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickRecord {
    pub tick: u64,
    pub white: usize,
    pub black: usize,
    pub luminosity: f64,
    pub global_temperature: f64,
}

impl TickRecord {
    pub fn observe(tick: u64, world: &World, luminosity: f64) -> Self {
        let (white, black) = world.population();
        Self {
            tick,
            white,
            black,
            luminosity,
            global_temperature: world.global_temperature(),
        }
    }

    /// CSV row without the line terminator. Floats use their shortest
    /// round-trip form and keep a trailing `.0` when integral.
    pub fn to_csv_row(&self) -> String {
        format!(
            "{},{},{},{:?},{:?}",
            self.tick, self.white, self.black, self.luminosity, self.global_temperature
        )
    }
}

/// Receives one record per tick, starting with tick 0.
pub trait MetricsSink {
    fn record(&mut self, record: &TickRecord) -> Result<()>;

    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

impl MetricsSink for Vec<TickRecord> {
    fn record(&mut self, record: &TickRecord) -> Result<()> {
        self.push(*record);
        Ok(())
    }
}

/// Append-only CSV log.
pub struct CsvLog<W: Write> {
    writer: W,
}

impl CsvLog<BufWriter<File>> {
    /// Creates (or truncates) `path` and writes the header row.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path)
            .with_context(|| format!("Failed to create log file {}", path.display()))?;
        Self::new(BufWriter::new(file))
    }
}

impl<W: Write> CsvLog<W> {
    pub fn new(mut writer: W) -> Result<Self> {
        writeln!(writer, "{CSV_HEADER}").context("Failed to write log header")?;
        Ok(Self { writer })
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> MetricsSink for CsvLog<W> {
    fn record(&mut self, record: &TickRecord) -> Result<()> {
        writeln!(self.writer, "{}", record.to_csv_row())
            .with_context(|| format!("Failed to write log row for tick {}", record.tick))
    }

    fn finish(&mut self) -> Result<()> {
        self.writer.flush().context("Failed to flush log")
    }
}
