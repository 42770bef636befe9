use daisyworld::{
    config::SimulationConfig,
    engine::{EngineBuilder, EngineSettings},
    metrics::{CsvLog, TickRecord, CSV_HEADER},
    systems::local_heating,
    world::{PatchKind, GRID_LEN},
};

fn build_engine(config: SimulationConfig, seed: u64) -> EngineBuilder {
    EngineBuilder::new(EngineSettings::new(config, seed)).with_daisyworld_systems()
}

fn collect(config: SimulationConfig, seed: u64) -> Vec<TickRecord> {
    let mut engine = build_engine(config, seed).build();
    let mut world = engine.initialize().expect("grid initializes");
    let mut records = Vec::new();
    engine
        .run_with_hook(&mut world, |record| records.push(*record))
        .expect("run succeeds");
    records
}

#[test]
fn single_tick_run_writes_two_rows() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = temp.path().join("output.csv");
    let config = SimulationConfig {
        ticks: 1,
        ..SimulationConfig::default()
    };

    let mut engine = build_engine(config, 3).build();
    let mut world = engine.initialize().unwrap();
    let mut log = CsvLog::create(&path).unwrap();
    engine.run(&mut world, &mut log).unwrap();
    drop(log);

    let text = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], CSV_HEADER);
    assert!(lines[1].starts_with("0,"));
    assert!(lines[2].starts_with("1,"));
    for line in &lines[1..] {
        assert_eq!(line.split(',').count(), 5);
    }
}

#[test]
fn existing_log_is_truncated() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = temp.path().join("output.csv");
    std::fs::write(&path, "stale\nstale\nstale\nstale\nstale\n").unwrap();
    let config = SimulationConfig {
        ticks: 2,
        ..SimulationConfig::default()
    };

    let mut engine = build_engine(config, 3).build();
    let mut world = engine.initialize().unwrap();
    let mut log = CsvLog::create(&path).unwrap();
    engine.run(&mut world, &mut log).unwrap();
    drop(log);

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(!text.contains("stale"));
    assert_eq!(text.lines().count(), 4);
}

#[test]
fn initial_temperature_is_mean_of_half_local_heating() {
    let config = SimulationConfig::default();
    let albedo = config.albedo();
    let luminosity = config.solar_luminosity;
    let mut engine = build_engine(config, 11).build();
    let world = engine.initialize().unwrap();

    let expected: f64 = world
        .patches()
        .iter()
        .map(|p| local_heating(luminosity * (1.0 - albedo.of(p.kind))) / 2.0)
        .sum::<f64>()
        / world.cell_count() as f64;
    assert!((world.global_temperature() - expected).abs() < 1e-9);

    let (white, black) = world.population();
    assert_eq!(white, 20 * GRID_LEN * GRID_LEN / 100);
    assert_eq!(black, 20 * GRID_LEN * GRID_LEN / 100);
}

#[test]
fn tick_zero_record_reflects_initial_grid() {
    let config = SimulationConfig {
        ticks: 1,
        ..SimulationConfig::default()
    };
    let records = collect(config, 21);
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].tick, 0);
    assert_eq!((records[0].white, records[0].black), (156, 156));
    assert_eq!(records[0].luminosity, 0.8);
}

#[test]
fn populations_stay_within_grid() {
    let config = SimulationConfig {
        white_ratio: 50,
        black_ratio: 50,
        ticks: 150,
        ..SimulationConfig::default()
    };
    let cells = GRID_LEN * GRID_LEN;
    for record in collect(config, 8) {
        assert!(record.white + record.black <= cells, "tick {}", record.tick);
    }
}

#[test]
fn same_seed_same_trajectory() {
    let config = SimulationConfig {
        ticks: 120,
        pollution: 2.0,
        ..SimulationConfig::default()
    };
    let a = collect(config.clone(), 99);
    let b = collect(config, 99);
    assert_eq!(a, b);
}

#[test]
fn empty_grid_converges_to_surface_heating() {
    let config = SimulationConfig {
        white_ratio: 0,
        black_ratio: 0,
        ticks: 5,
        ..SimulationConfig::default()
    };
    let surface = local_heating(0.8 * (1.0 - 0.4));
    let records = collect(config, 1);
    assert_eq!(records.len(), 6);

    for (n, record) in records.iter().enumerate() {
        assert_eq!((record.white, record.black), (0, 0));
        let expected = surface * (1.0 - 0.5_f64.powi(n as i32 + 1));
        assert!(
            (record.global_temperature - expected).abs() < 1e-9,
            "tick {n}: {} vs {expected}",
            record.global_temperature
        );
    }
}

#[test]
fn engine_grid_keeps_empty_patches_ageless() {
    let config = SimulationConfig {
        ticks: 60,
        ..SimulationConfig::default()
    };
    let mut engine = build_engine(config, 4).build();
    let mut world = engine.initialize().unwrap();
    engine.run_with_hook(&mut world, |_| {}).unwrap();

    for patch in world.patches() {
        assert_eq!(patch.kind == PatchKind::Empty, patch.age.is_none());
        assert!(!patch.is_newborn());
    }
}
