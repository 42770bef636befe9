use anyhow::Result;
use rand::Rng;

use crate::{
    engine::{System, SystemContext},
    rng::StreamRng,
    world::{Age, Patch, World, AGE_LIMIT, NEIGHBOUR_OFFSETS},
};

/// Upper bound of the pollution scale; also the range of the pollution draw.
pub const MAXIMUM_POLLUTION: u32 = 10;

/// Extra years a daisy ages when pollution strikes it.
pub const POLLUTION_AGE_INCREMENT: u32 = 3;

/// Probability-like fertility of a daisy at `temperature`. Peaks near 22.8
/// and goes negative outside roughly 5..40, where no reproduction happens.
pub fn seed_threshold(temperature: f64) -> f64 {
    0.1457 * temperature - 0.0032 * temperature.powi(2) - 0.6443
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LifeCycleReport {
    pub polluted: usize,
    pub deaths: usize,
    pub births: usize,
}

/// Ages, kills and reproduces every established daisy in one row-major sweep.
///
/// The sweep writes straight into the grid: a cell filled by reproduction is
/// already occupied for the daisies visited after it. Newborns are skipped
/// for the rest of the tick and settled to age 0 once the sweep finishes.
pub fn advance_life_cycle<R: Rng + ?Sized>(
    world: &mut World,
    pollution: f64,
    rng: &mut R,
) -> LifeCycleReport {
    let side = world.side();
    let mut report = LifeCycleReport::default();

    for row in 0..side {
        for col in 0..side {
            let parent = *world.patch(row, col);
            let mut age = match parent.age {
                Some(Age::Years(years)) if parent.kind.is_daisy() => years,
                _ => continue,
            };

            if pollution > 0.0 && rng.gen_range(1..=MAXIMUM_POLLUTION) as f64 <= pollution {
                age += POLLUTION_AGE_INCREMENT;
                report.polluted += 1;
            }
            age += 1;

            if age > AGE_LIMIT {
                world.patch_mut(row, col).clear();
                report.deaths += 1;
                continue;
            }
            world.patch_mut(row, col).age = Some(Age::Years(age));

            if rng.gen::<f64>() < seed_threshold(parent.temperature)
                && world.has_empty_neighbour(row, col)
            {
                let (r, c) = loop {
                    let offset = NEIGHBOUR_OFFSETS[rng.gen_range(0..NEIGHBOUR_OFFSETS.len())];
                    if let Some((r, c)) = world.offset(row, col, offset) {
                        if world.patch(r, c).is_empty() {
                            break (r, c);
                        }
                    }
                };
                let temperature = world.patch(r, c).temperature;
                world.set(r, c, Patch::daisy(parent.kind, temperature, Age::Newborn));
                report.births += 1;
            }
        }
    }

    for patch in world.patches_mut() {
        if patch.is_newborn() {
            patch.age = Some(Age::Years(0));
        }
    }

    report
}

pub struct LifeCycleSystem;

impl LifeCycleSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LifeCycleSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for LifeCycleSystem {
    fn name(&self) -> &str {
        "life_cycle"
    }

    fn run(
        &mut self,
        ctx: &SystemContext,
        world: &mut World,
        rng: &mut StreamRng<'_>,
    ) -> Result<()> {
        let report = advance_life_cycle(world, ctx.pollution, rng);
        tracing::trace!(
            tick = ctx.tick,
            births = report.births,
            deaths = report.deaths,
            polluted = report.polluted,
            "life cycle step"
        );
        Ok(())
    }
}
