use anyhow::Result;

use crate::{
    engine::{System, SystemContext},
    rng::StreamRng,
    world::World,
};

/// Fraction of a cell's heat shared with a full ring of eight neighbours.
pub const DIFFUSE_RATIO: f64 = 0.5;

/// Spreads heat between neighbouring cells.
///
/// Every cell gives `DIFFUSE_RATIO / 8` of its temperature to each in-bounds
/// neighbour and keeps the rest, so total heat is conserved. All new values
/// are computed from a copy of the pre-diffusion temperatures and committed
/// together.
pub fn diffuse(world: &mut World) {
    let side = world.side();
    let previous: Vec<f64> = world.patches().iter().map(|p| p.temperature).collect();

    let mut next = Vec::with_capacity(previous.len());
    for row in 0..side {
        for col in 0..side {
            let k = world.neighbour_count(row, col) as f64;
            let mut t = previous[row * side + col] * (1.0 - k / 8.0 * DIFFUSE_RATIO);
            for (r, c) in world.neighbours(row, col) {
                t += previous[r * side + c] / 8.0 * DIFFUSE_RATIO;
            }
            next.push(t);
        }
    }

    for (patch, temperature) in world.patches_mut().iter_mut().zip(next) {
        patch.temperature = temperature;
    }
}

pub struct DiffusionSystem;

impl DiffusionSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DiffusionSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for DiffusionSystem {
    fn name(&self) -> &str {
        "diffusion"
    }

    fn run(
        &mut self,
        _ctx: &SystemContext,
        world: &mut World,
        _rng: &mut StreamRng<'_>,
    ) -> Result<()> {
        diffuse(world);
        Ok(())
    }
}
