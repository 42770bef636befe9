use anyhow::Result;

use crate::{
    config::Albedo,
    engine::{System, SystemContext},
    rng::StreamRng,
    world::World,
};

/// Heating contributed by `absorbed` luminosity. Non-positive absorption
/// yields exactly 80 instead of evaluating the logarithm.
pub fn local_heating(absorbed: f64) -> f64 {
    if absorbed > 0.0 {
        80.0 + 72.0 * absorbed.ln()
    } else {
        80.0
    }
}

/// Moves every patch temperature halfway towards its local heating under
/// `luminosity`. Patches are independent of each other.
pub fn apply_heating(world: &mut World, albedo: &Albedo, luminosity: f64) {
    for patch in world.patches_mut() {
        let absorbed = luminosity * (1.0 - albedo.of(patch.kind));
        patch.temperature = (patch.temperature + local_heating(absorbed)) / 2.0;
    }
}

pub struct HeatingSystem;

impl HeatingSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for HeatingSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for HeatingSystem {
    fn name(&self) -> &str {
        "heating"
    }

    fn run(
        &mut self,
        ctx: &SystemContext,
        world: &mut World,
        _rng: &mut StreamRng<'_>,
    ) -> Result<()> {
        apply_heating(world, &ctx.albedo, ctx.luminosity);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{Age, Patch, PatchKind};

    fn albedo() -> Albedo {
        Albedo {
            white: 0.75,
            black: 0.25,
            surface: 0.4,
        }
    }

    #[test]
    fn test_local_heating_formula() {
        assert_eq!(local_heating(1.0), 80.0);
        assert!((local_heating(0.6) - (80.0 + 72.0 * 0.6_f64.ln())).abs() < 1e-12);
    }

    #[test]
    fn test_zero_absorption_is_special_cased() {
        assert_eq!(local_heating(0.0), 80.0);
        assert_eq!(local_heating(-0.5), 80.0);
    }

    #[test]
    fn test_heating_smooths_towards_target() {
        let mut world = World::new(2);
        world.set(0, 0, Patch::daisy(PatchKind::White, 10.0, Age::Years(4)));
        world.set(0, 1, Patch::daisy(PatchKind::Black, 0.0, Age::Newborn));
        apply_heating(&mut world, &albedo(), 0.8);

        let white_target = local_heating(0.8 * 0.25);
        let black_target = local_heating(0.8 * 0.75);
        let surface_target = local_heating(0.8 * 0.6);
        assert!((world.patch(0, 0).temperature - (10.0 + white_target) / 2.0).abs() < 1e-12);
        assert!((world.patch(0, 1).temperature - black_target / 2.0).abs() < 1e-12);
        assert!((world.patch(1, 0).temperature - surface_target / 2.0).abs() < 1e-12);

        assert_eq!(world.patch(0, 0).age, Some(Age::Years(4)));
        assert_eq!(world.patch(0, 1).kind, PatchKind::Black);
        assert!(world.patch(1, 1).is_empty());
    }
}
