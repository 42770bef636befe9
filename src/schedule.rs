use crate::config::LuminosityMode;

/// Luminosity added per tick while ramping up.
pub const RAMP_UP_STEP: f64 = 0.005;
/// Luminosity removed per tick while ramping down.
pub const RAMP_DOWN_STEP: f64 = 0.0025;

const RAMP_UP_TICKS: std::ops::RangeInclusive<u64> = 201..=400;
const RAMP_DOWN_TICKS: std::ops::RangeInclusive<u64> = 601..=850;

/// Solar forcing over the run. The change for tick `i` is applied after that
/// tick's record has been emitted. Values are never clamped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LuminositySchedule {
    mode: LuminosityMode,
}

impl LuminositySchedule {
    pub fn new(mode: LuminosityMode) -> Self {
        Self { mode }
    }

    /// Change applied to the luminosity once tick `tick` is complete.
    pub fn delta(&self, tick: u64) -> f64 {
        match self.mode {
            LuminosityMode::Default => 0.0,
            LuminosityMode::RampUpRampDown if RAMP_UP_TICKS.contains(&tick) => RAMP_UP_STEP,
            LuminosityMode::RampUpRampDown if RAMP_DOWN_TICKS.contains(&tick) => -RAMP_DOWN_STEP,
            LuminosityMode::RampUpRampDown => 0.0,
        }
    }

    pub fn advance(&self, luminosity: f64, tick: u64) -> f64 {
        luminosity + self.delta(tick)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_mode_is_constant() {
        let schedule = LuminositySchedule::new(LuminosityMode::Default);
        let mut luminosity = 0.8;
        for tick in 1..=1000 {
            luminosity = schedule.advance(luminosity, tick);
        }
        assert_eq!(luminosity, 0.8);
    }

    #[test]
    fn test_ramp_windows() {
        let schedule = LuminositySchedule::new(LuminosityMode::RampUpRampDown);
        assert_eq!(schedule.delta(200), 0.0);
        assert_eq!(schedule.delta(201), RAMP_UP_STEP);
        assert_eq!(schedule.delta(400), RAMP_UP_STEP);
        assert_eq!(schedule.delta(401), 0.0);
        assert_eq!(schedule.delta(600), 0.0);
        assert_eq!(schedule.delta(601), -RAMP_DOWN_STEP);
        assert_eq!(schedule.delta(850), -RAMP_DOWN_STEP);
        assert_eq!(schedule.delta(851), 0.0);
    }

    #[test]
    fn test_full_ramp_cycle_totals() {
        let schedule = LuminositySchedule::new(LuminosityMode::RampUpRampDown);
        let mut luminosity = 0.8;
        for tick in 1..=400 {
            luminosity = schedule.advance(luminosity, tick);
        }
        assert!((luminosity - 1.8).abs() < 1e-9);
        for tick in 401..=850 {
            luminosity = schedule.advance(luminosity, tick);
        }
        assert!((luminosity - 1.175).abs() < 1e-9);
    }
}
