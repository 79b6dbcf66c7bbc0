//! Vorgefertigte und zufällig erzeugte Percept-Folgen.
//!
//! Die festen Szenarien entsprechen den klassischen Demo-Abläufen; der
//! [`ScenarioGenerator`] erzeugt reproduzierbare Folgen aus einem Seed.

use crate::light::{LightPercept, ManualOverride, UserPreference};
use crate::thermostat::Temperature;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use reflexa_core::Result;

/// Neun Einzelsituationen, die jede Lichtregel mindestens einmal zeigen.
///
/// # Errors
/// Nur bei ungültigen Konstanten, praktisch nie.
pub fn light_demo() -> Result<Vec<LightPercept>> {
    Ok(vec![
        LightPercept::new(16, true, 50.0)?,
        LightPercept::new(14, true, 80.0)?,
        LightPercept::new(10, false, 70.0)?,
        LightPercept::new(9, true, 1500.0)?,
        LightPercept::new(5, true, 200.0)?,
        LightPercept::new(15, true, 180.0)?.with_preference(UserPreference::comfort(400.0)?),
        LightPercept::new(21, true, 450.0)?.with_blinds_closed(),
        LightPercept::new(14, true, 380.0)?.with_override(ManualOverride::On),
        LightPercept::new(18, true, 350.0)?.with_override(ManualOverride::Off),
    ])
}

/// Ein Abend von 18:00 bis 05:00 mit langsam sinkender Helligkeit.
///
/// # Errors
/// Nur bei ungültigen Konstanten, praktisch nie.
pub fn light_evening() -> Result<Vec<LightPercept>> {
    [
        (18, 400.0),
        (19, 360.0),
        (20, 220.0),
        (21, 190.0),
        (22, 160.0),
        (23, 140.0),
        (0, 120.0),
        (1, 110.0),
        (2, 105.0),
        (3, 100.0),
        (4, 95.0),
        (5, 90.0),
    ]
    .into_iter()
    .map(|(hour, lux)| LightPercept::new(hour, true, lux))
    .collect()
}

/// Temperaturverlauf: Erwärmung über 24 °C und anschließendes Abkühlen.
///
/// # Errors
/// Nur bei ungültigen Konstanten, praktisch nie.
pub fn thermostat_demo() -> Result<Vec<Temperature>> {
    [
        21.5, 21.8, 22.0, 22.5, 23.0, 23.5, 24.5, 25.0, 24.0, 23.5, 23.0, 22.0, 21.0, 20.5, 19.5,
    ]
    .into_iter()
    .map(Temperature::new)
    .collect()
}

/// Erzeugt plausible Zufallsfolgen, reproduzierbar über den Seed.
#[derive(Debug, Clone)]
pub struct ScenarioGenerator {
    rng: StdRng,
}

impl ScenarioGenerator {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// `steps` aufeinanderfolgende Stunden ab einer zufälligen Startstunde.
    ///
    /// Tagsüber ist es heller als nachts; gelegentlich greift jemand manuell
    /// ein, schließt die Jalousien oder verlässt den Raum.
    ///
    /// # Errors
    /// Nur bei ungültigen Zwischenwerten, praktisch nie.
    pub fn light_percepts(&mut self, steps: usize) -> Result<Vec<LightPercept>> {
        let mut hour: u8 = self.rng.gen_range(0..24);
        let mut out = Vec::with_capacity(steps);
        for _ in 0..steps {
            let base: f64 = if (7..19).contains(&hour) { 600.0 } else { 60.0 };
            let lux: f64 = (base * self.rng.gen_range(0.2..2.2)).max(0.0);
            let mut percept = LightPercept::new(hour, self.rng.gen_bool(0.85), lux)?;
            if self.rng.gen_bool(0.05) {
                let manual = if self.rng.gen_bool(0.5) {
                    ManualOverride::On
                } else {
                    ManualOverride::Off
                };
                percept = percept.with_override(manual);
            }
            if self.rng.gen_bool(0.1) {
                percept = percept.with_blinds_closed();
            }
            if self.rng.gen_bool(0.2) {
                percept = percept.with_preference(UserPreference::comfort(
                    self.rng.gen_range(200.0..700.0),
                )?);
            }
            out.push(percept);
            hour = (hour + 1) % 24;
        }
        Ok(out)
    }

    /// Zufallsweg ab `start` °C mit Schritten von höchstens ±0.8 °C.
    ///
    /// # Errors
    /// [`CoreError::InvalidPercept`](reflexa_core::CoreError::InvalidPercept),
    /// wenn `start` nicht endlich ist.
    pub fn temperatures(&mut self, steps: usize, start: f64) -> Result<Vec<Temperature>> {
        let mut current = Temperature::new(start)?.celsius();
        let mut out = Vec::with_capacity(steps);
        for _ in 0..steps {
            out.push(Temperature::new(current)?);
            current += self.rng.gen_range(-0.8..=0.8);
            current = (current * 10.0).round() / 10.0;
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_scenarios_have_expected_lengths() {
        assert_eq!(light_demo().expect("valid").len(), 9);
        assert_eq!(light_evening().expect("valid").len(), 12);
        assert_eq!(thermostat_demo().expect("valid").len(), 15);
    }

    #[test]
    fn same_seed_gives_same_sequence() {
        let a = ScenarioGenerator::new(7).light_percepts(20).expect("valid");
        let b = ScenarioGenerator::new(7).light_percepts(20).expect("valid");
        assert_eq!(a, b);
        let t1 = ScenarioGenerator::new(3).temperatures(10, 21.0).expect("valid");
        let t2 = ScenarioGenerator::new(3).temperatures(10, 21.0).expect("valid");
        assert_eq!(t1, t2);
    }

    #[test]
    fn generated_hours_advance_and_wrap() {
        let percepts = ScenarioGenerator::new(11).light_percepts(30).expect("valid");
        for pair in percepts.windows(2) {
            assert_eq!((pair[0].hour() + 1) % 24, pair[1].hour());
        }
        assert!(percepts.iter().all(|p| p.lux() >= 0.0));
    }

    #[test]
    fn generated_lux_follows_day_and_night_bands() {
        let percepts = ScenarioGenerator::new(5).light_percepts(48).expect("valid");
        for p in &percepts {
            let (low, high) = if (7..19).contains(&p.hour()) {
                (120.0, 1320.0)
            } else {
                (12.0, 132.0)
            };
            assert!(
                (low..=high).contains(&p.lux()),
                "hour {} lux {}",
                p.hour(),
                p.lux()
            );
        }
    }

    #[test]
    fn temperature_walk_starts_at_start() {
        let temps = ScenarioGenerator::new(1).temperatures(5, 22.0).expect("valid");
        assert_eq!(temps.len(), 5);
        assert!((temps[0].celsius() - 22.0).abs() < f64::EPSILON);
        assert!(ScenarioGenerator::new(1).temperatures(3, f64::NAN).is_err());
    }
}
