//! Konkrete Reflex-Agenten auf Basis von [`reflexa_core`].
//!
//! - [`SmartLight`]: Schwellwerte, Glättung und Nutzerpräferenzen.
//! - [`Thermostat`]: Glättung plus Trend, mit vorbeugendem Heizen/Kühlen.
//! - [`ReflexVacuum`]: gedächtnisloser Agent für die Staubsauger-Welt.
//!
//! Alle Agenten werten eine feste, geordnete [`RuleTable`](reflexa_core::RuleTable)
//! aus; die erste passende Regel gewinnt.

pub mod config;
pub mod error;
pub mod light;
pub mod scenario;
mod telemetry;
pub mod thermostat;
pub mod vacuum;

pub use config::{LightConfig, ThermostatConfig};
pub use error::{AgentError, Result};
pub use light::{LightAction, LightPercept, ManualOverride, SmartLight, UserPreference};
pub use scenario::ScenarioGenerator;
pub use thermostat::{Temperature, ThermoAction, Thermostat};
pub use vacuum::{ReflexVacuum, VacuumAction, VacuumWorld};
