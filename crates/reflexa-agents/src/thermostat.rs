//! Trendbewusste Temperaturregelung.
//!
//! Der Thermostat mittelt über die gespeicherten Messwerte und vergleicht den
//! neuesten mit dem ältesten Wert. Steigt oder fällt die Temperatur deutlich,
//! wird vorbeugend gekühlt bzw. geheizt; greift die Schutzbedingung nicht,
//! bleibt das System aus, auch wenn die reine Bandregel etwas anderes sagen
//! würde.

use crate::config::ThermostatConfig;
use crate::error::Result;
use crate::telemetry;
use reflexa_core::{
    Agent, CoreError, Decision, Fallback, HistoryBuffer, Policy, Rule, RuleTable,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Temperaturmessung in °C, garantiert endlich.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Temperature(f64);

impl Temperature {
    /// # Errors
    /// [`CoreError::InvalidPercept`] für `NaN` oder unendliche Werte.
    pub fn new(celsius: f64) -> std::result::Result<Self, CoreError> {
        if celsius.is_finite() {
            Ok(Self(celsius))
        } else {
            Err(CoreError::InvalidPercept(format!(
                "temperature must be finite, got {celsius}"
            )))
        }
    }

    #[must_use]
    pub fn celsius(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for Temperature {
    type Error = CoreError;

    fn try_from(value: f64) -> std::result::Result<Self, CoreError> {
        Self::new(value)
    }
}

impl From<Temperature> for f64 {
    fn from(t: Temperature) -> f64 {
        t.0
    }
}

impl std::str::FromStr for Temperature {
    type Err = CoreError;

    fn from_str(s: &str) -> std::result::Result<Self, CoreError> {
        let value: f64 = s
            .trim()
            .parse()
            .map_err(|_| CoreError::InvalidPercept(format!("not a number: {s:?}")))?;
        Self::new(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ThermoAction {
    Heat,
    Cool,
    Off,
}

impl fmt::Display for ThermoAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Heat => "Heat",
            Self::Cool => "Cool",
            Self::Off => "Off",
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ThermoContext {
    pub samples: usize,
    pub mean: f64,
    pub trend: f64,
    pub config: ThermostatConfig,
}

impl ThermoContext {
    fn rising(&self) -> bool {
        self.trend > self.config.trend_threshold
    }

    fn falling(&self) -> bool {
        self.trend < -self.config.trend_threshold
    }
}

fn thermostat_rules() -> RuleTable<ThermoContext, ThermoAction> {
    RuleTable::new(
        vec![
            Rule {
                name: "NoHistory",
                when: |c: &ThermoContext| c.samples == 0,
                action: ThermoAction::Off,
                explain: |_: &ThermoContext| "No readings yet".into(),
            },
            Rule {
                name: "PreventiveCool",
                when: |c: &ThermoContext| c.rising() && c.mean > c.config.low_bound,
                action: ThermoAction::Cool,
                explain: |c: &ThermoContext| {
                    format!(
                        "Trend={:+.2} rising, Avg={:.2} > {}",
                        c.trend, c.mean, c.config.low_bound
                    )
                },
            },
            Rule {
                name: "RisingSuppressed",
                when: ThermoContext::rising,
                action: ThermoAction::Off,
                explain: |c: &ThermoContext| {
                    format!(
                        "Trend={:+.2} rising, Avg={:.2} <= {}",
                        c.trend, c.mean, c.config.low_bound
                    )
                },
            },
            Rule {
                name: "PreventiveHeat",
                when: |c: &ThermoContext| c.falling() && c.mean < c.config.high_bound,
                action: ThermoAction::Heat,
                explain: |c: &ThermoContext| {
                    format!(
                        "Trend={:+.2} falling, Avg={:.2} < {}",
                        c.trend, c.mean, c.config.high_bound
                    )
                },
            },
            Rule {
                name: "FallingSuppressed",
                when: ThermoContext::falling,
                action: ThermoAction::Off,
                explain: |c: &ThermoContext| {
                    format!(
                        "Trend={:+.2} falling, Avg={:.2} >= {}",
                        c.trend, c.mean, c.config.high_bound
                    )
                },
            },
            Rule {
                name: "BelowRange",
                when: |c: &ThermoContext| c.mean < c.config.low_bound,
                action: ThermoAction::Heat,
                explain: |c: &ThermoContext| format!("Avg={:.2} < {}", c.mean, c.config.low_bound),
            },
            Rule {
                name: "AboveRange",
                when: |c: &ThermoContext| c.mean > c.config.high_bound,
                action: ThermoAction::Cool,
                explain: |c: &ThermoContext| format!("Avg={:.2} > {}", c.mean, c.config.high_bound),
            },
        ],
        Fallback {
            name: "InRange",
            action: ThermoAction::Off,
            explain: |c: &ThermoContext| {
                format!(
                    "Avg={:.2} within [{}, {}]",
                    c.mean, c.config.low_bound, c.config.high_bound
                )
            },
        },
    )
}

#[derive(Debug)]
pub struct Thermostat {
    config: ThermostatConfig,
    rules: RuleTable<ThermoContext, ThermoAction>,
}

impl Default for Thermostat {
    fn default() -> Self {
        Self {
            config: ThermostatConfig::default(),
            rules: thermostat_rules(),
        }
    }
}

impl Thermostat {
    /// # Errors
    /// [`AgentError::InvalidConfig`](crate::AgentError::InvalidConfig), wenn die
    /// Konfiguration nicht validiert.
    pub fn new(config: ThermostatConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            rules: thermostat_rules(),
        })
    }

    #[must_use]
    pub fn config(&self) -> &ThermostatConfig {
        &self.config
    }

    #[must_use]
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.names()
    }

    /// Entscheidung allein aus dem Verlauf.
    #[must_use]
    pub fn decide_history(&self, history: &HistoryBuffer) -> Decision<ThermoAction> {
        let mean = history.mean(self.config.window_size).ok();
        let ctx = ThermoContext {
            samples: history.len(),
            mean: mean.unwrap_or_default(),
            trend: history.trend(),
            config: self.config,
        };
        let decision = self.rules.evaluate(&ctx, mean);
        telemetry::decision("thermostat", &decision);
        decision
    }

    /// Verpackt die Engine mit einem Verlauf, dessen Kapazität dem Fenster entspricht.
    ///
    /// # Errors
    /// Nur theoretisch: `window_size` ist nach der Validierung immer `>= 1`.
    pub fn into_agent(self) -> Result<Agent<Self>> {
        let capacity = self.config.window_size;
        Ok(Agent::new(self, capacity)?)
    }
}

impl Policy for Thermostat {
    type Percept = Temperature;
    type Action = ThermoAction;

    fn reading(&self, percept: &Temperature) -> f64 {
        percept.celsius()
    }

    fn decide(&self, _percept: &Temperature, history: &HistoryBuffer) -> Decision<ThermoAction> {
        self.decide_history(history)
    }
}
