//! Unveränderliche Tuning-Parameter der Agenten.
//!
//! Beide Strukturen lassen sich teilweise aus JSON laden; fehlende Schlüssel
//! behalten ihren Default. Die Engines prüfen die Werte beim Konstruieren
//! über `validate()`.

use crate::error::{AgentError, Result};
use serde::{Deserialize, Serialize};

/// Schwellwerte der Lichtsteuerung (Lux, Stunden).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightConfig {
    /// Unterhalb dieses geglätteten Werts ist es dunkel.
    pub on_threshold: f64,
    /// Ab diesem Wert ist genug Tageslicht da, um auszuschalten.
    pub very_bright: f64,
    pub night_start: u8,
    pub night_end: u8,
    /// Anzahl der Werte für den gleitenden Mittelwert.
    pub window_size: usize,
    /// Mindestabstand zwischen Wunsch-Lux und Ist-Wert für einen Boost.
    pub boost_margin: f64,
    /// Ab diesem Abstand wird voll statt gedimmt eingeschaltet.
    pub boost_full_gap: f64,
    /// Energiesparen, wenn kein Nutzerprofil vorliegt.
    pub prefer_energy_default: bool,
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            on_threshold: 150.0,
            very_bright: 1000.0,
            night_start: 20,
            night_end: 6,
            window_size: 3,
            boost_margin: 20.0,
            boost_full_gap: 150.0,
            prefer_energy_default: true,
        }
    }
}

impl LightConfig {
    /// # Errors
    /// [`AgentError::Config`] bei ungültigem JSON, sonst wie [`validate`](Self::validate).
    pub fn from_json(raw: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    /// [`AgentError::InvalidConfig`] bei nicht-endlichen oder widersprüchlichen Werten.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("on_threshold", self.on_threshold),
            ("very_bright", self.very_bright),
            ("boost_margin", self.boost_margin),
            ("boost_full_gap", self.boost_full_gap),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(invalid(format!("{name} must be finite and >= 0, got {value}")));
            }
        }
        if self.on_threshold >= self.very_bright {
            return Err(invalid(format!(
                "on_threshold ({}) must be below very_bright ({})",
                self.on_threshold, self.very_bright
            )));
        }
        if self.night_start > 23 || self.night_end > 23 {
            return Err(invalid(format!(
                "night hours must be within 0..=23, got {}..{}",
                self.night_start, self.night_end
            )));
        }
        if self.window_size == 0 {
            return Err(invalid("window_size must be at least 1".into()));
        }
        Ok(())
    }

    /// `[night_start, night_end)`, über Mitternacht hinweg, falls `start > end`.
    #[must_use]
    pub fn is_night(&self, hour: u8) -> bool {
        if self.night_start <= self.night_end {
            hour >= self.night_start && hour < self.night_end
        } else {
            hour >= self.night_start || hour < self.night_end
        }
    }
}

/// Grenzen der Temperaturregelung (°C).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThermostatConfig {
    pub low_bound: f64,
    pub high_bound: f64,
    /// Betrag, ab dem `neuester - ältester` Wert als Trend gilt.
    pub trend_threshold: f64,
    pub window_size: usize,
}

impl Default for ThermostatConfig {
    fn default() -> Self {
        Self {
            low_bound: 20.0,
            high_bound: 24.0,
            trend_threshold: 0.5,
            window_size: 5,
        }
    }
}

impl ThermostatConfig {
    /// # Errors
    /// [`AgentError::Config`] bei ungültigem JSON, sonst wie [`validate`](Self::validate).
    pub fn from_json(raw: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    /// [`AgentError::InvalidConfig`] bei nicht-endlichen oder vertauschten Grenzen.
    pub fn validate(&self) -> Result<()> {
        if !self.low_bound.is_finite() || !self.high_bound.is_finite() {
            return Err(invalid("bounds must be finite".into()));
        }
        if self.low_bound >= self.high_bound {
            return Err(invalid(format!(
                "low_bound ({}) must be below high_bound ({})",
                self.low_bound, self.high_bound
            )));
        }
        if !self.trend_threshold.is_finite() || self.trend_threshold < 0.0 {
            return Err(invalid(format!(
                "trend_threshold must be finite and >= 0, got {}",
                self.trend_threshold
            )));
        }
        if self.window_size == 0 {
            return Err(invalid("window_size must be at least 1".into()));
        }
        Ok(())
    }
}

fn invalid(msg: String) -> AgentError {
    AgentError::InvalidConfig(msg)
}
