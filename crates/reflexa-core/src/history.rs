//! Kurzzeitgedächtnis eines Agenten: ein Ringpuffer fester Kapazität.
//!
//! Der [`HistoryBuffer`] hält die letzten `N` Messwerte (z. B. Lux oder °C).
//! Beim Überlauf wird der älteste Wert verworfen (FIFO). Entscheidungslogik
//! bekommt den Puffer nur als `&HistoryBuffer` zu sehen und kann ihn daher
//! ausschließlich lesen: [`mean`](HistoryBuffer::mean),
//! [`trend`](HistoryBuffer::trend) und [`snapshot`](HistoryBuffer::snapshot).

use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Ringpuffer der zuletzt gesehenen Messwerte, ältester Wert zuerst.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawHistory")]
pub struct HistoryBuffer {
    capacity: usize,
    readings: VecDeque<f64>,
}

#[derive(Deserialize)]
struct RawHistory {
    capacity: usize,
    #[serde(default)]
    readings: Vec<f64>,
}

impl TryFrom<RawHistory> for HistoryBuffer {
    type Error = CoreError;

    fn try_from(raw: RawHistory) -> Result<Self> {
        let mut buffer = HistoryBuffer::new(raw.capacity)?;
        for value in raw.readings {
            buffer.push(value);
        }
        Ok(buffer)
    }
}

impl HistoryBuffer {
    /// Legt einen leeren Puffer mit `capacity` Plätzen an.
    ///
    /// # Errors
    /// [`CoreError::ZeroCapacity`], wenn `capacity == 0`.
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(CoreError::ZeroCapacity);
        }
        Ok(Self {
            capacity,
            readings: VecDeque::with_capacity(capacity),
        })
    }

    /// Hängt `value` an und verdrängt bei Überlauf den ältesten Wert.
    pub fn push(&mut self, value: f64) {
        if self.readings.len() == self.capacity {
            self.readings.pop_front();
        }
        self.readings.push_back(value);
    }

    pub fn clear(&mut self) {
        self.readings.clear();
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.readings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// Der zuletzt eingefügte Wert.
    #[must_use]
    pub fn latest(&self) -> Option<f64> {
        self.readings.back().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.readings.iter().copied()
    }

    /// Kopie des Inhalts, ältester Wert zuerst.
    #[must_use]
    pub fn snapshot(&self) -> Vec<f64> {
        self.readings.iter().copied().collect()
    }

    /// Arithmetisches Mittel der letzten `window` Werte.
    ///
    /// Sind weniger als `window` Werte vorhanden, wird über alle gemittelt;
    /// `window == 0` zählt wie `1`.
    ///
    /// # Errors
    /// [`CoreError::EmptyInput`], wenn der Puffer leer ist.
    pub fn mean(&self, window: usize) -> Result<f64> {
        if self.readings.is_empty() {
            return Err(CoreError::EmptyInput);
        }
        let take = window.max(1).min(self.readings.len());
        let skip = self.readings.len() - take;
        let sum: f64 = self.readings.iter().skip(skip).sum();
        #[allow(clippy::cast_precision_loss)]
        let count = take as f64;
        Ok(sum / count)
    }

    /// Wie [`mean`](Self::mean), liefert bei leerem Puffer aber `fallback`.
    #[must_use]
    pub fn mean_or(&self, window: usize, fallback: f64) -> f64 {
        self.mean(window).unwrap_or(fallback)
    }

    /// `neuester - ältester` Wert; `0.0` bei weniger als zwei Werten.
    #[must_use]
    pub fn trend(&self) -> f64 {
        match (self.readings.front(), self.readings.back()) {
            (Some(first), Some(last)) if self.readings.len() >= 2 => last - first,
            _ => 0.0,
        }
    }
}
