//! Gemeinsame Bausteine für regelbasierte Reflex-Agenten.
//!
//! Ein Schritt läuft immer gleich ab: der Aufrufer legt den neuen Messwert in
//! den [`HistoryBuffer`] und fragt danach die [`Policy`] nach einer
//! [`Decision`]. Die Policy selbst hält keinen Zustand; [`Agent`] bündelt
//! beides für den üblichen Fall.

pub mod error;
pub mod history;
pub mod rules;

pub use error::{CoreError, Result};
pub use history::HistoryBuffer;
pub use rules::{Fallback, Rule, RuleTable};

use serde::{Deserialize, Serialize};

/// Ergebnis eines Entscheidungsschritts.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Decision<A> {
    pub action: A,
    /// Name der Regel, die gefeuert hat.
    pub rule: String,
    /// Menschenlesbare Begründung.
    pub why: String,
    /// Geglätteter Messwert, den die Regel gesehen hat (falls sensorbasiert).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signal: Option<f64>,
}

pub trait Policy {
    type Percept;
    type Action;

    /// Der Messwert eines Percepts, der in den Verlauf übernommen wird.
    fn reading(&self, percept: &Self::Percept) -> f64;

    /// Bildet Percept und Verlauf auf genau eine Entscheidung ab.
    fn decide(&self, percept: &Self::Percept, history: &HistoryBuffer) -> Decision<Self::Action>;
}

/// Besitzt Policy und Verlauf und führt `push` + `decide` pro Schritt aus.
#[derive(Debug, Clone)]
pub struct Agent<P> {
    policy: P,
    history: HistoryBuffer,
}

impl<P: Policy> Agent<P> {
    /// # Errors
    /// [`CoreError::ZeroCapacity`], wenn `capacity == 0`.
    pub fn new(policy: P, capacity: usize) -> Result<Self> {
        Ok(Self {
            policy,
            history: HistoryBuffer::new(capacity)?,
        })
    }

    pub fn step(&mut self, percept: &P::Percept) -> Decision<P::Action> {
        self.history.push(self.policy.reading(percept));
        self.policy.decide(percept, &self.history)
    }

    #[must_use]
    pub fn history(&self) -> &HistoryBuffer {
        &self.history
    }

    #[must_use]
    pub fn policy(&self) -> &P {
        &self.policy
    }

    pub fn reset(&mut self) {
        self.history.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Schaltet ein, sobald das Mittel der letzten zwei Werte über 10 liegt.
    struct Threshold;

    impl Policy for Threshold {
        type Percept = f64;
        type Action = bool;

        fn reading(&self, percept: &f64) -> f64 {
            *percept
        }

        fn decide(&self, percept: &f64, history: &HistoryBuffer) -> Decision<bool> {
            let avg = history.mean_or(2, *percept);
            Decision {
                action: avg > 10.0,
                rule: "Threshold".into(),
                why: format!("avg={avg:.2}"),
                signal: Some(avg),
            }
        }
    }

    #[test]
    fn agent_pushes_before_deciding() {
        let mut agent = Agent::new(Threshold, 3).expect("capacity > 0");
        assert!(!agent.step(&4.0).action);
        let d = agent.step(&30.0);
        assert!(d.action);
        assert_eq!(d.why, "avg=17.00");
        assert_eq!(agent.history().snapshot(), vec![4.0, 30.0]);
    }

    #[test]
    fn agent_reset_clears_history() {
        let mut agent = Agent::new(Threshold, 3).expect("capacity > 0");
        agent.step(&1.0);
        agent.reset();
        assert!(agent.history().is_empty());
    }

    #[test]
    fn decision_serializes_without_empty_signal() {
        let d = Decision {
            action: "TurnOff".to_string(),
            rule: "Unoccupied".into(),
            why: "No occupant detected".into(),
            signal: None,
        };
        let json = serde_json::to_string(&d).expect("serializable");
        assert!(!json.contains("signal"));
        let back: Decision<String> = serde_json::from_str(&json).expect("deserializable");
        assert_eq!(back, d);
    }
}
