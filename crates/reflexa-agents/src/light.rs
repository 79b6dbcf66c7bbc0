//! Lichtsteuerung mit Glättung und fester Regelpriorität.
//!
//! Vorrang (erste passende Regel gewinnt):
//! manueller Eingriff > Anwesenheit > sehr hell > dunkel (Nacht/Tag) >
//! Nutzerpräferenz > `AmbientOK`.

use crate::config::LightConfig;
use crate::error::Result;
use crate::telemetry;
use reflexa_core::{
    Agent, CoreError, Decision, Fallback, HistoryBuffer, Policy, Rule, RuleTable,
};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ManualOverride {
    #[serde(rename = "ON", alias = "on", alias = "On")]
    On,
    #[serde(rename = "OFF", alias = "off", alias = "Off")]
    Off,
}

/// Nutzerprofil: Energiesparen oder Wunsch-Helligkeit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPreference")]
pub struct UserPreference {
    prefer_energy: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    preferred_lux: Option<f64>,
}

#[derive(Deserialize)]
struct RawPreference {
    #[serde(default = "default_true")]
    prefer_energy: bool,
    #[serde(default)]
    preferred_lux: Option<f64>,
}

fn default_true() -> bool {
    true
}

impl TryFrom<RawPreference> for UserPreference {
    type Error = CoreError;

    fn try_from(raw: RawPreference) -> std::result::Result<Self, CoreError> {
        if let Some(lux) = raw.preferred_lux {
            check_lux("preferred_lux", lux)?;
        }
        Ok(Self {
            prefer_energy: raw.prefer_energy,
            preferred_lux: raw.preferred_lux,
        })
    }
}

impl UserPreference {
    #[must_use]
    pub fn energy_saving() -> Self {
        Self {
            prefer_energy: true,
            preferred_lux: None,
        }
    }

    /// Komfortprofil mit Wunsch-Helligkeit.
    ///
    /// # Errors
    /// [`CoreError::InvalidPercept`] für nicht-endliche oder negative Werte.
    pub fn comfort(preferred_lux: f64) -> std::result::Result<Self, CoreError> {
        check_lux("preferred_lux", preferred_lux)?;
        Ok(Self {
            prefer_energy: false,
            preferred_lux: Some(preferred_lux),
        })
    }

    #[must_use]
    pub fn prefer_energy(&self) -> bool {
        self.prefer_energy
    }

    #[must_use]
    pub fn preferred_lux(&self) -> Option<f64> {
        self.preferred_lux
    }
}

/// Momentaufnahme eines Raums zu einer vollen Stunde.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawLightPercept")]
pub struct LightPercept {
    hour: u8,
    occupied: bool,
    lux: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    manual_override: Option<ManualOverride>,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_pref: Option<UserPreference>,
    blinds_closed: bool,
}

#[derive(Deserialize)]
struct RawLightPercept {
    #[serde(alias = "time_hour")]
    hour: u8,
    occupied: bool,
    lux: f64,
    #[serde(default)]
    manual_override: Option<ManualOverride>,
    #[serde(default)]
    user_pref: Option<UserPreference>,
    #[serde(default)]
    blinds_closed: bool,
}

impl TryFrom<RawLightPercept> for LightPercept {
    type Error = CoreError;

    fn try_from(raw: RawLightPercept) -> std::result::Result<Self, CoreError> {
        let mut percept = LightPercept::new(raw.hour, raw.occupied, raw.lux)?;
        percept.manual_override = raw.manual_override;
        percept.user_pref = raw.user_pref;
        percept.blinds_closed = raw.blinds_closed;
        Ok(percept)
    }
}

fn check_lux(field: &str, lux: f64) -> std::result::Result<(), CoreError> {
    if lux.is_finite() && lux >= 0.0 {
        Ok(())
    } else {
        Err(CoreError::InvalidPercept(format!(
            "{field} must be finite and >= 0, got {lux}"
        )))
    }
}

impl LightPercept {
    /// # Errors
    /// [`CoreError::InvalidPercept`] für `hour > 23` oder ungültige Lux-Werte.
    pub fn new(hour: u8, occupied: bool, lux: f64) -> std::result::Result<Self, CoreError> {
        if hour > 23 {
            return Err(CoreError::InvalidPercept(format!(
                "hour must be within 0..=23, got {hour}"
            )));
        }
        check_lux("lux", lux)?;
        Ok(Self {
            hour,
            occupied,
            lux,
            manual_override: None,
            user_pref: None,
            blinds_closed: false,
        })
    }

    #[must_use]
    pub fn with_override(mut self, manual: ManualOverride) -> Self {
        self.manual_override = Some(manual);
        self
    }

    #[must_use]
    pub fn with_preference(mut self, pref: UserPreference) -> Self {
        self.user_pref = Some(pref);
        self
    }

    #[must_use]
    pub fn with_blinds_closed(mut self) -> Self {
        self.blinds_closed = true;
        self
    }

    #[must_use]
    pub fn hour(&self) -> u8 {
        self.hour
    }

    #[must_use]
    pub fn occupied(&self) -> bool {
        self.occupied
    }

    #[must_use]
    pub fn lux(&self) -> f64 {
        self.lux
    }

    #[must_use]
    pub fn manual_override(&self) -> Option<ManualOverride> {
        self.manual_override
    }

    #[must_use]
    pub fn user_pref(&self) -> Option<UserPreference> {
        self.user_pref
    }

    #[must_use]
    pub fn blinds_closed(&self) -> bool {
        self.blinds_closed
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LightAction {
    #[serde(rename = "TurnOn_Full")]
    TurnOnFull,
    #[serde(rename = "TurnOn_Dim")]
    TurnOnDim,
    TurnOff,
    NoOp,
}

impl LightAction {
    #[must_use]
    pub fn is_on(self) -> bool {
        matches!(self, Self::TurnOnFull | Self::TurnOnDim)
    }
}

impl fmt::Display for LightAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::TurnOnFull => "TurnOn_Full",
            Self::TurnOnDim => "TurnOn_Dim",
            Self::TurnOff => "TurnOff",
            Self::NoOp => "NoOp",
        })
    }
}

/// Auswertungskontext einer Lichtentscheidung.
#[derive(Debug, Clone, Copy)]
pub struct LightContext {
    pub percept: LightPercept,
    /// Geglätteter Lux-Wert.
    pub avg: f64,
    pub config: LightConfig,
}

impl LightContext {
    fn prefers_energy(&self) -> bool {
        self.percept
            .user_pref
            .map_or(self.config.prefer_energy_default, |p| p.prefer_energy)
    }

    fn target(&self) -> Option<f64> {
        self.percept.user_pref.and_then(|p| p.preferred_lux)
    }

    /// Abstand Wunsch-Lux zu Ist-Wert, sofern er die Marge übersteigt.
    fn boost_gap(&self) -> Option<f64> {
        self.target()
            .filter(|t| *t > self.avg + self.config.boost_margin)
            .map(|t| t - self.avg)
    }

    fn is_dark(&self) -> bool {
        self.avg < self.config.on_threshold
    }
}

fn light_rules() -> RuleTable<LightContext, LightAction> {
    RuleTable::new(
        vec![
            Rule {
                name: "ManualOverride",
                when: |c: &LightContext| c.percept.manual_override == Some(ManualOverride::On),
                action: LightAction::TurnOnFull,
                explain: |_: &LightContext| "User requested ON".into(),
            },
            Rule {
                name: "ManualOverride",
                when: |c: &LightContext| c.percept.manual_override == Some(ManualOverride::Off),
                action: LightAction::TurnOff,
                explain: |_: &LightContext| "User requested OFF".into(),
            },
            Rule {
                name: "Unoccupied",
                when: |c: &LightContext| !c.percept.occupied,
                action: LightAction::TurnOff,
                explain: |_: &LightContext| "No occupant detected".into(),
            },
            Rule {
                name: "VeryBrightAmbient",
                when: |c: &LightContext| c.avg >= c.config.very_bright && !c.percept.blinds_closed,
                action: LightAction::TurnOff,
                explain: |c: &LightContext| format!("AvgLux={:.2} >= {}", c.avg, c.config.very_bright),
            },
            Rule {
                name: "DarkAtNight",
                when: |c: &LightContext| c.is_dark() && c.config.is_night(c.percept.hour),
                action: LightAction::TurnOnDim,
                explain: |c: &LightContext| {
                    format!(
                        "AvgLux={:.2} < {} and night ({:02}:00)",
                        c.avg, c.config.on_threshold, c.percept.hour
                    )
                },
            },
            Rule {
                name: "DarkDaytime",
                when: LightContext::is_dark,
                action: LightAction::TurnOnFull,
                explain: |c: &LightContext| format!("AvgLux={:.2} < {}", c.avg, c.config.on_threshold),
            },
            Rule {
                name: "AmbientSufficient_EnergyPref",
                when: LightContext::prefers_energy,
                action: LightAction::TurnOff,
                explain: |c: &LightContext| format!("AvgLux={:.2} (user prefers energy)", c.avg),
            },
            Rule {
                name: "UserPrefBoost_Full",
                when: |c: &LightContext| c.boost_gap().is_some_and(|gap| gap > c.config.boost_full_gap),
                action: LightAction::TurnOnFull,
                explain: boost_explanation,
            },
            Rule {
                name: "UserPrefBoost_Dim",
                when: |c: &LightContext| c.boost_gap().is_some(),
                action: LightAction::TurnOnDim,
                explain: boost_explanation,
            },
        ],
        Fallback {
            name: "AmbientOK",
            action: LightAction::NoOp,
            explain: |c: &LightContext| format!("AvgLux={:.2} OK", c.avg),
        },
    )
}

fn boost_explanation(c: &LightContext) -> String {
    format!(
        "Increase to {} lux (AvgLux={:.2})",
        c.target().unwrap_or_default(),
        c.avg
    )
}

/// Regelbasierte Lichtsteuerung.
#[derive(Debug)]
pub struct SmartLight {
    config: LightConfig,
    rules: RuleTable<LightContext, LightAction>,
}

impl Default for SmartLight {
    fn default() -> Self {
        Self {
            config: LightConfig::default(),
            rules: light_rules(),
        }
    }
}

impl SmartLight {
    /// # Errors
    /// [`AgentError::InvalidConfig`](crate::AgentError::InvalidConfig), wenn die
    /// Konfiguration nicht validiert.
    pub fn new(config: LightConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            rules: light_rules(),
        })
    }

    #[must_use]
    pub fn config(&self) -> &LightConfig {
        &self.config
    }

    /// Regelnamen in Vorrangreihenfolge.
    #[must_use]
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.names()
    }

    /// Verpackt die Engine mit einem Verlauf der Kapazität `capacity`.
    ///
    /// # Errors
    /// [`CoreError::ZeroCapacity`] für `capacity == 0`.
    pub fn into_agent(self, capacity: usize) -> Result<Agent<Self>> {
        if capacity < self.config.window_size {
            telemetry::warn(&format!(
                "history capacity {capacity} is smaller than smoothing window {}",
                self.config.window_size
            ));
        }
        Ok(Agent::new(self, capacity)?)
    }
}

impl Policy for SmartLight {
    type Percept = LightPercept;
    type Action = LightAction;

    fn reading(&self, percept: &LightPercept) -> f64 {
        percept.lux
    }

    fn decide(&self, percept: &LightPercept, history: &HistoryBuffer) -> Decision<LightAction> {
        let ctx = LightContext {
            percept: *percept,
            avg: history.mean_or(self.config.window_size, percept.lux),
            config: self.config,
        };
        let decision = self.rules.evaluate(&ctx, Some(ctx.avg));
        telemetry::decision("smart_light", &decision);
        decision
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn percept(hour: u8, occupied: bool, lux: f64) -> LightPercept {
        LightPercept::new(hour, occupied, lux).expect("valid percept")
    }

    fn history(values: &[f64]) -> HistoryBuffer {
        let mut buffer = HistoryBuffer::new(5).expect("capacity > 0");
        for v in values {
            buffer.push(*v);
        }
        buffer
    }

    fn decide(p: &LightPercept, values: &[f64]) -> Decision<LightAction> {
        SmartLight::default().decide(p, &history(values))
    }

    #[test]
    fn manual_override_beats_everything() {
        let p = percept(3, false, 5000.0).with_override(ManualOverride::On);
        let d = decide(&p, &[5000.0]);
        assert_eq!(d.action, LightAction::TurnOnFull);
        assert_eq!(d.rule, "ManualOverride");

        let p = percept(21, true, 10.0).with_override(ManualOverride::Off);
        let d = decide(&p, &[10.0]);
        assert_eq!(d.action, LightAction::TurnOff);
        assert_eq!(d.rule, "ManualOverride");
    }

    #[test]
    fn unoccupied_turns_off_regardless_of_lux() {
        let d = decide(&percept(22, false, 10.0), &[10.0]);
        assert_eq!(d.action, LightAction::TurnOff);
        assert_eq!(d.rule, "Unoccupied");
    }

    #[test]
    fn very_bright_turns_off_unless_blinds_closed() {
        let d = decide(&percept(12, true, 1500.0), &[1500.0]);
        assert_eq!(d.rule, "VeryBrightAmbient");
        assert_eq!(d.action, LightAction::TurnOff);

        // Ceiling itself counts as very bright.
        let d = decide(&percept(12, true, 1000.0), &[1000.0]);
        assert_eq!(d.rule, "VeryBrightAmbient");

        let d = decide(&percept(12, true, 1500.0).with_blinds_closed(), &[1500.0]);
        assert_eq!(d.rule, "AmbientSufficient_EnergyPref");
    }

    #[test]
    fn dark_rooms_dim_at_night_and_go_full_by_day() {
        let d = decide(&percept(23, true, 100.0), &[100.0]);
        assert_eq!((d.action, d.rule.as_str()), (LightAction::TurnOnDim, "DarkAtNight"));

        let d = decide(&percept(14, true, 100.0), &[100.0]);
        assert_eq!((d.action, d.rule.as_str()), (LightAction::TurnOnFull, "DarkDaytime"));
    }

    #[test]
    fn decision_uses_smoothed_value_not_last_reading() {
        let d = decide(&percept(16, true, 70.0), &[50.0, 80.0, 70.0]);
        assert_eq!(d.rule, "DarkDaytime");
        assert!(d.why.contains("66.67"), "why was {}", d.why);
        let signal = d.signal.expect("smoothed signal");
        assert!((signal - 66.666_666).abs() < 1e-3);
    }

    #[test]
    fn smoothing_can_keep_the_light_on_after_a_bright_reading() {
        // Last reading alone would be bright enough, the window is not.
        let d = decide(&percept(15, true, 200.0), &[100.0, 90.0, 200.0]);
        assert_eq!(d.rule, "DarkDaytime");
    }

    #[test]
    fn empty_history_falls_back_to_current_reading() {
        let p = percept(14, true, 400.0);
        let d = SmartLight::default().decide(&p, &history(&[]));
        assert_eq!(d.rule, "AmbientSufficient_EnergyPref");
        assert_eq!(d.signal, Some(400.0));
    }

    #[test]
    fn comfort_preference_boosts_by_gap() {
        let pref = UserPreference::comfort(400.0).expect("valid");
        let p = percept(15, true, 180.0).with_preference(pref);
        let d = decide(&p, &[180.0]);
        assert_eq!((d.action, d.rule.as_str()), (LightAction::TurnOnFull, "UserPrefBoost_Full"));
        assert!(d.why.contains("400"));

        let pref = UserPreference::comfort(300.0).expect("valid");
        let d = decide(&percept(15, true, 200.0).with_preference(pref), &[200.0]);
        assert_eq!((d.action, d.rule.as_str()), (LightAction::TurnOnDim, "UserPrefBoost_Dim"));
    }

    #[test]
    fn comfort_preference_within_margin_is_ok() {
        let pref = UserPreference::comfort(215.0).expect("valid");
        let d = decide(&percept(15, true, 200.0).with_preference(pref), &[200.0]);
        assert_eq!((d.action, d.rule.as_str()), (LightAction::NoOp, "AmbientOK"));
    }

    #[test]
    fn default_preference_can_be_configured() {
        let light = SmartLight::new(LightConfig {
            prefer_energy_default: false,
            ..LightConfig::default()
        })
        .expect("valid config");
        let d = light.decide(&percept(15, true, 300.0), &history(&[300.0]));
        assert_eq!(d.rule, "AmbientOK");
    }

    #[test]
    fn invalid_percepts_are_rejected_at_the_boundary() {
        assert!(LightPercept::new(24, true, 10.0).is_err());
        assert!(LightPercept::new(10, true, f64::NAN).is_err());
        assert!(LightPercept::new(10, true, -1.0).is_err());
        assert!(UserPreference::comfort(f64::INFINITY).is_err());
        let bad = serde_json::from_str::<LightPercept>(r#"{"hour":30,"occupied":true,"lux":1}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn percept_accepts_time_hour_alias() {
        let p: LightPercept = serde_json::from_str(
            r#"{"time_hour":15,"occupied":true,"lux":180,
                "manual_override":"ON","user_pref":{"prefer_energy":false,"preferred_lux":400}}"#,
        )
        .expect("valid percept");
        assert_eq!(p.hour(), 15);
        assert_eq!(p.manual_override(), Some(ManualOverride::On));
        assert_eq!(p.user_pref().and_then(|u| u.preferred_lux()), Some(400.0));
        assert!(!p.blinds_closed());
    }

    #[test]
    fn preference_without_flag_prefers_energy() {
        let pref: UserPreference =
            serde_json::from_str(r#"{"preferred_lux": 900}"#).expect("valid");
        assert!(pref.prefer_energy());
    }

    #[test]
    fn every_percept_maps_to_exactly_one_known_rule() {
        let light = SmartLight::default();
        let names = light.rule_names();
        for hour in [0u8, 5, 6, 12, 19, 20, 23] {
            for occupied in [true, false] {
                for lux in [0.0, 149.0, 150.0, 500.0, 999.0, 1000.0, 5000.0] {
                    let d = light.decide(&percept(hour, occupied, lux), &history(&[lux]));
                    assert!(names.contains(&d.rule.as_str()));
                }
            }
        }
    }

    #[test]
    fn into_agent_drives_push_then_decide() {
        let mut agent = SmartLight::default().into_agent(5).expect("capacity > 0");
        agent.step(&percept(16, true, 50.0));
        agent.step(&percept(14, true, 80.0));
        let d = agent.step(&percept(10, true, 70.0));
        assert!(d.why.contains("66.67"));
        assert_eq!(agent.history().len(), 3);
    }
}
