//! Regressionstests für die festen Demo-Szenarien.
//!
//! Erwartung: jede Folge liefert Schritt für Schritt dieselben Regeln wie die
//! klassischen Demo-Abläufe.

use reflexa_agents::scenario::{light_demo, light_evening, thermostat_demo};
use reflexa_agents::{LightAction, SmartLight, ThermoAction, Thermostat};

#[test]
fn light_demo_fires_the_expected_rules() {
    let mut agent = SmartLight::default().into_agent(5).expect("capacity > 0");
    let rules: Vec<String> = light_demo()
        .expect("valid scenario")
        .iter()
        .map(|p| agent.step(p).rule)
        .collect();

    assert_eq!(
        rules,
        vec![
            "DarkDaytime",
            "DarkDaytime",
            "Unoccupied",
            "AmbientSufficient_EnergyPref",
            "AmbientSufficient_EnergyPref",
            "AmbientOK",
            "AmbientSufficient_EnergyPref",
            "ManualOverride",
            "ManualOverride",
        ]
    );
}

#[test]
fn evening_timeline_dims_once_the_smoothed_value_gets_dark() {
    let mut agent = SmartLight::default().into_agent(5).expect("capacity > 0");
    let actions: Vec<LightAction> = light_evening()
        .expect("valid scenario")
        .iter()
        .map(|p| agent.step(p).action)
        .collect();

    assert!(actions[..6].iter().all(|a| *a == LightAction::TurnOff));
    assert!(actions[6..].iter().all(|a| *a == LightAction::TurnOnDim));
}

#[test]
fn thermostat_demo_matches_trend_policy() {
    let mut agent = Thermostat::default().into_agent().expect("window >= 1");
    let steps: Vec<(ThermoAction, String)> = thermostat_demo()
        .expect("valid scenario")
        .iter()
        .map(|t| {
            let d = agent.step(t);
            (d.action, d.rule)
        })
        .collect();

    let expected = [
        (ThermoAction::Off, "InRange"),
        (ThermoAction::Off, "InRange"),
        (ThermoAction::Off, "InRange"),
        (ThermoAction::Cool, "PreventiveCool"),
        (ThermoAction::Cool, "PreventiveCool"),
        (ThermoAction::Cool, "PreventiveCool"),
        (ThermoAction::Cool, "PreventiveCool"),
        (ThermoAction::Cool, "PreventiveCool"),
        (ThermoAction::Cool, "PreventiveCool"),
        (ThermoAction::Cool, "AboveRange"),
        // Avg is exactly 24.0 while falling: preventive heat is suppressed.
        (ThermoAction::Off, "FallingSuppressed"),
        (ThermoAction::Heat, "PreventiveHeat"),
        (ThermoAction::Heat, "PreventiveHeat"),
        (ThermoAction::Heat, "PreventiveHeat"),
        (ThermoAction::Heat, "PreventiveHeat"),
    ];
    assert_eq!(steps.len(), expected.len());
    for (i, ((action, rule), (want_action, want_rule))) in
        steps.iter().zip(expected.iter()).enumerate()
    {
        assert_eq!(action, want_action, "step {}", i + 1);
        assert_eq!(rule, want_rule, "step {}", i + 1);
    }
}
