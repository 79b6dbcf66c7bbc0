use std::io::{self, Read};

use reflexa_agents::{LightPercept, SmartLight};
use reflexa_core::{Decision, HistoryBuffer, Policy};
use serde::Serialize;

#[derive(Serialize)]
struct DecisionRecord {
    policy: String,
    percept: LightPercept,
    decision: Decision<reflexa_agents::LightAction>,
}

/// Liest ein Licht-Percept als JSON von stdin und gibt die Entscheidung aus.
///
/// `echo '{"hour":22,"occupied":true,"lux":90}' | cargo run -p reflexa-agents --example decide`
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut input = String::new();
    io::stdin().read_to_string(&mut input)?;

    let percept: LightPercept = if input.trim().is_empty() {
        LightPercept::new(22, true, 90.0)?
    } else {
        serde_json::from_str(&input)?
    };

    let light = SmartLight::default();
    let mut history = HistoryBuffer::new(light.config().window_size)?;
    history.push(light.reading(&percept));
    let decision = light.decide(&percept, &history);

    let record = DecisionRecord {
        policy: "smart-light".to_string(),
        percept,
        decision,
    };

    serde_json::to_writer_pretty(io::stdout(), &record)?;
    println!();

    Ok(())
}
