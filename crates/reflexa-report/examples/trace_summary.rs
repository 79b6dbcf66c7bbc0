//! Example: run the thermostat over a generated temperature walk and summarize the trace.
//!
//! Run with: cargo run -p reflexa-report --example trace_summary

use reflexa_agents::{ScenarioGenerator, Thermostat};
use reflexa_report::{render_summary, render_timeline, Palette, StepRecord, TraceSummary};
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    println!("=== reflexa: Thermostat Trace Summary ===\n");

    let temps = ScenarioGenerator::new(42).temperatures(20, 21.0)?;
    let mut agent = Thermostat::default().into_agent()?;

    let records: Vec<StepRecord> = temps
        .iter()
        .enumerate()
        .map(|(i, t)| {
            let d = agent.step(t);
            StepRecord::new("thermostat", i + 1, t.celsius(), &d)
        })
        .collect();

    let palette = Palette::detect();
    print!("{}", render_timeline(&records, palette));

    let summary = TraceSummary::from_records(&records);
    print!("{}", render_summary(&summary, palette));

    println!("\n📋 Rule counts:");
    for (rule, count) in &summary.by_rule {
        println!("  {rule} → {count}");
    }

    Ok(())
}
