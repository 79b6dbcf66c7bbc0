//! CLI for reflexa.
//!
//! Drives the reflex agents step by step from built-in scenarios, generated
//! sequences, files, stdin or an interactive session, and prints each decision
//! as a table, a timeline or JSON lines.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use reflexa_agents::scenario::{light_demo, light_evening, thermostat_demo};
use reflexa_agents::{
    LightConfig, LightPercept, ReflexVacuum, ScenarioGenerator, SmartLight, Temperature,
    ThermostatConfig, Thermostat, VacuumWorld,
};
use reflexa_core::Agent;
use reflexa_report::{
    render_summary, render_table, render_timeline, Palette, StepRecord, TraceSummary,
};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the smart light agent over a scenario
    Light(LightArgs),
    /// Run the thermostat agent over a temperature sequence
    Thermostat(ThermostatArgs),
    /// Run the vacuum world with the reflex agent
    Vacuum {
        /// Maximum number of steps
        #[arg(long, default_value = "5")]
        steps: usize,

        /// Print one JSON object per step instead of text
        #[arg(long)]
        json: bool,
    },
    /// List an agent's rules in precedence order
    Rules {
        #[arg(value_enum)]
        agent: RulesAgent,
    },
    /// Read one percept per stdin line and decide after each
    Interactive {
        #[arg(value_enum)]
        agent: InteractiveAgent,

        /// JSON config file (partial keys allowed)
        #[arg(long)]
        config: Option<PathBuf>,

        /// History capacity (default: 5 for light, window size for thermostat)
        #[arg(long)]
        capacity: Option<usize>,

        #[arg(long, value_enum, default_value = "auto")]
        color: ColorChoice,
    },
}

#[derive(Args)]
struct LightArgs {
    /// JSON-lines or `hour occupied lux` lines; `-` reads stdin
    #[arg(long, conflicts_with_all = ["evening", "generate"])]
    input: Option<PathBuf>,

    /// Use the rule demo (the default when no other source is given)
    #[arg(long, conflicts_with_all = ["input", "evening", "generate"])]
    demo: bool,

    /// Use the evening timeline instead of the rule demo
    #[arg(long, conflicts_with = "generate")]
    evening: bool,

    /// Generate N random percepts
    #[arg(long)]
    generate: Option<usize>,

    /// Seed for --generate
    #[arg(long, default_value = "42")]
    seed: u64,

    /// JSON config file (partial keys allowed)
    #[arg(long)]
    config: Option<PathBuf>,

    /// History capacity
    #[arg(long, default_value = "5")]
    capacity: usize,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Args)]
struct ThermostatArgs {
    /// Temperatures in °C
    #[arg(allow_negative_numbers = true, conflicts_with_all = ["input", "generate"])]
    temps: Vec<Temperature>,

    /// One temperature per line; `-` reads stdin
    #[arg(long, conflicts_with = "generate")]
    input: Option<PathBuf>,

    /// Generate N temperatures as a random walk
    #[arg(long)]
    generate: Option<usize>,

    /// Seed for --generate
    #[arg(long, default_value = "42")]
    seed: u64,

    /// Start temperature for --generate
    #[arg(long, default_value = "21.0", allow_negative_numbers = true)]
    start: f64,

    /// JSON config file (partial keys allowed)
    #[arg(long)]
    config: Option<PathBuf>,

    /// History capacity (default: window size)
    #[arg(long)]
    capacity: Option<usize>,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Args)]
struct OutputArgs {
    /// Print one JSON record per step
    #[arg(long)]
    json: bool,

    #[arg(long, value_enum, default_value = "table")]
    view: View,

    /// Pause between timeline steps
    #[arg(long, default_value = "0")]
    delay_ms: u64,

    #[arg(long, value_enum, default_value = "auto")]
    color: ColorChoice,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum View {
    Table,
    Timeline,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ColorChoice {
    Auto,
    Always,
    Never,
}

impl ColorChoice {
    fn palette(self) -> Palette {
        match self {
            Self::Auto => Palette::detect(),
            Self::Always => Palette::new(true),
            Self::Never => Palette::plain(),
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum RulesAgent {
    Light,
    Thermostat,
    Vacuum,
}

#[derive(Clone, Copy, ValueEnum)]
enum InteractiveAgent {
    Light,
    Thermostat,
}

fn open_input(path: &Path) -> Result<Box<dyn BufRead>> {
    if path.as_os_str() == "-" {
        return Ok(Box::new(BufReader::new(io::stdin())));
    }
    let file =
        File::open(path).with_context(|| format!("Failed to open input file {path:?}"))?;
    Ok(Box::new(BufReader::new(file)))
}

fn parse_flag(token: &str) -> Option<bool> {
    match token.to_ascii_lowercase().as_str() {
        "y" | "yes" | "true" | "1" => Some(true),
        "n" | "no" | "false" | "0" => Some(false),
        _ => None,
    }
}

/// A JSON object or the shorthand `hour occupied lux`, e.g. `22 y 90`.
fn parse_light_line(line: &str) -> Result<LightPercept> {
    let line = line.trim();
    if line.starts_with('{') {
        return serde_json::from_str(line).context("Invalid light percept JSON");
    }
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let [hour, occupied, lux] = tokens.as_slice() else {
        anyhow::bail!("Expected `hour occupied lux`, got {line:?}");
    };
    let hour: u8 = hour.parse().with_context(|| format!("Invalid hour {hour:?}"))?;
    let occupied =
        parse_flag(occupied).with_context(|| format!("Invalid occupancy {occupied:?}"))?;
    let lux: f64 = lux.parse().with_context(|| format!("Invalid lux {lux:?}"))?;
    Ok(LightPercept::new(hour, occupied, lux)?)
}

fn read_lines<T>(reader: impl BufRead, parse: impl Fn(&str) -> Result<T>) -> Result<Vec<T>> {
    let mut out = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("line {}", idx + 1))?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        out.push(parse(trimmed).with_context(|| format!("line {}", idx + 1))?);
    }
    Ok(out)
}

fn parse_temperature(line: &str) -> Result<Temperature> {
    Ok(line.parse::<Temperature>()?)
}

fn load_light_config(path: Option<&Path>) -> Result<LightConfig> {
    let Some(path) = path else {
        return Ok(LightConfig::default());
    };
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {path:?}"))?;
    LightConfig::from_json(&raw).with_context(|| format!("Invalid light config {path:?}"))
}

fn load_thermostat_config(path: Option<&Path>) -> Result<ThermostatConfig> {
    let Some(path) = path else {
        return Ok(ThermostatConfig::default());
    };
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {path:?}"))?;
    ThermostatConfig::from_json(&raw)
        .with_context(|| format!("Invalid thermostat config {path:?}"))
}

fn light_record(step: usize, percept: &LightPercept, agent: &mut Agent<SmartLight>) -> StepRecord {
    let decision = agent.step(percept);
    StepRecord::new("smart-light", step, percept.lux(), &decision)
        .with_hour(percept.hour(), percept.occupied())
}

fn thermostat_record(step: usize, temp: &Temperature, agent: &mut Agent<Thermostat>) -> StepRecord {
    let decision = agent.step(temp);
    StepRecord::new("thermostat", step, temp.celsius(), &decision)
}

fn thermostat_agent(config: Option<&Path>, capacity: Option<usize>) -> Result<Agent<Thermostat>> {
    let config = load_thermostat_config(config)?;
    let capacity = capacity.unwrap_or(config.window_size);
    let thermostat = Thermostat::new(config).context("Invalid thermostat configuration")?;
    Ok(Agent::new(thermostat, capacity)?)
}

/// Writes records as they are produced; tables and the summary follow the last step.
fn emit(title: &str, records: impl Iterator<Item = StepRecord>, out: &OutputArgs) -> Result<()> {
    let palette = out.color.palette();
    let stdout = io::stdout();
    let mut w = stdout.lock();
    let mut seen = Vec::new();

    if !out.json && out.view == View::Timeline {
        writeln!(w, "{}", palette.header(title))?;
    }
    for record in records {
        if out.json {
            writeln!(w, "{}", serde_json::to_string(&record)?)?;
        } else if out.view == View::Timeline {
            write!(w, "{}", render_timeline(std::slice::from_ref(&record), palette))?;
            w.flush()?;
            if out.delay_ms > 0 {
                std::thread::sleep(Duration::from_millis(out.delay_ms));
            }
        }
        seen.push(record);
    }
    if !out.json {
        if out.view == View::Table {
            write!(w, "{}", render_table(title, &seen, palette))?;
        }
        write!(w, "{}", render_summary(&TraceSummary::from_records(&seen), palette))?;
    }
    Ok(())
}

fn run_light(args: &LightArgs) -> Result<()> {
    let percepts = if args.demo {
        light_demo()?
    } else if let Some(path) = &args.input {
        read_lines(open_input(path)?, parse_light_line)?
    } else if let Some(n) = args.generate {
        ScenarioGenerator::new(args.seed).light_percepts(n)?
    } else if args.evening {
        light_evening()?
    } else {
        light_demo()?
    };
    tracing::info!(steps = percepts.len(), "running smart light");

    let config = load_light_config(args.config.as_deref())?;
    let light = SmartLight::new(config).context("Invalid light configuration")?;
    let mut agent = light.into_agent(args.capacity)?;

    let records = percepts
        .iter()
        .enumerate()
        .map(|(i, p)| light_record(i + 1, p, &mut agent));
    emit("Smart Light Decisions", records, &args.output)
}

fn run_thermostat(args: &ThermostatArgs) -> Result<()> {
    let temps = if !args.temps.is_empty() {
        args.temps.clone()
    } else if let Some(path) = &args.input {
        read_lines(open_input(path)?, parse_temperature)?
    } else if let Some(n) = args.generate {
        ScenarioGenerator::new(args.seed).temperatures(n, args.start)?
    } else {
        thermostat_demo()?
    };
    tracing::info!(steps = temps.len(), "running thermostat");

    let mut agent = thermostat_agent(args.config.as_deref(), args.capacity)?;
    let records = temps
        .iter()
        .enumerate()
        .map(|(i, t)| thermostat_record(i + 1, t, &mut agent));
    emit("Thermostat Decisions", records, &args.output)
}

fn run_vacuum(steps: usize, json: bool) -> Result<()> {
    let mut world = VacuumWorld::default();
    let agent = ReflexVacuum::default();
    let stdout = io::stdout();
    let mut w = stdout.lock();

    if !json {
        writeln!(w, "=== Vacuum Cleaner Simulation ===")?;
        writeln!(w, "Agent starting location: {}", world.location())?;
    }
    for entry in world.run(&agent, steps) {
        if json {
            writeln!(w, "{}", serde_json::to_string(&entry)?)?;
        } else {
            writeln!(
                w,
                "Step {}: Location={}, Status={:?} -> Action={} ({}) | cleaned={}",
                entry.step,
                entry.percept.location,
                entry.percept.status,
                entry.action,
                entry.rule,
                entry.cleaned
            )?;
        }
    }
    if !json {
        let status = if world.all_clean() {
            "all rooms clean"
        } else {
            "dirty rooms remain"
        };
        writeln!(w, "Rooms cleaned: {}/3 ({status})", world.cleaned())?;
    }
    Ok(())
}

fn run_rules(agent: RulesAgent) -> Result<()> {
    let names = match agent {
        RulesAgent::Light => SmartLight::default().rule_names(),
        RulesAgent::Thermostat => Thermostat::default().rule_names(),
        RulesAgent::Vacuum => ReflexVacuum::default().rule_names(),
    };
    let stdout = io::stdout();
    let mut w = stdout.lock();
    for (i, name) in names.iter().enumerate() {
        writeln!(w, "{:>2}. {name}", i + 1)?;
    }
    Ok(())
}

fn run_interactive(
    agent: InteractiveAgent,
    config: Option<&Path>,
    capacity: Option<usize>,
    color: ColorChoice,
) -> Result<()> {
    let palette = color.palette();
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut w = stdout.lock();

    match agent {
        InteractiveAgent::Light => {
            eprintln!("Enter `hour occupied lux` or a JSON percept per line, `quit` to stop.");
            let light = SmartLight::new(load_light_config(config)?)?;
            let mut agent = light.into_agent(capacity.unwrap_or(5))?;
            let mut step = 0;
            for (idx, line) in stdin.lock().lines().enumerate() {
                let line = match line {
                    Ok(line) => line,
                    Err(e) => {
                        eprintln!("line {}: {e}", idx + 1);
                        continue;
                    }
                };
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                if matches!(line, "q" | "quit" | "exit") {
                    break;
                }
                match parse_light_line(line) {
                    Ok(percept) => {
                        step += 1;
                        let record = light_record(step, &percept, &mut agent);
                        write!(w, "{}", render_timeline(&[record], palette))?;
                        w.flush()?;
                    }
                    Err(e) => eprintln!("line {}: {e:#}", idx + 1),
                }
            }
        }
        InteractiveAgent::Thermostat => {
            eprintln!("Enter one temperature per line, `quit` to stop.");
            let mut agent = thermostat_agent(config, capacity)?;
            let mut step = 0;
            for (idx, line) in stdin.lock().lines().enumerate() {
                let line = match line {
                    Ok(line) => line,
                    Err(e) => {
                        eprintln!("line {}: {e}", idx + 1);
                        continue;
                    }
                };
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                if matches!(line, "q" | "quit" | "exit") {
                    break;
                }
                match parse_temperature(line) {
                    Ok(temp) => {
                        step += 1;
                        let record = thermostat_record(step, &temp, &mut agent);
                        write!(w, "{}", render_timeline(&[record], palette))?;
                        w.flush()?;
                    }
                    Err(e) => eprintln!("line {}: {e:#}", idx + 1),
                }
            }
        }
    }
    Ok(())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Light(args) => run_light(&args),
        Commands::Thermostat(args) => run_thermostat(&args),
        Commands::Vacuum { steps, json } => run_vacuum(steps, json),
        Commands::Rules { agent } => run_rules(agent),
        Commands::Interactive {
            agent,
            config,
            capacity,
            color,
        } => run_interactive(agent, config.as_deref(), capacity, color),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reflexa_agents::ManualOverride;

    #[test]
    fn test_parse_light_line_shorthand() {
        let p = parse_light_line("22 y 90").unwrap();
        assert_eq!(p.hour(), 22);
        assert!(p.occupied());
        assert!((p.lux() - 90.0).abs() < f64::EPSILON);

        let p = parse_light_line("  7 no 300.5 ").unwrap();
        assert!(!p.occupied());
    }

    #[test]
    fn test_parse_light_line_json() {
        let p = parse_light_line(r#"{"hour":14,"occupied":true,"lux":380,"manual_override":"ON"}"#)
            .unwrap();
        assert_eq!(p.manual_override(), Some(ManualOverride::On));
    }

    #[test]
    fn test_parse_light_line_rejects_malformed() {
        assert!(parse_light_line("22 y").is_err());
        assert!(parse_light_line("25 y 90").is_err());
        assert!(parse_light_line("22 maybe 90").is_err());
        assert!(parse_light_line("22 y dark").is_err());
        assert!(parse_light_line("{\"hour\":1}").is_err());
    }

    #[test]
    fn test_read_lines_reports_line_number() {
        let input = "21.0\n\n# comment\n22.5\nwarm\n";
        let err = read_lines(input.as_bytes(), parse_temperature).unwrap_err();
        assert!(format!("{err:#}").contains("line 5"));

        let ok = read_lines("21.0\n\n22.5\n".as_bytes(), parse_temperature).unwrap();
        assert_eq!(ok.len(), 2);
    }

    #[test]
    fn test_read_lines_reports_line_number_for_invalid_utf8() {
        let input: &[u8] = b"21.0\n\xff\xfe\n22.0\n";
        let err = read_lines(input, parse_temperature).unwrap_err();
        assert!(format!("{err:#}").contains("line 2"), "{err:#}");
    }

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag("Y"), Some(true));
        assert_eq!(parse_flag("false"), Some(false));
        assert_eq!(parse_flag("?"), None);
    }

    #[test]
    fn test_thermostat_agent_uses_window_as_default_capacity() {
        let agent = thermostat_agent(None, None).unwrap();
        assert_eq!(agent.history().capacity(), 5);
        let agent = thermostat_agent(None, Some(3)).unwrap();
        assert_eq!(agent.history().capacity(), 3);
    }

    #[test]
    fn test_load_config_from_file() {
        let dir = std::env::temp_dir().join("reflexa_test_config");
        let _ = std::fs::create_dir_all(&dir);
        let path = dir.join("thermostat.json");
        std::fs::write(&path, r#"{"low_bound": 18.0, "window_size": 3}"#).unwrap();
        let cfg = load_thermostat_config(Some(path.as_path())).unwrap();
        assert!((cfg.low_bound - 18.0).abs() < f64::EPSILON);
        assert_eq!(cfg.window_size, 3);

        std::fs::write(&path, r#"{"night_start": 30}"#).unwrap();
        assert!(load_light_config(Some(path.as_path())).is_err());
        let _ = std::fs::remove_dir_all(&dir);
    }
}
