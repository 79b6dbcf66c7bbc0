//! Table and timeline rendering.
//!
//! Everything renders into a `String` so the CLI decides where it goes and
//! tests can inspect it. Color is opt-in through [`Palette`].

use crate::{StepRecord, TraceSummary};
use comfy_table::{presets::UTF8_FULL, Cell, Color, Table};
use owo_colors::OwoColorize;
use std::fmt::Write;
use std::io::IsTerminal;

/// Display category of an action label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    On,
    Dim,
    Off,
    Heat,
    Cool,
    Idle,
    Other,
}

impl ActionKind {
    /// Classify an action label such as `TurnOn_Dim` or `Heat`.
    #[must_use]
    pub fn classify(label: &str) -> Self {
        match label {
            l if l.contains("Dim") => Self::Dim,
            l if l.starts_with("TurnOn") => Self::On,
            "TurnOff" | "Off" => Self::Off,
            "Heat" => Self::Heat,
            "Cool" => Self::Cool,
            "NoOp" => Self::Idle,
            _ => Self::Other,
        }
    }

    #[must_use]
    pub fn emoji(self) -> &'static str {
        match self {
            Self::On => "💡",
            Self::Dim => "🌙",
            Self::Off => "🔌",
            Self::Heat => "🔥",
            Self::Cool => "❄️",
            Self::Idle => "✅",
            Self::Other => "•",
        }
    }

    fn table_color(self) -> Color {
        match self {
            Self::On => Color::Green,
            Self::Dim => Color::Yellow,
            Self::Off => Color::Red,
            Self::Heat => Color::Magenta,
            Self::Cool => Color::Cyan,
            Self::Idle | Self::Other => Color::Reset,
        }
    }
}

/// Decides whether output gets ANSI colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    color: bool,
}

impl Palette {
    #[must_use]
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    /// Color only when stdout is a terminal.
    #[must_use]
    pub fn detect() -> Self {
        Self::new(std::io::stdout().is_terminal())
    }

    #[must_use]
    pub fn plain() -> Self {
        Self::new(false)
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.color
    }

    #[must_use]
    pub fn header(&self, text: &str) -> String {
        if self.color {
            text.magenta().bold().to_string()
        } else {
            text.to_string()
        }
    }

    #[must_use]
    pub fn status(&self, text: &str) -> String {
        if self.color {
            text.cyan().to_string()
        } else {
            text.to_string()
        }
    }

    #[must_use]
    pub fn rule(&self, text: &str) -> String {
        if self.color {
            text.blue().to_string()
        } else {
            text.to_string()
        }
    }

    #[must_use]
    pub fn action(&self, label: &str) -> String {
        let kind = ActionKind::classify(label);
        let text = format!("{} {label}", kind.emoji());
        if !self.color {
            return text;
        }
        match kind {
            ActionKind::On => text.green().to_string(),
            ActionKind::Dim => text.yellow().to_string(),
            ActionKind::Off => text.red().to_string(),
            ActionKind::Heat => text.magenta().to_string(),
            ActionKind::Cool => text.cyan().to_string(),
            ActionKind::Idle | ActionKind::Other => text,
        }
    }
}

fn yes_no(flag: Option<bool>) -> &'static str {
    match flag {
        Some(true) => "Yes",
        Some(false) => "No",
        None => "-",
    }
}

fn hour_label(hour: Option<u8>) -> String {
    hour.map_or_else(|| "-".to_string(), |h| format!("{h:02}:00"))
}

fn signal_label(signal: Option<f64>) -> String {
    signal.map_or_else(|| "-".to_string(), |s| format!("{s:.2}"))
}

/// One row per step: time, occupancy, reading, smoothed value, action, rule, explanation.
#[must_use]
pub fn render_table(title: &str, records: &[StepRecord], palette: Palette) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec![
        "Step", "Time", "Occ", "Reading", "Avg", "Action", "Rule", "Explain",
    ]);
    if palette.enabled() {
        table.enforce_styling();
    } else {
        table.force_no_tty();
    }

    for r in records {
        let kind = r.kind();
        let mut action = Cell::new(format!("{} {}", kind.emoji(), r.action));
        if palette.enabled() {
            action = action.fg(kind.table_color());
        }
        table.add_row(vec![
            Cell::new(r.step),
            Cell::new(hour_label(r.hour)),
            Cell::new(yes_no(r.occupied)),
            Cell::new(format!("{:.1}", r.reading)),
            Cell::new(signal_label(r.signal)),
            action,
            Cell::new(&r.rule),
            Cell::new(&r.why),
        ]);
    }

    format!("{}\n{table}\n", palette.header(title))
}

/// Step-by-step narrative, three lines per step plus a separator.
#[must_use]
pub fn render_timeline(records: &[StepRecord], palette: Palette) -> String {
    let mut out = String::new();
    for r in records {
        let mut status = format!("Step {:02}", r.step);
        if let Some(hour) = r.hour {
            let _ = write!(status, " | {hour:02}:00");
        }
        if r.occupied.is_some() {
            let occ = if r.occupied == Some(true) { "Y" } else { "N" };
            let _ = write!(status, " | Occ: {occ}");
        }
        let _ = write!(
            status,
            " | Reading: {:.1} | Avg: {}",
            r.reading,
            signal_label(r.signal)
        );
        let _ = writeln!(out, "{}", palette.status(&status));
        let _ = writeln!(out, " → Action: {}", palette.action(&r.action));
        let _ = writeln!(out, " → Rule: {} | Note: {}", palette.rule(&r.rule), r.why);
        let _ = writeln!(out, "{}", "-".repeat(70));
    }
    out
}

#[must_use]
pub fn render_summary(summary: &TraceSummary, palette: Palette) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", palette.header("Summary"));
    let _ = writeln!(
        out,
        "  steps: {}, action switches: {}",
        summary.total, summary.switches
    );
    if let Some((rule, count)) = summary.dominant_rule() {
        let _ = writeln!(out, "  dominant rule: {} ({count}x)", palette.rule(rule));
    }
    for (action, count) in &summary.by_action {
        let _ = writeln!(out, "  {}: {count}", palette.action(action));
    }
    for pattern in summary.patterns() {
        let _ = writeln!(out, "  ⚠ {pattern}");
    }
    out
}
