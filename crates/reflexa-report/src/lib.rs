#![warn(clippy::unwrap_used, clippy::expect_used)]

//! Step records, rendering and trace summaries for reflexa agents.
//!
//! This crate is the presentation side of the decision loop: it turns
//! [`Decision`]s into [`StepRecord`]s, renders them as tables or timelines and
//! aggregates a whole run into a [`TraceSummary`]. It never feeds anything
//! back into an agent.

mod render;

pub use render::{render_summary, render_table, render_timeline, ActionKind, Palette};

use reflexa_core::Decision;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Display;
use time::{format_description::well_known::Rfc3339, OffsetDateTime};

// Pattern detection thresholds
/// Minimum number of steps before the summary reports patterns
const PATTERN_MIN_STEPS: usize = 4;
/// Share of steps with an action change above which the run is flagged as flapping
const PATTERN_SWITCH_RATE: f64 = 0.5;
/// Share of steps decided by a manual override above which automation is flagged as bypassed
const PATTERN_MANUAL_SHARE: f64 = 0.5;

/// Rule name used by agents for manual override decisions.
pub const MANUAL_OVERRIDE_RULE: &str = "ManualOverride";

// Fallback constants
/// Fallback timestamp when formatting fails
const FALLBACK_TIMESTAMP: &str = "1970-01-01T00:00:00Z";

/// One step of an agent run, ready for display or JSON-lines output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    /// 1-based step number
    pub step: usize,
    /// RFC 3339 timestamp of when the step was recorded
    pub ts: String,
    /// Agent that made the decision (e.g. "smart-light")
    pub agent: String,
    /// Hour of day for time-aware agents
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hour: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occupied: Option<bool>,
    /// Raw reading pushed into the history for this step
    pub reading: f64,
    /// Smoothed value the decision was based on
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signal: Option<f64>,
    pub action: String,
    pub rule: String,
    pub why: String,
}

impl StepRecord {
    #[must_use]
    pub fn new<A: Display>(agent: &str, step: usize, reading: f64, decision: &Decision<A>) -> Self {
        Self {
            step,
            ts: iso8601_now(),
            agent: agent.to_string(),
            hour: None,
            occupied: None,
            reading,
            signal: decision.signal,
            action: decision.action.to_string(),
            rule: decision.rule.clone(),
            why: decision.why.clone(),
        }
    }

    /// Attach the time-of-day context of a light percept.
    #[must_use]
    pub fn with_hour(mut self, hour: u8, occupied: bool) -> Self {
        self.hour = Some(hour);
        self.occupied = Some(occupied);
        self
    }

    #[must_use]
    pub fn kind(&self) -> ActionKind {
        ActionKind::classify(&self.action)
    }
}

/// Aggregated view of a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TraceSummary {
    pub total: usize,
    pub by_rule: BTreeMap<String, usize>,
    pub by_action: BTreeMap<String, usize>,
    /// Number of steps whose action differs from the previous step.
    pub switches: usize,
}

impl TraceSummary {
    #[must_use]
    pub fn from_records(records: &[StepRecord]) -> Self {
        let mut summary = Self {
            total: records.len(),
            ..Self::default()
        };
        for record in records {
            *summary.by_rule.entry(record.rule.clone()).or_insert(0) += 1;
            *summary.by_action.entry(record.action.clone()).or_insert(0) += 1;
        }
        summary.switches = records
            .windows(2)
            .filter(|pair| pair[0].action != pair[1].action)
            .count();
        summary
    }

    /// Rule that fired most often; ties resolve to the alphabetically first name.
    #[must_use]
    pub fn dominant_rule(&self) -> Option<(&str, usize)> {
        self.by_rule
            .iter()
            .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))
            .map(|(rule, count)| (rule.as_str(), *count))
    }

    /// Share of transitions that changed the action (0.0 to 1.0).
    #[must_use]
    pub fn switch_rate(&self) -> f64 {
        if self.total < 2 {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)]
        let rate = self.switches as f64 / (self.total - 1) as f64;
        rate
    }

    #[must_use]
    pub fn share_of_rule(&self, rule: &str) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        let count = self.by_rule.get(rule).copied().unwrap_or(0);
        #[allow(clippy::cast_precision_loss)]
        let share = count as f64 / self.total as f64;
        share
    }

    /// Human-readable observations about the run.
    #[must_use]
    pub fn patterns(&self) -> Vec<String> {
        let mut patterns = Vec::new();
        if self.total < PATTERN_MIN_STEPS {
            return patterns;
        }
        let rate = self.switch_rate();
        if rate > PATTERN_SWITCH_RATE {
            patterns.push(format!(
                "Action changed on {:.0}% of transitions (possible flapping)",
                rate * 100.0
            ));
        }
        let manual = self.share_of_rule(MANUAL_OVERRIDE_RULE);
        if manual > PATTERN_MANUAL_SHARE {
            patterns.push(format!(
                "Manual override decided {:.0}% of steps",
                manual * 100.0
            ));
        }
        patterns
    }
}

/// Current UTC time as RFC 3339, with a fixed fallback.
#[must_use]
pub fn iso8601_now() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| FALLBACK_TIMESTAMP.to_string())
}
