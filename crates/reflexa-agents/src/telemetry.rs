//! Logging-Brücke: mit Feature `telemetry` über `tracing`, sonst `eprintln!`
//! für Warnungen und stumm für Debug-Ausgaben.

use reflexa_core::Decision;
use std::fmt::Debug;

pub(crate) fn warn(msg: &str) {
    #[cfg(feature = "telemetry")]
    tracing::warn!("{msg}");
    #[cfg(not(feature = "telemetry"))]
    eprintln!("Warnung: {msg}");
}

pub(crate) fn decision<A: Debug>(agent: &'static str, d: &Decision<A>) {
    #[cfg(feature = "telemetry")]
    tracing::debug!(
        agent,
        action = ?d.action,
        rule = %d.rule,
        signal = ?d.signal,
        why = %d.why,
        "decision"
    );
    #[cfg(not(feature = "telemetry"))]
    let _ = (agent, d);
}
