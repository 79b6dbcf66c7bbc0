use reflexa_core::HistoryBuffer;
use std::error::Error;
use std::fs::File;
use std::io::{self, BufRead, BufReader};

/// Liest Messwerte (einer pro Zeile) aus einer Datei oder von stdin und gibt
/// pro Schritt Mittelwert und Trend des Verlaufs aus.
///
/// `printf '50\n80\n70\n' | cargo run -p reflexa-core --example smooth_readings`
fn main() -> Result<(), Box<dyn Error>> {
    let path = std::env::args().nth(1);
    let reader: Box<dyn BufRead> = match path {
        Some(p) => Box::new(BufReader::new(File::open(p)?)),
        None => Box::new(BufReader::new(io::stdin())),
    };

    let mut history = HistoryBuffer::new(3)?;
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let value: f64 = line.trim().parse()?;
        history.push(value);

        println!(
            "{value:.2}\tmean={:.2}\ttrend={:+.2}\t{:?}",
            history.mean(3)?,
            history.trend(),
            history.snapshot()
        );
    }

    Ok(())
}
