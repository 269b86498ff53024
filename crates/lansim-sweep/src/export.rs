//! CSV export of sweep results.

use lansim_core::MetricsRecord;
use std::fmt::Write as _;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::info;

const HEADER: &str = "Persistent Mode,Average Arrival Rate (packets/s),Number of Nodes,\
                      CSMA/CD Efficiency,CSMA/CD Throughput (Mbps)";

/// Render records as delimited text, one row per run.
pub fn render_csv(records: &[MetricsRecord]) -> String {
    let mut out = String::with_capacity(64 * (records.len() + 1));
    out.push_str(HEADER);
    out.push('\n');
    for r in records {
        writeln!(
            out,
            "{},{},{},{:.10},{:.10}",
            r.persistent, r.arrival_rate, r.stations, r.efficiency, r.throughput_mbps
        )
        .expect("writing to a String cannot fail");
    }
    out
}

/// Default output path: `lansim_output_<unix-millis>.csv` in the
/// working directory.
pub fn timestamped_path() -> PathBuf {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    PathBuf::from(format!("lansim_output_{millis}.csv"))
}

pub fn write_csv(path: &Path, records: &[MetricsRecord]) -> io::Result<()> {
    std::fs::write(path, render_csv(records))?;
    info!(path = %path.display(), rows = records.len(), "wrote results");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(persistent: bool, efficiency: f64) -> MetricsRecord {
        MetricsRecord {
            persistent,
            arrival_rate: 7.0,
            stations: 20,
            efficiency,
            throughput_mbps: 0.15,
        }
    }

    #[test]
    fn renders_header_and_one_row_per_record() {
        let csv = render_csv(&[record(true, 0.5), record(false, 0.25)]);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Persistent Mode,"));
        assert_eq!(lines[1], "true,7,20,0.5000000000,0.1500000000");
        assert_eq!(lines[2], "false,7,20,0.2500000000,0.1500000000");
    }

    #[test]
    fn empty_input_is_just_the_header() {
        let csv = render_csv(&[]);
        assert_eq!(csv.lines().count(), 1);
    }

    #[test]
    fn undefined_efficiency_renders_as_nan() {
        let csv = render_csv(&[record(true, f64::NAN)]);
        assert!(csv.lines().nth(1).unwrap().contains("NaN"));
    }
}
