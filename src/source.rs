//! Reads the speed-test results table into the desired IP set.
//!
//! The input is the CSV the measurement tool writes: a header row, the IP
//! literal in column 0 and a "<speed> <unit>" string in column 7. Only rows
//! whose measured speed is strictly positive qualify.

use crate::error::Error;
use csv::ReaderBuilder;
use std::collections::BTreeSet;
use std::net::IpAddr;
use std::path::Path;
use tracing::warn;

const SPEED_COLUMN: usize = 7;

/// Parses the results file into a deduplicated set of validated IPs.
///
/// Rows that are short, carry an unparsable IP or speed, or report a
/// non-positive speed are skipped with a warning. An empty result is not an
/// error here; the caller decides whether an empty desired set is fatal.
pub fn read_valid_ips(path: &Path) -> Result<BTreeSet<IpAddr>, Error> {
    if !path.exists() {
        return Err(Error::SourceNotFound(path.to_path_buf()));
    }

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(|e| Error::SourceMalformed(e.to_string()))?;

    // A file that cannot even yield its header row is unusable.
    reader
        .headers()
        .map_err(|e| Error::SourceMalformed(e.to_string()))?;

    let mut ips = BTreeSet::new();
    for (row, record) in reader.records().enumerate() {
        let row = row + 2; // 1-based, counting the header
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                warn!(row, "Skipping unreadable row: {e}");
                continue;
            }
        };

        if record.len() <= SPEED_COLUMN {
            warn!(row, fields = record.len(), "Skipping short row");
            continue;
        }

        let ip: IpAddr = match record[0].parse() {
            Ok(ip) => ip,
            Err(_) => {
                warn!(row, "Skipping row with invalid IP: {}", &record[0]);
                continue;
            }
        };

        let speed: f64 = match record[SPEED_COLUMN]
            .split_whitespace()
            .next()
            .and_then(|token| token.parse().ok())
        {
            Some(speed) => speed,
            None => {
                warn!(row, "Skipping row with invalid speed: {}", &record[SPEED_COLUMN]);
                continue;
            }
        };

        if speed > 0.0 {
            ips.insert(ip);
        } else {
            warn!(row, %ip, speed, "Skipping row with non-positive speed");
        }
    }

    Ok(ips)
}
