//! CSV angle files
//!
//! Reads and writes `time_s,angle_deg` files.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use thiserror::Error;

use crate::feed::Sample;

/// Header line of an angle file
pub const CSV_HEADER: &str = "time_s,angle_deg";

/// Errors reading an angle file
#[derive(Error, Debug)]
pub enum DatalogError {
    /// File could not be read
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// First non-blank line is not the header
    #[error("Missing header, expected 'time_s,angle_deg'")]
    MissingHeader,

    /// Row that cannot be parsed
    #[error("Line {line}: {reason}")]
    InvalidRow {
        /// 1-based line number
        line: usize,
        /// What was wrong with the row
        reason: String,
    },
}

/// Write samples to a CSV file
pub fn write_csv<P: AsRef<Path>>(path: P, samples: &[Sample]) -> io::Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    writeln!(writer, "{CSV_HEADER}")?;
    for sample in samples {
        writeln!(writer, "{:.3},{:.4}", sample.time_s, sample.angle_deg)?;
    }

    writer.flush()?;
    Ok(())
}

/// Read samples from a CSV file
pub fn read_csv<P: AsRef<Path>>(path: P) -> Result<Vec<Sample>, DatalogError> {
    let content = std::fs::read_to_string(path)?;
    parse_csv(&content)
}

/// Parse CSV content; blank lines are skipped
pub fn parse_csv(content: &str) -> Result<Vec<Sample>, DatalogError> {
    let mut lines = content
        .lines()
        .enumerate()
        .map(|(i, l)| (i + 1, l.trim()))
        .filter(|(_, l)| !l.is_empty());

    match lines.next() {
        Some((_, header)) if header.replace(' ', "") == CSV_HEADER => {}
        _ => return Err(DatalogError::MissingHeader),
    }

    let mut samples = Vec::new();
    for (line, row) in lines {
        let mut fields = row.split(',').map(str::trim);
        let (Some(time), Some(angle), None) = (fields.next(), fields.next(), fields.next()) else {
            return Err(DatalogError::InvalidRow {
                line,
                reason: format!("expected 2 columns in '{row}'"),
            });
        };
        let parse = |field: &str, name: &str| {
            field
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| DatalogError::InvalidRow {
                    line,
                    reason: format!("invalid {name} '{field}'"),
                })
        };
        samples.push(Sample::new(parse(time, "time_s")?, parse(angle, "angle_deg")?));
    }

    Ok(samples)
}
