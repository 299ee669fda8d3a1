/// Spectrum file reading and writing
///
/// Supported input formats:
///   - `.txt`, RRUFF-style: `##`-prefixed header records followed by
///     `"<x>, <y>"` data lines (comma-space separated);
///   - `.txt`, plain two-column whitespace-separated, stored with the
///     wavenumber axis descending — reversed on load so `x` is ascending;
///   - `.csv` with `x` and `y` columns.
///
/// Output format: plain text, one `"<x> <y>"` sample per line, no header.

use std::io::Write;
use std::path::Path;

use thiserror::Error;

use super::spectrum::Spectrum;

#[derive(Debug, Error)]
pub enum ReadError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Unsupported file extension: .{0}")]
    Unsupported(String),
    #[error("Malformed spectrum data at line {line}: {reason}")]
    Malformed { line: usize, reason: String },
    #[error("CSV file is missing an '{0}' column")]
    MissingColumn(&'static str),
    #[error("File contains no data samples")]
    Empty,
}

/// Read a spectrum file, dispatching on the file extension.
pub fn read_spectrum(path: &Path) -> Result<Spectrum, ReadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let spectrum = match ext.as_str() {
        "txt" => parse_text(&std::fs::read_to_string(path)?)?,
        "csv" => read_csv(path)?,
        other => return Err(ReadError::Unsupported(other.to_string())),
    };

    if spectrum.is_empty() {
        return Err(ReadError::Empty);
    }
    if !is_non_decreasing(&spectrum.x) {
        log::warn!(
            "{}: x axis is not monotonically non-decreasing",
            path.display()
        );
    }
    log::info!("Read {} samples from {}", spectrum.len(), path.display());
    Ok(spectrum)
}

/// Parse text spectrum content. A leading `#` selects the RRUFF-style
/// comma-separated reader; anything else is treated as plain two-column.
pub fn parse_text(content: &str) -> Result<Spectrum, ReadError> {
    if content.trim_start().starts_with('#') {
        parse_rruff(content)
    } else {
        parse_two_column(content)
    }
}

/// RRUFF-style text: `##KEY=value` header lines, then `"<x>, <y>"` pairs.
fn parse_rruff(content: &str) -> Result<Spectrum, ReadError> {
    let mut x = Vec::new();
    let mut y = Vec::new();
    for (lineno, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with("##") {
            continue;
        }
        let mut fields = line.split(',').map(str::trim);
        let (fx, fy) = match (fields.next(), fields.next()) {
            (Some(fx), Some(fy)) => (fx, fy),
            _ => {
                return Err(ReadError::Malformed {
                    line: lineno + 1,
                    reason: format!("expected \"x, y\", got {line:?}"),
                })
            }
        };
        x.push(parse_float(fx, lineno)?);
        y.push(parse_float(fy, lineno)?);
    }
    Ok(Spectrum::new(x, y))
}

/// Plain whitespace-separated two-column text. These files carry the axis
/// descending, so both columns are reversed to restore ascending order.
fn parse_two_column(content: &str) -> Result<Spectrum, ReadError> {
    let mut x = Vec::new();
    let mut y = Vec::new();
    for (lineno, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let mut fields = line.split_whitespace();
        let (fx, fy) = match (fields.next(), fields.next()) {
            (Some(fx), Some(fy)) => (fx, fy),
            _ => {
                return Err(ReadError::Malformed {
                    line: lineno + 1,
                    reason: format!("expected two columns, got {line:?}"),
                })
            }
        };
        x.push(parse_float(fx, lineno)?);
        y.push(parse_float(fy, lineno)?);
    }
    x.reverse();
    y.reverse();
    Ok(Spectrum::new(x, y))
}

fn parse_float(field: &str, lineno: usize) -> Result<f64, ReadError> {
    field.parse::<f64>().map_err(|_| ReadError::Malformed {
        line: lineno + 1,
        reason: format!("not a number: {field:?}"),
    })
}

/// CSV with named `x` and `y` columns.
fn read_csv(path: &Path) -> Result<Spectrum, ReadError> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();
    let x_idx = headers
        .iter()
        .position(|h| h.trim() == "x")
        .ok_or(ReadError::MissingColumn("x"))?;
    let y_idx = headers
        .iter()
        .position(|h| h.trim() == "y")
        .ok_or(ReadError::MissingColumn("y"))?;

    let mut x = Vec::new();
    let mut y = Vec::new();
    for (recno, record) in reader.records().enumerate() {
        let record = record?;
        let fx = record.get(x_idx).unwrap_or("");
        let fy = record.get(y_idx).unwrap_or("");
        x.push(parse_float(fx.trim(), recno + 1)?);
        y.push(parse_float(fy.trim(), recno + 1)?);
    }
    Ok(Spectrum::new(x, y))
}

/// Write the spectrum as plain two-column text, one `"<x> <y>"` per line.
pub fn write_two_column(path: &Path, spectrum: &Spectrum) -> std::io::Result<()> {
    let mut out = std::io::BufWriter::new(std::fs::File::create(path)?);
    for (&x, &y) in spectrum.x.iter().zip(spectrum.y.iter()) {
        writeln!(out, "{} {}", x, y)?;
    }
    out.flush()
}

fn is_non_decreasing(x: &[f64]) -> bool {
    x.windows(2).all(|w| w[0] <= w[1])
}
