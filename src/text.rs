//! Read numeric columns from delimited text and write binned tables.
use std::fs;
use std::io;
use std::io::prelude::*;
use std::path;

use log::debug;
use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// All the ways reading a text table can fail
#[derive(Debug, Error)]
pub enum TextError {
    #[error("An IO error occurred: {0}")]
    Io(#[from] io::Error),
    #[error("Could not parse {token:?} as a number on line {line}")]
    Parse { line: usize, token: String },
    #[error("Line {line} has {found} columns, expected {expected}")]
    RaggedRow {
        line: usize,
        expected: usize,
        found: usize,
    },
}

/// The provenance lines written above a binned table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TableMetadata {
    pub name: String,
    pub source: String,
    pub from_file: String,
    /// Which pressure/temperature point the data came from, omitted when empty
    pub selection: String,
    /// How the data were binned
    pub binning: String,
}

fn split_fields(line: &str) -> impl Iterator<Item = &str> {
    line.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
}

/// Read whitespace or comma separated numeric columns.
///
/// Blank lines and lines starting with `#` are skipped, as is a first data line
/// in which no field parses as a number, which is taken to be a column header.
pub fn columns_from_reader<R: BufRead>(reader: R) -> Result<Vec<Vec<f64>>, TextError> {
    let mut columns: Vec<Vec<f64>> = Vec::new();
    let mut seen_row = false;
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let line_number = i + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let fields: Vec<&str> = split_fields(trimmed).collect();
        let parsed: Result<Vec<f64>, &str> = fields
            .iter()
            .map(|token| token.parse::<f64>().map_err(|_| *token))
            .collect();
        let row = match parsed {
            Ok(row) => row,
            Err(_) if !seen_row && fields.iter().all(|t| t.parse::<f64>().is_err()) => {
                debug!("Skipping header on line {line_number}: {trimmed}");
                seen_row = true;
                continue;
            }
            Err(token) => {
                return Err(TextError::Parse {
                    line: line_number,
                    token: token.to_string(),
                })
            }
        };
        seen_row = true;
        if columns.is_empty() {
            columns = vec![Vec::new(); row.len()];
        } else if row.len() != columns.len() {
            return Err(TextError::RaggedRow {
                line: line_number,
                expected: columns.len(),
                found: row.len(),
            });
        }
        for (column, v) in columns.iter_mut().zip(row) {
            column.push(v);
        }
    }
    Ok(columns)
}

pub fn columns_from_file<P: AsRef<path::Path>>(path: P) -> Result<Vec<Vec<f64>>, TextError> {
    let file = fs::File::open(path)?;
    columns_from_reader(io::BufReader::new(file))
}

/// Write `location` and `value` as a two-column CSV table preceded by the `#`
/// metadata lines of `metadata`.
pub fn write_binned_table<W: Write>(
    writer: &mut W,
    metadata: &TableMetadata,
    location: &[f64],
    value: &[f64],
) -> io::Result<()> {
    writeln!(writer, "# Name: {}", metadata.name)?;
    writeln!(writer, "# Source: {}", metadata.source)?;
    writeln!(writer, "# From file: {}", metadata.from_file)?;
    if !metadata.selection.is_empty() {
        writeln!(writer, "# {}", metadata.selection)?;
    }
    writeln!(writer, "# {}", metadata.binning)?;
    writeln!(writer, "wavel [m],x-sec")?;
    for (x, y) in location.iter().zip(value.iter()) {
        writeln!(writer, "{x:e},{y:e}")?;
    }
    Ok(())
}

pub fn binned_table_to_file<P: AsRef<path::Path>>(
    path: P,
    metadata: &TableMetadata,
    location: &[f64],
    value: &[f64],
) -> io::Result<()> {
    let file = fs::File::create(path)?;
    let mut writer = io::BufWriter::new(file);
    write_binned_table(&mut writer, metadata, location, value)?;
    writer.flush()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_read_columns() -> Result<(), TextError> {
        let text = "# comment\n\ntime  flux err\n1.0 2.0 0.1\n2.0,3.0,0.2\n";
        let columns = columns_from_reader(io::Cursor::new(text))?;
        assert_eq!(columns.len(), 3);
        assert_eq!(columns[0], vec![1.0, 2.0]);
        assert_eq!(columns[2], vec![0.1, 0.2]);
        Ok(())
    }

    #[test]
    fn test_read_errors() {
        let err = columns_from_reader(io::Cursor::new("1 2\n3 x\n")).unwrap_err();
        assert!(matches!(err, TextError::Parse { line: 2, .. }), "{err}");
        let err = columns_from_reader(io::Cursor::new("1 2\n3 4 5\n")).unwrap_err();
        assert!(
            matches!(
                err,
                TextError::RaggedRow {
                    line: 2,
                    expected: 2,
                    found: 3
                }
            ),
            "{err}"
        );
        let err = columns_from_reader(io::Cursor::new("# units\n1.0 abc\n2.0 3.0\n")).unwrap_err();
        assert!(matches!(err, TextError::Parse { line: 2, .. }), "{err}");
    }

    #[test]
    fn test_write_table() -> io::Result<()> {
        let metadata = TableMetadata {
            name: "CO2".into(),
            source: "10.1093/mnras/staa1874".into(),
            from_file: "CO2.h5".into(),
            selection: "Selected xsec at p = 0.001 bar and T = 1000 K".into(),
            binning: "Binned using R=100".into(),
        };
        let mut buf = Vec::new();
        write_binned_table(&mut buf, &metadata, &[1e-6, 2e-6], &[3.5e-20, 1e-21])?;
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "# Name: CO2");
        assert_eq!(lines[1], "# Source: 10.1093/mnras/staa1874");
        assert_eq!(lines[2], "# From file: CO2.h5");
        assert_eq!(lines[3], "# Selected xsec at p = 0.001 bar and T = 1000 K");
        assert_eq!(lines[4], "# Binned using R=100");
        assert_eq!(lines[5], "wavel [m],x-sec");
        assert_eq!(lines[6], "1e-6,3.5e-20");

        let columns = columns_from_reader(io::Cursor::new(text.as_str())).unwrap();
        assert_eq!(columns[0], vec![1e-6, 2e-6]);
        Ok(())
    }

    #[test]
    fn test_write_table_without_selection() -> io::Result<()> {
        let metadata = TableMetadata {
            name: "H2O".into(),
            binning: "Binned box of size 4".into(),
            ..Default::default()
        };
        let mut buf = Vec::new();
        write_binned_table(&mut buf, &metadata, &[1e-6], &[2e-20])?;
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[3], "# Binned box of size 4");
        assert_eq!(lines[4], "wavel [m],x-sec");
        Ok(())
    }
}
