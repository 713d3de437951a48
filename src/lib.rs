// src/lib.rs
pub mod aggregate;
pub mod counts;
pub mod input;
pub mod report;
pub mod taxdb;
pub mod types;

use std::fmt::Write as FmtWrite;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::aggregate::{accumulate_clade_counts, CladeCounts};
use crate::counts::{CountAccumulator, RawCounts};
use crate::input::{open_input, InputMode};
use crate::report::{build_report_rows, format_row};
use crate::taxdb::parse_taxdb;
use crate::types::ReportRow;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("can't open taxonomy file {path}: {source}")]
    Taxonomy {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("can't read input {path}: {source}")]
    Input {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// A struct to hold the finished report with minimal duplication.
/// Structured rows are stored; text is generated on demand.
#[derive(Debug)]
pub struct ReportResults {
    /// Report rows in print order (unclassified bucket first).
    pub report_rows: Vec<ReportRow>,

    /// taxid -> reads assigned directly to that taxon.
    pub raw_counts: RawCounts,

    /// taxid -> reads in that taxon plus descendants.
    pub clade_counts: CladeCounts,

    /// Total input reads, the percentage denominator.
    pub seq_count: u64,
}

impl ReportResults {
    /// Generate the report text on demand.
    pub fn get_report_text(&self) -> String {
        let mut output = String::new();
        for row in &self.report_rows {
            let _ = writeln!(output, "{}", format_row(row));
        }
        output
    }
}

/// Runs the whole batch pass: load the taxonomy, fold every input into raw
/// counts, warn about taxa missing from the taxonomy, aggregate clade
/// counts, and build the report rows.
///
/// With no `input_paths`, reads standard input. Warnings about unknown
/// taxon-ids go to `diag` (standard error in the CLI).
pub fn build_report<W: Write>(
    taxdb_path: &Path,
    input_paths: &[PathBuf],
    mode: InputMode,
    show_zeros: bool,
    diag: &mut W,
) -> Result<ReportResults, ReportError> {
    // 1. Load the taxonomy
    let taxonomy = parse_taxdb(taxdb_path).map_err(|source| ReportError::Taxonomy {
        path: taxdb_path.to_path_buf(),
        source,
    })?;
    log::info!("Loaded {} taxa from {}", taxonomy.len(), taxdb_path.display());

    // 2. Fold every input into raw counts
    let mut accumulator = CountAccumulator::new();
    if input_paths.is_empty() {
        let stdin = io::stdin();
        accumulator.consume_reader(stdin.lock(), mode)?;
    } else {
        for path in input_paths {
            let reader = open_input(path).map_err(|source| ReportError::Input {
                path: path.clone(),
                source,
            })?;
            accumulator.consume_reader(reader, mode)?;
        }
    }
    // 3. Warn once per taxon-id the taxonomy does not know
    accumulator.report_unknown_taxa(&taxonomy, diag)?;
    log::info!("Counted {} reads", accumulator.seq_count());

    // 4. Aggregate clade counts and build the report rows
    let (raw_counts, seq_count) = accumulator.into_counts();
    let clade_counts = accumulate_clade_counts(&taxonomy, &raw_counts);
    let report_rows = build_report_rows(&taxonomy, &clade_counts, &raw_counts, seq_count, show_zeros);

    Ok(ReportResults {
        report_rows,
        raw_counts,
        clade_counts,
        seq_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_temp(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("kraken_report_rs_{}_{}", std::process::id(), name));
        fs::write(&path, contents).expect("Could not write temp file");
        path
    }

    #[test]
    fn test_build_report_end_to_end() {
        let taxdb = write_temp(
            "taxdb",
            "1\t1\troot\tno rank\n2\t1\tA\tgenus\n3\t1\tB\tgenus\n",
        );
        let input = write_temp("counts", "2\t3\n3\t1\n0\t1\n999\t1\n");

        let mut diag = Vec::new();
        let results = build_report(
            &taxdb,
            &[input.clone()],
            InputMode::TaxonCounts,
            false,
            &mut diag,
        )
        .expect("Report failed");

        fs::remove_file(&taxdb).ok();
        fs::remove_file(&input).ok();

        assert_eq!(results.seq_count, 6);
        assert_eq!(results.clade_counts[&1], 4);
        assert_eq!(
            String::from_utf8(diag).unwrap(),
            "Taxon 999 is not in taxonomy tables - ignoring it.\n"
        );

        let text = results.get_report_text();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], " 16.67\t1\t1\tU\t0\tunclassified");
        assert_eq!(lines[1], " 66.67\t4\t0\t-\t1\troot");
        assert_eq!(lines[2], " 50.00\t3\t3\tG\t2\t  A");
        assert_eq!(lines[3], " 16.67\t1\t1\tG\t3\t  B");
        // The unknown taxon counts toward the denominator but never prints
        assert!(!text.contains("999"));
    }

    #[test]
    fn test_missing_taxdb_is_fatal() {
        let mut diag = Vec::new();
        let err = build_report(
            Path::new("/nonexistent/taxDB"),
            &[],
            InputMode::TaxonCounts,
            false,
            &mut diag,
        )
        .unwrap_err();

        assert!(matches!(err, ReportError::Taxonomy { .. }));
        assert!(err.to_string().contains("/nonexistent/taxDB"));
    }
}
