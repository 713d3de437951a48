// src/input.rs

use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// How raw input lines are turned into (taxon-id, increment) pairs.
///
/// The accumulator is written once against `taxon_increments`; it never
/// needs to know which mode is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    /// Per-read classifier output: the third tab-separated column is the
    /// assigned taxon-id, one read per line.
    #[default]
    ReadOutput,
    /// `taxID [count]` per line, whitespace-separated; count defaults to 1.
    TaxonCounts,
    /// Whitespace-separated taxon-ids per line, each worth one read.
    TaxonList,
}

impl InputMode {
    /// Extracts the (taxon-id, increment) pairs one input line contributes.
    /// Lines and tokens that do not parse are skipped.
    pub fn taxon_increments(&self, line: &str, pairs: &mut Vec<(u32, u64)>) {
        match self {
            InputMode::ReadOutput => {
                if let Some(taxid) = line
                    .split('\t')
                    .nth(2)
                    .and_then(|field| field.trim().parse::<u32>().ok())
                {
                    pairs.push((taxid, 1));
                }
            }
            InputMode::TaxonCounts => {
                let mut fields = line.split_whitespace();
                let taxid = fields.next().and_then(|f| f.parse::<u32>().ok());
                if let Some(taxid) = taxid {
                    let count = fields
                        .next()
                        .and_then(|f| f.parse::<u64>().ok())
                        .unwrap_or(1);
                    pairs.push((taxid, count));
                }
            }
            InputMode::TaxonList => {
                for field in line.split_whitespace() {
                    if let Ok(taxid) = field.parse::<u32>() {
                        pairs.push((taxid, 1));
                    }
                }
            }
        }
    }
}

/// Opens a classification output file for reading, transparently
/// decompressing `.gz` files.
pub fn open_input<P: AsRef<Path>>(path: P) -> io::Result<Box<dyn BufRead>> {
    let path = path.as_ref();
    let file = File::open(path)?;
    if path.extension().is_some_and(|ext| ext == "gz") {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}
