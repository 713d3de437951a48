// src/counts.rs

use ahash::AHashMap;
use std::io::{self, BufRead, Write};

use crate::input::InputMode;
use crate::taxdb::{Taxonomy, UNCLASSIFIED_TAXID};

/// taxid -> reads assigned directly to that exact taxon.
pub type RawCounts = AHashMap<u32, u64>;

/// Folds (taxon-id, increment) pairs from whichever input mode is active
/// into raw per-taxon counts and the total read count.
#[derive(Debug, Default)]
pub struct CountAccumulator {
    raw_counts: RawCounts,
    seq_count: u64,
}

impl CountAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `increment` reads directly assigned to `taxid`.
    pub fn add(&mut self, taxid: u32, increment: u64) {
        *self.raw_counts.entry(taxid).or_insert(0) += increment;
        self.seq_count += increment;
    }

    /// Consumes every line of `reader`, folding the pairs the active mode
    /// extracts from each line.
    pub fn consume_reader<R: BufRead>(&mut self, reader: R, mode: InputMode) -> io::Result<()> {
        let mut pairs = Vec::new();
        for line_result in reader.lines() {
            let line = line_result?;
            pairs.clear();
            mode.taxon_increments(&line, &mut pairs);
            for &(taxid, increment) in &pairs {
                self.add(taxid, increment);
            }
        }
        Ok(())
    }

    pub fn raw_counts(&self) -> &RawCounts {
        &self.raw_counts
    }

    /// Total reads consumed, including unclassified and unrecognized taxa.
    pub fn seq_count(&self) -> u64 {
        self.seq_count
    }

    /// Writes one warning per accumulated taxon-id that is absent from the
    /// taxonomy's name map. Runs over the final counts, so each offending
    /// id is reported once no matter how often it occurred. Taxon 0 is the
    /// unclassified bucket and is never warned about.
    pub fn report_unknown_taxa<W: Write>(
        &self,
        taxonomy: &Taxonomy,
        diag: &mut W,
    ) -> io::Result<()> {
        let mut unknown: Vec<u32> = self
            .raw_counts
            .keys()
            .copied()
            .filter(|&taxid| taxid != UNCLASSIFIED_TAXID && !taxonomy.contains(taxid))
            .collect();
        unknown.sort_unstable();

        for taxid in unknown {
            writeln!(diag, "Taxon {} is not in taxonomy tables - ignoring it.", taxid)?;
        }
        Ok(())
    }

    pub fn into_counts(self) -> (RawCounts, u64) {
        (self.raw_counts, self.seq_count)
    }
}
