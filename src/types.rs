//src/types.rs

/// A structured representation of one row in the abundance report.
/// For example:
///  %  cladeReads  taxReads  rankCode  taxID  name
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    /// Clade reads as a percentage of all input reads.
    pub pct: f64,
    /// Reads in this taxon plus all descendants.
    pub clade_reads: u64,
    /// Reads assigned directly to this taxon.
    pub tax_reads: u64,
    /// Single-letter rank code ('S', 'G', ..., 'U' for unclassified, '-' otherwise).
    pub rank_code: char,
    pub tax_id: u32,
    pub tax_name: String,
    /// Tree depth, used for indentation (two spaces per level).
    pub depth: usize,
}
