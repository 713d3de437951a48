// src/report.rs

use std::cmp::Reverse;

use crate::aggregate::CladeCounts;
use crate::counts::RawCounts;
use crate::taxdb::{Taxonomy, ROOT_TAXID, UNCLASSIFIED_TAXID};
use crate::types::ReportRow;

/// Maps a taxonomic rank name to its single-letter report code.
/// Anything outside the fixed vocabulary (including "no rank" and empty)
/// maps to '-'.
pub fn rank_code(rank: &str) -> char {
    match rank {
        "species" => 'S',
        "genus" => 'G',
        "family" => 'F',
        "order" => 'O',
        "class" => 'C',
        "phylum" => 'P',
        "kingdom" => 'K',
        "superkingdom" => 'D',
        _ => '-',
    }
}

/// Builds the report rows: the unclassified bucket first, then a pre-order
/// walk of the forest from the root.
///
/// At every node the children are freshly sorted by descending clade count;
/// ties break on ascending taxon-id (implementation-defined, the upstream
/// tools leave tie order unspecified). A clade with zero reads is skipped
/// together with its whole subtree unless `show_zeros` is set. The
/// unclassified line is emitted regardless of `show_zeros`.
///
/// Percentages are clade reads over `seq_count`; with no input reads at all
/// every percentage is reported as 0.
pub fn build_report_rows(
    taxonomy: &Taxonomy,
    clade_counts: &CladeCounts,
    raw_counts: &RawCounts,
    seq_count: u64,
    show_zeros: bool,
) -> Vec<ReportRow> {
    let pct_of_total = |clade_reads: u64| -> f64 {
        if seq_count == 0 {
            0.0
        } else {
            clade_reads as f64 * 100.0 / seq_count as f64
        }
    };

    let mut rows = Vec::new();

    let unclassified = clade_counts
        .get(&UNCLASSIFIED_TAXID)
        .copied()
        .unwrap_or(0);
    rows.push(ReportRow {
        pct: pct_of_total(unclassified),
        clade_reads: unclassified,
        tax_reads: raw_counts.get(&UNCLASSIFIED_TAXID).copied().unwrap_or(0),
        rank_code: 'U',
        tax_id: UNCLASSIFIED_TAXID,
        tax_name: "unclassified".to_string(),
        depth: 0,
    });

    // Pre-order with an explicit stack; children are pushed in reverse of
    // their sorted order so the most abundant clade pops first.
    let mut work: Vec<(u32, usize)> = vec![(ROOT_TAXID, 0)];
    while let Some((taxid, depth)) = work.pop() {
        let clade_reads = clade_counts.get(&taxid).copied().unwrap_or(0);
        if clade_reads == 0 && !show_zeros {
            continue;
        }

        rows.push(ReportRow {
            pct: pct_of_total(clade_reads),
            clade_reads,
            tax_reads: raw_counts.get(&taxid).copied().unwrap_or(0),
            rank_code: rank_code(taxonomy.rank(taxid).unwrap_or("")),
            tax_id: taxid,
            tax_name: taxonomy.name(taxid).unwrap_or("").to_string(),
            depth,
        });

        let mut kids = taxonomy.children(taxid).to_vec();
        kids.sort_by_key(|&child| {
            (
                Reverse(clade_counts.get(&child).copied().unwrap_or(0)),
                child,
            )
        });
        for &child in kids.iter().rev() {
            work.push((child, depth + 1));
        }
    }

    rows
}

/// Formats one report line: percentage (6 wide, 2 decimals), clade reads,
/// direct reads, rank code, taxon-id, name indented two spaces per depth.
pub fn format_row(row: &ReportRow) -> String {
    let mut indented_name = String::with_capacity(2 * row.depth + row.tax_name.len());
    for _ in 0..row.depth {
        indented_name.push_str("  ");
    }
    indented_name.push_str(&row.tax_name);

    format!(
        "{:6.2}\t{}\t{}\t{}\t{}\t{}",
        row.pct, row.clade_reads, row.tax_reads, row.rank_code, row.tax_id, indented_name
    )
}
