// src/aggregate.rs

use ahash::AHashMap;

use crate::counts::RawCounts;
use crate::taxdb::{Taxonomy, ROOT_TAXID, UNCLASSIFIED_TAXID};

/// taxid -> reads in the taxon plus all of its descendants.
pub type CladeCounts = AHashMap<u32, u64>;

/// Computes clade counts for every taxon reachable from the root:
/// clade(n) = raw(n) + sum of clade(child) over n's children.
///
/// Post-order over an explicit work list, so taxonomy height never touches
/// the call stack. Taxon 0 sits outside the forest and keeps its raw count
/// as its clade count. After the traversal every taxon in the name map that
/// gathered no reads is normalized to 0, so reporting can treat absent and
/// zero identically.
///
/// A taxonomy with a real cycle (beyond the root self-loop stripped at
/// load) makes the work list grow without bound; input is trusted here.
pub fn accumulate_clade_counts(taxonomy: &Taxonomy, raw_counts: &RawCounts) -> CladeCounts {
    let mut clade_counts = CladeCounts::with_capacity(taxonomy.len());

    // (taxid, children_done): a node is summed when it reappears after
    // all of its children have been finished.
    let mut work: Vec<(u32, bool)> = vec![(ROOT_TAXID, false)];
    while let Some((taxid, children_done)) = work.pop() {
        if children_done {
            let mut total = raw_counts.get(&taxid).copied().unwrap_or(0);
            for child in taxonomy.children(taxid) {
                total += clade_counts.get(child).copied().unwrap_or(0);
            }
            clade_counts.insert(taxid, total);
        } else {
            work.push((taxid, true));
            for &child in taxonomy.children(taxid) {
                work.push((child, false));
            }
        }
    }

    // Unclassified bucket: no children by construction
    if let Some(&count) = raw_counts.get(&UNCLASSIFIED_TAXID) {
        clade_counts.insert(UNCLASSIFIED_TAXID, count);
    }

    for taxid in taxonomy.taxids() {
        clade_counts.entry(taxid).or_insert(0);
    }

    clade_counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taxdb::parse_taxdb_reader;
    use std::io::Cursor;

    fn sample_taxonomy() -> Taxonomy {
        parse_taxdb_reader(Cursor::new(
            "1\t1\troot\tno rank\n\
             2\t1\tBacteria\tsuperkingdom\n\
             561\t2\tEscherichia\tgenus\n\
             562\t561\tEscherichia coli\tspecies\n\
             620\t2\tShigella\tgenus\n",
        ))
        .unwrap()
    }

    #[test]
    fn test_clade_count_invariant_bottom_up() {
        let taxonomy = sample_taxonomy();
        let mut raw = RawCounts::new();
        raw.insert(562, 10);
        raw.insert(561, 2);
        raw.insert(620, 5);
        raw.insert(2, 1);

        let clade = accumulate_clade_counts(&taxonomy, &raw);

        // Verify clade(n) = raw(n) + sum(clade(children)) at every node
        for taxid in taxonomy.taxids() {
            let expected = raw.get(&taxid).copied().unwrap_or(0)
                + taxonomy
                    .children(taxid)
                    .iter()
                    .map(|c| clade[c])
                    .sum::<u64>();
            assert_eq!(clade[&taxid], expected, "invariant broken at taxon {}", taxid);
        }

        assert_eq!(clade[&562], 10);
        assert_eq!(clade[&561], 12);
        assert_eq!(clade[&2], 18);
        assert_eq!(clade[&1], 18);
    }

    #[test]
    fn test_taxa_without_reads_normalize_to_zero() {
        let taxonomy = sample_taxonomy();
        let mut raw = RawCounts::new();
        raw.insert(562, 4);

        let clade = accumulate_clade_counts(&taxonomy, &raw);

        assert_eq!(clade.get(&620), Some(&0));
        for taxid in taxonomy.taxids() {
            assert!(clade.contains_key(&taxid), "taxon {} missing", taxid);
        }
    }

    #[test]
    fn test_unclassified_keeps_raw_count() {
        let taxonomy = sample_taxonomy();
        let mut raw = RawCounts::new();
        raw.insert(0, 7);
        raw.insert(562, 1);

        let clade = accumulate_clade_counts(&taxonomy, &raw);

        assert_eq!(clade.get(&0), Some(&7));
        // Taxon 0 never contributes to the root's clade
        assert_eq!(clade[&1], 1);
    }

    #[test]
    fn test_aggregation_is_idempotent() {
        let taxonomy = sample_taxonomy();
        let mut raw = RawCounts::new();
        raw.insert(562, 3);
        raw.insert(620, 9);

        let first = accumulate_clade_counts(&taxonomy, &raw);
        let second = accumulate_clade_counts(&taxonomy, &raw);
        assert_eq!(first, second);
    }

    #[test]
    fn test_very_deep_chain_does_not_overflow_stack() {
        // Path taxonomy of 200k nodes: 1 <- 2 <- 3 <- ... <- 200000
        let depth: u32 = 200_000;
        let mut taxonomy = Taxonomy::default();
        taxonomy.name_map.insert(1, "root".to_string());
        taxonomy.rank_map.insert(1, "no rank".to_string());
        for taxid in 2..=depth {
            taxonomy.name_map.insert(taxid, format!("node {}", taxid));
            taxonomy.rank_map.insert(taxid, String::new());
            taxonomy.child_map.entry(taxid - 1).or_default().push(taxid);
        }

        let mut raw = RawCounts::new();
        raw.insert(depth, 1);

        let clade = accumulate_clade_counts(&taxonomy, &raw);
        assert_eq!(clade[&1], 1);
        assert_eq!(clade[&depth], 1);
    }
}
