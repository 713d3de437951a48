//src/taxdb.rs

use ahash::AHashMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

pub type NameMap = AHashMap<u32, String>;
pub type RankMap = AHashMap<u32, String>;
pub type ChildMap = AHashMap<u32, Vec<u32>>;

/// Effective root of the taxonomy forest.
pub const ROOT_TAXID: u32 = 1;

/// Synthetic bucket for reads with no assigned taxon; lives outside the forest.
pub const UNCLASSIFIED_TAXID: u32 = 0;

/// The loaded taxonomy: names, ranks, and the parent -> children adjacency.
/// Built once from a taxDB file and read-only afterwards.
#[derive(Debug, Default)]
pub struct Taxonomy {
    pub name_map: NameMap,
    pub rank_map: RankMap,
    pub child_map: ChildMap,
}

impl Taxonomy {
    pub fn contains(&self, taxid: u32) -> bool {
        self.name_map.contains_key(&taxid)
    }

    pub fn name(&self, taxid: u32) -> Option<&str> {
        self.name_map.get(&taxid).map(String::as_str)
    }

    pub fn rank(&self, taxid: u32) -> Option<&str> {
        self.rank_map.get(&taxid).map(String::as_str)
    }

    /// Children in taxDB load order. Empty slice for leaves and unknown ids.
    pub fn children(&self, taxid: u32) -> &[u32] {
        self.child_map
            .get(&taxid)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// All taxon-ids present in the name map, in arbitrary order.
    pub fn taxids(&self) -> impl Iterator<Item = u32> + '_ {
        self.name_map.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.name_map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.name_map.is_empty()
    }
}

/// Parses a taxDB file in the format:
/// ```text
/// <taxid>\t<parentid>\t<taxname>\t<rank>
/// ```
/// Trailing fields beyond the fourth are ignored. Child lists keep the
/// order taxa appear in the file. A record whose parent-id equals its own
/// taxid is kept but not linked as a child of itself, so the root does not
/// become its own descendant.
pub fn parse_taxdb<P: AsRef<Path>>(filepath: P) -> io::Result<Taxonomy> {
    let file = File::open(filepath)?;
    parse_taxdb_reader(BufReader::new(file))
}

/// Same as [`parse_taxdb`] but over any buffered reader.
pub fn parse_taxdb_reader<R: BufRead>(reader: R) -> io::Result<Taxonomy> {
    let mut taxonomy = Taxonomy::default();

    for line_result in reader.lines() {
        let line = line_result?;
        // Expecting 4 tab-separated fields: taxid, parentid, taxname, rank
        // e.g. "2   1   Bacteria    superkingdom"
        let parts: Vec<&str> = line.split('\t').collect();

        // Skip malformed lines
        if parts.len() < 4 {
            continue;
        }

        let taxid_str = parts[0].trim();
        let parentid_str = parts[1].trim();
        let taxname_str = parts[2].trim();
        let rank_str = parts[3].trim();

        let taxid: u32 = taxid_str.parse().unwrap_or(0);
        let parentid: u32 = parentid_str.parse().unwrap_or(0);

        if taxid != 0 {
            taxonomy.name_map.insert(taxid, taxname_str.to_string());
            taxonomy.rank_map.insert(taxid, rank_str.to_string());
            // Self-loop guard: the root lists itself as its own parent
            if parentid != taxid {
                taxonomy.child_map.entry(parentid).or_default().push(taxid);
            }
        }
    }
    Ok(taxonomy)
}
