use crate::partonomy::tree::{compress_tree, group_records, grouping_columns, name_grouping_pattern};
use crate::partonomy::types::{HierarchyNode, MatchType, Record, Table};
use indexmap::IndexMap;
use regex::Regex;
use std::sync::OnceLock;

static ID_GROUPING: OnceLock<Regex> = OnceLock::new();
static COUNT_COLUMN: OnceLock<Regex> = OnceLock::new();

fn id_grouping_pattern() -> &'static Regex {
    ID_GROUPING.get_or_init(|| Regex::new(r"^(AS|CT)/[0-9]+/ID$").unwrap())
}

fn count_column_pattern() -> &'static Regex {
    COUNT_COLUMN.get_or_init(|| Regex::new(r"(?i)^AS/[0-9]+/COUNT$").unwrap())
}

impl MatchType {
    /// Level-extraction pattern for the count table. `None` means there is
    /// no usable key space, so no tree is built at all.
    pub(crate) fn grouping_pattern(&self) -> Option<&'static Regex> {
        match self {
            MatchType::ById => Some(id_grouping_pattern()),
            MatchType::ByName => Some(name_grouping_pattern()),
            MatchType::None => None,
        }
    }

    fn identifier_columns(&self) -> &'static [&'static str] {
        match self {
            MatchType::ById => &["CT/1/ID"],
            MatchType::ByName => &["CT/1", "CT/1/LABEL"],
            MatchType::None => &[],
        }
    }
}

/// Flat lookup from a count-tree node key to its aggregated cell count.
/// `None` marks a node whose count could not be established (missing or
/// non-numeric source cell); such nodes are excluded from parent sums
/// rather than coerced to zero. Rebuilt from scratch on every dataset load.
#[derive(Debug, Default)]
pub struct CountIndex {
    counts: IndexMap<String, Option<u64>>,
}

impl CountIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the index from the secondary count table: group + compress a
    /// tree using the match-type key space, then aggregate bottom-up. Every
    /// node key receives exactly one entry; an internal node's count is the
    /// sum of its children's known counts.
    pub fn build(table: &Table, match_type: MatchType) -> CountIndex {
        let mut index = CountIndex::new();
        let Some(pattern) = match_type.grouping_pattern() else {
            return index;
        };

        let levels = grouping_columns(&table.columns, pattern);
        let tree = compress_tree(group_records(table.records.clone(), &levels));
        let count_column = table
            .columns
            .iter()
            .find(|c| count_column_pattern().is_match(c))
            .cloned();

        if let HierarchyNode::Internal { children } = &tree {
            for (key, child) in children {
                index.aggregate(key, child, count_column.as_deref());
            }
        }
        index
    }

    fn aggregate(
        &mut self,
        key: &str,
        node: &HierarchyNode,
        count_column: Option<&str>,
    ) -> Option<u64> {
        let total = match node {
            HierarchyNode::Leaf { records } => records
                .first()
                .and_then(|record| count_column.and_then(|c| record.get(c)))
                .and_then(|value| value.trim().parse::<u64>().ok()),
            HierarchyNode::Internal { children } => {
                let mut sum: Option<u64> = None;
                for (child_key, child) in children {
                    if let Some(count) = self.aggregate(child_key, child, count_column) {
                        sum = Some(sum.unwrap_or(0) + count);
                    }
                }
                sum
            }
        };
        self.counts.insert(key.to_string(), total);
        total
    }

    /// Finds the index key matching a structural-tree record, trying the
    /// match-type's identifier columns in order. Comparison is
    /// case-insensitive exact equality, never tree-path comparison.
    /// No match is reported as unavailable, not as an error.
    pub fn join(&self, record: &Record, match_type: MatchType) -> Option<&str> {
        for column in match_type.identifier_columns() {
            let Some(value) = record.get(*column) else {
                continue;
            };
            if value.trim().is_empty() {
                continue;
            }
            let wanted = value.to_lowercase();
            if let Some(key) = self.counts.keys().find(|k| k.to_lowercase() == wanted) {
                return Some(key);
            }
        }
        None
    }

    /// Aggregated count for a key; `None` for unknown keys and for keys
    /// whose count is unavailable.
    pub fn get(&self, key: &str) -> Option<u64> {
        self.counts.get(key).copied().flatten()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.counts.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn known_counts(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counts
            .iter()
            .filter_map(|(key, count)| count.map(|c| (key.as_str(), c)))
    }
}
