use crate::partonomy::types::{CellTypeMatch, HierarchyNode, Record};
use regex::Regex;
use std::sync::OnceLock;

static CT_LEVEL: OnceLock<Regex> = OnceLock::new();

fn ct_level_pattern() -> &'static Regex {
    CT_LEVEL.get_or_init(|| Regex::new(r"^CT/[0-9]+$").unwrap())
}

fn is_flag_set(record: &Record, columns: &[String]) -> bool {
    columns
        .iter()
        .any(|column| record.get(column).is_some_and(|v| !v.trim().is_empty()))
}

/// True iff every record reachable under the node carries a non-blank value
/// in at least one of the configured FTU flag columns. The flag column name
/// varied across table revisions, hence the configurable set.
pub fn is_ftu_node(node: &HierarchyNode, ftu_columns: &[String]) -> bool {
    let mut records = Vec::new();
    node.collect_records(&mut records);
    records
        .iter()
        .all(|record| is_flag_set(record, ftu_columns))
}

/// True iff the node is a leaf whose grouping key equals a cell-type
/// identifier column of its first record. `FirstLevel` checks only `CT/1`;
/// `AnyLevel` tolerates cell types anchored at deeper levels by checking
/// every `CT/{n}` column.
pub fn is_cell_type_node(key: &str, node: &HierarchyNode, strictness: CellTypeMatch) -> bool {
    let HierarchyNode::Leaf { records } = node else {
        return false;
    };
    let Some(first) = records.first() else {
        return false;
    };
    match strictness {
        CellTypeMatch::FirstLevel => first.get("CT/1").is_some_and(|v| v == key),
        CellTypeMatch::AnyLevel => first
            .iter()
            .any(|(column, value)| ct_level_pattern().is_match(column) && value == key),
    }
}
