use crate::partonomy::classify::is_ftu_node;
use crate::partonomy::types::{HierarchyNode, PipelineSettings, Record};
use indexmap::IndexMap;
use regex::Regex;
use std::sync::OnceLock;

static NAME_GROUPING: OnceLock<Regex> = OnceLock::new();

/// Columns that shape the structural tree: bare `AS/{n}` and `CT/{n}`.
/// Suffixed variants (`ID`, `LABEL`, `COUNT`) stay in the records but do not
/// participate in grouping.
pub fn name_grouping_pattern() -> &'static Regex {
    NAME_GROUPING.get_or_init(|| Regex::new(r"^(AS|CT)/[0-9]+$").unwrap())
}

fn level_key(column: &str) -> (&str, u32) {
    let mut parts = column.split('/');
    let domain = parts.next().unwrap_or("");
    let level = parts.next().and_then(|l| l.parse().ok()).unwrap_or(0);
    (domain, level)
}

/// Extracts and orders the hierarchy-defining columns of a table schema.
/// Ordering is domain-lexicographic, then level-numeric (AS/1..AS/n before
/// CT/1..CT/n), regardless of the raw column order. An empty result is a
/// valid state for count-only or malformed tables.
pub fn grouping_columns(columns: &[String], pattern: &Regex) -> Vec<String> {
    let mut grouping: Vec<&String> = columns.iter().filter(|c| pattern.is_match(c)).collect();
    // sort_by is stable, so equal keys keep schema order
    grouping.sort_by(|a, b| level_key(a).cmp(&level_key(b)));
    grouping.into_iter().cloned().collect()
}

/// Groups flat records into a nested tree following the ordered levels.
/// Buckets keep first-seen key order; a blank level cell groups under the
/// empty-string key rather than dropping the row. With no levels the whole
/// input becomes a single leaf (the degenerate schema-mismatch tree).
pub fn group_records(records: Vec<Record>, levels: &[String]) -> HierarchyNode {
    let Some((first, rest)) = levels.split_first() else {
        return HierarchyNode::Leaf { records };
    };

    let mut buckets: IndexMap<String, Vec<Record>> = IndexMap::new();
    for record in records {
        let key = record.get(first).cloned().unwrap_or_default();
        buckets.entry(key).or_default().push(record);
    }

    let children = buckets
        .into_iter()
        .map(|(key, bucket)| (key, group_records(bucket, rest)))
        .collect();
    HierarchyNode::Internal { children }
}

/// Removes the indirection introduced by empty-label grouping. Two rules,
/// applied bottom-up and repeated until a fixpoint:
/// - children of an internal node keyed `""` are hoisted into its parent
///   (an empty-keyed grandchild lands back on the `""` slot instead of
///   being discarded);
/// - a node whose only child is keyed `""` is replaced by that child's value.
/// Safe to call on an already-compressed tree.
pub fn compress_tree(mut node: HierarchyNode) -> HierarchyNode {
    loop {
        let (next, changed) = compress_pass(node);
        node = next;
        if !changed {
            return node;
        }
    }
}

fn compress_pass(node: HierarchyNode) -> (HierarchyNode, bool) {
    let HierarchyNode::Internal { children } = node else {
        return (node, false);
    };

    let mut compressed: IndexMap<String, HierarchyNode> = IndexMap::new();
    let mut changed = false;
    for (key, child) in children {
        let (child, child_changed) = compress_pass(child);
        changed |= child_changed;
        match child {
            HierarchyNode::Internal { children: grand } if key.is_empty() => {
                // Hoist: the grandchildren adopt this slot's parent. A
                // grandchild itself keyed "" re-occupies the "" slot and is
                // resolved on the next pass. A hoisted key colliding with an
                // existing sibling merges into it so no record is dropped.
                for (grand_key, grand_child) in grand {
                    insert_merged(&mut compressed, grand_key, grand_child);
                }
                changed = true;
            }
            HierarchyNode::Internal {
                children: mut grand,
            } if grand.len() == 1 && grand.contains_key("") => {
                if let Some(only) = grand.shift_remove("") {
                    compressed.insert(key, only);
                    changed = true;
                }
            }
            other => {
                compressed.insert(key, other);
            }
        }
    }
    (HierarchyNode::Internal { children: compressed }, changed)
}

fn insert_merged(
    map: &mut IndexMap<String, HierarchyNode>,
    key: String,
    node: HierarchyNode,
) {
    if let Some(slot) = map.get_mut(&key) {
        let existing = std::mem::replace(
            slot,
            HierarchyNode::Leaf {
                records: Vec::new(),
            },
        );
        *slot = merge_nodes(existing, node);
    } else {
        map.insert(key, node);
    }
}

fn merge_nodes(a: HierarchyNode, b: HierarchyNode) -> HierarchyNode {
    match (a, b) {
        (
            HierarchyNode::Internal { children: mut left },
            HierarchyNode::Internal { children: right },
        ) => {
            for (key, child) in right {
                insert_merged(&mut left, key, child);
            }
            HierarchyNode::Internal { children: left }
        }
        (
            HierarchyNode::Leaf { mut records },
            HierarchyNode::Leaf { records: more },
        ) => {
            records.extend(more);
            HierarchyNode::Leaf { records }
        }
        // Mixed shapes: the stray leaf's records group under the internal
        // node's empty-label slot, to be compressed on a later pass.
        (HierarchyNode::Internal { mut children }, leaf @ HierarchyNode::Leaf { .. })
        | (leaf @ HierarchyNode::Leaf { .. }, HierarchyNode::Internal { mut children }) => {
            insert_merged(&mut children, String::new(), leaf);
            HierarchyNode::Internal { children }
        }
    }
}

/// Collapses every FTU-classified subtree into a single flat leaf holding
/// all records originally reachable beneath it. Top-down: a node is pruned
/// as soon as it qualifies, so nested FTU nodes below it are never evaluated
/// separately. One-way within a pipeline run.
pub fn prune_ftu_subtrees(node: &mut HierarchyNode, settings: &PipelineSettings) {
    let HierarchyNode::Internal { children } = node else {
        return;
    };
    for (_, child) in children.iter_mut() {
        if is_ftu_node(child, &settings.ftu_columns) {
            let taken = std::mem::replace(
                child,
                HierarchyNode::Leaf {
                    records: Vec::new(),
                },
            );
            *child = HierarchyNode::Leaf {
                records: taken.into_records(),
            };
        } else {
            prune_ftu_subtrees(child, settings);
        }
    }
}

/// Enumerates leaves depth-first with their full label paths.
pub fn collect_leaves<'a>(
    node: &'a HierarchyNode,
    path: &mut Vec<String>,
    out: &mut Vec<(Vec<String>, &'a HierarchyNode)>,
) {
    match node {
        HierarchyNode::Leaf { .. } => out.push((path.clone(), node)),
        HierarchyNode::Internal { children } => {
            for (key, child) in children {
                path.push(key.clone());
                collect_leaves(child, path, out);
                path.pop();
            }
        }
    }
}
