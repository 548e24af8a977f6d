use crate::partonomy::classify::{is_cell_type_node, is_ftu_node};
use crate::partonomy::counts::CountIndex;
use crate::partonomy::node_value;
use crate::partonomy::tree::collect_leaves;
use crate::partonomy::types::{HierarchyNode, PipelineSettings};
use indexmap::IndexSet;

/// One representative node chosen by a labeling method, with the value the
/// method ranked it by. Paths run from the tree root's children down to the
/// node itself.
#[derive(Debug, Clone)]
pub struct SelectedNode {
    pub path: Vec<String>,
    pub label: String,
    pub value: f64,
}

fn leaves_of<'a>(root: &'a HierarchyNode) -> Vec<(Vec<String>, &'a HierarchyNode)> {
    let mut out = Vec::new();
    let mut path = Vec::new();
    collect_leaves(root, &mut path, &mut out);
    out
}

/// Ranks cell-type leaves by value and keeps the top N, extending past the
/// configured count through any leaves tied with the N-th value so a tie is
/// never truncated mid-group. FTU leaves are excluded unless full-subtree
/// mode left their structure intact; values at or below the minimum visible
/// size never qualify.
pub fn top_n_leaves(
    root: &HierarchyNode,
    counts: &CountIndex,
    settings: &PipelineSettings,
) -> Vec<SelectedNode> {
    let mut ranked: Vec<SelectedNode> = leaves_of(root)
        .into_iter()
        .filter_map(|(path, node)| {
            let label = path.last().cloned().unwrap_or_default();
            if !is_cell_type_node(&label, node, settings.cell_type_match) {
                return None;
            }
            if !settings.full_ftu_subtree && is_ftu_node(node, &settings.ftu_columns) {
                return None;
            }
            let value = node_value(node, counts, settings);
            (value > settings.circle_radius).then_some(SelectedNode { path, label, value })
        })
        .collect();
    ranked.sort_by(|a, b| b.value.total_cmp(&a.value));

    let mut labels: IndexSet<String> = IndexSet::new();
    let mut selected = Vec::new();
    let mut last_value = f64::MAX;
    for leaf in ranked {
        if labels.len() >= settings.top_n_leaves_count && leaf.value < last_value {
            break;
        }
        labels.insert(leaf.label.clone());
        last_value = leaf.value;
        selected.push(leaf);
    }
    selected
}

/// Collects parents of cell-type leaves, keeps only the innermost candidate
/// of each ancestor chain, and retains those with at least the configured
/// number of children. Candidate order is first-seen leaf order; the
/// reported value is the candidate's child count.
pub fn large_clusters(
    root: &HierarchyNode,
    settings: &PipelineSettings,
) -> Vec<SelectedNode> {
    let mut candidates: IndexSet<Vec<String>> = IndexSet::new();
    for (path, node) in leaves_of(root) {
        let label = path.last().map(String::as_str).unwrap_or("");
        if is_cell_type_node(label, node, settings.cell_type_match) {
            candidates.insert(path[..path.len().saturating_sub(1)].to_vec());
        }
    }

    let mut selected = Vec::new();
    for parent_path in &candidates {
        let Some(children) = root.get(parent_path).and_then(HierarchyNode::children) else {
            continue;
        };
        // Skip a parent whose own child is already a candidate: only the
        // innermost grouping node of a chain is kept.
        let child_is_candidate = children.keys().any(|key| {
            let mut child_path = parent_path.clone();
            child_path.push(key.clone());
            candidates.contains(&child_path)
        });
        if child_is_candidate {
            continue;
        }
        if children.len() >= settings.large_cluster_size {
            selected.push(SelectedNode {
                path: parent_path.clone(),
                label: parent_path.last().cloned().unwrap_or_default(),
                value: children.len() as f64,
            });
        }
    }
    selected
}

/// Finds the largest FTU clusters top-down: a branch stops descending the
/// instant a node qualifies, so FTU nodes nested beneath a selected one are
/// never reported separately.
pub fn ftu_nodes(
    root: &HierarchyNode,
    counts: &CountIndex,
    settings: &PipelineSettings,
) -> Vec<SelectedNode> {
    let mut selected = Vec::new();
    let mut path = Vec::new();
    if let Some(children) = root.children() {
        for (key, child) in children {
            path.push(key.clone());
            visit_ftu(child, &mut path, counts, settings, &mut selected);
            path.pop();
        }
    }
    selected
}

fn visit_ftu(
    node: &HierarchyNode,
    path: &mut Vec<String>,
    counts: &CountIndex,
    settings: &PipelineSettings,
    out: &mut Vec<SelectedNode>,
) {
    if is_ftu_node(node, &settings.ftu_columns) {
        out.push(SelectedNode {
            path: path.clone(),
            label: path.last().cloned().unwrap_or_default(),
            value: node_value(node, counts, settings),
        });
        return;
    }
    if let Some(children) = node.children() {
        for (key, child) in children {
            path.push(key.clone());
            visit_ftu(child, path, counts, settings, out);
            path.pop();
        }
    }
}
