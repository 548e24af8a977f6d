use partonomy_tools::partonomy::tree::{
    collect_leaves, compress_tree, group_records, grouping_columns, name_grouping_pattern,
    prune_ftu_subtrees,
};
use partonomy_tools::partonomy::{HierarchyNode, PipelineSettings, Record};

fn record(pairs: &[(&str, &str)]) -> Record {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn columns(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

fn child_keys(node: &HierarchyNode) -> Vec<String> {
    node.children()
        .map(|children| children.keys().cloned().collect())
        .unwrap_or_default()
}

fn flattened_records(node: &HierarchyNode) -> Vec<Record> {
    let mut refs = Vec::new();
    node.collect_records(&mut refs);
    let mut owned: Vec<Record> = refs.into_iter().cloned().collect();
    owned.sort_by_key(|r| format!("{r:?}"));
    owned
}

#[test]
fn grouping_columns_order_by_domain_then_level() {
    // Raw schema order deliberately scrambled; grouping order must not
    // depend on it.
    let schema = columns(&["CT/2", "AS/10", "CT/1", "AS/2", "AS/1", "CT/1/ID", "AS/1/LABEL"]);
    let levels = grouping_columns(&schema, name_grouping_pattern());
    assert_eq!(levels, columns(&["AS/1", "AS/2", "AS/10", "CT/1", "CT/2"]));
}

#[test]
fn sibling_order_follows_first_occurrence() {
    let rows = vec![
        record(&[("AS/1", "Medulla")]),
        record(&[("AS/1", "Cortex")]),
        record(&[("AS/1", "Medulla")]),
        record(&[("AS/1", "Pelvis")]),
    ];
    let tree = group_records(rows, &columns(&["AS/1"]));
    assert_eq!(child_keys(&tree), vec!["Medulla", "Cortex", "Pelvis"]);
}

#[test]
fn blank_level_cells_group_under_empty_key() {
    let rows = vec![
        record(&[("AS/1", "Kidney"), ("AS/2", "")]),
        record(&[("AS/1", "Kidney"), ("AS/2", "Cortex")]),
    ];
    let tree = group_records(rows, &columns(&["AS/1", "AS/2"]));
    let kidney = tree.get(&["Kidney".to_string()]).unwrap();
    assert_eq!(child_keys(kidney), vec!["", "Cortex"]);
    assert_eq!(tree.record_count(), 2);
}

#[test]
fn no_grouping_columns_yield_single_leaf() {
    let rows = vec![record(&[("foo", "1")]), record(&[("foo", "2")])];
    let levels = grouping_columns(&columns(&["foo", "bar"]), name_grouping_pattern());
    assert!(levels.is_empty());
    let tree = group_records(rows, &levels);
    assert!(tree.is_leaf());
    assert_eq!(tree.record_count(), 2);
}

#[test]
fn compression_hoists_empty_label_children() {
    let rows = vec![
        record(&[("AS/1", "Kidney"), ("AS/2", ""), ("CT/1", "Podocyte")]),
        record(&[("AS/1", "Kidney"), ("AS/2", ""), ("CT/1", "Mesangial Cell")]),
    ];
    let levels = columns(&["AS/1", "AS/2", "CT/1"]);
    let tree = compress_tree(group_records(rows, &levels));

    let kidney = tree.get(&["Kidney".to_string()]).unwrap();
    assert_eq!(child_keys(kidney), vec!["Podocyte", "Mesangial Cell"]);
}

#[test]
fn compression_collapses_single_empty_child_chains() {
    // A record blank at the trailing CT level leaves its AS node holding a
    // lone ""-keyed leaf; the node should adopt the leaf value directly.
    let rows = vec![record(&[("AS/1", "Kidney"), ("CT/1", "")])];
    let tree = compress_tree(group_records(rows, &columns(&["AS/1", "CT/1"])));
    let kidney = tree.get(&["Kidney".to_string()]).unwrap();
    assert!(kidney.is_leaf());
    assert_eq!(kidney.record_count(), 1);
}

#[test]
fn compression_is_idempotent() {
    let rows = vec![
        record(&[("AS/1", "Kidney"), ("AS/2", ""), ("AS/3", ""), ("CT/1", "Podocyte")]),
        record(&[("AS/1", "Kidney"), ("AS/2", "Cortex"), ("AS/3", ""), ("CT/1", "")]),
        record(&[("AS/1", ""), ("AS/2", ""), ("AS/3", "Stroma"), ("CT/1", "Fibroblast")]),
    ];
    let levels = columns(&["AS/1", "AS/2", "AS/3", "CT/1"]);
    let once = compress_tree(group_records(rows, &levels));
    let twice = compress_tree(once.clone());
    assert_eq!(once, twice);
}

#[test]
fn compression_preserves_every_record() {
    let rows = vec![
        record(&[("AS/1", "Kidney"), ("AS/2", ""), ("CT/1", "Podocyte")]),
        record(&[("AS/1", "Kidney"), ("AS/2", "Cortex"), ("CT/1", "")]),
        record(&[("AS/1", ""), ("AS/2", ""), ("CT/1", "Fibroblast")]),
        record(&[("AS/1", ""), ("AS/2", "Hilum"), ("CT/1", "")]),
    ];
    let levels = columns(&["AS/1", "AS/2", "CT/1"]);
    let built = group_records(rows, &levels);
    let before = flattened_records(&built);
    let compressed = compress_tree(built);
    assert_eq!(before, flattened_records(&compressed));
}

#[test]
fn hoisted_key_collision_merges_instead_of_dropping() {
    // "Cortex" exists both as a direct child and beneath an empty-label
    // group; hoisting must merge the two, not overwrite one.
    let rows = vec![
        record(&[("AS/1", "Kidney"), ("AS/2", "Cortex"), ("CT/1", "Podocyte")]),
        record(&[("AS/1", "Kidney"), ("AS/2", ""), ("AS/3", "Cortex")]),
    ];
    // Force the collision by grouping "" at the same depth as "Cortex".
    let built = group_records(
        vec![
            record(&[("L/1", "Cortex"), ("who", "direct")]),
            record(&[("L/1", ""), ("L/2", "Cortex"), ("who", "hoisted")]),
        ],
        &columns(&["L/1", "L/2"]),
    );
    let compressed = compress_tree(built);
    assert_eq!(compressed.record_count(), 2);

    let built = group_records(rows, &columns(&["AS/1", "AS/2", "AS/3"]));
    let compressed = compress_tree(built);
    assert_eq!(compressed.record_count(), 2);
}

#[test]
fn pruning_flattens_ftu_subtrees_and_keeps_records() {
    let rows = vec![
        record(&[("AS/1", "Kidney"), ("AS/2", "Nephron"), ("CT/1", "Podocyte"), ("FTU", "y")]),
        record(&[("AS/1", "Kidney"), ("AS/2", "Nephron"), ("CT/1", "Mesangial Cell"), ("FTU", "y")]),
        record(&[("AS/1", "Kidney"), ("AS/2", "Cortex"), ("CT/1", "Fibroblast"), ("FTU", "")]),
    ];
    let levels = columns(&["AS/1", "AS/2", "CT/1"]);
    let mut tree = compress_tree(group_records(rows, &levels));
    let settings = PipelineSettings::default();
    prune_ftu_subtrees(&mut tree, &settings);

    let nephron = tree
        .get(&["Kidney".to_string(), "Nephron".to_string()])
        .unwrap();
    assert!(nephron.is_leaf(), "FTU subtree should collapse into a leaf");
    assert_eq!(nephron.record_count(), 2);

    let cortex = tree
        .get(&["Kidney".to_string(), "Cortex".to_string()])
        .unwrap();
    assert!(!cortex.is_leaf(), "non-FTU subtree keeps its structure");
    assert_eq!(tree.record_count(), 3);
}

#[test]
fn pruning_stops_at_the_topmost_qualifying_node() {
    // Both Nephron and its nested Glomerulus qualify; only the outer node
    // is pruned, taking the inner structure with it.
    let rows = vec![
        record(&[("AS/1", "Kidney"), ("AS/2", "Nephron"), ("AS/3", "Glomerulus"), ("CT/1", "Podocyte"), ("FTU", "y")]),
        record(&[("AS/1", "Kidney"), ("AS/2", "Nephron"), ("AS/3", "Tubule"), ("CT/1", "Principal Cell"), ("FTU", "y")]),
    ];
    let levels = columns(&["AS/1", "AS/2", "AS/3", "CT/1"]);
    let mut tree = compress_tree(group_records(rows, &levels));
    prune_ftu_subtrees(&mut tree, &PipelineSettings::default());

    let mut leaves = Vec::new();
    let mut path = Vec::new();
    collect_leaves(&tree, &mut path, &mut leaves);
    assert_eq!(leaves.len(), 1);
    assert_eq!(
        leaves[0].0,
        vec!["Kidney".to_string(), "Nephron".to_string()]
    );
    assert_eq!(leaves[0].1.record_count(), 2);
}
