pub mod classify;
pub mod counts;
pub mod labeling;
pub mod tree;
pub mod types;

pub use counts::CountIndex;
pub use labeling::SelectedNode;
pub use types::{
    CellTypeMatch, Dataset, DatasetPreset, HierarchyNode, LabelingMethod, MatchType,
    PipelineSettings, Record, Table,
};

use crate::config::Config;
use crate::utils::cache::TableCache;
use crate::utils::progress_bar_builder::ProgressBarBuilder;
use anyhow::{Context, Result};
use classify::{is_cell_type_node, is_ftu_node};
use tree::{collect_leaves, compress_tree, group_records, grouping_columns, name_grouping_pattern,
    prune_ftu_subtrees};

/// Everything needed to load one dataset: the two table sources and the
/// effective pipeline settings.
#[derive(Debug, Clone)]
pub struct LoadSpec {
    pub title: String,
    pub asct_csv_src: String,
    pub count_csv_src: Option<String>,
    pub settings: PipelineSettings,
}

/// The finished pipeline result for one dataset load: the compressed
/// (and possibly FTU-pruned) structural tree, the count index joined to it
/// on demand, and the settings both were built under. Owns its state
/// exclusively; consumers borrow read-only.
#[derive(Debug)]
pub struct Partonomy {
    title: String,
    tree: HierarchyNode,
    counts: CountIndex,
    settings: PipelineSettings,
}

/// One entry of the log-scaled size legend derived from the known counts.
#[derive(Debug, Clone)]
pub struct SizeClass {
    /// Size multiplier in minimum-radius units.
    pub scaled: f64,
    pub title: String,
}

/// Fetches both tables and runs the full pipeline. The count table is
/// loaded and aggregated before the structural table is grouped, because
/// node values join against the finished index.
pub fn load_dataset(spec: &LoadSpec) -> Result<Partonomy> {
    let config = Config::load();
    let cache = TableCache::new(config.download_timeout)?;

    let count_table = match &spec.count_csv_src {
        Some(src) if spec.settings.ct_match_type != MatchType::None => {
            let progress = ProgressBarBuilder::new("Fetching cell count table...").build()?;
            let text = cache.get_text(src)?;
            let table = Table::parse_csv(&text, config.header_skip_lines)
                .with_context(|| format!("count table {src}"))?;
            progress.finish_with_message(format!("Count table loaded ({} rows)", table.records.len()));
            Some(table)
        }
        _ => None,
    };

    let progress = ProgressBarBuilder::new("Fetching ASCT+B table...").build()?;
    let text = cache.get_text(&spec.asct_csv_src)?;
    let table = Table::parse_csv(&text, config.header_skip_lines)
        .with_context(|| format!("structural table {}", spec.asct_csv_src))?;
    progress.finish_with_message(format!(
        "Structural table loaded ({} rows)",
        table.records.len()
    ));

    let partonomy = Partonomy::build(
        &table,
        count_table.as_ref(),
        &spec.title,
        spec.settings.clone(),
    );
    println!("Total nodes in tree: {}", partonomy.root().node_count());
    Ok(partonomy)
}

impl Partonomy {
    /// Runs the in-memory pipeline: count aggregation first, then
    /// group -> compress -> prune over the structural records. Data-shape
    /// irregularities degrade to well-defined empty/unavailable results
    /// rather than errors.
    pub fn build(
        asct_table: &Table,
        count_table: Option<&Table>,
        title: &str,
        settings: PipelineSettings,
    ) -> Partonomy {
        let counts = match count_table {
            Some(table) if settings.ct_match_type != MatchType::None => {
                CountIndex::build(table, settings.ct_match_type)
            }
            _ => CountIndex::new(),
        };

        let levels = grouping_columns(&asct_table.columns, name_grouping_pattern());
        let mut tree = compress_tree(group_records(asct_table.records.clone(), &levels));
        if !settings.full_ftu_subtree {
            prune_ftu_subtrees(&mut tree, &settings);
        }

        Partonomy {
            title: title.to_string(),
            tree,
            counts,
            settings,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn root(&self) -> &HierarchyNode {
        &self.tree
    }

    pub fn counts(&self) -> &CountIndex {
        &self.counts
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Leaves of the finished tree with their label paths, in render order.
    pub fn leaves(&self) -> Vec<(Vec<String>, &HierarchyNode)> {
        let mut out = Vec::new();
        let mut path = Vec::new();
        collect_leaves(&self.tree, &mut path, &mut out);
        out
    }

    /// Display value of a node; see `node_value`.
    pub fn value(&self, node: &HierarchyNode) -> f64 {
        node_value(node, &self.counts, &self.settings)
    }

    /// Count-index key matching the node's identifier fields, if any.
    pub fn join_key(&self, node: &HierarchyNode) -> Option<&str> {
        node.first_record()
            .and_then(|record| self.counts.join(record, self.settings.ct_match_type))
    }

    /// Aggregated cell count joined to the node, when available.
    pub fn joined_count(&self, node: &HierarchyNode) -> Option<u64> {
        self.join_key(node).and_then(|key| self.counts.get(key))
    }

    pub fn is_ftu(&self, node: &HierarchyNode) -> bool {
        is_ftu_node(node, &self.settings.ftu_columns)
    }

    pub fn is_cell_type(&self, key: &str, node: &HierarchyNode) -> bool {
        is_cell_type_node(key, node, self.settings.cell_type_match)
    }

    pub fn selection(&self, method: LabelingMethod) -> Vec<SelectedNode> {
        match method {
            LabelingMethod::TopNLeaves => {
                labeling::top_n_leaves(&self.tree, &self.counts, &self.settings)
            }
            LabelingMethod::LargeClusters => labeling::large_clusters(&self.tree, &self.settings),
            LabelingMethod::FtuNodes => {
                labeling::ftu_nodes(&self.tree, &self.counts, &self.settings)
            }
        }
    }

    /// Joins a node's ancestor labels for tooltips, starting at the
    /// configured depth.
    pub fn path_string(&self, path: &[String]) -> String {
        let start = self.settings.path_tooltip_start_level.min(path.len());
        path[start..].join(" > ")
    }

    /// Derives the log-scaled legend size classes from the counts known for
    /// the current tree, plus an "Unknown" class when some cell-type leaf
    /// has no joinable count.
    pub fn size_classes(&self) -> Vec<SizeClass> {
        let mut known = Vec::new();
        let mut cell_type_leaves = 0usize;
        for (path, node) in self.leaves() {
            let label = path.last().map(String::as_str).unwrap_or("");
            if self.is_cell_type(label, node) {
                cell_type_leaves += 1;
            }
            if let Some(count) = self.joined_count(node) {
                known.push(count);
            }
        }

        let base = self.settings.log_scale_base;
        let mut classes = Vec::new();
        if let (Some(&min), Some(&max)) = (known.iter().min(), known.iter().max()) {
            if max > 0 {
                let min_scaled = scaled_class(min, base);
                let max_scaled = scaled_class(max, base);
                classes.push(SizeClass {
                    scaled: max_scaled as f64,
                    title: format!("\u{2265} {}", base.powi(max_scaled)),
                });
                for low in (min_scaled..max_scaled).rev() {
                    let high = low + 1;
                    // Display range-min as 1 for the lowest size class
                    let shown_low = if low == 1 { 0 } else { low };
                    classes.push(SizeClass {
                        scaled: (low + high) as f64 / 2.0,
                        title: format!("{} to {}", base.powi(shown_low), base.powi(high)),
                    });
                }
            }
        }
        if known.len() < cell_type_leaves {
            // Unknown counts render at the minimum size.
            classes.push(SizeClass {
                scaled: 1.0,
                title: "Unknown".to_string(),
            });
        }
        classes
    }
}

fn scaled_class(count: u64, base: f64) -> i32 {
    ((count as f64).ln() / base.ln()).max(1.0).floor() as i32
}

/// Display value of a node, combining the FTU check, the count-index
/// key-join and the log-scale policy: FTU nodes take the fixed FTU size;
/// joined counts scale as `radius * max(log_base(count), 1)`; everything
/// else is floored at the minimum visible radius, never zero or negative.
pub fn node_value(node: &HierarchyNode, counts: &CountIndex, settings: &PipelineSettings) -> f64 {
    if !settings.full_ftu_subtree && is_ftu_node(node, &settings.ftu_columns) {
        return settings.ftu_circle_radius;
    }
    let joined = node
        .first_record()
        .and_then(|record| counts.join(record, settings.ct_match_type))
        .and_then(|key| counts.get(key));
    match joined {
        Some(count) if count > 0 => {
            let scaled = (count as f64).ln() / settings.log_scale_base.ln();
            settings.circle_radius * scaled.max(1.0)
        }
        _ => settings.circle_radius,
    }
}
