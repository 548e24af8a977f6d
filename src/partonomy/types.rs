use clap::ValueEnum;
use indexmap::IndexMap;
use thiserror::Error;

/// A single ASCT+B table row: column name -> cell value.
/// Columns follow the `{Domain}/{level}[/{suffix}]` convention, e.g.
/// `AS/1`, `CT/2/ID`, `AS/3/COUNT`, plus flag columns such as `FTU`.
pub type Record = IndexMap<String, String>;

#[derive(Debug, Error)]
pub enum TableError {
    #[error("failed to parse csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("table has no header row after skipping {0} metadata lines")]
    MissingHeader(usize),
}

/// A parsed ASCT+B table. The column order is the raw csv header order;
/// grouping order is derived separately (see `tree::grouping_columns`).
#[derive(Debug, Clone)]
pub struct Table {
    pub columns: Vec<String>,
    pub records: Vec<Record>,
}

impl Table {
    /// Parses csv text into a table, dropping `header_skip` leading metadata
    /// lines before the actual header row. ASCT+B exports carry roughly ten
    /// such lines of provenance notes.
    pub fn parse_csv(text: &str, header_skip: usize) -> Result<Table, TableError> {
        let body = text
            .lines()
            .skip(header_skip)
            .collect::<Vec<_>>()
            .join("\n");

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(body.as_bytes());

        let columns: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();
        if columns.is_empty() || (columns.len() == 1 && columns[0].is_empty()) {
            return Err(TableError::MissingHeader(header_skip));
        }

        let mut records = Vec::new();
        for row in reader.records() {
            let row = row?;
            let mut record = Record::new();
            for (i, column) in columns.iter().enumerate() {
                record.insert(column.clone(), row.get(i).unwrap_or("").to_string());
            }
            records.push(record);
        }

        Ok(Table { columns, records })
    }
}

/// One node of the grouped partonomy. The node's own label is the key under
/// which its parent holds it; sibling order is first-seen insertion order.
#[derive(Debug, Clone, PartialEq)]
pub enum HierarchyNode {
    Internal {
        children: IndexMap<String, HierarchyNode>,
    },
    Leaf {
        records: Vec<Record>,
    },
}

impl HierarchyNode {
    pub fn is_leaf(&self) -> bool {
        matches!(self, HierarchyNode::Leaf { .. })
    }

    pub fn children(&self) -> Option<&IndexMap<String, HierarchyNode>> {
        match self {
            HierarchyNode::Internal { children } => Some(children),
            HierarchyNode::Leaf { .. } => None,
        }
    }

    /// Collects references to every record reachable under this node,
    /// depth-first in sibling order.
    pub fn collect_records<'a>(&'a self, out: &mut Vec<&'a Record>) {
        match self {
            HierarchyNode::Leaf { records } => out.extend(records.iter()),
            HierarchyNode::Internal { children } => {
                for child in children.values() {
                    child.collect_records(out);
                }
            }
        }
    }

    /// First record in depth-first order, if any.
    pub fn first_record(&self) -> Option<&Record> {
        match self {
            HierarchyNode::Leaf { records } => records.first(),
            HierarchyNode::Internal { children } => {
                children.values().find_map(|child| child.first_record())
            }
        }
    }

    /// Consumes the node, flattening every reachable record into one list.
    pub fn into_records(self) -> Vec<Record> {
        match self {
            HierarchyNode::Leaf { records } => records,
            HierarchyNode::Internal { children } => children
                .into_iter()
                .flat_map(|(_, child)| child.into_records())
                .collect(),
        }
    }

    /// Walks a label path down from this node.
    pub fn get(&self, path: &[String]) -> Option<&HierarchyNode> {
        let mut node = self;
        for key in path {
            node = node.children()?.get(key)?;
        }
        Some(node)
    }

    pub fn record_count(&self) -> usize {
        match self {
            HierarchyNode::Leaf { records } => records.len(),
            HierarchyNode::Internal { children } => {
                children.values().map(|child| child.record_count()).sum()
            }
        }
    }

    /// Number of nodes in this subtree, including self.
    pub fn node_count(&self) -> usize {
        match self {
            HierarchyNode::Leaf { .. } => 1,
            HierarchyNode::Internal { children } => {
                1 + children.values().map(|child| child.node_count()).sum::<usize>()
            }
        }
    }
}

/// Strategy for joining structural-tree nodes against the cell count table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum MatchType {
    /// No count source; every join reports unavailable.
    #[default]
    None,
    /// Match ontology identifiers (`CT/1/ID` against `{AS|CT}/{n}/ID` keys).
    ById,
    /// Match display names (`CT/1`, falling back to `CT/1/LABEL`).
    ByName,
}

impl MatchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchType::None => "none",
            MatchType::ById => "by-id",
            MatchType::ByName => "by-name",
        }
    }
}

/// The cell-type predicate changed between revisions of the upstream tables:
/// some anchor cell types at `CT/1` only, others at deeper levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellTypeMatch {
    /// Only `CT/1` identifies a cell type leaf.
    FirstLevel,
    /// Any `CT/{n}` column may identify the leaf.
    AnyLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LabelingMethod {
    TopNLeaves,
    LargeClusters,
    FtuNodes,
}

impl LabelingMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            LabelingMethod::TopNLeaves => "top_n_leaves",
            LabelingMethod::LargeClusters => "large_clusters",
            LabelingMethod::FtuNodes => "ftu_nodes",
        }
    }
}

/// Settings consumed by the pipeline core. Rendering concerns (colors,
/// canvas sizes, titles) live with the renderer, not here.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub ct_match_type: MatchType,
    /// Minimum visible node value; count-derived values never fall below it.
    pub circle_radius: f64,
    /// Fixed value assigned to pruned FTU leaves.
    pub ftu_circle_radius: f64,
    pub log_scale_base: f64,
    /// Ancestor depth where tooltip paths start.
    pub path_tooltip_start_level: usize,
    pub top_n_leaves_count: usize,
    pub large_cluster_size: usize,
    /// When set, FTU subtrees keep their internal structure.
    pub full_ftu_subtree: bool,
    /// Columns whose non-blank value flags a row as part of an FTU.
    pub ftu_columns: Vec<String>,
    pub cell_type_match: CellTypeMatch,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            ct_match_type: MatchType::None,
            circle_radius: 8.0,
            ftu_circle_radius: 50.0,
            log_scale_base: 4.0,
            path_tooltip_start_level: 0,
            top_n_leaves_count: 10,
            large_cluster_size: 5,
            full_ftu_subtree: false,
            ftu_columns: vec!["FTU".to_string()],
            cell_type_match: CellTypeMatch::AnyLevel,
        }
    }
}

/// Published ASCT+B organ tables with their companion count sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Dataset {
    Brain,
    Heart,
    Kidney,
    LargeIntestine,
    LymphNode,
    RespiratorySystem,
    Spleen,
    Skin,
    Thymus,
    Eye,
}

#[derive(Debug, Clone)]
pub struct DatasetPreset {
    pub asct_csv_src: &'static str,
    pub count_csv_src: Option<&'static str>,
    pub root_title: &'static str,
    pub ct_match_type: MatchType,
}

impl Dataset {
    pub fn preset(&self) -> DatasetPreset {
        match self {
            Dataset::Brain => DatasetPreset {
                asct_csv_src: "ASCT+B_Tables_Standard_Format_3-24-2021_-_Brain_v1.csv",
                count_csv_src: Some("motor_cortex.csv"),
                root_title: "Brain",
                ct_match_type: MatchType::ByName,
            },
            Dataset::Heart => DatasetPreset {
                asct_csv_src: "ASCT+B_Tables_Standard_Format_3-24-2021_-_Heart_v1.csv",
                count_csv_src: None,
                root_title: "Heart",
                ct_match_type: MatchType::None,
            },
            Dataset::Kidney => DatasetPreset {
                asct_csv_src: "ASCT+B_Tables_Standard_Format_3-24-2021_-_Kidney_v1.csv",
                count_csv_src: Some("kidney.csv"),
                root_title: "Kidney",
                ct_match_type: MatchType::ById,
            },
            Dataset::LargeIntestine => DatasetPreset {
                asct_csv_src: "ASCT+B_Tables_Standard_Format_3-24-2021_-_Large_Intestine_v1.csv",
                count_csv_src: None,
                root_title: "Large Intestine",
                ct_match_type: MatchType::None,
            },
            Dataset::LymphNode => DatasetPreset {
                asct_csv_src: "ASCT+B_Tables_Standard_Format_3-24-2021_-_Lymph_Node_v1.csv",
                count_csv_src: None,
                root_title: "Lymph Node",
                ct_match_type: MatchType::None,
            },
            Dataset::RespiratorySystem => DatasetPreset {
                asct_csv_src: "ASCT+B_Tables_Standard_Format_3-24-2021_-_Lung_v1.csv",
                count_csv_src: None,
                root_title: "Respiratory System",
                ct_match_type: MatchType::None,
            },
            Dataset::Spleen => DatasetPreset {
                asct_csv_src: "ASCT+B_Tables_Standard_Format_3-24-2021_-_Spleen_v1.6.csv",
                count_csv_src: Some("azimuth-spleen-cell-sets.json.csv"),
                root_title: "Spleen",
                ct_match_type: MatchType::ById,
            },
            Dataset::Skin => DatasetPreset {
                asct_csv_src: "ASCT+B_Tables_Standard_Format_3-24-2021_-_Skin_v1.csv",
                count_csv_src: None,
                root_title: "Skin",
                ct_match_type: MatchType::None,
            },
            Dataset::Thymus => DatasetPreset {
                asct_csv_src: "ASCT+B_Tables_Standard_Format_3-24-2021_-_Thymus_v1.csv",
                count_csv_src: None,
                root_title: "Thymus",
                ct_match_type: MatchType::None,
            },
            Dataset::Eye => DatasetPreset {
                asct_csv_src: "ASCT+B_Tables_Standard_Format_3-24-2021_-_Eye.csv",
                count_csv_src: None,
                root_title: "Eye",
                ct_match_type: MatchType::None,
            },
        }
    }
}
