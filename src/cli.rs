use crate::partonomy::{Dataset, LabelingMethod, MatchType};
use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build the partonomy tree, join cell counts and write the labeling report
    Treemap(TreemapArgs),

    /// Print the compressed partonomy hierarchy with joined cell counts
    Tree(TreeArgs),
}

#[derive(Args)]
pub struct TreemapArgs {
    /// Organ dataset preset
    #[arg(value_enum)]
    pub dataset: Dataset,

    /// Directory (or URL base) holding the ASCT+B csv tables
    #[arg(long, default_value = "data")]
    pub data_dir: String,

    /// Override the structural table source (path or URL)
    #[arg(long)]
    pub asct_csv: Option<String>,

    /// Override the cell count table source (path or URL)
    #[arg(long)]
    pub count_csv: Option<String>,

    /// Override the preset cell-type match strategy
    #[arg(long, value_enum)]
    pub match_type: Option<MatchType>,

    /// Output file for the labeling report
    #[arg(short = 'o', long = "output", default_value = "partonomy_labels.tsv")]
    pub output_file: String,

    /// Also write the full report as JSON
    #[arg(long)]
    pub json: Option<String>,

    /// Labeling method highlighted in the report (all three are computed)
    #[arg(long, value_enum, default_value = "top-n-leaves")]
    pub labeling: LabelingMethod,

    /// Number of leaves kept by the top-N labeling method (default: 10)
    #[arg(long, default_value = "10")]
    pub top_n: usize,

    /// Minimum child count for the large-cluster labeling method (default: 5)
    #[arg(long, default_value = "5")]
    pub cluster_size: usize,

    /// Keep full FTU subtrees instead of pruning them into flat leaves
    #[arg(long)]
    pub full_subtree: bool,

    /// Minimum visible node value (default: 8)
    #[arg(long, default_value = "8")]
    pub min_value: f64,

    /// Log scale base for count-derived node values (default: 4)
    #[arg(long, default_value = "4")]
    pub log_base: f64,

    /// Ancestor depth where tooltip paths start (default: 0)
    #[arg(long, default_value = "0")]
    pub path_start_level: usize,
}

#[derive(Args)]
pub struct TreeArgs {
    /// Organ dataset preset
    #[arg(value_enum)]
    pub dataset: Dataset,

    /// Directory (or URL base) holding the ASCT+B csv tables
    #[arg(long, default_value = "data")]
    pub data_dir: String,

    /// Override the structural table source (path or URL)
    #[arg(long)]
    pub asct_csv: Option<String>,

    /// Override the cell count table source (path or URL)
    #[arg(long)]
    pub count_csv: Option<String>,

    /// Override the preset cell-type match strategy
    #[arg(long, value_enum)]
    pub match_type: Option<MatchType>,

    /// Keep full FTU subtrees instead of pruning them into flat leaves
    #[arg(long)]
    pub full_subtree: bool,
}
