use crate::cli::TreeArgs;
use crate::commands::resolve_source;
use crate::partonomy::{self, HierarchyNode, LoadSpec, Partonomy, PipelineSettings};

pub fn run(args: TreeArgs) -> Result<(), Box<dyn std::error::Error>> {
    let preset = args.dataset.preset();
    let settings = PipelineSettings {
        ct_match_type: args.match_type.unwrap_or(preset.ct_match_type),
        full_ftu_subtree: args.full_subtree,
        ..PipelineSettings::default()
    };

    let spec = LoadSpec {
        title: preset.root_title.to_string(),
        asct_csv_src: args
            .asct_csv
            .unwrap_or_else(|| resolve_source(&args.data_dir, preset.asct_csv_src)),
        count_csv_src: args.count_csv.or_else(|| {
            preset
                .count_csv_src
                .map(|src| resolve_source(&args.data_dir, src))
        }),
        settings,
    };

    let result = partonomy::load_dataset(&spec)?;

    println!("{} Partonomy", result.title());
    if let Some(children) = result.root().children() {
        for (key, child) in children {
            print_node(&result, key, child, 0);
        }
    }
    Ok(())
}

fn print_node(result: &Partonomy, key: &str, node: &HierarchyNode, depth: usize) {
    let indent = "  ".repeat(depth);
    let label = if key.is_empty() { "(blank)" } else { key };
    match node {
        HierarchyNode::Leaf { records } => {
            let count = match result.joined_count(node) {
                Some(count) => format!(", {count} cells"),
                None => String::new(),
            };
            println!("{indent}{label} [{} row(s){count}]", records.len());
        }
        HierarchyNode::Internal { children } => {
            println!("{indent}{label}");
            for (child_key, child) in children {
                print_node(result, child_key, child, depth + 1);
            }
        }
    }
}
