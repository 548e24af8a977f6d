use crate::cli::TreemapArgs;
use crate::commands::resolve_source;
use crate::export::{self, PartonomyExport, SelectionEntry, SizeClassEntry};
use crate::partonomy::{self, LabelingMethod, LoadSpec, Partonomy, PipelineSettings};
use chrono::Utc;

pub fn run(args: TreemapArgs) -> Result<(), Box<dyn std::error::Error>> {
    let preset = args.dataset.preset();
    let settings = PipelineSettings {
        ct_match_type: args.match_type.unwrap_or(preset.ct_match_type),
        circle_radius: args.min_value,
        log_scale_base: args.log_base,
        path_tooltip_start_level: args.path_start_level,
        top_n_leaves_count: args.top_n,
        large_cluster_size: args.cluster_size,
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

    let methods = [
        LabelingMethod::TopNLeaves,
        LabelingMethod::LargeClusters,
        LabelingMethod::FtuNodes,
    ];
    let mut entries = Vec::new();
    for method in methods {
        let selection = result.selection(method);
        println!("{}: {} node(s)", method.as_str(), selection.len());
        entries.extend(selection.into_iter().map(|node| {
            let cell_count = result
                .root()
                .get(&node.path)
                .and_then(|n| result.joined_count(n));
            SelectionEntry {
                method: method.as_str().to_string(),
                label: node.label,
                value: node.value,
                cell_count,
                path: result.path_string(&node.path),
            }
        }));
    }

    export::write_tsv(&args.output_file, &entries)?;
    println!("Labeling report written to {}", args.output_file);

    if let Some(json_path) = &args.json {
        let report = build_json_report(&result, args.labeling, entries);
        export::write_json(json_path, &report)?;
        println!("JSON report written to {json_path}");
    }

    Ok(())
}

fn build_json_report(
    result: &Partonomy,
    active: LabelingMethod,
    selections: Vec<SelectionEntry>,
) -> PartonomyExport {
    PartonomyExport {
        version: "1.0".to_string(),
        created_at: Utc::now(),
        tool_version: env!("CARGO_PKG_VERSION").to_string(),
        dataset_title: result.title().to_string(),
        match_type: result.settings().ct_match_type.as_str().to_string(),
        active_labeling: active.as_str().to_string(),
        selections,
        size_classes: result
            .size_classes()
            .into_iter()
            .map(|class| SizeClassEntry {
                scaled: class.scaled,
                title: class.title,
            })
            .collect(),
    }
}
