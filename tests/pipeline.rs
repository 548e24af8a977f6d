use partonomy_tools::partonomy::{
    LabelingMethod, MatchType, Partonomy, PipelineSettings, Table,
};

const ASCT_CSV: &str = include_str!("fixtures/kidney_asct.csv");
const COUNT_CSV: &str = include_str!("fixtures/kidney_counts.csv");

fn load_fixture(settings: PipelineSettings) -> Partonomy {
    let asct = Table::parse_csv(ASCT_CSV, 10).unwrap();
    let counts = Table::parse_csv(COUNT_CSV, 10).unwrap();
    Partonomy::build(&asct, Some(&counts), "Kidney", settings)
}

fn by_id_settings() -> PipelineSettings {
    PipelineSettings {
        ct_match_type: MatchType::ById,
        ..PipelineSettings::default()
    }
}

#[test]
fn parse_csv_skips_the_metadata_preamble() {
    let table = Table::parse_csv(ASCT_CSV, 10).unwrap();
    assert_eq!(
        table.columns,
        vec!["AS/1", "AS/2", "AS/3", "CT/1", "CT/1/ID", "FTU"]
    );
    assert_eq!(table.records.len(), 5);
    assert_eq!(
        table.records[0].get("CT/1").map(String::as_str),
        Some("Podocyte")
    );
}

#[test]
fn parse_csv_without_a_header_row_is_an_error() {
    let text = "one\ntwo\nthree\n";
    assert!(Table::parse_csv(text, 10).is_err());
}

#[test]
fn build_produces_the_compressed_pruned_tree() {
    let result = load_fixture(by_id_settings());
    let root = result.root();

    // Blank AS/3 cells were compressed away: the fibroblasts sit directly
    // under their region nodes.
    let fibroblast = root
        .get(&[
            "Kidney".to_string(),
            "Renal Cortex".to_string(),
            "Cortical Fibroblast".to_string(),
        ])
        .unwrap();
    assert!(fibroblast.is_leaf());

    // Both nephron rows are FTU-flagged, so the subtree collapses.
    let nephron = root
        .get(&["Kidney".to_string(), "Renal Cortex".to_string(), "Nephron".to_string()])
        .unwrap();
    assert!(nephron.is_leaf());
    assert_eq!(nephron.record_count(), 2);
    assert!(result.is_ftu(nephron));

    assert_eq!(root.record_count(), 5);
}

#[test]
fn node_values_follow_the_log_scale_policy() {
    let result = load_fixture(by_id_settings());
    let root = result.root();
    let kidney = |name: &str, region: &str| {
        root.get(&[
            "Kidney".to_string(),
            region.to_string(),
            name.to_string(),
        ])
        .unwrap()
    };

    // FTU leaf takes the fixed FTU size.
    let nephron = kidney("Nephron", "Renal Cortex");
    assert_eq!(result.value(nephron), 50.0);

    // count 2: log4(2) < 1, floored to the minimum radius
    let cortical = kidney("Cortical Fibroblast", "Renal Cortex");
    assert_eq!(result.joined_count(cortical), Some(2));
    assert_eq!(result.value(cortical), 8.0);

    // unavailable count and unjoinable node both fall back to the minimum
    let medullary = kidney("Medullary Fibroblast", "Renal Medulla");
    assert_eq!(result.joined_count(medullary), None);
    assert_eq!(result.value(medullary), 8.0);
    let urothelial = kidney("Urothelial Cell", "Renal Pelvis");
    assert_eq!(result.join_key(urothelial), None);
    assert_eq!(result.value(urothelial), 8.0);
}

#[test]
fn ftu_selection_reports_the_pruned_nephron() {
    let result = load_fixture(by_id_settings());
    let selected = result.selection(LabelingMethod::FtuNodes);
    assert_eq!(selected.len(), 1);
    assert_eq!(selected[0].label, "Nephron");
    assert_eq!(selected[0].value, 50.0);

    // Every remaining cell-type leaf sits at the minimum value, so nothing
    // qualifies for top-N.
    assert!(result.selection(LabelingMethod::TopNLeaves).is_empty());
}

#[test]
fn path_strings_start_at_the_configured_level() {
    let result = load_fixture(PipelineSettings {
        path_tooltip_start_level: 1,
        ..by_id_settings()
    });
    let path = vec![
        "Kidney".to_string(),
        "Renal Cortex".to_string(),
        "Nephron".to_string(),
    ];
    assert_eq!(result.path_string(&path), "Renal Cortex > Nephron");

    let deep = load_fixture(PipelineSettings {
        path_tooltip_start_level: 9,
        ..by_id_settings()
    });
    assert_eq!(deep.path_string(&path), "");
}

#[test]
fn size_classes_cover_the_known_range_plus_unknown() {
    let result = load_fixture(by_id_settings());
    let classes = result.size_classes();

    // Known counts span 2..=5000 (log4 classes 1..=6): one top class, five
    // ranges, plus "Unknown" for the leaves with no joinable count.
    assert_eq!(classes.len(), 7);
    assert_eq!(classes[0].title, "\u{2265} 4096");
    assert_eq!(classes[0].scaled, 6.0);
    assert_eq!(classes.last().unwrap().title, "Unknown");
    assert_eq!(classes.last().unwrap().scaled, 1.0);

    // The lowest bucket displays from 1, not from the class boundary.
    assert_eq!(classes[5].title, "1 to 16");
}
