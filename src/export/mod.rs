use chrono::{DateTime, Utc};
use serde::ser::Serializer;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};

/// Root structure for JSON report exports.
#[derive(Debug, Serialize)]
pub struct PartonomyExport {
    pub version: String,
    #[serde(serialize_with = "serialize_datetime")]
    pub created_at: DateTime<Utc>,
    pub tool_version: String,

    pub dataset_title: String,
    pub match_type: String,
    /// The labeling method the caller asked to highlight; all methods'
    /// selections are included regardless.
    pub active_labeling: String,

    pub selections: Vec<SelectionEntry>,
    pub size_classes: Vec<SizeClassEntry>,
}

#[derive(Debug, Serialize)]
pub struct SelectionEntry {
    pub method: String,
    pub label: String,
    pub value: f64,
    pub cell_count: Option<u64>,
    pub path: String,
}

#[derive(Debug, Serialize)]
pub struct SizeClassEntry {
    pub scaled: f64,
    pub title: String,
}

fn serialize_datetime<S>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&date.to_rfc3339())
}

/// Writes the selection entries as a TSV report.
pub fn write_tsv(output_file: &str, entries: &[SelectionEntry]) -> std::io::Result<()> {
    let mut writer = BufWriter::new(File::create(output_file)?);
    writeln!(writer, "Method\tLabel\tValue\tCell_Count\tPath")?;
    for entry in entries {
        writeln!(
            writer,
            "{}\t{}\t{:.2}\t{}\t{}",
            entry.method,
            entry.label,
            entry.value,
            entry
                .cell_count
                .map(|c| c.to_string())
                .unwrap_or_else(|| "unavailable".to_string()),
            entry.path
        )?;
    }
    Ok(())
}

pub fn write_json(
    output_file: &str,
    export: &PartonomyExport,
) -> Result<(), Box<dyn std::error::Error>> {
    let writer = BufWriter::new(File::create(output_file)?);
    serde_json::to_writer_pretty(writer, export)?;
    Ok(())
}
