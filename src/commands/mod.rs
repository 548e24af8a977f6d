pub mod tree;
pub mod treemap;

/// Resolves a preset table file name against the data directory. Overrides
/// and URL/path-like names pass through untouched.
pub(crate) fn resolve_source(data_dir: &str, name: &str) -> String {
    if name.starts_with("http://") || name.starts_with("https://") || name.contains('/') {
        name.to_string()
    } else {
        format!("{}/{}", data_dir.trim_end_matches('/'), name)
    }
}
