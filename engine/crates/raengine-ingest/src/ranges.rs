//! Subnet range data loading

use anyhow::Context;
use raengine_core::RangeData;
use std::fs;
use std::path::Path;
use tracing::info;

/// Load range data from a VLAN export (`.csv`) or saved range data (`.json`)
pub fn load_ranges(path: impl AsRef<Path>) -> anyhow::Result<RangeData> {
    let path = path.as_ref();
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let ranges = if is_json {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading range data {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("parsing range data {}", path.display()))?
    } else {
        let file = fs::File::open(path)
            .with_context(|| format!("opening VLAN export {}", path.display()))?;
        RangeData::from_vlan_csv(file)
            .with_context(|| format!("parsing VLAN export {}", path.display()))?
    };

    info!(
        "Loaded {} ranges in {} categories from {}",
        ranges.len(),
        ranges.categories.len(),
        path.display()
    );
    Ok(ranges)
}
