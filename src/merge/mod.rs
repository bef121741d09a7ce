//! Structural merge of user overrides into baseline TOML configuration.
//!
//! Every function is pure: the same baseline bytes and overrides always give
//! byte-identical output. Keys the override does not mention are preserved
//! and tables are emitted in sorted key order.
mod crio;
mod registries;
mod storage;

pub use crio::update_runtime_config;
pub use registries::update_registries_config;
pub use storage::update_storage_config;

#[cfg(test)]
mod merge_test;

use toml::Table;
use toml::Value;

use crate::MergeError;

fn parse(baseline: &[u8]) -> Result<Table, MergeError> {
    Ok(std::str::from_utf8(baseline)?.parse::<Table>()?)
}

fn render(table: &Table) -> Result<Vec<u8>, MergeError> {
    Ok(toml::to_string(table)?.into_bytes())
}

/// Walks (creating as needed) the nested table at `path`
fn table_at<'a>(
    root: &'a mut Table,
    path: &[&str],
) -> Result<&'a mut Table, MergeError> {
    let mut current = root;
    for (depth, segment) in path.iter().enumerate() {
        let entry = current
            .entry(segment.to_string())
            .or_insert_with(|| Value::Table(Table::new()));
        current = match entry {
            Value::Table(table) => table,
            _ => return Err(MergeError::NotATable(path[..=depth].join("."))),
        };
    }
    Ok(current)
}
