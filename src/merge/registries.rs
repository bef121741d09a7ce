use toml::Value;

use super::parse;
use super::render;
use super::table_at;
use crate::api::RegistrySources;
use crate::MergeError;

/// Replaces the insecure and blocked registry lists
///
/// An empty list leaves the baseline list in place.
pub fn update_registries_config(
    baseline: &[u8],
    sources: &RegistrySources,
) -> Result<Vec<u8>, MergeError> {
    let mut root = parse(baseline)?;
    set_list(&mut root, &["registries", "insecure"], &sources.insecure_registries)?;
    set_list(&mut root, &["registries", "block"], &sources.blocked_registries)?;
    render(&root)
}

fn set_list(
    root: &mut toml::Table,
    path: &[&str],
    registries: &[String],
) -> Result<(), MergeError> {
    if registries.is_empty() {
        return Ok(());
    }
    let table = table_at(root, path)?;
    let list = registries.iter().map(|r| Value::String(r.clone())).collect();
    table.insert("registries".to_string(), Value::Array(list));
    Ok(())
}
