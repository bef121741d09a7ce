use super::parse;
use super::render;
use super::table_at;
use crate::api::RuntimeOverrides;
use crate::MergeError;

/// Sets `storage.options.size` from the overlay size override
pub fn update_storage_config(
    baseline: &[u8],
    overrides: &RuntimeOverrides,
) -> Result<Vec<u8>, MergeError> {
    let mut root = parse(baseline)?;
    if overrides.touches_storage() {
        let options = table_at(&mut root, &["storage", "options"])?;
        options.insert("size".to_string(), overrides.overlay_size.as_str().trim().into());
    }
    render(&root)
}
