pub mod route;
pub mod trips;

use std::error::Error;
use std::fs;
use std::path::Path;
use tracing::info;
use tripwrench::CustomLocationTable;

pub fn load_custom_locations(path: Option<&Path>) -> Result<CustomLocationTable, Box<dyn Error>> {
    let Some(path) = path else {
        return Ok(CustomLocationTable::new());
    };
    let input = fs::read(path).map_err(|e| format!("{}: {e}", path.display()))?;
    let table = CustomLocationTable::from_json(&input)
        .map_err(|e| format!("{}: {e}", path.display()))?;
    info!(path = %path.display(), entries = table.len(), "loaded custom locations");
    Ok(table)
}
