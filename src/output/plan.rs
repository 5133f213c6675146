//! JSON plan file written after a dry run.

use crate::provision::DryRunEngine;
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

/// Write the recorded plan to `path`, creating parent directories.
pub fn write_plan(engine: &DryRunEngine, path: &Path) -> Result<PathBuf, Box<dyn Error>> {
    let json = engine
        .to_json()
        .map_err(|e| format!("Error serializing plan: {e}"))?;
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .map_err(|e| format!("Error creating plan dir {}: {e}", dir.display()))?;
    }
    log::warn!("Writing plan to file: {}", path.display());
    fs::write(path, json).map_err(|e| format!("Error writing plan file {}: {e}", path.display()))?;
    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provision::{ResourceEngine, ResourceKind, ResourceRequest};

    #[test]
    fn test_write_plan() {
        let mut engine = DryRunEngine::new("us-east-1");
        engine
            .create(ResourceRequest::new(ResourceKind::Vpc, "net-vpc"))
            .unwrap();
        let dir = std::env::temp_dir().join(format!("vpc-plan-test-{}", std::process::id()));
        let path = write_plan(&engine, &dir.join("vpc_plan_2026-01-01.json")).unwrap();

        let json = fs::read_to_string(&path).unwrap();
        assert!(json.contains("\"net-vpc\""));
        fs::remove_dir_all(&dir).unwrap();
    }
}
