//! Change script discovery under a script root.

use crate::error::{CoreError, CoreResult};
use crate::script::{sort_scripts, ChangeScript};
use std::path::Path;

/// Build one [`ChangeScript`] per direct child of `root`, sorted by order.
///
/// Every entry must start with an ordering key; a single malformed name
/// aborts discovery for the whole root. Two entries with numerically equal
/// orders are rejected as well.
pub fn discover_scripts(root: &Path) -> CoreResult<Vec<ChangeScript>> {
    if !root.is_dir() {
        return Err(CoreError::ScriptRootNotFound {
            path: root.display().to_string(),
        });
    }
    log::info!("Discovering change scripts in {}", root.display());

    let mut paths = Vec::new();
    for entry in std::fs::read_dir(root).map_err(|e| CoreError::io(root, e))? {
        let entry = entry.map_err(|e| CoreError::io(root, e))?;
        paths.push(entry.path());
    }
    // read_dir order is platform dependent
    paths.sort();

    let mut scripts = Vec::with_capacity(paths.len());
    for path in &paths {
        log::debug!("Processing entry {}", path.display());
        scripts.push(ChangeScript::from_entry(path)?);
    }

    sort_scripts(&mut scripts);
    reject_duplicate_orders(&scripts, root)?;

    log::info!(
        "Discovered {} change script(s) in {}",
        scripts.len(),
        root.display()
    );
    Ok(scripts)
}

fn reject_duplicate_orders(sorted: &[ChangeScript], root: &Path) -> CoreResult<()> {
    for pair in sorted.windows(2) {
        if pair[0].order() == pair[1].order() {
            return Err(CoreError::DuplicateOrder {
                order: pair[0].order().normalize().to_string(),
                first: pair[0].name().to_string(),
                second: pair[1].name().to_string(),
                dir: root.display().to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "discovery_test.rs"]
mod tests;
