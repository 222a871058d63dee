//! Execution planning for one change script's content directory.
//!
//! A content directory holds SQL files named `<key>-<anything>`, plus an
//! optional nested directory of rule files following the same convention.
//! Key `0` at the top level marks the scrub file, which runs once before
//! everything else.

use crate::error::{CoreError, CoreResult};
use crate::splitter::ContentKind;
use std::path::{Path, PathBuf};

/// Key reserved for the scrub file.
pub const SCRUB_KEY: u32 = 0;

/// One SQL file scheduled for execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptFile {
    /// Path to the SQL file.
    pub path: PathBuf,
    /// File-local integer key parsed from the name.
    pub key: u32,
    /// How the file's SQL is split and executed.
    pub kind: ContentKind,
}

/// Ordered execution plan for a content directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptPlan {
    /// Scrub file (`0-*`) executed before anything else, if present.
    pub scrub: Option<PathBuf>,
    /// Non-rule files in ascending key order, followed by rule files.
    pub files: Vec<ScriptFile>,
}

impl ScriptPlan {
    /// Total number of files the plan touches, scrub included.
    pub fn len(&self) -> usize {
        self.files.len() + usize::from(self.scrub.is_some())
    }

    /// True when the directory held nothing runnable.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Parse the integer key before the first hyphen of a file name.
///
/// Returns `None` when the name has no hyphen or the prefix is not an integer.
pub fn parse_file_key(file_name: &str) -> Option<u32> {
    let (prefix, _) = file_name.split_once('-')?;
    prefix.parse().ok()
}

/// Build the execution plan for a change script's content directory.
pub fn plan_script_dir(dir: &Path) -> CoreResult<ScriptPlan> {
    if !dir.is_dir() {
        return Err(CoreError::NotADirectory {
            path: dir.display().to_string(),
        });
    }

    let mut plan = ScriptPlan::default();
    let mut main_files: Vec<ScriptFile> = Vec::new();
    let mut rule_files: Vec<ScriptFile> = Vec::new();

    for path in sorted_entries(dir)? {
        if path.is_dir() {
            for rule_path in sorted_entries(&path)? {
                if rule_path.is_dir() {
                    log::warn!("Ignoring nested directory {}", rule_path.display());
                    continue;
                }
                if let Some(file) = classify(&rule_path, true) {
                    if file.key == SCRUB_KEY {
                        log::warn!(
                            "Ignoring rule file with reserved key 0: {}",
                            rule_path.display()
                        );
                        continue;
                    }
                    rule_files.push(file);
                }
            }
            continue;
        }

        if let Some(file) = classify(&path, false) {
            if file.key == SCRUB_KEY {
                if let Some(existing) = &plan.scrub {
                    log::warn!(
                        "Multiple scrub files in {}; using {} and ignoring {}",
                        dir.display(),
                        existing.display(),
                        file.path.display()
                    );
                    continue;
                }
                plan.scrub = Some(file.path);
            } else {
                main_files.push(file);
            }
        }
    }

    // Stable sorts: equal keys keep file-name order from sorted_entries.
    main_files.sort_by_key(|f| f.key);
    rule_files.sort_by_key(|f| f.key);
    warn_duplicate_keys(&main_files);
    warn_duplicate_keys(&rule_files);

    plan.files = main_files;
    plan.files.extend(rule_files);
    Ok(plan)
}

fn classify(path: &Path, in_rule_dir: bool) -> Option<ScriptFile> {
    let name = path.file_name()?.to_string_lossy().into_owned();
    if !name.contains('-') {
        log::info!("Skipping {}: name has no '-' key separator", path.display());
        return None;
    }
    let Some(key) = parse_file_key(&name) else {
        log::error!("Error parsing key from name {}", path.display());
        return None;
    };
    Some(ScriptFile {
        path: path.to_path_buf(),
        key,
        kind: ContentKind::from_file_name(&name, in_rule_dir),
    })
}

fn sorted_entries(dir: &Path) -> CoreResult<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(|e| CoreError::io(dir, e))? {
        let entry = entry.map_err(|e| CoreError::io(dir, e))?;
        paths.push(entry.path());
    }
    paths.sort();
    Ok(paths)
}

fn warn_duplicate_keys(sorted: &[ScriptFile]) {
    for pair in sorted.windows(2) {
        if pair[0].key == pair[1].key {
            log::warn!(
                "Files share key {}: {} and {}",
                pair[0].key,
                pair[0].path.display(),
                pair[1].path.display()
            );
        }
    }
}

#[cfg(test)]
#[path = "content_test.rs"]
mod tests;
