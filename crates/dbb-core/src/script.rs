//! Change script descriptors.
//!
//! A [`ChangeScript`] is one orderable unit of change. It is built either from
//! a directory entry under a script root (carrying the directory as content) or
//! from a ledger row (carrying the ledger's surrogate id).

use crate::error::{CoreError, CoreResult};
use regex::Regex;
use rust_decimal::Decimal;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::OnceLock;

static ORDER_PREFIX: OnceLock<Regex> = OnceLock::new();

fn order_prefix() -> &'static Regex {
    ORDER_PREFIX.get_or_init(|| Regex::new(r"^[0-9]+(_[0-9]+)?").expect("valid regex literal"))
}

/// Split an entry name into its ordering key and display name.
///
/// The key is one or more digits optionally followed by `_` and more digits;
/// the underscore reads as a decimal point. The display name is whatever
/// follows the key, verbatim.
///
/// ```
/// use dbb_core::script::parse_order_prefix;
/// let (order, name) = parse_order_prefix("12_5-Add_Column").unwrap();
/// assert_eq!(order.to_string(), "12.5");
/// assert_eq!(name, "-Add_Column");
/// ```
pub fn parse_order_prefix(entry_name: &str) -> Option<(Decimal, &str)> {
    let found = order_prefix().find(entry_name)?;
    let key = found.as_str().replace('_', ".");
    let order = Decimal::from_str(&key).ok()?;
    Some((order, &entry_name[found.end()..]))
}

/// One orderable unit of change.
///
/// Equality is numeric `order` plus exact `name`; ordering (see
/// [`ChangeScript::cmp_order`]) uses `order` alone, so the type deliberately
/// does not implement `Ord`.
#[derive(Debug, Clone)]
pub struct ChangeScript {
    order: Decimal,
    name: String,
    content: Option<PathBuf>,
    ledger_id: Option<i64>,
}

impl ChangeScript {
    /// Build a descriptor from a directory entry under a script root.
    pub fn from_entry(path: &Path) -> CoreResult<Self> {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let parent = path
            .parent()
            .map(|p| p.display().to_string())
            .unwrap_or_default();

        let (order, name) =
            parse_order_prefix(&file_name).ok_or_else(|| CoreError::OrderParse {
                name: file_name.clone(),
                dir: parent,
            })?;

        Ok(Self {
            order,
            name: name.to_string(),
            content: Some(path.to_path_buf()),
            ledger_id: None,
        })
    }

    /// Build a descriptor from a ledger row.
    pub fn from_ledger(ledger_id: i64, order: Decimal, name: impl Into<String>) -> Self {
        Self {
            order,
            name: name.into(),
            content: None,
            ledger_id: Some(ledger_id),
        }
    }

    /// Build a descriptor with no backing content or ledger identity.
    pub fn new(order: Decimal, name: impl Into<String>) -> Self {
        Self {
            order,
            name: name.into(),
            content: None,
            ledger_id: None,
        }
    }

    /// Attach the ledger identity assigned on insert.
    pub fn with_ledger_id(mut self, ledger_id: i64) -> Self {
        self.ledger_id = Some(ledger_id);
        self
    }

    /// Ordering key.
    pub fn order(&self) -> Decimal {
        self.order
    }

    /// Display name (the entry name after the ordering key).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Directory holding this script's SQL files, for filesystem descriptors.
    pub fn content(&self) -> Option<&Path> {
        self.content.as_deref()
    }

    /// Ledger surrogate id, for ledger descriptors.
    pub fn ledger_id(&self) -> Option<i64> {
        self.ledger_id
    }

    /// Compare by `order` only.
    pub fn cmp_order(&self, other: &Self) -> Ordering {
        self.order.cmp(&other.order)
    }
}

impl PartialEq for ChangeScript {
    fn eq(&self, other: &Self) -> bool {
        self.order == other.order && self.name == other.name
    }
}

impl Eq for ChangeScript {}

impl Hash for ChangeScript {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Decimal hashes its normalized value, so 1.5 and 1.50 collide as they should.
        self.order.hash(state);
    }
}

impl fmt::Display for ChangeScript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "scriptId:")?;
        if let Some(id) = self.ledger_id {
            write!(f, "{}", id)?;
        }
        write!(f, ", order:{}, name:{}", self.order.normalize(), self.name)
    }
}

/// Sort descriptors ascending by `order`.
///
/// The sort is stable, so entries with equal orders keep their input order.
pub fn sort_scripts(scripts: &mut [ChangeScript]) {
    scripts.sort_by(ChangeScript::cmp_order);
}

#[cfg(test)]
#[path = "script_test.rs"]
mod tests;
