//! The script ledger: an append-only record of applied change scripts
//!
//! One row per applied [`ChangeScript`], keyed by a sequence-generated id and
//! unique on `orderby`. A row at `orderby = -1` whose name matches the
//! configured marker requests a forced rebuild.

use crate::error::{DbError, DbResult};
use crate::traits::Database;
use chrono::NaiveDateTime;
use dbb_core::{ChangeScript, Decimal, LedgerSnapshot};
use std::str::FromStr;

/// Ledger table name
pub const LEDGER_TABLE: &str = "DB_BUILD_SCRIPTS";

/// Sequence feeding `scriptId`
pub const LEDGER_SEQUENCE: &str = "DB_BUILD_SCRIPT_SEQ";

/// `orderby` value reserved for the forced-rebuild marker row
pub const FORCED_REBUILD_ORDER: i64 = -1;

/// Maximum length of `scriptname`
pub const MAX_NAME_LEN: usize = 128;

/// Fractional digits `orderby` can hold
const ORDER_SCALE: u32 = 6;

/// Integer digits `orderby` can hold (DECIMAL(18,6))
const ORDER_INTEGER_DIGITS: u32 = 12;

const CREATED_ON_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One ledger row
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerEntry {
    pub script_id: i64,
    pub order: Decimal,
    pub name: String,
    pub created_on: NaiveDateTime,
}

impl LedgerEntry {
    /// Descriptor view of this row
    pub fn to_script(&self) -> ChangeScript {
        ChangeScript::from_ledger(self.script_id, self.order, self.name.clone())
    }
}

/// Ledger operations over one session
pub struct Ledger<'a> {
    db: &'a dyn Database,
}

impl<'a> Ledger<'a> {
    pub fn new(db: &'a dyn Database) -> Self {
        Self { db }
    }

    /// Whether the ledger table exists in the session's schema
    pub async fn exists(&self) -> DbResult<bool> {
        self.db
            .relation_exists(LEDGER_TABLE)
            .await
            .map_err(|e| DbError::ledger("checking ledger table", e))
    }

    /// Whether the id sequence exists in the session's schema
    pub async fn sequence_exists(&self) -> DbResult<bool> {
        self.db
            .sequence_exists(LEDGER_SEQUENCE)
            .await
            .map_err(|e| DbError::ledger("checking ledger sequence", e))
    }

    /// Create the sequence (if missing) and the table.
    pub async fn create(&self) -> DbResult<()> {
        let create_sequence = format!(
            "CREATE SEQUENCE IF NOT EXISTS {} START WITH 1",
            LEDGER_SEQUENCE
        );
        let create_table = format!(
            "CREATE TABLE {} (\
             scriptId INTEGER PRIMARY KEY, \
             orderby DECIMAL(18,6) NOT NULL UNIQUE, \
             scriptname VARCHAR({}) NOT NULL, \
             createdOn TIMESTAMP NOT NULL)",
            LEDGER_TABLE, MAX_NAME_LEN
        );

        self.db
            .execute(&create_sequence)
            .await
            .map_err(|e| DbError::ledger("creating ledger sequence", e))?;
        self.db
            .execute(&create_table)
            .await
            .map_err(|e| DbError::ledger("creating ledger table", e))?;

        log::info!("Created ledger table {}", LEDGER_TABLE);
        Ok(())
    }

    /// Create the ledger if the table is missing. Returns true when it was created.
    pub async fn ensure_exists(&self) -> DbResult<bool> {
        if self.exists().await? {
            return Ok(false);
        }
        if self.sequence_exists().await? {
            log::debug!(
                "Sequence {} exists without table {}",
                LEDGER_SEQUENCE,
                LEDGER_TABLE
            );
        }
        self.create().await?;
        Ok(true)
    }

    /// The entry with the greatest order, ignoring the forced-rebuild marker.
    pub async fn latest(&self) -> DbResult<Option<ChangeScript>> {
        let sql = format!(
            "SELECT CAST(scriptId AS VARCHAR), CAST(orderby AS VARCHAR), scriptname FROM {t} \
             WHERE orderby = (SELECT MAX(orderby) FROM {t} WHERE orderby <> {marker})",
            t = LEDGER_TABLE,
            marker = FORCED_REBUILD_ORDER
        );
        let rows = self
            .db
            .query_rows(&sql, &[])
            .await
            .map_err(|e| DbError::ledger("reading latest entry", e))?;

        match rows.into_iter().next() {
            Some(row) => {
                let (id, order, name) = parse_identity_row(&row)?;
                Ok(Some(ChangeScript::from_ledger(id, order, name)))
            }
            None => Ok(None),
        }
    }

    /// Whether the forced-rebuild marker row is present
    pub async fn has_forced_rebuild_marker(&self, marker: &str) -> DbResult<bool> {
        log::info!("Checking for forced rebuild");
        let sql = format!(
            "SELECT CAST(scriptId AS VARCHAR) FROM {} WHERE orderby = {} AND scriptname = ?",
            LEDGER_TABLE, FORCED_REBUILD_ORDER
        );
        let rows = self
            .db
            .query_rows(&sql, &[marker])
            .await
            .map_err(|e| DbError::ledger("checking forced rebuild marker", e))?;
        let found = !rows.is_empty();
        log::info!("Forced rebuild marker present: {}", found);
        Ok(found)
    }

    /// Read what reconciliation needs. A missing table reads as an empty ledger.
    pub async fn snapshot(&self, marker: Option<&str>) -> DbResult<LedgerSnapshot> {
        if !self.exists().await? {
            return Ok(LedgerSnapshot::default());
        }
        let forced_rebuild = match marker {
            Some(marker) => self.has_forced_rebuild_marker(marker).await?,
            None => false,
        };
        Ok(LedgerSnapshot {
            latest: self.latest().await?,
            forced_rebuild,
        })
    }

    /// Record an applied script and return it carrying its new ledger id.
    pub async fn append(&self, script: &ChangeScript) -> DbResult<ChangeScript> {
        let order = validate_order(script.order())?;
        if script.name().chars().count() > MAX_NAME_LEN {
            return Err(DbError::LedgerError(format!(
                "script name '{}' exceeds {} characters",
                script.name(),
                MAX_NAME_LEN
            )));
        }

        let insert = format!(
            "INSERT INTO {} (scriptId, orderby, scriptname, createdOn) \
             VALUES (nextval('{}'), CAST(? AS DECIMAL(18,6)), ?, CAST(current_timestamp AS TIMESTAMP))",
            LEDGER_TABLE, LEDGER_SEQUENCE
        );
        self.db
            .execute_with_params(&insert, &[order.as_str(), script.name()])
            .await
            .map_err(|e| DbError::ledger(&format!("recording {}", script), e))?;

        let select = format!(
            "SELECT CAST(scriptId AS VARCHAR) FROM {} WHERE orderby = CAST(? AS DECIMAL(18,6))",
            LEDGER_TABLE
        );
        let rows = self
            .db
            .query_rows(&select, &[order.as_str()])
            .await
            .map_err(|e| DbError::ledger("reading assigned id", e))?;
        let id = rows
            .first()
            .and_then(|row| row.first())
            .and_then(|v| v.as_deref())
            .ok_or_else(|| {
                DbError::LedgerError(format!("no ledger row found for order {}", order))
            })
            .and_then(parse_id)?;

        let recorded = script.clone().with_ledger_id(id);
        log::info!("Recorded {}", recorded);
        Ok(recorded)
    }

    /// Insert the forced-rebuild marker row
    pub async fn insert_marker(&self, marker: &str) -> DbResult<()> {
        let sql = format!(
            "INSERT INTO {} (scriptId, orderby, scriptname, createdOn) \
             VALUES (nextval('{}'), {}, ?, CAST(current_timestamp AS TIMESTAMP))",
            LEDGER_TABLE, LEDGER_SEQUENCE, FORCED_REBUILD_ORDER
        );
        self.db
            .execute_with_params(&sql, &[marker])
            .await
            .map_err(|e| DbError::ledger("inserting forced rebuild marker", e))?;
        Ok(())
    }

    /// Every row, ascending by order
    pub async fn entries(&self) -> DbResult<Vec<LedgerEntry>> {
        let sql = format!(
            "SELECT CAST(scriptId AS VARCHAR), CAST(orderby AS VARCHAR), scriptname, \
             strftime(createdOn, '{}') FROM {} ORDER BY orderby",
            CREATED_ON_FORMAT, LEDGER_TABLE
        );
        let rows = self
            .db
            .query_rows(&sql, &[])
            .await
            .map_err(|e| DbError::ledger("listing entries", e))?;

        rows.iter()
            .map(|row| {
                let (script_id, order, name) = parse_identity_row(row)?;
                let created = column(row, 3, "createdOn")?;
                let created_on = NaiveDateTime::parse_from_str(created, CREATED_ON_FORMAT)
                    .map_err(|e| {
                        DbError::LedgerError(format!("invalid createdOn '{}': {}", created, e))
                    })?;
                Ok(LedgerEntry {
                    script_id,
                    order,
                    name,
                    created_on,
                })
            })
            .collect()
    }
}

/// Render an order for the DECIMAL(18,6) column, rejecting values it cannot hold.
fn validate_order(order: Decimal) -> DbResult<String> {
    let normalized = order.normalize();
    let limit = Decimal::from(10_i64.pow(ORDER_INTEGER_DIGITS));
    if normalized.scale() > ORDER_SCALE || normalized.abs() >= limit {
        return Err(DbError::LedgerError(format!(
            "order {} does not fit DECIMAL(18,6)",
            normalized
        )));
    }
    Ok(normalized.to_string())
}

fn column<'r>(row: &'r [Option<String>], idx: usize, name: &str) -> DbResult<&'r str> {
    row.get(idx)
        .and_then(|v| v.as_deref())
        .ok_or_else(|| DbError::LedgerError(format!("ledger row is missing {}", name)))
}

fn parse_id(value: &str) -> DbResult<i64> {
    value
        .parse::<i64>()
        .map_err(|e| DbError::LedgerError(format!("invalid scriptId '{}': {}", value, e)))
}

fn parse_identity_row(row: &[Option<String>]) -> DbResult<(i64, Decimal, String)> {
    let id = parse_id(column(row, 0, "scriptId")?)?;
    let raw_order = column(row, 1, "orderby")?;
    let order = Decimal::from_str(raw_order)
        .map_err(|e| DbError::LedgerError(format!("invalid orderby '{}': {}", raw_order, e)))?;
    let name = column(row, 2, "scriptname")?.to_string();
    Ok((id, order, name))
}

#[cfg(test)]
#[path = "ledger_test.rs"]
mod tests;
