mod schema;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::types::Type;
use rusqlite::{params, Connection, Row};
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;

use crate::models::*;

const DATE_FORMAT: &str = "%Y-%m-%d";

pub(crate) struct Database {
    conn: Connection,
}

impl Database {
    pub(crate) fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")
            .context("Failed to set database pragmas")?;
        let mut db = Self { conn };
        db.migrate().context("Database migration failed")?;
        Ok(db)
    }

    #[cfg(test)]
    pub(crate) fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        let mut db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&mut self) -> Result<()> {
        let has_version_table: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
            [],
            |row| row.get(0),
        )?;

        if !has_version_table {
            // Fresh database - apply full schema
            self.conn.execute_batch(schema::SCHEMA_V1)?;
            self.conn.execute(
                "INSERT INTO schema_version (version) VALUES (?1)",
                params![schema::CURRENT_VERSION],
            )?;
            return Ok(());
        }

        let current: i32 = self
            .conn
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                row.get(0)
            })
            .unwrap_or(0);

        for &(from_version, sql) in schema::MIGRATIONS {
            if current <= from_version {
                self.conn.execute_batch(sql)?;
            }
        }

        if current < schema::CURRENT_VERSION {
            self.conn.execute(
                "UPDATE schema_version SET version = ?1",
                params![schema::CURRENT_VERSION],
            )?;
        }

        Ok(())
    }

    // ── Profiles ──────────────────────────────────────────────

    /// Creates a profile together with its default categories.
    pub(crate) fn create_profile(&mut self, profile: &Profile) -> Result<i64> {
        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO profiles (login, created_at) VALUES (?1, ?2)",
            params![profile.login, profile.created_at],
        )
        .with_context(|| format!("Failed to create profile '{}'", profile.login))?;
        let profile_id = tx.last_insert_rowid();
        for (name, kind) in schema::DEFAULT_CATEGORIES {
            tx.execute(
                "INSERT INTO categories (profile_id, name, kind) VALUES (?1, ?2, ?3)",
                params![profile_id, name, kind],
            )?;
        }
        tx.commit()?;
        Ok(profile_id)
    }

    pub(crate) fn get_profiles(&self) -> Result<Vec<Profile>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, login, created_at FROM profiles ORDER BY login")?;
        let rows = stmt.query_map([], |row| {
            Ok(Profile {
                id: Some(row.get(0)?),
                login: row.get(1)?,
                created_at: row.get(2)?,
            })
        })?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub(crate) fn get_profile_by_login(&self, login: &str) -> Result<Option<Profile>> {
        let result = self.conn.query_row(
            "SELECT id, login, created_at FROM profiles WHERE login = ?1",
            params![login],
            |row| {
                Ok(Profile {
                    id: Some(row.get(0)?),
                    login: row.get(1)?,
                    created_at: row.get(2)?,
                })
            },
        );
        match result {
            Ok(p) => Ok(Some(p)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    // ── Categories ────────────────────────────────────────────

    pub(crate) fn insert_category(&self, cat: &Category) -> Result<i64> {
        self.conn
            .execute(
                "INSERT INTO categories (profile_id, name, kind) VALUES (?1, ?2, ?3)",
                params![cat.profile_id, cat.name, cat.kind.as_str()],
            )
            .with_context(|| format!("Failed to create category '{}'", cat.name))?;
        Ok(self.conn.last_insert_rowid())
    }

    pub(crate) fn get_categories(&self, profile_id: i64) -> Result<Vec<Category>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, profile_id, name, kind FROM categories WHERE profile_id = ?1 ORDER BY name",
        )?;
        let rows = stmt.query_map(params![profile_id], category_from_row)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub(crate) fn get_category_by_id(&self, id: i64) -> Result<Option<Category>> {
        let result = self.conn.query_row(
            "SELECT id, profile_id, name, kind FROM categories WHERE id = ?1",
            params![id],
            category_from_row,
        );
        match result {
            Ok(c) => Ok(Some(c)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    // ── Transactions ──────────────────────────────────────────

    pub(crate) fn insert_transaction(&self, txn: &Transaction) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO transactions (profile_id, date, category_id, kind, amount, description)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                txn.profile_id,
                txn.date.format(DATE_FORMAT).to_string(),
                txn.category_id,
                txn.kind.as_str(),
                txn.amount.to_string(),
                txn.description,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Rewrites every editable field of an existing transaction.
    /// Returns `false` when no row with that id belongs to the profile.
    pub(crate) fn update_transaction(&self, id: i64, txn: &Transaction) -> Result<bool> {
        let changed = self.conn.execute(
            "UPDATE transactions
             SET date = ?1, category_id = ?2, kind = ?3, amount = ?4, description = ?5
             WHERE id = ?6 AND profile_id = ?7",
            params![
                txn.date.format(DATE_FORMAT).to_string(),
                txn.category_id,
                txn.kind.as_str(),
                txn.amount.to_string(),
                txn.description,
                id,
                txn.profile_id,
            ],
        )?;
        Ok(changed > 0)
    }

    pub(crate) fn delete_transaction(&self, profile_id: i64, id: i64) -> Result<bool> {
        let changed = self.conn.execute(
            "DELETE FROM transactions WHERE id = ?1 AND profile_id = ?2",
            params![id, profile_id],
        )?;
        Ok(changed > 0)
    }

    pub(crate) fn get_transactions(
        &self,
        profile_id: i64,
        category_id: Option<i64>,
        limit: Option<u32>,
    ) -> Result<Vec<Transaction>> {
        let mut sql = String::from(
            "SELECT id, profile_id, date, category_id, kind, amount, description
             FROM transactions WHERE profile_id = ?1",
        );
        let mut param_values: Vec<Box<dyn rusqlite::types::ToSql>> = vec![Box::new(profile_id)];

        if let Some(cid) = category_id {
            sql.push_str(&format!(" AND category_id = ?{}", param_values.len() + 1));
            param_values.push(Box::new(cid));
        }

        sql.push_str(" ORDER BY date DESC, id DESC");

        if let Some(l) = limit {
            sql.push_str(&format!(" LIMIT {l}"));
        }

        let params_ref: Vec<&dyn rusqlite::types::ToSql> =
            param_values.iter().map(|p| p.as_ref()).collect();

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_ref.as_slice(), transaction_from_row)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub(crate) fn get_transaction(&self, profile_id: i64, id: i64) -> Result<Option<Transaction>> {
        let result = self.conn.query_row(
            "SELECT id, profile_id, date, category_id, kind, amount, description
             FROM transactions WHERE id = ?1 AND profile_id = ?2",
            params![id, profile_id],
            transaction_from_row,
        );
        match result {
            Ok(t) => Ok(Some(t)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Sum of expense amounts for one category, dates inclusive.
    ///
    /// Amounts are stored as TEXT and added up as `Decimal` here rather than
    /// with SQL `SUM`, which would go through floating point.
    pub(crate) fn sum_expense(
        &self,
        profile_id: i64,
        category_id: i64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Decimal> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT amount FROM transactions
             WHERE profile_id = ?1 AND category_id = ?2 AND kind = 'expense'
               AND date BETWEEN ?3 AND ?4",
        )?;
        let rows = stmt.query_map(
            params![
                profile_id,
                category_id,
                from.format(DATE_FORMAT).to_string(),
                to.format(DATE_FORMAT).to_string(),
            ],
            |row| amount_at(row, 0),
        )?;
        let mut total = Decimal::ZERO;
        for amount in rows {
            total = total.checked_add(amount?).with_context(|| {
                format!("Expense total for category {category_id} overflowed between {from} and {to}")
            })?;
        }
        Ok(total)
    }

    // ── Limits ────────────────────────────────────────────────

    pub(crate) fn get_limits(&self, profile_id: i64, category_id: Option<i64>) -> Result<Vec<Limit>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, profile_id, category_id, amount, period FROM limits
             WHERE profile_id = ?1 AND (?2 IS NULL OR category_id = ?2)
             ORDER BY id",
        )?;
        let rows = stmt.query_map(params![profile_id, category_id], limit_from_row)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub(crate) fn get_limit(&self, profile_id: i64, id: i64) -> Result<Option<Limit>> {
        let result = self.conn.query_row(
            "SELECT id, profile_id, category_id, amount, period FROM limits
             WHERE id = ?1 AND profile_id = ?2",
            params![id, profile_id],
            limit_from_row,
        );
        match result {
            Ok(l) => Ok(Some(l)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Id of another limit already covering (profile, category, period).
    pub(crate) fn find_conflicting_limit(
        &self,
        profile_id: i64,
        category_id: i64,
        period: Period,
        exclude_id: Option<i64>,
    ) -> Result<Option<i64>> {
        let result = self.conn.query_row(
            "SELECT id FROM limits
             WHERE profile_id = ?1 AND category_id = ?2 AND period = ?3 AND id != ?4",
            params![profile_id, category_id, period.as_str(), exclude_id.unwrap_or(0)],
            |row| row.get(0),
        );
        match result {
            Ok(id) => Ok(Some(id)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub(crate) fn insert_limit(&self, profile_id: i64, draft: &LimitDraft) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO limits (profile_id, category_id, amount, period) VALUES (?1, ?2, ?3, ?4)",
            params![
                profile_id,
                draft.category_id,
                draft.amount.to_string(),
                draft.period.as_str(),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub(crate) fn update_limit(&self, profile_id: i64, id: i64, draft: &LimitDraft) -> Result<bool> {
        let changed = self.conn.execute(
            "UPDATE limits SET category_id = ?1, amount = ?2, period = ?3
             WHERE id = ?4 AND profile_id = ?5",
            params![
                draft.category_id,
                draft.amount.to_string(),
                draft.period.as_str(),
                id,
                profile_id,
            ],
        )?;
        Ok(changed > 0)
    }

    pub(crate) fn delete_limit(&self, profile_id: i64, id: i64) -> Result<bool> {
        let changed = self.conn.execute(
            "DELETE FROM limits WHERE id = ?1 AND profile_id = ?2",
            params![id, profile_id],
        )?;
        Ok(changed > 0)
    }
}

// ── Row mapping ───────────────────────────────────────────────

fn category_from_row(row: &Row<'_>) -> rusqlite::Result<Category> {
    let kind: String = row.get(3)?;
    Ok(Category {
        id: Some(row.get(0)?),
        profile_id: row.get(1)?,
        name: row.get(2)?,
        kind: CategoryKind::parse(&kind).ok_or(bad_tag(3, kind))?,
    })
}

fn transaction_from_row(row: &Row<'_>) -> rusqlite::Result<Transaction> {
    let date: String = row.get(2)?;
    let kind: String = row.get(4)?;
    Ok(Transaction {
        id: Some(row.get(0)?),
        profile_id: row.get(1)?,
        date: NaiveDate::parse_from_str(&date, DATE_FORMAT)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(e)))?,
        category_id: row.get(3)?,
        kind: CategoryKind::parse(&kind).ok_or(bad_tag(4, kind))?,
        amount: amount_at(row, 5)?,
        description: row.get(6)?,
    })
}

fn limit_from_row(row: &Row<'_>) -> rusqlite::Result<Limit> {
    let period: String = row.get(4)?;
    Ok(Limit {
        id: row.get(0)?,
        profile_id: row.get(1)?,
        category_id: row.get(2)?,
        amount: amount_at(row, 3)?,
        period: Period::parse(&period).ok_or(bad_tag(4, period))?,
    })
}

fn amount_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<Decimal> {
    let raw: String = row.get(idx)?;
    Decimal::from_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn bad_tag(idx: usize, tag: String) -> rusqlite::Error {
    rusqlite::Error::InvalidColumnType(idx, tag, Type::Text)
}

#[cfg(test)]
mod tests;
