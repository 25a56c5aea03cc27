use anyhow::Result;
use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::LimitStore;
use crate::db::Database;
use crate::models::Limit;

/// Read access the evaluator needs from the data store.
pub(crate) trait Ledger {
    /// Limits of a profile in id order, optionally for one category.
    fn list_limits(&self, profile_id: i64, category_id: Option<i64>) -> Result<Vec<Limit>>;

    fn category_name(&self, category_id: i64) -> Result<Option<String>>;

    /// Expense total for a category with `from..=to` dates. Zero when empty.
    fn total_spent(
        &self,
        profile_id: i64,
        category_id: i64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Decimal>;
}

impl Ledger for Database {
    fn list_limits(&self, profile_id: i64, category_id: Option<i64>) -> Result<Vec<Limit>> {
        Ok(LimitStore::new(self).list(profile_id, category_id)?)
    }

    fn category_name(&self, category_id: i64) -> Result<Option<String>> {
        Ok(self.get_category_by_id(category_id)?.map(|c| c.name))
    }

    fn total_spent(
        &self,
        profile_id: i64,
        category_id: i64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Decimal> {
        self.sum_expense(profile_id, category_id, from, to)
    }
}
