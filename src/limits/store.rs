use rust_decimal::Decimal;
use tracing::info;

use super::{LimitError, LimitResult};
use crate::db::Database;
use crate::models::{Limit, LimitDraft};

/// Largest amount a single limit may cap.
pub(crate) fn max_limit_amount() -> Decimal {
    Decimal::new(1_000_000, 0)
}

/// Validated CRUD over a profile's limits.
pub(crate) struct LimitStore<'a> {
    db: &'a Database,
}

impl<'a> LimitStore<'a> {
    pub(crate) fn new(db: &'a Database) -> Self {
        Self { db }
    }

    pub(crate) fn list(&self, profile_id: i64, category_id: Option<i64>) -> LimitResult<Vec<Limit>> {
        Ok(self.db.get_limits(profile_id, category_id)?)
    }

    pub(crate) fn get(&self, profile_id: i64, limit_id: i64) -> LimitResult<Limit> {
        self.db
            .get_limit(profile_id, limit_id)?
            .ok_or(LimitError::NotFound(limit_id))
    }

    pub(crate) fn create(&self, profile_id: i64, draft: &LimitDraft) -> LimitResult<Limit> {
        let category = self.validate(profile_id, draft, None)?;
        let id = self
            .db
            .insert_limit(profile_id, draft)
            .map_err(write_error)?;
        info!(
            limit_id = id,
            category = %category,
            amount = %draft.amount,
            period = draft.period.as_str(),
            "limit created"
        );
        Ok(Limit {
            id,
            profile_id,
            category_id: draft.category_id,
            amount: draft.amount,
            period: draft.period,
        })
    }

    pub(crate) fn update(
        &self,
        profile_id: i64,
        limit_id: i64,
        draft: &LimitDraft,
    ) -> LimitResult<Limit> {
        // Existence first: editing a missing limit is NotFound, not a bad draft.
        self.get(profile_id, limit_id)?;
        let category = self.validate(profile_id, draft, Some(limit_id))?;
        let changed = self
            .db
            .update_limit(profile_id, limit_id, draft)
            .map_err(write_error)?;
        if !changed {
            return Err(LimitError::NotFound(limit_id));
        }
        info!(
            limit_id,
            category = %category,
            amount = %draft.amount,
            period = draft.period.as_str(),
            "limit updated"
        );
        Ok(Limit {
            id: limit_id,
            profile_id,
            category_id: draft.category_id,
            amount: draft.amount,
            period: draft.period,
        })
    }

    /// Deleting an id that does not exist is a no-op and returns `false`.
    pub(crate) fn delete(&self, profile_id: i64, limit_id: i64) -> LimitResult<bool> {
        let deleted = self.db.delete_limit(profile_id, limit_id)?;
        if deleted {
            info!(limit_id, "limit deleted");
        }
        Ok(deleted)
    }

    /// Checks a draft and returns the category name for messages.
    fn validate(
        &self,
        profile_id: i64,
        draft: &LimitDraft,
        editing: Option<i64>,
    ) -> LimitResult<String> {
        if draft.amount <= Decimal::ZERO {
            return Err(LimitError::invalid("Limit amount must be positive"));
        }
        if draft.amount > max_limit_amount() {
            return Err(LimitError::invalid(format!(
                "Limit amount must not exceed {}",
                max_limit_amount()
            )));
        }
        if draft.amount.normalize().scale() > 2 {
            return Err(LimitError::invalid(
                "Limit amount must have at most 2 decimal places",
            ));
        }

        let category = self
            .db
            .get_category_by_id(draft.category_id)?
            .filter(|c| c.profile_id == profile_id)
            .ok_or_else(|| {
                LimitError::invalid(format!("Category {} not found", draft.category_id))
            })?;
        if !category.is_expense() {
            return Err(LimitError::invalid(format!(
                "Limits apply to expense categories only; '{}' is an income category",
                category.name
            )));
        }

        if self
            .db
            .find_conflicting_limit(profile_id, draft.category_id, draft.period, editing)?
            .is_some()
        {
            return Err(duplicate(&category.name, draft));
        }

        Ok(category.name)
    }
}

fn duplicate(category: &str, draft: &LimitDraft) -> LimitError {
    LimitError::invalid(format!(
        "A {} limit for '{category}' already exists",
        draft.period.label().to_lowercase()
    ))
}

/// A constraint violation on write is the unique (profile, category, period)
/// index; anything else is a storage failure.
fn write_error(err: anyhow::Error) -> LimitError {
    match err.downcast_ref::<rusqlite::Error>() {
        Some(rusqlite::Error::SqliteFailure(e, _))
            if e.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            LimitError::invalid("A limit for this category and period already exists")
        }
        _ => LimitError::Storage(err),
    }
}
