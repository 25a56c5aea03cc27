mod cli;
mod tui;

pub(crate) use cli::as_cli;
pub(crate) use tui::as_tui;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};

use crate::db::Database;

/// Id of the profile `login`, which must already exist.
pub(crate) fn profile_id(db: &Database, login: &str) -> Result<i64> {
    db.get_profile_by_login(login)?
        .and_then(|p| p.id)
        .with_context(|| {
            format!("Profile '{login}' not found. Create it with: spendguard profile add {login}")
        })
}

pub(crate) fn today() -> NaiveDate {
    Local::now().date_naive()
}
