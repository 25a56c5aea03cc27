use anyhow::Result;
use std::collections::VecDeque;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::db::Database;
use crate::limits::{
    LimitAlert, LimitEvaluator, LimitStatus, LimitStore, RefreshScheduler, TracingSink,
};
use crate::models::Category;
use crate::run::today;
use crate::ui::util::clamp_cursor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InputMode {
    Normal,
    Command,
    Confirm,
}

impl std::fmt::Display for InputMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Normal => write!(f, "NORMAL"),
            Self::Command => write!(f, "COMMAND"),
            Self::Confirm => write!(f, "CONFIRM"),
        }
    }
}

/// Pending action that requires user confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PendingAction {
    DeleteLimit { id: i64, category: String },
}

pub(crate) struct App {
    pub(crate) running: bool,
    pub(crate) input_mode: InputMode,
    pub(crate) command_input: String,
    pub(crate) status_message: String,
    pub(crate) show_help: bool,

    pub(crate) profile_id: i64,
    pub(crate) profile_login: String,
    pub(crate) categories: Vec<Category>,
    pub(crate) category_filter: Option<i64>,

    // Limit table
    pub(crate) rows: Vec<LimitStatus>,
    pub(crate) row_index: usize,
    pub(crate) row_scroll: usize,
    pub(crate) last_refresh: Option<u64>,

    // Engine
    pub(crate) evaluator: LimitEvaluator,
    pub(crate) scheduler: RefreshScheduler<&'static str>,
    /// Alerts not yet dismissed, oldest first.
    pub(crate) alerts: VecDeque<LimitAlert>,

    // Confirmation
    pub(crate) pending_action: Option<PendingAction>,
    pub(crate) confirm_message: String,

    // Layout (updated each render frame)
    pub(crate) visible_rows: usize,
}

impl App {
    pub(crate) fn new(profile_id: i64, profile_login: String, debounce: Duration) -> Self {
        Self {
            running: true,
            input_mode: InputMode::Normal,
            command_input: String::new(),
            status_message: String::new(),
            show_help: false,

            profile_id,
            profile_login,
            categories: Vec::new(),
            category_filter: None,

            rows: Vec::new(),
            row_index: 0,
            row_scroll: 0,
            last_refresh: None,

            evaluator: LimitEvaluator::new(),
            scheduler: RefreshScheduler::new(debounce),
            alerts: VecDeque::new(),

            pending_action: None,
            confirm_message: String::new(),

            visible_rows: 20,
        }
    }

    pub(crate) fn refresh_categories(&mut self, db: &Database) -> Result<()> {
        self.categories = db.get_categories(self.profile_id)?;
        Ok(())
    }

    /// Queue a debounced re-evaluation.
    pub(crate) fn request_refresh(&mut self, reason: &'static str) {
        let generation = self.scheduler.request(reason, Instant::now());
        debug!(generation, reason, "refresh requested");
    }

    /// Runs the pending refresh if its quiet period is over.
    pub(crate) fn run_due_refresh(&mut self, db: &Database, now: Instant) {
        if let Some(due) = self.scheduler.take_due(now) {
            debug!(generation = due.generation, reason = due.request, "refresh due");
            self.evaluate(db, due.generation);
        }
    }

    /// Evaluates right away, superseding anything pending.
    pub(crate) fn refresh_now(&mut self, db: &Database) {
        let generation = match self.scheduler.flush() {
            Some(due) => due.generation,
            None => self.scheduler.generation(),
        };
        self.evaluate(db, generation);
    }

    /// On failure the previous rows stay on screen.
    fn evaluate(&mut self, db: &Database, generation: u64) {
        let mut sink = (TracingSink, Vec::<LimitAlert>::new());
        match self.evaluator.evaluate(
            db,
            &mut sink,
            self.profile_id,
            self.category_filter,
            today(),
        ) {
            Ok(rows) => {
                self.rows = rows;
                self.last_refresh = Some(generation);
                clamp_cursor(&mut self.row_index, &mut self.row_scroll, self.rows.len());
                self.alerts.extend(sink.1);
            }
            Err(e) => {
                warn!(error = %e, "limit evaluation failed");
                self.set_status(format!("Refresh failed: {e}"));
            }
        }
    }

    pub(crate) fn selected_row(&self) -> Option<&LimitStatus> {
        self.rows.get(self.row_index)
    }

    pub(crate) fn delete_limit(&mut self, db: &Database, id: i64, category: &str) {
        let store = LimitStore::new(db);
        match self.evaluator.delete_limit(&store, self.profile_id, id) {
            Ok(true) => {
                self.set_status(format!("Deleted limit for '{category}'"));
                self.request_refresh("limit deleted");
            }
            Ok(false) => self.set_status(format!("Limit #{id} no longer exists")),
            Err(e) => self.set_status(format!("Delete failed: {e}")),
        }
    }

    pub(crate) fn filter_name(&self) -> Option<&str> {
        self.category_filter
            .and_then(|id| Category::find_by_id(&self.categories, id))
            .map(|c| c.name.as_str())
    }

    pub(crate) fn dismiss_alert(&mut self) -> Option<LimitAlert> {
        self.alerts.pop_front()
    }

    pub(crate) fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = msg.into();
    }
}
