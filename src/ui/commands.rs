use std::collections::HashMap;
use std::sync::LazyLock;

use chrono::Local;

use super::app::{App, InputMode, PendingAction};
use crate::db::Database;
use crate::limits::LimitStore;
use crate::models::{Category, CategoryKind, LimitDraft, Period, Transaction};
use crate::ui::util::{format_amount, parse_amount};

pub(crate) struct Command {
    pub(crate) description: &'static str,
    pub(crate) run: fn(&str, &mut App, &mut Database) -> anyhow::Result<()>,
}

macro_rules! register_command {
    ($name:expr, $desc:expr, $func:expr, $registry:expr) => {{
        $registry.insert(
            $name,
            Command {
                description: $desc,
                run: $func,
            },
        );
    }};
}

pub(crate) static COMMANDS: LazyLock<HashMap<&str, Command>> = LazyLock::new(|| {
    let mut r: HashMap<&str, Command> = HashMap::new();

    register_command!("q", "Quit SpendGuard", cmd_quit, r);
    register_command!("quit", "Quit SpendGuard", cmd_quit, r);
    register_command!("help", "Show available commands", cmd_help, r);
    register_command!("h", "Show available commands", cmd_help, r);
    register_command!(
        "limit",
        "Add limit (e.g. :limit Groceries 400 month)",
        cmd_limit,
        r
    );
    register_command!("l", "Add limit (e.g. :l Groceries 400)", cmd_limit, r);
    register_command!(
        "edit-limit",
        "Edit selected limit (e.g. :edit-limit 450 week)",
        cmd_edit_limit,
        r
    );
    register_command!(
        "delete-limit",
        "Delete selected limit",
        cmd_delete_limit,
        r
    );
    register_command!(
        "spend",
        "Record expense today (e.g. :spend Groceries 42.50)",
        cmd_spend,
        r
    );
    register_command!("s", "Record expense (e.g. :s Groceries 42.50)", cmd_spend, r);
    register_command!(
        "income",
        "Record income today (e.g. :income Salary 2500)",
        cmd_income,
        r
    );
    register_command!(
        "category",
        "Create category (e.g. :category Dining out expense)",
        cmd_category,
        r
    );
    register_command!(
        "filter",
        "Show one category's limits; no argument clears (e.g. :filter Groceries)",
        cmd_filter,
        r
    );
    register_command!("f", "Filter by category", cmd_filter, r);
    register_command!("refresh", "Re-evaluate limits now", cmd_refresh, r);
    register_command!("r", "Re-evaluate limits now", cmd_refresh, r);

    r
});

pub(crate) fn handle_command(input: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    let trimmed = input.trim();
    let (cmd_name, args) = trimmed.split_once(' ').unwrap_or((trimmed, ""));
    let args = args.trim();

    if let Some(cmd) = COMMANDS.get(cmd_name) {
        (cmd.run)(args, app, db)?;
    } else if !cmd_name.is_empty() {
        let suggestion = find_closest(cmd_name);
        app.set_status(format!(
            "Unknown command: :{cmd_name}. Did you mean :{suggestion}?"
        ));
    }

    Ok(())
}

fn find_closest(input: &str) -> &'static str {
    COMMANDS
        .keys()
        .filter(|k| k.len() > 1)
        .min_by_key(|k| levenshtein(input, k))
        .copied()
        .unwrap_or("help")
}

fn levenshtein(a: &str, b: &str) -> usize {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for i in 1..=a.len() {
        curr[0] = i;
        for j in 1..=b.len() {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

// ── Command implementations ──────────────────────────────────

fn cmd_quit(_args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    app.running = false;
    Ok(())
}

fn cmd_help(_args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    app.show_help = true;
    Ok(())
}

fn cmd_limit(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    const USAGE: &str = "Usage: :limit <category> <amount> [week|month|year]";

    // Optional trailing period, then amount; everything before is the category
    let (rest, period) = match args.rsplit_once(' ') {
        Some((head, last)) => match Period::parse(last) {
            Some(p) => (head.trim_end(), p),
            None => (args, Period::Month),
        },
        None => (args, Period::Month),
    };
    let Some((category_name, amount_str)) = rest.rsplit_once(' ') else {
        app.set_status(USAGE);
        return Ok(());
    };
    let Some(amount) = parse_amount(amount_str) else {
        app.set_status(format!("Invalid amount: {amount_str}"));
        return Ok(());
    };
    let Some(cat) = Category::find_by_name(&app.categories, category_name).cloned() else {
        app.set_status(format!("Category '{}' not found", category_name.trim()));
        return Ok(());
    };
    let Some(cat_id) = cat.id else {
        return Ok(());
    };

    let draft = LimitDraft::new(cat_id, amount, period);
    match LimitStore::new(db).create(app.profile_id, &draft) {
        Ok(limit) => {
            app.set_status(format!(
                "Limit set: {} {} per {}",
                cat.name,
                format_amount(limit.amount),
                limit.period.label().to_lowercase()
            ));
            app.request_refresh("limit created");
        }
        Err(e) => app.set_status(e.to_string()),
    }
    Ok(())
}

fn cmd_edit_limit(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    let Some(row) = app.selected_row().cloned() else {
        app.set_status("No limit selected");
        return Ok(());
    };

    let mut words = args.split_whitespace();
    let Some(amount) = words.next().and_then(parse_amount) else {
        app.set_status("Usage: :edit-limit <amount> [week|month|year]");
        return Ok(());
    };
    let period = match words.next() {
        Some(p) => match Period::parse(p) {
            Some(period) => period,
            None => {
                app.set_status(format!("Invalid period: {p}"));
                return Ok(());
            }
        },
        None => row.period,
    };

    let draft = LimitDraft::new(row.category_id, amount, period);
    match LimitStore::new(db).update(app.profile_id, row.limit_id, &draft) {
        Ok(limit) => {
            app.set_status(format!(
                "Limit updated: {} {} per {}",
                row.category_name,
                format_amount(limit.amount),
                limit.period.label().to_lowercase()
            ));
            app.request_refresh("limit updated");
        }
        Err(e) => app.set_status(e.to_string()),
    }
    Ok(())
}

fn cmd_delete_limit(_args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    let Some(row) = app.selected_row().cloned() else {
        app.set_status("No limit to delete");
        return Ok(());
    };
    app.confirm_message = format!(
        "Delete {} limit for '{}'?",
        row.period.label().to_lowercase(),
        row.category_name
    );
    app.pending_action = Some(PendingAction::DeleteLimit {
        id: row.limit_id,
        category: row.category_name,
    });
    app.input_mode = InputMode::Confirm;
    Ok(())
}

fn cmd_spend(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    record_transaction(args, app, db, CategoryKind::Expense)
}

fn cmd_income(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    record_transaction(args, app, db, CategoryKind::Income)
}

fn record_transaction(
    args: &str,
    app: &mut App,
    db: &mut Database,
    kind: CategoryKind,
) -> anyhow::Result<()> {
    let Some((category_name, amount_str)) = args.rsplit_once(' ') else {
        app.set_status(format!(
            "Usage: :{} <category> <amount>",
            if kind == CategoryKind::Expense { "spend" } else { "income" }
        ));
        return Ok(());
    };
    let amount = match parse_amount(amount_str) {
        Some(a) if Transaction::is_valid_amount(a) => a,
        _ => {
            app.set_status(format!("Invalid amount: {amount_str}"));
            return Ok(());
        }
    };
    let Some(cat) = Category::find_by_name(&app.categories, category_name).cloned() else {
        app.set_status(format!("Category '{}' not found", category_name.trim()));
        return Ok(());
    };
    let Some(cat_id) = cat.id else {
        return Ok(());
    };
    if cat.kind != kind {
        app.set_status(format!("'{}' is an {} category", cat.name, cat.kind.label().to_lowercase()));
        return Ok(());
    }

    let txn = Transaction::new(app.profile_id, Local::now().date_naive(), cat_id, kind, amount);
    db.insert_transaction(&txn)?;
    app.set_status(format!(
        "Recorded {} {}",
        cat.name,
        format_amount(txn.signed_amount())
    ));
    app.request_refresh("transaction recorded");
    Ok(())
}

fn cmd_category(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    if args.is_empty() {
        app.set_status("Usage: :category <name> [income|expense]");
        return Ok(());
    }

    let (name, kind) = match args.rsplit_once(' ') {
        Some((head, last)) => match CategoryKind::parse(last) {
            Some(kind) => (head.trim(), kind),
            None => (args, CategoryKind::Expense),
        },
        None => (args, CategoryKind::Expense),
    };
    if Category::find_by_name(&app.categories, name).is_some() {
        app.set_status(format!("Category '{name}' already exists"));
        return Ok(());
    }

    db.insert_category(&Category::new(app.profile_id, name.to_string(), kind))?;
    app.refresh_categories(db)?;
    app.set_status(format!("Created {} category: {name}", kind.label().to_lowercase()));
    Ok(())
}

fn cmd_filter(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    if args.is_empty() {
        app.category_filter = None;
        app.set_status("Filter cleared");
    } else if let Some(cat) = Category::find_by_name(&app.categories, args) {
        app.category_filter = cat.id;
        let msg = format!("Showing limits for {}", cat.name);
        app.set_status(msg);
    } else {
        app.set_status(format!("Category '{args}' not found"));
        return Ok(());
    }
    app.row_index = 0;
    app.row_scroll = 0;
    app.refresh_now(db);
    Ok(())
}

fn cmd_refresh(_args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    app.refresh_categories(db)?;
    app.status_message.clear();
    app.refresh_now(db);
    if app.status_message.is_empty() {
        app.set_status("Limits refreshed");
    }
    Ok(())
}
