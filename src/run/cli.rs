use anyhow::{bail, Context, Result};
use chrono::NaiveDate;

use super::{profile_id, today};
use crate::config::Config;
use crate::db::Database;
use crate::limits::{LimitAlert, LimitEvaluator, LimitStatus, LimitStore, NotificationSink};
use crate::models::{Category, CategoryKind, LimitDraft, Period, Profile, Transaction};
use crate::ui::util::{format_amount, parse_amount, truncate};

/// Prints alerts on stderr so they survive piping the table.
struct StderrSink;

impl NotificationSink for StderrSink {
    fn notify(&mut self, alert: &LimitAlert) {
        eprintln!("! {alert}");
    }
}

pub(crate) fn as_cli(args: &[String], db: &mut Database, config: &Config) -> Result<()> {
    let Some((command, rest)) = args.split_first() else {
        print_usage();
        return Ok(());
    };
    match command.as_str() {
        "limits" | "l" => cli_limits(rest, db, config),
        "limit" => cli_limit(rest, db, config),
        "spend" => cli_add_txn(rest, db, config, CategoryKind::Expense),
        "income" => cli_add_txn(rest, db, config, CategoryKind::Income),
        "txn" => cli_txn(rest, db, config),
        "txns" => cli_txns(rest, db, config),
        "categories" => cli_categories(db, config),
        "category" => cli_category(rest, db, config),
        "profiles" => cli_profiles(db),
        "profile" => cli_profile(rest, db),
        "--help" | "-h" | "help" => {
            print_usage();
            Ok(())
        }
        "--version" | "-V" | "version" => {
            println!("spendguard {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        other => {
            print_usage();
            bail!("Unknown command: {other}");
        }
    }
}

fn print_usage() {
    println!("SpendGuard - spending limits per category");
    println!();
    println!("Usage: spendguard [--db PATH] [--profile LOGIN] [command]");
    println!();
    println!("Commands:");
    println!("  (none)                                   Launch interactive TUI");
    println!("  limits [--category NAME]                 Show limit usage for the current periods");
    println!("  limit add <category> <amount> [period]   Add a limit (period: week|month|year, default month)");
    println!("  limit edit <id> <category> <amount> <period>");
    println!("  limit rm <id>                            Delete a limit");
    println!("  spend <category> <amount>                Record an expense");
    println!("    --date <YYYY-MM-DD>                    Date (default: today)");
    println!("    --note <text>                          Description");
    println!("  income <category> <amount>               Record income (same flags as spend)");
    println!("  txns [--category NAME]                   List transactions, newest first");
    println!("  txn edit <id> <amount>                   Change a transaction's amount");
    println!("  txn rm <id>                              Delete a transaction");
    println!("  categories                               List categories");
    println!("  category add <name> [income|expense]     Create a category (default expense)");
    println!("  profiles                                 List profiles");
    println!("  profile add <login>                      Create a profile with default categories");
    println!("  --help, -h                               Show this help");
    println!("  --version, -V                            Show version");
    println!();
    println!("Environment: SPENDGUARD_DB, SPENDGUARD_PROFILE, SPENDGUARD_DEBOUNCE_MS, RUST_LOG");
}

// ── Limits ───────────────────────────────────────────────────

fn cli_limits(args: &[String], db: &mut Database, config: &Config) -> Result<()> {
    let pid = profile_id(db, &config.profile)?;
    let category_id = match flag_value(args, "--category") {
        Some(name) => Some(category_id_by_name(db, pid, name)?),
        None => None,
    };

    let mut evaluator = LimitEvaluator::new();
    let rows = evaluator.evaluate(&*db, &mut StderrSink, pid, category_id, today())?;
    if rows.is_empty() {
        println!("No limits. Add one with: spendguard limit add <category> <amount> [period]");
        return Ok(());
    }
    print_limit_table(&rows);
    Ok(())
}

fn print_limit_table(rows: &[LimitStatus]) {
    println!(
        "{:<4} {:<18} {:<6} {:>13} {:>13} {:>13} {:>7}  {:<9} Window",
        "ID", "Category", "Period", "Limit", "Spent", "Remaining", "Used", "Status"
    );
    println!("{}", "─".repeat(110));
    for row in rows {
        println!(
            "{:<4} {:<18} {:<6} {:>13} {:>13} {:>13} {:>6}%  {:<9} {}",
            row.limit_id,
            truncate(&row.category_name, 18),
            row.period.label(),
            format_amount(row.limit_amount),
            format_amount(row.spent),
            format_amount(row.remaining),
            row.usage_percent().to_string(),
            row.tier.label(),
            row.window,
        );
    }
}

fn cli_limit(args: &[String], db: &mut Database, config: &Config) -> Result<()> {
    let pid = profile_id(db, &config.profile)?;
    let store = LimitStore::new(db);

    match args.first().map(String::as_str) {
        Some("add") => {
            let [category, amount, rest @ ..] = &args[1..] else {
                bail!("Usage: spendguard limit add <category> <amount> [week|month|year]");
            };
            let period = match rest.first() {
                Some(p) => parse_period(p)?,
                None => Period::Month,
            };
            let draft = limit_draft(db, pid, category, amount, period)?;
            let limit = store.create(pid, &draft)?;
            println!(
                "Added limit #{}: {} {} per {}",
                limit.id,
                category,
                format_amount(limit.amount),
                limit.period.label().to_lowercase()
            );
        }
        Some("edit") => {
            let [id, category, amount, period] = &args[1..] else {
                bail!("Usage: spendguard limit edit <id> <category> <amount> <week|month|year>");
            };
            let id = parse_id(id)?;
            let draft = limit_draft(db, pid, category, amount, parse_period(period)?)?;
            let limit = store.update(pid, id, &draft)?;
            println!(
                "Updated limit #{}: {} {} per {}",
                limit.id,
                category,
                format_amount(limit.amount),
                limit.period.label().to_lowercase()
            );
        }
        Some("rm") | Some("delete") => {
            let [id] = &args[1..] else {
                bail!("Usage: spendguard limit rm <id>");
            };
            let id = parse_id(id)?;
            if LimitEvaluator::new().delete_limit(&store, pid, id)? {
                println!("Deleted limit #{id}");
            } else {
                println!("No limit #{id}");
            }
        }
        _ => bail!("Usage: spendguard limit <add|edit|rm> ..."),
    }
    Ok(())
}

fn limit_draft(
    db: &Database,
    profile_id: i64,
    category: &str,
    amount: &str,
    period: Period,
) -> Result<LimitDraft> {
    let category_id = category_id_by_name(db, profile_id, category)?;
    let amount = parse_amount(amount).with_context(|| format!("Invalid amount: {amount}"))?;
    Ok(LimitDraft::new(category_id, amount, period))
}

// ── Transactions ─────────────────────────────────────────────

fn cli_add_txn(
    args: &[String],
    db: &mut Database,
    config: &Config,
    kind: CategoryKind,
) -> Result<()> {
    let verb = match kind {
        CategoryKind::Expense => "spend",
        CategoryKind::Income => "income",
    };
    let [category, amount, ..] = args else {
        bail!("Usage: spendguard {verb} <category> <amount> [--date YYYY-MM-DD] [--note TEXT]");
    };

    let pid = profile_id(db, &config.profile)?;
    let categories = db.get_categories(pid)?;
    let cat = Category::find_by_name(&categories, category)
        .with_context(|| format!("Category '{category}' not found"))?;
    if cat.kind != kind {
        bail!(
            "'{}' is an {} category; use `spendguard {}` instead",
            cat.name,
            cat.kind.label().to_lowercase(),
            if cat.is_expense() { "spend" } else { "income" }
        );
    }
    let cat_id = cat.id.context("Category has no ID")?;

    let amount = parse_amount(amount).with_context(|| format!("Invalid amount: {amount}"))?;
    if !Transaction::is_valid_amount(amount) {
        bail!("Amount must be positive and at most {}", Transaction::max_amount());
    }
    let date = match flag_value(args, "--date") {
        Some(d) => NaiveDate::parse_from_str(d, "%Y-%m-%d")
            .with_context(|| format!("Invalid date (expected YYYY-MM-DD): {d}"))?,
        None => today(),
    };

    let mut txn = Transaction::new(pid, date, cat_id, kind, amount);
    if let Some(note) = flag_value(args, "--note") {
        txn = txn.with_description(note);
    }
    let id = db.insert_transaction(&txn)?;
    println!(
        "Recorded #{id}: {} {} on {date}",
        cat.name,
        format_amount(txn.signed_amount())
    );

    if kind == CategoryKind::Expense {
        LimitEvaluator::new().evaluate(&*db, &mut StderrSink, pid, Some(cat_id), today())?;
    }
    Ok(())
}

fn cli_txn(args: &[String], db: &mut Database, config: &Config) -> Result<()> {
    let pid = profile_id(db, &config.profile)?;
    match args {
        [sub, id] if sub == "rm" || sub == "delete" => {
            let id = parse_id(id)?;
            if db.delete_transaction(pid, id)? {
                println!("Deleted transaction #{id}");
            } else {
                println!("No transaction #{id}");
            }
        }
        [sub, id, amount] if sub == "edit" => {
            let id = parse_id(id)?;
            let amount = parse_amount(amount)
                .filter(|a| Transaction::is_valid_amount(*a))
                .with_context(|| format!("Invalid amount: {amount}"))?;
            let mut txn = db
                .get_transaction(pid, id)?
                .with_context(|| format!("No transaction #{id}"))?;
            txn.amount = amount;
            db.update_transaction(id, &txn)?;
            println!("Updated transaction #{id}: {}", format_amount(txn.signed_amount()));
        }
        _ => bail!("Usage: spendguard txn <edit <id> <amount> | rm <id>>"),
    }
    Ok(())
}

fn cli_txns(args: &[String], db: &mut Database, config: &Config) -> Result<()> {
    let pid = profile_id(db, &config.profile)?;
    let category_id = match flag_value(args, "--category") {
        Some(name) => Some(category_id_by_name(db, pid, name)?),
        None => None,
    };
    let categories = db.get_categories(pid)?;
    let txns = db.get_transactions(pid, category_id, Some(100))?;
    if txns.is_empty() {
        println!("No transactions");
        return Ok(());
    }

    println!(
        "{:<5} {:<10} {:<18} {:>13}  Description",
        "ID", "Date", "Category", "Amount"
    );
    println!("{}", "─".repeat(70));
    for txn in &txns {
        let cat_name = Category::find_by_id(&categories, txn.category_id)
            .map(|c| c.name.as_str())
            .unwrap_or("Unknown");
        println!(
            "{:<5} {:<10} {:<18} {:>13}  {}",
            txn.id.unwrap_or(0),
            txn.date.to_string(),
            truncate(cat_name, 18),
            format_amount(txn.signed_amount()),
            txn.description.as_deref().unwrap_or(""),
        );
    }
    Ok(())
}

// ── Categories & profiles ────────────────────────────────────

fn cli_categories(db: &mut Database, config: &Config) -> Result<()> {
    let pid = profile_id(db, &config.profile)?;
    let categories = db.get_categories(pid)?;
    println!("{:<4} {:<24} Kind", "ID", "Name");
    println!("{}", "─".repeat(38));
    for cat in &categories {
        println!("{:<4} {:<24} {}", cat.id.unwrap_or(0), cat.name, cat.kind.label());
    }
    Ok(())
}

fn cli_category(args: &[String], db: &mut Database, config: &Config) -> Result<()> {
    let [sub, words @ ..] = args else {
        bail!("Usage: spendguard category add <name> [income|expense]");
    };
    if sub != "add" || words.is_empty() {
        bail!("Usage: spendguard category add <name> [income|expense]");
    }

    let (name_words, kind) = match words.split_last() {
        Some((last, init)) if !init.is_empty() => match CategoryKind::parse(last) {
            Some(kind) => (init, kind),
            None => (words, CategoryKind::Expense),
        },
        _ => (words, CategoryKind::Expense),
    };
    let name = name_words.join(" ");

    let pid = profile_id(db, &config.profile)?;
    let id = db
        .insert_category(&Category::new(pid, name.clone(), kind))
        .with_context(|| format!("Could not create category '{name}'"))?;
    println!("Created {} category #{id}: {name}", kind.label().to_lowercase());
    Ok(())
}

fn cli_profiles(db: &mut Database) -> Result<()> {
    for profile in db.get_profiles()? {
        println!("{:<4} {:<20} {}", profile.id.unwrap_or(0), profile.login, profile.created_at);
    }
    Ok(())
}

fn cli_profile(args: &[String], db: &mut Database) -> Result<()> {
    let [sub, login] = args else {
        bail!("Usage: spendguard profile add <login>");
    };
    if sub != "add" {
        bail!("Usage: spendguard profile add <login>");
    }
    let login = login.trim();
    if login.is_empty() {
        bail!("Login must not be empty");
    }
    let id = db.create_profile(&Profile::new(login.to_string()))?;
    println!("Created profile #{id}: {login}");
    Ok(())
}

// ── Parsing helpers ──────────────────────────────────────────

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn parse_id(raw: &str) -> Result<i64> {
    raw.trim_start_matches('#')
        .parse()
        .with_context(|| format!("Invalid id: {raw}"))
}

fn parse_period(raw: &str) -> Result<Period> {
    Period::parse(raw).with_context(|| {
        let expected: Vec<&str> = Period::all().iter().map(|p| p.as_str()).collect();
        format!("Invalid period '{raw}' (expected one of: {})", expected.join(", "))
    })
}

fn category_id_by_name(db: &Database, profile_id: i64, name: &str) -> Result<i64> {
    let categories = db.get_categories(profile_id)?;
    Category::find_by_name(&categories, name)
        .and_then(|c| c.id)
        .with_context(|| format!("Category '{name}' not found"))
}
