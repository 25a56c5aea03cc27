#![allow(clippy::unwrap_used)]

use super::*;
use rust_decimal_macros::dec;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn setup_profile(db: &mut Database, login: &str) -> i64 {
    db.create_profile(&Profile::new(login.into())).unwrap()
}

fn category_id(db: &Database, profile_id: i64, name: &str) -> i64 {
    let cats = db.get_categories(profile_id).unwrap();
    Category::find_by_name(&cats, name).unwrap().id.unwrap()
}

fn spend(db: &Database, profile_id: i64, cat: i64, on: NaiveDate, amount: Decimal) -> i64 {
    let txn = Transaction::new(profile_id, on, cat, CategoryKind::Expense, amount);
    db.insert_transaction(&txn).unwrap()
}

// ── Profiles ──────────────────────────────────────────────────

#[test]
fn test_profile_seeds_default_categories() {
    let mut db = Database::open_in_memory().unwrap();
    let pid = setup_profile(&mut db, "alex");

    let cats = db.get_categories(pid).unwrap();
    assert_eq!(cats.len(), 5);
    let groceries = Category::find_by_name(&cats, "Groceries").unwrap();
    assert!(groceries.is_expense());
    let salary = Category::find_by_name(&cats, "Salary").unwrap();
    assert_eq!(salary.kind, CategoryKind::Income);
}

#[test]
fn test_profile_login_unique() {
    let mut db = Database::open_in_memory().unwrap();
    setup_profile(&mut db, "alex");
    assert!(db.create_profile(&Profile::new("alex".into())).is_err());
    // The failed insert must not leave orphan categories behind
    let count: i64 = db
        .conn
        .query_row("SELECT COUNT(*) FROM categories", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 5);
}

#[test]
fn test_profile_lookup() {
    let mut db = Database::open_in_memory().unwrap();
    let pid = setup_profile(&mut db, "sam");
    setup_profile(&mut db, "alex");

    let found = db.get_profile_by_login("sam").unwrap().unwrap();
    assert_eq!(found.id, Some(pid));
    assert!(db.get_profile_by_login("nobody").unwrap().is_none());

    let names: Vec<String> = db
        .get_profiles()
        .unwrap()
        .into_iter()
        .map(|p| p.login)
        .collect();
    assert_eq!(names, vec!["alex", "sam"]);
}

// ── Categories ────────────────────────────────────────────────

#[test]
fn test_categories_scoped_to_profile() {
    let mut db = Database::open_in_memory().unwrap();
    let a = setup_profile(&mut db, "a");
    let b = setup_profile(&mut db, "b");

    db.insert_category(&Category::new(a, "Coffee".into(), CategoryKind::Expense))
        .unwrap();

    assert!(Category::find_by_name(&db.get_categories(a).unwrap(), "Coffee").is_some());
    assert!(Category::find_by_name(&db.get_categories(b).unwrap(), "Coffee").is_none());
}

#[test]
fn test_category_name_unique_ignoring_case() {
    let mut db = Database::open_in_memory().unwrap();
    let pid = setup_profile(&mut db, "a");
    let dup = Category::new(pid, "groceries".into(), CategoryKind::Expense);
    assert!(db.insert_category(&dup).is_err());
}

#[test]
fn test_category_by_id() {
    let mut db = Database::open_in_memory().unwrap();
    let pid = setup_profile(&mut db, "a");
    let id = db
        .insert_category(&Category::new(pid, "Gifts".into(), CategoryKind::Expense))
        .unwrap();

    let cat = db.get_category_by_id(id).unwrap().unwrap();
    assert_eq!(cat.name, "Gifts");
    assert_eq!(cat.profile_id, pid);
    assert!(db.get_category_by_id(99999).unwrap().is_none());
}

#[test]
fn test_categories_sorted_by_name() {
    let mut db = Database::open_in_memory().unwrap();
    let pid = setup_profile(&mut db, "a");
    let cats = db.get_categories(pid).unwrap();
    let names: Vec<&str> = cats.iter().map(|c| c.name.as_str()).collect();
    let mut sorted = names.clone();
    sorted.sort();
    assert_eq!(names, sorted);
}

// ── Transactions ──────────────────────────────────────────────

#[test]
fn test_transaction_insert_and_query() {
    let mut db = Database::open_in_memory().unwrap();
    let pid = setup_profile(&mut db, "a");
    let groceries = category_id(&db, pid, "Groceries");

    let txn = Transaction::new(
        pid,
        date(2024, 3, 9),
        groceries,
        CategoryKind::Expense,
        dec!(12.40),
    )
    .with_description("market");
    let id = db.insert_transaction(&txn).unwrap();
    assert!(id > 0);

    let txns = db.get_transactions(pid, None, None).unwrap();
    assert_eq!(txns.len(), 1);
    assert_eq!(txns[0].id, Some(id));
    assert_eq!(txns[0].date, date(2024, 3, 9));
    assert_eq!(txns[0].amount, dec!(12.40));
    assert_eq!(txns[0].kind, CategoryKind::Expense);
    assert_eq!(txns[0].description.as_deref(), Some("market"));
}

#[test]
fn test_transaction_ordering_and_filters() {
    let mut db = Database::open_in_memory().unwrap();
    let pid = setup_profile(&mut db, "a");
    let groceries = category_id(&db, pid, "Groceries");
    let transport = category_id(&db, pid, "Transport");

    spend(&db, pid, groceries, date(2024, 1, 10), dec!(5));
    spend(&db, pid, transport, date(2024, 2, 1), dec!(7));
    spend(&db, pid, groceries, date(2024, 1, 20), dec!(9));

    let all = db.get_transactions(pid, None, None).unwrap();
    assert_eq!(all.len(), 3);
    for window in all.windows(2) {
        assert!(window[0].date >= window[1].date);
    }

    let only_groceries = db.get_transactions(pid, Some(groceries), None).unwrap();
    assert_eq!(only_groceries.len(), 2);
    assert!(only_groceries.iter().all(|t| t.category_id == groceries));

    let limited = db.get_transactions(pid, None, Some(1)).unwrap();
    assert_eq!(limited.len(), 1);
    assert_eq!(limited[0].date, date(2024, 2, 1));
}

#[test]
fn test_transaction_update_and_delete() {
    let mut db = Database::open_in_memory().unwrap();
    let pid = setup_profile(&mut db, "a");
    let other = setup_profile(&mut db, "b");
    let groceries = category_id(&db, pid, "Groceries");
    let id = spend(&db, pid, groceries, date(2024, 1, 10), dec!(5));

    let mut edited = Transaction::new(
        pid,
        date(2024, 1, 11),
        groceries,
        CategoryKind::Expense,
        dec!(6.5),
    );
    assert!(db.update_transaction(id, &edited).unwrap());
    let txns = db.get_transactions(pid, None, None).unwrap();
    assert_eq!(txns[0].amount, dec!(6.5));
    assert_eq!(txns[0].date, date(2024, 1, 11));

    // Another profile cannot touch it
    edited.profile_id = other;
    assert!(!db.update_transaction(id, &edited).unwrap());
    assert!(!db.delete_transaction(other, id).unwrap());

    assert!(db.delete_transaction(pid, id).unwrap());
    assert!(!db.delete_transaction(pid, id).unwrap());
    assert!(db.get_transactions(pid, None, None).unwrap().is_empty());
}

#[test]
fn test_get_transaction_scoped_to_profile() {
    let mut db = Database::open_in_memory().unwrap();
    let pid = setup_profile(&mut db, "a");
    let other = setup_profile(&mut db, "b");
    let groceries = category_id(&db, pid, "Groceries");
    let id = spend(&db, pid, groceries, date(2024, 1, 10), dec!(12.34));

    let txn = db.get_transaction(pid, id).unwrap().unwrap();
    assert_eq!(txn.id, Some(id));
    assert_eq!(txn.amount, dec!(12.34));
    assert!(db.get_transaction(other, id).unwrap().is_none());
    assert!(db.get_transaction(pid, id + 1).unwrap().is_none());
}

#[test]
fn test_transaction_requires_existing_category() {
    let mut db = Database::open_in_memory().unwrap();
    let pid = setup_profile(&mut db, "a");
    let txn = Transaction::new(pid, date(2024, 1, 1), 99999, CategoryKind::Expense, dec!(1));
    assert!(db.insert_transaction(&txn).is_err());
}

// ── Spend aggregation ─────────────────────────────────────────

#[test]
fn test_sum_expense_inclusive_bounds() {
    let mut db = Database::open_in_memory().unwrap();
    let pid = setup_profile(&mut db, "a");
    let cat = category_id(&db, pid, "Groceries");

    spend(&db, pid, cat, date(2024, 2, 29), dec!(1));
    spend(&db, pid, cat, date(2024, 3, 1), dec!(10));
    spend(&db, pid, cat, date(2024, 3, 31), dec!(100));
    spend(&db, pid, cat, date(2024, 4, 1), dec!(1000));

    let total = db
        .sum_expense(pid, cat, date(2024, 3, 1), date(2024, 3, 31))
        .unwrap();
    assert_eq!(total, dec!(110));
}

#[test]
fn test_sum_expense_empty_is_zero() {
    let mut db = Database::open_in_memory().unwrap();
    let pid = setup_profile(&mut db, "a");
    let cat = category_id(&db, pid, "Groceries");
    let total = db
        .sum_expense(pid, cat, date(2024, 1, 1), date(2024, 12, 31))
        .unwrap();
    assert_eq!(total, Decimal::ZERO);
}

#[test]
fn test_sum_expense_ignores_income_and_other_scopes() {
    let mut db = Database::open_in_memory().unwrap();
    let pid = setup_profile(&mut db, "a");
    let other = setup_profile(&mut db, "b");
    let cat = category_id(&db, pid, "Groceries");
    let transport = category_id(&db, pid, "Transport");
    let other_cat = category_id(&db, other, "Groceries");

    spend(&db, pid, cat, date(2024, 5, 5), dec!(20));
    // Income pointed at an expense category must not count
    db.insert_transaction(&Transaction::new(
        pid,
        date(2024, 5, 6),
        cat,
        CategoryKind::Income,
        dec!(500),
    ))
    .unwrap();
    spend(&db, pid, transport, date(2024, 5, 7), dec!(3));
    spend(&db, other, other_cat, date(2024, 5, 8), dec!(40));

    let total = db
        .sum_expense(pid, cat, date(2024, 5, 1), date(2024, 5, 31))
        .unwrap();
    assert_eq!(total, dec!(20));
}

#[test]
fn test_sum_expense_exact_decimals() {
    let mut db = Database::open_in_memory().unwrap();
    let pid = setup_profile(&mut db, "a");
    let cat = category_id(&db, pid, "Groceries");
    spend(&db, pid, cat, date(2024, 1, 1), dec!(0.10));
    spend(&db, pid, cat, date(2024, 1, 2), dec!(0.20));

    let total = db
        .sum_expense(pid, cat, date(2024, 1, 1), date(2024, 1, 31))
        .unwrap();
    assert_eq!(total, dec!(0.30));
}

#[test]
fn test_sum_expense_overflow_is_an_error() {
    let mut db = Database::open_in_memory().unwrap();
    let pid = setup_profile(&mut db, "a");
    let cat = category_id(&db, pid, "Groceries");
    spend(&db, pid, cat, date(2024, 1, 1), Decimal::MAX);
    spend(&db, pid, cat, date(2024, 1, 2), Decimal::MAX);

    let err = db
        .sum_expense(pid, cat, date(2024, 1, 1), date(2024, 1, 31))
        .unwrap_err();
    assert!(err.to_string().contains("overflowed"), "{err}");
}

#[test]
fn test_sum_expense_additive_over_split_ranges() {
    let mut db = Database::open_in_memory().unwrap();
    let pid = setup_profile(&mut db, "a");
    let cat = category_id(&db, pid, "Groceries");
    for (day, amount) in [(1, dec!(4.25)), (14, dec!(8)), (15, dec!(3.5)), (28, dec!(11))] {
        spend(&db, pid, cat, date(2023, 2, day), amount);
    }

    let whole = db
        .sum_expense(pid, cat, date(2023, 2, 1), date(2023, 2, 28))
        .unwrap();
    for split in 1..28 {
        let left = db
            .sum_expense(pid, cat, date(2023, 2, 1), date(2023, 2, split))
            .unwrap();
        let right = db
            .sum_expense(pid, cat, date(2023, 2, split + 1), date(2023, 2, 28))
            .unwrap();
        assert_eq!(left + right, whole, "split after day {split}");
    }
}

// ── Limits ────────────────────────────────────────────────────

#[test]
fn test_limit_crud() {
    let mut db = Database::open_in_memory().unwrap();
    let pid = setup_profile(&mut db, "a");
    let cat = category_id(&db, pid, "Groceries");

    let id = db
        .insert_limit(pid, &LimitDraft::new(cat, dec!(250), Period::Week))
        .unwrap();
    let limit = db.get_limit(pid, id).unwrap().unwrap();
    assert_eq!(limit.amount, dec!(250));
    assert_eq!(limit.period, Period::Week);

    assert!(db
        .update_limit(pid, id, &LimitDraft::new(cat, dec!(300), Period::Month))
        .unwrap());
    let limit = db.get_limit(pid, id).unwrap().unwrap();
    assert_eq!(limit.amount, dec!(300));
    assert_eq!(limit.period, Period::Month);

    assert!(db.delete_limit(pid, id).unwrap());
    assert!(db.get_limit(pid, id).unwrap().is_none());
    assert!(!db.delete_limit(pid, id).unwrap());
}

#[test]
fn test_limits_listed_in_id_order_with_filter() {
    let mut db = Database::open_in_memory().unwrap();
    let pid = setup_profile(&mut db, "a");
    let groceries = category_id(&db, pid, "Groceries");
    let transport = category_id(&db, pid, "Transport");

    let first = db
        .insert_limit(pid, &LimitDraft::new(transport, dec!(50), Period::Week))
        .unwrap();
    let second = db
        .insert_limit(pid, &LimitDraft::new(groceries, dec!(400), Period::Month))
        .unwrap();
    let third = db
        .insert_limit(pid, &LimitDraft::new(groceries, dec!(4000), Period::Year))
        .unwrap();

    let ids: Vec<i64> = db
        .get_limits(pid, None)
        .unwrap()
        .iter()
        .map(|l| l.id)
        .collect();
    assert_eq!(ids, vec![first, second, third]);

    let ids: Vec<i64> = db
        .get_limits(pid, Some(groceries))
        .unwrap()
        .iter()
        .map(|l| l.id)
        .collect();
    assert_eq!(ids, vec![second, third]);
}

#[test]
fn test_limit_scoped_to_profile() {
    let mut db = Database::open_in_memory().unwrap();
    let pid = setup_profile(&mut db, "a");
    let other = setup_profile(&mut db, "b");
    let cat = category_id(&db, pid, "Groceries");
    let id = db
        .insert_limit(pid, &LimitDraft::new(cat, dec!(10), Period::Month))
        .unwrap();

    assert!(db.get_limit(other, id).unwrap().is_none());
    assert!(db.get_limits(other, None).unwrap().is_empty());
    assert!(!db
        .update_limit(other, id, &LimitDraft::new(cat, dec!(1), Period::Month))
        .unwrap());
    assert!(!db.delete_limit(other, id).unwrap());
    assert!(db.get_limit(pid, id).unwrap().is_some());
}

#[test]
fn test_find_conflicting_limit() {
    let mut db = Database::open_in_memory().unwrap();
    let pid = setup_profile(&mut db, "a");
    let cat = category_id(&db, pid, "Groceries");
    let id = db
        .insert_limit(pid, &LimitDraft::new(cat, dec!(10), Period::Month))
        .unwrap();

    assert_eq!(
        db.find_conflicting_limit(pid, cat, Period::Month, None).unwrap(),
        Some(id)
    );
    assert_eq!(
        db.find_conflicting_limit(pid, cat, Period::Month, Some(id)).unwrap(),
        None
    );
    assert_eq!(
        db.find_conflicting_limit(pid, cat, Period::Week, None).unwrap(),
        None
    );
}

#[test]
fn test_limit_unique_constraint() {
    let mut db = Database::open_in_memory().unwrap();
    let pid = setup_profile(&mut db, "a");
    let cat = category_id(&db, pid, "Groceries");
    let draft = LimitDraft::new(cat, dec!(10), Period::Month);
    db.insert_limit(pid, &draft).unwrap();
    assert!(db.insert_limit(pid, &draft).is_err());
}

#[test]
fn test_limit_period_check_constraint() {
    let mut db = Database::open_in_memory().unwrap();
    let pid = setup_profile(&mut db, "a");
    let cat = category_id(&db, pid, "Groceries");
    let result = db.conn.execute(
        "INSERT INTO limits (profile_id, category_id, amount, period) VALUES (?1, ?2, '5', 'decade')",
        params![pid, cat],
    );
    assert!(result.is_err());
}

// ── On-disk database ──────────────────────────────────────────

#[test]
fn test_reopen_existing_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("spendguard.db");

    let limit_id = {
        let mut db = Database::open(&path).unwrap();
        let pid = setup_profile(&mut db, "a");
        let cat = category_id(&db, pid, "Utilities");
        db.insert_limit(pid, &LimitDraft::new(cat, dec!(120.50), Period::Month))
            .unwrap()
    };

    let db = Database::open(&path).unwrap();
    let pid = db.get_profile_by_login("a").unwrap().unwrap().id.unwrap();
    let limit = db.get_limit(pid, limit_id).unwrap().unwrap();
    assert_eq!(limit.amount, dec!(120.50));

    let version: i32 = db
        .conn
        .query_row("SELECT version FROM schema_version", [], |row| row.get(0))
        .unwrap();
    assert_eq!(version, schema::CURRENT_VERSION);
}
