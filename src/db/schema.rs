pub(crate) const SCHEMA_V1: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS profiles (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    login       TEXT NOT NULL UNIQUE,
    created_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS categories (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    profile_id  INTEGER NOT NULL REFERENCES profiles(id),
    name        TEXT NOT NULL COLLATE NOCASE,
    kind        TEXT NOT NULL CHECK(kind IN ('income', 'expense')),
    UNIQUE(profile_id, name)
);

CREATE TABLE IF NOT EXISTS transactions (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    profile_id   INTEGER NOT NULL REFERENCES profiles(id),
    date         TEXT NOT NULL,
    category_id  INTEGER NOT NULL REFERENCES categories(id),
    kind         TEXT NOT NULL CHECK(kind IN ('income', 'expense')),
    amount       TEXT NOT NULL,
    description  TEXT
);

CREATE INDEX IF NOT EXISTS idx_transactions_date ON transactions(date);
CREATE INDEX IF NOT EXISTS idx_transactions_spend ON transactions(profile_id, category_id, kind, date);

CREATE TABLE IF NOT EXISTS limits (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    profile_id   INTEGER NOT NULL REFERENCES profiles(id),
    category_id  INTEGER NOT NULL REFERENCES categories(id),
    amount       TEXT NOT NULL,
    period       TEXT NOT NULL DEFAULT 'month' CHECK(period IN ('week', 'month', 'year')),
    UNIQUE(profile_id, category_id, period)
);

"#;

pub(crate) const CURRENT_VERSION: i32 = 1;

/// Migrations from version N to N+1.
/// Each entry is (from_version, sql).
pub(crate) const MIGRATIONS: &[(i32, &str)] = &[
    // Future migrations go here:
    // (1, "ALTER TABLE limits ADD COLUMN note TEXT NOT NULL DEFAULT '';"),
];

/// Categories every new profile starts with.
pub(crate) const DEFAULT_CATEGORIES: &[(&str, &str)] = &[
    ("Salary", "income"),
    ("Side job", "income"),
    ("Groceries", "expense"),
    ("Utilities", "expense"),
    ("Transport", "expense"),
];
