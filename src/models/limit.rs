use rust_decimal::Decimal;

/// Recurring window a limit is measured over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Period {
    Week,
    Month,
    Year,
}

impl Period {
    /// Tag stored in `limits.period`. Never shown to the user.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "week" | "weekly" | "w" => Some(Self::Week),
            "month" | "monthly" | "m" => Some(Self::Month),
            "year" | "yearly" | "annual" | "y" => Some(Self::Year),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Week => "Week",
            Self::Month => "Month",
            Self::Year => "Year",
        }
    }

    pub fn all() -> &'static [Period] {
        &[Self::Week, Self::Month, Self::Year]
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A persisted spending cap on one expense category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Limit {
    pub id: i64,
    pub profile_id: i64,
    pub category_id: i64,
    pub amount: Decimal,
    pub period: Period,
}

/// User input for creating or editing a limit, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LimitDraft {
    pub category_id: i64,
    pub amount: Decimal,
    pub period: Period,
}

impl LimitDraft {
    pub fn new(category_id: i64, amount: Decimal, period: Period) -> Self {
        Self {
            category_id,
            amount,
            period,
        }
    }
}
