use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::CategoryKind;

#[derive(Debug, Clone)]
pub struct Transaction {
    pub id: Option<i64>,
    pub profile_id: i64,
    pub date: NaiveDate,
    pub category_id: i64,
    pub kind: CategoryKind,
    /// Always positive; direction comes from `kind`.
    pub amount: Decimal,
    pub description: Option<String>,
}

impl Transaction {
    /// Largest amount a single transaction may carry.
    pub fn max_amount() -> Decimal {
        Decimal::new(1_000_000_000, 0)
    }

    pub fn is_valid_amount(amount: Decimal) -> bool {
        amount > Decimal::ZERO && amount <= Self::max_amount()
    }

    pub fn new(
        profile_id: i64,
        date: NaiveDate,
        category_id: i64,
        kind: CategoryKind,
        amount: Decimal,
    ) -> Self {
        Self {
            id: None,
            profile_id,
            date,
            category_id,
            kind,
            amount,
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        let description = description.into();
        self.description = (!description.trim().is_empty()).then_some(description);
        self
    }

    /// Amount with its sign applied: expenses are negative.
    pub fn signed_amount(&self) -> Decimal {
        match self.kind {
            CategoryKind::Income => self.amount,
            CategoryKind::Expense => -self.amount,
        }
    }
}
