use std::str::FromStr;

use rust_decimal::Decimal;
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};

use crate::week::WeekWindow;

/// One reviewer's budget row for one week.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetFigures {
    #[serde(
        default,
        serialize_with = "rust_decimal::serde::float::serialize",
        deserialize_with = "amount_or_zero"
    )]
    pub allocated_budget: Decimal,
    #[serde(
        default,
        serialize_with = "rust_decimal::serde::float::serialize",
        deserialize_with = "amount_or_zero"
    )]
    pub consumed_budget: Decimal,
}

/// Reads a budget amount the way the store reads its text columns:
/// numbers and numeric text count, anything else is zero.
pub fn parse_amount(raw: &str) -> Decimal {
    let raw = raw.trim();
    Decimal::from_str(raw).or_else(|_| Decimal::from_scientific(raw)).unwrap_or(Decimal::ZERO)
}

fn amount_or_zero<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum WireAmount {
        Text(String),
        Number(Decimal),
        Other(IgnoredAny),
    }

    Ok(match WireAmount::deserialize(deserializer)? {
        WireAmount::Text(raw) => parse_amount(&raw),
        WireAmount::Number(amount) => amount,
        WireAmount::Other(_) => Decimal::ZERO,
    })
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetStanding {
    WithinBudget,
    OverBudget,
}

impl BudgetFigures {
    pub fn new(allocated_budget: Decimal, consumed_budget: Decimal) -> Self {
        Self { allocated_budget, consumed_budget }
    }

    pub fn balance(&self) -> Decimal {
        self.allocated_budget - self.consumed_budget
    }

    /// A negative balance is a display state, not an error.
    pub fn standing(&self) -> BudgetStanding {
        if self.balance() < Decimal::ZERO {
            BudgetStanding::OverBudget
        } else {
            BudgetStanding::WithinBudget
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BudgetSummary {
    pub window: WeekWindow,
    pub figures: BudgetFigures,
    #[serde(with = "rust_decimal::serde::float")]
    pub balance: Decimal,
    pub standing: BudgetStanding,
}

impl BudgetSummary {
    pub fn new(window: WeekWindow, figures: BudgetFigures) -> Self {
        Self { window, figures, balance: figures.balance(), standing: figures.standing() }
    }
}
