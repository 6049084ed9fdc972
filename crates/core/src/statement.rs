use serde::{Deserialize, Serialize};

use super::account::{AccountId, LedgerError};
use super::money::Money;
use super::period::DateRange;

/// A bank or card statement covering one account over a period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    pub id: Option<i64>,
    pub account_id: AccountId,
    pub period: DateRange,
    pub starting_balance: Money,
    pub ending_balance: Money,
}

impl Statement {
    pub fn new(
        account_id: AccountId,
        period: DateRange,
        starting_balance: Money,
        ending_balance: Money,
    ) -> Result<Self, LedgerError> {
        if period.is_inverted() {
            return Err(LedgerError::InvertedStatementPeriod);
        }
        Ok(Statement {
            id: None,
            account_id,
            period,
            starting_balance,
            ending_balance,
        })
    }

    pub fn net_change(&self) -> Money {
        self.ending_balance - self.starting_balance
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn period(start: (i32, u32, u32), end: (i32, u32, u32)) -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(start.0, start.1, start.2).unwrap(),
            NaiveDate::from_ymd_opt(end.0, end.1, end.2).unwrap(),
        )
    }

    #[test]
    fn net_change_is_end_minus_start() {
        let s = Statement::new(
            AccountId(1),
            period((2024, 1, 1), (2024, 1, 31)),
            Money::from_cents(100_000),
            Money::from_cents(87_500),
        )
        .unwrap();
        assert_eq!(s.net_change().to_cents(), -12_500);
    }

    #[test]
    fn rejects_inverted_period() {
        let result = Statement::new(
            AccountId(1),
            period((2024, 2, 1), (2024, 1, 1)),
            Money::zero(),
            Money::zero(),
        );
        assert!(matches!(result, Err(LedgerError::InvertedStatementPeriod)));
    }
}
