use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::account::{AccountId, LedgerError};
use super::geo::Coordinate;
use super::merchant::MerchantId;
use super::money::Money;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionId(pub i64);

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One line of a transaction. A receipt often splits into several.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Amount {
    pub id: Option<i64>,
    pub money: Money,
    pub description: Option<String>,
}

impl Amount {
    pub fn new(money: Money, description: Option<String>) -> Self {
        Amount { id: None, money, description }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub id: Option<i64>,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// `None` until the transaction has been written to the store.
    pub id: Option<TransactionId>,
    pub date: NaiveDate,
    pub description: String,
    pub merchant_id: Option<MerchantId>,
    pub account_id: Option<AccountId>,
    /// File name of the receipt photo inside the receipt storage folder.
    pub receipt_file_name: Option<String>,
    pub coordinate: Option<Coordinate>,
    pub amounts: Vec<Amount>,
}

impl Transaction {
    pub fn new(date: NaiveDate, description: &str) -> Self {
        Transaction {
            id: None,
            date,
            description: description.to_string(),
            merchant_id: None,
            account_id: None,
            receipt_file_name: None,
            coordinate: None,
            amounts: Vec::new(),
        }
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    pub fn total(&self) -> Money {
        self.amounts
            .iter()
            .map(|a| a.money)
            .fold(Money::zero(), |a, b| a + b)
    }

    /// Checks run before a transaction is written.
    pub fn validate(&self) -> Result<(), LedgerError> {
        if self.description.trim().is_empty() {
            return Err(LedgerError::MissingDescription);
        }
        if let Some(coord) = self.coordinate {
            if !coord.is_valid() {
                return Err(LedgerError::InvalidCoordinate(coord));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn total_sums_amounts() {
        let mut tx = Transaction::new(date(2024, 1, 15), "Groceries");
        tx.amounts.push(Amount::new(Money::from_cents(1250), Some("produce".into())));
        tx.amounts.push(Amount::new(Money::from_cents(399), None));
        assert_eq!(tx.total().to_cents(), 1649);
    }

    #[test]
    fn total_of_no_amounts_is_zero() {
        let tx = Transaction::new(date(2024, 1, 15), "Empty");
        assert!(tx.total().is_zero());
    }

    #[test]
    fn validate_accepts_plain_transaction() {
        let tx = Transaction::new(date(2024, 1, 15), "Coffee");
        assert!(tx.validate().is_ok());
    }

    #[test]
    fn validate_rejects_blank_description() {
        let tx = Transaction::new(date(2024, 1, 15), "   ");
        assert!(matches!(tx.validate(), Err(LedgerError::MissingDescription)));
    }

    #[test]
    fn validate_rejects_bad_coordinate() {
        let mut tx = Transaction::new(date(2024, 1, 15), "Coffee");
        tx.coordinate = Some(Coordinate::new(0.0, 200.0));
        assert!(matches!(tx.validate(), Err(LedgerError::InvalidCoordinate(_))));
    }

    #[test]
    fn new_transaction_is_not_persisted() {
        let mut tx = Transaction::new(date(2024, 1, 15), "Coffee");
        assert!(!tx.is_persisted());
        tx.id = Some(TransactionId(9));
        assert!(tx.is_persisted());
    }
}
