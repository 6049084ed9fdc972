use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use super::geo::Coordinate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountId(pub i64);

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountKind {
    Checking,
    Savings,
    Credit,
    Cash,
}

impl fmt::Display for AccountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountKind::Checking => write!(f, "checking"),
            AccountKind::Savings => write!(f, "savings"),
            AccountKind::Credit => write!(f, "credit"),
            AccountKind::Cash => write!(f, "cash"),
        }
    }
}

impl std::str::FromStr for AccountKind {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "checking" => Ok(AccountKind::Checking),
            "savings" => Ok(AccountKind::Savings),
            "credit" => Ok(AccountKind::Credit),
            "cash" => Ok(AccountKind::Cash),
            other => Err(format!("Unknown account kind: '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: Option<AccountId>,
    pub name: String,
    pub kind: AccountKind,
    pub is_archived: bool,
}

impl Account {
    pub fn new(name: &str, kind: AccountKind) -> Self {
        Account {
            id: None,
            name: name.to_string(),
            kind,
            is_archived: false,
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum LedgerError {
    #[error("Transaction must have a description")]
    MissingDescription,
    #[error("Transaction coordinate is out of range: {0}")]
    InvalidCoordinate(Coordinate),
    #[error("Statement ends before it starts")]
    InvertedStatementPeriod,
}
