use crate::date::serialize_timestamp;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Ledger entry recorded against an account. Transactions are read-only.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Transaction {
    pub uid: String,
    pub account_uid: String,
    /// Amount in minor units.
    pub amount: i64,
    pub currency: String,
    pub direction: TransactionDirection,
    pub status: TransactionStatus,
    pub description: Option<String>,
    /// Transfer this entry originates from, if any.
    pub transfer_uid: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TransactionDirection {
    #[default]
    Credit,
    Debit,
    #[serde(other)]
    Unknown,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    #[default]
    Pending,
    Posted,
    Reversed,
    #[serde(other)]
    Unknown,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ListTransactionsQuery {
    pub account_uid: Option<String>,
    #[serde(serialize_with = "serialize_timestamp")]
    pub from: Option<DateTime<Utc>>,
    #[serde(serialize_with = "serialize_timestamp")]
    pub to: Option<DateTime<Utc>>,
}
