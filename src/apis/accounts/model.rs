use chrono::{DateTime, Utc};
use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// Custodial account holding funds on behalf of a customer.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Account {
    pub uid: String,
    pub customer_uid: String,
    pub name: String,
    /// ISO 4217 currency code.
    pub currency: String,
    /// Ledger balance, in minor units.
    pub balance: i64,
    /// Balance available for spending, in minor units.
    pub available_balance: i64,
    pub status: AccountStatus,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AccountStatus {
    #[default]
    Active,
    Frozen,
    Closed,
    #[serde(other)]
    Unknown,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Builder)]
#[builder(setter(into))]
#[non_exhaustive]
pub struct CreateAccountRequest {
    pub customer_uid: String,
    pub name: String,
    pub currency: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ListAccountsQuery {
    pub customer_uid: Option<String>,
    pub status: Option<AccountStatus>,
}
