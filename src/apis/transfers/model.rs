use chrono::{DateTime, Utc};
use derive_builder::Builder;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Transfer {
    pub uid: String,
    pub source_account_uid: String,
    pub destination_account_uid: String,
    /// Amount in minor units.
    pub amount: i64,
    pub currency: String,
    pub status: TransferStatus,
    pub description: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TransferStatus {
    #[default]
    Pending,
    Completed,
    Failed,
    #[serde(other)]
    Unknown,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Builder)]
#[builder(setter(into))]
#[non_exhaustive]
pub struct CreateTransferRequest {
    pub source_account_uid: String,
    pub destination_account_uid: String,
    pub amount: i64,
    pub currency: String,
    #[builder(default, setter(strip_option))]
    pub description: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ListTransfersQuery {
    pub account_uid: Option<String>,
    pub status: Option<TransferStatus>,
}
