use chrono::{DateTime, Utc};
use derive_builder::Builder;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Card {
    pub uid: String,
    pub account_uid: String,
    pub customer_uid: String,
    pub card_type: CardType,
    pub status: CardStatus,
    pub last_four: String,
    pub expiration_month: u8,
    pub expiration_year: u16,
    pub name_on_card: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum CardType {
    #[default]
    Virtual,
    Physical,
    #[serde(other)]
    Unknown,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum CardStatus {
    #[default]
    Active,
    Locked,
    Closed,
    #[serde(other)]
    Unknown,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Builder)]
#[builder(setter(into))]
#[non_exhaustive]
pub struct CreateCardRequest {
    pub account_uid: String,
    pub customer_uid: String,
    pub card_type: CardType,
    #[builder(default, setter(strip_option))]
    pub name_on_card: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ListCardsQuery {
    pub account_uid: Option<String>,
    pub customer_uid: Option<String>,
    pub status: Option<CardStatus>,
}
