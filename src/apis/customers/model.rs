use crate::date::Date;
use chrono::{DateTime, Utc};
use derive_builder::Builder;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Customer {
    pub uid: String,
    pub status: CustomerStatus,
    pub details: CustomerDetails,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum CustomerStatus {
    #[default]
    Active,
    Locked,
    Archived,
    #[serde(other)]
    Unknown,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq, Builder)]
#[serde(default)]
#[builder(default, setter(into))]
pub struct CustomerDetails {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[builder(setter(strip_option))]
    pub phone_number: Option<String>,
    /// Date of birth.
    #[builder(setter(strip_option))]
    pub dob: Option<Date>,
    #[builder(setter(strip_option))]
    pub address: Option<Address>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq, Builder)]
#[serde(default)]
#[builder(default, setter(into))]
pub struct Address {
    pub line_1: String,
    #[builder(setter(strip_option))]
    pub line_2: Option<String>,
    pub city: String,
    #[builder(setter(strip_option))]
    pub state: Option<String>,
    pub postal_code: String,
    /// ISO 3166-1 alpha-2 country code.
    pub country_code: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Builder)]
#[non_exhaustive]
pub struct CreateCustomerRequest {
    pub details: CustomerDetails,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Builder)]
#[non_exhaustive]
pub struct UpdateCustomerRequest {
    pub details: CustomerDetails,
}

/// Filters for [`ResourceApi::<Customer>::list`](crate::apis::ResourceApi::list).
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ListCustomersQuery {
    pub email: Option<String>,
    pub status: Option<CustomerStatus>,
}
