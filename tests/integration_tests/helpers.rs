use coreledger_rust::apis::customers::{
    CreateCustomerRequest, CreateCustomerRequestBuilder, CustomerDetails, CustomerDetailsBuilder,
};
use uuid::Uuid;

/// An email address no other test uses.
pub fn unique_email() -> String {
    format!("{}@example.com", Uuid::new_v4().simple())
}

pub fn customer_details(email: &str) -> CustomerDetails {
    CustomerDetailsBuilder::default()
        .first_name("Ada")
        .last_name("Lovelace")
        .email(email)
        .phone_number("+441234567890")
        .build()
        .unwrap()
}

pub fn create_customer_request(email: &str) -> CreateCustomerRequest {
    CreateCustomerRequestBuilder::default()
        .details(customer_details(email))
        .build()
        .unwrap()
}
