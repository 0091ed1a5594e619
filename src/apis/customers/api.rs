use crate::{
    apis::{
        customers::{CreateCustomerRequest, Customer, ListCustomersQuery, UpdateCustomerRequest},
        Creatable, Listable, Resource, ResourceApi, Updatable,
    },
    Error,
};

impl Resource for Customer {
    const PATH: &'static str = "customers";
}

impl Listable for Customer {
    type Query = ListCustomersQuery;
}

impl Creatable for Customer {
    type CreateRequest = CreateCustomerRequest;
}

impl Updatable for Customer {
    type UpdateRequest = UpdateCustomerRequest;
}

impl ResourceApi<Customer> {
    /// Locks a customer, preventing any further money movement.
    pub async fn lock(&self, uid: &str) -> Result<Customer, Error> {
        self.action::<()>(uid, "lock", None).await
    }

    /// Unlocks a previously locked customer.
    pub async fn unlock(&self, uid: &str) -> Result<Customer, Error> {
        self.action::<()>(uid, "unlock", None).await
    }

    /// Archives a customer. Archived customers cannot be reactivated.
    pub async fn archive(&self, uid: &str) -> Result<Customer, Error> {
        self.action::<()>(uid, "archive", None).await
    }
}
