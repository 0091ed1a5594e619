use crate::apis::{
    accounts::{Account, CreateAccountRequest, ListAccountsQuery},
    Creatable, Listable, Resource,
};

impl Resource for Account {
    const PATH: &'static str = "accounts";
}

impl Listable for Account {
    type Query = ListAccountsQuery;
}

impl Creatable for Account {
    type CreateRequest = CreateAccountRequest;
}
