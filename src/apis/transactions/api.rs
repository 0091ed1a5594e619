use crate::apis::{
    transactions::{ListTransactionsQuery, Transaction},
    Listable, Resource,
};

impl Resource for Transaction {
    const PATH: &'static str = "transactions";
}

impl Listable for Transaction {
    type Query = ListTransactionsQuery;
}
