use crate::apis::{
    transfers::{CreateTransferRequest, ListTransfersQuery, Transfer},
    Creatable, Listable, Resource,
};

impl Resource for Transfer {
    const PATH: &'static str = "transfers";
}

impl Listable for Transfer {
    type Query = ListTransfersQuery;
}

impl Creatable for Transfer {
    type CreateRequest = CreateTransferRequest;
}
