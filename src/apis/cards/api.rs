use crate::{
    apis::{
        cards::{Card, CreateCardRequest, ListCardsQuery},
        Creatable, Deletable, Listable, Resource, ResourceApi,
    },
    Error,
};

impl Resource for Card {
    const PATH: &'static str = "cards";
}

impl Listable for Card {
    type Query = ListCardsQuery;
}

impl Creatable for Card {
    type CreateRequest = CreateCardRequest;
}

// Deleting a card closes it permanently
impl Deletable for Card {}

impl ResourceApi<Card> {
    /// Temporarily blocks card authorizations.
    pub async fn lock(&self, uid: &str) -> Result<Card, Error> {
        self.action::<()>(uid, "lock", None).await
    }

    pub async fn unlock(&self, uid: &str) -> Result<Card, Error> {
        self.action::<()>(uid, "unlock", None).await
    }
}
