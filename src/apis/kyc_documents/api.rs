use crate::{
    apis::{
        kyc_documents::{KycDocument, ListKycDocumentsQuery},
        Listable, Resource, ResourceApi,
    },
    dispatcher::QueryParams,
    Error,
};
use bytes::Bytes;
use reqwest::Method;

impl Resource for KycDocument {
    const PATH: &'static str = "kyc_documents";
}

impl Listable for KycDocument {
    type Query = ListKycDocumentsQuery;
}

impl ResourceApi<KycDocument> {
    /// Downloads the stored file (an image or a PDF).
    #[tracing::instrument(name = "Download KYC Document", skip(self))]
    pub async fn download(&self, uid: &str) -> Result<Bytes, Error> {
        self.dispatcher()
            .call_bytes::<()>(
                self.ctx(),
                Method::GET,
                &format!("{}/download", Self::item_path(uid)),
                &QueryParams::new(),
                None,
            )
            .await
    }
}
