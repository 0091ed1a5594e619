use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct KycDocument {
    pub uid: String,
    pub customer_uid: String,
    pub document_type: DocumentType,
    pub status: KycDocumentStatus,
    pub file_name: String,
    /// MIME type of the stored file, e.g. `application/pdf`.
    pub content_type: String,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    #[default]
    Passport,
    DriversLicense,
    IdCard,
    ProofOfAddress,
    #[serde(other)]
    Unknown,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum KycDocumentStatus {
    #[default]
    Uploaded,
    Verified,
    Rejected,
    #[serde(other)]
    Unknown,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ListKycDocumentsQuery {
    pub customer_uid: Option<String>,
    pub document_type: Option<DocumentType>,
}
