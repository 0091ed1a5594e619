use chrono::{DateTime, Utc};
use derive_builder::Builder;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct ComplianceWorkflow {
    pub uid: String,
    pub customer_uid: String,
    pub workflow_type: WorkflowType,
    pub status: WorkflowStatus,
    /// Documents the customer must provide before the workflow can be approved.
    pub required_documents: Vec<RequiredDocument>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowType {
    #[default]
    Kyc,
    Kyb,
    #[serde(other)]
    Unknown,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
    #[default]
    Pending,
    InProgress,
    Approved,
    Rejected,
    #[serde(other)]
    Unknown,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct RequiredDocument {
    pub uid: String,
    pub document_type: String,
    pub status: RequirementStatus,
    /// Uploaded KYC document satisfying this requirement.
    pub kyc_document_uid: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RequirementStatus {
    #[default]
    Required,
    Submitted,
    Acknowledged,
    #[serde(other)]
    Unknown,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Builder)]
#[builder(setter(into))]
#[non_exhaustive]
pub struct CreateComplianceWorkflowRequest {
    pub customer_uid: String,
    pub workflow_type: WorkflowType,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ListComplianceWorkflowsQuery {
    pub customer_uid: Option<String>,
    pub status: Option<WorkflowStatus>,
}
