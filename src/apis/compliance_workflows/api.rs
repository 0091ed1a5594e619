use crate::{
    apis::{
        compliance_workflows::{
            ComplianceWorkflow, CreateComplianceWorkflowRequest, ListComplianceWorkflowsQuery,
        },
        Creatable, Listable, Resource, ResourceApi,
    },
    dispatcher::QueryParams,
    Error,
};
use reqwest::Method;
use urlencoding::encode;

impl Resource for ComplianceWorkflow {
    const PATH: &'static str = "compliance_workflows";
}

impl Listable for ComplianceWorkflow {
    type Query = ListComplianceWorkflowsQuery;
}

impl Creatable for ComplianceWorkflow {
    type CreateRequest = CreateComplianceWorkflowRequest;
}

impl ResourceApi<ComplianceWorkflow> {
    /// Gets the most recent workflow started for a customer.
    #[tracing::instrument(name = "Get Latest Compliance Workflow", skip(self))]
    pub async fn latest(&self, customer_uid: &str) -> Result<ComplianceWorkflow, Error> {
        self.dispatcher()
            .call::<_, ()>(
                self.ctx(),
                Method::GET,
                &format!("{}/latest", ComplianceWorkflow::PATH),
                &QueryParams::new().with("customer_uid", customer_uid),
                None,
            )
            .await
    }

    /// Marks a required document of the workflow as reviewed.
    #[tracing::instrument(name = "Acknowledge Compliance Document", skip(self))]
    pub async fn acknowledge_document(
        &self,
        workflow_uid: &str,
        document_uid: &str,
    ) -> Result<ComplianceWorkflow, Error> {
        self.dispatcher()
            .call::<_, ()>(
                self.ctx(),
                Method::PUT,
                &format!(
                    "{}/documents/{}/acknowledge",
                    Self::item_path(workflow_uid),
                    encode(document_uid)
                ),
                &QueryParams::new(),
                None,
            )
            .await
    }
}
