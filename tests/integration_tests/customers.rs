use crate::{
    common::test_context::TestContext,
    integration_tests::helpers::{create_customer_request, customer_details, unique_email},
};
use coreledger_rust::{
    apis::customers::{
        CustomerDetailsBuilder, CustomerStatus, ListCustomersQuery, UpdateCustomerRequestBuilder,
    },
    error::ErrorKind,
    pagination::Page,
    Error,
};

#[tokio::test]
async fn create_and_get_customer() {
    let ctx = TestContext::start().await;
    let email = unique_email();

    let created = ctx
        .client
        .customers
        .create(&create_customer_request(&email))
        .await
        .unwrap();

    assert!(!created.uid.is_empty());
    assert_eq!(created.status, CustomerStatus::Active);
    assert_eq!(created.details, customer_details(&email));

    let fetched = ctx.client.customers.get(&created.uid).await.unwrap();
    assert_eq!(fetched.uid, created.uid);
    assert_eq!(fetched.details.email, email);
}

#[tokio::test]
async fn find_unknown_customer() {
    let ctx = TestContext::start().await;

    let customer = ctx.client.customers.find("cus_does_not_exist").await.unwrap();

    assert_eq!(customer, None);
}

#[tokio::test]
async fn get_unknown_customer_is_a_protocol_error() {
    let ctx = TestContext::start().await;

    let err = ctx
        .client
        .customers
        .get("cus_does_not_exist")
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Protocol);
    assert_eq!(err.status(), Some(404));
    assert!(matches!(err, Error::Protocol(ref api_error) if !api_error.errors.is_empty()));
}

#[tokio::test]
async fn invalid_email_is_rejected() {
    let ctx = TestContext::start().await;

    let err = ctx
        .client
        .customers
        .create(&create_customer_request("not-an-email"))
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(400));
}

#[tokio::test]
async fn update_customer() {
    let ctx = TestContext::start().await;
    let created = ctx
        .client
        .customers
        .create(&create_customer_request(&unique_email()))
        .await
        .unwrap();

    let details = CustomerDetailsBuilder::default()
        .first_name("Augusta")
        .last_name("King")
        .email(unique_email())
        .build()
        .unwrap();
    let updated = ctx
        .client
        .customers
        .update(
            &created.uid,
            &UpdateCustomerRequestBuilder::default()
                .details(details.clone())
                .build()
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(updated.uid, created.uid);
    assert_eq!(updated.details, details);
}

#[tokio::test]
async fn customer_lifecycle() {
    let ctx = TestContext::start().await;
    let customers = &ctx.client.customers;
    let uid = customers
        .create(&create_customer_request(&unique_email()))
        .await
        .unwrap()
        .uid;

    assert_eq!(
        customers.lock(&uid).await.unwrap().status,
        CustomerStatus::Locked
    );
    assert_eq!(
        customers.unlock(&uid).await.unwrap().status,
        CustomerStatus::Active
    );
    assert_eq!(
        customers.archive(&uid).await.unwrap().status,
        CustomerStatus::Archived
    );

    // Archived customers are frozen for good
    let err = customers.lock(&uid).await.unwrap_err();
    assert_eq!(err.status(), Some(422));
}

#[tokio::test]
async fn list_customers_by_email() {
    let ctx = TestContext::start().await;
    let email = unique_email();
    let created = ctx
        .client
        .customers
        .create(&create_customer_request(&email))
        .await
        .unwrap();
    ctx.client
        .customers
        .create(&create_customer_request(&unique_email()))
        .await
        .unwrap();

    let customers = ctx
        .client
        .customers
        .list_all(&ListCustomersQuery {
            email: Some(email),
            status: None,
        })
        .await
        .unwrap();

    assert_eq!(customers.len(), 1);
    assert_eq!(customers[0].uid, created.uid);
}

#[cfg(not(feature = "acceptance-tests"))]
mod local {
    use super::*;
    use coreledger_rust::dispatcher::QueryParams;
    use reqwest::Method;
    use std::collections::HashSet;
    use tokio_util::sync::CancellationToken;

    #[tokio::test]
    async fn list_pages_follow_count_until_total() {
        let ctx = TestContext::start().await;
        for _ in 0..5 {
            ctx.client
                .customers
                .create(&create_customer_request(&unique_email()))
                .await
                .unwrap();
        }
        let query = ListCustomersQuery::default();

        // Manual pagination
        let mut collected = Vec::new();
        let mut calls = 0;
        let mut page = Page::new(2, 0);
        loop {
            let res = ctx.client.customers.list(&query, page).await.unwrap();
            calls += 1;
            assert_eq!(res.total_count, 5);
            assert_eq!(res.limit, 2);
            assert_eq!(res.offset, page.offset);
            collected.extend(res.data);
            page.offset += res.count;
            if collected.len() as u64 >= res.total_count {
                break;
            }
        }
        assert_eq!(calls, 3);
        assert_eq!(collected.len(), 5);

        // Same result through the helper
        let all = ctx.client.customers.list_all(&query).await.unwrap();
        let uids = all.iter().map(|c| c.uid.as_str()).collect::<HashSet<_>>();
        assert_eq!(uids.len(), 5);
        assert!(collected.iter().all(|c| uids.contains(c.uid.as_str())));
    }

    #[tokio::test]
    async fn unknown_route_surfaces_error_envelope() {
        let ctx = TestContext::start().await;

        let err = ctx
            .client
            .dispatcher()
            .call::<serde_json::Value, ()>(
                &CancellationToken::new(),
                Method::GET,
                "no_such_resource",
                &QueryParams::new(),
                None,
            )
            .await
            .unwrap_err();

        match err {
            Error::Protocol(api_error) => {
                assert_eq!(api_error.status, 404);
                assert_eq!(api_error.errors.len(), 1);
                assert_eq!(api_error.errors[0].code, 100);
                assert_eq!(api_error.errors[0].title, "Path/Method not found");
            }
            e => panic!("Unexpected error: {:?}", e),
        }
    }

    #[tokio::test]
    async fn cancelled_calls_never_reach_the_server() {
        let ctx = TestContext::start().await;
        let token = CancellationToken::new();
        let client = ctx.client.with_cancellation(token.clone());
        token.cancel();

        let err = client
            .customers
            .list(&ListCustomersQuery::default(), Page::default())
            .await
            .unwrap_err();

        assert!(err.is_cancelled());
        assert_eq!(ctx.auth_calls(), 0);
    }
}
