use crate::common::test_context::TestContext;
use coreledger_rust::error::ErrorKind;

#[tokio::test]
async fn get_token() {
    let ctx = TestContext::start().await;

    let token = ctx.client.auth.get_token().await.unwrap();

    assert!(!token.expose_secret().is_empty());
}

#[tokio::test]
async fn get_token_reuses_cached_token() {
    let ctx = TestContext::start().await;

    let first = ctx.client.auth.get_token().await.unwrap();
    let second = ctx.client.auth.get_token().await.unwrap();

    assert_eq!(first.expose_secret(), second.expose_secret());
}

#[tokio::test]
async fn invalid_credentials() {
    let ctx = TestContext::start().await;

    // Create a new client with a set of invalid credentials pointing to the same server
    let client = ctx.client_with_credentials("invalid", "invalid");

    // Make the request and assert that we got an error
    let err = client.auth.get_token().await.expect_err("Expected error");
    assert_eq!(err.kind(), ErrorKind::Protocol);
    assert_eq!(err.status(), Some(401));
}

#[cfg(not(feature = "acceptance-tests"))]
mod local {
    use crate::common::test_context::TestContext;
    use coreledger_rust::{apis::customers::ListCustomersQuery, pagination::Page};

    #[tokio::test]
    async fn first_call_bootstraps_exactly_once() {
        let ctx = TestContext::start().await;

        // Building the client does not touch the network
        assert_eq!(ctx.auth_calls(), 0);

        for _ in 0..3 {
            ctx.client
                .customers
                .list(&ListCustomersQuery::default(), Page::default())
                .await
                .unwrap();
        }

        assert_eq!(ctx.auth_calls(), 1);
        let token = ctx.client.auth.get_token().await.unwrap();
        assert_eq!(ctx.issued_tokens(), vec![token.expose_secret().to_string()]);
    }

    #[tokio::test]
    async fn concurrent_first_calls_share_one_bootstrap() {
        let ctx = TestContext::start().await;

        let results = futures::future::join_all(
            (0..10).map(|i| {
                let client = ctx.client.clone();
                async move { client.customers.find(&format!("cus_missing_{}", i)).await }
            }),
        )
        .await;

        assert!(results.into_iter().all(|r| r.unwrap().is_none()));
        assert_eq!(ctx.auth_calls(), 1);
    }

    #[tokio::test]
    async fn rejected_token_requires_explicit_refresh() {
        let ctx = TestContext::start().await;
        let query = ListCustomersQuery::default();
        ctx.client.customers.list(&query, Page::default()).await.unwrap();

        // Another client with the same credentials revokes the first token
        let other = ctx.new_client();
        other.auth.get_token().await.unwrap();

        // No automatic re-authentication
        let err = ctx
            .client
            .customers
            .list(&query, Page::default())
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(401));
        assert_eq!(ctx.auth_calls(), 2);

        let refreshed = ctx.client.auth.refresh_token().await.unwrap();
        assert_eq!(
            ctx.issued_tokens().last().map(String::as_str),
            Some(refreshed.expose_secret())
        );
        ctx.client.customers.list(&query, Page::default()).await.unwrap();
        assert_eq!(ctx.auth_calls(), 3);
    }
}
