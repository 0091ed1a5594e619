use crate::common::mock_server::{routes::error_response, MockServerStorage};
use actix_web::{
    body::BoxBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    http::StatusCode,
    Error, HttpResponse,
};
use futures::{
    future::{LocalBoxFuture, Ready},
    FutureExt,
};
use std::{
    future::Future,
    task::{Context, Poll},
    sync::Arc,
};

/// Middleware to check that all the requests contain the right user agent header
pub(super) async fn validate_user_agent(req: &mut ServiceRequest) -> Result<(), HttpResponse> {
    let expected_prefix = concat!("coreledger-rust/", env!("CARGO_PKG_VERSION"), " (rust; ");

    match req
        .headers()
        .get("User-Agent")
        .and_then(|v| v.to_str().ok())
    {
        Some(user_agent) if user_agent.starts_with(expected_prefix) => Ok(()),
        other => Err(error_response(
            StatusCode::BAD_REQUEST,
            1,
            "Invalid User-Agent",
            format!("unexpected User-Agent {:?}", other),
        )),
    }
}

/// Ensures the request carries the most recently issued bearer token.
pub(super) fn validate_authorization(
    storage: MockServerStorage,
) -> impl Fn(&mut ServiceRequest) -> LocalBoxFuture<'_, Result<(), HttpResponse>> {
    move |req: &mut ServiceRequest| {
        let storage = storage.clone();

        Box::pin(async move {
            let presented = req
                .headers()
                .get("Authorization")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            let current = storage.read().unwrap().tokens.last().cloned();

            match (presented, current) {
                (Some(presented), Some(current)) if presented == current => Ok(()),
                (None, _) => Err(error_response(
                    StatusCode::UNAUTHORIZED,
                    2,
                    "Unauthorized",
                    "missing Authorization header",
                )),
                _ => Err(error_response(
                    StatusCode::UNAUTHORIZED,
                    3,
                    "Unauthorized",
                    "invalid or revoked token",
                )),
            }
        })
    }
}

/// Helper trait used to circumvent a limitation of Rust's Higher Ranked Trait Bounds
/// in the implementation of `MiddlewareFnWrapper::call`.
/// For more info see: https://users.rust-lang.org/t/higher-rank-trait-bounds-use-bound-lifetime-in-another-generic/45121
pub(super) trait CallableAsyncFn<'r> {
    type Output: Future<Output = Result<(), HttpResponse>> + 'r;

    fn call(&self, req: &'r mut ServiceRequest) -> Self::Output;
}

impl<'r, F, R> CallableAsyncFn<'r> for F
where
    F: Fn(&'r mut ServiceRequest) -> R,
    R: Future<Output = Result<(), HttpResponse>> + 'r,
{
    type Output = R;

    fn call(&self, req: &'r mut ServiceRequest) -> Self::Output {
        self(req)
    }
}

/// Wrapper around a function to act as an actix middleware.
///
/// A rejected request is answered with the response returned by the function.
pub(super) struct MiddlewareFn<F> {
    inner: Arc<F>,
}

impl<F> MiddlewareFn<F>
where
    F: for<'r> CallableAsyncFn<'r>,
{
    pub fn new(inner: F) -> Self {
        Self {
            inner: Arc::new(inner),
        }
    }
}

impl<S, F> Transform<S, ServiceRequest> for MiddlewareFn<F>
where
    S: Service<ServiceRequest, Response = ServiceResponse<BoxBody>, Error = Error> + 'static,
    S::Future: 'static,
    F: 'static + for<'r> CallableAsyncFn<'r>,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Transform = MiddlewareFnWrapper<S, F>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        futures::future::ok(MiddlewareFnWrapper {
            service: Arc::new(service),
            inner: self.inner.clone(),
        })
    }
}

pub(super) struct MiddlewareFnWrapper<S, F> {
    service: Arc<S>,
    inner: Arc<F>,
}

impl<S, F> Service<ServiceRequest> for MiddlewareFnWrapper<S, F>
where
    S: Service<ServiceRequest, Response = ServiceResponse<BoxBody>, Error = Error> + 'static,
    S::Future: 'static,
    F: 'static + for<'r> CallableAsyncFn<'r>,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = S::Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, ct: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ct)
    }

    fn call(&self, mut req: ServiceRequest) -> Self::Future {
        let inner = self.inner.clone();
        let service = self.service.clone();

        async move {
            match inner.call(&mut req).await {
                Err(rejection) => Ok(req.into_response(rejection)),
                Ok(_) => service.call(req).await,
            }
        }
        .boxed_local()
    }
}
