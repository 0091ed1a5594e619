use crate::error::{ApiError, Error};
use async_trait::async_trait;
use reqwest::{Request, Response};
use reqwest_middleware::{Middleware, Next};
use task_local_extensions::Extensions;

/// Reqwest middleware which translates non-success responses returned from CoreLedger APIs
/// into [`Error::Protocol`](crate::error::Error)s.
///
/// Any status in `200..400` is a success and the response is passed through undrained.
pub struct ErrorHandlingMiddleware;

#[async_trait]
impl Middleware for ErrorHandlingMiddleware {
    async fn handle(
        &self,
        req: Request,
        extensions: &mut Extensions,
        next: Next<'_>,
    ) -> reqwest_middleware::Result<Response> {
        // Capture the response
        let response = next.run(req, extensions).await?;

        // Build an error if the response is not a success.
        // Try parsing the contents of the error as an `ErrorBody`,
        // but if that doesn't work, keep the raw contents of the response.
        let status = response.status().as_u16();
        if !(200..400).contains(&status) {
            let bytes = response.bytes().await?;

            tracing::debug!("Failed HTTP request. Status code: {}", status);

            return Err(Error::Protocol(ApiError::from_response_body(status, &bytes)).into());
        }

        Ok(response)
    }
}
