use async_trait::async_trait;
use reqwest::{Request, Response};
use reqwest_middleware::{Middleware, Next};
use task_local_extensions::Extensions;

/// Middleware enabled by the `debug` configuration flag.
/// Logs method, URL and outcome of every request at `info` level.
pub struct DebugLoggingMiddleware;

#[async_trait]
impl Middleware for DebugLoggingMiddleware {
    async fn handle(
        &self,
        req: Request,
        extensions: &mut Extensions,
        next: Next<'_>,
    ) -> reqwest_middleware::Result<Response> {
        let method = req.method().clone();
        let url = req.url().clone();
        tracing::info!(%method, %url, "Sending request");

        let res = next.run(req, extensions).await;
        match &res {
            Ok(response) => {
                tracing::info!(%method, %url, status = %response.status(), "Request completed")
            }
            Err(e) => tracing::info!(%method, %url, error = %e, "Request failed"),
        }

        res
    }
}
