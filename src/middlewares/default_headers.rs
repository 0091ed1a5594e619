use crate::common::user_agent;
use async_trait::async_trait;
use reqwest::{
    header::{HeaderValue, ACCEPT, CONTENT_TYPE, USER_AGENT},
    Request, Response,
};
use reqwest_middleware::{Middleware, Next};
use task_local_extensions::Extensions;

static JSON: &str = "application/json";

/// Middleware to inject `Accept`, `Content-Type` and `User-Agent` into all outgoing requests.
pub struct DefaultHeadersMiddleware {
    user_agent: HeaderValue,
}

impl DefaultHeadersMiddleware {
    pub fn new() -> Self {
        Self {
            user_agent: HeaderValue::from_str(&user_agent()).unwrap_or_else(|_| {
                HeaderValue::from_static(concat!(
                    env!("CARGO_PKG_NAME"),
                    "/",
                    env!("CARGO_PKG_VERSION")
                ))
            }),
        }
    }
}

impl Default for DefaultHeadersMiddleware {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Middleware for DefaultHeadersMiddleware {
    async fn handle(
        &self,
        mut req: Request,
        extensions: &mut Extensions,
        next: Next<'_>,
    ) -> reqwest_middleware::Result<Response> {
        let headers = req.headers_mut();
        headers.insert(ACCEPT, HeaderValue::from_static(JSON));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON));
        headers.insert(USER_AGENT, self.user_agent.clone());

        next.run(req, extensions).await
    }
}
