//! The single code path every CoreLedger API call goes through.

use crate::{
    authenticator::Authenticator,
    common::API_VERSION,
    error::{Error, TransportError},
};
use bytes::Bytes;
use reqwest::{Method, Response, Url};
use reqwest_middleware::ClientWithMiddleware;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::{
    collections::BTreeMap,
    fmt::{Debug, Formatter},
    sync::Arc,
};
use tokio_util::sync::CancellationToken;

/// Flat, ordered set of query string parameters.
///
/// Parameters with an empty value are never sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams(BTreeMap<String, String>);

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `key` to `value`, removing the parameter if `value` is empty.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        let key = key.into();
        let value = value.into();
        if value.is_empty() {
            self.0.remove(&key);
        } else {
            self.0.insert(key, value);
        }
        self
    }

    /// Builder-style variant of [`insert`](QueryParams::insert).
    pub fn with(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.insert(key, value.to_string());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Flattens a serializable query struct.
    ///
    /// `null` fields and empty strings are skipped, scalars are stringified
    /// and arrays are joined with commas. Nested objects are rejected.
    pub fn from_serialize<T: Serialize + ?Sized>(query: &T) -> Result<Self, Error> {
        let mut params = Self::new();

        let fields = match serde_json::to_value(query)? {
            Value::Null => return Ok(params),
            Value::Object(fields) => fields,
            other => {
                return Err(invalid_query(format!(
                    "query must serialize to an object, got `{}`",
                    other
                )))
            }
        };

        for (key, value) in fields {
            let value = match value {
                Value::Null => continue,
                Value::Array(items) => items
                    .into_iter()
                    .map(|item| scalar_to_string(&key, item))
                    .collect::<Result<Vec<_>, _>>()?
                    .join(","),
                other => scalar_to_string(&key, other)?,
            };
            params.insert(key, value);
        }

        Ok(params)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (k, v) in iter {
            params.insert(k, v);
        }
        params
    }
}

fn scalar_to_string(key: &str, value: Value) -> Result<String, Error> {
    match value {
        Value::Null => Ok(String::new()),
        Value::String(s) => Ok(s),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Array(_) | Value::Object(_) => Err(invalid_query(format!(
            "query parameter `{}` must be a scalar",
            key
        ))),
    }
}

fn invalid_query(msg: String) -> Error {
    Error::Serialization(<serde_json::Error as serde::ser::Error>::custom(msg))
}

pub(crate) fn api_url(
    base_url: &Url,
    resource_path: &str,
    query: &QueryParams,
) -> Result<Url, Error> {
    let mut url = Url::parse(&format!(
        "{}/{}/{}",
        base_url.as_str().trim_end_matches('/'),
        API_VERSION,
        resource_path.trim_start_matches('/')
    ))
    .map_err(|e| Error::Other(e.into()))?;

    if !query.is_empty() {
        url.query_pairs_mut().extend_pairs(query.iter());
    }

    Ok(url)
}

/// Dispatches authenticated requests to the CoreLedger API.
///
/// Cloning a `Dispatcher` is cheap and shares the transport and the token cache.
#[derive(Clone)]
pub struct Dispatcher {
    inner: Arc<DispatcherInner>,
}

struct DispatcherInner {
    client: ClientWithMiddleware,
    authenticator: Authenticator,
    base_url: Url,
}

impl Debug for Dispatcher {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("base_url", &self.inner.base_url)
            .finish_non_exhaustive()
    }
}

impl Dispatcher {
    pub(crate) fn new(
        client: ClientWithMiddleware,
        authenticator: Authenticator,
        base_url: Url,
    ) -> Self {
        Self {
            inner: Arc::new(DispatcherInner {
                client,
                authenticator,
                base_url,
            }),
        }
    }

    /// Base URL requests are sent to.
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    pub(crate) fn authenticator(&self) -> &Authenticator {
        &self.inner.authenticator
    }

    /// Builds `<base>/api/v1/<resource_path>?<query>`.
    pub fn url(&self, resource_path: &str, query: &QueryParams) -> Result<Url, Error> {
        api_url(&self.inner.base_url, resource_path, query)
    }

    /// Sends a request and returns the raw, undrained response.
    ///
    /// A fresh token is attached to every request but the `auth` bootstrap. Any status
    /// outside `200..400` is turned into an [`Error::Protocol`](crate::Error::Protocol).
    /// If `ctx` is cancelled before or while the request is in flight, the request is
    /// aborted and [`TransportError::Cancelled`] is returned.
    pub async fn do_request(
        &self,
        ctx: &CancellationToken,
        method: Method,
        resource_path: &str,
        query: &QueryParams,
        body: Option<reqwest::Body>,
    ) -> Result<Response, Error> {
        if ctx.is_cancelled() {
            return Err(TransportError::Cancelled.into());
        }

        let url = self.url(resource_path, query)?;
        let mut request = self.inner.client.request(method, url);
        if let Some(body) = body {
            request = request.body(body);
        }

        // Dropping the send future aborts the connection
        tokio::select! {
            biased;
            _ = ctx.cancelled() => Err(TransportError::Cancelled.into()),
            res = request.send() => Ok(res?),
        }
    }

    /// Sends a request with an optional JSON body and decodes the JSON response.
    pub async fn call<R, B>(
        &self,
        ctx: &CancellationToken,
        method: Method,
        resource_path: &str,
        query: &QueryParams,
        body: Option<&B>,
    ) -> Result<R, Error>
    where
        R: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let bytes = self
            .call_bytes(ctx, method, resource_path, query, body)
            .await?;

        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Like [`call`](Dispatcher::call), discarding the response body.
    pub async fn call_empty<B>(
        &self,
        ctx: &CancellationToken,
        method: Method,
        resource_path: &str,
        query: &QueryParams,
        body: Option<&B>,
    ) -> Result<(), Error>
    where
        B: Serialize + ?Sized,
    {
        self.call_bytes(ctx, method, resource_path, query, body)
            .await
            .map(|_| ())
    }

    /// Like [`call`](Dispatcher::call), returning the raw response bytes.
    pub async fn call_bytes<B>(
        &self,
        ctx: &CancellationToken,
        method: Method,
        resource_path: &str,
        query: &QueryParams,
        body: Option<&B>,
    ) -> Result<Bytes, Error>
    where
        B: Serialize + ?Sized,
    {
        let body = body.map(serde_json::to_vec).transpose()?;

        let response = self
            .do_request(ctx, method, resource_path, query, body.map(Into::into))
            .await?;

        tokio::select! {
            biased;
            _ = ctx.cancelled() => Err(TransportError::Cancelled.into()),
            bytes = response.bytes() => Ok(bytes?),
        }
    }
}
