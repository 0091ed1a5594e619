//! Clients for the CoreLedger resources.
//!
//! Every resource is a plain data type implementing [`Resource`] plus the capability
//! traits matching the operations the API supports on it. All the requests flow through
//! a single [`ResourceApi`], which owns the method/path conventions shared by the API.

use crate::{
    dispatcher::{Dispatcher, QueryParams},
    pagination::{collect_all, ListResponse, Page, DEFAULT_PAGE_SIZE},
    Error,
};
use reqwest::Method;
use serde::{de::DeserializeOwned, Serialize};
use std::{
    fmt::{Debug, Formatter},
    marker::PhantomData,
};
use tokio_util::sync::CancellationToken;
use urlencoding::encode;

pub mod accounts;
pub mod auth;
pub mod cards;
pub mod compliance_workflows;
pub mod customers;
pub mod kyc_documents;
pub mod transactions;
pub mod transfers;

/// A CoreLedger resource addressed by `<base>/api/v1/<PATH>[/<uid>]`.
pub trait Resource: DeserializeOwned + Send + Sync + 'static {
    /// Resource path, relative to the API version segment.
    const PATH: &'static str;
}

/// Resources that can be listed with `GET /<PATH>`.
pub trait Listable: Resource {
    /// Filters accepted by the list endpoint.
    type Query: Serialize + Send + Sync;
}

/// Resources that can be created with `POST /<PATH>`.
pub trait Creatable: Resource {
    type CreateRequest: Serialize + Send + Sync;
}

/// Resources that can be updated with `PUT /<PATH>/<uid>`.
pub trait Updatable: Resource {
    type UpdateRequest: Serialize + Send + Sync;
}

/// Resources that can be removed with `DELETE /<PATH>/<uid>`.
pub trait Deletable: Resource {}

/// Client for the endpoints of a single resource type.
pub struct ResourceApi<R> {
    dispatcher: Dispatcher,
    ctx: CancellationToken,
    _resource: PhantomData<fn() -> R>,
}

impl<R> Clone for ResourceApi<R> {
    fn clone(&self) -> Self {
        Self {
            dispatcher: self.dispatcher.clone(),
            ctx: self.ctx.clone(),
            _resource: PhantomData,
        }
    }
}

impl<R> Debug for ResourceApi<R> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceApi")
            .field("resource", &std::any::type_name::<R>())
            .field("dispatcher", &self.dispatcher)
            .finish_non_exhaustive()
    }
}

impl<R: Resource> ResourceApi<R> {
    pub(crate) fn new(dispatcher: Dispatcher, ctx: CancellationToken) -> Self {
        Self {
            dispatcher,
            ctx,
            _resource: PhantomData,
        }
    }

    /// Returns a copy of this client whose calls are aborted when `ctx` is cancelled.
    pub fn with_cancellation(&self, ctx: CancellationToken) -> Self {
        Self::new(self.dispatcher.clone(), ctx)
    }

    pub(crate) fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub(crate) fn ctx(&self) -> &CancellationToken {
        &self.ctx
    }

    pub(crate) fn item_path(uid: &str) -> String {
        format!("{}/{}", R::PATH, encode(uid))
    }

    /// Gets a resource by its unique identifier.
    #[tracing::instrument(name = "Get Resource", skip(self), fields(resource = R::PATH))]
    pub async fn get(&self, uid: &str) -> Result<R, Error> {
        self.dispatcher
            .call::<R, ()>(
                &self.ctx,
                Method::GET,
                &Self::item_path(uid),
                &QueryParams::new(),
                None,
            )
            .await
    }

    /// Gets a resource by its unique identifier.
    ///
    /// If there's no resource with the given identifier, `None` is returned.
    #[tracing::instrument(name = "Find Resource", skip(self), fields(resource = R::PATH))]
    pub async fn find(&self, uid: &str) -> Result<Option<R>, Error> {
        match self.get(uid).await {
            Ok(resource) => Ok(Some(resource)),
            Err(Error::Protocol(api_error)) if api_error.status == 404 => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Invokes a verb sub-resource with `PUT /<PATH>/<uid>/<action>`.
    #[tracing::instrument(name = "Resource Action", skip(self, body), fields(resource = R::PATH))]
    pub async fn action<B>(&self, uid: &str, action: &str, body: Option<&B>) -> Result<R, Error>
    where
        B: Serialize + ?Sized,
    {
        self.dispatcher
            .call(
                &self.ctx,
                Method::PUT,
                &format!("{}/{}", Self::item_path(uid), encode(action)),
                &QueryParams::new(),
                body,
            )
            .await
    }
}

impl<R: Listable> ResourceApi<R> {
    /// Lists a single page of resources.
    #[tracing::instrument(
        name = "List Resources",
        skip(self, query),
        fields(resource = R::PATH, limit = page.limit, offset = page.offset)
    )]
    pub async fn list(&self, query: &R::Query, page: Page) -> Result<ListResponse<R>, Error> {
        let query = QueryParams::from_serialize(query)?
            .with("limit", page.limit)
            .with("offset", page.offset);

        self.dispatcher
            .call::<_, ()>(&self.ctx, Method::GET, R::PATH, &query, None)
            .await
    }

    /// Lists all the resources matching `query`, following pagination.
    #[tracing::instrument(name = "List All Resources", skip(self, query), fields(resource = R::PATH))]
    pub async fn list_all(&self, query: &R::Query) -> Result<Vec<R>, Error> {
        collect_all(DEFAULT_PAGE_SIZE, |page| self.list(query, page)).await
    }
}

impl<R: Creatable> ResourceApi<R> {
    /// Creates a new resource.
    #[tracing::instrument(name = "Create Resource", skip(self, req), fields(resource = R::PATH))]
    pub async fn create(&self, req: &R::CreateRequest) -> Result<R, Error> {
        self.dispatcher
            .call(
                &self.ctx,
                Method::POST,
                R::PATH,
                &QueryParams::new(),
                Some(req),
            )
            .await
    }
}

impl<R: Updatable> ResourceApi<R> {
    /// Replaces the mutable fields of an existing resource.
    #[tracing::instrument(name = "Update Resource", skip(self, req), fields(resource = R::PATH))]
    pub async fn update(&self, uid: &str, req: &R::UpdateRequest) -> Result<R, Error> {
        self.dispatcher
            .call(
                &self.ctx,
                Method::PUT,
                &Self::item_path(uid),
                &QueryParams::new(),
                Some(req),
            )
            .await
    }
}

impl<R: Deletable> ResourceApi<R> {
    /// Deletes an existing resource.
    #[tracing::instrument(name = "Delete Resource", skip(self), fields(resource = R::PATH))]
    pub async fn delete(&self, uid: &str) -> Result<(), Error> {
        self.dispatcher
            .call_empty::<()>(
                &self.ctx,
                Method::DELETE,
                &Self::item_path(uid),
                &QueryParams::new(),
                None,
            )
            .await
    }
}
