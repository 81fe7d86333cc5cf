use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

use http::{Method, Request};
use serde::Serialize;
use serde::de::DeserializeOwned;
use strata_query::CollectionRequest;

use crate::error::Status;
use crate::interceptor::Interceptor;

/// Call metadata forwarded from prefixed request headers.
pub type Metadata = HashMap<String, String>;

pub trait Handler: Send + Sync {
    /// Handle one call, returning the JSON response body.
    fn handle(&self, req: &Request<Vec<u8>>, metadata: &Metadata) -> Result<Vec<u8>, Status>;
}

/// One endpoint: method and path relative to its registration prefix.
pub struct Route {
    pub method: Method,
    pub path: String,
    pub handler: Box<dyn Handler>,
}

impl Route {
    pub fn new(method: Method, path: impl Into<String>, handler: impl Handler + 'static) -> Self {
        Self {
            method,
            path: normalize_path(&path.into()),
            handler: Box::new(handler),
        }
    }
}

impl std::fmt::Debug for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

/// Leading slash, no trailing slash, `/` for the root.
pub(crate) fn normalize_path(path: &str) -> String {
    let trimmed = path.trim_matches('/');
    format!("/{trimmed}")
}

/// A request/response endpoint backed by a typed message.
///
/// The body decodes into `R` (empty body is `R::default()`), the
/// interceptor attaches any collection operations from the query string,
/// then `invoke` runs with the message and forwarded metadata.
pub struct UnaryHandler<R, T, F> {
    interceptor: Option<Arc<Interceptor>>,
    invoke: F,
    _marker: PhantomData<fn() -> (R, T)>,
}

impl<R, T, F> UnaryHandler<R, T, F>
where
    R: CollectionRequest + DeserializeOwned + Default,
    T: Serialize,
    F: Fn(Arc<R>, &Metadata) -> Result<T, Status> + Send + Sync,
{
    pub fn new(interceptor: Option<Arc<Interceptor>>, invoke: F) -> Self {
        Self {
            interceptor,
            invoke,
            _marker: PhantomData,
        }
    }

    fn decode(body: &[u8]) -> Result<R, Status> {
        if body.is_empty() {
            return Ok(R::default());
        }
        serde_json::from_slice(body)
            .map_err(|e| Status::invalid_argument(format!("decode request: {e}")))
    }
}

impl<R, T, F> Handler for UnaryHandler<R, T, F>
where
    R: CollectionRequest + DeserializeOwned + Default,
    T: Serialize,
    F: Fn(Arc<R>, &Metadata) -> Result<T, Status> + Send + Sync,
{
    fn handle(&self, req: &Request<Vec<u8>>, metadata: &Metadata) -> Result<Vec<u8>, Status> {
        let mut message = Arc::new(Self::decode(req.body())?);

        if let Some(interceptor) = &self.interceptor {
            interceptor.intercept(req.uri().query(), &mut message)?;
        }

        let response = (self.invoke)(message, metadata)?;
        serde_json::to_vec(&response).map_err(|e| Status::internal(format!("encode response: {e}")))
    }
}
