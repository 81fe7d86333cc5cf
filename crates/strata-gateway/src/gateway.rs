use std::collections::HashSet;
use std::sync::Arc;

use http::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use strata_query::{CollectionRequest, PageTokenDecoder};

use crate::config::{DialOptions, GatewayConfig};
use crate::error::{GatewayError, Status};
use crate::interceptor::Interceptor;
use crate::mux::{Mux, MuxEntry};
use crate::route::{Metadata, Route, UnaryHandler, normalize_path};

type RegisterFn = Box<dyn FnOnce(&RegisterContext) -> Result<Vec<Route>, Status>>;

struct Registration {
    prefix: String,
    register: RegisterFn,
}

/// What an endpoint registration gets to build its routes with.
pub struct RegisterContext {
    pub server_address: String,
    pub dial: DialOptions,
    interceptor: Option<Arc<Interceptor>>,
}

impl RegisterContext {
    /// A unary route whose requests carry collection operations from the
    /// query string, when the interceptor is enabled.
    pub fn unary<R, T, F>(&self, method: Method, path: &str, invoke: F) -> Route
    where
        R: CollectionRequest + DeserializeOwned + Default + 'static,
        T: Serialize + 'static,
        F: Fn(Arc<R>, &Metadata) -> Result<T, Status> + Send + Sync + 'static,
    {
        Route::new(
            method,
            path,
            UnaryHandler::<R, T, F>::new(self.interceptor.clone(), invoke),
        )
    }
}

pub struct Gateway {
    config: GatewayConfig,
    decoder: Option<Arc<dyn PageTokenDecoder>>,
    registrations: Vec<Registration>,
}

impl Gateway {
    pub fn new(config: GatewayConfig) -> Self {
        Self {
            config,
            decoder: None,
            registrations: Vec::new(),
        }
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Use a backend-specific page token format.
    pub fn with_token_decoder(mut self, decoder: Arc<dyn PageTokenDecoder>) -> Self {
        self.decoder = Some(decoder);
        self
    }

    /// Register an endpoint group under `prefix`. `register` runs once, at
    /// [`build`](Self::build).
    pub fn register(
        mut self,
        prefix: &str,
        register: impl FnOnce(&RegisterContext) -> Result<Vec<Route>, Status> + 'static,
    ) -> Self {
        self.registrations.push(Registration {
            prefix: normalize_prefix(prefix),
            register: Box::new(register),
        });
        self
    }

    pub fn build(self) -> Result<Mux, GatewayError> {
        let interceptor = self.config.dial.collection_operators.then(|| {
            let interceptor = Interceptor::new(self.config.pagination);
            let interceptor = match &self.decoder {
                Some(decoder) => interceptor.with_decoder(Arc::clone(decoder)),
                None => interceptor,
            };
            Arc::new(interceptor)
        });
        let ctx = RegisterContext {
            server_address: self.config.server_address.clone(),
            dial: self.config.dial.clone(),
            interceptor,
        };

        let mut seen = HashSet::new();
        let mut entries = Vec::with_capacity(self.registrations.len());
        for Registration { prefix, register } in self.registrations {
            let routes = register(&ctx).map_err(|source| GatewayError::Register {
                prefix: prefix.clone(),
                source,
            })?;
            for route in &routes {
                let full = format!("{prefix}{}", route.path);
                if !seen.insert((route.method.clone(), full.clone())) {
                    return Err(GatewayError::DuplicateRoute {
                        method: route.method.clone(),
                        path: full,
                    });
                }
            }
            tracing::info!(%prefix, routes = routes.len(), "registered endpoints");
            entries.push(MuxEntry { prefix, routes });
        }

        Ok(Mux::new(self.config.mux, entries))
    }
}

/// Leading slash, no trailing slash, empty for the root.
fn normalize_prefix(prefix: &str) -> String {
    match normalize_path(prefix).as_str() {
        "/" => String::new(),
        other => other.to_string(),
    }
}
