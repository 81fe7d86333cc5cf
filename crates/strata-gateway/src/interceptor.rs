use std::sync::Arc;

use strata_query::{
    Applied, CollectionRequest, OpaqueTokenDecoder, PageTokenDecoder, PaginationConfig,
    parse_query,
};

use crate::error::{Code, Status};

/// Turns the query string of an incoming call into collection operations
/// and attaches them to the outgoing request.
pub struct Interceptor {
    pagination: PaginationConfig,
    decoder: Arc<dyn PageTokenDecoder>,
}

impl Interceptor {
    pub fn new(pagination: PaginationConfig) -> Self {
        Self {
            pagination,
            decoder: Arc::new(OpaqueTokenDecoder),
        }
    }

    pub fn with_decoder(mut self, decoder: Arc<dyn PageTokenDecoder>) -> Self {
        self.decoder = decoder;
        self
    }

    /// Every syntax error is reported, joined into one invalid-argument
    /// status. Nothing is attached unless all operators parse.
    pub fn intercept<R: CollectionRequest>(
        &self,
        query: Option<&str>,
        request: &mut Arc<R>,
    ) -> Result<(), Status> {
        let Some(query) = query.filter(|q| !q.is_empty()) else {
            return Ok(());
        };

        let parsed = parse_query(query, &self.pagination, self.decoder.as_ref());
        if !parsed.errors.is_empty() {
            let message = parsed
                .errors
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; ");
            tracing::warn!(errors = parsed.errors.len(), %message, "rejecting collection operators");
            return Err(Status::new(Code::InvalidArgument, message));
        }

        for (kind, applied) in parsed.operations.attach_to_shared(request)? {
            match applied {
                Applied::Attached => tracing::debug!(%kind, "attached collection operation"),
                Applied::Ignored => tracing::debug!(%kind, "request does not accept operation"),
            }
        }
        Ok(())
    }
}
