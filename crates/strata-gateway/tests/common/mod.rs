#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use http::{Method, Request, Response};
use serde::{Deserialize, Serialize};
use strata_gateway::*;
use strata_query::*;

/// List call accepting every collection operation.
#[derive(Debug, Default, Deserialize)]
pub struct ListUsersRequest {
    #[serde(default)]
    pub parent: String,
    #[serde(skip)]
    pub sorting: Option<Sorting>,
    #[serde(skip)]
    pub fields: Option<FieldSelection>,
    #[serde(skip)]
    pub filter: Option<Filtering>,
    #[serde(skip)]
    pub search: Option<Searching>,
    #[serde(skip)]
    pub paging: Option<Pagination>,
}

impl ReceiveSorting for ListUsersRequest {
    fn set_sorting(&mut self, sorting: Sorting) {
        self.sorting = Some(sorting);
    }
}

impl ReceiveFieldSelection for ListUsersRequest {
    fn set_field_selection(&mut self, fields: FieldSelection) {
        self.fields = Some(fields);
    }
}

impl ReceiveFiltering for ListUsersRequest {
    fn set_filtering(&mut self, filtering: Filtering) {
        self.filter = Some(filtering);
    }
}

impl ReceiveSearching for ListUsersRequest {
    fn set_searching(&mut self, searching: Searching) {
        self.search = Some(searching);
    }
}

impl ReceivePagination for ListUsersRequest {
    fn set_pagination(&mut self, pagination: Pagination) {
        self.paging = Some(pagination);
    }
}

impl CollectionRequest for ListUsersRequest {
    fn sorting(&mut self) -> Option<&mut dyn ReceiveSorting> {
        Some(self)
    }

    fn field_selection(&mut self) -> Option<&mut dyn ReceiveFieldSelection> {
        Some(self)
    }

    fn filtering(&mut self) -> Option<&mut dyn ReceiveFiltering> {
        Some(self)
    }

    fn searching(&mut self) -> Option<&mut dyn ReceiveSearching> {
        Some(self)
    }

    fn pagination(&mut self) -> Option<&mut dyn ReceivePagination> {
        Some(self)
    }
}

/// Single-resource call; only a projection applies.
#[derive(Debug, Default, Deserialize)]
pub struct GetUserRequest {
    pub id: String,
    #[serde(skip)]
    pub fields: Option<FieldSelection>,
}

impl ReceiveFieldSelection for GetUserRequest {
    fn set_field_selection(&mut self, fields: FieldSelection) {
        self.fields = Some(fields);
    }
}

impl CollectionRequest for GetUserRequest {
    fn field_selection(&mut self) -> Option<&mut dyn ReceiveFieldSelection> {
        Some(self)
    }
}

/// What the fake backend saw, echoed back as the response.
#[derive(Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Echo {
    pub parent: Option<String>,
    pub id: Option<String>,
    pub sorting: Option<String>,
    pub fields: Option<Vec<String>>,
    pub filter: Option<String>,
    pub search: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u64>,
    pub metadata: Vec<(String, String)>,
}

fn sorted_metadata(metadata: &Metadata) -> Vec<(String, String)> {
    let mut pairs: Vec<_> = metadata
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    pairs.sort();
    pairs
}

fn field_list(fields: &FieldSelection) -> Vec<String> {
    fields.fields.iter().map(|f| f.to_string()).collect()
}

pub fn list_users(req: Arc<ListUsersRequest>, metadata: &Metadata) -> Result<Echo, Status> {
    if req.parent == "missing" {
        return Err(Status::not_found("parent missing does not exist"));
    }
    Ok(Echo {
        parent: Some(req.parent.clone()),
        sorting: req.sorting.as_ref().map(ToString::to_string),
        fields: req.fields.as_ref().map(field_list),
        filter: req.filter.as_ref().map(|f| f.root.to_string()),
        search: req.search.as_ref().map(|s| s.query.clone()),
        limit: req.paging.as_ref().map(|p| p.limit),
        offset: req.paging.as_ref().and_then(|p| p.offset),
        metadata: sorted_metadata(metadata),
        ..Echo::default()
    })
}

pub fn get_user(req: Arc<GetUserRequest>, metadata: &Metadata) -> Result<Echo, Status> {
    Ok(Echo {
        id: Some(req.id.clone()),
        fields: req.fields.as_ref().map(field_list),
        metadata: sorted_metadata(metadata),
        ..Echo::default()
    })
}

pub fn users_routes(ctx: &RegisterContext) -> Result<Vec<Route>, Status> {
    Ok(vec![
        ctx.unary(Method::POST, "/list", list_users),
        ctx.unary(Method::POST, "/get", get_user),
    ])
}

pub fn build(config: GatewayConfig) -> Mux {
    Gateway::new(config)
        .register("/api/users", users_routes)
        .build()
        .unwrap()
}

/// Server addresses seen by registration functions.
pub fn recording_routes(
    seen: Arc<Mutex<Vec<String>>>,
) -> impl FnOnce(&RegisterContext) -> Result<Vec<Route>, Status> + 'static {
    move |ctx| {
        seen.lock().unwrap().push(ctx.server_address.clone());
        Ok(vec![ctx.unary(Method::GET, "/", list_users)])
    }
}

pub fn post(uri: &str, body: &str) -> Request<Vec<u8>> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .body(body.as_bytes().to_vec())
        .unwrap()
}

pub fn echo(response: &Response<Vec<u8>>) -> Echo {
    serde_json::from_slice(response.body()).unwrap()
}

pub fn error_body(response: &Response<Vec<u8>>) -> serde_json::Value {
    serde_json::from_slice(response.body()).unwrap()
}
