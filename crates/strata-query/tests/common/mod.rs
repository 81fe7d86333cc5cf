#![allow(dead_code)]

use strata_query::*;

pub fn parse(query: &str) -> ParsedQuery {
    parse_query(query, &PaginationConfig::default(), &OpaqueTokenDecoder)
}

pub fn parse_ok(query: &str) -> CollectionOperations {
    parse(query).into_result().unwrap()
}

/// A list request that accepts every collection operation.
#[derive(Debug, Default)]
pub struct ListUsersRequest {
    pub parent: String,
    pub sorting: Option<Sorting>,
    pub fields: Option<FieldSelection>,
    pub filter: Option<Filtering>,
    pub search: Option<Searching>,
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

/// A get-by-id request that only supports field projection.
#[derive(Debug, Default)]
pub struct GetUserRequest {
    pub id: String,
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

/// A request type with no collection capabilities at all.
#[derive(Debug, Default)]
pub struct DeleteUserRequest {
    pub id: String,
}

impl CollectionRequest for DeleteUserRequest {}
