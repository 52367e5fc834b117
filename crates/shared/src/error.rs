use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrudOperation {
    List,
    Get,
    Create,
    Update,
    Delete,
}

impl CrudOperation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Get => "get",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for CrudOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestErrorKind {
    #[error("server responded with status {code}{}", .message.as_deref().map(|m| format!(" ({m})")).unwrap_or_default())]
    Status { code: u16, message: Option<String> },
    #[error("no such record")]
    NotFound,
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("malformed response: {0}")]
    Decode(String),
}

/// Failure of a single backend call. The only structured error kind the
/// client produces.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{collection} {operation}{} failed: {kind}", .id.map(|id| format!(" #{id}")).unwrap_or_default())]
pub struct RequestError {
    pub collection: &'static str,
    pub operation: CrudOperation,
    pub id: Option<i64>,
    pub kind: RequestErrorKind,
}

impl RequestError {
    pub fn new(
        collection: &'static str,
        operation: CrudOperation,
        id: Option<i64>,
        kind: RequestErrorKind,
    ) -> Self {
        Self {
            collection,
            operation,
            id,
            kind,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self.kind,
            RequestErrorKind::NotFound | RequestErrorKind::Status { code: 404, .. }
        )
    }
}
