//! UI/backend events and error modeling for the CRUD controller.

use shared::{
    domain::{Resource, Student},
    error::{CrudOperation, RequestError, RequestErrorKind},
};

use crate::backend_bridge::commands::{EntityKind, MutationKind, RequestId, StudentFetchPurpose};

#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    Info(String),
    BackendUnavailable(UiError),
    ResourcesLoaded {
        flow: Option<RequestId>,
        resources: Vec<Resource>,
    },
    StudentsLoaded {
        flow: Option<RequestId>,
        students: Vec<Student>,
    },
    StudentFetched {
        purpose: StudentFetchPurpose,
        student: Student,
    },
    MutationApplied {
        flow: RequestId,
        entity: EntityKind,
        kind: MutationKind,
    },
    Failed {
        /// Mutation flow the failure ends, if it belongs to one.
        flow: Option<RequestId>,
        entity: EntityKind,
        error: UiError,
    },
}

impl UiEvent {
    pub fn entity(&self) -> Option<EntityKind> {
        match self {
            Self::Info(_) | Self::BackendUnavailable(_) => None,
            Self::ResourcesLoaded { .. } => Some(EntityKind::Resource),
            Self::StudentsLoaded { .. } | Self::StudentFetched { .. } => Some(EntityKind::Student),
            Self::MutationApplied { entity, .. } | Self::Failed { entity, .. } => Some(*entity),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Validation,
    NotFound,
    Server,
    Transport,
    Decode,
    Startup,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    BackendStartup,
    Input(EntityKind),
    Request(EntityKind, CrudOperation),
}

#[derive(Debug, Clone, PartialEq)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn validation(entity: EntityKind, message: impl Into<String>) -> Self {
        Self {
            category: UiErrorCategory::Validation,
            context: UiErrorContext::Input(entity),
            message: message.into(),
        }
    }

    pub fn startup(message: impl Into<String>) -> Self {
        Self {
            category: UiErrorCategory::Startup,
            context: UiErrorContext::BackendStartup,
            message: message.into(),
        }
    }

    pub fn from_request(entity: EntityKind, err: &RequestError) -> Self {
        let category = match &err.kind {
            RequestErrorKind::NotFound | RequestErrorKind::Status { code: 404, .. } => {
                UiErrorCategory::NotFound
            }
            RequestErrorKind::Status { .. } => UiErrorCategory::Server,
            RequestErrorKind::Transport(_) => UiErrorCategory::Transport,
            RequestErrorKind::Decode(_) => UiErrorCategory::Decode,
        };
        let target = match err.id {
            Some(id) => format!("{} #{id}", entity.noun()),
            None if err.operation == CrudOperation::List => format!("{}s", entity.noun()),
            None => entity.noun().to_string(),
        };
        let detail = match &err.kind {
            RequestErrorKind::Status {
                message: Some(message),
                ..
            } => message.clone(),
            RequestErrorKind::Status { code, message: None } => format!("server returned {code}"),
            RequestErrorKind::NotFound => "record does not exist".to_string(),
            RequestErrorKind::Transport(_) => "backend unreachable".to_string(),
            RequestErrorKind::Decode(_) => "unexpected response from backend".to_string(),
        };

        Self {
            category,
            context: UiErrorContext::Request(entity, err.operation),
            message: format!("Failed to {} {target}: {detail}", err.operation),
        }
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

pub fn err_label(category: UiErrorCategory) -> &'static str {
    match category {
        UiErrorCategory::Validation => "Input",
        UiErrorCategory::NotFound => "Not found",
        UiErrorCategory::Server => "Server",
        UiErrorCategory::Transport => "Network",
        UiErrorCategory::Decode => "Protocol",
        UiErrorCategory::Startup => "Startup",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_error_message_prefers_server_explanation() {
        let err = RequestError::new(
            "resources",
            CrudOperation::Update,
            Some(4),
            RequestErrorKind::Status {
                code: 500,
                message: Some("update failed".to_string()),
            },
        );
        let ui_error = UiError::from_request(EntityKind::Resource, &err);

        assert_eq!(ui_error.category(), UiErrorCategory::Server);
        assert_eq!(
            ui_error.context(),
            UiErrorContext::Request(EntityKind::Resource, CrudOperation::Update)
        );
        assert_eq!(ui_error.message(), "Failed to update resource #4: update failed");
    }

    #[test]
    fn list_transport_failure_names_collection() {
        let err = RequestError::new(
            "students",
            CrudOperation::List,
            None,
            RequestErrorKind::Transport("connection refused".to_string()),
        );
        let ui_error = UiError::from_request(EntityKind::Student, &err);

        assert_eq!(ui_error.category(), UiErrorCategory::Transport);
        assert_eq!(ui_error.message(), "Failed to list students: backend unreachable");
    }

    #[test]
    fn bare_404_is_not_found() {
        let err = RequestError::new(
            "students",
            CrudOperation::Get,
            Some(8),
            RequestErrorKind::Status {
                code: 404,
                message: None,
            },
        );
        let ui_error = UiError::from_request(EntityKind::Student, &err);

        assert_eq!(ui_error.category(), UiErrorCategory::NotFound);
        assert_eq!(ui_error.message(), "Failed to get student #8: server returned 404");
    }
}
