//! Backend commands queued from UI to backend worker.

use std::fmt;

use shared::domain::{ResourceDraft, ResourceId, StudentDraft, StudentId};

/// Identifies one queued command. Mutation ids double as the id of the
/// mutation flow they start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Resource,
    Student,
}

impl EntityKind {
    pub fn noun(self) -> &'static str {
        match self {
            Self::Resource => "resource",
            Self::Student => "student",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    Create,
    Update,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StudentFetchPurpose {
    ShowDetail,
    Edit,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BackendCommand {
    ListResources {
        request_id: RequestId,
        /// Mutation flow this list refreshes, if any.
        flow: Option<RequestId>,
    },
    CreateResource {
        request_id: RequestId,
        draft: ResourceDraft,
    },
    UpdateResource {
        request_id: RequestId,
        id: ResourceId,
        draft: ResourceDraft,
    },
    DeleteResource {
        request_id: RequestId,
        id: ResourceId,
    },
    ListStudents {
        request_id: RequestId,
        flow: Option<RequestId>,
    },
    FetchStudent {
        request_id: RequestId,
        id: StudentId,
        purpose: StudentFetchPurpose,
    },
    CreateStudent {
        request_id: RequestId,
        draft: StudentDraft,
    },
    UpdateStudent {
        request_id: RequestId,
        id: StudentId,
        draft: StudentDraft,
    },
    DeleteStudent {
        request_id: RequestId,
        id: StudentId,
    },
}

impl BackendCommand {
    pub fn request_id(&self) -> RequestId {
        match self {
            Self::ListResources { request_id, .. }
            | Self::CreateResource { request_id, .. }
            | Self::UpdateResource { request_id, .. }
            | Self::DeleteResource { request_id, .. }
            | Self::ListStudents { request_id, .. }
            | Self::FetchStudent { request_id, .. }
            | Self::CreateStudent { request_id, .. }
            | Self::UpdateStudent { request_id, .. }
            | Self::DeleteStudent { request_id, .. } => *request_id,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::ListResources { .. } => "list_resources",
            Self::CreateResource { .. } => "create_resource",
            Self::UpdateResource { .. } => "update_resource",
            Self::DeleteResource { .. } => "delete_resource",
            Self::ListStudents { .. } => "list_students",
            Self::FetchStudent { .. } => "fetch_student",
            Self::CreateStudent { .. } => "create_student",
            Self::UpdateStudent { .. } => "update_student",
            Self::DeleteStudent { .. } => "delete_student",
        }
    }

    pub fn entity(&self) -> EntityKind {
        match self {
            Self::ListResources { .. }
            | Self::CreateResource { .. }
            | Self::UpdateResource { .. }
            | Self::DeleteResource { .. } => EntityKind::Resource,
            Self::ListStudents { .. }
            | Self::FetchStudent { .. }
            | Self::CreateStudent { .. }
            | Self::UpdateStudent { .. }
            | Self::DeleteStudent { .. } => EntityKind::Student,
        }
    }
}
