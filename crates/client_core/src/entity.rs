//! Per-entity wire bindings: where a collection lives and how it wraps payloads.

use std::fmt;

use serde::{de::DeserializeOwned, Serialize};
use shared::{
    domain::{Resource, ResourceDraft, ResourceId, Student, StudentDraft, StudentId},
    protocol::Envelope,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectionRoutes {
    /// Collection name used in logs and errors.
    pub collection: &'static str,
    /// Path of the read-all endpoint, relative to the base URL.
    pub list_path: &'static str,
    /// Path new records are POSTed to; not always the list path.
    pub create_path: &'static str,
    /// Path prefix of the single-record endpoints; the id is appended.
    pub item_path: &'static str,
}

pub trait CrudEntity: DeserializeOwned + Clone + Send + Sync + 'static {
    type Id: Copy + Into<i64> + fmt::Display + Send + Sync + 'static;
    type Draft: Serialize + Send + Sync;

    const ROUTES: CollectionRoutes;
    const ENVELOPE: Envelope;

    fn id(&self) -> Self::Id;
}

impl CrudEntity for Resource {
    type Id = ResourceId;
    type Draft = ResourceDraft;

    const ROUTES: CollectionRoutes = CollectionRoutes {
        collection: "resources",
        list_path: "resources",
        create_path: "resources",
        item_path: "resources",
    };
    const ENVELOPE: Envelope = Envelope::Wrapped;

    fn id(&self) -> ResourceId {
        self.id
    }
}

impl CrudEntity for Student {
    type Id = StudentId;
    type Draft = StudentDraft;

    const ROUTES: CollectionRoutes = CollectionRoutes {
        collection: "students",
        list_path: "students",
        create_path: "student",
        item_path: "student",
    };
    const ENVELOPE: Envelope = Envelope::Bare;

    fn id(&self) -> StudentId {
        self.id
    }
}
