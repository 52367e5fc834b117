//! Pure view-model rendering for entity tables and detail panels.
//!
//! Nothing here touches egui; the UI adapter binds these views to widgets.

use chrono::{DateTime, Local, Utc};
use shared::domain::{Resource, ResourceId, Student, StudentId};

use crate::backend_bridge::commands::EntityKind;
use crate::config::TimestampZone;

pub const UNNAMED_RESOURCE: &str = "Unnamed Resource";
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub const RESOURCE_COLUMNS: [&str; 5] = ["ID", "Name", "Created", "Updated", "Actions"];
pub const STUDENT_COLUMNS: [&str; 5] = ["ID", "Name", "Age", "Score", "Actions"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowAction {
    Edit,
    Delete,
    ShowDetail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionTrigger<Id> {
    pub action: RowAction,
    pub target: Id,
    pub label: &'static str,
}

impl<Id: Copy> ActionTrigger<Id> {
    fn edit(target: Id) -> Self {
        Self {
            action: RowAction::Edit,
            target,
            label: "Edit",
        }
    }

    fn delete(target: Id) -> Self {
        Self {
            action: RowAction::Delete,
            target,
            label: "Delete",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRowView {
    pub id: ResourceId,
    pub id_text: String,
    pub name: String,
    pub created_at: String,
    pub updated_at: String,
    pub actions: [ActionTrigger<ResourceId>; 2],
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentRowView {
    pub id: StudentId,
    pub id_text: String,
    pub name: String,
    pub age: String,
    pub score: String,
    pub actions: [ActionTrigger<StudentId>; 2],
    /// Fired by selecting the row itself rather than a button.
    pub select: ActionTrigger<StudentId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmptyStateView {
    pub message: &'static str,
    pub colspan: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableBody<R> {
    Rows(Vec<R>),
    Empty(EmptyStateView),
}

impl<R> TableBody<R> {
    pub fn row_count(&self) -> usize {
        match self {
            Self::Rows(rows) => rows.len(),
            Self::Empty(_) => 0,
        }
    }
}

/// What a table currently shows: nothing fetched yet, or a rendered body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableView<R> {
    Loading,
    Ready(TableBody<R>),
}

impl<R> TableView<R> {
    pub fn rows(&self) -> &[R] {
        match self {
            Self::Ready(TableBody::Rows(rows)) => rows,
            _ => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailView {
    pub heading: String,
    pub lines: Vec<String>,
}

/// Formats an RFC 3339 timestamp as `YYYY-MM-DD HH:MM:SS` in `zone`.
/// Unparseable input is returned unchanged.
pub fn format_timestamp(raw: &str, zone: TimestampZone) -> String {
    let Ok(parsed) = DateTime::parse_from_rfc3339(raw.trim()) else {
        return raw.to_string();
    };
    match zone {
        TimestampZone::Utc => parsed.with_timezone(&Utc).format(TIMESTAMP_FORMAT).to_string(),
        TimestampZone::Local => parsed
            .with_timezone(&Local)
            .format(TIMESTAMP_FORMAT)
            .to_string(),
    }
}

pub fn display_name(resource: &Resource) -> &str {
    match resource.name.as_deref() {
        Some(name) if !name.is_empty() => name,
        _ => UNNAMED_RESOURCE,
    }
}

pub fn render_resource_row(resource: &Resource, zone: TimestampZone) -> ResourceRowView {
    ResourceRowView {
        id: resource.id,
        id_text: resource.id.to_string(),
        name: display_name(resource).to_string(),
        created_at: format_timestamp(&resource.created_at, zone),
        updated_at: format_timestamp(&resource.updated_at, zone),
        actions: [
            ActionTrigger::edit(resource.id),
            ActionTrigger::delete(resource.id),
        ],
    }
}

pub fn render_empty_state(entity: EntityKind) -> EmptyStateView {
    match entity {
        EntityKind::Resource => EmptyStateView {
            message: "No resources yet.",
            colspan: RESOURCE_COLUMNS.len(),
        },
        EntityKind::Student => EmptyStateView {
            message: "No students yet.",
            colspan: STUDENT_COLUMNS.len(),
        },
    }
}

pub fn render_resource_table(
    resources: &[Resource],
    zone: TimestampZone,
) -> TableBody<ResourceRowView> {
    if resources.is_empty() {
        return TableBody::Empty(render_empty_state(EntityKind::Resource));
    }
    TableBody::Rows(
        resources
            .iter()
            .map(|resource| render_resource_row(resource, zone))
            .collect(),
    )
}

pub fn render_student_row(student: &Student) -> StudentRowView {
    StudentRowView {
        id: student.id,
        id_text: student.id.to_string(),
        name: student.name.clone(),
        age: student.age.to_string(),
        score: student.score.to_string(),
        actions: [
            ActionTrigger::edit(student.id),
            ActionTrigger::delete(student.id),
        ],
        select: ActionTrigger {
            action: RowAction::ShowDetail,
            target: student.id,
            label: "Details",
        },
    }
}

pub fn render_student_table(students: &[Student]) -> TableBody<StudentRowView> {
    if students.is_empty() {
        return TableBody::Empty(render_empty_state(EntityKind::Student));
    }
    TableBody::Rows(students.iter().map(render_student_row).collect())
}

pub fn render_student_detail(student: &Student) -> DetailView {
    DetailView {
        heading: format!("Details for {}", student.name),
        lines: vec![
            format!("Age: {}", student.age),
            format!("Score: {} points", student.score),
        ],
    }
}

#[cfg(test)]
#[path = "tests/render_tests.rs"]
mod tests;
