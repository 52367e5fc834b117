//! Stable widget ids. Every id string the UI hands to egui comes from here.

use crate::backend_bridge::commands::EntityKind;
use crate::controller::forms::{FieldSpec, FormScope, ModalId};

pub const RESOURCE_TABLE_BODY: &str = "resourceTableBody";
pub const RESOURCE_NAME: &str = "resourceName";
pub const RESOURCE_RENAME: &str = "resourceRename";
pub const ADD_STUDENT_MODAL: &str = "addStudentModal";
pub const EDIT_STUDENT_MODAL: &str = "editStudentModal";
pub const EDIT_STUDENT_ID: &str = "editStudentId";
pub const STUDENT_TABLE_BODY: &str = "studentTableBody";
pub const STUDENT_DETAIL: &str = "studentDetail";
pub const CONFIRM_DIALOG: &str = "confirmDialog";
pub const ALERT_DIALOG: &str = "alertDialog";
/// Corner area toasts are stacked into.
pub const ERROR_MOUNT: &str = "errorMount";

pub fn modal_id(modal: ModalId) -> &'static str {
    match modal {
        ModalId::AddStudent => ADD_STUDENT_MODAL,
        ModalId::EditStudent => EDIT_STUDENT_MODAL,
    }
}

/// `{prefix}{Label}`, e.g. `Name` in the add form and `editName` in the edit form.
pub fn form_field_id(scope: FormScope, field: &FieldSpec) -> String {
    format!("{}{}", scope.prefix(), field.label)
}

pub fn egui_id(name: &str) -> egui::Id {
    egui::Id::new(name)
}

/// Both pages can hold a pending delete at once; each gets its own window.
pub fn confirm_dialog_id(entity: EntityKind) -> egui::Id {
    egui_id(CONFIRM_DIALOG).with(entity)
}
