//! Command orchestration from UI actions to the backend command queue, and the
//! per-page state machines that react to backend events.

use std::{collections::BTreeMap, time::Instant};

use crossbeam_channel::{Sender, TrySendError};
use shared::domain::{ResourceDraft, ResourceId, StudentId};

use crate::backend_bridge::commands::{
    BackendCommand, EntityKind, MutationKind, RequestId, StudentFetchPurpose,
};
use crate::config::TimestampZone;
use crate::controller::{
    events::{UiError, UiEvent},
    forms::{student_draft_from_form, FormScope, ModalController, ModalId},
    notifications::Notifications,
    render::{
        render_resource_table, render_student_detail, render_student_table, DetailView,
        ResourceRowView, StudentRowView, TableView,
    },
};

pub fn dispatch_backend_command(
    cmd_tx: &Sender<BackendCommand>,
    cmd: BackendCommand,
) -> Result<(), UiError> {
    let cmd_name = cmd.name();
    let request_id = cmd.request_id();

    match cmd_tx.try_send(cmd) {
        Ok(()) => {
            tracing::debug!(command = cmd_name, %request_id, "queued ui->backend command");
            Ok(())
        }
        Err(TrySendError::Full(_)) => Err(UiError::startup("UI command queue is full; please retry")),
        Err(TrySendError::Disconnected(_)) => Err(UiError::startup(
            "Backend command processor disconnected; restart the application",
        )),
    }
}

/// Hands out request ids and queues commands for the backend worker.
pub struct Dispatcher {
    cmd_tx: Sender<BackendCommand>,
    next_request: u64,
}

impl Dispatcher {
    pub fn new(cmd_tx: Sender<BackendCommand>) -> Self {
        Self {
            cmd_tx,
            next_request: 1,
        }
    }

    pub fn next_request_id(&mut self) -> RequestId {
        let id = RequestId(self.next_request);
        self.next_request += 1;
        id
    }

    /// Queues the command built for a fresh request id. Queue failures are
    /// surfaced through `notices` and yield `None`.
    pub fn dispatch(
        &mut self,
        notices: &mut Notifications,
        build: impl FnOnce(RequestId) -> BackendCommand,
    ) -> Option<RequestId> {
        let request_id = self.next_request_id();
        match dispatch_backend_command(&self.cmd_tx, build(request_id)) {
            Ok(()) => Some(request_id),
            Err(err) => {
                tracing::warn!(%request_id, "{}", err.message());
                notices.alert_error(&err, None);
                None
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationPhase {
    Idle,
    Confirming,
    InFlight(MutationKind),
    Refreshing,
    ShowingError,
}

/// Phase of every mutation flow that has not yet returned to idle.
///
/// Flows are independent: overlapping mutations each run to completion and
/// nothing orders them.
#[derive(Debug, Default)]
pub struct MutationTracker {
    flows: BTreeMap<RequestId, MutationPhase>,
}

impl MutationTracker {
    pub fn phase(&self, flow: RequestId) -> MutationPhase {
        self.flows
            .get(&flow)
            .copied()
            .unwrap_or(MutationPhase::Idle)
    }

    pub fn active(&self) -> usize {
        self.flows.len()
    }

    pub fn in_flight(&self) -> usize {
        self.flows
            .values()
            .filter(|phase| matches!(phase, MutationPhase::InFlight(_)))
            .count()
    }

    fn begin(&mut self, flow: RequestId, kind: MutationKind) {
        self.flows.insert(flow, MutationPhase::InFlight(kind));
    }

    fn transition(&mut self, flow: RequestId, next: MutationPhase) {
        if let Some(phase) = self.flows.get_mut(&flow) {
            tracing::debug!(%flow, from = ?*phase, to = ?next, "mutation phase change");
            *phase = next;
        }
    }

    /// Returns the flow to idle.
    pub fn finish(&mut self, flow: RequestId) {
        if self.flows.remove(&flow).is_some() {
            tracing::debug!(%flow, "mutation flow idle");
        }
    }

    pub fn contains(&self, flow: RequestId) -> bool {
        self.flows.contains_key(&flow)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingDelete<Id> {
    pub id: Id,
    pub question: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenamePrompt {
    pub id: ResourceId,
    pub value: String,
}

/// Resource list page. Mutations refresh by re-listing and re-rendering the
/// table in place; failures show as auto-dismissing toasts.
pub struct ResourcePage {
    pub table: TableView<ResourceRowView>,
    pub name_input: String,
    pub rename: Option<RenamePrompt>,
    pub confirm: Option<PendingDelete<ResourceId>>,
    pub mutations: MutationTracker,
    zone: TimestampZone,
}

impl ResourcePage {
    pub fn new(zone: TimestampZone) -> Self {
        Self {
            table: TableView::Loading,
            name_input: String::new(),
            rename: None,
            confirm: None,
            mutations: MutationTracker::default(),
            zone,
        }
    }

    pub fn confirming(&self) -> bool {
        self.confirm.is_some()
    }

    pub fn load(&mut self, dispatcher: &mut Dispatcher, notices: &mut Notifications) {
        dispatcher.dispatch(notices, |request_id| BackendCommand::ListResources {
            request_id,
            flow: None,
        });
    }

    pub fn submit_create(
        &mut self,
        dispatcher: &mut Dispatcher,
        notices: &mut Notifications,
        now: Instant,
    ) -> Option<RequestId> {
        let name = self.name_input.trim();
        if name.is_empty() {
            let error = UiError::validation(EntityKind::Resource, "Enter a resource name.");
            notices.toast_error(&error, None, now);
            return None;
        }

        let draft = ResourceDraft::new(name);
        let flow = dispatcher.dispatch(notices, |request_id| BackendCommand::CreateResource {
            request_id,
            draft,
        })?;
        self.mutations.begin(flow, MutationKind::Create);
        Some(flow)
    }

    pub fn begin_rename(&mut self, id: ResourceId) {
        self.rename = Some(RenamePrompt {
            id,
            value: String::new(),
        });
    }

    pub fn cancel_rename(&mut self) {
        self.rename = None;
    }

    /// Sends whatever was typed, empty included; only cancelling aborts.
    pub fn submit_rename(
        &mut self,
        dispatcher: &mut Dispatcher,
        notices: &mut Notifications,
    ) -> Option<RequestId> {
        let prompt = self.rename.take()?;
        let draft = ResourceDraft::new(prompt.value);
        let flow = dispatcher.dispatch(notices, |request_id| BackendCommand::UpdateResource {
            request_id,
            id: prompt.id,
            draft,
        })?;
        self.mutations.begin(flow, MutationKind::Update);
        Some(flow)
    }

    pub fn request_delete(&mut self, id: ResourceId) {
        self.confirm = Some(PendingDelete {
            id,
            question: format!("Delete resource #{id}? This cannot be undone."),
        });
    }

    pub fn resolve_delete(
        &mut self,
        confirmed: bool,
        dispatcher: &mut Dispatcher,
        notices: &mut Notifications,
    ) -> Option<RequestId> {
        let pending = self.confirm.take()?;
        if !confirmed {
            tracing::debug!(id = %pending.id, "resource delete declined");
            return None;
        }
        let flow = dispatcher.dispatch(notices, |request_id| BackendCommand::DeleteResource {
            request_id,
            id: pending.id,
        })?;
        self.mutations.begin(flow, MutationKind::Delete);
        Some(flow)
    }

    pub fn apply_event(
        &mut self,
        event: UiEvent,
        dispatcher: &mut Dispatcher,
        notices: &mut Notifications,
        now: Instant,
    ) {
        match event {
            UiEvent::ResourcesLoaded { flow, resources } => {
                self.table = TableView::Ready(render_resource_table(&resources, self.zone));
                if let Some(flow) = flow {
                    self.mutations.finish(flow);
                }
            }
            UiEvent::MutationApplied {
                flow,
                entity: EntityKind::Resource,
                kind,
            } => {
                self.mutations.transition(flow, MutationPhase::Refreshing);
                if kind == MutationKind::Create {
                    self.name_input.clear();
                }
                let queued = dispatcher.dispatch(notices, |request_id| {
                    BackendCommand::ListResources {
                        request_id,
                        flow: Some(flow),
                    }
                });
                if queued.is_none() {
                    self.mutations.finish(flow);
                }
            }
            UiEvent::Failed {
                flow,
                entity: EntityKind::Resource,
                error,
            } => {
                if let Some(flow) = flow {
                    self.mutations.transition(flow, MutationPhase::ShowingError);
                }
                let origin = flow.filter(|flow| self.mutations.contains(*flow));
                notices.toast_error(&error, origin, now);
            }
            _ => {}
        }
    }
}

/// Student page. Mutations end in a full page reload; every failure is a
/// blocking alert.
pub struct StudentPage {
    pub table: TableView<StudentRowView>,
    pub detail: Option<DetailView>,
    pub modals: ModalController,
    pub editing: Option<StudentId>,
    pub confirm: Option<PendingDelete<StudentId>>,
    pub mutations: MutationTracker,
}

impl Default for StudentPage {
    fn default() -> Self {
        Self::new()
    }
}

impl StudentPage {
    pub fn new() -> Self {
        Self {
            table: TableView::Loading,
            detail: None,
            modals: ModalController::for_model::<shared::domain::Student>(),
            editing: None,
            confirm: None,
            mutations: MutationTracker::default(),
        }
    }

    pub fn confirming(&self) -> bool {
        self.confirm.is_some()
    }

    pub fn load(&mut self, dispatcher: &mut Dispatcher, notices: &mut Notifications) {
        dispatcher.dispatch(notices, |request_id| BackendCommand::ListStudents {
            request_id,
            flow: None,
        });
    }

    /// Throws away every piece of transient page state and re-fetches the list.
    pub fn reload(
        &mut self,
        flow: Option<RequestId>,
        dispatcher: &mut Dispatcher,
        notices: &mut Notifications,
    ) {
        self.table = TableView::Loading;
        self.detail = None;
        self.modals.close_all();
        self.editing = None;
        self.confirm = None;
        let queued = dispatcher.dispatch(notices, |request_id| BackendCommand::ListStudents {
            request_id,
            flow,
        });
        if let (None, Some(flow)) = (queued, flow) {
            self.mutations.finish(flow);
        }
    }

    pub fn open_add_modal(&mut self) {
        self.modals.open_modal(ModalId::AddStudent);
    }

    pub fn close_modal(&mut self, modal: ModalId) {
        self.modals.close_modal(modal);
        if modal == ModalId::EditStudent {
            self.editing = None;
        }
    }

    pub fn show_detail(
        &mut self,
        id: StudentId,
        dispatcher: &mut Dispatcher,
        notices: &mut Notifications,
    ) {
        dispatcher.dispatch(notices, |request_id| BackendCommand::FetchStudent {
            request_id,
            id,
            purpose: StudentFetchPurpose::ShowDetail,
        });
    }

    /// Fetches the record first; the edit modal opens pre-filled once it
    /// arrives.
    pub fn begin_edit(
        &mut self,
        id: StudentId,
        dispatcher: &mut Dispatcher,
        notices: &mut Notifications,
    ) {
        dispatcher.dispatch(notices, |request_id| BackendCommand::FetchStudent {
            request_id,
            id,
            purpose: StudentFetchPurpose::Edit,
        });
    }

    pub fn submit_add(
        &mut self,
        dispatcher: &mut Dispatcher,
        notices: &mut Notifications,
    ) -> Option<RequestId> {
        let mut draft = student_draft_from_form(&self.modals.read_form(FormScope::Add));
        if draft.name.trim().is_empty() {
            let error = UiError::validation(EntityKind::Student, "Enter the student's name.");
            notices.alert_error(&error, None);
            return None;
        }
        draft.name = draft.name.trim().to_string();
        self.modals.close_modal(ModalId::AddStudent);

        let flow = dispatcher.dispatch(notices, |request_id| BackendCommand::CreateStudent {
            request_id,
            draft,
        })?;
        self.mutations.begin(flow, MutationKind::Create);
        Some(flow)
    }

    pub fn submit_edit(
        &mut self,
        dispatcher: &mut Dispatcher,
        notices: &mut Notifications,
    ) -> Option<RequestId> {
        let id = self.editing?;
        let mut draft = student_draft_from_form(&self.modals.read_form(FormScope::Edit));
        if draft.name.trim().is_empty() {
            let error = UiError::validation(EntityKind::Student, "Enter the student's name.");
            notices.alert_error(&error, None);
            return None;
        }
        draft.name = draft.name.trim().to_string();
        self.close_modal(ModalId::EditStudent);

        let flow = dispatcher.dispatch(notices, |request_id| BackendCommand::UpdateStudent {
            request_id,
            id,
            draft,
        })?;
        self.mutations.begin(flow, MutationKind::Update);
        Some(flow)
    }

    pub fn request_delete(&mut self, id: StudentId, name: &str) {
        self.confirm = Some(PendingDelete {
            id,
            question: format!("Delete student {name}?"),
        });
    }

    pub fn resolve_delete(
        &mut self,
        confirmed: bool,
        dispatcher: &mut Dispatcher,
        notices: &mut Notifications,
    ) -> Option<RequestId> {
        let pending = self.confirm.take()?;
        if !confirmed {
            tracing::debug!(id = %pending.id, "student delete declined");
            return None;
        }
        let flow = dispatcher.dispatch(notices, |request_id| BackendCommand::DeleteStudent {
            request_id,
            id: pending.id,
        })?;
        self.mutations.begin(flow, MutationKind::Delete);
        Some(flow)
    }

    pub fn apply_event(
        &mut self,
        event: UiEvent,
        dispatcher: &mut Dispatcher,
        notices: &mut Notifications,
    ) {
        match event {
            UiEvent::StudentsLoaded { flow, students } => {
                self.table = TableView::Ready(render_student_table(&students));
                if let Some(flow) = flow {
                    self.mutations.finish(flow);
                }
            }
            UiEvent::StudentFetched {
                purpose: StudentFetchPurpose::ShowDetail,
                student,
            } => {
                self.detail = Some(render_student_detail(&student));
            }
            UiEvent::StudentFetched {
                purpose: StudentFetchPurpose::Edit,
                student,
            } => {
                self.modals.write_form(FormScope::Edit, &student);
                self.editing = Some(student.id);
                self.modals.open_modal(ModalId::EditStudent);
            }
            UiEvent::MutationApplied {
                flow,
                entity: EntityKind::Student,
                kind,
            } => {
                self.mutations.transition(flow, MutationPhase::Refreshing);
                self.reload(Some(flow), dispatcher, notices);
                notices.alert_info(match kind {
                    MutationKind::Create => "Student added.",
                    MutationKind::Update => "Student updated.",
                    MutationKind::Delete => "Student deleted.",
                });
            }
            UiEvent::Failed {
                flow,
                entity: EntityKind::Student,
                error,
            } => {
                if let Some(flow) = flow {
                    self.mutations.transition(flow, MutationPhase::ShowingError);
                }
                let origin = flow.filter(|flow| self.mutations.contains(*flow));
                notices.alert_error(&error, origin);
            }
            _ => {}
        }
    }
}

/// Phase of a flow as the user sees it, counting an open confirmation dialog.
pub fn visible_phase(
    tracker: &MutationTracker,
    flow: Option<RequestId>,
    confirming: bool,
) -> MutationPhase {
    match flow {
        Some(flow) => tracker.phase(flow),
        None if confirming => MutationPhase::Confirming,
        None => MutationPhase::Idle,
    }
}

#[cfg(test)]
#[path = "tests/orchestration_tests.rs"]
mod tests;
