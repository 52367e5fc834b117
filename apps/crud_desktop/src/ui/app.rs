use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender};
use eframe::egui;
use shared::domain::{ResourceId, StudentId};

use crate::backend_bridge::commands::{BackendCommand, EntityKind, MutationKind, RequestId};
use crate::config::Settings;
use crate::controller::{
    events::{err_label, UiEvent},
    forms::{FormScope, ModalId},
    notifications::{Notifications, Severity},
    orchestration::{visible_phase, Dispatcher, MutationPhase, ResourcePage, StudentPage},
    render::{
        ActionTrigger, DetailView, RowAction, TableBody, TableView, RESOURCE_COLUMNS,
        STUDENT_COLUMNS,
    },
};
use crate::ui::element_ids::{self, egui_id, form_field_id};

const IDLE_REPAINT: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tab {
    Resources,
    Students,
}

#[derive(Debug, Clone)]
struct StatusBanner {
    message: String,
}

/// What the user did with a modal this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DialogOutcome {
    Submit,
    Cancel,
}

pub struct CrudDesktopApp {
    dispatcher: Dispatcher,
    ui_rx: Receiver<UiEvent>,
    notices: Notifications,
    resources: ResourcePage,
    students: StudentPage,
    last_resource_flow: Option<RequestId>,
    last_student_flow: Option<RequestId>,
    tab: Tab,
    status: String,
    status_banner: Option<StatusBanner>,
}

fn phase_label(phase: MutationPhase) -> &'static str {
    match phase {
        MutationPhase::Idle => "Idle",
        MutationPhase::Confirming => "Waiting for confirmation",
        MutationPhase::InFlight(MutationKind::Create) => "Creating...",
        MutationPhase::InFlight(MutationKind::Update) => "Saving...",
        MutationPhase::InFlight(MutationKind::Delete) => "Deleting...",
        MutationPhase::Refreshing => "Refreshing...",
        MutationPhase::ShowingError => "Last change failed",
    }
}

fn submitted_with_enter(ui: &egui::Ui, response: &egui::Response) -> bool {
    response.lost_focus() && ui.input(|input| input.key_pressed(egui::Key::Enter))
}

fn show_table_placeholder<R>(ui: &mut egui::Ui, table: &TableView<R>) -> bool {
    match table {
        TableView::Loading => {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label("Loading...");
            });
            true
        }
        TableView::Ready(TableBody::Empty(empty)) => {
            ui.add_space(8.0);
            ui.vertical_centered(|ui| {
                ui.weak(empty.message);
            });
            true
        }
        TableView::Ready(TableBody::Rows(_)) => false,
    }
}

fn header_row(ui: &mut egui::Ui, columns: &[&str]) {
    for column in columns {
        ui.strong(*column);
    }
    ui.end_row();
}

fn action_buttons<Id: Copy>(
    ui: &mut egui::Ui,
    actions: &[ActionTrigger<Id>],
    clicked: &mut Option<ActionTrigger<Id>>,
) {
    ui.horizontal(|ui| {
        for trigger in actions {
            if ui.small_button(trigger.label).clicked() {
                *clicked = Some(*trigger);
            }
        }
    });
}

/// Centered yes/no dialog; returns the answer once one is given.
fn confirm_dialog(ctx: &egui::Context, entity: EntityKind, question: &str) -> Option<bool> {
    let mut answer = None;
    egui::Window::new("Confirm")
        .id(element_ids::confirm_dialog_id(entity))
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
        .show(ctx, |ui| {
            ui.label(question);
            ui.add_space(8.0);
            ui.horizontal(|ui| {
                if ui.button("OK").clicked() {
                    answer = Some(true);
                }
                if ui.button("Cancel").clicked() {
                    answer = Some(false);
                }
            });
        });
    answer
}

fn show_detail(ui: &mut egui::Ui, detail: &DetailView) {
    ui.push_id(element_ids::STUDENT_DETAIL, |ui| {
        ui.group(|ui| {
            ui.heading(detail.heading.as_str());
            for line in &detail.lines {
                ui.label(line.as_str());
            }
        });
    });
}

impl CrudDesktopApp {
    pub fn new(
        cmd_tx: Sender<BackendCommand>,
        ui_rx: Receiver<UiEvent>,
        settings: &Settings,
    ) -> Self {
        let mut app = Self {
            dispatcher: Dispatcher::new(cmd_tx),
            ui_rx,
            notices: Notifications::new(settings.notification_ttl()),
            resources: ResourcePage::new(settings.timestamp_zone),
            students: StudentPage::new(),
            last_resource_flow: None,
            last_student_flow: None,
            tab: Tab::Resources,
            status: "Starting backend worker...".to_string(),
            status_banner: None,
        };
        app.resources.load(&mut app.dispatcher, &mut app.notices);
        app.students.load(&mut app.dispatcher, &mut app.notices);
        app
    }

    fn process_ui_events(&mut self, now: Instant) {
        while let Ok(event) = self.ui_rx.try_recv() {
            match event {
                UiEvent::Info(message) => {
                    self.status = message;
                }
                UiEvent::BackendUnavailable(error) => {
                    tracing::error!(
                        category = err_label(error.category()),
                        context = ?error.context(),
                        "{}",
                        error.message()
                    );
                    self.status_banner = Some(StatusBanner {
                        message: error.message().to_string(),
                    });
                }
                event => match event.entity() {
                    Some(EntityKind::Resource) => {
                        self.resources
                            .apply_event(event, &mut self.dispatcher, &mut self.notices, now)
                    }
                    Some(EntityKind::Student) => {
                        self.students
                            .apply_event(event, &mut self.dispatcher, &mut self.notices)
                    }
                    None => {}
                },
            }
        }
    }

    /// Moves flows whose error notification is gone back to idle.
    fn release_flows(&mut self, flows: impl IntoIterator<Item = RequestId>) {
        for flow in flows {
            self.resources.mutations.finish(flow);
            self.students.mutations.finish(flow);
        }
    }

    fn show_status_banner(&mut self, ui: &mut egui::Ui) {
        if let Some(banner) = self.status_banner.clone() {
            egui::Frame::NONE
                .fill(egui::Color32::from_rgb(111, 53, 53))
                .stroke(egui::Stroke::new(1.0, egui::Color32::from_rgb(175, 96, 96)))
                .corner_radius(8.0)
                .inner_margin(egui::Margin::symmetric(10, 8))
                .show(ui, |ui| {
                    ui.horizontal_wrapped(|ui| {
                        ui.label(egui::RichText::new(&banner.message).color(egui::Color32::WHITE));
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            if ui.button("Dismiss").clicked() {
                                self.status_banner = None;
                            }
                        });
                    });
                });
        }
    }

    fn show_top_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("app_top_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.selectable_value(&mut self.tab, Tab::Resources, "Resources");
                ui.selectable_value(&mut self.tab, Tab::Students, "Students");
            });
            self.show_status_banner(ui);
        });
    }

    fn show_status_line(&mut self, ctx: &egui::Context) {
        let (phase, in_flight) = match self.tab {
            Tab::Resources => (
                visible_phase(
                    &self.resources.mutations,
                    self.last_resource_flow,
                    self.resources.confirming(),
                ),
                self.resources.mutations.in_flight(),
            ),
            Tab::Students => (
                visible_phase(
                    &self.students.mutations,
                    self.last_student_flow,
                    self.students.confirming(),
                ),
                self.students.mutations.in_flight(),
            ),
        };
        egui::TopBottomPanel::bottom("app_status_line").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.weak(self.status.as_str());
                ui.separator();
                ui.label(phase_label(phase));
                if in_flight > 1 {
                    ui.weak(format!("({in_flight} requests pending)"));
                }
            });
        });
    }

    fn show_resources_tab(&mut self, ui: &mut egui::Ui, now: Instant) {
        ui.heading("Resources");
        ui.horizontal(|ui| {
            let response = ui.add(
                egui::TextEdit::singleline(&mut self.resources.name_input)
                    .id(egui_id(element_ids::RESOURCE_NAME))
                    .hint_text("Resource name"),
            );
            let enter = submitted_with_enter(ui, &response);
            if ui.button("Add").clicked() || enter {
                if let Some(flow) =
                    self.resources
                        .submit_create(&mut self.dispatcher, &mut self.notices, now)
                {
                    self.last_resource_flow = Some(flow);
                }
            }
        });
        ui.separator();

        if show_table_placeholder(ui, &self.resources.table) {
            return;
        }

        let mut clicked: Option<ActionTrigger<ResourceId>> = None;
        egui::ScrollArea::vertical().show(ui, |ui| {
            egui::Grid::new(egui_id(element_ids::RESOURCE_TABLE_BODY))
                .striped(true)
                .num_columns(RESOURCE_COLUMNS.len())
                .show(ui, |ui| {
                    header_row(ui, &RESOURCE_COLUMNS);
                    for row in self.resources.table.rows() {
                        ui.label(row.id_text.as_str());
                        ui.label(row.name.as_str());
                        ui.label(row.created_at.as_str());
                        ui.label(row.updated_at.as_str());
                        action_buttons(ui, &row.actions, &mut clicked);
                        ui.end_row();
                    }
                });
        });

        if let Some(trigger) = clicked {
            match trigger.action {
                RowAction::Edit => self.resources.begin_rename(trigger.target),
                RowAction::Delete => self.resources.request_delete(trigger.target),
                RowAction::ShowDetail => {}
            }
        }
    }

    fn show_students_tab(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.heading("Students");
            if ui.button("Add student").clicked() {
                self.students.open_add_modal();
            }
        });
        ui.separator();

        if let Some(detail) = &self.students.detail {
            show_detail(ui, detail);
            ui.add_space(8.0);
        }

        if show_table_placeholder(ui, &self.students.table) {
            return;
        }

        let mut clicked: Option<ActionTrigger<StudentId>> = None;
        egui::ScrollArea::vertical().show(ui, |ui| {
            egui::Grid::new(egui_id(element_ids::STUDENT_TABLE_BODY))
                .striped(true)
                .num_columns(STUDENT_COLUMNS.len())
                .show(ui, |ui| {
                    header_row(ui, &STUDENT_COLUMNS);
                    for row in self.students.table.rows() {
                        ui.label(row.id_text.as_str());
                        if ui.link(row.name.as_str()).clicked() {
                            clicked = Some(row.select);
                        }
                        ui.label(row.age.as_str());
                        ui.label(row.score.as_str());
                        action_buttons(ui, &row.actions, &mut clicked);
                        ui.end_row();
                    }
                });
        });

        let Some(trigger) = clicked else {
            return;
        };
        match trigger.action {
            RowAction::ShowDetail => {
                self.students
                    .show_detail(trigger.target, &mut self.dispatcher, &mut self.notices)
            }
            RowAction::Edit => {
                self.students
                    .begin_edit(trigger.target, &mut self.dispatcher, &mut self.notices)
            }
            RowAction::Delete => {
                let name = self
                    .students
                    .table
                    .rows()
                    .iter()
                    .find(|row| row.id == trigger.target)
                    .map(|row| row.name.clone())
                    .unwrap_or_default();
                self.students.request_delete(trigger.target, &name);
            }
        }
    }

    fn show_rename_prompt(&mut self, ctx: &egui::Context) {
        let Some(prompt) = self.resources.rename.as_mut() else {
            return;
        };
        let mut outcome = None;
        egui::Window::new("Rename resource")
            .id(egui_id(element_ids::RESOURCE_RENAME))
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
            .show(ctx, |ui| {
                ui.label(format!("New name for resource #{}:", prompt.id));
                let response = ui.text_edit_singleline(&mut prompt.value);
                if submitted_with_enter(ui, &response) {
                    outcome = Some(DialogOutcome::Submit);
                }
                ui.horizontal(|ui| {
                    if ui.button("OK").clicked() {
                        outcome = Some(DialogOutcome::Submit);
                    }
                    if ui.button("Cancel").clicked() {
                        outcome = Some(DialogOutcome::Cancel);
                    }
                });
            });

        match outcome {
            Some(DialogOutcome::Submit) => {
                if let Some(flow) = self
                    .resources
                    .submit_rename(&mut self.dispatcher, &mut self.notices)
                {
                    self.last_resource_flow = Some(flow);
                }
            }
            Some(DialogOutcome::Cancel) => self.resources.cancel_rename(),
            None => {}
        }
    }

    fn show_student_modals(&mut self, ctx: &egui::Context) {
        let open: Vec<ModalId> = self.students.modals.open_modals().collect();
        for modal in open {
            let scope = modal.scope();
            let editing = self.students.editing;
            let mut outcome = None;
            egui::Window::new(modal.title())
                .id(egui_id(element_ids::modal_id(modal)))
                .collapsible(false)
                .resizable(false)
                .show(ctx, |ui| {
                    if let (FormScope::Edit, Some(id)) = (scope, editing) {
                        ui.push_id(element_ids::EDIT_STUDENT_ID, |ui| {
                            ui.weak(format!("Student #{id}"));
                        });
                    }
                    egui::Grid::new(egui_id(element_ids::modal_id(modal)).with("fields"))
                        .num_columns(2)
                        .show(ui, |ui| {
                            for field in self.students.modals.fields() {
                                ui.label(field.label);
                                if let Some(buffer) =
                                    self.students.modals.field_mut(scope, field.name)
                                {
                                    ui.add(
                                        egui::TextEdit::singleline(buffer)
                                            .id(egui_id(&form_field_id(scope, field))),
                                    );
                                }
                                ui.end_row();
                            }
                        });
                    ui.add_space(8.0);
                    ui.horizontal(|ui| {
                        if ui.button("Save").clicked() {
                            outcome = Some(DialogOutcome::Submit);
                        }
                        if ui.button("Cancel").clicked() {
                            outcome = Some(DialogOutcome::Cancel);
                        }
                    });
                });

            let flow = match (outcome, modal) {
                (Some(DialogOutcome::Submit), ModalId::AddStudent) => self
                    .students
                    .submit_add(&mut self.dispatcher, &mut self.notices),
                (Some(DialogOutcome::Submit), ModalId::EditStudent) => self
                    .students
                    .submit_edit(&mut self.dispatcher, &mut self.notices),
                (Some(DialogOutcome::Cancel), _) => {
                    self.students.close_modal(modal);
                    None
                }
                (None, _) => None,
            };
            if flow.is_some() {
                self.last_student_flow = flow;
            }
        }
    }

    fn show_confirmations(&mut self, ctx: &egui::Context) {
        if let Some(pending) = &self.resources.confirm {
            if let Some(confirmed) = confirm_dialog(ctx, EntityKind::Resource, &pending.question) {
                if let Some(flow) =
                    self.resources
                        .resolve_delete(confirmed, &mut self.dispatcher, &mut self.notices)
                {
                    self.last_resource_flow = Some(flow);
                }
            }
        }
        if let Some(pending) = &self.students.confirm {
            if let Some(confirmed) = confirm_dialog(ctx, EntityKind::Student, &pending.question) {
                if let Some(flow) =
                    self.students
                        .resolve_delete(confirmed, &mut self.dispatcher, &mut self.notices)
                {
                    self.last_student_flow = Some(flow);
                }
            }
        }
    }

    fn show_alert(&mut self, ctx: &egui::Context) {
        let Some(alert) = self.notices.current_alert().cloned() else {
            return;
        };
        let mut acknowledged = false;
        egui::Window::new(alert.title)
            .id(egui_id(element_ids::ALERT_DIALOG))
            .collapsible(false)
            .resizable(false)
            .order(egui::Order::Foreground)
            .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
            .show(ctx, |ui| {
                let text = egui::RichText::new(&alert.message);
                ui.label(match alert.severity {
                    Severity::Error => text.color(egui::Color32::from_rgb(220, 110, 110)),
                    Severity::Info => text,
                });
                ui.add_space(8.0);
                if ui.button("OK").clicked() {
                    acknowledged = true;
                }
            });
        if acknowledged {
            let released = self.notices.acknowledge_alert();
            self.release_flows(released);
        }
    }

    fn show_toasts(&mut self, ctx: &egui::Context) {
        if self.notices.toasts().is_empty() {
            return;
        }
        egui::Area::new(egui_id(element_ids::ERROR_MOUNT))
            .order(egui::Order::Foreground)
            .anchor(egui::Align2::RIGHT_BOTTOM, egui::vec2(-12.0, -36.0))
            .show(ctx, |ui| {
                for toast in self.notices.toasts() {
                    let fill = match toast.severity {
                        Severity::Error => egui::Color32::from_rgb(111, 53, 53),
                        Severity::Info => egui::Color32::from_rgb(46, 70, 104),
                    };
                    egui::Frame::NONE
                        .fill(fill)
                        .corner_radius(6.0)
                        .inner_margin(egui::Margin::symmetric(10, 6))
                        .show(ui, |ui| {
                            ui.label(
                                egui::RichText::new(&toast.message).color(egui::Color32::WHITE),
                            );
                        });
                    ui.add_space(4.0);
                }
            });
    }

    /// Modal dialogs block the page underneath them.
    fn blocking_dialog_open(&self) -> bool {
        self.notices.current_alert().is_some()
            || self.resources.rename.is_some()
            || self.resources.confirming()
            || self.students.confirming()
            || self.students.modals.is_open(ModalId::AddStudent)
            || self.students.modals.is_open(ModalId::EditStudent)
    }
}

impl eframe::App for CrudDesktopApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();
        self.process_ui_events(now);
        let expired = self.notices.expire(now);
        self.release_flows(expired);

        self.show_top_bar(ctx);
        self.show_status_line(ctx);
        let page_enabled = !self.blocking_dialog_open();
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.add_enabled_ui(page_enabled, |ui| match self.tab {
                Tab::Resources => self.show_resources_tab(ui, now),
                Tab::Students => self.show_students_tab(ui),
            });
        });

        self.show_rename_prompt(ctx);
        self.show_student_modals(ctx);
        self.show_confirmations(ctx);
        self.show_alert(ctx);
        self.show_toasts(ctx);

        let repaint = self
            .notices
            .next_expiry(now)
            .map_or(IDLE_REPAINT, |expiry| expiry.min(IDLE_REPAINT));
        ctx.request_repaint_after(repaint);
    }
}

#[cfg(test)]
mod tests {
    use crossbeam_channel::bounded;

    use super::*;

    #[test]
    fn startup_lists_both_collections() {
        let (cmd_tx, cmd_rx) = bounded(8);
        let (_ui_tx, ui_rx) = bounded(8);

        let _app = CrudDesktopApp::new(cmd_tx, ui_rx, &Settings::default());

        let queued: Vec<_> = cmd_rx.try_iter().map(|cmd| cmd.name()).collect();
        assert_eq!(queued, ["list_resources", "list_students"]);
    }

    #[test]
    fn events_are_routed_to_their_page() {
        let (cmd_tx, _cmd_rx) = bounded(8);
        let (ui_tx, ui_rx) = bounded(8);
        let mut app = CrudDesktopApp::new(cmd_tx, ui_rx, &Settings::default());

        ui_tx
            .send(UiEvent::StudentsLoaded {
                flow: None,
                students: Vec::new(),
            })
            .expect("send");
        ui_tx
            .send(UiEvent::Info("Backend worker ready".to_string()))
            .expect("send");
        app.process_ui_events(Instant::now());

        assert!(matches!(
            app.students.table,
            TableView::Ready(TableBody::Empty(_))
        ));
        assert_eq!(app.resources.table, TableView::Loading);
        assert_eq!(app.status, "Backend worker ready");
    }

    #[test]
    fn phase_labels_cover_in_flight_kinds() {
        assert_eq!(phase_label(MutationPhase::Idle), "Idle");
        assert_eq!(
            phase_label(MutationPhase::InFlight(MutationKind::Delete)),
            "Deleting..."
        );
    }
}
