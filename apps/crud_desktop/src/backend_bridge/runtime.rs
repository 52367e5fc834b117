//! Runtime bridge between UI command queue and backend event intake.

use std::{sync::Arc, thread};

use anyhow::Context;
use client_core::{CrudClient, HttpCrudClient};
use crossbeam_channel::{Receiver, Sender};
use shared::{
    domain::{Resource, Student},
    error::RequestError,
};

use crate::backend_bridge::commands::{BackendCommand, EntityKind, MutationKind, RequestId};
use crate::config::Settings;
use crate::controller::events::{UiError, UiEvent};

/// One client per backend collection, shared by every in-flight task.
#[derive(Clone)]
pub struct BackendClients {
    pub resources: Arc<dyn CrudClient<Resource>>,
    pub students: Arc<dyn CrudClient<Student>>,
}

impl BackendClients {
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let resources = HttpCrudClient::<Resource>::new(&settings.resource_api_url)
            .with_context(|| format!("invalid resource api url '{}'", settings.resource_api_url))?;
        let students = HttpCrudClient::<Student>::new(&settings.student_api_url)
            .with_context(|| format!("invalid student api url '{}'", settings.student_api_url))?;
        Ok(Self {
            resources: Arc::new(resources),
            students: Arc::new(students),
        })
    }
}

pub fn launch(
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<UiEvent>,
    clients: BackendClients,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::BackendUnavailable(UiError::startup(format!(
                    "backend worker startup failure: failed to build runtime: {err}"
                ))));
                tracing::error!("failed to build backend runtime: {err}");
                return;
            }
        };
        let _ = ui_tx.try_send(UiEvent::Info("Backend worker ready".to_string()));

        while let Ok(cmd) = cmd_rx.recv() {
            let clients = clients.clone();
            let ui_tx = ui_tx.clone();
            runtime.spawn(async move {
                let request_id = cmd.request_id();
                let event = execute(&clients, cmd).await;
                // A dropped completion would leave its flow in flight, so wait
                // for the UI to drain rather than discard it.
                if tokio::task::block_in_place(|| ui_tx.send(event)).is_err() {
                    tracing::warn!(%request_id, "ui event queue closed; dropping completion");
                }
            });
        }

        tracing::info!("ui command queue closed; backend worker exiting");
    })
}

fn failed(entity: EntityKind, flow: Option<RequestId>, err: &RequestError) -> UiEvent {
    UiEvent::Failed {
        flow,
        entity,
        error: UiError::from_request(entity, err),
    }
}

fn mutation_result<T>(
    entity: EntityKind,
    flow: RequestId,
    kind: MutationKind,
    result: Result<T, RequestError>,
) -> UiEvent {
    match result {
        Ok(_) => UiEvent::MutationApplied { flow, entity, kind },
        Err(err) => failed(entity, Some(flow), &err),
    }
}

/// Runs one command to completion and reports its outcome.
pub async fn execute(clients: &BackendClients, cmd: BackendCommand) -> UiEvent {
    tracing::debug!(command = cmd.name(), request_id = %cmd.request_id(), "executing backend command");
    let entity = cmd.entity();
    match cmd {
        BackendCommand::ListResources { flow, .. } => match clients.resources.list().await {
            Ok(resources) => UiEvent::ResourcesLoaded { flow, resources },
            Err(err) => failed(entity, flow, &err),
        },
        BackendCommand::CreateResource { request_id, draft } => mutation_result(
            entity,
            request_id,
            MutationKind::Create,
            clients.resources.create(&draft).await,
        ),
        BackendCommand::UpdateResource {
            request_id,
            id,
            draft,
        } => mutation_result(
            entity,
            request_id,
            MutationKind::Update,
            clients.resources.update(id, &draft).await,
        ),
        BackendCommand::DeleteResource { request_id, id } => mutation_result(
            entity,
            request_id,
            MutationKind::Delete,
            clients.resources.delete(id).await,
        ),
        BackendCommand::ListStudents { flow, .. } => match clients.students.list().await {
            Ok(students) => UiEvent::StudentsLoaded { flow, students },
            Err(err) => failed(entity, flow, &err),
        },
        BackendCommand::FetchStudent { id, purpose, .. } => {
            match clients.students.get(id).await {
                Ok(student) => UiEvent::StudentFetched { purpose, student },
                Err(err) => failed(entity, None, &err),
            }
        }
        BackendCommand::CreateStudent { request_id, draft } => mutation_result(
            entity,
            request_id,
            MutationKind::Create,
            clients.students.create(&draft).await,
        ),
        BackendCommand::UpdateStudent {
            request_id,
            id,
            draft,
        } => mutation_result(
            entity,
            request_id,
            MutationKind::Update,
            clients.students.update(id, &draft).await,
        ),
        BackendCommand::DeleteStudent { request_id, id } => mutation_result(
            entity,
            request_id,
            MutationKind::Delete,
            clients.students.delete(id).await,
        ),
    }
}

#[cfg(test)]
#[path = "tests/runtime_tests.rs"]
mod tests;
