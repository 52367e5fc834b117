use std::{sync::Mutex, time::Duration};

use async_trait::async_trait;
use crossbeam_channel::bounded;
use shared::{
    domain::{ResourceDraft, ResourceId, StudentDraft, StudentId},
    error::{CrudOperation, RequestErrorKind},
};

use super::*;
use crate::backend_bridge::commands::StudentFetchPurpose;
use crate::controller::events::UiErrorCategory;

#[derive(Default)]
struct FakeResources {
    records: Mutex<Vec<Resource>>,
    fail: Option<RequestErrorKind>,
}

impl FakeResources {
    fn check(&self, operation: CrudOperation, id: Option<i64>) -> Result<(), RequestError> {
        match &self.fail {
            Some(kind) => Err(RequestError::new("resources", operation, id, kind.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl CrudClient<Resource> for FakeResources {
    async fn list(&self) -> Result<Vec<Resource>, RequestError> {
        self.check(CrudOperation::List, None)?;
        Ok(self.records.lock().expect("records").clone())
    }

    async fn get(&self, id: ResourceId) -> Result<Resource, RequestError> {
        self.check(CrudOperation::Get, Some(id.0))?;
        self.records
            .lock()
            .expect("records")
            .iter()
            .find(|record| record.id == id)
            .cloned()
            .ok_or_else(|| {
                RequestError::new(
                    "resources",
                    CrudOperation::Get,
                    Some(id.0),
                    RequestErrorKind::NotFound,
                )
            })
    }

    async fn create(&self, draft: &ResourceDraft) -> Result<Option<Resource>, RequestError> {
        self.check(CrudOperation::Create, None)?;
        let mut records = self.records.lock().expect("records");
        let record = Resource {
            id: ResourceId(records.len() as i64 + 1),
            name: Some(draft.name.clone()),
            created_at: "2024-01-01T00:00:00Z".to_string(),
            updated_at: "2024-01-01T00:00:00Z".to_string(),
        };
        records.push(record.clone());
        Ok(Some(record))
    }

    async fn update(
        &self,
        id: ResourceId,
        draft: &ResourceDraft,
    ) -> Result<Option<Resource>, RequestError> {
        self.check(CrudOperation::Update, Some(id.0))?;
        let mut records = self.records.lock().expect("records");
        let record = records.iter_mut().find(|record| record.id == id);
        Ok(record.map(|record| {
            record.name = Some(draft.name.clone());
            record.clone()
        }))
    }

    async fn delete(&self, id: ResourceId) -> Result<(), RequestError> {
        self.check(CrudOperation::Delete, Some(id.0))?;
        self.records
            .lock()
            .expect("records")
            .retain(|record| record.id != id);
        Ok(())
    }
}

#[derive(Default)]
struct FakeStudents {
    records: Vec<Student>,
    created: Mutex<Vec<StudentDraft>>,
}

#[async_trait]
impl CrudClient<Student> for FakeStudents {
    async fn list(&self) -> Result<Vec<Student>, RequestError> {
        Ok(self.records.clone())
    }

    async fn get(&self, id: StudentId) -> Result<Student, RequestError> {
        self.records
            .iter()
            .find(|student| student.id == id)
            .cloned()
            .ok_or_else(|| {
                RequestError::new(
                    "students",
                    CrudOperation::Get,
                    Some(id.0),
                    RequestErrorKind::Status {
                        code: 404,
                        message: None,
                    },
                )
            })
    }

    async fn create(&self, draft: &StudentDraft) -> Result<Option<Student>, RequestError> {
        self.created.lock().expect("created").push(draft.clone());
        Ok(None)
    }

    async fn update(
        &self,
        _id: StudentId,
        _draft: &StudentDraft,
    ) -> Result<Option<Student>, RequestError> {
        Ok(None)
    }

    async fn delete(&self, _id: StudentId) -> Result<(), RequestError> {
        Ok(())
    }
}

fn clients(resources: FakeResources, students: FakeStudents) -> BackendClients {
    BackendClients {
        resources: Arc::new(resources),
        students: Arc::new(students),
    }
}

fn student(id: i64, name: &str) -> Student {
    Student {
        id: StudentId(id),
        name: name.to_string(),
        age: 5,
        score: 80,
    }
}

#[tokio::test]
async fn list_result_carries_refresh_flow() {
    let clients = clients(FakeResources::default(), FakeStudents::default());

    let event = execute(
        &clients,
        BackendCommand::ListResources {
            request_id: RequestId(9),
            flow: Some(RequestId(4)),
        },
    )
    .await;

    assert_eq!(
        event,
        UiEvent::ResourcesLoaded {
            flow: Some(RequestId(4)),
            resources: Vec::new(),
        }
    );
}

#[tokio::test]
async fn successful_mutation_reports_its_own_flow() {
    let clients = clients(FakeResources::default(), FakeStudents::default());

    let event = execute(
        &clients,
        BackendCommand::CreateResource {
            request_id: RequestId(3),
            draft: ResourceDraft::new("printer"),
        },
    )
    .await;

    assert_eq!(
        event,
        UiEvent::MutationApplied {
            flow: RequestId(3),
            entity: EntityKind::Resource,
            kind: MutationKind::Create,
        }
    );
    assert_eq!(clients.resources.list().await.expect("list").len(), 1);
}

#[tokio::test]
async fn failed_mutation_maps_request_error_into_ui_error() {
    let clients = clients(
        FakeResources {
            fail: Some(RequestErrorKind::Status {
                code: 500,
                message: Some("delete failed".to_string()),
            }),
            ..FakeResources::default()
        },
        FakeStudents::default(),
    );

    let event = execute(
        &clients,
        BackendCommand::DeleteResource {
            request_id: RequestId(7),
            id: ResourceId(2),
        },
    )
    .await;

    let UiEvent::Failed {
        flow,
        entity,
        error,
    } = event
    else {
        panic!("expected failure");
    };
    assert_eq!(flow, Some(RequestId(7)));
    assert_eq!(entity, EntityKind::Resource);
    assert_eq!(error.category(), UiErrorCategory::Server);
    assert_eq!(error.message(), "Failed to delete resource #2: delete failed");
}

#[tokio::test]
async fn fetch_failure_does_not_belong_to_a_flow() {
    let clients = clients(FakeResources::default(), FakeStudents::default());

    let event = execute(
        &clients,
        BackendCommand::FetchStudent {
            request_id: RequestId(1),
            id: StudentId(8),
            purpose: StudentFetchPurpose::ShowDetail,
        },
    )
    .await;

    assert!(matches!(
        event,
        UiEvent::Failed {
            flow: None,
            entity: EntityKind::Student,
            ..
        }
    ));
}

#[tokio::test]
async fn fetch_keeps_purpose_for_the_page() {
    let clients = clients(
        FakeResources::default(),
        FakeStudents {
            records: vec![student(4, "Cheolsu")],
            ..FakeStudents::default()
        },
    );

    let event = execute(
        &clients,
        BackendCommand::FetchStudent {
            request_id: RequestId(1),
            id: StudentId(4),
            purpose: StudentFetchPurpose::Edit,
        },
    )
    .await;

    assert_eq!(
        event,
        UiEvent::StudentFetched {
            purpose: StudentFetchPurpose::Edit,
            student: student(4, "Cheolsu"),
        }
    );
}

#[test]
fn worker_runs_queued_commands_and_exits_when_queue_closes() {
    let students = FakeStudents {
        records: vec![student(0, "Jjanggu")],
        ..FakeStudents::default()
    };
    let (cmd_tx, cmd_rx) = bounded(8);
    let (ui_tx, ui_rx) = bounded(8);
    let handle = launch(cmd_rx, ui_tx, clients(FakeResources::default(), students));

    cmd_tx
        .send(BackendCommand::ListStudents {
            request_id: RequestId(1),
            flow: None,
        })
        .expect("queue command");

    let ready = ui_rx
        .recv_timeout(Duration::from_secs(5))
        .expect("ready event");
    assert_eq!(ready, UiEvent::Info("Backend worker ready".to_string()));
    let loaded = ui_rx
        .recv_timeout(Duration::from_secs(5))
        .expect("list event");
    assert_eq!(
        loaded,
        UiEvent::StudentsLoaded {
            flow: None,
            students: vec![student(0, "Jjanggu")],
        }
    );

    drop(cmd_tx);
    handle.join().expect("worker thread");
}

#[test]
fn completions_wait_for_a_full_ui_queue() {
    let students = FakeStudents {
        records: vec![student(2, "Cheolsu")],
        ..FakeStudents::default()
    };
    let (cmd_tx, cmd_rx) = bounded(8);
    let (ui_tx, ui_rx) = bounded(1);
    let handle = launch(cmd_rx, ui_tx, clients(FakeResources::default(), students));

    for id in [1, 2] {
        cmd_tx
            .send(BackendCommand::ListStudents {
                request_id: RequestId(id),
                flow: Some(RequestId(id)),
            })
            .expect("queue command");
    }
    std::thread::sleep(Duration::from_millis(200));

    let ready = ui_rx
        .recv_timeout(Duration::from_secs(5))
        .expect("ready event");
    assert_eq!(ready, UiEvent::Info("Backend worker ready".to_string()));
    let mut flows = Vec::new();
    for _ in 0..2 {
        match ui_rx.recv_timeout(Duration::from_secs(5)).expect("list event") {
            UiEvent::StudentsLoaded { flow, students } => {
                assert_eq!(students, vec![student(2, "Cheolsu")]);
                flows.push(flow);
            }
            other => panic!("unexpected event {other:?}"),
        }
    }
    flows.sort();
    assert_eq!(flows, vec![Some(RequestId(1)), Some(RequestId(2))]);

    drop(cmd_tx);
    handle.join().expect("worker thread");
}

#[test]
fn clients_reject_invalid_configured_urls() {
    let settings = Settings {
        student_api_url: "::not-a-url".to_string(),
        ..Settings::default()
    };

    let err = BackendClients::from_settings(&settings)
        .err()
        .expect("invalid url");

    assert!(err.to_string().contains("invalid student api url"));
}

#[tokio::test]
async fn student_create_without_echo_still_applies() {
    let students = Arc::new(FakeStudents::default());
    let clients = BackendClients {
        resources: Arc::new(FakeResources::default()),
        students: students.clone(),
    };
    let draft = StudentDraft {
        name: "Yuri".to_string(),
        age: None,
        score: Some(70),
    };

    let event = execute(
        &clients,
        BackendCommand::CreateStudent {
            request_id: RequestId(2),
            draft: draft.clone(),
        },
    )
    .await;

    assert_eq!(
        event,
        UiEvent::MutationApplied {
            flow: RequestId(2),
            entity: EntityKind::Student,
            kind: MutationKind::Create,
        }
    );
    assert_eq!(*students.created.lock().expect("created"), vec![draft]);
}
