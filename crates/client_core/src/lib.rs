use std::marker::PhantomData;

use async_trait::async_trait;
use reqwest::{header, Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use shared::{
    error::{CrudOperation, RequestError, RequestErrorKind},
    protocol::{ApiEnvelope, Envelope, ErrorBody},
};
use tracing::{debug, warn};
use url::Url;

pub mod entity;

pub use entity::{CollectionRoutes, CrudEntity};
pub use shared::error;

/// CRUD operations against one backend collection.
///
/// Each call issues exactly one HTTP request and never retries. Nothing is
/// cached between calls.
#[async_trait]
pub trait CrudClient<E: CrudEntity>: Send + Sync {
    async fn list(&self) -> Result<Vec<E>, RequestError>;
    async fn get(&self, id: E::Id) -> Result<E, RequestError>;
    /// Returns the created record when the backend echoes one back.
    async fn create(&self, draft: &E::Draft) -> Result<Option<E>, RequestError>;
    /// Full replace: fields missing from `draft` are not preserved.
    async fn update(&self, id: E::Id, draft: &E::Draft) -> Result<Option<E>, RequestError>;
    async fn delete(&self, id: E::Id) -> Result<(), RequestError>;
}

pub struct HttpCrudClient<E> {
    http: Client,
    base_url: String,
    _entity: PhantomData<fn() -> E>,
}

impl<E: CrudEntity> HttpCrudClient<E> {
    pub fn new(base_url: &str) -> Result<Self, url::ParseError> {
        Self::with_http(Client::new(), base_url)
    }

    pub fn with_http(http: Client, base_url: &str) -> Result<Self, url::ParseError> {
        let parsed = Url::parse(base_url.trim())?;
        Ok(Self {
            http,
            base_url: parsed.as_str().trim_end_matches('/').to_string(),
            _entity: PhantomData,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn list_url(&self) -> String {
        format!("{}/{}", self.base_url, E::ROUTES.list_path)
    }

    fn create_url(&self) -> String {
        format!("{}/{}", self.base_url, E::ROUTES.create_path)
    }

    fn item_url(&self, id: E::Id) -> String {
        format!("{}/{}/{}", self.base_url, E::ROUTES.item_path, id)
    }

    fn fail(operation: CrudOperation, id: Option<i64>, kind: RequestErrorKind) -> RequestError {
        let err = RequestError::new(E::ROUTES.collection, operation, id, kind);
        warn!(
            collection = E::ROUTES.collection,
            operation = operation.as_str(),
            "request failed: {err}"
        );
        err
    }

    async fn send(
        &self,
        operation: CrudOperation,
        id: Option<i64>,
        request: RequestBuilder,
    ) -> Result<Response, RequestError> {
        debug!(
            collection = E::ROUTES.collection,
            operation = operation.as_str(),
            id,
            "sending request"
        );
        let response = request
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|err| Self::fail(operation, id, RequestErrorKind::Transport(err.to_string())))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        // Envelope-style backends explain failures in the body; bare ones may
        // send anything, so the message is best effort.
        let message = response
            .text()
            .await
            .ok()
            .and_then(|body| serde_json::from_str::<ErrorBody>(&body).ok())
            .and_then(|body| body.message)
            .filter(|message| !message.trim().is_empty());
        Err(Self::fail(
            operation,
            id,
            RequestErrorKind::Status {
                code: status.as_u16(),
                message,
            },
        ))
    }

    async fn decode<T: DeserializeOwned>(
        operation: CrudOperation,
        id: Option<i64>,
        response: Response,
    ) -> Result<T, RequestError> {
        let body = response
            .bytes()
            .await
            .map_err(|err| Self::fail(operation, id, RequestErrorKind::Transport(err.to_string())))?;
        serde_json::from_slice(&body)
            .map_err(|err| Self::fail(operation, id, RequestErrorKind::Decode(err.to_string())))
    }

    /// Reads the entity a mutation echoes back, if the collection does that.
    async fn decode_echo(
        operation: CrudOperation,
        id: Option<i64>,
        response: Response,
    ) -> Result<Option<E>, RequestError> {
        match E::ENVELOPE {
            Envelope::Wrapped => {
                let envelope: ApiEnvelope<E> = Self::decode(operation, id, response).await?;
                Ok(envelope.into_data())
            }
            Envelope::Bare => Ok(None),
        }
    }
}

#[async_trait]
impl<E: CrudEntity> CrudClient<E> for HttpCrudClient<E> {
    async fn list(&self) -> Result<Vec<E>, RequestError> {
        let operation = CrudOperation::List;
        let response = self
            .send(operation, None, self.http.get(self.list_url()))
            .await?;
        let entities = match E::ENVELOPE {
            Envelope::Wrapped => {
                let envelope: ApiEnvelope<Vec<E>> = Self::decode(operation, None, response).await?;
                envelope.into_data().unwrap_or_default()
            }
            Envelope::Bare => Self::decode(operation, None, response).await?,
        };
        debug!(
            collection = E::ROUTES.collection,
            count = entities.len(),
            "list loaded"
        );
        Ok(entities)
    }

    async fn get(&self, id: E::Id) -> Result<E, RequestError> {
        let operation = CrudOperation::Get;
        let raw_id = Some(id.into());
        let response = self
            .send(operation, raw_id, self.http.get(self.item_url(id)))
            .await?;
        match E::ENVELOPE {
            Envelope::Wrapped => {
                let envelope: ApiEnvelope<E> = Self::decode(operation, raw_id, response).await?;
                envelope
                    .into_data()
                    .ok_or_else(|| Self::fail(operation, raw_id, RequestErrorKind::NotFound))
            }
            Envelope::Bare => Self::decode(operation, raw_id, response).await,
        }
    }

    async fn create(&self, draft: &E::Draft) -> Result<Option<E>, RequestError> {
        let operation = CrudOperation::Create;
        let response = self
            .send(operation, None, self.http.post(self.create_url()).json(draft))
            .await?;
        Self::decode_echo(operation, None, response).await
    }

    async fn update(&self, id: E::Id, draft: &E::Draft) -> Result<Option<E>, RequestError> {
        let operation = CrudOperation::Update;
        let raw_id = Some(id.into());
        let response = self
            .send(operation, raw_id, self.http.put(self.item_url(id)).json(draft))
            .await?;
        Self::decode_echo(operation, raw_id, response).await
    }

    async fn delete(&self, id: E::Id) -> Result<(), RequestError> {
        let operation = CrudOperation::Delete;
        let raw_id = Some(id.into());
        self.send(operation, raw_id, self.http.delete(self.item_url(id)))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
