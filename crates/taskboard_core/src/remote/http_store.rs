//! REST implementation of [`TaskStore`].
//!
//! # Responsibility
//! - Map store calls onto the task REST endpoints.
//! - Attach the bearer credential to every request.
//! - Classify transport and status failures into [`RemoteError`].
//!
//! # Invariants
//! - Any 2xx status is success; response bodies of update/delete/logout
//!   are ignored.
//! - 401 and 403 map to `RemoteError::Auth`.

use crate::config::BoardConfig;
use crate::model::task::{NewTask, Task, TaskId, TaskPatch};
use crate::remote::task_store::{RemoteError, RemoteResult, TaskStore};
use crate::session::Credential;
use async_trait::async_trait;
use reqwest::header::CACHE_CONTROL;
use reqwest::{Client, RequestBuilder, Response, StatusCode};

/// Longest response body excerpt kept in rejection errors.
const MAX_ERROR_BODY_CHARS: usize = 200;

/// HTTP-backed task store.
#[derive(Debug, Clone)]
pub struct HttpTaskStore {
    client: Client,
    tasks_url: String,
    logout_url: String,
}

impl HttpTaskStore {
    /// Builds a store for the endpoints described by `config`.
    pub fn new(config: &BoardConfig) -> RemoteResult<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|err| RemoteError::Network(format!("cannot build http client: {err}")))?;

        Ok(Self::with_client(client, config))
    }

    /// Builds a store around an existing client.
    pub fn with_client(client: Client, config: &BoardConfig) -> Self {
        Self {
            client,
            tasks_url: config.tasks_url(),
            logout_url: config.logout_url(),
        }
    }

    fn task_url(&self, id: &TaskId) -> String {
        format!("{}/{}", self.tasks_url, urlencoding::encode(id))
    }

    async fn send(&self, request: RequestBuilder, credential: &Credential) -> RemoteResult<Response> {
        let response = request
            .bearer_auth(credential.token())
            .send()
            .await
            .map_err(|err| RemoteError::Network(err.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(classify_status(status, body))
    }
}

#[async_trait]
impl TaskStore for HttpTaskStore {
    async fn list_tasks(&self, credential: &Credential) -> RemoteResult<Vec<Task>> {
        let request = self
            .client
            .get(&self.tasks_url)
            .header(CACHE_CONTROL, "no-cache");
        let response = self.send(request, credential).await?;
        decode_json(response).await
    }

    async fn create_task(&self, credential: &Credential, task: &NewTask) -> RemoteResult<Task> {
        let request = self.client.post(&self.tasks_url).json(task);
        let response = self.send(request, credential).await?;
        decode_json(response).await
    }

    async fn update_task(
        &self,
        credential: &Credential,
        id: &TaskId,
        patch: &TaskPatch,
    ) -> RemoteResult<()> {
        let request = self.client.put(self.task_url(id)).json(patch);
        self.send(request, credential).await?;
        Ok(())
    }

    async fn delete_task(&self, credential: &Credential, id: &TaskId) -> RemoteResult<()> {
        let request = self.client.delete(self.task_url(id));
        self.send(request, credential).await?;
        Ok(())
    }

    async fn logout(&self, credential: &Credential) -> RemoteResult<()> {
        let request = self.client.get(&self.logout_url);
        self.send(request, credential).await?;
        Ok(())
    }
}

async fn decode_json<T: serde::de::DeserializeOwned>(response: Response) -> RemoteResult<T> {
    let bytes = response
        .bytes()
        .await
        .map_err(|err| RemoteError::Network(err.to_string()))?;
    serde_json::from_slice(&bytes).map_err(|err| RemoteError::InvalidData(err.to_string()))
}

fn classify_status(status: StatusCode, body: String) -> RemoteError {
    let body = truncate_body(body.trim());
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            RemoteError::Auth(format!("status {}", status.as_u16()))
        }
        _ => RemoteError::Rejected {
            status: status.as_u16(),
            body,
        },
    }
}

fn truncate_body(body: &str) -> String {
    let mut excerpt: String = body.chars().take(MAX_ERROR_BODY_CHARS).collect();
    if body.chars().count() > MAX_ERROR_BODY_CHARS {
        excerpt.push_str("...");
    }
    excerpt
}

#[cfg(test)]
mod tests {
    use super::{classify_status, HttpTaskStore};
    use crate::config::BoardConfig;
    use crate::remote::task_store::RemoteError;
    use reqwest::{Client, StatusCode};

    #[test]
    fn task_urls_percent_encode_the_id() {
        let store = HttpTaskStore::with_client(Client::new(), &BoardConfig::default());
        assert_eq!(
            store.task_url(&"65a1f0c2".to_string()),
            "http://localhost:3000/api/tasks/65a1f0c2"
        );
        assert_eq!(
            store.task_url(&"a b/c".to_string()),
            "http://localhost:3000/api/tasks/a%20b%2Fc"
        );
    }

    #[test]
    fn auth_statuses_are_classified_as_auth_failures() {
        assert!(matches!(
            classify_status(StatusCode::UNAUTHORIZED, String::new()),
            RemoteError::Auth(_)
        ));
        assert!(matches!(
            classify_status(StatusCode::FORBIDDEN, "nope".to_string()),
            RemoteError::Auth(_)
        ));
    }

    #[test]
    fn other_statuses_keep_a_bounded_body_excerpt() {
        let err = classify_status(StatusCode::INTERNAL_SERVER_ERROR, "x".repeat(500));
        match err {
            RemoteError::Rejected { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body.chars().count(), 203);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
