//! REST client for the remote store
//!
//! Speaks JSON over the host's [`HttpClient`]:
//!
//! | Operation | Request |
//! |-----------|---------|
//! | create    | `POST {base}/api/<collection>` |
//! | list      | `GET {base}/api/<collection>` |
//! | get       | `GET {base}/api/<collection>/{id}` |
//!
//! Collections: `documents`, `interviews`, `questions`, `question-banks`.
//! Non-2xx answers become [`StoreError::Status`] with the server's message.

use async_trait::async_trait;
use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use super::records::{
    NewDocument, NewInterview, NewQuestion, NewQuestionBank, RemoteDocument, RemoteInterview,
    RemoteQuestion, RemoteQuestionBank,
};
use super::RemoteStore;
use crate::error::{StoreError, StoreResult};

const DOCUMENTS_PATH: &str = "/api/documents";
const INTERVIEWS_PATH: &str = "/api/interviews";
const QUESTIONS_PATH: &str = "/api/questions";
const QUESTION_BANKS_PATH: &str = "/api/question-banks";

/// Error body shapes the store uses: `{"error": ".."}` or `{"message": ".."}`
#[derive(Deserialize)]
struct ErrorBody {
    #[serde(alias = "message")]
    error: String,
}

/// Remote store reached over HTTP
pub struct HttpRemoteStore {
    http_client: Arc<dyn HttpClient>,
    base_url: String,
    api_token: Option<String>,
    request_timeout: Option<Duration>,
}

impl HttpRemoteStore {
    /// Create a store client rooted at `base_url` (e.g. `https://study.example.com`)
    pub fn new(http_client: Arc<dyn HttpClient>, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_token: None,
            request_timeout: None,
        }
    }

    /// Send `Authorization: Bearer <token>` with every request
    pub fn with_api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: HttpMethod, path: &str) -> HttpRequest {
        let mut request = HttpRequest::new(method, format!("{}{}", self.base_url, path))
            .header("Accept", "application/json");

        if let Some(token) = &self.api_token {
            request = request.bearer_token(token);
        }
        if let Some(timeout) = self.request_timeout {
            request = request.timeout(timeout);
        }
        request
    }

    async fn send(&self, request: HttpRequest) -> StoreResult<HttpResponse> {
        let method = request.method;
        let url = request.url.clone();

        let response = self.http_client.execute(request).await?;

        if response.is_success() {
            debug!(method = method.as_str(), %url, status = response.status, "Remote store request succeeded");
            return Ok(response);
        }

        let message = Self::error_message(&response);
        warn!(method = method.as_str(), %url, status = response.status, %message, "Remote store rejected request");
        Err(StoreError::Status {
            status: response.status,
            message,
        })
    }

    fn error_message(response: &HttpResponse) -> String {
        if let Ok(body) = response.json::<ErrorBody>() {
            return body.error;
        }

        let text = response.text_lossy();
        let text = text.trim();
        if text.is_empty() {
            format!("HTTP {}", response.status)
        } else {
            text.to_string()
        }
    }

    fn decode<T: DeserializeOwned>(response: &HttpResponse) -> StoreResult<T> {
        serde_json::from_slice(&response.body).map_err(|e| StoreError::Decode(e.to_string()))
    }

    async fn create<B, T>(&self, path: &str, body: &B) -> StoreResult<T>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let request = self
            .request(HttpMethod::Post, path)
            .json(body)
            .map_err(|e| StoreError::Encode(e.to_string()))?;

        let response = self.send(request).await?;
        Self::decode(&response)
    }

    async fn list<T: DeserializeOwned>(&self, path: &str) -> StoreResult<Vec<T>> {
        let response = self.send(self.request(HttpMethod::Get, path)).await?;
        Self::decode(&response)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        resource: &'static str,
        path: &str,
        id: &str,
    ) -> StoreResult<T> {
        let request = self.request(HttpMethod::Get, &format!("{}/{}", path, id));

        match self.send(request).await {
            Ok(response) => Self::decode(&response),
            Err(StoreError::Status { status: 404, .. }) => Err(StoreError::NotFound {
                resource,
                id: id.to_string(),
            }),
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
impl RemoteStore for HttpRemoteStore {
    #[instrument(skip(self, document), fields(file = %document.file_name))]
    async fn create_document(&self, document: &NewDocument) -> StoreResult<RemoteDocument> {
        self.create(DOCUMENTS_PATH, document).await
    }

    #[instrument(skip(self))]
    async fn list_documents(&self) -> StoreResult<Vec<RemoteDocument>> {
        self.list(DOCUMENTS_PATH).await
    }

    #[instrument(skip(self))]
    async fn get_document(&self, id: &str) -> StoreResult<RemoteDocument> {
        self.get("document", DOCUMENTS_PATH, id).await
    }

    #[instrument(skip(self, interview), fields(position = %interview.target_position))]
    async fn create_interview(&self, interview: &NewInterview) -> StoreResult<RemoteInterview> {
        self.create(INTERVIEWS_PATH, interview).await
    }

    #[instrument(skip(self))]
    async fn list_interviews(&self) -> StoreResult<Vec<RemoteInterview>> {
        self.list(INTERVIEWS_PATH).await
    }

    #[instrument(skip(self))]
    async fn get_interview(&self, id: &str) -> StoreResult<RemoteInterview> {
        self.get("interview", INTERVIEWS_PATH, id).await
    }

    #[instrument(skip(self, question))]
    async fn create_question(&self, question: &NewQuestion) -> StoreResult<RemoteQuestion> {
        self.create(QUESTIONS_PATH, question).await
    }

    #[instrument(skip(self))]
    async fn list_questions(&self) -> StoreResult<Vec<RemoteQuestion>> {
        self.list(QUESTIONS_PATH).await
    }

    #[instrument(skip(self))]
    async fn get_question(&self, id: &str) -> StoreResult<RemoteQuestion> {
        self.get("question", QUESTIONS_PATH, id).await
    }

    #[instrument(skip(self, bank), fields(name = %bank.name))]
    async fn create_question_bank(
        &self,
        bank: &NewQuestionBank,
    ) -> StoreResult<RemoteQuestionBank> {
        self.create(QUESTION_BANKS_PATH, bank).await
    }

    #[instrument(skip(self))]
    async fn list_question_banks(&self) -> StoreResult<Vec<RemoteQuestionBank>> {
        self.list(QUESTION_BANKS_PATH).await
    }

    #[instrument(skip(self))]
    async fn get_question_bank(&self, id: &str) -> StoreResult<RemoteQuestionBank> {
        self.get("question bank", QUESTION_BANKS_PATH, id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::error::{BridgeError, Result as BridgeResult};
    use bytes::Bytes;
    use mockall::mock;
    use serde_json::json;
    use std::collections::HashMap;

    mock! {
        HttpClient {}

        #[async_trait]
        impl HttpClient for HttpClient {
            async fn execute(&self, request: HttpRequest) -> BridgeResult<HttpResponse>;
        }
    }

    fn respond(status: u16, body: &str) -> BridgeResult<HttpResponse> {
        Ok(HttpResponse {
            status,
            headers: HashMap::new(),
            body: Bytes::from(body.to_string()),
        })
    }

    fn new_document() -> NewDocument {
        NewDocument {
            file_name: "notes.pdf".to_string(),
            document_text: "Mitosis".to_string(),
            analysis: json!({"summary": "Cell division"}),
            content_hash: Some("abc".to_string()),
        }
    }

    #[tokio::test]
    async fn test_create_document_posts_camel_case_body() {
        let mut mock_http = MockHttpClient::new();
        mock_http
            .expect_execute()
            .times(1)
            .withf(|request| {
                let body: serde_json::Value =
                    serde_json::from_slice(request.body.as_deref().unwrap_or_default()).unwrap();
                request.method == HttpMethod::Post
                    && request.url == "https://store.test/api/documents"
                    && request.headers.get("Authorization") == Some(&"Bearer t0ken".to_string())
                    && body["fileName"] == "notes.pdf"
                    && body["contentHash"] == "abc"
            })
            .returning(|_| respond(201, r#"{"id": 7, "fileName": "notes.pdf", "contentHash": "abc"}"#));

        let store = HttpRemoteStore::new(Arc::new(mock_http), "https://store.test/")
            .with_api_token("t0ken");
        let created = store.create_document(&new_document()).await.unwrap();

        assert_eq!(created.id, "7");
        assert_eq!(created.content_hash.as_deref(), Some("abc"));
    }

    #[tokio::test]
    async fn test_list_question_banks() {
        let mut mock_http = MockHttpClient::new();
        mock_http
            .expect_execute()
            .times(1)
            .withf(|request| {
                request.method == HttpMethod::Get
                    && request.url == "https://store.test/api/question-banks"
                    && !request.headers.contains_key("Authorization")
            })
            .returning(|_| {
                respond(
                    200,
                    r#"[{"id": "b1", "name": "Rust", "questions": [{"question": "What is a trait?"}], "isPublic": true}]"#,
                )
            });

        let store = HttpRemoteStore::new(Arc::new(mock_http), "https://store.test");
        let banks = store.list_question_banks().await.unwrap();

        assert_eq!(banks.len(), 1);
        assert_eq!(banks[0].name, "Rust");
        assert!(banks[0].is_public);
        assert_eq!(banks[0].questions[0].question, "What is a trait?");
    }

    #[tokio::test]
    async fn test_get_missing_interview_is_not_found() {
        let mut mock_http = MockHttpClient::new();
        mock_http
            .expect_execute()
            .withf(|request| request.url == "https://store.test/api/interviews/99")
            .returning(|_| respond(404, r#"{"error": "Interview not found"}"#));

        let store = HttpRemoteStore::new(Arc::new(mock_http), "https://store.test");
        let err = store.get_interview("99").await.unwrap_err();

        assert!(matches!(err, StoreError::NotFound { resource: "interview", ref id } if id == "99"));
    }

    #[tokio::test]
    async fn test_conflict_surfaces_status_and_message() {
        let mut mock_http = MockHttpClient::new();
        mock_http
            .expect_execute()
            .returning(|_| respond(409, r#"{"message": "Document already exists"}"#));

        let store = HttpRemoteStore::new(Arc::new(mock_http), "https://store.test");
        let err = store.create_document(&new_document()).await.unwrap_err();

        match err {
            StoreError::Status { status, message } => {
                assert_eq!(status, 409);
                assert_eq!(message, "Document already exists");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_plain_text_and_empty_error_bodies() {
        let mut mock_http = MockHttpClient::new();
        let mut calls = 0;
        mock_http.expect_execute().times(2).returning(move |_| {
            calls += 1;
            if calls == 1 {
                respond(503, "upstream unavailable\n")
            } else {
                respond(500, "")
            }
        });

        let store = HttpRemoteStore::new(Arc::new(mock_http), "https://store.test");

        let err = store.list_documents().await.unwrap_err();
        assert!(matches!(err, StoreError::Status { status: 503, ref message } if message == "upstream unavailable"));

        let err = store.list_documents().await.unwrap_err();
        assert!(matches!(err, StoreError::Status { status: 500, ref message } if message == "HTTP 500"));
    }

    #[tokio::test]
    async fn test_transport_failure_is_network_error() {
        let mut mock_http = MockHttpClient::new();
        mock_http
            .expect_execute()
            .returning(|_| Err(BridgeError::Connection("connection refused".to_string())));

        let store = HttpRemoteStore::new(Arc::new(mock_http), "https://store.test");
        let err = store.list_interviews().await.unwrap_err();

        assert!(matches!(err, StoreError::Network(ref e) if e.is_transient()));
    }

    #[tokio::test]
    async fn test_malformed_body_is_decode_error() {
        let mut mock_http = MockHttpClient::new();
        mock_http
            .expect_execute()
            .returning(|_| respond(200, "<html>login</html>"));

        let store = HttpRemoteStore::new(Arc::new(mock_http), "https://store.test");
        let err = store.list_questions().await.unwrap_err();

        assert!(matches!(err, StoreError::Decode(_)));
    }

    #[tokio::test]
    async fn test_request_timeout_is_forwarded() {
        let mut mock_http = MockHttpClient::new();
        mock_http
            .expect_execute()
            .withf(|request| request.timeout == Some(Duration::from_secs(5)))
            .returning(|_| respond(200, "[]"));

        let store = HttpRemoteStore::new(Arc::new(mock_http), "https://store.test")
            .with_request_timeout(Duration::from_secs(5));

        assert!(store.list_documents().await.unwrap().is_empty());
    }
}
