//! Chat backend over JSON/HTTP.
//!
//! Endpoints, relative to the configured base URL:
//! - `POST login` with `{"username","password"}`, answers `{"token"}`
//! - `GET messages?after=<cursor>`, answers a JSON array of messages
//! - `POST messages` with `{"content"}`

use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{BackendError, ChatBackend};
use crate::protocol::Message;

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    token: String,
}

#[derive(Serialize)]
struct WriteRequest<'a> {
    content: &'a str,
}

pub struct HttpBackend {
    client: Client,
    base_url: String,
    token: Mutex<Option<String>>,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, BackendError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BackendError::Network(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: Mutex::new(None),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match self.token.lock().as_deref() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

fn transport_error(err: reqwest::Error) -> BackendError {
    if err.is_timeout() {
        BackendError::Timeout
    } else if err.is_decode() {
        BackendError::Malformed(err.to_string())
    } else {
        BackendError::Network(err.to_string())
    }
}

fn status_error(status: StatusCode) -> Option<BackendError> {
    if status.is_success() {
        None
    } else if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        Some(BackendError::Unauthorized)
    } else {
        Some(BackendError::Rejected(format!("HTTP {}", status)))
    }
}

fn check_status(response: Response) -> Result<Response, BackendError> {
    match status_error(response.status()) {
        Some(err) => Err(err),
        None => Ok(response),
    }
}

fn parse_messages(body: &str) -> Result<Vec<Message>, BackendError> {
    serde_json::from_str(body).map_err(|e| BackendError::Malformed(e.to_string()))
}

#[async_trait]
impl ChatBackend for HttpBackend {
    async fn read_messages(&self, cursor: &str) -> Result<Vec<Message>, BackendError> {
        let request = self
            .client
            .get(self.url("messages"))
            .query(&[("after", cursor)]);
        let response = self
            .authorized(request)
            .send()
            .await
            .map_err(transport_error)?;
        let body = check_status(response)?
            .text()
            .await
            .map_err(transport_error)?;
        parse_messages(&body)
    }

    async fn write_message(&self, content: &str) -> Result<(), BackendError> {
        let request = self
            .client
            .post(self.url("messages"))
            .json(&WriteRequest { content });
        let response = self
            .authorized(request)
            .send()
            .await
            .map_err(transport_error)?;
        check_status(response)?;
        Ok(())
    }

    async fn login(&self, username: &str, password: &str) -> Result<bool, BackendError> {
        let response = self
            .client
            .post(self.url("login"))
            .json(&LoginRequest { username, password })
            .send()
            .await
            .map_err(transport_error)?;

        match check_status(response) {
            Ok(response) => {
                let login: LoginResponse = response.json().await.map_err(transport_error)?;
                *self.token.lock() = Some(login.token);
                Ok(true)
            }
            Err(BackendError::Unauthorized) => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn is_authenticated(&self) -> bool {
        self.token.lock().is_some()
    }

    fn logout(&self) {
        *self.token.lock() = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joins_without_double_slash() {
        let backend = HttpBackend::new("http://chat.example/api/", Duration::from_secs(1)).unwrap();
        assert_eq!(backend.url("messages"), "http://chat.example/api/messages");
        assert!(!backend.is_authenticated());
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_error(StatusCode::OK), None);
        assert_eq!(
            status_error(StatusCode::UNAUTHORIZED),
            Some(BackendError::Unauthorized)
        );
        assert_eq!(
            status_error(StatusCode::FORBIDDEN),
            Some(BackendError::Unauthorized)
        );
        assert!(matches!(
            status_error(StatusCode::INTERNAL_SERVER_ERROR),
            Some(BackendError::Rejected(_))
        ));
    }

    #[test]
    fn test_parse_messages() {
        let body = r#"[{"id":"10","author":"alice","time":"09:00","content":"[b]hi[/b]","kind":"user"}]"#;
        let msgs = parse_messages(body).unwrap();
        assert_eq!(msgs.len(), 1);
        assert_eq!(msgs[0].id, "10");

        assert_eq!(parse_messages("[]").unwrap(), Vec::new());
        assert!(matches!(
            parse_messages(r#"{"error":"oops"}"#),
            Err(BackendError::Malformed(_))
        ));
    }
}
