//! Test HTTP client.
//!
//! Wraps `reqwest` with helpers for each registry endpoint. Every helper
//! returns the status code and the decoded JSON body.

use reqwest::StatusCode;
use reqwest::multipart::{Form, Part};
use serde_json::{Value, json};

/// Fields for a submission.
pub struct Submission<'a> {
    pub full_name: &'a str,
    pub group_name: Option<&'a str>,
    pub supervisor: Option<&'a str>,
    pub activity: &'a str,
    pub file_name: &'a str,
    pub content_type: &'a str,
    pub bytes: Vec<u8>,
}

impl<'a> Submission<'a> {
    /// A valid PDF submission for `full_name`.
    pub fn pdf(full_name: &'a str) -> Self {
        Self {
            full_name,
            group_name: Some("CS-101"),
            supervisor: Some("Dr. Petrova"),
            activity: "Science fair",
            file_name: "certificate.pdf",
            content_type: "application/pdf",
            bytes: b"%PDF-1.4\n%test document\n".to_vec(),
        }
    }
}

/// A test API client.
pub struct TestClient {
    http: reqwest::Client,
    base_url: String,
}

impl TestClient {
    pub fn new(base_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn decode(response: reqwest::Response) -> anyhow::Result<(StatusCode, Value)> {
        let status = response.status();
        let bytes = response.bytes().await?;
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)?
        };
        Ok((status, body))
    }

    /// POST /api/requests
    pub async fn submit(&self, submission: Submission<'_>) -> anyhow::Result<(StatusCode, Value)> {
        let mut form = Form::new()
            .text("full_name", submission.full_name.to_string())
            .text("activity", submission.activity.to_string());
        if let Some(group) = submission.group_name {
            form = form.text("group_name", group.to_string());
        }
        if let Some(supervisor) = submission.supervisor {
            form = form.text("supervisor", supervisor.to_string());
        }
        let part = Part::bytes(submission.bytes)
            .file_name(submission.file_name.to_string())
            .mime_str(submission.content_type)?;
        form = form.part("file", part);

        let response = self
            .http
            .post(self.url("/api/requests"))
            .multipart(form)
            .send()
            .await?;
        Self::decode(response).await
    }

    /// POST /api/admin/login
    pub async fn login(&self, password: &str) -> anyhow::Result<(StatusCode, Value)> {
        let response = self
            .http
            .post(self.url("/api/admin/login"))
            .json(&json!({ "password": password }))
            .send()
            .await?;
        Self::decode(response).await
    }

    /// GET /api/admin/requests/pending
    pub async fn pending(&self) -> anyhow::Result<Vec<Value>> {
        self.list("pending").await
    }

    /// GET /api/admin/requests/approved
    pub async fn approved(&self) -> anyhow::Result<Vec<Value>> {
        self.list("approved").await
    }

    async fn list(&self, which: &str) -> anyhow::Result<Vec<Value>> {
        let response = self
            .http
            .get(self.url(&format!("/api/admin/requests/{which}")))
            .send()
            .await?;
        let (status, body) = Self::decode(response).await?;
        anyhow::ensure!(status == StatusCode::OK, "listing {which} failed: {status}");
        match body {
            Value::Array(rows) => Ok(rows),
            other => anyhow::bail!("expected array, got {other}"),
        }
    }

    /// PUT /api/admin/requests/{id}
    pub async fn set_status(&self, id: i64, status: &str) -> anyhow::Result<(StatusCode, Value)> {
        let response = self
            .http
            .put(self.url(&format!("/api/admin/requests/{id}")))
            .json(&json!({ "status": status }))
            .send()
            .await?;
        Self::decode(response).await
    }

    /// DELETE /api/admin/requests/{id}
    pub async fn delete(&self, id: i64) -> anyhow::Result<(StatusCode, Value)> {
        let response = self
            .http
            .delete(self.url(&format!("/api/admin/requests/{id}")))
            .send()
            .await?;
        Self::decode(response).await
    }

    /// GET with an Origin header; returns the Access-Control-Allow-Origin value.
    pub async fn allowed_origin(&self, path: &str, origin: &str) -> anyhow::Result<Option<String>> {
        let response = self
            .http
            .get(self.url(path))
            .header(reqwest::header::ORIGIN, origin)
            .send()
            .await?;
        Ok(response
            .headers()
            .get(reqwest::header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string))
    }
}

/// Pull the integer `id` out of a JSON object.
pub fn id_of(value: &Value) -> i64 {
    value["id"].as_i64().expect("response has integer id")
}
