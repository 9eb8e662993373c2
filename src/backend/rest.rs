use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use super::{Backend, BackendError};
use crate::config::ApiConfig;
use crate::model::work_item::{FieldChange, ItemId, WorkItem};

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Client for the task REST API (`{base}/tasks/`).
pub struct RestBackend {
    base_url: String,
    token: Option<String>,
    client: reqwest::Client,
}

impl RestBackend {
    pub fn new(api: &ApiConfig) -> Result<Self, BackendError> {
        let timeout = Duration::from_secs(api.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS));
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BackendError::Transport(e.to_string()))?;
        Ok(Self {
            base_url: api.base_url.trim_end_matches('/').to_string(),
            token: api.token.clone(),
            client,
        })
    }

    fn tasks_url(&self) -> String {
        format!("{}/tasks/", self.base_url)
    }

    fn task_url(&self, item_id: ItemId) -> String {
        format!("{}/tasks/{item_id}/", self.base_url)
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let req = req.header("Accept", "application/json");
        match &self.token {
            Some(token) => req.header("Authorization", format!("Token {token}")),
            None => req,
        }
    }

    async fn send(&self, req: reqwest::RequestBuilder) -> Result<reqwest::Response, BackendError> {
        let resp = self
            .authorize(req)
            .send()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(BackendError::Status {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }
        Ok(resp)
    }

    async fn patch(&self, item_id: ItemId, body: serde_json::Value) -> Result<(), BackendError> {
        self.send(self.client.patch(self.task_url(item_id)).json(&body))
            .await
            .map(|_| ())
    }
}

/// The list endpoint answers with a bare array, or a page envelope when
/// pagination is switched on server-side.
#[derive(Deserialize)]
#[serde(untagged)]
enum TaskList {
    Bare(Vec<WorkItem>),
    Page { results: Vec<WorkItem> },
}

pub fn decode_task_list(body: &[u8]) -> Result<Vec<WorkItem>, BackendError> {
    let list: TaskList =
        serde_json::from_slice(body).map_err(|e| BackendError::Decode(e.to_string()))?;
    Ok(match list {
        TaskList::Bare(items) => items,
        TaskList::Page { results } => results,
    })
}

pub fn field_body(change: FieldChange) -> serde_json::Value {
    match change {
        FieldChange::Status(s) => json!({ "status": s }),
        FieldChange::Priority(p) => json!({ "priority": p }),
    }
}

#[async_trait]
impl Backend for RestBackend {
    fn name(&self) -> &str {
        "REST"
    }

    async fn fetch_items(&self) -> Result<Vec<WorkItem>, BackendError> {
        let resp = self.send(self.client.get(self.tasks_url())).await?;
        let body = resp
            .bytes()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;
        decode_task_list(&body)
    }

    async fn set_field(&self, item_id: ItemId, change: FieldChange) -> Result<(), BackendError> {
        self.patch(item_id, field_body(change)).await
    }

    async fn rename_item(&self, item_id: ItemId, title: &str) -> Result<(), BackendError> {
        self.patch(item_id, json!({ "title": title })).await
    }

    async fn delete_item(&self, item_id: ItemId) -> Result<(), BackendError> {
        self.send(self.client.delete(self.task_url(item_id)))
            .await
            .map(|_| ())
    }
}
