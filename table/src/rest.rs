//! PostgREST implementation of [`TaskTable`]
//!
//! Hosted backends such as Supabase expose each table under
//! `{project}/rest/v1/{table}`. Filters travel as query parameters
//! (`id=eq.7`) and inserts only return the created row when asked to with
//! `Prefer: return=representation`.

use crate::client::{TableFuture, TaskTable};
use crate::config::TableConfig;
use crate::error::{Result, TableError};
use crate::record::{Task, TaskDraft, TaskId, TaskPatch};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;

/// Task table reached over HTTP
#[derive(Clone, Debug)]
pub struct RestTaskTable {
    client: Client,
    config: TableConfig,
    endpoint: String,
}

impl RestTaskTable {
    /// Create a client for the configured table
    #[must_use]
    pub fn new(config: TableConfig) -> Self {
        Self::with_client(Client::new(), config)
    }

    /// Create a client reusing an existing `reqwest::Client`
    #[must_use]
    pub fn with_client(client: Client, config: TableConfig) -> Self {
        let endpoint = config.endpoint();
        Self {
            client,
            config,
            endpoint,
        }
    }

    /// Create a client from `SUPABASE_URL` / `SUPABASE_ANON_KEY`
    ///
    /// # Errors
    ///
    /// Returns [`TableError::MissingConfig`] if either variable is unset.
    pub fn from_env() -> Result<Self> {
        TableConfig::from_env().map(Self::new)
    }

    /// The configuration this client was built with
    #[must_use]
    pub const fn config(&self) -> &TableConfig {
        &self.config
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.config.api_key)
            .bearer_auth(&self.config.api_key)
            .timeout(self.config.timeout)
    }

    fn id_filter(id: TaskId) -> [(&'static str, String); 1] {
        [("id", format!("eq.{id}"))]
    }

    async fn send(request: RequestBuilder) -> Result<Response> {
        let response = request
            .send()
            .await
            .map_err(|e| TableError::Request(e.to_string()))?;

        match response.status() {
            status if status.is_success() => Ok(response),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(TableError::Unauthorized),
            status => {
                let message = response.text().await.unwrap_or_default();
                Err(TableError::Api {
                    status: status.as_u16(),
                    message,
                })
            },
        }
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
        response
            .json::<T>()
            .await
            .map_err(|e| TableError::ResponseParse(e.to_string()))
    }

    #[tracing::instrument(skip(self), fields(table = %self.config.table))]
    async fn fetch_all(&self) -> Result<Vec<Task>> {
        let request = self
            .authorized(self.client.get(&self.endpoint))
            .query(&[("select", "*")]);

        let tasks: Vec<Task> = Self::decode(Self::send(request).await?).await?;
        tracing::debug!(count = tasks.len(), "listed tasks");
        Ok(tasks)
    }

    #[tracing::instrument(skip(self, draft), fields(table = %self.config.table))]
    async fn insert(&self, draft: TaskDraft) -> Result<Task> {
        let request = self
            .authorized(self.client.post(&self.endpoint))
            .query(&[("select", "*")])
            .header("Prefer", "return=representation")
            .json(&[draft]);

        let rows: Vec<Task> = Self::decode(Self::send(request).await?).await?;
        let task = rows
            .into_iter()
            .next()
            .ok_or_else(|| TableError::ResponseParse("insert returned no rows".to_string()))?;
        tracing::debug!(id = %task.id, "inserted task");
        Ok(task)
    }

    #[tracing::instrument(skip(self), fields(table = %self.config.table))]
    async fn update(&self, id: TaskId, patch: TaskPatch) -> Result<()> {
        let request = self
            .authorized(self.client.patch(&self.endpoint))
            .query(&Self::id_filter(id))
            .json(&patch);

        Self::send(request).await?;
        tracing::debug!("updated task");
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(table = %self.config.table))]
    async fn delete(&self, id: TaskId) -> Result<()> {
        let request = self
            .authorized(self.client.delete(&self.endpoint))
            .query(&Self::id_filter(id));

        Self::send(request).await?;
        tracing::debug!("deleted task");
        Ok(())
    }
}

impl TaskTable for RestTaskTable {
    fn list_all(&self) -> TableFuture<'_, Vec<Task>> {
        Box::pin(self.fetch_all())
    }

    fn insert_one(&self, draft: TaskDraft) -> TableFuture<'_, Task> {
        Box::pin(self.insert(draft))
    }

    fn update_by_id(&self, id: TaskId, patch: TaskPatch) -> TableFuture<'_, ()> {
        Box::pin(self.update(id, patch))
    }

    fn delete_by_id(&self, id: TaskId) -> TableFuture<'_, ()> {
        Box::pin(self.delete(id))
    }
}
