//! Public notices (admin-managed announcements).

use bon::Builder;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Page;
use crate::client::{AuthenticatedHttpClient, RequestDescriptor};
use crate::error::Result;

pub const DEFAULT_ORDERING: &str = "-is_pinned,-created_at";
pub const DEFAULT_PAGE_SIZE: u32 = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notice {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub is_pinned: bool,
    #[serde(default)]
    pub is_published: bool,
    #[serde(default)]
    pub view_count: u64,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Body for creating or partially updating a notice. Unset fields are omitted.
#[derive(Debug, Clone, Default, Builder, Serialize)]
pub struct NoticeInput {
    #[builder(into)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[builder(into)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_pinned: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_published: Option<bool>,
}

#[derive(Debug, Clone, Default, Builder)]
pub struct NoticeQuery {
    #[builder(into)]
    pub search: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    #[builder(into)]
    pub ordering: Option<String>,
}

/// Notice endpoints under `/notices/`.
#[derive(Debug, Clone)]
pub struct NoticesApi {
    client: AuthenticatedHttpClient,
}

impl NoticesApi {
    pub fn new(client: AuthenticatedHttpClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, query: &NoticeQuery) -> Result<Page<Notice>> {
        let request = RequestDescriptor::get("/notices/")
            .query_opt("search", query.search.as_deref())
            .query("page", query.page.unwrap_or(1))
            .query("page_size", query.page_size.unwrap_or(DEFAULT_PAGE_SIZE))
            .query(
                "ordering",
                query.ordering.as_deref().unwrap_or(DEFAULT_ORDERING),
            );
        let response = self.client.request(request).await?;
        Page::from_value(response.json()?)
    }

    /// Fetch one notice. The server counts this as a view for published notices.
    pub async fn get(&self, id: u64) -> Result<Notice> {
        self.client.get(&format!("/notices/{id}/")).await?.json()
    }

    pub async fn create(&self, input: &NoticeInput) -> Result<Notice> {
        self.client.post("/notices/", input).await?.json()
    }

    pub async fn update(&self, id: u64, input: &NoticeInput) -> Result<Notice> {
        self.client.patch(&format!("/notices/{id}/"), input).await?.json()
    }

    pub async fn delete(&self, id: u64) -> Result<()> {
        self.client.delete(&format!("/notices/{id}/")).await?;
        Ok(())
    }
}

impl AuthenticatedHttpClient {
    pub fn notices(&self) -> NoticesApi {
        NoticesApi::new(self.clone())
    }
}
