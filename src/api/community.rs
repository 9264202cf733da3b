//! Community board: posts, comments, and direct messages.

use bon::Builder;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::Page;
use crate::client::{AuthenticatedHttpClient, RequestDescriptor};
use crate::error::{ClientError, Result};

pub const DEFAULT_CATEGORY: &str = "story";
pub const DEFAULT_ORDERING: &str = "-created_at";
pub const DEFAULT_PAGE_SIZE: u32 = 12;
pub const DEFAULT_MESSAGE_PAGE_SIZE: u32 = 100;
pub const DEFAULT_CONVERSATION_PAGE_SIZE: u32 = 50;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub view_count: u64,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Builder, Serialize)]
pub struct PostInput {
    #[builder(into)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[builder(into)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[builder(into)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

#[derive(Debug, Clone, Default, Builder)]
pub struct PostQuery {
    #[builder(into)]
    pub category: Option<String>,
    #[builder(into)]
    pub search: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    #[builder(into)]
    pub ordering: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: u64,
    pub post: u64,
    #[serde(default)]
    pub parent: Option<u64>,
    pub content: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub id: u64,
    #[serde(default)]
    pub participants: Vec<serde_json::Value>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: u64,
    pub conversation: u64,
    pub content: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Who a direct-message conversation is with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recipient {
    Id(u64),
    Username(String),
}

/// Community endpoints under `/community/`.
#[derive(Debug, Clone)]
pub struct CommunityApi {
    client: AuthenticatedHttpClient,
}

impl CommunityApi {
    pub fn new(client: AuthenticatedHttpClient) -> Self {
        Self { client }
    }

    /// List posts; the category defaults to `story`.
    pub async fn list_posts(&self, query: &PostQuery) -> Result<Page<Post>> {
        let category = query.category.as_deref().unwrap_or(DEFAULT_CATEGORY);
        self.fetch_posts("/community/posts/", Some(category), query).await
    }

    /// Posts bookmarked by the signed-in user, across all categories unless filtered.
    pub async fn list_bookmarked_posts(&self, query: &PostQuery) -> Result<Page<Post>> {
        self.fetch_posts("/community/posts/my_bookmarks/", query.category.as_deref(), query)
            .await
    }

    async fn fetch_posts(
        &self,
        path: &str,
        category: Option<&str>,
        query: &PostQuery,
    ) -> Result<Page<Post>> {
        let request = RequestDescriptor::get(path)
            .query_opt("category", category)
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

    pub async fn get_post(&self, id: u64) -> Result<Post> {
        self.client.get(&post_path(id, "")).await?.json()
    }

    pub async fn create_post(&self, input: &PostInput) -> Result<Post> {
        self.client.post("/community/posts/", input).await?.json()
    }

    pub async fn update_post(&self, id: u64, input: &PostInput) -> Result<Post> {
        self.client.patch(&post_path(id, ""), input).await?.json()
    }

    pub async fn delete_post(&self, id: u64) -> Result<()> {
        self.client.delete(&post_path(id, "")).await?;
        Ok(())
    }

    pub async fn like_post(&self, id: u64) -> Result<()> {
        self.post_action(id, "like").await
    }

    pub async fn unlike_post(&self, id: u64) -> Result<()> {
        self.post_action(id, "unlike").await
    }

    pub async fn bookmark_post(&self, id: u64) -> Result<()> {
        self.post_action(id, "bookmark").await
    }

    pub async fn unbookmark_post(&self, id: u64) -> Result<()> {
        self.post_action(id, "unbookmark").await
    }

    /// Count a view. Failures are logged and otherwise ignored.
    pub async fn increment_view(&self, id: u64) {
        if let Err(err) = self.post_action(id, "increment_view").await {
            tracing::debug!(post = id, error = %err, "view count not incremented");
        }
    }

    async fn post_action(&self, id: u64, action: &str) -> Result<()> {
        self.client
            .request(RequestDescriptor::post(post_path(id, action)))
            .await?;
        Ok(())
    }

    /// Comments of a post, oldest first. `parent` narrows to replies of one comment.
    pub async fn list_comments(&self, post: u64, parent: Option<u64>) -> Result<Vec<Comment>> {
        let request = RequestDescriptor::get("/community/comments/")
            .query("post", post)
            .query_opt("parent", parent)
            .query("ordering", "created_at");
        let response = self.client.request(request).await?;
        Ok(Page::from_value(response.json()?)?.items)
    }

    pub async fn add_comment(&self, post: u64, content: &str, parent: Option<u64>) -> Result<Comment> {
        let body = json!({ "post": post, "content": content, "parent": parent });
        self.client.post("/community/comments/", &body).await?.json()
    }

    pub async fn reply(&self, post: u64, parent: u64, content: &str) -> Result<Comment> {
        self.add_comment(post, content, Some(parent)).await
    }

    pub async fn update_comment(&self, id: u64, content: &str) -> Result<Comment> {
        self.client
            .patch(&format!("/community/comments/{id}/"), &json!({ "content": content }))
            .await?
            .json()
    }

    pub async fn delete_comment(&self, id: u64) -> Result<()> {
        self.client
            .delete(&format!("/community/comments/{id}/"))
            .await?;
        Ok(())
    }

    /// Find or create the one-to-one conversation with `recipient`.
    pub async fn ensure_conversation(&self, recipient: &Recipient) -> Result<Conversation> {
        let body = match recipient {
            Recipient::Id(id) => json!({ "recipient_id": id }),
            Recipient::Username(name) if !name.trim().is_empty() => {
                json!({ "recipient_username": name.trim() })
            }
            Recipient::Username(_) => {
                return Err(ClientError::InvalidArgument(
                    "conversation recipient is missing".into(),
                ))
            }
        };
        self.client
            .post("/community/conversations/", &body)
            .await?
            .json()
    }

    /// Conversations of the signed-in user, most recent activity first.
    pub async fn list_conversations(&self, page_size: Option<u32>) -> Result<Vec<Conversation>> {
        let request = RequestDescriptor::get("/community/conversations/")
            .query(
                "page_size",
                page_size.unwrap_or(DEFAULT_CONVERSATION_PAGE_SIZE),
            )
            .query("ordering", "-latest_time");
        let response = self.client.request(request).await?;
        Ok(Page::from_value(response.json()?)?.items)
    }

    pub async fn delete_conversation(&self, id: u64) -> Result<()> {
        self.client
            .delete(&format!("/community/conversations/{id}/"))
            .await?;
        Ok(())
    }

    pub async fn leave_conversation(&self, id: u64) -> Result<()> {
        self.conversation_action(id, "leave").await
    }

    /// Drop a conversation from the user's list: delete it, or leave it when
    /// the server refuses the delete.
    pub async fn remove_conversation(&self, id: u64) -> Result<()> {
        match self.delete_conversation(id).await {
            Ok(()) => Ok(()),
            Err(err) if matches!(err, ClientError::Http { status, .. } if status != 401) => {
                tracing::debug!(conversation = id, error = %err, "delete refused; leaving instead");
                self.leave_conversation(id).await
            }
            Err(err) => Err(err),
        }
    }

    pub async fn mark_read(&self, conversation: u64) -> Result<()> {
        self.conversation_action(conversation, "mark_read").await
    }

    async fn conversation_action(&self, id: u64, action: &str) -> Result<()> {
        self.client
            .request(RequestDescriptor::post(format!(
                "/community/conversations/{id}/{action}/"
            )))
            .await?;
        Ok(())
    }

    pub async fn list_messages(
        &self,
        conversation: u64,
        page: Option<u32>,
        page_size: Option<u32>,
    ) -> Result<Vec<Message>> {
        let request = RequestDescriptor::get("/community/messages/")
            .query("conversation", conversation)
            .query("ordering", "created_at")
            .query("page", page.unwrap_or(1))
            .query("page_size", page_size.unwrap_or(DEFAULT_MESSAGE_PAGE_SIZE));
        let response = self.client.request(request).await?;
        Ok(Page::from_value(response.json()?)?.items)
    }

    pub async fn send_message(&self, conversation: u64, content: &str) -> Result<Message> {
        let body = json!({ "conversation": conversation, "content": content });
        self.client.post("/community/messages/", &body).await?.json()
    }
}

fn post_path(id: u64, action: &str) -> String {
    if action.is_empty() {
        format!("/community/posts/{id}/")
    } else {
        format!("/community/posts/{id}/{action}/")
    }
}

impl AuthenticatedHttpClient {
    pub fn community(&self) -> CommunityApi {
        CommunityApi::new(self.clone())
    }
}
