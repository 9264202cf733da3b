//! Typed wrappers over the scholarship API endpoints.

pub mod community;
pub mod notices;
pub mod scholarships;

pub use community::{
    Comment, CommunityApi, Conversation, Message, Post, PostInput, PostQuery, Recipient,
};
pub use notices::{Notice, NoticeInput, NoticeQuery, NoticesApi};
pub use scholarships::{
    ProductId, Scholarship, ScholarshipProfile, ScholarshipQuery, ScholarshipsApi, WishlistEntry,
};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::Result;

/// One page of a list endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            total: 0,
        }
    }
}

impl<T: DeserializeOwned> Page<T> {
    /// Normalize a DRF paginated body (`{count, results}`), the catalogue's
    /// `{total, data}` body, or a bare array.
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        match value {
            serde_json::Value::Null => Ok(Self::default()),
            serde_json::Value::Array(_) => {
                let items: Vec<T> = serde_json::from_value(value)?;
                let total = items.len() as u64;
                Ok(Self { items, total })
            }
            serde_json::Value::Object(mut map) => {
                let listed = map
                    .remove("results")
                    .filter(serde_json::Value::is_array)
                    .or_else(|| map.remove("data").filter(serde_json::Value::is_array));
                let items: Vec<T> = match listed {
                    Some(results) => serde_json::from_value(results)?,
                    None => Vec::new(),
                };
                let total = ["count", "total"]
                    .iter()
                    .find_map(|key| map.get(*key).and_then(serde_json::Value::as_u64))
                    .unwrap_or(items.len() as u64);
                Ok(Self { items, total })
            }
            // Scalars are not a list; let serde report the mismatch.
            other => {
                let items: Vec<T> = serde_json::from_value(other)?;
                let total = items.len() as u64;
                Ok(Self { items, total })
            }
        }
    }
}
