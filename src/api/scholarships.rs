//! Scholarship catalogue, wishlist, recommendations, and the applicant profile
//! used for matching.

use std::fmt;

use bon::Builder;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::Page;
use crate::client::{AuthenticatedHttpClient, RequestDescriptor};
use crate::error::{ClientError, Result};

pub const DEFAULT_PER_PAGE: u32 = 10;

/// Upstream product identifier; the catalogue serves both numeric and text ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProductId {
    Number(u64),
    Text(String),
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(id) => write!(f, "{id}"),
            Self::Text(id) => f.write_str(id),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scholarship {
    /// Local row id; only present on wishlisted copies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub product_id: ProductId,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WishlistEntry {
    #[serde(default)]
    pub id: Option<u64>,
    pub scholarship: Scholarship,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Builder)]
pub struct ScholarshipQuery {
    #[builder(into)]
    pub search: Option<String>,
    /// Product type label as the backend names it, e.g. `지역연고`.
    #[builder(into)]
    pub product_type: Option<String>,
    /// Sort key, e.g. `end_date`.
    #[builder(into)]
    pub sort: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// Applicant details the recommender matches against.
#[derive(Debug, Clone, Default, PartialEq, Builder, Serialize, Deserialize)]
pub struct ScholarshipProfile {
    #[builder(into)]
    #[serde(default)]
    pub name: Option<String>,
    #[builder(into)]
    #[serde(default)]
    pub gender: Option<String>,
    #[builder(into)]
    #[serde(default)]
    pub birth_date: Option<String>,
    #[builder(into)]
    #[serde(default)]
    pub region: Option<String>,
    #[builder(into)]
    #[serde(default)]
    pub district: Option<String>,
    #[builder(into)]
    #[serde(default)]
    pub income_level: Option<String>,
    #[builder(into)]
    #[serde(default)]
    pub university_type: Option<String>,
    #[builder(into)]
    #[serde(default)]
    pub university_name: Option<String>,
    #[builder(into)]
    #[serde(default)]
    pub major_field: Option<String>,
    #[builder(into)]
    #[serde(default)]
    pub department: Option<String>,
    #[builder(into)]
    #[serde(default)]
    pub academic_year_type: Option<String>,
    #[builder(into)]
    #[serde(default)]
    pub semester: Option<String>,
    #[serde(default)]
    pub gpa_last_semester: Option<f64>,
    #[serde(default)]
    pub gpa_overall: Option<f64>,
    #[builder(default)]
    #[serde(default)]
    pub is_multi_cultural_family: bool,
    #[builder(default)]
    #[serde(default)]
    pub is_single_parent_family: bool,
    #[builder(default)]
    #[serde(default)]
    pub is_multiple_children_family: bool,
    #[builder(default)]
    #[serde(default)]
    pub is_national_merit: bool,
    #[builder(into)]
    #[serde(default)]
    pub additional_info: Option<String>,
}

#[derive(Deserialize)]
struct Recommendations {
    #[serde(default)]
    scholarships: Option<Vec<Scholarship>>,
}

/// Scholarship endpoints under `/scholarships/` and `/userinfor/`.
#[derive(Debug, Clone)]
pub struct ScholarshipsApi {
    client: AuthenticatedHttpClient,
}

impl ScholarshipsApi {
    pub fn new(client: AuthenticatedHttpClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, query: &ScholarshipQuery) -> Result<Page<Scholarship>> {
        let request = RequestDescriptor::get("/scholarships/")
            .query("page", query.page.unwrap_or(1))
            .query("perPage", query.per_page.unwrap_or(DEFAULT_PER_PAGE))
            .query_opt("search", query.search.as_deref().map(str::trim))
            .query_opt("type", query.product_type.as_deref())
            .query_opt("sort", query.sort.as_deref().map(str::trim));
        let response = self.client.request(request).await?;
        Page::from_value(response.json()?)
    }

    pub async fn wishlist(&self) -> Result<Vec<WishlistEntry>> {
        let response = self.client.get("/scholarships/wishlist/").await?;
        Ok(Page::from_value(response.json()?)?.items)
    }

    /// Wishlist a catalogue entry as served by [`ScholarshipsApi::list`].
    pub async fn add_to_wishlist(&self, scholarship: &Scholarship) -> Result<()> {
        self.client
            .post("/scholarships/wishlist/add-from-api/", scholarship)
            .await?;
        Ok(())
    }

    /// Un-wishlist by upstream product id.
    pub async fn remove_from_wishlist(&self, product_id: &ProductId) -> Result<()> {
        let body = json!({ "product_id": product_id, "action": "remove" });
        self.client
            .post("/scholarships/wishlist/toggle/", &body)
            .await?;
        Ok(())
    }

    /// Delete a wishlist row by the local scholarship id.
    pub async fn delete_wishlist_entry(&self, scholarship_id: u64) -> Result<()> {
        self.client
            .delete(&format!("/scholarships/wishlist/delete/{scholarship_id}/"))
            .await?;
        Ok(())
    }

    /// Scholarships matched to the signed-in user's profile.
    pub async fn recommendations(&self) -> Result<Vec<Scholarship>> {
        let response = self.client.get("/scholarships/recommendation/").await?;
        let body: Recommendations = response.json()?;
        Ok(body.scholarships.unwrap_or_default())
    }

    /// The saved applicant profile, or `None` when none has been saved yet.
    pub async fn profile(&self) -> Result<Option<ScholarshipProfile>> {
        match self.client.get("/userinfor/scholarship/get/").await {
            Ok(response) => Ok(Some(response.json()?)),
            Err(ClientError::Http { status: 404, .. }) => Ok(None),
            Err(err) => Err(err),
        }
    }

    pub async fn save_profile(&self, profile: &ScholarshipProfile) -> Result<()> {
        self.client
            .post("/userinfor/scholarship/save/", profile)
            .await?;
        Ok(())
    }
}

impl AuthenticatedHttpClient {
    pub fn scholarships(&self) -> ScholarshipsApi {
        ScholarshipsApi::new(self.clone())
    }
}
