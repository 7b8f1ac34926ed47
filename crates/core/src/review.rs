//! Customer reviews. The admin only lists and deletes them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::listing::SortDirection;
use crate::types::Timestamp;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewAuthor {
    pub name: String,
    /// Avatar URL.
    #[serde(default)]
    pub picture: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: String,
    pub author: ReviewAuthor,
    pub rating: f32,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub helpful_count: u32,
    #[serde(default)]
    pub verified_purchase: bool,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewListResponse {
    #[serde(default)]
    pub reviews: Vec<Review>,
    #[serde(default)]
    pub total_count: u64,
    #[serde(default)]
    pub next_cursor: Option<u64>,
}

/// Aggregate rating figures for one product. The distribution maps star
/// counts (`"1"`..`"5"`) to the number of reviews.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewStats {
    #[serde(default)]
    pub average_rating: f64,
    #[serde(default)]
    pub total_reviews: u64,
    #[serde(default)]
    pub rating_distribution: BTreeMap<String, u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReviewSortField {
    CreatedAt,
    Rating,
    HelpfulCount,
}

impl ReviewSortField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreatedAt => "createdAt",
            Self::Rating => "rating",
            Self::HelpfulCount => "helpfulCount",
        }
    }
}

/// Parameters of `GET /api/products/:id/reviews`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReviewQuery {
    pub cursor: Option<u64>,
    pub limit: Option<u64>,
    pub sort_by: Option<ReviewSortField>,
    pub sort_order: Option<SortDirection>,
}

impl ReviewQuery {
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(cursor) = self.cursor {
            pairs.push(("cursor", cursor.to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        if let Some(sort_by) = self.sort_by {
            pairs.push(("sortBy", sort_by.as_str().to_string()));
        }
        if let Some(sort_order) = self.sort_order {
            pairs.push(("sortOrder", sort_order.as_str().to_string()));
        }
        pairs
    }
}
