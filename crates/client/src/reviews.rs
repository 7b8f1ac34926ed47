//! Review endpoints. Reviews are moderated, never authored, from the admin.

use printables_core::review::{ReviewListResponse, ReviewQuery, ReviewStats};

use crate::admin::{AdminClient, MutationEffects};
use crate::cache::CacheTag;
use crate::error::ClientError;

const DELETE_REVIEW: MutationEffects = MutationEffects {
    name: "delete_review",
    invalidates: &[CacheTag::Reviews, CacheTag::ReviewStats],
    success: Some("Review Deleted Successfully"),
    failure: Some("Error Deleting Review!"),
};

impl AdminClient {
    /// `GET /api/products/:id/reviews`.
    pub async fn list_reviews(
        &self,
        product_id: &str,
        query: &ReviewQuery,
    ) -> Result<ReviewListResponse, ClientError> {
        let path = format!("/api/products/{product_id}/reviews");
        let pairs = query.to_query_pairs();
        let key = format!(
            "reviews/{product_id}?{}",
            pairs
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect::<Vec<_>>()
                .join("&")
        );
        self.cache()
            .get_or_fetch(&key, &[CacheTag::Reviews], || {
                self.api().get_json(&path, &pairs)
            })
            .await
    }

    /// `GET /api/products/:id/reviews/stats`.
    pub async fn review_stats(&self, product_id: &str) -> Result<ReviewStats, ClientError> {
        let path = format!("/api/products/{product_id}/reviews/stats");
        self.cache()
            .get_or_fetch(
                &format!("review-stats/{product_id}"),
                &[CacheTag::ReviewStats],
                || self.api().get_json(&path, &[]),
            )
            .await
    }

    /// `DELETE /api/reviews/:id`.
    pub async fn delete_review(&self, review_id: &str) -> Result<(), ClientError> {
        let path = format!("/api/reviews/{review_id}");
        self.mutate(DELETE_REVIEW, self.api().delete(&path)).await
    }
}
