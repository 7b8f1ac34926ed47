//! Review moderation and order management against the mock backend.

mod common;

use std::sync::atomic::Ordering;

use assert_matches::assert_matches;
use printables_client::ClientError;
use printables_core::listing::SortDirection;
use printables_core::review::{ReviewQuery, ReviewSortField};

use common::{admin_client, next_notification, spawn_backend};

#[tokio::test]
async fn reviews_and_stats_are_cached_until_a_review_is_deleted() {
    let backend = spawn_backend().await;
    let (client, mut notifications) = admin_client(&backend);
    let query = ReviewQuery {
        limit: Some(5),
        sort_by: Some(ReviewSortField::HelpfulCount),
        sort_order: Some(SortDirection::Desc),
        ..Default::default()
    };

    let reviews = client.list_reviews("p-1", &query).await.unwrap();
    let stats = client.review_stats("p-1").await.unwrap();
    client.list_reviews("p-1", &query).await.unwrap();
    client.review_stats("p-1").await.unwrap();
    assert_eq!(backend.state.review_calls.load(Ordering::SeqCst), 2);

    assert_eq!(reviews.total_count, 1);
    assert_eq!(
        reviews.reviews[0].content.as_deref(),
        Some("limit=5&sortBy=helpfulCount&sortOrder=desc")
    );
    assert_eq!(stats.average_rating, 4.5);
    assert_eq!(stats.rating_distribution.get("5"), Some(&1));

    client.delete_review("rev-1").await.unwrap();
    assert_eq!(backend.state.deleted(), vec!["review:rev-1"]);
    assert_eq!(
        next_notification(&mut notifications).await.message,
        "Review Deleted Successfully"
    );

    client.list_reviews("p-1", &query).await.unwrap();
    client.review_stats("p-1").await.unwrap();
    assert_eq!(backend.state.review_calls.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn failed_review_delete_notifies_error() {
    let backend = spawn_backend().await;
    let (client, mut notifications) = admin_client(&backend);
    backend.state.set_fail_mutations(true);

    assert_matches!(
        client.delete_review("rev-1").await,
        Err(ClientError::Api { status: 500, .. })
    );
    assert_eq!(
        next_notification(&mut notifications).await.message,
        "Error Deleting Review!"
    );
}

#[tokio::test]
async fn orders_list_get_update_and_delete() {
    let backend = spawn_backend().await;
    let (client, _notifications) = admin_client(&backend);

    let orders = client.list_orders().await.unwrap();
    assert_eq!(orders.len(), 2);
    assert_eq!(orders[0].customer.full_name(), "Dejesus Michael");

    let order = client.get_order("o1").await.unwrap();
    assert_eq!(order.total, "43.17");
    assert_eq!(backend.state.order_calls.load(Ordering::SeqCst), 2);

    let updated = client.update_order(&order).await.unwrap();
    assert_eq!(updated.current_status().map(|s| s.name.as_str()), Some("Shipped"));
    assert_eq!(client.cache().is_stale("orders").await, Some(true));

    client.delete_order("o1").await.unwrap();
    client
        .delete_orders(&["o2".to_string(), "o3".to_string()])
        .await
        .unwrap();
    assert_eq!(
        backend.state.deleted(),
        vec!["order:o1", "order:o2", "order:o3"]
    );

    assert!(client.get_order("o9").await.unwrap_err().is_not_found());
}
